//! Engine configuration.
//!
//! Hosts configure the engine at startup by providing:
//! - `GeometryConfig`: thresholds that decide when a layout descriptor is "set"
//! - `EngineConfig`: logging, content-dependency names, history size
//!
//! Every field has a default matching the stock editor behavior, so
//! `EngineConfig::default()` is the common starting point.

use serde::{Deserialize, Serialize};

/// Thresholds used by the geometry resolver.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeometryConfig {
    /// A position below this value counts as explicitly set.
    pub unset_threshold: f64,

    /// The value an unconfigured position starts with.
    pub unset_default: f64,

    /// A width/height whose magnitude exceeds this counts as explicitly set.
    pub size_epsilon: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            unset_threshold: 100_000.0,
            unset_default: 1_000_000.0,
            size_epsilon: 0.001,
        }
    }
}

/// Complete engine configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Trace every propagation step at debug level.
    pub log_updates: bool,

    /// Geometry resolver thresholds.
    pub geometry: GeometryConfig,

    /// Style members starting with this prefix are document content.
    pub content_prefix: String,

    /// Variable name that is document content as a whole.
    pub layout_variable: String,

    /// Maximum number of change notices kept in the change log.
    /// `None` keeps everything.
    pub history_limit: Option<usize>,

    /// Maximum number of queued events (including script-requested
    /// actions) processed after one host call. Anything beyond is dropped
    /// with a warning.
    pub chain_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_updates: false,
            geometry: GeometryConfig::default(),
            content_prefix: "content".to_string(),
            layout_variable: "layout".to_string(),
            history_limit: Some(1024),
            chain_limit: 256,
        }
    }
}

impl EngineConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable propagation tracing.
    #[must_use]
    pub fn with_log_updates(mut self, enabled: bool) -> Self {
        self.log_updates = enabled;
        self
    }

    /// Replace the geometry thresholds.
    #[must_use]
    pub fn with_geometry(mut self, geometry: GeometryConfig) -> Self {
        self.geometry = geometry;
        self
    }

    /// Set the content member prefix.
    #[must_use]
    pub fn with_content_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.content_prefix = prefix.into();
        self
    }

    /// Set the change log history limit.
    #[must_use]
    pub fn with_history_limit(mut self, limit: Option<usize>) -> Self {
        self.history_limit = limit;
        self
    }

    /// Set the queued event limit.
    #[must_use]
    pub fn with_chain_limit(mut self, limit: usize) -> Self {
        self.chain_limit = limit;
        self
    }

    /// Check if a variable or member name refers to document content.
    #[must_use]
    pub fn is_content_name(&self, name: &str) -> bool {
        name.starts_with(self.content_prefix.as_str()) || name == self.layout_variable
    }
}

//! Core engine types: ids, field maps, ages, change masks, configuration, errors.
//!
//! This module contains the building blocks every other module uses.
//! Nothing in here knows about scripts or propagation.

pub mod ids;
pub mod field_map;
pub mod age;
pub mod change;
pub mod config;
pub mod error;

pub use ids::{CardId, FieldIndex, KeywordId, StyleSheetId};
pub use field_map::FieldMap;
pub use age::{Age, AgeClock};
pub use change::ChangeMask;
pub use config::{EngineConfig, GeometryConfig};
pub use error::{EngineError, ErrorReporter, ReportedError, ScriptError, StructuralError};

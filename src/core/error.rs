//! Error types and the non-fatal error channel.
//!
//! ## Taxonomy
//!
//! - [`ScriptError`]: a script raised or produced a value of the wrong type.
//!   Caught per value/style, wrapped with a description of what was being
//!   updated and sent to the [`ErrorReporter`]. Propagation carries on.
//! - [`StructuralError`]: the schema or document is malformed (unknown field
//!   type, dangling id, placeholder reached). Returned as `Err` and never
//!   swallowed.
//! - Initialization failures of game/stylesheet init scripts are reported as
//!   [`ReportedError::Initialization`]; the context stays usable.

use thiserror::Error;

use super::ids::{CardId, KeywordId, StyleSheetId};

/// A script failed to evaluate.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ScriptError {
    /// A variable was read that is not bound in the context.
    #[error("variable '{0}' is not set")]
    UnknownVariable(String),

    /// A member was read that the object does not have.
    #[error("{object} has no member '{member}'")]
    NoMember { object: String, member: String },

    /// A value had the wrong type for the operation.
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// A function was called that the engine does not know.
    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    /// The script raised an error itself.
    #[error("{0}")]
    Raised(String),

    /// An error with a description of where it happened.
    #[error("{error}\n  {context}")]
    Context {
        error: Box<ScriptError>,
        context: String,
    },
}

impl ScriptError {
    /// Wrap this error with a description of what was being evaluated.
    #[must_use]
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ScriptError::Context {
            error: Box::new(self),
            context: context.into(),
        }
    }

    /// The innermost error, without any context wrappers.
    #[must_use]
    pub fn root(&self) -> &ScriptError {
        match self {
            ScriptError::Context { error, .. } => error.root(),
            other => other,
        }
    }
}

/// The schema or document violates an invariant.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StructuralError {
    /// A field description has no type tag.
    #[error("expected key 'type'")]
    MissingFieldType,

    /// A field description has a type tag nobody knows.
    #[error("unsupported field type '{0}'")]
    UnknownFieldType(String),

    /// No field with this name exists in the schema.
    #[error("no field named '{0}'")]
    UnknownField(String),

    /// The card does not exist in the set.
    #[error("{0} does not exist")]
    UnknownCard(CardId),

    /// The card already exists in the set.
    #[error("{0} already exists")]
    DuplicateCard(CardId),

    /// The stylesheet is not registered.
    #[error("{0} does not exist")]
    UnknownStyleSheet(StyleSheetId),

    /// The keyword does not exist in the set.
    #[error("{0} does not exist")]
    UnknownKeyword(KeywordId),

    /// A value address points at nothing.
    #[error("no value at {0}")]
    MissingValue(String),

    /// A value or style slot was used before it was initialized.
    #[error("placeholder reached: {0}")]
    Placeholder(String),
}

/// Either kind of failure, as returned by a single value update.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum EngineError {
    /// Reported and absorbed by the scheduler.
    #[error(transparent)]
    Script(#[from] ScriptError),

    /// Propagated to the caller.
    #[error(transparent)]
    Structural(#[from] StructuralError),
}

/// An error that was reported instead of propagated.
#[derive(Clone, Debug, PartialEq)]
pub enum ReportedError {
    /// A value or style script failed during an update.
    Script(ScriptError),

    /// A game or stylesheet init script failed while creating a context.
    Initialization { target: String, error: ScriptError },
}

impl std::fmt::Display for ReportedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportedError::Script(error) => write!(f, "{error}"),
            ReportedError::Initialization { target, error } => {
                write!(f, "{error}\n  in init script for {target}")
            }
        }
    }
}

/// Collects non-fatal errors until the host drains them.
///
/// ```
/// use set_script::core::{ErrorReporter, ScriptError};
///
/// let mut errors = ErrorReporter::new();
/// errors.report_script(
///     ScriptError::Raised("bad".into()),
///     "while updating card value 'name'",
/// );
/// assert_eq!(errors.len(), 1);
/// assert_eq!(errors.take().len(), 1);
/// assert!(errors.is_empty());
/// ```
#[derive(Clone, Debug, Default)]
pub struct ErrorReporter {
    reports: Vec<ReportedError>,
}

impl ErrorReporter {
    /// Create an empty reporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a script failure with a description of what was being updated.
    pub fn report_script(&mut self, error: ScriptError, context: impl Into<String>) {
        let error = error.with_context(context);
        log::warn!("{error}");
        self.reports.push(ReportedError::Script(error));
    }

    /// Report an init script failure.
    pub fn report_init(&mut self, target: impl Into<String>, error: ScriptError) {
        let report = ReportedError::Initialization {
            target: target.into(),
            error,
        };
        log::warn!("{report}");
        self.reports.push(report);
    }

    /// Number of reports waiting.
    #[must_use]
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    /// Check if nothing was reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Iterate over waiting reports.
    pub fn iter(&self) -> impl Iterator<Item = &ReportedError> {
        self.reports.iter()
    }

    /// Remove and return all waiting reports.
    pub fn take(&mut self) -> Vec<ReportedError> {
        std::mem::take(&mut self.reports)
    }
}

//! Script evaluation contexts.
//!
//! A `Context` is the variable environment scripts run in. There is one per
//! stylesheet, shared by every card that uses that stylesheet; the manager
//! rebinds the per-card variables before each evaluation.
//!
//! Bindings live in a persistent map, so a scoped evaluation is a snapshot
//! and a restore rather than an undo log.

use im::HashMap;

use crate::core::{ScriptError, StyleSheetId};
use crate::data::ValueRef;

use super::value::ScriptValue;

/// A document action a script asked for while it was being evaluated.
///
/// Requests are not applied during propagation. The manager queues them
/// and applies them in order once the running round has drained.
#[derive(Clone, Debug, PartialEq)]
pub enum ScriptAction {
    /// Replace the content of a value.
    SetValue {
        value: ValueRef,
        content: ScriptValue,
    },
}

/// A script variable environment.
#[derive(Clone, Debug)]
pub struct Context {
    stylesheet: StyleSheetId,
    vars: HashMap<String, ScriptValue>,
    requests: Vec<ScriptAction>,
}

impl Context {
    /// Create an empty context for a stylesheet.
    #[must_use]
    pub fn new(stylesheet: StyleSheetId) -> Self {
        Self {
            stylesheet,
            vars: HashMap::new(),
            requests: Vec::new(),
        }
    }

    /// The stylesheet this context belongs to.
    #[must_use]
    pub fn stylesheet(&self) -> StyleSheetId {
        self.stylesheet
    }

    /// Bind a variable.
    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<ScriptValue>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Look up a variable.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&ScriptValue> {
        self.vars.get(name)
    }

    /// Look up a variable, failing if it is not bound.
    pub fn get(&self, name: &str) -> Result<&ScriptValue, ScriptError> {
        self.vars
            .get(name)
            .ok_or_else(|| ScriptError::UnknownVariable(name.to_string()))
    }

    /// Number of bound variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Check if no variables are bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Run `f` with a binding scope: every variable bound inside is
    /// forgotten afterwards.
    pub fn scoped<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let saved = self.vars.clone();
        let result = f(self);
        self.vars = saved;
        result
    }

    /// Ask the manager to perform a document action after the current round.
    pub fn perform(&mut self, action: ScriptAction) {
        self.requests.push(action);
    }

    /// Check if actions are waiting.
    #[must_use]
    pub fn has_requests(&self) -> bool {
        !self.requests.is_empty()
    }

    /// Remove and return waiting actions, oldest first.
    pub fn take_requests(&mut self) -> Vec<ScriptAction> {
        std::mem::take(&mut self.requests)
    }
}

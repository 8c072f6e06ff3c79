//! Style parameters that are either constant or computed by a script.

use serde::{Deserialize, Serialize};

use crate::core::ScriptError;
use crate::data::Set;

use super::context::Context;
use super::engine::ScriptEngine;
use super::expr::Script;
use super::reads::VariableReads;
use super::value::FromScript;

/// A value with an optional script that recomputes it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scriptable<T> {
    value: T,
    script: Option<Script>,
}

impl<T> Scriptable<T> {
    /// A constant.
    pub fn new(value: T) -> Self {
        Self {
            value,
            script: None,
        }
    }

    /// A scripted value with a starting value.
    pub fn scripted(script: impl Into<Script>, initial: T) -> Self {
        Self {
            value: initial,
            script: Some(script.into()),
        }
    }

    /// The current value.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// The script, if any.
    pub fn script(&self) -> Option<&Script> {
        self.script.as_ref()
    }

    /// Check if this value is computed by a script.
    pub fn is_scripted(&self) -> bool {
        self.script.is_some()
    }

    /// Replace the value without touching the script.
    pub fn set(&mut self, value: T) {
        self.value = value;
    }

    /// What the script can read.
    pub fn reads<E: ScriptEngine + ?Sized>(&self, engine: &E) -> VariableReads {
        self.script
            .as_ref()
            .map(|script| engine.static_dependencies(script))
            .unwrap_or_default()
    }
}

impl<T: FromScript + PartialEq> Scriptable<T> {
    /// Run the script. `None` for constants.
    pub fn evaluate<E: ScriptEngine + ?Sized>(
        &self,
        engine: &E,
        ctx: &mut Context,
        set: &Set,
    ) -> Result<Option<T>, ScriptError> {
        match &self.script {
            Some(script) => {
                let value = ctx.scoped(|ctx| engine.evaluate(script, ctx, set))?;
                T::from_script(&value).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Store a computed value. Returns whether it differs from the old one.
    pub fn assign(&mut self, value: T) -> bool {
        if self.value == value {
            false
        } else {
            self.value = value;
            true
        }
    }
}

impl<T: Default> Default for Scriptable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::{Expr, ExprEngine};

    #[test]
    fn test_assign_reports_change() {
        let mut width = Scriptable::new(10.0);
        assert!(!width.assign(10.0));
        assert!(width.assign(20.0));
        assert_eq!(*width.get(), 20.0);
        assert!(!width.is_scripted());
    }

    #[test]
    fn test_default_is_constant() {
        let padding: Scriptable<f64> = Scriptable::default();
        assert_eq!(*padding.get(), 0.0);
        assert!(!padding.is_scripted());
    }

    #[test]
    fn test_evaluate_does_not_leak_bindings() {
        let engine = ExprEngine::new();
        let set = crate::games::simple::SimpleGame::new().build();
        let mut ctx = Context::new(set.stylesheet_id());
        let mask = Scriptable::scripted(Expr::let_("clip", Expr::text("round")), String::new());

        assert_eq!(mask.evaluate(&engine, &mut ctx, &set), Ok(Some("round".to_string())));
        assert_eq!(ctx.variable("clip"), None);
    }

    #[test]
    fn test_reads_of_constant_are_empty() {
        let engine = ExprEngine::new();
        assert!(Scriptable::new(1.0).reads(&engine).is_empty());

        let scripted = Scriptable::scripted(Expr::card("size"), 0.0);
        assert_eq!(scripted.reads(&engine).len(), 1);
    }
}

//! Script values, expressions, engines and contexts.
//!
//! ## Key Types
//!
//! - `ScriptValue`: what scripts produce and read
//! - `Script` / `Expr`: script representation
//! - `ScriptEngine`: the seam between propagation and the script language
//! - `Context`: the variable environment of one stylesheet
//! - `VariableReads`: what a script reads, used for dependency discovery

pub mod context;
pub mod engine;
pub mod expr;
pub mod reads;
pub mod scriptable;
pub mod value;

pub use context::{Context, ScriptAction};
pub use engine::{ExprEngine, NativeFunction, ScriptEngine};
pub use expr::{BinOp, Expr, Script};
pub use reads::{VariableReads, VariableRef};
pub use scriptable::Scriptable;
pub use value::{FromScript, Handle, ScriptValue};

/// Variables bound in every context.
pub mod vars {
    pub const GAME: &str = "game";
    pub const SET: &str = "set";
    pub const STYLESHEET: &str = "stylesheet";
    pub const CARD_STYLE: &str = "card_style";
    pub const CARD: &str = "card";
    pub const STYLING: &str = "styling";
    pub const EXTRA_CARD_STYLE: &str = "extra_card_style";
    pub const EXTRA_CARD: &str = "extra_card";
    /// Bound to the old content while a value's script runs.
    pub const VALUE: &str = "value";
}

//! Script values.
//!
//! Everything a script reads or produces is a `ScriptValue`. Document
//! objects (cards, the set, stylesheets, styles) appear as [`Handle`]s:
//! plain ids that are resolved against the set at evaluation time, so a
//! context never owns or borrows the document it describes.
//!
//! ## ScriptValue Types
//!
//! - `Nil`: no value (an unset field, a missing card)
//! - `Bool`, `Int`, `Double`, `Text`: scalars
//! - `List`: ordered values (the card list, keyword matches)
//! - `Handle`: a document object

use serde::{Deserialize, Serialize};

use crate::core::{CardId, FieldIndex, ScriptError, StyleSheetId};

/// A non-owning reference to a document object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handle {
    /// The game schema.
    Game,
    /// The set being edited.
    Set,
    /// A stylesheet.
    StyleSheet(StyleSheetId),
    /// The card styles of a stylesheet, indexed by card field name.
    CardStyle(StyleSheetId),
    /// The extra card styles of a stylesheet, indexed by extra field name.
    ExtraCardStyle(StyleSheetId),
    /// One style of a stylesheet.
    Style {
        stylesheet: StyleSheetId,
        field: FieldIndex,
        extra: bool,
    },
    /// A card.
    Card(CardId),
    /// Styling data for a stylesheet; `card` is set when the card carries
    /// its own styling data.
    Styling {
        stylesheet: StyleSheetId,
        card: Option<CardId>,
    },
    /// A card's extra data for a stylesheet.
    ExtraCard {
        card: CardId,
        stylesheet: StyleSheetId,
    },
}

/// A value produced or consumed by a script.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum ScriptValue {
    /// No value.
    #[default]
    Nil,
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Floating point number.
    Double(f64),
    /// Text.
    Text(String),
    /// List of values.
    List(Vec<ScriptValue>),
    /// A document object.
    Handle(Handle),
}

impl ScriptValue {
    /// Name of this value's type, for error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            ScriptValue::Nil => "nil",
            ScriptValue::Bool(_) => "boolean",
            ScriptValue::Int(_) => "integer",
            ScriptValue::Double(_) => "double",
            ScriptValue::Text(_) => "string",
            ScriptValue::List(_) => "list",
            ScriptValue::Handle(_) => "object",
        }
    }

    /// Check if this is `Nil`.
    #[must_use]
    pub fn is_nil(&self) -> bool {
        matches!(self, ScriptValue::Nil)
    }

    /// Get as bool if this is a Bool value.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ScriptValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as integer if this is an Int value.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ScriptValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as a number if this is an Int or Double value.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ScriptValue::Int(v) => Some(*v as f64),
            ScriptValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as string reference if this is a Text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ScriptValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get as handle if this is a Handle value.
    #[must_use]
    pub fn as_handle(&self) -> Option<Handle> {
        match self {
            ScriptValue::Handle(h) => Some(*h),
            _ => None,
        }
    }

    /// Truth value used by conditionals.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            ScriptValue::Nil => false,
            ScriptValue::Bool(b) => *b,
            ScriptValue::Int(i) => *i != 0,
            ScriptValue::Double(d) => *d != 0.0,
            ScriptValue::Text(s) => !s.is_empty(),
            ScriptValue::List(items) => !items.is_empty(),
            ScriptValue::Handle(_) => true,
        }
    }

    /// Text form of this value, as shown in card lists and used for sorting.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            ScriptValue::Nil => String::new(),
            ScriptValue::Bool(b) => b.to_string(),
            ScriptValue::Int(i) => i.to_string(),
            ScriptValue::Double(d) => d.to_string(),
            ScriptValue::Text(s) => s.clone(),
            ScriptValue::List(items) => items
                .iter()
                .map(ScriptValue::to_text)
                .collect::<Vec<_>>()
                .join(", "),
            ScriptValue::Handle(h) => format!("<{h:?}>"),
        }
    }

    fn mismatch(&self, expected: &'static str) -> ScriptError {
        ScriptError::TypeMismatch {
            expected,
            found: self.type_name(),
        }
    }
}

impl From<bool> for ScriptValue {
    fn from(v: bool) -> Self {
        ScriptValue::Bool(v)
    }
}

impl From<i64> for ScriptValue {
    fn from(v: i64) -> Self {
        ScriptValue::Int(v)
    }
}

impl From<i32> for ScriptValue {
    fn from(v: i32) -> Self {
        ScriptValue::Int(v as i64)
    }
}

impl From<f64> for ScriptValue {
    fn from(v: f64) -> Self {
        ScriptValue::Double(v)
    }
}

impl From<String> for ScriptValue {
    fn from(v: String) -> Self {
        ScriptValue::Text(v)
    }
}

impl From<&str> for ScriptValue {
    fn from(v: &str) -> Self {
        ScriptValue::Text(v.to_string())
    }
}

impl From<Handle> for ScriptValue {
    fn from(h: Handle) -> Self {
        ScriptValue::Handle(h)
    }
}

/// Conversion from a script result into a typed style parameter.
pub trait FromScript: Sized {
    /// Convert, failing with a type mismatch.
    fn from_script(value: &ScriptValue) -> Result<Self, ScriptError>;
}

impl FromScript for f64 {
    fn from_script(value: &ScriptValue) -> Result<Self, ScriptError> {
        match value {
            ScriptValue::Text(s) => s.trim().parse().map_err(|_| value.mismatch("double")),
            other => other.as_f64().ok_or_else(|| other.mismatch("double")),
        }
    }
}

impl FromScript for bool {
    fn from_script(value: &ScriptValue) -> Result<Self, ScriptError> {
        match value {
            ScriptValue::Bool(b) => Ok(*b),
            ScriptValue::Int(i) => Ok(*i != 0),
            ScriptValue::Text(s) if s == "yes" || s == "true" => Ok(true),
            ScriptValue::Text(s) if s == "no" || s == "false" => Ok(false),
            other => Err(other.mismatch("boolean")),
        }
    }
}

impl FromScript for String {
    fn from_script(value: &ScriptValue) -> Result<Self, ScriptError> {
        match value {
            ScriptValue::Handle(_) | ScriptValue::List(_) => Err(value.mismatch("string")),
            other => Ok(other.to_text()),
        }
    }
}

impl FromScript for ScriptValue {
    fn from_script(value: &ScriptValue) -> Result<Self, ScriptError> {
        Ok(value.clone())
    }
}

//! Values and value addresses.
//!
//! A `Value` is the content of one field for one owner (a card, the set,
//! a stylesheet's styling data, a card's extra data). Besides its content it
//! carries two ages: when a script last recomputed it, and when its content
//! last changed. The scheduler compares the first against the start of a
//! round to recompute every value at most once per round.

use serde::{Deserialize, Serialize};

use crate::core::{Age, CardId, FieldIndex, KeywordId, StyleSheetId};
use crate::script::ScriptValue;

use super::keyword::KeywordSlot;

/// Where a backed value reads its content from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Backing {
    /// A text slot of a keyword.
    Keyword { keyword: KeywordId, slot: KeywordSlot },
}

/// What a value holds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ValueContent {
    /// Content owned by the value.
    Owned(ScriptValue),
    /// A view of content stored elsewhere; `cached` is the last pulled copy.
    Backed { backing: Backing, cached: String },
}

/// The content of one field for one owner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Value {
    field: FieldIndex,
    content: ValueContent,
    is_default: bool,
    sort_value: String,
    last_script_update: Age,
    last_changed: Age,
}

impl Value {
    /// A fresh owned value.
    #[must_use]
    pub fn new(field: FieldIndex, initial: ScriptValue) -> Self {
        let sort_value = initial.to_text();
        Self {
            field,
            content: ValueContent::Owned(initial),
            is_default: true,
            sort_value,
            last_script_update: Age::ZERO,
            last_changed: Age::ZERO,
        }
    }

    /// A value backed by another store.
    #[must_use]
    pub fn backed(field: FieldIndex, backing: Backing, text: impl Into<String>) -> Self {
        let cached = text.into();
        Self {
            field,
            sort_value: cached.clone(),
            content: ValueContent::Backed { backing, cached },
            is_default: false,
            last_script_update: Age::ZERO,
            last_changed: Age::ZERO,
        }
    }

    /// The field this value belongs to.
    #[must_use]
    pub fn field(&self) -> FieldIndex {
        self.field
    }

    /// The raw content.
    #[must_use]
    pub fn content(&self) -> &ValueContent {
        &self.content
    }

    /// The content as scripts see it.
    #[must_use]
    pub fn script_value(&self) -> ScriptValue {
        match &self.content {
            ValueContent::Owned(value) => value.clone(),
            ValueContent::Backed { cached, .. } => ScriptValue::Text(cached.clone()),
        }
    }

    /// The backing store, for backed values.
    #[must_use]
    pub fn backing(&self) -> Option<Backing> {
        match &self.content {
            ValueContent::Owned(_) => None,
            ValueContent::Backed { backing, .. } => Some(*backing),
        }
    }

    /// Check if this value is a view of another store.
    #[must_use]
    pub fn is_backed(&self) -> bool {
        self.backing().is_some()
    }

    /// Check if the content was never edited by the user.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.is_default
    }

    /// The key used to sort cards by this field.
    #[must_use]
    pub fn sort_value(&self) -> &str {
        &self.sort_value
    }

    /// When a script last recomputed this value.
    #[must_use]
    pub fn age(&self) -> Age {
        self.last_script_update
    }

    /// When the content last changed through a recompute.
    #[must_use]
    pub fn last_changed(&self) -> Age {
        self.last_changed
    }

    /// Replace the content as a user edit. Returns whether it changed.
    pub fn set_content(&mut self, content: ScriptValue) -> bool {
        self.is_default = false;
        match &mut self.content {
            ValueContent::Owned(old) => {
                if *old == content {
                    return false;
                }
                self.sort_value = content.to_text();
                *old = content;
            }
            ValueContent::Backed { cached, .. } => {
                let text = content.to_text();
                if *cached == text {
                    return false;
                }
                self.sort_value = text.clone();
                *cached = text;
            }
        }
        true
    }

    /// Store the result of a successful recompute. Returns whether the
    /// content changed.
    pub fn commit(&mut self, content: ScriptValue, sort_value: String, age: Age) -> bool {
        let changed = match &mut self.content {
            ValueContent::Owned(old) => {
                let changed = *old != content;
                *old = content;
                changed
            }
            ValueContent::Backed { cached, .. } => {
                let text = content.to_text();
                let changed = *cached != text;
                *cached = text;
                changed
            }
        };
        self.sort_value = sort_value;
        self.last_script_update = age;
        if changed {
            self.last_changed = age;
        }
        changed
    }

    /// Re-pull a backed value from its store. Returns whether the cached
    /// copy changed. Owned values are left alone.
    pub fn retrieve(&mut self, text: &str, age: Age) -> bool {
        if !self.is_backed() {
            return false;
        }
        self.commit(ScriptValue::Text(text.to_string()), text.to_string(), age)
    }

    /// The text to write back to the backing store.
    #[must_use]
    pub fn stored_text(&self) -> Option<&str> {
        match &self.content {
            ValueContent::Backed { cached, .. } => Some(cached),
            ValueContent::Owned(_) => None,
        }
    }

    /// Identity comparison: owned values are only equal to themselves,
    /// backed values are equal when they view the same slot.
    #[must_use]
    pub fn same_value(&self, other: &Value) -> bool {
        match (self.backing(), other.backing()) {
            (Some(a), Some(b)) => a == b,
            (None, None) => std::ptr::eq(self, other),
            _ => false,
        }
    }
}

/// The address of a value within a set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueRef {
    /// A set value.
    Set(FieldIndex),
    /// A card value.
    Card(CardId, FieldIndex),
    /// A styling value; `card` is set for a card's own styling data.
    Styling {
        stylesheet: StyleSheetId,
        card: Option<CardId>,
        field: FieldIndex,
    },
    /// A card's extra value for a stylesheet.
    ExtraCard {
        card: CardId,
        stylesheet: StyleSheetId,
        field: FieldIndex,
    },
    /// A keyword's text slot.
    Keyword(KeywordId, KeywordSlot),
}

impl ValueRef {
    /// The card that owns the value, if any.
    #[must_use]
    pub fn card(&self) -> Option<CardId> {
        match self {
            ValueRef::Card(card, _) | ValueRef::ExtraCard { card, .. } => Some(*card),
            ValueRef::Styling { card, .. } => *card,
            ValueRef::Set(_) | ValueRef::Keyword(..) => None,
        }
    }

    /// Index of the value's field in its schema list.
    #[must_use]
    pub fn field(&self) -> FieldIndex {
        match self {
            ValueRef::Set(field) | ValueRef::Card(_, field) => *field,
            ValueRef::Styling { field, .. } | ValueRef::ExtraCard { field, .. } => *field,
            ValueRef::Keyword(_, slot) => slot.field_index(),
        }
    }
}

impl std::fmt::Display for ValueRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueRef::Set(field) => write!(f, "set.{field}"),
            ValueRef::Card(card, field) => write!(f, "{card}.{field}"),
            ValueRef::Styling {
                stylesheet,
                card: Some(card),
                field,
            } => write!(f, "{card}.styling[{stylesheet}].{field}"),
            ValueRef::Styling {
                stylesheet, field, ..
            } => write!(f, "styling[{stylesheet}].{field}"),
            ValueRef::ExtraCard {
                card,
                stylesheet,
                field,
            } => write!(f, "{card}.extra[{stylesheet}].{field}"),
            ValueRef::Keyword(keyword, slot) => write!(f, "{keyword}.{}", slot.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_tracks_ages() {
        let mut value = Value::new(FieldIndex(0), ScriptValue::Nil);
        assert_eq!(value.age(), Age::ZERO);

        assert!(value.commit("a".into(), "a".into(), Age(3)));
        assert_eq!(value.age(), Age(3));
        assert_eq!(value.last_changed(), Age(3));

        assert!(!value.commit("a".into(), "a".into(), Age(5)));
        assert_eq!(value.age(), Age(5));
        assert_eq!(value.last_changed(), Age(3));
    }

    #[test]
    fn test_set_content_clears_default() {
        let mut value = Value::new(FieldIndex(0), ScriptValue::Nil);
        assert!(value.is_default());
        assert!(value.set_content("x".into()));
        assert!(!value.is_default());
        assert!(!value.set_content("x".into()));
        assert_eq!(value.sort_value(), "x");
    }

    #[test]
    fn test_backed_retrieve() {
        let backing = Backing::Keyword {
            keyword: KeywordId(0),
            slot: KeywordSlot::Match,
        };
        let mut value = Value::backed(FieldIndex(1), backing, "flying");
        assert_eq!(value.script_value(), ScriptValue::from("flying"));
        assert!(!value.retrieve("flying", Age(1)));
        assert!(value.retrieve("flying <atom>", Age(2)));
        assert_eq!(value.stored_text(), Some("flying <atom>"));
        assert_eq!(value.age(), Age(2));
    }

    #[test]
    fn test_retrieve_ignores_owned() {
        let mut value = Value::new(FieldIndex(0), "a".into());
        assert!(!value.retrieve("b", Age(1)));
        assert_eq!(value.script_value(), ScriptValue::from("a"));
        assert_eq!(value.age(), Age::ZERO);
    }

    #[test]
    fn test_same_value_identity() {
        let a = Value::new(FieldIndex(0), "x".into());
        let b = a.clone();
        assert!(a.same_value(&a));
        assert!(!a.same_value(&b));

        let backing = Backing::Keyword {
            keyword: KeywordId(2),
            slot: KeywordSlot::Rules,
        };
        let c = Value::backed(FieldIndex(3), backing, "one");
        let d = Value::backed(FieldIndex(3), backing, "two");
        assert!(c.same_value(&d));
        assert!(!a.same_value(&c));
    }

    #[test]
    fn test_value_ref_card() {
        assert_eq!(ValueRef::Card(CardId(2), FieldIndex(0)).card(), Some(CardId(2)));
        assert_eq!(ValueRef::Set(FieldIndex(0)).card(), None);
        let styling = ValueRef::Styling {
            stylesheet: StyleSheetId(0),
            card: None,
            field: FieldIndex(1),
        };
        assert_eq!(styling.card(), None);
        assert_eq!(styling.field(), FieldIndex(1));
        assert_eq!(
            ValueRef::Card(CardId(2), FieldIndex(0)).to_string(),
            "Card(2).Field(0)"
        );
    }
}

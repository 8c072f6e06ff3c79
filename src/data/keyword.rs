//! Keywords and the keyword database.
//!
//! Each keyword has four text slots. Editors show them through backed
//! values so ordinary value edits work on them; the keyword itself stays
//! the store of record.
//!
//! The database is a prepared index over all keywords' match patterns. It
//! is cleared whenever a pattern changes and rebuilt once, lazily, when the
//! manager flushes deferred work.

use serde::{Deserialize, Serialize};

use crate::core::{FieldIndex, KeywordId};

use super::value::{Backing, Value};

/// A text slot of a keyword.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeywordSlot {
    Keyword,
    Match,
    Reminder,
    Rules,
}

impl KeywordSlot {
    /// All slots, in field order.
    pub const ALL: [KeywordSlot; 4] = [
        KeywordSlot::Keyword,
        KeywordSlot::Match,
        KeywordSlot::Reminder,
        KeywordSlot::Rules,
    ];

    /// Index of the slot's field in the keyword schema.
    #[must_use]
    pub const fn field_index(self) -> FieldIndex {
        FieldIndex(self as u32)
    }

    /// Field name of the slot.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            KeywordSlot::Keyword => "keyword",
            KeywordSlot::Match => "match",
            KeywordSlot::Reminder => "reminder",
            KeywordSlot::Rules => "rules",
        }
    }
}

/// Normalize text for matching: lowercase, drop `<...>` tags, collapse
/// whitespace.
fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_tag = false;
    for c in text.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                out.push(' ');
            }
            _ if in_tag => {}
            c => out.extend(c.to_lowercase()),
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A keyword of the set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    id: KeywordId,
    pub mode: String,
    /// Fixed keywords come with the game; their texts are read-only.
    pub fixed: bool,
    texts: [String; 4],
    pattern: Option<String>,
    values: Vec<Value>,
}

impl Keyword {
    /// Create a keyword. Its id is assigned when it is added to a set.
    pub fn new(keyword: impl Into<String>) -> Self {
        let mut kw = Self {
            id: KeywordId(0),
            mode: String::new(),
            fixed: false,
            texts: [keyword.into(), String::new(), String::new(), String::new()],
            pattern: None,
            values: Vec::new(),
        };
        kw.rebuild_values();
        kw
    }

    /// Set the match pattern.
    #[must_use]
    pub fn with_match(mut self, text: impl Into<String>) -> Self {
        self.texts[KeywordSlot::Match as usize] = text.into();
        self.rebuild_values();
        self
    }

    /// Set the reminder text.
    #[must_use]
    pub fn with_reminder(mut self, text: impl Into<String>) -> Self {
        self.texts[KeywordSlot::Reminder as usize] = text.into();
        self.rebuild_values();
        self
    }

    /// Set the rules text.
    #[must_use]
    pub fn with_rules(mut self, text: impl Into<String>) -> Self {
        self.texts[KeywordSlot::Rules as usize] = text.into();
        self.rebuild_values();
        self
    }

    /// Make the keyword read-only.
    #[must_use]
    pub fn fixed(mut self) -> Self {
        self.fixed = true;
        self
    }

    /// Set the mode.
    #[must_use]
    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = mode.into();
        self
    }

    #[must_use]
    pub fn id(&self) -> KeywordId {
        self.id
    }

    pub(crate) fn assign_id(&mut self, id: KeywordId) {
        self.id = id;
        self.rebuild_values();
    }

    fn rebuild_values(&mut self) {
        let id = self.id;
        self.values = KeywordSlot::ALL
            .iter()
            .map(|&slot| {
                let backing = Backing::Keyword { keyword: id, slot };
                Value::backed(slot.field_index(), backing, self.texts[slot as usize].clone())
            })
            .collect();
    }

    /// The text of a slot.
    #[must_use]
    pub fn text(&self, slot: KeywordSlot) -> &str {
        &self.texts[slot as usize]
    }

    /// The keyword name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.text(KeywordSlot::Keyword)
    }

    /// Replace the text of a slot. The backed value is not refreshed until
    /// it is retrieved.
    pub fn set_text(&mut self, slot: KeywordSlot, text: impl Into<String>) {
        self.texts[slot as usize] = text.into();
        if slot == KeywordSlot::Match {
            self.pattern = None;
        }
    }

    /// Normalize the match pattern for lookups.
    pub fn prepare(&mut self) {
        self.pattern = Some(self.compute_pattern());
    }

    /// The prepared pattern, if `prepare` ran since the last match edit.
    #[must_use]
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    fn compute_pattern(&self) -> String {
        let source = match self.text(KeywordSlot::Match) {
            "" => self.name(),
            text => text,
        };
        normalize(source)
    }

    /// Check if the keyword occurs in a text.
    #[must_use]
    pub fn occurs_in(&self, text: &str) -> bool {
        let pattern = match &self.pattern {
            Some(pattern) => pattern.clone(),
            None => self.compute_pattern(),
        };
        !pattern.is_empty() && normalize(text).contains(&pattern)
    }

    /// The backed value of a slot.
    #[must_use]
    pub fn value(&self, slot: KeywordSlot) -> &Value {
        &self.values[slot as usize]
    }

    /// The backed value of a slot, mutably.
    pub fn value_mut(&mut self, slot: KeywordSlot) -> &mut Value {
        &mut self.values[slot as usize]
    }

    /// Write a backed value's text back into its slot. Values of a fixed
    /// keyword are re-pulled from the slot instead. Returns whether the slot
    /// was written.
    pub fn store(&mut self, slot: KeywordSlot) -> bool {
        let value = &mut self.values[slot as usize];
        if self.fixed {
            let age = value.age();
            value.retrieve(&self.texts[slot as usize], age);
            return false;
        }
        let text = value.stored_text().map(str::to_string);
        match text {
            Some(text) => {
                self.set_text(slot, text);
                true
            }
            None => false,
        }
    }
}

/// Prepared index over the set's keyword patterns.
#[derive(Clone, Debug, Default)]
pub struct KeywordDatabase {
    entries: Vec<(String, String)>,
    valid: bool,
    rebuilds: usize,
}

impl KeywordDatabase {
    /// Create an empty, invalid database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalidate the index.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.valid = false;
    }

    /// Check if the index is current.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Number of rebuilds so far.
    #[must_use]
    pub fn rebuild_count(&self) -> usize {
        self.rebuilds
    }

    /// Rebuild the index from keywords.
    pub fn rebuild<'a>(&mut self, keywords: impl IntoIterator<Item = &'a Keyword>) {
        self.entries = keywords
            .into_iter()
            .map(|kw| {
                let pattern = kw.pattern().map_or_else(|| kw.compute_pattern(), str::to_string);
                (pattern, kw.name().to_string())
            })
            .filter(|(pattern, _)| !pattern.is_empty())
            .collect();
        self.valid = true;
        self.rebuilds += 1;
        log::trace!("keyword database rebuilt with {} entries", self.entries.len());
    }

    /// Names of keywords occurring in a text. `None` if the index is stale.
    #[must_use]
    pub fn find(&self, text: &str) -> Option<Vec<String>> {
        if !self.valid {
            return None;
        }
        let text = normalize(text);
        Some(
            self.entries
                .iter()
                .filter(|(pattern, _)| text.contains(pattern.as_str()))
                .map(|(_, name)| name.clone())
                .collect(),
        )
    }
}

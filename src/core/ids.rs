//! Identifiers for schema and document objects.
//!
//! ## Stability
//!
//! - `FieldIndex`: position of a field in its owning schema list. Assigned
//!   once when the field is added and never reused for the schema's lifetime.
//! - `CardId`: allocated by the set when a card is created; survives reordering.
//! - `StyleSheetId`: position of a stylesheet in the set's stylesheet registry.
//! - `KeywordId`: allocated by the set when a keyword is added.
//!
//! All ids are plain indices. Containers hand them out instead of references,
//! so contexts and scripts can point back at the document without owning it.
//!
//! ```
//! use set_script::core::{CardId, FieldIndex};
//!
//! let name = FieldIndex::new(0);
//! assert_eq!(name.index(), 0);
//! assert_eq!(format!("{}", CardId::new(7)), "Card(7)");
//! ```

use serde::{Deserialize, Serialize};

/// Position of a field within its schema (card fields, set fields, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FieldIndex(pub u32);

impl FieldIndex {
    /// Create a new field index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get the index as a `usize` for slice access.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for FieldIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Field({})", self.0)
    }
}

/// Unique identifier for a card in a set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// Stylesheet identifier. Index into the set's stylesheet registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StyleSheetId(pub u16);

impl StyleSheetId {
    /// Create a new stylesheet ID.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Get the index as a `usize` for slice access.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for StyleSheetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StyleSheet({})", self.0)
    }
}

/// Unique identifier for a keyword in a set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct KeywordId(pub u32);

impl KeywordId {
    /// Create a new keyword ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for KeywordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Keyword({})", self.0)
    }
}

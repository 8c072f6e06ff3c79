//! Dependency records.
//!
//! A field's `dependent_scripts` lists everything that must be refreshed
//! when a value of that field changes. Records are appended during
//! discovery and never removed.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{FieldIndex, StyleSheetId};

/// What a dependency record refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependencyKind {
    /// A set value.
    SetField,
    /// A card value of the same card, or every card when no card is known.
    CardField,
    /// A card value of every card.
    CardsField,
    /// A card style of a stylesheet.
    CardStyle,
    /// An extra card field of a stylesheet. Refreshed by the style pass.
    ExtraCardField,
    /// Also notify the dependents of a card field (its value is copied).
    CardCopyDep,
    /// Also notify the dependents of a set field (its value is copied).
    SetCopyDep,
}

/// One dependent of a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependency {
    pub kind: DependencyKind,
    pub index: FieldIndex,
    /// Set for stylesheet-scoped kinds.
    pub stylesheet: Option<StyleSheetId>,
}

impl Dependency {
    /// A set field dependent.
    #[must_use]
    pub const fn set_field(index: FieldIndex) -> Self {
        Self::global(DependencyKind::SetField, index)
    }

    /// A card field dependent.
    #[must_use]
    pub const fn card_field(index: FieldIndex) -> Self {
        Self::global(DependencyKind::CardField, index)
    }

    /// A card field dependent on every card.
    #[must_use]
    pub const fn cards_field(index: FieldIndex) -> Self {
        Self::global(DependencyKind::CardsField, index)
    }

    /// A card style dependent.
    #[must_use]
    pub const fn card_style(index: FieldIndex, stylesheet: StyleSheetId) -> Self {
        Self {
            kind: DependencyKind::CardStyle,
            index,
            stylesheet: Some(stylesheet),
        }
    }

    /// An extra card field dependent.
    #[must_use]
    pub const fn extra_card_field(index: FieldIndex, stylesheet: StyleSheetId) -> Self {
        Self {
            kind: DependencyKind::ExtraCardField,
            index,
            stylesheet: Some(stylesheet),
        }
    }

    /// Forward to the dependents of a card field.
    #[must_use]
    pub const fn card_copy(index: FieldIndex) -> Self {
        Self::global(DependencyKind::CardCopyDep, index)
    }

    /// Forward to the dependents of a set field.
    #[must_use]
    pub const fn set_copy(index: FieldIndex) -> Self {
        Self::global(DependencyKind::SetCopyDep, index)
    }

    const fn global(kind: DependencyKind, index: FieldIndex) -> Self {
        Self {
            kind,
            index,
            stylesheet: None,
        }
    }
}

impl std::fmt::Display for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.stylesheet {
            Some(sheet) => write!(f, "{:?}({}, {})", self.kind, self.index, sheet),
            None => write!(f, "{:?}({})", self.kind, self.index),
        }
    }
}

/// Append-only list of dependents.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dependencies {
    records: SmallVec<[Dependency; 4]>,
}

impl Dependencies {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record. Returns false if it was already present.
    pub fn add(&mut self, dependency: Dependency) -> bool {
        if self.records.contains(&dependency) {
            false
        } else {
            self.records.push(dependency);
            true
        }
    }

    /// Check if a record is present.
    #[must_use]
    pub fn contains(&self, dependency: &Dependency) -> bool {
        self.records.contains(dependency)
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Dependency> {
        self.records.iter()
    }

    /// The records as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Dependency] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a Dependencies {
    type Item = &'a Dependency;
    type IntoIter = std::slice::Iter<'a, Dependency>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_dedups() {
        let mut deps = Dependencies::new();
        assert!(deps.add(Dependency::card_field(FieldIndex(1))));
        assert!(!deps.add(Dependency::card_field(FieldIndex(1))));
        assert!(deps.add(Dependency::set_field(FieldIndex(1))));
        assert_eq!(deps.len(), 2);
    }

    #[test]
    fn test_stylesheet_scope_distinguishes() {
        let mut deps = Dependencies::new();
        deps.add(Dependency::card_style(FieldIndex(0), StyleSheetId(0)));
        deps.add(Dependency::card_style(FieldIndex(0), StyleSheetId(1)));
        assert_eq!(deps.len(), 2);
        assert!(deps.contains(&Dependency::card_style(FieldIndex(0), StyleSheetId(1))));
    }

    #[test]
    fn test_insertion_order() {
        let mut deps = Dependencies::new();
        deps.add(Dependency::set_copy(FieldIndex(4)));
        deps.add(Dependency::cards_field(FieldIndex(2)));
        let kinds: Vec<_> = deps.iter().map(|d| d.kind).collect();
        assert_eq!(kinds, vec![DependencyKind::SetCopyDep, DependencyKind::CardsField]);
    }

    #[test]
    fn test_display() {
        assert_eq!(Dependency::card_field(FieldIndex(3)).to_string(), "CardField(Field(3))");
        assert_eq!(
            Dependency::extra_card_field(FieldIndex(0), StyleSheetId(2)).to_string(),
            "ExtraCardField(Field(0), StyleSheet(2))"
        );
    }
}

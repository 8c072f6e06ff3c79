//! Game schemas.
//!
//! A `Game` declares the card and set fields every set of that game has,
//! plus an init script run once per context. Besides per-field dependents
//! it carries three game-wide dependent lists, for scripts reading the card
//! list, the keyword list, or the active stylesheet.

use serde::{Deserialize, Serialize};

use crate::core::{FieldIndex, FieldMap};
use crate::dependency::{Dependencies, Dependency};
use crate::script::Script;

use super::field::Field;

/// A game-wide dependent list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependentList {
    /// Scripts reading the card list.
    Cards,
    /// Scripts reading the keyword list.
    Keywords,
    /// Scripts reading the active stylesheet.
    StyleSheet,
}

/// A game schema.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Game {
    pub name: String,
    pub init_script: Option<Script>,
    card_fields: FieldMap<Field>,
    set_fields: FieldMap<Field>,
    #[serde(skip)]
    pub(crate) dependencies_initialized: bool,
    #[serde(skip)]
    dependent_scripts_cards: Dependencies,
    #[serde(skip)]
    dependent_scripts_keywords: Dependencies,
    #[serde(skip)]
    dependent_scripts_stylesheet: Dependencies,
}

impl Game {
    /// Create an empty game.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            init_script: None,
            card_fields: FieldMap::default(),
            set_fields: FieldMap::default(),
            dependencies_initialized: false,
            dependent_scripts_cards: Dependencies::new(),
            dependent_scripts_keywords: Dependencies::new(),
            dependent_scripts_stylesheet: Dependencies::new(),
        }
    }

    /// Add a card field.
    #[must_use]
    pub fn with_card_field(mut self, mut field: Field) -> Self {
        field.assign_index(FieldIndex(self.card_fields.len() as u32));
        self.card_fields.push(field);
        self
    }

    /// Add a set field.
    #[must_use]
    pub fn with_set_field(mut self, mut field: Field) -> Self {
        field.assign_index(FieldIndex(self.set_fields.len() as u32));
        self.set_fields.push(field);
        self
    }

    /// Set the init script.
    #[must_use]
    pub fn with_init_script(mut self, script: impl Into<Script>) -> Self {
        self.init_script = Some(script.into());
        self
    }

    #[must_use]
    pub fn card_fields(&self) -> &FieldMap<Field> {
        &self.card_fields
    }

    #[must_use]
    pub fn set_fields(&self) -> &FieldMap<Field> {
        &self.set_fields
    }

    pub(crate) fn card_fields_mut(&mut self) -> &mut FieldMap<Field> {
        &mut self.card_fields
    }

    pub(crate) fn set_fields_mut(&mut self) -> &mut FieldMap<Field> {
        &mut self.set_fields
    }

    /// Index of a card field by name.
    #[must_use]
    pub fn card_field_index(&self, name: &str) -> Option<FieldIndex> {
        self.card_fields.iter().find(|f| f.name == name).map(Field::index)
    }

    /// Index of a set field by name.
    #[must_use]
    pub fn set_field_index(&self, name: &str) -> Option<FieldIndex> {
        self.set_fields.iter().find(|f| f.name == name).map(Field::index)
    }

    /// Check if game-level dependencies were discovered.
    #[must_use]
    pub fn dependencies_initialized(&self) -> bool {
        self.dependencies_initialized
    }

    /// A game-wide dependent list.
    #[must_use]
    pub fn dependents(&self, list: DependentList) -> &Dependencies {
        match list {
            DependentList::Cards => &self.dependent_scripts_cards,
            DependentList::Keywords => &self.dependent_scripts_keywords,
            DependentList::StyleSheet => &self.dependent_scripts_stylesheet,
        }
    }

    pub(crate) fn add_dependent(&mut self, list: DependentList, dependency: Dependency) -> bool {
        match list {
            DependentList::Cards => self.dependent_scripts_cards.add(dependency),
            DependentList::Keywords => self.dependent_scripts_keywords.add(dependency),
            DependentList::StyleSheet => self.dependent_scripts_stylesheet.add(dependency),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_assigned_in_order() {
        let game = Game::new("g")
            .with_card_field(Field::text("name"))
            .with_card_field(Field::text("cost"))
            .with_set_field(Field::text("title"));
        assert_eq!(game.card_field_index("cost"), Some(FieldIndex(1)));
        assert_eq!(game.card_fields()[FieldIndex(1)].index(), FieldIndex(1));
        assert_eq!(game.set_field_index("title"), Some(FieldIndex(0)));
        assert_eq!(game.set_field_index("name"), None);
    }

    #[test]
    fn test_dependent_lists() {
        let mut game = Game::new("g");
        assert!(game.add_dependent(DependentList::Cards, Dependency::set_field(FieldIndex(0))));
        assert!(!game.add_dependent(DependentList::Cards, Dependency::set_field(FieldIndex(0))));
        assert_eq!(game.dependents(DependentList::Cards).len(), 1);
        assert!(game.dependents(DependentList::Keywords).is_empty());
        assert!(!game.dependencies_initialized());
    }
}

//! Stylesheets.
//!
//! A stylesheet lays out the fields of a game: one style per card field,
//! plus its own extra card fields (per-card values only this stylesheet
//! knows about) and styling fields (options set per set or per card).

use crate::core::{FieldIndex, FieldMap, GeometryConfig, StyleSheetId};
use crate::script::Script;

use super::field::Field;
use super::game::Game;
use super::style::Style;
use super::value::Value;

/// A stylesheet of a game.
#[derive(Clone, Debug)]
pub struct StyleSheet {
    id: StyleSheetId,
    pub name: String,
    pub init_script: Option<Script>,
    pub card_width: f64,
    pub card_height: f64,
    pub card_dpi: f64,
    card_style: FieldMap<Style>,
    extra_card_fields: FieldMap<Field>,
    extra_card_style: FieldMap<Style>,
    styling_fields: FieldMap<Field>,
    geometry: GeometryConfig,
    pub(crate) dependencies_initialized: bool,
}

impl StyleSheet {
    /// Create a stylesheet with a default style for every card field.
    #[must_use]
    pub fn for_game(name: impl Into<String>, game: &Game, geometry: &GeometryConfig) -> Self {
        Self {
            id: StyleSheetId(0),
            name: name.into(),
            init_script: None,
            card_width: 375.0,
            card_height: 523.0,
            card_dpi: 150.0,
            card_style: FieldMap::new(game.card_fields().len(), |i| Style::new(i, geometry)),
            extra_card_fields: FieldMap::default(),
            extra_card_style: FieldMap::default(),
            styling_fields: FieldMap::default(),
            geometry: geometry.clone(),
            dependencies_initialized: false,
        }
    }

    /// Set the card size.
    #[must_use]
    pub fn with_card_size(mut self, width: f64, height: f64) -> Self {
        self.card_width = width;
        self.card_height = height;
        self
    }

    /// Set the init script.
    #[must_use]
    pub fn with_init_script(mut self, script: impl Into<Script>) -> Self {
        self.init_script = Some(script.into());
        self
    }

    /// Configure the style of a card field.
    ///
    /// # Panics
    ///
    /// Panics if the game has no card field at `field`.
    #[must_use]
    pub fn with_card_style(mut self, field: FieldIndex, build: impl FnOnce(Style) -> Style) -> Self {
        assert!(
            field.index() < self.card_style.len(),
            "no card field at {field}"
        );
        let style = Style::new(field, &self.geometry);
        self.card_style[field] = build(style);
        self
    }

    /// Add an extra card field and its style.
    #[must_use]
    pub fn with_extra_card_field(mut self, mut field: Field, build: impl FnOnce(Style) -> Style) -> Self {
        let index = FieldIndex(self.extra_card_fields.len() as u32);
        field.assign_index(index);
        self.extra_card_fields.push(field);
        self.extra_card_style.push(build(Style::new(index, &self.geometry)));
        self
    }

    /// Add a styling field.
    #[must_use]
    pub fn with_styling_field(mut self, mut field: Field) -> Self {
        field.assign_index(FieldIndex(self.styling_fields.len() as u32));
        self.styling_fields.push(field);
        self
    }

    #[must_use]
    pub fn id(&self) -> StyleSheetId {
        self.id
    }

    pub(crate) fn assign_id(&mut self, id: StyleSheetId) {
        self.id = id;
    }

    /// Check if stylesheet-level dependencies were discovered.
    #[must_use]
    pub fn dependencies_initialized(&self) -> bool {
        self.dependencies_initialized
    }

    #[must_use]
    pub fn card_style(&self) -> &FieldMap<Style> {
        &self.card_style
    }

    #[must_use]
    pub fn extra_card_style(&self) -> &FieldMap<Style> {
        &self.extra_card_style
    }

    #[must_use]
    pub fn extra_card_fields(&self) -> &FieldMap<Field> {
        &self.extra_card_fields
    }

    #[must_use]
    pub fn styling_fields(&self) -> &FieldMap<Field> {
        &self.styling_fields
    }

    pub(crate) fn extra_card_fields_mut(&mut self) -> &mut FieldMap<Field> {
        &mut self.extra_card_fields
    }

    pub(crate) fn styling_fields_mut(&mut self) -> &mut FieldMap<Field> {
        &mut self.styling_fields
    }

    /// A card style (`extra == false`) or extra card style.
    #[must_use]
    pub fn style(&self, field: FieldIndex, extra: bool) -> Option<&Style> {
        if extra {
            self.extra_card_style.get(field)
        } else {
            self.card_style.get(field)
        }
    }

    /// A style, mutably.
    pub fn style_mut(&mut self, field: FieldIndex, extra: bool) -> Option<&mut Style> {
        if extra {
            self.extra_card_style.get_mut(field)
        } else {
            self.card_style.get_mut(field)
        }
    }

    /// Index of an extra card field by name.
    #[must_use]
    pub fn extra_card_field_index(&self, name: &str) -> Option<FieldIndex> {
        self.extra_card_fields
            .iter()
            .find(|f| f.name == name)
            .map(Field::index)
    }

    /// Index of a styling field by name.
    #[must_use]
    pub fn styling_field_index(&self, name: &str) -> Option<FieldIndex> {
        self.styling_fields
            .iter()
            .find(|f| f.name == name)
            .map(Field::index)
    }

    /// Fresh styling values.
    #[must_use]
    pub fn new_styling_values(&self) -> FieldMap<Value> {
        FieldMap::from_vec(self.styling_fields.iter().map(Field::new_value).collect())
    }

    /// Fresh extra card values.
    #[must_use]
    pub fn new_extra_values(&self) -> FieldMap<Value> {
        FieldMap::from_vec(self.extra_card_fields.iter().map(Field::new_value).collect())
    }
}

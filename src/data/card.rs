//! Cards.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::{CardId, FieldMap, StyleSheetId};

use super::game::Game;
use super::stylesheet::StyleSheet;
use super::value::Value;

/// A card: one value per card field, plus per-stylesheet extras.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Card {
    id: CardId,
    /// One value per card field of the game.
    pub data: FieldMap<Value>,
    /// Stylesheet override; `None` uses the set's stylesheet.
    pub stylesheet: Option<StyleSheetId>,
    /// Own styling data, overriding the set's styling data for this card.
    pub styling_data: Option<FieldMap<Value>>,
    /// Extra card values, per stylesheet.
    pub extra_data: FxHashMap<StyleSheetId, FieldMap<Value>>,
}

impl Card {
    /// Create a card with fresh values for every card field.
    #[must_use]
    pub fn new(id: CardId, game: &Game) -> Self {
        Self {
            id,
            data: FieldMap::from_vec(game.card_fields().iter().map(|f| f.new_value()).collect()),
            stylesheet: None,
            styling_data: None,
            extra_data: FxHashMap::default(),
        }
    }

    #[must_use]
    pub fn id(&self) -> CardId {
        self.id
    }

    /// Use a specific stylesheet for this card.
    #[must_use]
    pub fn with_stylesheet(mut self, stylesheet: StyleSheetId) -> Self {
        self.stylesheet = Some(stylesheet);
        self
    }

    /// Give this card its own styling data for a stylesheet.
    #[must_use]
    pub fn with_own_styling(mut self, sheet: &StyleSheet) -> Self {
        self.styling_data = Some(sheet.new_styling_values());
        self
    }

    /// Make sure extra values exist for a stylesheet.
    pub fn ensure_extra_data(&mut self, sheet: &StyleSheet) -> &mut FieldMap<Value> {
        self.extra_data
            .entry(sheet.id())
            .or_insert_with(|| sheet.new_extra_values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FieldIndex;
    use crate::data::Field;
    use crate::script::ScriptValue;

    #[test]
    fn test_new_card_has_initial_values() {
        let game = Game::new("g")
            .with_card_field(Field::text("name").with_initial("unnamed"))
            .with_card_field(Field::text("cost"));
        let card = Card::new(CardId(4), &game);
        assert_eq!(card.id(), CardId(4));
        assert_eq!(card.data.len(), 2);
        assert_eq!(
            card.data[FieldIndex(0)].script_value(),
            ScriptValue::from("unnamed")
        );
        assert_eq!(card.data[FieldIndex(1)].field(), FieldIndex(1));
        assert!(card.stylesheet.is_none());
    }
}

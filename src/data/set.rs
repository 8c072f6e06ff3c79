//! The set: the document being edited.
//!
//! A set owns its game schema, its stylesheets, its cards, set values,
//! styling values and keywords. Everything in it is addressed by ids and
//! field indices; [`ValueRef`] names a single value anywhere in the set.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::core::{
    Age, CardId, EngineError, FieldIndex, FieldMap, KeywordId, StructuralError, StyleSheetId,
};
use crate::script::{Context, ScriptEngine};

use super::card::Card;
use super::field::Field;
use super::game::Game;
use super::keyword::{Keyword, KeywordDatabase, KeywordSlot};
use super::stylesheet::StyleSheet;
use super::value::{Value, ValueRef};

/// A card set.
#[derive(Clone, Debug)]
pub struct Set {
    game: Game,
    stylesheets: Vec<StyleSheet>,
    stylesheet: StyleSheetId,
    data: FieldMap<Value>,
    styling_data: FxHashMap<StyleSheetId, FieldMap<Value>>,
    cards: Vec<Card>,
    positions: FxHashMap<CardId, usize>,
    next_card: u32,
    keywords: Vec<Keyword>,
    next_keyword: u32,
    keyword_fields: FieldMap<Field>,
    keyword_db: KeywordDatabase,
    order_cache: FxHashMap<FieldIndex, Vec<CardId>>,
}

impl Set {
    /// Create an empty set of a game with its default stylesheet.
    pub fn new(game: Game, stylesheet: StyleSheet) -> Result<Self, StructuralError> {
        let data = FieldMap::from_vec(game.set_fields().iter().map(Field::new_value).collect());
        let keyword_fields = KeywordSlot::ALL
            .iter()
            .fold(FieldMap::default(), |mut fields, slot| {
                let mut field = Field::text(slot.name());
                field.assign_index(slot.field_index());
                fields.push(field);
                fields
            });
        let mut set = Self {
            game,
            stylesheets: Vec::new(),
            stylesheet: StyleSheetId(0),
            data,
            styling_data: FxHashMap::default(),
            cards: Vec::new(),
            positions: FxHashMap::default(),
            next_card: 0,
            keywords: Vec::new(),
            next_keyword: 0,
            keyword_fields,
            keyword_db: KeywordDatabase::new(),
            order_cache: FxHashMap::default(),
        };
        set.stylesheet = set.register_stylesheet(stylesheet)?;
        Ok(set)
    }

    /// Add another stylesheet of the same game.
    pub fn register_stylesheet(&mut self, mut sheet: StyleSheet) -> Result<StyleSheetId, StructuralError> {
        if sheet.card_style().len() != self.game.card_fields().len() {
            return Err(StructuralError::Placeholder(format!(
                "stylesheet '{}' has {} card styles for {} card fields",
                sheet.name,
                sheet.card_style().len(),
                self.game.card_fields().len()
            )));
        }
        let id = StyleSheetId(self.stylesheets.len() as u16);
        sheet.assign_id(id);
        self.styling_data.insert(id, sheet.new_styling_values());
        self.stylesheets.push(sheet);
        Ok(id)
    }

    // === Schema ===

    #[must_use]
    pub fn game(&self) -> &Game {
        &self.game
    }

    pub(crate) fn game_mut(&mut self) -> &mut Game {
        &mut self.game
    }

    /// The set's stylesheet.
    #[must_use]
    pub fn stylesheet_id(&self) -> StyleSheetId {
        self.stylesheet
    }

    /// Switch the set's stylesheet.
    pub fn set_stylesheet_id(&mut self, id: StyleSheetId) -> Result<(), StructuralError> {
        self.stylesheet(id)?;
        self.stylesheet = id;
        Ok(())
    }

    #[must_use]
    pub fn stylesheets(&self) -> &[StyleSheet] {
        &self.stylesheets
    }

    pub fn stylesheet(&self, id: StyleSheetId) -> Result<&StyleSheet, StructuralError> {
        self.stylesheets
            .get(id.index())
            .ok_or(StructuralError::UnknownStyleSheet(id))
    }

    pub fn stylesheet_mut(&mut self, id: StyleSheetId) -> Result<&mut StyleSheet, StructuralError> {
        self.stylesheets
            .get_mut(id.index())
            .ok_or(StructuralError::UnknownStyleSheet(id))
    }

    /// The stylesheet used for a card, or the set's for `None`.
    pub fn stylesheet_for(&self, card: Option<CardId>) -> Result<StyleSheetId, StructuralError> {
        match card {
            Some(card) => Ok(self.card(card)?.stylesheet.unwrap_or(self.stylesheet)),
            None => Ok(self.stylesheet),
        }
    }

    // === Cards ===

    /// Cards in set order.
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Card ids in set order.
    #[must_use]
    pub fn card_ids(&self) -> Vec<CardId> {
        self.cards.iter().map(Card::id).collect()
    }

    pub fn card(&self, id: CardId) -> Result<&Card, StructuralError> {
        self.positions
            .get(&id)
            .map(|&i| &self.cards[i])
            .ok_or(StructuralError::UnknownCard(id))
    }

    pub fn card_mut(&mut self, id: CardId) -> Result<&mut Card, StructuralError> {
        match self.positions.get(&id) {
            Some(&i) => Ok(&mut self.cards[i]),
            None => Err(StructuralError::UnknownCard(id)),
        }
    }

    /// Create a card with a fresh id. It is not part of the set until
    /// inserted.
    pub fn new_card(&mut self) -> Card {
        let id = CardId(self.next_card);
        self.next_card += 1;
        Card::new(id, &self.game)
    }

    /// Append a card.
    pub fn insert_card(&mut self, mut card: Card) -> Result<CardId, StructuralError> {
        let id = card.id();
        if self.positions.contains_key(&id) {
            return Err(StructuralError::DuplicateCard(id));
        }
        let sheet = self.stylesheet(card.stylesheet.unwrap_or(self.stylesheet))?;
        card.ensure_extra_data(sheet);
        self.next_card = self.next_card.max(id.raw() + 1);
        self.positions.insert(id, self.cards.len());
        self.cards.push(card);
        Ok(id)
    }

    /// Remove a card.
    pub fn remove_card(&mut self, id: CardId) -> Result<Card, StructuralError> {
        let index = *self.positions.get(&id).ok_or(StructuralError::UnknownCard(id))?;
        let card = self.cards.remove(index);
        self.reindex();
        Ok(card)
    }

    /// Put the cards in a new order. `order` must be a permutation of the
    /// current cards.
    pub fn reorder_cards(&mut self, order: &[CardId]) -> Result<(), StructuralError> {
        if order.len() != self.cards.len() {
            return Err(StructuralError::Placeholder(format!(
                "card order has {} entries for {} cards",
                order.len(),
                self.cards.len()
            )));
        }
        let mut seen = FxHashSet::default();
        for id in order {
            if !self.positions.contains_key(id) {
                return Err(StructuralError::UnknownCard(*id));
            }
            if !seen.insert(*id) {
                return Err(StructuralError::DuplicateCard(*id));
            }
        }
        let mut slots: Vec<Option<Card>> = std::mem::take(&mut self.cards).into_iter().map(Some).collect();
        let positions = &self.positions;
        self.cards = order
            .iter()
            .filter_map(|id| positions.get(id).and_then(|&i| slots[i].take()))
            .collect();
        self.reindex();
        Ok(())
    }

    fn reindex(&mut self) {
        self.positions = self
            .cards
            .iter()
            .enumerate()
            .map(|(i, card)| (card.id(), i))
            .collect();
    }

    /// Make sure a card has extra values for a stylesheet.
    pub fn ensure_extra_data(&mut self, card: CardId, stylesheet: StyleSheetId) -> Result<(), StructuralError> {
        let index = *self.positions.get(&card).ok_or(StructuralError::UnknownCard(card))?;
        let sheet = self
            .stylesheets
            .get(stylesheet.index())
            .ok_or(StructuralError::UnknownStyleSheet(stylesheet))?;
        self.cards[index].ensure_extra_data(sheet);
        Ok(())
    }

    // === Values ===

    /// Set values.
    #[must_use]
    pub fn data(&self) -> &FieldMap<Value> {
        &self.data
    }

    /// Styling values of a stylesheet; a card's own styling data wins.
    pub fn styling_values(
        &self,
        stylesheet: StyleSheetId,
        card: Option<CardId>,
    ) -> Result<&FieldMap<Value>, StructuralError> {
        if let Some(card) = card {
            if let Some(own) = &self.card(card)?.styling_data {
                return Ok(own);
            }
        }
        self.styling_data
            .get(&stylesheet)
            .ok_or(StructuralError::UnknownStyleSheet(stylesheet))
    }

    /// Extra values of a card for a stylesheet.
    pub fn extra_values(&self, card: CardId, stylesheet: StyleSheetId) -> Result<&FieldMap<Value>, StructuralError> {
        self.card(card)?
            .extra_data
            .get(&stylesheet)
            .ok_or_else(|| StructuralError::MissingValue(format!("{card}.extra[{stylesheet}]")))
    }

    /// The field a value belongs to.
    pub fn field_for(&self, loc: ValueRef) -> Result<&Field, StructuralError> {
        let missing = || StructuralError::MissingValue(loc.to_string());
        match loc {
            ValueRef::Set(field) => self.game.set_fields().get(field).ok_or_else(missing),
            ValueRef::Card(_, field) => self.game.card_fields().get(field).ok_or_else(missing),
            ValueRef::Styling {
                stylesheet, field, ..
            } => self
                .stylesheet(stylesheet)?
                .styling_fields()
                .get(field)
                .ok_or_else(missing),
            ValueRef::ExtraCard {
                stylesheet, field, ..
            } => self
                .stylesheet(stylesheet)?
                .extra_card_fields()
                .get(field)
                .ok_or_else(missing),
            ValueRef::Keyword(_, slot) => self.keyword_fields.get(slot.field_index()).ok_or_else(missing),
        }
    }

    /// The value at an address.
    pub fn value(&self, loc: ValueRef) -> Result<&Value, StructuralError> {
        let missing = || StructuralError::MissingValue(loc.to_string());
        match loc {
            ValueRef::Set(field) => self.data.get(field).ok_or_else(missing),
            ValueRef::Card(card, field) => self.card(card)?.data.get(field).ok_or_else(missing),
            ValueRef::Styling {
                stylesheet,
                card,
                field,
            } => self.styling_values(stylesheet, card)?.get(field).ok_or_else(missing),
            ValueRef::ExtraCard {
                card,
                stylesheet,
                field,
            } => self.extra_values(card, stylesheet)?.get(field).ok_or_else(missing),
            ValueRef::Keyword(keyword, slot) => Ok(self.keyword(keyword)?.value(slot)),
        }
    }

    /// The value at an address, mutably.
    pub fn value_mut(&mut self, loc: ValueRef) -> Result<&mut Value, StructuralError> {
        let missing = || StructuralError::MissingValue(loc.to_string());
        match loc {
            ValueRef::Set(field) => self.data.get_mut(field).ok_or_else(missing),
            ValueRef::Card(card, field) => self.card_mut(card)?.data.get_mut(field).ok_or_else(missing),
            ValueRef::Styling {
                stylesheet,
                card,
                field,
            } => {
                if let Some(card) = card {
                    let own = self.card_mut(card)?.styling_data.is_some();
                    if own {
                        return self
                            .card_mut(card)?
                            .styling_data
                            .as_mut()
                            .and_then(|data| data.get_mut(field))
                            .ok_or_else(missing);
                    }
                }
                self.styling_data
                    .get_mut(&stylesheet)
                    .ok_or(StructuralError::UnknownStyleSheet(stylesheet))?
                    .get_mut(field)
                    .ok_or_else(missing)
            }
            ValueRef::ExtraCard {
                card,
                stylesheet,
                field,
            } => self
                .card_mut(card)?
                .extra_data
                .get_mut(&stylesheet)
                .and_then(|data| data.get_mut(field))
                .ok_or_else(missing),
            ValueRef::Keyword(keyword, slot) => Ok(self.keyword_mut(keyword)?.value_mut(slot)),
        }
    }

    /// Recompute one value. Returns whether its content changed. On a
    /// script error nothing is stored.
    pub fn update_value<E: ScriptEngine + ?Sized>(
        &mut self,
        engine: &E,
        ctx: &mut Context,
        loc: ValueRef,
        age: Age,
    ) -> Result<bool, EngineError> {
        if let ValueRef::Keyword(keyword, slot) = loc {
            let keyword = self.keyword_mut(keyword)?;
            let text = keyword.text(slot).to_string();
            return Ok(keyword.value_mut(slot).retrieve(&text, age));
        }
        let (content, sort) = {
            let field = self.field_for(loc)?;
            let value = self.value(loc)?;
            field.evaluate(engine, ctx, self, &value.script_value(), value.is_default())?
        };
        Ok(self.value_mut(loc)?.commit(content, sort, age))
    }

    // === Keywords ===

    #[must_use]
    pub fn keywords(&self) -> &[Keyword] {
        &self.keywords
    }

    pub fn keyword(&self, id: KeywordId) -> Result<&Keyword, StructuralError> {
        self.keywords
            .iter()
            .find(|kw| kw.id() == id)
            .ok_or(StructuralError::UnknownKeyword(id))
    }

    pub fn keyword_mut(&mut self, id: KeywordId) -> Result<&mut Keyword, StructuralError> {
        self.keywords
            .iter_mut()
            .find(|kw| kw.id() == id)
            .ok_or(StructuralError::UnknownKeyword(id))
    }

    /// Add a keyword, assigning its id.
    pub fn add_keyword(&mut self, mut keyword: Keyword) -> KeywordId {
        let id = KeywordId(self.next_keyword);
        self.next_keyword += 1;
        keyword.assign_id(id);
        self.keywords.push(keyword);
        self.keyword_db.clear();
        id
    }

    /// Remove a keyword.
    pub fn remove_keyword(&mut self, id: KeywordId) -> Result<Keyword, StructuralError> {
        let index = self
            .keywords
            .iter()
            .position(|kw| kw.id() == id)
            .ok_or(StructuralError::UnknownKeyword(id))?;
        self.keyword_db.clear();
        Ok(self.keywords.remove(index))
    }

    #[must_use]
    pub fn keyword_db(&self) -> &KeywordDatabase {
        &self.keyword_db
    }

    /// Invalidate the keyword database.
    pub fn clear_keyword_db(&mut self) {
        self.keyword_db.clear();
    }

    /// Rebuild the keyword database if it is stale.
    pub fn refresh_keyword_db(&mut self) {
        if !self.keyword_db.is_valid() {
            self.keyword_db.rebuild(&self.keywords);
        }
    }

    /// Names of keywords occurring in a text. Uses the database when it is
    /// current and scans the keyword list otherwise.
    #[must_use]
    pub fn find_keywords(&self, text: &str) -> Vec<String> {
        self.keyword_db.find(text).unwrap_or_else(|| {
            self.keywords
                .iter()
                .filter(|kw| kw.occurs_in(text))
                .map(|kw| kw.name().to_string())
                .collect()
        })
    }

    // === Ordering ===

    /// Cards sorted by a card field's sort value. Memoized until
    /// [`clear_order_cache`](Self::clear_order_cache).
    pub fn card_order(&mut self, field: FieldIndex) -> Result<&[CardId], StructuralError> {
        if self.game.card_fields().get(field).is_none() {
            return Err(StructuralError::MissingValue(format!("card field {field}")));
        }
        let cards = &self.cards;
        let order = self.order_cache.entry(field).or_insert_with(|| {
            let mut sorted: Vec<&Card> = cards.iter().collect();
            sorted.sort_by(|a, b| a.data[field].sort_value().cmp(b.data[field].sort_value()));
            sorted.into_iter().map(Card::id).collect()
        });
        Ok(order.as_slice())
    }

    /// Forget memoized card orders.
    pub fn clear_order_cache(&mut self) {
        self.order_cache.clear();
    }

    /// Number of memoized card orders.
    #[must_use]
    pub fn cached_orders(&self) -> usize {
        self.order_cache.len()
    }
}

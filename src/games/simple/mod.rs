//! Simple creature-card game for exercising the engine.
//!
//! A minimal schema that still covers every kind of dependency:
//! - plain card fields (`name`, `cost`, `power`, `toughness`, `type`, `rules`)
//! - scripted card fields reading other card fields (`title`, `pt`)
//! - a card field that only copies another one (`heading`)
//! - a card field reading the keyword list (`keywords_found`)
//! - set fields reading the card list (`card_count`, `summary`)
//! - a stylesheet with fixed, scripted and content-dependent styles, an
//!   extra card field and a styling field

mod game;

pub use game::{SimpleGame, CARD_FIELDS, SET_FIELDS};

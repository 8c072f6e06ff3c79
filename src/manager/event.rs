//! Document mutation events.
//!
//! Every change to a set that can affect script results is described by a
//! `SetEvent`. The manager matches on it to decide what a propagation round
//! is seeded with. Events are delivered after the change has been applied.

use serde::{Deserialize, Serialize};

use crate::core::{CardId, KeywordId};
use crate::data::{KeywordSlot, ValueRef};

/// A change that was applied to a set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetEvent {
    /// A single value was edited, on a card or at set scope.
    ValueEdited { value: ValueRef },

    /// A keyword's text slot was edited.
    KeywordTextEdited { keyword: KeywordId, slot: KeywordSlot },

    /// Cards were added. Their values are computed once before the card
    /// list dependents run.
    CardsAdded { cards: Vec<CardId> },

    /// Cards were removed.
    CardsRemoved { cards: Vec<CardId> },

    /// Cards were reordered.
    CardsReordered,

    /// Keywords were added or removed.
    KeywordListChanged,

    /// A keyword's mode changed.
    KeywordModeChanged { keyword: KeywordId },

    /// One card switched stylesheet.
    CardStyleSheetChanged { card: CardId },

    /// The set switched stylesheet.
    SetStyleSheetChanged,
}

impl SetEvent {
    /// Short name for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            SetEvent::ValueEdited { .. } => "value edited",
            SetEvent::KeywordTextEdited { .. } => "keyword text edited",
            SetEvent::CardsAdded { .. } => "cards added",
            SetEvent::CardsRemoved { .. } => "cards removed",
            SetEvent::CardsReordered => "cards reordered",
            SetEvent::KeywordListChanged => "keyword list changed",
            SetEvent::KeywordModeChanged { .. } => "keyword mode changed",
            SetEvent::CardStyleSheetChanged { .. } => "card stylesheet changed",
            SetEvent::SetStyleSheetChanged => "set stylesheet changed",
        }
    }

    /// Whether the event changes the card list.
    #[must_use]
    pub const fn touches_card_list(&self) -> bool {
        matches!(
            self,
            SetEvent::CardsAdded { .. } | SetEvent::CardsRemoved { .. } | SetEvent::CardsReordered
        )
    }
}

impl std::fmt::Display for SetEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SetEvent::ValueEdited { value } => write!(f, "{}: {value}", self.name()),
            SetEvent::KeywordTextEdited { keyword, slot } => {
                write!(f, "{}: {keyword}.{}", self.name(), slot.name())
            }
            SetEvent::CardsAdded { cards } | SetEvent::CardsRemoved { cards } => {
                write!(f, "{}: {} card(s)", self.name(), cards.len())
            }
            SetEvent::KeywordModeChanged { keyword } => write!(f, "{}: {keyword}", self.name()),
            SetEvent::CardStyleSheetChanged { card } => write!(f, "{}: {card}", self.name()),
            _ => f.write_str(self.name()),
        }
    }
}

//! Game core of a flip-two-cards memory matching game.
//!
//! The crate holds everything that is not presentation: level presets, dealing, the flip/match state machine,
//! best-score bookkeeping and the traits the host implements for persistence and haptic/sound feedback.

use core::ops::Index;
use serde::{Deserialize, Serialize};

pub use card::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use feedback::*;
pub use generator::*;
pub use level::*;
pub use schedule::*;
pub use score::*;
pub use timer::*;
pub use utils::*;

mod card;
mod config;
mod engine;
mod error;
mod feedback;
mod generator;
mod level;
mod schedule;
mod score;
mod timer;
mod utils;

/// Ordered cards dealt for one play session, every value appears on exactly two cards with distinct ids.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDeck")]
pub struct Deck {
    cards: Vec<Card>,
}

#[derive(Deserialize)]
struct RawDeck {
    cards: Vec<Card>,
}

impl TryFrom<RawDeck> for Deck {
    type Error = GameError;

    fn try_from(raw: RawDeck) -> Result<Self> {
        Self::from_cards(raw.cards)
    }
}

impl Deck {
    pub(crate) const fn new_unchecked(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    /// Builds a deck from existing cards, checking that ids are unique and values pair up.
    pub fn from_cards(cards: Vec<Card>) -> Result<Self> {
        for (index, card) in cards.iter().enumerate() {
            if cards[..index].iter().any(|other| other.id == card.id) {
                return Err(GameError::DuplicateCardId(card.id.to_string()));
            }
            let count = cards.iter().filter(|other| other.value == card.value).count();
            if count != 2 {
                return Err(GameError::IncompletePair {
                    value: card.value.clone(),
                    count,
                });
            }
        }
        Ok(Self::new_unchecked(cards))
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn pairs(&self) -> usize {
        self.cards.len() / 2
    }

    pub fn get(&self, id: &str) -> Option<&Card> {
        self.cards.iter().find(|card| card.id.as_str() == id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Card> {
        self.cards.iter_mut().find(|card| card.id.as_str() == id)
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Card> {
        self.cards.iter_mut()
    }

    pub fn matched_count(&self) -> usize {
        self.cards.iter().filter(|card| card.is_matched).count()
    }
}

impl Index<usize> for Deck {
    type Output = Card;

    fn index(&self, index: usize) -> &Self::Output {
        &self.cards[index]
    }
}

/// Outcome of flipping a card.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlipOutcome {
    /// Flip rejected, nothing changed.
    NoChange,
    /// First card of a pair is face up.
    Flipped,
    Matched,
    /// Both cards stay face up until the scheduled flip back.
    Mismatched,
    /// Last pair matched.
    Completed,
}

impl FlipOutcome {
    /// Whether this outcome could have caused an update to the game
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }

    /// Whether a pair decision was made, i.e. an attempt was counted
    pub const fn is_attempt(self) -> bool {
        matches!(self, Self::Matched | Self::Mismatched | Self::Completed)
    }
}

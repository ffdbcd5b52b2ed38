use core::fmt;
use serde::{Deserialize, Serialize};

/// Identifies one physical card, both cards of a pair have distinct ids.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CardId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for CardId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Symbol shown on the face of a card, two cards of the deck share it.
pub type CardValue = String;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub value: CardValue,
    pub is_flipped: bool,
    pub is_matched: bool,
}

impl Card {
    /// Face-down, unresolved card.
    pub fn new(id: impl Into<CardId>, value: impl Into<CardValue>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
            is_flipped: false,
            is_matched: false,
        }
    }

    /// Whether the card can still be turned face up.
    pub const fn is_flippable(&self) -> bool {
        !self.is_flipped && !self.is_matched
    }

    pub(crate) fn flip_up(&mut self) {
        self.is_flipped = true;
    }

    pub(crate) fn flip_down(&mut self) {
        if !self.is_matched {
            self.is_flipped = false;
        }
    }

    pub(crate) fn mark_matched(&mut self) {
        self.is_matched = true;
        self.is_flipped = true;
    }
}

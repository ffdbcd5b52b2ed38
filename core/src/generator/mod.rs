use rand::Rng;

use crate::*;
pub use random::*;

mod random;

pub trait DeckGenerator {
    fn generate(self, level: &DifficultyLevel) -> Deck;
}

/// Deals two face-down cards for each of the level's first `pairs` values and shuffles them.
pub fn generate_deck<R: Rng>(level: &DifficultyLevel, rng: &mut R) -> Deck {
    let mut cards = Vec::with_capacity(level.pairs() * 2);
    for (index, value) in level.dealt_values().iter().enumerate() {
        cards.push(Card::new(format!("{value}_1_{index}"), value.clone()));
        cards.push(Card::new(format!("{value}_2_{index}"), value.clone()));
    }
    log::debug!(
        "Dealt {} cards for level {:?}",
        cards.len(),
        level.id()
    );
    Deck::new_unchecked(shuffle(&cards, rng))
}

use rand::SeedableRng;
use rand::rngs::SmallRng;

use super::*;

/// Purely random dealing from a fixed seed, the same seed always deals the same order.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomDeckGenerator {
    seed: u64,
}

impl RandomDeckGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl DeckGenerator for RandomDeckGenerator {
    fn generate(self, level: &DifficultyLevel) -> Deck {
        let mut rng = SmallRng::seed_from_u64(self.seed);
        generate_deck(level, &mut rng)
    }
}

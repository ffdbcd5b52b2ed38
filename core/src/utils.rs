use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::*;

/// Returns a shuffled copy of `items`, leaving the input untouched.
///
/// Plain Fisher–Yates: walks from the last index down to 1 and swaps with a uniformly chosen index in `0..=i`, so
/// every permutation is equally likely given an unbiased `rng`.
pub fn shuffle<T: Clone, R: Rng>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut shuffled = items.to_vec();
    for i in (1..shuffled.len()).rev() {
        let j = rng.random_range(0..=i);
        shuffled.swap(i, j);
    }
    shuffled
}

/// Two distinct cards showing the same value. A card never matches itself.
pub fn pairs_match(a: &Card, b: &Card) -> bool {
    a.value == b.value && a.id != b.id
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDimensions {
    pub rows: u8,
    pub cols: u8,
}

impl GridDimensions {
    pub const fn new(rows: u8, cols: u8) -> Self {
        Self { rows, cols }
    }

    pub const fn cells(self) -> usize {
        self.rows as usize * self.cols as usize
    }
}

impl Default for GridDimensions {
    fn default() -> Self {
        Self::new(4, 4)
    }
}

/// Board layout for a supported card count, unknown sizes fall back to 4x4.
pub fn grid_dimensions(grid_size: usize) -> GridDimensions {
    match grid_size {
        16 => GridDimensions::new(4, 4),
        20 => GridDimensions::new(4, 5),
        30 => GridDimensions::new(5, 6),
        _ => GridDimensions::default(),
    }
}

/// Completion percentage rounded half away from zero, 0 when there is nothing to match.
pub fn progress_percent(matched: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let ratio = (matched.min(total) as f64) / (total as f64);
    (ratio * 100.0).round() as u8
}

/// Strictly fewer attempts than the stored record, or no record at all.
pub fn is_new_best_score(attempts: u32, level_id: &str, best_scores: &BestScores) -> bool {
    best_scores
        .get(level_id)
        .is_none_or(|best| attempts < best.attempts)
}

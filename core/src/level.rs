use serde::{Deserialize, Serialize};

use crate::*;

const ANIMALS: [&str; 15] = [
    "🐶", "🐱", "🐭", "🐹", "🐰", "🦊", "🐻", "🐼", "🐨", "🐯", "🦁", "🐸", "🐵", "🐔", "🐧",
];

/// Named configuration fixing the card count and the symbols dealt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDifficultyLevel")]
pub struct DifficultyLevel {
    id: String,
    name: String,
    grid_size: usize,
    pairs: usize,
    values: Vec<CardValue>,
}

/// Wire shape of a level, only turned into a [`DifficultyLevel`] through its validating constructor.
#[derive(Deserialize)]
struct RawDifficultyLevel {
    id: String,
    name: String,
    grid_size: usize,
    pairs: usize,
    values: Vec<CardValue>,
}

impl TryFrom<RawDifficultyLevel> for DifficultyLevel {
    type Error = GameError;

    fn try_from(raw: RawDifficultyLevel) -> Result<Self> {
        Self::new(raw.id, raw.name, raw.grid_size, raw.pairs, raw.values)
    }
}

impl DifficultyLevel {
    /// Checks that the grid holds exactly `pairs` pairs and that at least `pairs` distinct values are given.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        grid_size: usize,
        pairs: usize,
        values: Vec<CardValue>,
    ) -> Result<Self> {
        if pairs == 0 {
            return Err(GameError::NoPairs);
        }
        if grid_size != pairs * 2 {
            return Err(GameError::GridSizeMismatch { grid_size, pairs });
        }
        if values.len() < pairs {
            return Err(GameError::NotEnoughValues {
                pairs,
                available: values.len(),
            });
        }
        for (index, value) in values.iter().enumerate() {
            if values[..index].contains(value) {
                return Err(GameError::DuplicateValue(value.clone()));
            }
        }

        Ok(Self {
            id: id.into(),
            name: name.into(),
            grid_size,
            pairs,
            values,
        })
    }

    fn preset(id: &str, name: &str, pairs: usize) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            grid_size: pairs * 2,
            pairs,
            values: ANIMALS[..pairs].iter().map(|&v| v.into()).collect(),
        }
    }

    pub fn easy() -> Self {
        Self::preset("easy", "Easy (4x4)", 8)
    }

    pub fn medium() -> Self {
        Self::preset("medium", "Medium (4x5)", 10)
    }

    pub fn hard() -> Self {
        Self::preset("hard", "Hard (5x6)", 15)
    }

    /// Built-in levels in the order shown by the difficulty picker.
    pub fn presets() -> Vec<Self> {
        vec![Self::easy(), Self::medium(), Self::hard()]
    }

    pub fn find(id: &str) -> Result<Self> {
        Self::presets()
            .into_iter()
            .find(|level| level.id == id)
            .ok_or_else(|| GameError::UnknownLevel(id.into()))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    pub fn pairs(&self) -> usize {
        self.pairs
    }

    pub fn values(&self) -> &[CardValue] {
        &self.values
    }

    /// The values actually dealt, extras beyond `pairs` are ignored.
    pub fn dealt_values(&self) -> &[CardValue] {
        &self.values[..self.pairs]
    }

    pub fn grid_dimensions(&self) -> GridDimensions {
        grid_dimensions(self.grid_size)
    }
}

impl Default for DifficultyLevel {
    fn default() -> Self {
        Self::easy()
    }
}

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Level needs at least one pair")]
    NoPairs,
    #[error("Grid size {grid_size} does not hold {pairs} pairs")]
    GridSizeMismatch { grid_size: usize, pairs: usize },
    #[error("Level needs {pairs} distinct values but only {available} were given")]
    NotEnoughValues { pairs: usize, available: usize },
    #[error("Value {0:?} appears more than once in the level")]
    DuplicateValue(String),
    #[error("Card id {0:?} appears more than once in the deck")]
    DuplicateCardId(String),
    #[error("Value {value:?} appears {count} times in the deck, expected 2")]
    IncompletePair { value: String, count: usize },
    #[error("Unknown difficulty level {0:?}")]
    UnknownLevel(String),
    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = core::result::Result<T, GameError>;

/// Failures of the best-score persistence boundary.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Score storage I/O failed")]
    Io(#[from] std::io::Error),
    #[error("Score storage holds malformed data")]
    Json(#[from] serde_json::Error),
    #[error("Score storage unavailable: {0}")]
    Unavailable(String),
}

/// Failures of a feedback sink, e.g. no haptic hardware.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedbackError {
    #[error("Feedback unavailable: {0}")]
    Unavailable(String),
}

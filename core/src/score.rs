use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::{fs, io};

use crate::StoreError;

/// Storage key the score map is persisted under.
pub const BEST_SCORES_KEY: &str = "memory_match_best_scores";

/// Lowest attempt count reached on one level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BestScore {
    pub attempts: u32,
    pub time_elapsed: u32,
    pub date: DateTime<Utc>,
}

impl BestScore {
    pub fn new(attempts: u32, time_elapsed: u32, date: DateTime<Utc>) -> Self {
        Self {
            attempts,
            time_elapsed,
            date,
        }
    }
}

/// Best scores keyed by level id.
pub type BestScores = BTreeMap<String, BestScore>;

/// Keyed device storage for the best-score map.
pub trait ScoreStore {
    fn load_scores(&self) -> Result<BestScores, StoreError>;
    fn save_scores(&mut self, scores: &BestScores) -> Result<(), StoreError>;
}

/// In-process store, clones share the same map so a host can keep a handle after moving one into the engine.
#[derive(Clone, Debug, Default)]
pub struct MemoryScoreStore {
    scores: Rc<RefCell<BestScores>>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scores(scores: BestScores) -> Self {
        Self {
            scores: Rc::new(RefCell::new(scores)),
        }
    }

    pub fn snapshot(&self) -> BestScores {
        self.scores.borrow().clone()
    }
}

impl ScoreStore for MemoryScoreStore {
    fn load_scores(&self) -> Result<BestScores, StoreError> {
        Ok(self.snapshot())
    }

    fn save_scores(&mut self, scores: &BestScores) -> Result<(), StoreError> {
        *self.scores.borrow_mut() = scores.clone();
        Ok(())
    }
}

/// Stores the map as JSON in `<dir>/memory_match_best_scores.json`.
#[derive(Clone, Debug)]
pub struct JsonFileScoreStore {
    path: PathBuf,
}

impl JsonFileScoreStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{BEST_SCORES_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScoreStore for JsonFileScoreStore {
    fn load_scores(&self) -> Result<BestScores, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(BestScores::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn save_scores(&mut self, scores: &BestScores) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string(scores)?)?;
        Ok(())
    }
}

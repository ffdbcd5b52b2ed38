use core::time::Duration;
use serde::{Deserialize, Serialize};

use crate::*;

/// Timing knobs of the engine and its timer, all in milliseconds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Delay between a mismatch and the "no match" cue.
    pub no_match_feedback_delay_ms: u64,
    /// Delay between a mismatch and turning both cards face down again.
    pub flip_back_delay_ms: u64,
    /// Delay between the final match and the celebration cue.
    pub completion_feedback_delay_ms: u64,
    pub timer_tick_ms: u64,
}

impl EngineConfig {
    /// Parses overrides, missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|err| GameError::InvalidConfig(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.timer_tick_ms == 0 {
            return Err(GameError::InvalidConfig("timer tick must be positive".into()));
        }
        Ok(())
    }

    pub const fn no_match_feedback_delay(&self) -> Duration {
        Duration::from_millis(self.no_match_feedback_delay_ms)
    }

    pub const fn flip_back_delay(&self) -> Duration {
        Duration::from_millis(self.flip_back_delay_ms)
    }

    pub const fn completion_feedback_delay(&self) -> Duration {
        Duration::from_millis(self.completion_feedback_delay_ms)
    }

    pub const fn timer_tick(&self) -> Duration {
        Duration::from_millis(self.timer_tick_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            no_match_feedback_delay_ms: 800,
            flip_back_delay_ms: 1000,
            completion_feedback_delay_ms: 500,
            timer_tick_ms: 1000,
        }
    }
}

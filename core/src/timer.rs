use core::time::Duration;
use serde::{Deserialize, Serialize};

/// Whole-second game clock fed by host frame/interval deltas.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameTimer {
    tick: Duration,
    seconds: u32,
    running: bool,
    carry: Duration,
}

impl GameTimer {
    pub fn new(tick: Duration) -> Self {
        Self {
            tick,
            seconds: 0,
            running: false,
            carry: Duration::ZERO,
        }
    }

    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stopping drops the partial tick, like clearing an interval.
    pub fn set_running(&mut self, running: bool) {
        if self.running && !running {
            self.carry = Duration::ZERO;
        }
        self.running = running;
    }

    pub fn reset(&mut self) {
        self.seconds = 0;
        self.carry = Duration::ZERO;
    }

    /// Returns the new elapsed seconds when at least one tick passed.
    pub fn advance(&mut self, delta: Duration) -> Option<u32> {
        if !self.running || self.tick.is_zero() {
            return None;
        }

        self.carry += delta;
        let mut ticked = false;
        while self.carry >= self.tick {
            self.carry -= self.tick;
            self.seconds = self.seconds.saturating_add(1);
            ticked = true;
        }
        ticked.then_some(self.seconds)
    }
}

impl Default for GameTimer {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

/// `MM:SS`, minutes keep growing past 99.
pub fn format_time(total_seconds: u32) -> String {
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

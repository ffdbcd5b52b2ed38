use core::time::Duration;
use serde::{Deserialize, Serialize};

use crate::*;

/// Deferred engine work following a flip decision.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingAction {
    NoMatchFeedback,
    FlipBack { first: CardId, second: CardId },
    CompletionFeedback,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub due: Duration,
    /// Deal the task belongs to, tasks of a replaced deal are ignored.
    pub generation: u64,
    pub action: PendingAction,
}

/// Virtual clock with an ordered task queue, advanced explicitly by the host.
///
/// Tasks fire ordered by due time, ties in scheduling order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Scheduler {
    now: Duration,
    tasks: Vec<ScheduledTask>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn pending(&self) -> &[ScheduledTask] {
        &self.tasks
    }

    pub fn schedule(&mut self, delay: Duration, generation: u64, action: PendingAction) {
        let due = self.now + delay;
        let index = self.tasks.partition_point(|task| task.due <= due);
        log::trace!("schedule {:?} at {:?} (gen {})", action, due, generation);
        self.tasks.insert(
            index,
            ScheduledTask {
                due,
                generation,
                action,
            },
        );
    }

    /// Moves the clock forward and takes every task that became due.
    pub fn advance(&mut self, delta: Duration) -> Vec<ScheduledTask> {
        self.now += delta;
        let due_count = self.tasks.partition_point(|task| task.due <= self.now);
        self.tasks.drain(..due_count).collect()
    }

    /// Jumps the clock to the last queued task and takes everything.
    pub fn advance_all(&mut self) -> Vec<ScheduledTask> {
        if let Some(last) = self.tasks.last() {
            self.now = self.now.max(last.due);
        }
        core::mem::take(&mut self.tasks)
    }
}

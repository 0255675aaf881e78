//! Gating of learning updates.
use serde::{Deserialize, Serialize};

/// Why a learning update was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// The train step is not a multiple of the update interval.
    Cadence,

    /// The replay memory does not hold more than the minimum number of transitions.
    Warmup,
}

/// Outcome of [`LearnSchedule::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LearnGate {
    /// A learning update should be done.
    Open,

    /// No learning update in this step.
    Skip(SkipReason),
}

impl LearnGate {
    /// Returns `true` if an update should be done.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }
}

/// Decides on which calls of `learn` an agent actually updates its networks.
///
/// The schedule owns the train step counter of an agent. The counter is
/// incremented on every call of [`LearnSchedule::step`], whether or not an
/// update happens. An update happens only when the counter is a multiple of
/// `interval` and the replay memory holds more than `min_memory_size`
/// transitions.
#[derive(Debug, Clone, PartialEq)]
pub struct LearnSchedule {
    train_step: usize,
    interval: usize,
    min_memory_size: usize,
}

impl LearnSchedule {
    /// Constructs a schedule with the counter set to zero.
    ///
    /// `interval` must be positive.
    pub fn new(interval: usize, min_memory_size: usize) -> Self {
        debug_assert!(interval > 0);
        Self {
            train_step: 0,
            interval,
            min_memory_size,
        }
    }

    /// Advances the counter and tells if an update should be done.
    pub fn step(&mut self, memory_len: usize) -> LearnGate {
        self.train_step += 1;

        if self.train_step % self.interval != 0 {
            LearnGate::Skip(SkipReason::Cadence)
        } else if memory_len <= self.min_memory_size {
            LearnGate::Skip(SkipReason::Warmup)
        } else {
            LearnGate::Open
        }
    }

    /// Returns the number of calls of [`LearnSchedule::step`] so far.
    pub fn train_step(&self) -> usize {
        self.train_step
    }

    /// Returns the update interval in train steps.
    pub fn interval(&self) -> usize {
        self.interval
    }

    /// Returns the warm-up threshold on the size of the replay memory.
    pub fn min_memory_size(&self) -> usize {
        self.min_memory_size
    }
}

#![warn(missing_docs)]
//! Core components of a multi-agent DDPG learner.
//!
//! This crate has no dependency on a tensor backend. It provides the replay
//! memory each agent owns, the gating of learning updates, records for
//! logging and a lockstep training loop over a multi-agent environment.
//! A concrete agent is implemented in `maddpg-candle-agent`.
pub mod error;
pub mod record;
pub mod replay_memory;

mod base;
pub use base::{MaAgentBase, MaEnv, MaStep};

mod schedule;
pub use schedule::{LearnGate, LearnSchedule, SkipReason};

mod trainer;
pub use trainer::{Trainer, TrainerConfig};

//! Multi-agent DDPG algorithm.
//!
//! Each agent owns a deterministic actor acting on its own observation and a
//! centralized critic evaluating the joint observation and the joint action
//! of all agents. Both networks have target copies updated by
//! [`Algorithm::sync_target`].
mod actor;
mod algorithm;
mod base;
mod config;
mod critic;
pub use actor::{Actor, ActorConfig};
pub use algorithm::Algorithm;
pub use base::Maddpg;
pub use config::MaddpgConfig;
pub use critic::{CentralizedCritic, CriticConfig};

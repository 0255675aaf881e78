//! Core interfaces.
mod agent;
mod env;
pub use agent::MaAgentBase;
pub use env::{MaEnv, MaStep};

//! Multi-agent agent driving an [`Algorithm`](crate::maddpg::Algorithm).
mod base;
mod config;
pub use base::MaAgent;
pub use config::MaAgentConfig;

//! Multi-agent environment.
use anyhow::Result;

/// Joint outcome of an environment step.
#[derive(Debug, Clone, PartialEq)]
pub struct MaStep {
    /// Next observation of every agent.
    pub obs_n: Vec<Vec<f32>>,

    /// Reward of every agent.
    pub reward_n: Vec<f32>,

    /// Whether the episode ended for every agent.
    pub done_n: Vec<bool>,
}

impl MaStep {
    /// Returns `true` if the episode ended for all agents.
    pub fn is_done(&self) -> bool {
        self.done_n.iter().all(|&d| d)
    }
}

/// An environment where a fixed number of agents act simultaneously.
pub trait MaEnv {
    /// Returns the number of agents.
    fn n_agents(&self) -> usize;

    /// Resets the environment and returns the initial observation of every agent.
    fn reset(&mut self) -> Result<Vec<Vec<f32>>>;

    /// Applies the actions of all agents, in agent order.
    fn step(&mut self, act_n: &[Vec<f32>]) -> Result<MaStep>;
}

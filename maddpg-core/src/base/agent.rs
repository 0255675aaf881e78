//! Agent.
use crate::{record::Record, replay_memory::Transition};
use anyhow::Result;

/// An agent trained together with other agents of the same type.
///
/// Learning is defined on the whole set of co-training agents, because the
/// centralized critic of an agent looks at the observations and actions of
/// everyone. The learning agent is identified by its position in the slice.
pub trait MaAgentBase: Sized {
    /// Returns the position of this agent among the co-training agents.
    fn agent_index(&self) -> usize;

    /// Predicts an action for a single observation.
    ///
    /// If `use_target_model` is `true`, the target network is used.
    fn predict(&self, obs: &[f32], use_target_model: bool) -> Result<Vec<f32>>;

    /// Stores a transition into the replay memory of this agent.
    fn add_experience(&mut self, tr: Transition) -> Result<()>;

    /// Runs a learning step of `agents[agent_index]` and returns some information.
    ///
    /// The record is expected to contain a scalar `critic_loss`, which is `0.0`
    /// when the update was skipped.
    fn learn_with_record(agents: &mut [Self], agent_index: usize) -> Result<Record>;

    /// Runs a learning step of `agents[agent_index]` and returns the critic loss.
    fn learn(agents: &mut [Self], agent_index: usize) -> Result<f32> {
        let record = Self::learn_with_record(agents, agent_index)?;
        Ok(record.get_scalar("critic_loss")?)
    }
}

use anyhow::Result;
use candle_core::Tensor;

/// Networks and update rules of a single agent.
///
/// [`MaAgent`](crate::MaAgent) drives an implementor of this trait: it
/// assembles batches from the replay memories of all agents and the target
/// values, while the implementor owns the actor, the centralized critic and
/// their target copies.
pub trait Algorithm {
    /// Returns the index of the agent whose actor this algorithm trains.
    fn agent_index(&self) -> usize;

    /// Returns actions for a batch of observations of this agent.
    ///
    /// `obs` has shape `[batch_size, obs_dim]` and the output
    /// `[batch_size, act_dim]`.
    fn predict(&self, obs: &Tensor, use_target_model: bool) -> Result<Tensor>;

    /// Evaluates the centralized critic on the observations and the actions of
    /// all agents, ordered by agent index. The output has shape `[batch_size]`.
    fn q(&self, obs_n: &[Tensor], act_n: &[Tensor], use_target_model: bool) -> Result<Tensor>;

    /// Performs one update of the critic and the actor, then synchronizes the
    /// target networks. Returns the scalar critic loss.
    fn learn(&mut self, obs_n: &[Tensor], act_n: &[Tensor], target_q: &Tensor) -> Result<Tensor>;

    /// Updates the target networks as `decay * target + (1 - decay) * online`.
    ///
    /// `None` uses the soft update coefficient of the algorithm, `Some(0.0)`
    /// copies the online networks.
    fn sync_target(&mut self, decay: Option<f64>) -> Result<()>;

    /// Returns the discount factor.
    fn gamma(&self) -> f64;
}

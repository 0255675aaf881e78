//! Transitions and batches of transitions.

/// A single transition `(o_t, a_t, r_t, o_t+1, terminal_t)` seen by one agent.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Observation.
    pub obs: Vec<f32>,

    /// Action taken on `obs`.
    pub act: Vec<f32>,

    /// Reward.
    pub reward: f32,

    /// Next observation.
    pub next_obs: Vec<f32>,

    /// Whether the episode ended with this transition.
    pub terminal: bool,
}

impl Transition {
    /// Constructs a transition.
    pub fn new(obs: Vec<f32>, act: Vec<f32>, reward: f32, next_obs: Vec<f32>, terminal: bool) -> Self {
        Self {
            obs,
            act,
            reward,
            next_obs,
            terminal,
        }
    }
}

/// A batch of transitions sampled from a [`ReplayMemory`](super::ReplayMemory).
///
/// Observations and actions are stored row-major, i.e., `obs` has
/// `len() * obs_dim` elements.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionBatch {
    /// Observations, `[batch_size, obs_dim]`.
    pub obs: Vec<f32>,

    /// Actions, `[batch_size, act_dim]`.
    pub act: Vec<f32>,

    /// Rewards, `[batch_size]`.
    pub reward: Vec<f32>,

    /// Next observations, `[batch_size, obs_dim]`.
    pub next_obs: Vec<f32>,

    /// Termination flags, `[batch_size]`, `1` for terminal transitions.
    pub is_terminated: Vec<i8>,

    /// Dimension of an observation.
    pub obs_dim: usize,

    /// Dimension of an action.
    pub act_dim: usize,
}

impl TransitionBatch {
    /// Returns the number of transitions in the batch.
    pub fn len(&self) -> usize {
        self.reward.len()
    }

    /// Returns `true` if the batch has no transitions.
    pub fn is_empty(&self) -> bool {
        self.reward.is_empty()
    }
}

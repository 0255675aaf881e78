//! Circular replay memory.
use super::{ReplayMemoryConfig, Transition, TransitionBatch};
use crate::error::MaddpgError;
use anyhow::Result;
use log::trace;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Fixed-capacity circular store of transitions of a single agent.
///
/// Appending is O(1). When the memory is full, the oldest transition is
/// overwritten. Sample indices are drawn uniformly with replacement.
pub struct ReplayMemory {
    capacity: usize,
    obs_dim: usize,
    act_dim: usize,

    /// Next slot to be written.
    i: usize,

    /// Number of stored transitions, at most `capacity`.
    size: usize,

    /// Number of transitions ever appended.
    n_appended: usize,

    obs: Vec<f32>,
    act: Vec<f32>,
    reward: Vec<f32>,
    next_obs: Vec<f32>,
    is_terminated: Vec<i8>,
    rng: StdRng,
}

impl ReplayMemory {
    /// Builds an empty replay memory for the given observation and action dimensions.
    pub fn build(config: &ReplayMemoryConfig, obs_dim: usize, act_dim: usize) -> Result<Self> {
        if config.capacity == 0 {
            return Err(
                MaddpgError::InvalidConfig("capacity of replay memory must be positive".into())
                    .into(),
            );
        }
        let capacity = config.capacity;

        Ok(Self {
            capacity,
            obs_dim,
            act_dim,
            i: 0,
            size: 0,
            n_appended: 0,
            obs: vec![0.; capacity * obs_dim],
            act: vec![0.; capacity * act_dim],
            reward: vec![0.; capacity],
            next_obs: vec![0.; capacity * obs_dim],
            is_terminated: vec![0; capacity],
            rng: StdRng::seed_from_u64(config.seed),
        })
    }

    fn check_dim(what: &str, expected: usize, actual: usize) -> Result<()> {
        if expected != actual {
            return Err(MaddpgError::DimensionMismatch {
                what: what.to_string(),
                expected,
                actual,
            }
            .into());
        }
        Ok(())
    }

    /// Appends a transition, evicting the oldest one when the memory is full.
    pub fn append(&mut self, tr: Transition) -> Result<()> {
        Self::check_dim("obs", self.obs_dim, tr.obs.len())?;
        Self::check_dim("act", self.act_dim, tr.act.len())?;
        Self::check_dim("next_obs", self.obs_dim, tr.next_obs.len())?;

        let i = self.i;
        self.obs[i * self.obs_dim..(i + 1) * self.obs_dim].copy_from_slice(&tr.obs);
        self.act[i * self.act_dim..(i + 1) * self.act_dim].copy_from_slice(&tr.act);
        self.next_obs[i * self.obs_dim..(i + 1) * self.obs_dim].copy_from_slice(&tr.next_obs);
        self.reward[i] = tr.reward;
        self.is_terminated[i] = tr.terminal as i8;

        self.i = (self.i + 1) % self.capacity;
        self.size = (self.size + 1).min(self.capacity);
        self.n_appended += 1;

        Ok(())
    }

    /// Returns the number of stored transitions.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if no transition is stored.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the maximum number of transitions.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of transitions ever appended, including evicted ones.
    ///
    /// Memories filled in lockstep have the same value.
    pub fn n_appended(&self) -> usize {
        self.n_appended
    }

    /// Returns the dimension of observations.
    pub fn obs_dim(&self) -> usize {
        self.obs_dim
    }

    /// Returns the dimension of actions.
    pub fn act_dim(&self) -> usize {
        self.act_dim
    }

    /// Draws `batch_size` indices uniformly at random, with replacement.
    pub fn make_index(&mut self, batch_size: usize) -> Result<Vec<usize>> {
        if self.size == 0 {
            return Err(MaddpgError::EmptyMemory.into());
        }
        let size = self.size;
        let ixs = (0..batch_size)
            .map(|_| self.rng.gen_range(0..size))
            .collect::<Vec<_>>();
        trace!("make_index(): {:?}", ixs);
        Ok(ixs)
    }

    /// Retrieves the transitions at the given indices.
    pub fn sample_batch_by_index(&self, ixs: &[usize]) -> Result<TransitionBatch> {
        if let Some(&index) = ixs.iter().find(|&&ix| ix >= self.size) {
            return Err(MaddpgError::IndexOutOfRange {
                index,
                size: self.size,
            }
            .into());
        }

        Ok(TransitionBatch {
            obs: Self::gather(&self.obs, self.obs_dim, ixs),
            act: Self::gather(&self.act, self.act_dim, ixs),
            reward: ixs.iter().map(|&ix| self.reward[ix]).collect(),
            next_obs: Self::gather(&self.next_obs, self.obs_dim, ixs),
            is_terminated: ixs.iter().map(|&ix| self.is_terminated[ix]).collect(),
            obs_dim: self.obs_dim,
            act_dim: self.act_dim,
        })
    }

    /// Samples a batch of transitions uniformly at random.
    pub fn sample_batch(&mut self, batch_size: usize) -> Result<TransitionBatch> {
        let ixs = self.make_index(batch_size)?;
        self.sample_batch_by_index(&ixs)
    }

    fn gather(buf: &[f32], dim: usize, ixs: &[usize]) -> Vec<f32> {
        let mut out = Vec::with_capacity(ixs.len() * dim);
        for &ix in ixs {
            out.extend_from_slice(&buf[ix * dim..(ix + 1) * dim]);
        }
        out
    }
}

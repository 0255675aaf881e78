//! Configuration of [`MaAgent`](super::MaAgent).
use anyhow::Result;
use maddpg_core::{error::MaddpgError, replay_memory::ReplayMemoryConfig};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`MaAgent`](super::MaAgent).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct MaAgentConfig {
    /// Index of the agent among the co-trained agents.
    pub agent_index: usize,

    /// Observation dimensions of all agents, ordered by agent index.
    pub obs_dim_n: Vec<usize>,

    /// Action dimensions of all agents, ordered by agent index.
    pub act_dim_n: Vec<usize>,

    /// Number of transitions in a batch.
    pub batch_size: usize,

    /// Speed-up flag. It is stored but does not change the computation.
    pub speedup: bool,

    /// Configuration of the replay memory.
    pub replay_memory_config: ReplayMemoryConfig,

    /// An update is done once every this many calls of `learn`.
    #[serde(default = "default_learn_interval")]
    pub learn_interval: usize,

    /// Updates start when the replay memory holds more than
    /// `batch_size * min_memory_factor` transitions.
    #[serde(default = "default_min_memory_factor")]
    pub min_memory_factor: usize,
}

fn default_learn_interval() -> usize {
    100
}

fn default_min_memory_factor() -> usize {
    25
}

impl Default for MaAgentConfig {
    fn default() -> Self {
        Self {
            agent_index: 0,
            obs_dim_n: vec![],
            act_dim_n: vec![],
            batch_size: 1024,
            speedup: false,
            replay_memory_config: ReplayMemoryConfig::default(),
            learn_interval: default_learn_interval(),
            min_memory_factor: default_min_memory_factor(),
        }
    }
}

impl MaAgentConfig {
    /// Configuration of agent `agent_index` among agents with the given dimensions.
    pub fn new(agent_index: usize, obs_dim_n: Vec<usize>, act_dim_n: Vec<usize>) -> Self {
        Self {
            agent_index,
            obs_dim_n,
            act_dim_n,
            ..Self::default()
        }
    }

    /// Sets the batch size.
    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    /// Sets the speed-up flag.
    pub fn speedup(mut self, v: bool) -> Self {
        self.speedup = v;
        self
    }

    /// Sets the configuration of the replay memory.
    pub fn replay_memory_config(mut self, v: ReplayMemoryConfig) -> Self {
        self.replay_memory_config = v;
        self
    }

    /// Sets the update interval in train steps.
    pub fn learn_interval(mut self, v: usize) -> Self {
        self.learn_interval = v;
        self
    }

    /// Sets the warm-up factor.
    pub fn min_memory_factor(mut self, v: usize) -> Self {
        self.min_memory_factor = v;
        self
    }

    /// Returns the number of co-trained agents.
    pub fn n_agents(&self) -> usize {
        self.obs_dim_n.len()
    }

    /// Returns the warm-up threshold on the size of the replay memory.
    pub fn min_memory_size(&self) -> usize {
        self.batch_size * self.min_memory_factor
    }

    /// Checks the consistency of the configuration.
    pub fn check(&self) -> Result<()> {
        let invalid = |msg: String| -> Result<()> { Err(MaddpgError::InvalidConfig(msg).into()) };

        if self.obs_dim_n.is_empty() {
            return invalid("obs_dim_n is empty".into());
        }
        if self.obs_dim_n.len() != self.act_dim_n.len() {
            return invalid(format!(
                "obs_dim_n and act_dim_n differ in length: {} and {}",
                self.obs_dim_n.len(),
                self.act_dim_n.len()
            ));
        }
        if self.obs_dim_n.contains(&0) || self.act_dim_n.contains(&0) {
            return invalid("dimensions must be positive".into());
        }
        if self.agent_index >= self.n_agents() {
            return invalid(format!(
                "agent_index {} is out of {} agents",
                self.agent_index,
                self.n_agents()
            ));
        }
        if self.batch_size == 0 {
            return invalid("batch_size must be positive".into());
        }
        if self.learn_interval == 0 {
            return invalid("learn_interval must be positive".into());
        }
        Ok(())
    }

    /// Constructs [`MaAgentConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`MaAgentConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

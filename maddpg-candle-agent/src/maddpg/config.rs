//! Configuration of [`Maddpg`](super::Maddpg).
use super::{ActorConfig, CriticConfig};
use crate::{mlp::MlpConfig, opt::OptimizerConfig, util::CriticLoss, Activation};
use anyhow::Result;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Maddpg`](super::Maddpg).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct MaddpgConfig<P, Q> {
    /// Index of the agent among the co-trained agents.
    pub agent_index: usize,

    /// Discount factor.
    pub gamma: f64,

    /// Soft update coefficient of the target networks.
    pub tau: f64,

    /// Loss function of the critic.
    pub critic_loss: CriticLoss,

    /// Weight of the penalty on the squared magnitude of actions in the actor loss.
    pub act_reg: f64,

    /// Configuration of the actor.
    pub actor_config: ActorConfig<P>,

    /// Configuration of the centralized critic.
    pub critic_config: CriticConfig<Q>,
}

impl<P, Q> Default for MaddpgConfig<P, Q> {
    fn default() -> Self {
        Self {
            agent_index: 0,
            gamma: 0.95,
            tau: 0.01,
            critic_loss: CriticLoss::Mse,
            act_reg: 1e-3,
            actor_config: ActorConfig::default(),
            critic_config: CriticConfig::default(),
        }
    }
}

impl<P, Q> MaddpgConfig<P, Q>
where
    P: DeserializeOwned + Serialize,
    Q: DeserializeOwned + Serialize,
{
    /// Sets the agent index.
    pub fn agent_index(mut self, v: usize) -> Self {
        self.agent_index = v;
        self
    }

    /// Sets the discount factor.
    pub fn gamma(mut self, v: f64) -> Self {
        self.gamma = v;
        self
    }

    /// Sets the soft update coefficient.
    pub fn tau(mut self, v: f64) -> Self {
        self.tau = v;
        self
    }

    /// Sets the critic loss.
    pub fn critic_loss(mut self, v: CriticLoss) -> Self {
        self.critic_loss = v;
        self
    }

    /// Sets the weight of the action regularizer.
    pub fn act_reg(mut self, v: f64) -> Self {
        self.act_reg = v;
        self
    }

    /// Sets the configuration of the actor.
    pub fn actor_config(mut self, v: ActorConfig<P>) -> Self {
        self.actor_config = v;
        self
    }

    /// Sets the configuration of the critic.
    pub fn critic_config(mut self, v: CriticConfig<Q>) -> Self {
        self.critic_config = v;
        self
    }

    /// Constructs [`MaddpgConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`MaddpgConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

impl MaddpgConfig<MlpConfig, MlpConfig> {
    /// Configuration with MLPs of the given hidden units for agent `agent_index`.
    ///
    /// The actor maps the observation of the agent to its action through
    /// `tanh`; the critic maps all observations and actions to a scalar.
    pub fn mlp(agent_index: usize, obs_dim_n: &[usize], act_dim_n: &[usize], units: Vec<usize>) -> Self {
        let pi_config = MlpConfig::new(
            obs_dim_n[agent_index],
            units.clone(),
            act_dim_n[agent_index],
            Activation::Tanh,
        );
        let critic_in_dim = obs_dim_n.iter().sum::<usize>() + act_dim_n.iter().sum::<usize>();
        let q_config = MlpConfig::new(critic_in_dim, units, 1, Activation::None);

        Self::default()
            .agent_index(agent_index)
            .actor_config(ActorConfig::default().pi_config(pi_config))
            .critic_config(CriticConfig::default().q_config(q_config))
    }

    /// Sets the optimizer of both the actor and the critic.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.actor_config.opt_config = v.clone();
        self.critic_config.opt_config = v;
        self
    }
}

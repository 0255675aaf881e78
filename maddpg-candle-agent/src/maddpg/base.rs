//! Multi-agent DDPG with a centralized critic.
use super::{Actor, Algorithm, CentralizedCritic, MaddpgConfig};
use crate::{
    model::{SubModel1, SubModel2},
    util::CriticLoss,
};
use anyhow::Result;
use candle_core::{Device, Tensor};
use log::{info, trace};
use maddpg_core::error::MaddpgError;
use serde::{de::DeserializeOwned, Serialize};

/// Candle implementation of [`Algorithm`].
///
/// The critic is trained to regress the given target values. The actor is
/// trained to maximize the online critic, with the actions of the other
/// agents fixed to those in the batch.
pub struct Maddpg<P, Q>
where
    P: SubModel1<Input = Tensor, Output = Tensor>,
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
{
    agent_index: usize,
    gamma: f64,
    tau: f64,
    act_reg: f64,
    critic_loss: CriticLoss,
    actor: Actor<P>,
    critic: CentralizedCritic<Q>,
    n_updates: usize,
}

impl<P, Q> Maddpg<P, Q>
where
    P: SubModel1<Input = Tensor, Output = Tensor>,
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + Clone,
    Q::Config: DeserializeOwned + Serialize + Clone,
{
    /// Constructs [`Maddpg`] on the given device.
    pub fn build(config: MaddpgConfig<P::Config, Q::Config>, device: &Device) -> Result<Self> {
        if !(0.0..=1.0).contains(&config.gamma) {
            return Err(MaddpgError::InvalidConfig(format!("gamma = {}", config.gamma)).into());
        }
        if !(0.0..=1.0).contains(&config.tau) {
            return Err(MaddpgError::InvalidConfig(format!("tau = {}", config.tau)).into());
        }
        let actor = Actor::build(config.actor_config, device)?;
        let critic = CentralizedCritic::build(config.critic_config, device)?;
        info!("Built MADDPG for agent {}", config.agent_index);

        Ok(Self {
            agent_index: config.agent_index,
            gamma: config.gamma,
            tau: config.tau,
            act_reg: config.act_reg,
            critic_loss: config.critic_loss,
            actor,
            critic,
            n_updates: 0,
        })
    }

    /// Returns the actor.
    pub fn actor(&self) -> &Actor<P> {
        &self.actor
    }

    /// Returns the centralized critic.
    pub fn critic(&self) -> &CentralizedCritic<Q> {
        &self.critic
    }

    /// Returns the number of updates done so far.
    pub fn n_updates(&self) -> usize {
        self.n_updates
    }

    fn update_critic(&mut self, obs_n: &[Tensor], act_n: &[Tensor], target_q: &Tensor) -> Result<Tensor> {
        let pred_q = self.critic.qvals(obs_n, act_n, false)?;
        let loss = self.critic_loss.compute(&pred_q, &target_q.detach())?;
        self.critic.backward_step(&loss)?;
        Ok(loss)
    }

    fn update_actor(&mut self, obs_n: &[Tensor], act_n: &[Tensor]) -> Result<Tensor> {
        let act = self.actor.forward(&obs_n[self.agent_index], false)?;
        let mut act_n = act_n.to_vec();
        act_n[self.agent_index] = act.clone();

        let q = self.critic.qvals(obs_n, &act_n, false)?;
        let reg = (act.sqr()?.mean_all()? * self.act_reg)?;
        let loss = (q.mean_all()?.neg()? + reg)?;
        self.actor.backward_step(&loss)?;
        Ok(loss)
    }
}

impl<P, Q> Algorithm for Maddpg<P, Q>
where
    P: SubModel1<Input = Tensor, Output = Tensor>,
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + Clone,
    Q::Config: DeserializeOwned + Serialize + Clone,
{
    fn agent_index(&self) -> usize {
        self.agent_index
    }

    fn predict(&self, obs: &Tensor, use_target_model: bool) -> Result<Tensor> {
        self.actor.forward(obs, use_target_model)
    }

    fn q(&self, obs_n: &[Tensor], act_n: &[Tensor], use_target_model: bool) -> Result<Tensor> {
        self.critic.qvals(obs_n, act_n, use_target_model)
    }

    fn learn(&mut self, obs_n: &[Tensor], act_n: &[Tensor], target_q: &Tensor) -> Result<Tensor> {
        if obs_n.len() != act_n.len() {
            return Err(MaddpgError::DimensionMismatch {
                what: "number of agents in batch".into(),
                expected: obs_n.len(),
                actual: act_n.len(),
            }
            .into());
        }
        if self.agent_index >= obs_n.len() {
            return Err(MaddpgError::IndexOutOfRange {
                index: self.agent_index,
                size: obs_n.len(),
            }
            .into());
        }

        let critic_loss = self.update_critic(obs_n, act_n, target_q)?;
        let actor_loss = self.update_actor(obs_n, act_n)?;
        self.sync_target(None)?;
        self.n_updates += 1;
        trace!(
            "agent {}: critic_loss = {}, actor_loss = {}",
            self.agent_index,
            critic_loss.to_scalar::<f32>()?,
            actor_loss.to_scalar::<f32>()?
        );

        Ok(critic_loss)
    }

    fn sync_target(&mut self, decay: Option<f64>) -> Result<()> {
        let decay = decay.unwrap_or(1.0 - self.tau);
        self.actor.sync_target(1.0 - decay)?;
        self.critic.sync_target(1.0 - decay)?;
        Ok(())
    }

    fn gamma(&self) -> f64 {
        self.gamma
    }
}

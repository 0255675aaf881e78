//! Centralized critic with a target copy.
use crate::{
    model::SubModel2,
    opt::{Optimizer, OptimizerConfig},
    util::track,
};
use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor, D};
use candle_nn::{VarBuilder, VarMap};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`CentralizedCritic`].
pub struct CriticConfig<Q> {
    /// Configuration of the action-value network.
    pub q_config: Option<Q>,

    /// Configuration of the optimizer.
    pub opt_config: OptimizerConfig,
}

impl<Q> Default for CriticConfig<Q> {
    fn default() -> Self {
        Self {
            q_config: None,
            opt_config: OptimizerConfig::default(),
        }
    }
}

impl<Q> CriticConfig<Q>
where
    Q: DeserializeOwned + Serialize,
{
    /// Sets configuration of the action-value network.
    pub fn q_config(mut self, v: Q) -> Self {
        self.q_config = Some(v);
        self
    }

    /// Sets optimizer configuration.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }

    /// Constructs [`CriticConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`CriticConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Action-value function over the joint observation and the joint action.
///
/// Observations and actions of all agents are concatenated in the order of
/// agent indices before being fed to the network.
pub struct CentralizedCritic<Q>
where
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
{
    varmap: VarMap,
    varmap_tgt: VarMap,
    q: Q,
    q_tgt: Q,
    opt: Optimizer,
}

impl<Q> CentralizedCritic<Q>
where
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
    Q::Config: Clone,
{
    /// Constructs [`CentralizedCritic`].
    pub fn build(config: CriticConfig<Q::Config>, device: &Device) -> Result<Self> {
        let q_config = config.q_config.context("q_config is not set.")?;
        let (varmap, q) = Self::build_network(&q_config, device)?;
        let (varmap_tgt, q_tgt) = Self::build_network(&q_config, device)?;
        let opt = config.opt_config.build(varmap.all_vars())?;

        Ok(Self {
            varmap,
            varmap_tgt,
            q,
            q_tgt,
            opt,
        })
    }

    fn build_network(q_config: &Q::Config, device: &Device) -> Result<(VarMap, Q)> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, device).pp("critic");
        let q = Q::build(vb, q_config.clone())?;
        Ok((varmap, q))
    }

    /// Returns action values with shape `[batch_size]`.
    pub fn qvals(&self, obs_n: &[Tensor], act_n: &[Tensor], use_target_model: bool) -> Result<Tensor> {
        let obs = Tensor::cat(obs_n, D::Minus1)?;
        let act = Tensor::cat(act_n, D::Minus1)?;
        let q = match use_target_model {
            false => self.q.forward(&obs, &act)?,
            true => self.q_tgt.forward(&obs, &act)?,
        };
        Ok(q.squeeze(D::Minus1)?)
    }

    /// Updates the online network to decrease `loss`.
    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        self.opt.backward_step(loss)
    }

    /// Moves the target network towards the online network by `tau`.
    pub fn sync_target(&self, tau: f64) -> Result<()> {
        track(&self.varmap_tgt, &self.varmap, tau)
    }

    /// Returns the variables of the online network.
    pub fn get_varmap(&self) -> &VarMap {
        &self.varmap
    }

    /// Returns the variables of the target network.
    pub fn get_varmap_tgt(&self) -> &VarMap {
        &self.varmap_tgt
    }
}

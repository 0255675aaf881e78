//! Deterministic actor with a target copy.
use crate::{
    model::SubModel1,
    opt::{Optimizer, OptimizerConfig},
    util::track,
};
use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::{VarBuilder, VarMap};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`Actor`].
pub struct ActorConfig<P> {
    /// Configuration of the policy network.
    pub pi_config: Option<P>,

    /// Configuration of the optimizer.
    pub opt_config: OptimizerConfig,
}

impl<P> Default for ActorConfig<P> {
    fn default() -> Self {
        Self {
            pi_config: None,
            opt_config: OptimizerConfig::default(),
        }
    }
}

impl<P> ActorConfig<P>
where
    P: DeserializeOwned + Serialize,
{
    /// Sets configuration of the policy network.
    pub fn pi_config(mut self, v: P) -> Self {
        self.pi_config = Some(v);
        self
    }

    /// Sets optimizer configuration.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }

    /// Constructs [`ActorConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`ActorConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Deterministic policy of an agent.
///
/// The online and the target networks have the same structure and variable
/// names in separate [`VarMap`]s. Only the online network is optimized.
pub struct Actor<P>
where
    P: SubModel1<Input = Tensor, Output = Tensor>,
{
    varmap: VarMap,
    varmap_tgt: VarMap,
    pi: P,
    pi_tgt: P,
    opt: Optimizer,
}

impl<P> Actor<P>
where
    P: SubModel1<Input = Tensor, Output = Tensor>,
    P::Config: Clone,
{
    /// Constructs [`Actor`].
    ///
    /// The target network is initialized independently; the owner is
    /// responsible for synchronizing it.
    pub fn build(config: ActorConfig<P::Config>, device: &Device) -> Result<Self> {
        let pi_config = config.pi_config.context("pi_config is not set.")?;
        let (varmap, pi) = Self::build_network(&pi_config, device)?;
        let (varmap_tgt, pi_tgt) = Self::build_network(&pi_config, device)?;
        let opt = config.opt_config.build(varmap.all_vars())?;

        Ok(Self {
            varmap,
            varmap_tgt,
            pi,
            pi_tgt,
            opt,
        })
    }

    fn build_network(pi_config: &P::Config, device: &Device) -> Result<(VarMap, P)> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, device).pp("actor");
        let pi = P::build(vb, pi_config.clone())?;
        Ok((varmap, pi))
    }

    /// Returns actions of the online or the target network.
    pub fn forward(&self, obs: &Tensor, use_target_model: bool) -> Result<Tensor> {
        match use_target_model {
            false => self.pi.forward(obs),
            true => self.pi_tgt.forward(obs),
        }
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

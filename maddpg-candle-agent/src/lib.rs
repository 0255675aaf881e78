//! Multi-agent DDPG agent implemented with [candle](https://crates.io/crates/candle-core).
//!
//! [`MaAgent`] coordinates an [`Algorithm`](maddpg::Algorithm), its own replay
//! memory and the synchronization of target networks. The centralized critic
//! of an agent is trained on batches assembled from the replay memories of all
//! co-training agents.
pub mod agent;
pub mod maddpg;
pub mod mlp;
pub mod model;
pub mod opt;
pub mod util;
pub use agent::{MaAgent, MaAgentConfig};
use anyhow::Result;
use candle_core::Tensor;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

/// Activation applied to the output layer of a network.
#[derive(Clone, Debug, Copy, Deserialize, Serialize, PartialEq)]
pub enum Activation {
    /// Identity.
    None,

    /// Rectified linear unit.
    ReLU,

    /// Hyperbolic tangent, bounding outputs to `[-1, 1]`.
    Tanh,
}

impl Activation {
    /// Applies the activation function.
    pub fn forward(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        match self {
            Self::None => Ok(xs.clone()),
            Self::ReLU => xs.relu(),
            Self::Tanh => xs.tanh(),
        }
    }
}

#[derive(Clone, Debug, Copy, Deserialize, Serialize, PartialEq)]
/// Device for using candle.
///
/// This enum is added because [`candle_core::Device`] does not support serialization.
/// The device is decided once at startup and the resulting [`candle_core::Device`]
/// is handed to every agent.
pub enum Device {
    /// The main CPU device.
    Cpu,

    /// The GPU device with the given ordinal.
    Cuda(usize),
}

impl Device {
    /// Returns the first GPU if candle was built with CUDA support and a GPU is
    /// found, [`Device::Cpu`] otherwise.
    pub fn cuda_if_available() -> Self {
        match candle_core::utils::cuda_is_available() {
            true => Self::Cuda(0),
            false => Self::Cpu,
        }
    }
}

impl TryFrom<Device> for candle_core::Device {
    type Error = anyhow::Error;

    fn try_from(device: Device) -> Result<Self> {
        match device {
            Device::Cpu => Ok(candle_core::Device::Cpu),
            Device::Cuda(n) => Ok(candle_core::Device::new_cuda(n)?),
        }
    }
}

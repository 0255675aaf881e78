//! Utilities.
use anyhow::{anyhow, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::VarMap;
use log::trace;
use serde::{Deserialize, Serialize};

/// Critic loss type.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Copy)]
pub enum CriticLoss {
    /// Mean squared error.
    Mse,

    /// Smooth L1 loss.
    SmoothL1,
}

impl CriticLoss {
    /// Computes the loss between predictions and targets.
    pub fn compute(&self, pred: &Tensor, tgt: &Tensor) -> Result<Tensor> {
        match self {
            Self::Mse => Ok(candle_nn::loss::mse(pred, tgt)?),
            Self::SmoothL1 => Ok(smooth_l1_loss(pred, tgt)?),
        }
    }
}

/// Apply soft update on variables.
///
/// Variables are identified by their names.
///
/// dest = tau * src + (1.0 - tau) * dest
pub fn track(dest: &VarMap, src: &VarMap, tau: f64) -> Result<()> {
    trace!("track(): tau = {}", tau);
    let dest = dest
        .data()
        .lock()
        .map_err(|_| anyhow!("varmap of destination is poisoned"))?;
    let src = src
        .data()
        .lock()
        .map_err(|_| anyhow!("varmap of source is poisoned"))?;

    for (k_dest, v_dest) in dest.iter() {
        let v_src = src
            .get(k_dest)
            .ok_or_else(|| anyhow!("variable {} is not found in source", k_dest))?;
        let t_src = v_src.as_tensor();
        let t_dest = v_dest.as_tensor();
        let t_dest = ((tau * t_src)? + ((1.0 - tau) * t_dest)?)?;
        v_dest.set(&t_dest)?;
    }

    Ok(())
}

/// See <https://pytorch.org/docs/stable/generated/torch.nn.SmoothL1Loss.html>.
pub fn smooth_l1_loss(x: &Tensor, y: &Tensor) -> Result<Tensor, candle_core::Error> {
    let device = x.device();
    let d = (x - y)?.abs()?;
    let m1 = d.lt(1.0)?.to_dtype(DType::F32)?.to_device(device)?;
    let m2 = (1f64 - &m1)?;
    (((0.5 * m1)? * d.powf(2.0))? + m2 * (d - 0.5))?.mean_all()
}

/// Returns the Bellman target `reward + gamma * (1 - terminal) * q_next`.
///
/// All tensors have shape `[batch_size]`; `terminal` holds `1.0` for terminal
/// transitions and `0.0` otherwise.
pub fn bellman_target(
    reward: &Tensor,
    terminal: &Tensor,
    q_next: &Tensor,
    gamma: f64,
) -> Result<Tensor> {
    let not_done = (1f64 - terminal)?;
    Ok((reward + ((not_done * gamma)? * q_next)?)?)
}

/// Converts a flat slice into a tensor of shape `[batch_size, dim]`.
pub fn slice_to_tensor(v: &[f32], dim: usize, device: &Device) -> Result<Tensor> {
    Ok(Tensor::from_slice(v, (v.len() / dim, dim), device)?)
}

/// Converts terminal flags into a tensor of `0.0` and `1.0`.
pub fn terminal_to_tensor(is_terminated: &[i8], device: &Device) -> Result<Tensor> {
    let v = is_terminated.iter().map(|&t| t as f32).collect::<Vec<_>>();
    Ok(Tensor::from_vec(v, (is_terminated.len(),), device)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_nn::Init;

    fn varmap_with(t: &Tensor) -> Result<VarMap> {
        let vm = VarMap::new();
        let init = Init::Randn {
            mean: 0.0,
            stdev: 1.0,
        };
        vm.get((3,), "var1", init, DType::F32, &Device::Cpu)?;
        vm.data().lock().unwrap().get("var1").unwrap().set(t)?;
        Ok(vm)
    }

    fn var1(vm: &VarMap) -> Vec<f32> {
        vm.data()
            .lock()
            .unwrap()
            .get("var1")
            .unwrap()
            .as_tensor()
            .to_vec1::<f32>()
            .unwrap()
    }

    #[test]
    fn test_track() -> Result<()> {
        let t_src = Tensor::from_slice(&[1.0f32, 2.0, 3.0], (3,), &Device::Cpu)?;
        let t_dest = Tensor::from_slice(&[4.0f32, 5.0, 6.0], (3,), &Device::Cpu)?;
        let vm_src = varmap_with(&t_src)?;
        let vm_dest = varmap_with(&t_dest)?;

        track(&vm_dest, &vm_src, 0.5)?;
        assert_eq!(var1(&vm_dest), vec![2.5, 3.5, 4.5]);

        // tau = 1 copies the source
        track(&vm_dest, &vm_src, 1.0)?;
        assert_eq!(var1(&vm_dest), vec![1.0, 2.0, 3.0]);
        assert_eq!(var1(&vm_src), vec![1.0, 2.0, 3.0]);

        Ok(())
    }

    #[test]
    fn test_track_missing_variable() -> Result<()> {
        let t = Tensor::zeros((3,), DType::F32, &Device::Cpu)?;
        let vm_dest = varmap_with(&t)?;
        let vm_src = VarMap::new();
        assert!(track(&vm_dest, &vm_src, 0.5).is_err());
        Ok(())
    }

    #[test]
    fn test_bellman_target() -> Result<()> {
        let dev = Device::Cpu;
        let reward = Tensor::from_slice(&[1.0f32, -2.0, 0.5], (3,), &dev)?;
        let terminal = terminal_to_tensor(&[0, 1, 0], &dev)?;
        let q_next = Tensor::from_slice(&[10.0f32, 100.0, -4.0], (3,), &dev)?;

        let tgt = bellman_target(&reward, &terminal, &q_next, 0.5)?.to_vec1::<f32>()?;

        assert_eq!(tgt[0], 6.0);
        // terminal transition, the target is the reward
        assert_eq!(tgt[1], -2.0);
        assert_eq!(tgt[2], -1.5);

        Ok(())
    }

    #[test]
    fn test_smooth_l1_loss() -> Result<()> {
        let dev = Device::Cpu;
        let x = Tensor::from_slice(&[0.0f32, 0.0], (2,), &dev)?;
        let y = Tensor::from_slice(&[0.5f32, 3.0], (2,), &dev)?;

        // (0.5 * 0.25 + (3.0 - 0.5)) / 2
        let loss = smooth_l1_loss(&x, &y)?.to_scalar::<f32>()?;
        assert!((loss - 1.3125).abs() < 1e-6);

        Ok(())
    }

    #[test]
    fn test_slice_to_tensor() -> Result<()> {
        let t = slice_to_tensor(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3, &Device::Cpu)?;
        assert_eq!(t.dims(), &[2, 3]);
        Ok(())
    }
}

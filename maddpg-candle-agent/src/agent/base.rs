//! Multi-agent agent.
use super::MaAgentConfig;
use crate::{
    maddpg::Algorithm,
    util::{bellman_target, slice_to_tensor, terminal_to_tensor},
};
use anyhow::Result;
use candle_core::{Device, Tensor};
use log::{debug, info, trace};
use maddpg_core::{
    error::MaddpgError,
    record::{Record, RecordValue},
    replay_memory::{ReplayMemory, Transition, TransitionBatch},
    LearnGate, LearnSchedule, MaAgentBase, SkipReason,
};

/// An agent trained with a centralized critic.
///
/// The agent owns an [`Algorithm`], a replay memory holding its own
/// transitions and the counter of train steps. The replay memories of all
/// co-training agents must be filled in lockstep, so that the same index
/// refers to the same time step in every memory.
pub struct MaAgent<A: Algorithm> {
    algorithm: A,
    config: MaAgentConfig,
    memory: ReplayMemory,
    schedule: LearnSchedule,
    device: Device,
}

impl<A: Algorithm> MaAgent<A> {
    /// Constructs an agent and copies the online networks of `algorithm` to
    /// its target networks.
    pub fn build(mut algorithm: A, config: MaAgentConfig, device: Device) -> Result<Self> {
        config.check()?;
        let i = config.agent_index;
        if algorithm.agent_index() != i {
            return Err(MaddpgError::InvalidConfig(format!(
                "algorithm of agent {} is configured for agent {}",
                i,
                algorithm.agent_index()
            ))
            .into());
        }
        let memory = ReplayMemory::build(
            &config.replay_memory_config,
            config.obs_dim_n[i],
            config.act_dim_n[i],
        )?;
        let schedule = LearnSchedule::new(config.learn_interval, config.min_memory_size());

        algorithm.sync_target(Some(0.0))?;
        info!(
            "Built agent {} of {}, target networks synchronized",
            i,
            config.n_agents()
        );

        Ok(Self {
            algorithm,
            config,
            memory,
            schedule,
            device,
        })
    }

    /// Returns the algorithm.
    pub fn algorithm(&self) -> &A {
        &self.algorithm
    }

    /// Returns the replay memory.
    pub fn memory(&self) -> &ReplayMemory {
        &self.memory
    }

    /// Returns the configuration.
    pub fn config(&self) -> &MaAgentConfig {
        &self.config
    }

    /// Returns the number of calls of `learn` so far.
    pub fn train_step(&self) -> usize {
        self.schedule.train_step()
    }

    /// Returns the speed-up flag.
    pub fn is_speedup(&self) -> bool {
        self.config.speedup
    }

    fn skipped_record(train_step: usize) -> Record {
        Record::from_slice(&[
            ("critic_loss", RecordValue::Scalar(0.0)),
            ("train_step", RecordValue::Scalar(train_step as f32)),
            ("updated", RecordValue::Scalar(0.0)),
        ])
    }

    /// Checks that `agents` are the agents this agent is trained with and that
    /// their memories were filled in lockstep with its own.
    fn check_lockstep(&self, agents: &[Self]) -> Result<()> {
        let n = self.config.n_agents();
        if agents.len() != n {
            return Err(MaddpgError::DimensionMismatch {
                what: "number of agents".into(),
                expected: n,
                actual: agents.len(),
            }
            .into());
        }

        for (j, agent) in agents.iter().enumerate() {
            if agent.config.agent_index != j {
                return Err(MaddpgError::InvalidConfig(format!(
                    "agent at position {} has index {}",
                    j, agent.config.agent_index
                ))
                .into());
            }
            if agent.memory.obs_dim() != self.config.obs_dim_n[j] {
                return Err(MaddpgError::DimensionMismatch {
                    what: format!("obs of agent {}", j),
                    expected: self.config.obs_dim_n[j],
                    actual: agent.memory.obs_dim(),
                }
                .into());
            }
            if agent.memory.act_dim() != self.config.act_dim_n[j] {
                return Err(MaddpgError::DimensionMismatch {
                    what: format!("act of agent {}", j),
                    expected: self.config.act_dim_n[j],
                    actual: agent.memory.act_dim(),
                }
                .into());
            }
            if agent.memory.n_appended() != self.memory.n_appended()
                || agent.memory.len() != self.memory.len()
            {
                return Err(MaddpgError::MisalignedMemories {
                    agent: j,
                    expected: self.memory.n_appended(),
                    actual: agent.memory.n_appended(),
                }
                .into());
            }
        }

        Ok(())
    }

    fn to_tensors(&self, batch: &TransitionBatch) -> Result<(Tensor, Tensor, Tensor)> {
        let obs = slice_to_tensor(&batch.obs, batch.obs_dim, &self.device)?;
        let act = slice_to_tensor(&batch.act, batch.act_dim, &self.device)?;
        let next_obs = slice_to_tensor(&batch.next_obs, batch.obs_dim, &self.device)?;
        Ok((obs, act, next_obs))
    }

    /// Assembles the joint batch at `ixs` and the Bellman target of this agent.
    fn make_batch(&self, agents: &[Self], ixs: &[usize]) -> Result<(Vec<Tensor>, Vec<Tensor>, Tensor)> {
        let mut obs_n = Vec::with_capacity(agents.len());
        let mut act_n = Vec::with_capacity(agents.len());
        let mut next_obs_n = Vec::with_capacity(agents.len());
        let mut reward = None;
        let mut terminal = None;

        for (j, agent) in agents.iter().enumerate() {
            let batch = agent.memory.sample_batch_by_index(ixs)?;
            let (obs, act, next_obs) = self.to_tensors(&batch)?;
            obs_n.push(obs);
            act_n.push(act);
            next_obs_n.push(next_obs);
            if j == self.config.agent_index {
                reward = Some(Tensor::from_slice(&batch.reward, (ixs.len(),), &self.device)?);
                terminal = Some(terminal_to_tensor(&batch.is_terminated, &self.device)?);
            }
        }
        trace!("Sampled batches of {} agents", agents.len());

        let next_act_n = agents
            .iter()
            .zip(next_obs_n.iter())
            .map(|(agent, next_obs)| Ok(agent.algorithm.predict(next_obs, true)?.detach()))
            .collect::<Result<Vec<_>>>()?;
        let q_next = self
            .algorithm
            .q(&next_obs_n, &next_act_n, true)?
            .detach();
        trace!("Computed target Q");

        // Both are set since agent_index < agents.len()
        let (reward, terminal) = match (reward, terminal) {
            (Some(r), Some(t)) => (r, t),
            _ => {
                return Err(MaddpgError::IndexOutOfRange {
                    index: self.config.agent_index,
                    size: agents.len(),
                }
                .into())
            }
        };
        let target_q = bellman_target(&reward, &terminal, &q_next, self.algorithm.gamma())?;

        Ok((obs_n, act_n, target_q))
    }
}

impl<A: Algorithm> MaAgentBase for MaAgent<A> {
    fn agent_index(&self) -> usize {
        self.config.agent_index
    }

    fn predict(&self, obs: &[f32], use_target_model: bool) -> Result<Vec<f32>> {
        let obs_dim = self.memory.obs_dim();
        if obs.len() != obs_dim {
            return Err(MaddpgError::DimensionMismatch {
                what: "obs".into(),
                expected: obs_dim,
                actual: obs.len(),
            }
            .into());
        }
        let obs = Tensor::from_slice(obs, (1, obs_dim), &self.device)?;
        let act = self.algorithm.predict(&obs, use_target_model)?;
        Ok(act.flatten_all()?.to_vec1::<f32>()?)
    }

    fn add_experience(&mut self, tr: Transition) -> Result<()> {
        self.memory.append(tr)
    }

    fn learn_with_record(agents: &mut [Self], agent_index: usize) -> Result<Record> {
        if agent_index >= agents.len() {
            return Err(MaddpgError::IndexOutOfRange {
                index: agent_index,
                size: agents.len(),
            }
            .into());
        }

        let agent = &mut agents[agent_index];
        let gate = agent.schedule.step(agent.memory.len());
        let train_step = agent.schedule.train_step();
        match gate {
            LearnGate::Skip(SkipReason::Cadence) => return Ok(Self::skipped_record(train_step)),
            LearnGate::Skip(SkipReason::Warmup) => {
                debug!(
                    "agent {}: skip update at step {}, {} transitions in memory",
                    agent_index,
                    train_step,
                    agent.memory.len()
                );
                return Ok(Self::skipped_record(train_step));
            }
            LearnGate::Open => {}
        }

        {
            let agents: &[Self] = agents;
            agents[agent_index].check_lockstep(agents)?;
        }
        let ixs = {
            let agent = &mut agents[agent_index];
            agent.memory.make_index(agent.config.batch_size)?
        };
        let (obs_n, act_n, target_q) = {
            let agents: &[Self] = agents;
            agents[agent_index].make_batch(agents, &ixs)?
        };

        let agent = &mut agents[agent_index];
        let critic_loss = agent
            .algorithm
            .learn(&obs_n, &act_n, &target_q)?
            .to_scalar::<f32>()?;
        debug!(
            "agent {}: update at step {}, critic_loss = {}",
            agent_index, train_step, critic_loss
        );

        Ok(Record::from_slice(&[
            ("critic_loss", RecordValue::Scalar(critic_loss)),
            ("train_step", RecordValue::Scalar(train_step as f32)),
            ("updated", RecordValue::Scalar(1.0)),
        ]))
    }
}

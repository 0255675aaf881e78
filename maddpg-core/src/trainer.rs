//! Lockstep training of co-training agents.
mod config;
use crate::{
    error::MaddpgError,
    record::{
        Record,
        RecordValue::{DateTime, Scalar},
        Recorder,
    },
    replay_memory::Transition,
    MaAgentBase, MaEnv, MaStep,
};
use anyhow::Result;
use chrono::Local;
pub use config::TrainerConfig;
use log::{info, trace};

/// Runs episodes of a multi-agent environment and trains all agents on them.
///
/// # Training loop
///
/// For every episode:
///
/// 1. Reset the environment.
/// 2. Every agent predicts an action from its own observation.
/// 3. Apply the joint action to the environment.
/// 4. Push the transition of every agent into its replay memory. A transition
///    is terminal when the environment says so or when the episode reaches
///    `max_episode_len`.
/// 5. Call [`MaAgentBase::learn_with_record`] for every agent. Whether an
///    update actually happens is decided by the agents.
/// 6. Back to step 2 until all agents are done or the step limit is hit.
///
/// Every agent receives exactly one transition per environment step, which
/// keeps their replay memories index-aligned.
pub struct Trainer {
    max_episodes: usize,
    max_episode_len: usize,
    record_interval: usize,
}

impl Trainer {
    /// Constructs a trainer.
    pub fn build(config: TrainerConfig) -> Self {
        Self {
            max_episodes: config.max_episodes,
            max_episode_len: config.max_episode_len,
            record_interval: config.record_interval.max(1),
        }
    }

    fn check_n_agents<E: MaEnv, A: MaAgentBase>(env: &E, agents: &[A]) -> Result<()> {
        if env.n_agents() != agents.len() {
            return Err(MaddpgError::DimensionMismatch {
                what: "agents".to_string(),
                expected: env.n_agents(),
                actual: agents.len(),
            }
            .into());
        }
        for (i, agent) in agents.iter().enumerate() {
            if agent.agent_index() != i {
                return Err(MaddpgError::InvalidConfig(format!(
                    "agent at position {} has agent_index {}",
                    i,
                    agent.agent_index()
                ))
                .into());
            }
        }
        Ok(())
    }

    fn check_step(step: &MaStep, n_agents: usize) -> Result<()> {
        let lens = [
            ("obs_n", step.obs_n.len()),
            ("reward_n", step.reward_n.len()),
            ("done_n", step.done_n.len()),
        ];
        for (what, len) in lens.iter() {
            if *len != n_agents {
                return Err(MaddpgError::DimensionMismatch {
                    what: what.to_string(),
                    expected: n_agents,
                    actual: *len,
                }
                .into());
            }
        }
        Ok(())
    }

    /// Runs an episode. Returns the sum of rewards over agents and steps,
    /// the sum of critic losses of the updates and the number of updates.
    fn run_episode<E, A>(&self, env: &mut E, agents: &mut [A]) -> Result<(f32, f32, usize)>
    where
        E: MaEnv,
        A: MaAgentBase,
    {
        let mut obs_n = env.reset()?;
        if obs_n.len() != agents.len() {
            return Err(MaddpgError::DimensionMismatch {
                what: "obs_n".to_string(),
                expected: agents.len(),
                actual: obs_n.len(),
            }
            .into());
        }
        let mut episode_reward = 0f32;
        let mut loss_sum = 0f32;
        let mut n_updates = 0;

        for t in 1..=self.max_episode_len {
            let act_n = agents
                .iter()
                .zip(obs_n.iter())
                .map(|(agent, obs)| agent.predict(obs, false))
                .collect::<Result<Vec<_>>>()?;
            let step = env.step(&act_n)?;
            Self::check_step(&step, agents.len())?;
            let is_last = t == self.max_episode_len;

            for (i, agent) in agents.iter_mut().enumerate() {
                agent.add_experience(Transition::new(
                    obs_n[i].clone(),
                    act_n[i].clone(),
                    step.reward_n[i],
                    step.obs_n[i].clone(),
                    step.done_n[i] || is_last,
                ))?;
            }
            episode_reward += step.reward_n.iter().sum::<f32>();

            for i in 0..agents.len() {
                let record = A::learn_with_record(agents, i)?;
                if record.get_scalar("updated")? > 0.0 {
                    trace!("Agent {} updated at episode step {}", i, t);
                    loss_sum += record.get_scalar("critic_loss")?;
                    n_updates += 1;
                }
            }

            if step.is_done() {
                break;
            }
            obs_n = step.obs_n;
        }

        Ok((episode_reward, loss_sum, n_updates))
    }

    /// Trains the agents and returns the reward of every episode.
    ///
    /// `agents[i]` must be the agent with `agent_index() == i`.
    pub fn train<E, A, R>(&self, env: &mut E, agents: &mut [A], recorder: &mut R) -> Result<Vec<f32>>
    where
        E: MaEnv,
        A: MaAgentBase,
        R: Recorder,
    {
        Self::check_n_agents(env, agents)?;
        let mut rewards = Vec::with_capacity(self.max_episodes);
        let mut loss_sum = 0f32;
        let mut n_updates = 0;

        for episode in 1..=self.max_episodes {
            let (reward, loss, n) = self.run_episode(env, agents)?;
            rewards.push(reward);
            loss_sum += loss;
            n_updates += n;

            if episode % self.record_interval == 0 {
                let from = rewards.len().saturating_sub(self.record_interval);
                let mean_reward =
                    rewards[from..].iter().sum::<f32>() / (rewards.len() - from) as f32;
                let mean_loss = match n_updates {
                    0 => 0f32,
                    n => loss_sum / n as f32,
                };
                info!(
                    "Episode {}: mean reward {:.3}, mean critic loss {:.5}, {} updates",
                    episode, mean_reward, mean_loss, n_updates
                );

                let record = Record::from_slice(&[
                    ("datetime", DateTime(Local::now())),
                    ("episode", Scalar(episode as f32)),
                    ("episode_reward", Scalar(mean_reward)),
                    ("mean_critic_loss", Scalar(mean_loss)),
                    ("n_updates", Scalar(n_updates as f32)),
                ]);
                recorder.write(record);
                loss_sum = 0.0;
                n_updates = 0;
            }
        }

        Ok(rewards)
    }
}

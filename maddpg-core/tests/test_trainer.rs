use anyhow::Result;
use maddpg_core::{
    error::MaddpgError,
    record::{BufferedRecorder, NullRecorder, Record, RecordValue},
    replay_memory::{ReplayMemory, ReplayMemoryConfig, Transition},
    LearnSchedule, MaAgentBase, MaEnv, MaStep, Trainer, TrainerConfig,
};

const OBS_DIM: usize = 2;
const ACT_DIM: usize = 1;

/// Agents moving on a line; the episode ends after `horizon` steps.
struct LineEnv {
    n_agents: usize,
    horizon: usize,
    t: usize,
    pos: Vec<f32>,
}

impl LineEnv {
    fn new(n_agents: usize, horizon: usize) -> Self {
        Self {
            n_agents,
            horizon,
            t: 0,
            pos: vec![0.0; n_agents],
        }
    }

    fn obs_n(&self) -> Vec<Vec<f32>> {
        self.pos.iter().map(|&p| vec![p, self.t as f32]).collect()
    }
}

impl MaEnv for LineEnv {
    fn n_agents(&self) -> usize {
        self.n_agents
    }

    fn reset(&mut self) -> Result<Vec<Vec<f32>>> {
        self.t = 0;
        self.pos = vec![0.0; self.n_agents];
        Ok(self.obs_n())
    }

    fn step(&mut self, act_n: &[Vec<f32>]) -> Result<MaStep> {
        self.t += 1;
        for (p, a) in self.pos.iter_mut().zip(act_n) {
            *p += a[0];
        }
        let done = self.t >= self.horizon;
        Ok(MaStep {
            obs_n: self.obs_n(),
            reward_n: self.pos.iter().map(|p| -p.abs()).collect(),
            done_n: vec![done; self.n_agents],
        })
    }
}

/// Agent without networks, counting its updates.
struct CountingAgent {
    agent_index: usize,
    memory: ReplayMemory,
    schedule: LearnSchedule,
    n_updates: usize,
}

impl CountingAgent {
    fn new(agent_index: usize, interval: usize, min_memory_size: usize) -> Self {
        let config = ReplayMemoryConfig::default().capacity(1000);
        Self {
            agent_index,
            memory: ReplayMemory::build(&config, OBS_DIM, ACT_DIM).unwrap(),
            schedule: LearnSchedule::new(interval, min_memory_size),
            n_updates: 0,
        }
    }
}

impl MaAgentBase for CountingAgent {
    fn agent_index(&self) -> usize {
        self.agent_index
    }

    fn predict(&self, _obs: &[f32], _use_target_model: bool) -> Result<Vec<f32>> {
        Ok(vec![0.5])
    }

    fn add_experience(&mut self, tr: Transition) -> Result<()> {
        self.memory.append(tr)
    }

    fn learn_with_record(agents: &mut [Self], agent_index: usize) -> Result<Record> {
        let len = agents[agent_index].memory.len();
        let agent = &mut agents[agent_index];
        let gate = agent.schedule.step(len);
        let (loss, updated) = if gate.is_open() {
            agent.n_updates += 1;
            (1.0, 1.0)
        } else {
            (0.0, 0.0)
        };
        Ok(Record::from_slice(&[
            ("critic_loss", RecordValue::Scalar(loss)),
            ("updated", RecordValue::Scalar(updated)),
        ]))
    }
}

#[test]
fn test_memories_stay_in_lockstep() -> Result<()> {
    let mut env = LineEnv::new(2, 5);
    let mut agents = vec![CountingAgent::new(0, 1, 0), CountingAgent::new(1, 1, 0)];
    let trainer = Trainer::build(TrainerConfig::default().max_episodes(3).max_episode_len(10));

    let rewards = trainer.train(&mut env, &mut agents, &mut NullRecorder::new())?;

    assert_eq!(rewards.len(), 3);
    // episodes end by the environment after 5 steps
    for agent in agents.iter() {
        assert_eq!(agent.memory.len(), 15);
        assert_eq!(agent.memory.n_appended(), 15);
        assert_eq!(agent.n_updates, 15);
    }

    // the last step of every episode is terminal
    let batch = agents[0].memory.sample_batch_by_index(&[3, 4, 9])?;
    assert_eq!(batch.is_terminated, vec![0, 1, 1]);

    Ok(())
}

#[test]
fn test_episode_step_limit_is_terminal() -> Result<()> {
    let mut env = LineEnv::new(1, 100);
    let mut agents = vec![CountingAgent::new(0, 1, 0)];
    let trainer = Trainer::build(TrainerConfig::default().max_episodes(2).max_episode_len(4));

    trainer.train(&mut env, &mut agents, &mut NullRecorder::new())?;

    let batch = agents[0].memory.sample_batch_by_index(&[2, 3, 7])?;
    assert_eq!(batch.is_terminated, vec![0, 1, 1]);

    Ok(())
}

#[test]
fn test_records_are_written() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut env = LineEnv::new(2, 5);
    let mut agents = vec![CountingAgent::new(0, 5, 5), CountingAgent::new(1, 5, 5)];
    let trainer = Trainer::build(
        TrainerConfig::default()
            .max_episodes(4)
            .max_episode_len(5)
            .record_interval(2),
    );
    let mut recorder = BufferedRecorder::new();

    trainer.train(&mut env, &mut agents, &mut recorder)?;

    assert_eq!(recorder.len(), 2);
    let records = recorder.iter().collect::<Vec<_>>();
    assert!(records[0].get_datetime("datetime").is_ok());
    assert_eq!(records[0].get_scalar("episode")?, 2.0);
    assert_eq!(records[1].get_scalar("episode")?, 4.0);
    // the reward of an episode is the same in every episode
    assert_eq!(
        records[0].get_scalar("episode_reward")?,
        records[1].get_scalar("episode_reward")?
    );
    // at train step 5 the memory holds 5 transitions, which is not above the
    // threshold, so the first two episodes only update at step 10
    assert_eq!(records[0].get_scalar("n_updates")?, 2.0);
    assert_eq!(records[1].get_scalar("n_updates")?, 4.0);

    Ok(())
}

#[test]
fn test_agent_count_mismatch() {
    let mut env = LineEnv::new(3, 5);
    let mut agents = vec![CountingAgent::new(0, 1, 0), CountingAgent::new(1, 1, 0)];
    let trainer = Trainer::build(TrainerConfig::default().max_episodes(1));

    let err = trainer
        .train(&mut env, &mut agents, &mut NullRecorder::new())
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<MaddpgError>(),
        Some(MaddpgError::DimensionMismatch { expected: 3, actual: 2, .. })
    ));
}

/// Drops the reward of the last agent.
struct ShortRewardEnv(LineEnv);

impl MaEnv for ShortRewardEnv {
    fn n_agents(&self) -> usize {
        self.0.n_agents()
    }

    fn reset(&mut self) -> Result<Vec<Vec<f32>>> {
        self.0.reset()
    }

    fn step(&mut self, act_n: &[Vec<f32>]) -> Result<MaStep> {
        let mut step = self.0.step(act_n)?;
        step.reward_n.pop();
        Ok(step)
    }
}

#[test]
fn test_short_step_is_an_error() {
    let mut env = ShortRewardEnv(LineEnv::new(2, 5));
    let mut agents = vec![CountingAgent::new(0, 1, 0), CountingAgent::new(1, 1, 0)];
    let trainer = Trainer::build(TrainerConfig::default().max_episodes(1));

    let err = trainer
        .train(&mut env, &mut agents, &mut NullRecorder::new())
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<MaddpgError>(),
        Some(&MaddpgError::DimensionMismatch {
            what: "reward_n".to_string(),
            expected: 2,
            actual: 1
        })
    );
    assert_eq!(agents[0].memory.len(), 0);
}

/// Agent whose records lack the update flag.
struct SilentAgent(CountingAgent);

impl MaAgentBase for SilentAgent {
    fn agent_index(&self) -> usize {
        self.0.agent_index
    }

    fn predict(&self, obs: &[f32], use_target_model: bool) -> Result<Vec<f32>> {
        self.0.predict(obs, use_target_model)
    }

    fn add_experience(&mut self, tr: Transition) -> Result<()> {
        self.0.add_experience(tr)
    }

    fn learn_with_record(_agents: &mut [Self], _agent_index: usize) -> Result<Record> {
        Ok(Record::from_scalar("critic_loss", 0.0))
    }
}

#[test]
fn test_missing_update_flag_is_an_error() {
    let mut env = LineEnv::new(1, 5);
    let mut agents = vec![SilentAgent(CountingAgent::new(0, 1, 0))];
    let trainer = Trainer::build(TrainerConfig::default().max_episodes(1));

    let err = trainer
        .train(&mut env, &mut agents, &mut NullRecorder::new())
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<MaddpgError>(),
        Some(&MaddpgError::RecordKeyError("updated".to_string()))
    );
}

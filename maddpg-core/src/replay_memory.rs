//! Fixed-capacity replay memory of a single agent.
//!
//! Every agent owns a [`ReplayMemory`] holding its own view of the transitions
//! `(o_t, a_t, r_t, o_t+1, terminal_t)`. The memories of co-training agents
//! receive their transitions in lockstep, one per environment step, so that
//! the `i`-th slot of every memory refers to the same environment step. This
//! is what makes sampling with a shared index set meaningful, see
//! [`ReplayMemory::make_index`] and [`ReplayMemory::sample_batch_by_index`].
mod base;
mod batch;
mod config;
pub use base::ReplayMemory;
pub use batch::{Transition, TransitionBatch};
pub use config::ReplayMemoryConfig;

//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug, PartialEq)]
pub enum MaddpgError {
    /// The configuration of an agent or a component is inconsistent.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The length of a given vector does not match the expected dimension.
    #[error("Dimension mismatch in {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// What was checked.
        what: String,
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// Replay memories of co-training agents did not receive transitions in lockstep.
    ///
    /// Sampling with a shared index set requires that the `i`-th transition of
    /// every memory comes from the same environment step.
    #[error("Replay memory of agent {agent} is out of lockstep: {actual} appends, expected {expected}")]
    MisalignedMemories {
        /// Index of the offending agent.
        agent: usize,
        /// Number of appends in the memory of the learning agent.
        expected: usize,
        /// Number of appends in the memory of the offending agent.
        actual: usize,
    },

    /// Sampling was requested from a replay memory without transitions.
    #[error("Replay memory is empty")]
    EmptyMemory,

    /// A sample index does not point to a stored transition.
    #[error("Index {index} is out of range for a replay memory of size {size}")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of transitions in the memory.
        size: usize,
    },

    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),
}

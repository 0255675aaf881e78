//! Records of training metrics.
//!
//! A [`Record`] is a set of named values produced by an agent or by the
//! [`Trainer`](crate::Trainer). Records are handed to a [`Recorder`], which
//! decides what to do with them.
//!
//! ```rust
//! use maddpg_core::record::{Record, RecordValue};
//!
//! let mut record = Record::from_scalar("critic_loss", 0.25);
//! record.insert("episode", RecordValue::Scalar(3.0));
//! assert_eq!(record.get_scalar("critic_loss").unwrap(), 0.25);
//! ```
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;

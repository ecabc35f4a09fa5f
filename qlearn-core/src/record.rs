//! Types and traits for recording training metrics.
//!
//! A [`Record`] is a bag of named values produced by environments, agents and
//! the [`Trainer`](crate::Trainer). Records are handed to a [`Recorder`],
//! which either writes them right away or stores them and writes aggregates
//! (min, max, mean, median) when flushed.
//!
//! ```rust
//! use qlearn_core::record::{Record, RecordValue};
//!
//! let mut record = Record::empty();
//! record.insert("episode", RecordValue::Scalar(3.0));
//! record.insert("episode_return", RecordValue::Scalar(-1.5));
//! assert_eq!(record.get_scalar("episode_return").unwrap(), -1.5);
//! ```
mod base;
mod buffered_recorder;
mod log_recorder;
mod null_recorder;
mod recorder;
mod storage;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use log_recorder::LogRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;
pub use storage::RecordStorage;

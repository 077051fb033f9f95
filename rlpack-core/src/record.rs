//! Types for reporting information on training steps.
//!
//! [`Agent::train_with_record`](crate::Agent::train_with_record) returns a
//! [`Record`], a flexible container of key-value pairs.
//!
//! ```rust
//! use rlpack_core::record::{Record, RecordValue};
//!
//! let mut record = Record::from_scalar("loss", 0.5);
//! record.insert("epsilon", RecordValue::Scalar(0.9));
//! assert_eq!(record.get_scalar("loss").unwrap(), 0.5);
//! ```
mod base;
pub use base::{Record, RecordValue};

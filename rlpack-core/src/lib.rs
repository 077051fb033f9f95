#![warn(missing_docs)]
//! Core interfaces of rlpack.
//!
//! This crate does not depend on any tensor backend. It defines the [`Agent`]
//! trait implemented by backend crates, the replay-buffer interfaces, a generic
//! fixed-capacity [`TransitionMemory`](replay_buffer::TransitionMemory) and the
//! [`Record`](record::Record) container used to report training information.
pub mod error;
pub mod record;
pub mod replay_buffer;

mod base;
pub use base::{Agent, ExperienceBufferBase};

//! Fixed-capacity memory of transitions with uniform sampling.
mod base;
mod config;
mod transition;
pub use base::TransitionMemory;
pub use config::TransitionMemoryConfig;
pub use transition::Transition;

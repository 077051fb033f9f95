//! DQN agent implemented with [tch](https://crates.io/crates/tch).
//!
//! The agent ([`dqn::Dqn`]) owns a policy and a target Q-network, both
//! instances of the 1-D convolutional architecture [`dqn1d::Dqn1d`], and is
//! trained online from single transitions handed over by a driving loop.
//! [`dqn::DqnBuilder`] constructs an agent from a model name and two sets of
//! arguments, typically read from a YAML file.
pub mod dqn;
pub mod dqn1d;
pub mod model;
pub mod opt;
pub mod util;

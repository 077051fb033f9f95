//! DQN agent.
mod base;
mod builder;
mod config;
pub mod explorer;
mod model;
pub use base::Dqn;
pub use builder::DqnBuilder;
pub use config::DqnConfig;
pub use explorer::EpsilonGreedy;
pub use model::DqnModel;

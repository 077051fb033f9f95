//! Constructs DQN agent from a model name and two sets of arguments.
use super::{Dqn, DqnConfig};
use crate::dqn1d::{Dqn1d, Dqn1dConfig};
use anyhow::Result;
use log::info;
use rlpack_core::error::RlpackError;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Constructs [`Dqn`] from a configuration file.
///
/// The YAML form has a `model_name`, the arguments of the Q-network under
/// `model_args` and the arguments of the agent under `agent_args`:
///
/// ```yaml
/// model_name: dqn1d
/// model_args:
///   sequence_length: 8
///   channels: [1, 16]
///   kernel_sizes: [3]
///   strides_sizes: [1]
///   dilation_sizes: [1]
///   dropout: 0.1
///   num_actions: 2
/// agent_args:
///   gamma: 0.99
///   epsilon: 1.0
///   epsilon_decay_rate: 0.99
///   memory_buffer_size: 64
///   target_model_update_rate: 16
///   policy_model_update_rate: 4
///   num_actions: 2
///   optimizer: adam
///   lr: 0.001
///   save_path: ./model/dqn
/// ```
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct DqnBuilder {
    model_name: String,
    model_args: Dqn1dConfig,
    agent_args: DqnConfig,
}

impl DqnBuilder {
    /// Constructs a builder.
    pub fn new(model_name: impl Into<String>, model_args: Dqn1dConfig, agent_args: DqnConfig) -> Self {
        Self {
            model_name: model_name.into(),
            model_args,
            agent_args,
        }
    }

    /// Arguments of the agent.
    pub fn agent_args(&self) -> &DqnConfig {
        &self.agent_args
    }

    /// Replaces the arguments of the agent, e.g., to set the device.
    pub fn with_agent_args(mut self, agent_args: DqnConfig) -> Self {
        self.agent_args = agent_args;
        self
    }

    /// Builds the agent.
    ///
    /// Fails with [`RlpackError::UnknownModel`] unless `model_name` is `"dqn1d"`,
    /// and with [`RlpackError::UnknownOptimizer`] for an unknown optimizer.
    pub fn build(&self) -> Result<Dqn<Dqn1d>> {
        match self.model_name.as_str() {
            "dqn1d" => {
                info!("Build DQN agent with model {}", self.model_name);
                Dqn::build(self.model_args.clone(), self.agent_args.clone())
            }
            _ => Err(RlpackError::UnknownModel(self.model_name.clone()).into()),
        }
    }

    /// Loads [`DqnBuilder`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        info!("Load DQN builder from {:?}", path_);
        Ok(b)
    }

    /// Saves [`DqnBuilder`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path_ = path.as_ref().to_owned();
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        info!("Save DQN builder into {:?}", path_);
        Ok(())
    }
}

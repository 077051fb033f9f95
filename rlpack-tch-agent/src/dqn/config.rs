//! Configuration of DQN agent.
use crate::util::CriticLoss;
use anyhow::Result;
use log::info;
use rlpack_core::error::RlpackError;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};
use tch::Device;

fn default_min_epsilon() -> f64 {
    1e-3
}

fn default_device() -> Device {
    Device::Cpu
}

/// Constructs [`Dqn`](super::Dqn).
///
/// Field names follow the keys of the agent arguments in configuration files.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct DqnConfig {
    pub(super) gamma: f64,
    pub(super) epsilon: f64,
    pub(super) epsilon_decay_rate: f64,
    #[serde(default = "default_min_epsilon")]
    pub(super) min_epsilon: f64,
    pub(super) memory_buffer_size: usize,

    /// Falls back to `memory_buffer_size` if not given.
    #[serde(default)]
    pub(super) batch_size: Option<usize>,
    pub(super) target_model_update_rate: usize,
    pub(super) policy_model_update_rate: usize,
    pub(super) num_actions: i64,
    pub(super) optimizer: String,
    pub(super) lr: f64,
    pub(super) save_path: PathBuf,
    #[serde(default)]
    pub(super) critic_loss: CriticLoss,
    #[serde(default)]
    pub(super) copy_target_on_build: bool,
    #[serde(default)]
    pub(super) load_on_build: bool,
    #[serde(default)]
    pub(super) seed: Option<u64>,
    #[serde(skip, default = "default_device")]
    pub(super) device: Device,
}

impl Default for DqnConfig {
    fn default() -> Self {
        Self {
            gamma: 0.99,
            epsilon: 1.0,
            epsilon_decay_rate: 0.995,
            min_epsilon: default_min_epsilon(),
            memory_buffer_size: 10000,
            batch_size: Some(32),
            target_model_update_rate: 1000,
            policy_model_update_rate: 1,
            num_actions: 2,
            optimizer: "adam".to_string(),
            lr: 1e-3,
            save_path: PathBuf::from("./model/dqn"),
            critic_loss: CriticLoss::default(),
            copy_target_on_build: false,
            load_on_build: false,
            seed: None,
            device: default_device(),
        }
    }
}

impl DqnConfig {
    /// Discount factor.
    pub fn gamma(mut self, v: f64) -> Self {
        self.gamma = v;
        self
    }

    /// Initial exploration rate.
    pub fn epsilon(mut self, v: f64) -> Self {
        self.epsilon = v;
        self
    }

    /// Multiplicative decay of the exploration rate, applied on every training step.
    pub fn epsilon_decay_rate(mut self, v: f64) -> Self {
        self.epsilon_decay_rate = v;
        self
    }

    /// Floor of the exploration rate.
    pub fn min_epsilon(mut self, v: f64) -> Self {
        self.min_epsilon = v;
        self
    }

    /// Capacity of the transition memory.
    pub fn memory_buffer_size(mut self, v: usize) -> Self {
        self.memory_buffer_size = v;
        self
    }

    /// Minibatch size. `None` uses the whole memory capacity.
    pub fn batch_size(mut self, v: Option<usize>) -> Self {
        self.batch_size = v;
        self
    }

    /// Interval, in training steps, of copying the policy network into the target network.
    pub fn target_model_update_rate(mut self, v: usize) -> Self {
        self.target_model_update_rate = v;
        self
    }

    /// Interval, in training steps, of optimizing the policy network.
    pub fn policy_model_update_rate(mut self, v: usize) -> Self {
        self.policy_model_update_rate = v;
        self
    }

    /// Number of discrete actions.
    pub fn num_actions(mut self, v: i64) -> Self {
        self.num_actions = v;
        self
    }

    /// Optimizer name and learning rate.
    pub fn optimizer(mut self, name: impl Into<String>, lr: f64) -> Self {
        self.optimizer = name.into();
        self.lr = lr;
        self
    }

    /// Directory in which parameters are saved.
    pub fn save_path(mut self, v: impl AsRef<Path>) -> Self {
        self.save_path = v.as_ref().to_owned();
        self
    }

    /// Critic loss.
    pub fn critic_loss(mut self, v: CriticLoss) -> Self {
        self.critic_loss = v;
        self
    }

    /// Starts the target network as a copy of the policy network.
    pub fn copy_target_on_build(mut self, v: bool) -> Self {
        self.copy_target_on_build = v;
        self
    }

    /// Loads parameters from `save_path` when the agent is built.
    pub fn load_on_build(mut self, v: bool) -> Self {
        self.load_on_build = v;
        self
    }

    /// Random seed of libtorch, the transition memory and the explorer.
    ///
    /// The libtorch generator is global to the process: building a seeded
    /// agent reseeds parameter initialization and dropout for every agent
    /// already alive. The memory and the explorer have their own generators.
    pub fn seed(mut self, v: Option<u64>) -> Self {
        self.seed = v;
        self
    }

    /// Device.
    pub fn device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    /// Minibatch size actually used.
    pub fn get_batch_size(&self) -> usize {
        self.batch_size.unwrap_or(self.memory_buffer_size)
    }

    pub(super) fn check(&self) -> Result<()> {
        let invalid = |msg: String| -> Result<()> { Err(RlpackError::InvalidConfig(msg).into()) };

        if !(0.0..=1.0).contains(&self.gamma) {
            return invalid(format!("gamma = {} not in [0, 1]", self.gamma));
        }
        if !(0.0..=1.0).contains(&self.epsilon) {
            return invalid(format!("epsilon = {} not in [0, 1]", self.epsilon));
        }
        if !(self.epsilon_decay_rate > 0.0 && self.epsilon_decay_rate <= 1.0) {
            return invalid(format!(
                "epsilon_decay_rate = {} not in (0, 1]",
                self.epsilon_decay_rate
            ));
        }
        if self.min_epsilon < 0.0 || self.min_epsilon > self.epsilon {
            return invalid(format!(
                "min_epsilon = {} not in [0, epsilon = {}]",
                self.min_epsilon, self.epsilon
            ));
        }
        if self.memory_buffer_size == 0 {
            return invalid("memory_buffer_size must be positive".into());
        }
        let batch_size = self.get_batch_size();
        if batch_size == 0 || batch_size > self.memory_buffer_size {
            return invalid(format!(
                "batch_size = {} not in [1, memory_buffer_size = {}]",
                batch_size, self.memory_buffer_size
            ));
        }
        if self.target_model_update_rate == 0 || self.policy_model_update_rate == 0 {
            return invalid("update rates must be positive".into());
        }
        if self.num_actions < 1 {
            return invalid(format!("num_actions = {}", self.num_actions));
        }
        Ok(())
    }

    /// Loads [`DqnConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        info!("Load config of DQN agent from {:?}", path_);
        Ok(b)
    }

    /// Saves [`DqnConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path_ = path.as_ref().to_owned();
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        info!("Save config of DQN agent into {:?}", path_);
        Ok(())
    }
}

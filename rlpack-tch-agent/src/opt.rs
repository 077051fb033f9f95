//! Optimizers.
use anyhow::Result;
use log::info;
use rlpack_core::error::RlpackError;
use serde::{Deserialize, Serialize};
use tch::{
    nn::{Adam, Optimizer as Optimizer_, OptimizerConfig as OptimizerConfig_, VarStore},
    Tensor,
};

/// Configures an optimizer for training the policy network.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub enum OptimizerConfig {
    /// Adam optimizer.
    Adam {
        /// Learning rate.
        lr: f64,
    },
}

impl OptimizerConfig {
    /// Resolves an optimizer identifier, as given in agent arguments.
    ///
    /// Only `"adam"` is known; any other name is a configuration error.
    pub fn from_name(name: &str, lr: f64) -> Result<Self> {
        match name {
            "adam" => Ok(OptimizerConfig::Adam { lr }),
            _ => Err(RlpackError::UnknownOptimizer(name.to_string()).into()),
        }
    }

    /// Constructs an optimizer bound to the variables in `vs`.
    pub fn build(&self, vs: &VarStore) -> Result<Optimizer> {
        match &self {
            OptimizerConfig::Adam { lr } => {
                let opt = Adam::default().build(vs, *lr)?;
                info!("Build Adam optimizer with lr = {}", lr);
                Ok(Optimizer::Adam(opt))
            }
        }
    }
}

/// Optimizers.
///
/// This is a thin wrapper of [tch::nn::Optimizer].
///
/// [tch::nn::Optimizer]: https://docs.rs/tch/0.16.0/tch/nn/struct.Optimizer.html
pub enum Optimizer {
    /// Adam optimizer.
    Adam(Optimizer_),
}

impl Optimizer {
    /// Applies a backward step pass.
    pub fn backward_step(&mut self, loss: &Tensor) {
        match self {
            Self::Adam(opt) => {
                opt.backward_step(loss);
            }
        }
    }
}

use super::Dqn1dLayout;
use crate::util::OutDim;
use anyhow::Result;
use rlpack_core::error::RlpackError;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

fn default_activation() -> String {
    "relu".to_string()
}

/// Configuration of [`Dqn1d`](super::Dqn1d).
///
/// Field names follow the keys of the model arguments in configuration files.
/// `channels` has one more entry than the per-block lists: `channels[i]` and
/// `channels[i + 1]` are the input and output channels of block `i`.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct Dqn1dConfig {
    pub(super) sequence_length: i64,
    pub(super) channels: Vec<i64>,
    pub(super) kernel_sizes: Vec<i64>,
    pub(super) strides_sizes: Vec<i64>,
    pub(super) dilation_sizes: Vec<i64>,

    /// Kept for compatibility of configuration files; ReLU is always used.
    #[serde(default = "default_activation")]
    pub(super) activation: String,

    #[serde(default)]
    pub(super) dropout: f64,
    pub(super) num_actions: i64,

    #[serde(default)]
    pub(super) use_padding: bool,
}

impl Dqn1dConfig {
    /// Constructs a configuration with stride and dilation 1 in every block,
    /// no dropout and no padding.
    pub fn new(
        sequence_length: i64,
        channels: Vec<i64>,
        kernel_sizes: Vec<i64>,
        num_actions: i64,
    ) -> Self {
        let n_blocks = kernel_sizes.len();
        Self {
            sequence_length,
            channels,
            kernel_sizes,
            strides_sizes: vec![1; n_blocks],
            dilation_sizes: vec![1; n_blocks],
            activation: default_activation(),
            dropout: 0.0,
            num_actions,
            use_padding: false,
        }
    }

    /// Sets the strides of the convolution blocks.
    pub fn strides_sizes(mut self, v: Vec<i64>) -> Self {
        self.strides_sizes = v;
        self
    }

    /// Sets the dilations of the convolution blocks.
    pub fn dilation_sizes(mut self, v: Vec<i64>) -> Self {
        self.dilation_sizes = v;
        self
    }

    /// Sets the dropout probability applied before the linear layer.
    pub fn dropout(mut self, v: f64) -> Self {
        self.dropout = v;
        self
    }

    /// Sets the activation name.
    pub fn activation(mut self, v: impl Into<String>) -> Self {
        self.activation = v.into();
        self
    }

    /// Pads every block so that the sequence length is kept through the stack.
    pub fn use_padding(mut self, v: bool) -> Self {
        self.use_padding = v;
        self
    }

    /// Number of convolution blocks.
    pub fn n_blocks(&self) -> usize {
        self.kernel_sizes.len()
    }

    /// Computes the layout of the network, checking the configuration.
    pub fn layout(&self) -> Result<Dqn1dLayout> {
        self.check()?;
        if self.use_padding {
            Dqn1dLayout::padded(self)
        } else {
            Dqn1dLayout::unpadded(self)
        }
    }

    fn check(&self) -> Result<()> {
        let invalid = |msg: String| -> Result<()> { Err(RlpackError::InvalidConfig(msg).into()) };
        let n = self.n_blocks();

        if n == 0 {
            return invalid("at least one convolution block is required".into());
        }
        if self.channels.len() != n + 1 {
            return invalid(format!(
                "{} channels given for {} blocks, expected {}",
                self.channels.len(),
                n,
                n + 1
            ));
        }
        if self.strides_sizes.len() != n || self.dilation_sizes.len() != n {
            return invalid(format!(
                "kernel_sizes, strides_sizes and dilation_sizes must have the same length, \
                 got {}, {} and {}",
                n,
                self.strides_sizes.len(),
                self.dilation_sizes.len()
            ));
        }
        let lists = [
            ("channels", &self.channels),
            ("kernel_sizes", &self.kernel_sizes),
            ("strides_sizes", &self.strides_sizes),
            ("dilation_sizes", &self.dilation_sizes),
        ];
        for (name, list) in lists.iter() {
            if list.iter().any(|&v| v < 1) {
                return invalid(format!("{} must be positive: {:?}", name, list));
            }
        }
        if self.sequence_length < 1 {
            return invalid(format!("sequence_length = {}", self.sequence_length));
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return invalid(format!("dropout = {} not in [0, 1)", self.dropout));
        }
        if self.num_actions < 1 {
            return invalid(format!("num_actions = {}", self.num_actions));
        }
        Ok(())
    }

    /// Loads [`Dqn1dConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`Dqn1dConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

impl OutDim for Dqn1dConfig {
    fn get_out_dim(&self) -> i64 {
        self.num_actions
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn assert_invalid(config: Dqn1dConfig) {
        let err = config.layout().unwrap_err();
        assert!(
            matches!(
                err.downcast_ref::<RlpackError>(),
                Some(RlpackError::InvalidConfig(_))
            ),
            "unexpected error: {}",
            err
        );
    }

    #[test]
    fn test_invalid_configs() {
        let base = Dqn1dConfig::new(16, vec![4, 8], vec![3], 2);
        assert!(base.layout().is_ok());

        assert_invalid(Dqn1dConfig::new(16, vec![4, 8, 8], vec![3], 2));
        assert_invalid(base.clone().strides_sizes(vec![1, 1]));
        assert_invalid(base.clone().dilation_sizes(vec![0]));
        assert_invalid(base.clone().dropout(1.0));
        assert_invalid(Dqn1dConfig::new(16, vec![4, 8], vec![3], 0));
        assert_invalid(Dqn1dConfig::new(16, vec![4], vec![], 2));

        // Kernel wider than the sequence.
        assert_invalid(Dqn1dConfig::new(2, vec![4, 8], vec![5], 2));
    }

    #[test]
    fn test_deserialize_with_defaults() -> Result<()> {
        let yaml = "
sequence_length: 2
channels: [4, 16]
kernel_sizes: [1]
strides_sizes: [1]
dilation_sizes: [1]
num_actions: 4
";
        let config: Dqn1dConfig = serde_yaml::from_str(yaml)?;
        assert_eq!(config, Dqn1dConfig::new(2, vec![4, 16], vec![1], 4));
        Ok(())
    }
}

use super::{Dqn1dConfig, Dqn1dLayout};
use crate::model::SubModel;
use anyhow::Result;
use log::debug;
use tch::{nn, nn::ModuleT, Device, Kind, Tensor};

/// 1-D convolutional Q-network.
///
/// Input is `[batch, channels[0], sequence_length]`, output is
/// `[batch, num_actions]`. A single sample without the batch dimension is
/// also accepted.
pub struct Dqn1d {
    config: Dqn1dConfig,
    layout: Dqn1dLayout,
    in_shape: Vec<i64>,
    device: Device,
    seq: nn::SequentialT,
}

impl Dqn1d {
    fn create_net(
        var_store: &nn::VarStore,
        config: &Dqn1dConfig,
        layout: &Dqn1dLayout,
    ) -> nn::SequentialT {
        let p = &(var_store.root() / "dqn1d");
        let mut seq = nn::seq_t();

        for i in 0..config.n_blocks() {
            let conv_config = nn::ConvConfig {
                stride: config.strides_sizes[i],
                padding: layout.paddings[i],
                dilation: config.dilation_sizes[i],
                ..Default::default()
            };
            seq = seq.add(nn::conv1d(
                p / format!("conv_{}", i),
                config.channels[i],
                config.channels[i + 1],
                config.kernel_sizes[i],
                conv_config,
            ));
            seq = seq.add_fn(|xs| xs.relu());
        }

        let dropout = config.dropout;
        seq.add_fn(|xs| xs.flatten(1, -1))
            .add_fn_t(move |xs, train| xs.dropout(dropout, train))
            .add(nn::linear(
                p / "linear",
                layout.linear_in_dim,
                config.num_actions,
                Default::default(),
            ))
    }

    /// Lengths and paddings of the convolution stack.
    pub fn layout(&self) -> &Dqn1dLayout {
        &self.layout
    }
}

impl SubModel for Dqn1d {
    type Config = Dqn1dConfig;
    type Input = Tensor;
    type Output = Tensor;

    fn forward_t(&self, x: &Self::Input, train: bool) -> Tensor {
        let x = x.to_device(self.device).to_kind(Kind::Double);
        let x = if x.dim() == 2 { x.unsqueeze(0) } else { x };
        self.seq.forward_t(&x, train)
    }

    fn build(var_store: &nn::VarStore, config: Self::Config) -> Result<Self> {
        let layout = config.layout()?;
        debug!(
            "Dqn1d sequence lengths {:?}, paddings {:?}, linear input {}",
            layout.interim_lengths, layout.paddings, layout.linear_in_dim
        );
        let device = var_store.device();
        let seq = Self::create_net(var_store, &config, &layout);
        let in_shape = vec![config.channels[0], config.sequence_length];

        Ok(Self {
            config,
            layout,
            in_shape,
            device,
            seq,
        })
    }

    fn clone_with_var_store(&self, var_store: &nn::VarStore) -> Self {
        let config = self.config.clone();
        let layout = self.layout.clone();
        let device = var_store.device();
        let seq = Self::create_net(var_store, &config, &layout);

        Self {
            config,
            layout,
            in_shape: self.in_shape.clone(),
            device,
            seq,
        }
    }

    fn in_shape(&self) -> &[i64] {
        &self.in_shape
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn build(config: Dqn1dConfig) -> Result<(nn::VarStore, Dqn1d)> {
        let mut vs = nn::VarStore::new(Device::Cpu);
        let q = Dqn1d::build(&vs, config)?;
        vs.double();
        Ok((vs, q))
    }

    #[test]
    fn test_forward_shape() -> Result<()> {
        let config = Dqn1dConfig::new(16, vec![3, 8, 5], vec![4, 3], 6)
            .strides_sizes(vec![2, 1])
            .dilation_sizes(vec![1, 3])
            .dropout(0.5);
        let (_vs, q) = build(config)?;

        let x = Tensor::rand(&[7, 3, 16], (Kind::Double, Device::Cpu));
        assert_eq!(q.forward_t(&x, false).size(), vec![7, 6]);
        assert_eq!(q.forward_t(&x, true).size(), vec![7, 6]);

        // A single sample gets the batch dimension.
        let x = Tensor::rand(&[3, 16], (Kind::Double, Device::Cpu));
        assert_eq!(q.forward_t(&x, false).size(), vec![1, 6]);
        Ok(())
    }

    #[test]
    fn test_forward_padded() -> Result<()> {
        let config = Dqn1dConfig::new(8, vec![2, 4, 4], vec![3, 5], 3)
            .dilation_sizes(vec![1, 2])
            .use_padding(true);
        let (_vs, q) = build(config)?;
        assert_eq!(q.layout().linear_in_dim, 32);

        let x = Tensor::rand(&[2, 2, 8], (Kind::Double, Device::Cpu));
        assert_eq!(q.forward_t(&x, false).size(), vec![2, 3]);
        Ok(())
    }

    #[test]
    fn test_double_precision() -> Result<()> {
        let config = Dqn1dConfig::new(4, vec![2, 3], vec![2], 2);
        let (vs, q) = build(config)?;
        for (name, v) in vs.variables() {
            assert_eq!(v.kind(), Kind::Double, "variable {}", name);
        }

        // f32 inputs are cast.
        let x = Tensor::rand(&[1, 2, 4], (Kind::Float, Device::Cpu));
        assert_eq!(q.forward_t(&x, false).kind(), Kind::Double);
        Ok(())
    }

    #[test]
    fn test_dropout_only_in_train_mode() -> Result<()> {
        tch::manual_seed(0);
        let config = Dqn1dConfig::new(8, vec![1, 16], vec![3], 4).dropout(0.5);
        let (_vs, q) = build(config)?;
        let x = Tensor::ones(&[1, 1, 8], (Kind::Double, Device::Cpu));

        let y1 = q.forward_t(&x, false);
        let y2 = q.forward_t(&x, false);
        assert!(y1.equal(&y2));

        let differs = (0..20).any(|_| !q.forward_t(&x, true).equal(&y1));
        assert!(differs);
        Ok(())
    }
}

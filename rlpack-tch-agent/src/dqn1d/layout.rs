use super::Dqn1dConfig;
use anyhow::Result;
use rlpack_core::error::RlpackError;

/// Sequence lengths and paddings of the convolution stack of a [`Dqn1d`](super::Dqn1d).
#[derive(Debug, Clone, PartialEq)]
pub struct Dqn1dLayout {
    /// Sequence lengths before the first block and after each block.
    pub interim_lengths: Vec<i64>,

    /// Zero padding added on both sides of the input of each block.
    pub paddings: Vec<i64>,

    /// Input dimension of the final linear layer.
    pub linear_in_dim: i64,
}

/// Output length of a `conv1d` block.
///
/// Returns `None` if the (padded) input is shorter than the dilated kernel.
pub fn conv_out_len(len: i64, kernel: i64, stride: i64, dilation: i64, padding: i64) -> Option<i64> {
    let n = len + 2 * padding - dilation * (kernel - 1) - 1;
    if n < 0 {
        None
    } else {
        Some(n / stride + 1)
    }
}

/// Padding with which a block maps a sequence of length `len` to the same length.
///
/// The amount is rounded down, so it keeps the length exactly only when
/// `(len - 1) * (stride - 1) + dilation * (kernel - 1)` is even.
pub fn same_padding(len: i64, kernel: i64, stride: i64, dilation: i64) -> i64 {
    ((len - 1) * stride - len + dilation * (kernel - 1) + 1) / 2
}

impl Dqn1dLayout {
    /// Layout of the stack without padding.
    ///
    /// The linear layer takes `L_k * c_k` inputs, where `L_k` is the length
    /// after the last block.
    pub fn unpadded(config: &Dqn1dConfig) -> Result<Self> {
        let paddings = vec![0; config.n_blocks()];
        let interim_lengths = Self::interim_lengths(config, &paddings)?;
        let linear_in_dim = interim_lengths[config.n_blocks()] * config.channels[config.n_blocks()];

        Ok(Self {
            interim_lengths,
            paddings,
            linear_in_dim,
        })
    }

    /// Layout of the stack with length-preserving padding.
    ///
    /// The linear layer takes `L_0 * c_k` inputs. Fails if some block cannot
    /// keep the sequence length with symmetric zero padding.
    pub fn padded(config: &Dqn1dConfig) -> Result<Self> {
        let len = config.sequence_length;
        let paddings = (0..config.n_blocks())
            .map(|i| {
                same_padding(
                    len,
                    config.kernel_sizes[i],
                    config.strides_sizes[i],
                    config.dilation_sizes[i],
                )
            })
            .collect::<Vec<_>>();
        let interim_lengths = Self::interim_lengths(config, &paddings)?;

        if let Some(i) = interim_lengths.iter().position(|&l| l != len) {
            return Err(RlpackError::InvalidConfig(format!(
                "padding cannot keep sequence length {} in block {} (kernel = {}, stride = {}, \
                 dilation = {}); lengths through the stack: {:?}",
                len,
                i - 1,
                config.kernel_sizes[i - 1],
                config.strides_sizes[i - 1],
                config.dilation_sizes[i - 1],
                interim_lengths
            ))
            .into());
        }

        Ok(Self {
            interim_lengths,
            paddings,
            linear_in_dim: len * config.channels[config.n_blocks()],
        })
    }

    fn interim_lengths(config: &Dqn1dConfig, paddings: &[i64]) -> Result<Vec<i64>> {
        let mut lengths = vec![config.sequence_length];

        for i in 0..config.n_blocks() {
            let len = conv_out_len(
                lengths[i],
                config.kernel_sizes[i],
                config.strides_sizes[i],
                config.dilation_sizes[i],
                paddings[i],
            )
            .ok_or_else(|| {
                RlpackError::InvalidConfig(format!(
                    "sequence of length {} is too short for block {} (kernel = {}, dilation = {})",
                    lengths[i], i, config.kernel_sizes[i], config.dilation_sizes[i]
                ))
            })?;
            lengths.push(len);
        }

        Ok(lengths)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_unpadded_lengths() -> Result<()> {
        // (10 - 1 * 2 - 1) / 1 + 1 = 8
        let config = Dqn1dConfig::new(10, vec![2, 6], vec![3], 3);
        let layout = Dqn1dLayout::unpadded(&config)?;
        assert_eq!(layout.interim_lengths, vec![10, 8]);
        assert_eq!(layout.linear_in_dim, 8 * 6);

        // (20 - 2 * 2 - 1) / 2 + 1 = 8
        let config = Dqn1dConfig::new(20, vec![1, 4], vec![3], 2)
            .strides_sizes(vec![2])
            .dilation_sizes(vec![2]);
        let layout = Dqn1dLayout::unpadded(&config)?;
        assert_eq!(layout.interim_lengths, vec![20, 8]);
        assert_eq!(layout.linear_in_dim, 32);

        // (16 - 3 - 1) / 2 + 1 = 7, then (7 - 3 * 2 - 1) / 1 + 1 = 1
        let config = Dqn1dConfig::new(16, vec![3, 8, 5], vec![4, 3], 2)
            .strides_sizes(vec![2, 1])
            .dilation_sizes(vec![1, 3]);
        let layout = Dqn1dLayout::unpadded(&config)?;
        assert_eq!(layout.interim_lengths, vec![16, 7, 1]);
        assert_eq!(layout.paddings, vec![0, 0]);
        assert_eq!(layout.linear_in_dim, 5);

        // (9 - 4 - 1) / 3 + 1 = 2, the division rounds down
        let config = Dqn1dConfig::new(9, vec![1, 2], vec![5], 2).strides_sizes(vec![3]);
        let layout = Dqn1dLayout::unpadded(&config)?;
        assert_eq!(layout.interim_lengths, vec![9, 2]);

        Ok(())
    }

    #[test]
    fn test_too_short_sequence() {
        let config = Dqn1dConfig::new(8, vec![1, 2, 2], vec![5, 5], 2);
        assert!(Dqn1dLayout::unpadded(&config).is_err());
    }

    #[test]
    fn test_padded_keeps_length() -> Result<()> {
        let config = Dqn1dConfig::new(8, vec![2, 4, 4], vec![3, 5], 2)
            .dilation_sizes(vec![1, 2])
            .use_padding(true);
        let layout = Dqn1dLayout::padded(&config)?;
        assert_eq!(layout.paddings, vec![1, 4]);
        assert_eq!(layout.interim_lengths, vec![8, 8, 8]);
        assert_eq!(layout.linear_in_dim, 8 * 4);

        // Stride 2 keeps the length when the padding is exact.
        let config = Dqn1dConfig::new(9, vec![1, 3], vec![3], 2)
            .strides_sizes(vec![2])
            .use_padding(true);
        let layout = Dqn1dLayout::padded(&config)?;
        assert_eq!(layout.paddings, vec![5]);
        assert_eq!(layout.interim_lengths, vec![9, 9]);

        Ok(())
    }

    #[test]
    fn test_padded_rejects_inexact_padding() {
        // Even kernel with stride 1 needs asymmetric padding.
        let config = Dqn1dConfig::new(8, vec![1, 3], vec![2], 2).use_padding(true);
        assert!(Dqn1dLayout::padded(&config).is_err());

        // (8 + 2 * 4 - 2 - 1) / 2 + 1 = 7
        let config = Dqn1dConfig::new(8, vec![1, 3], vec![3], 2)
            .strides_sizes(vec![2])
            .use_padding(true);
        assert!(Dqn1dLayout::padded(&config).is_err());
    }
}

//! Utilities.
use crate::model::ModelBase;
use anyhow::{anyhow, Result};
use log::trace;
use ndarray::ArrayD;
use num_traits::cast::AsPrimitive;
use rlpack_core::error::RlpackError;
use serde::{Deserialize, Serialize};
use tch::Tensor;

/// Critic loss type.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Copy)]
pub enum CriticLoss {
    /// Mean squared error.
    Mse,

    /// Smooth L1 loss.
    SmoothL1,
}

impl Default for CriticLoss {
    fn default() -> Self {
        CriticLoss::SmoothL1
    }
}

/// Interface for handling output dimensions.
pub trait OutDim {
    /// Returns the output dimension.
    fn get_out_dim(&self) -> i64;
}

/// Copies all variables of `src` into `dest`.
///
/// Variables are identified by their names. After this call the parameters of
/// both models are bit-identical.
pub fn hard_update<M: ModelBase>(dest: &mut M, src: &M) -> Result<()> {
    let src = src.get_var_store().variables();
    let mut dest = dest.get_var_store_mut().variables();
    if src.len() != dest.len() {
        return Err(anyhow!(
            "Number of variables differs: {} (src), {} (dest)",
            src.len(),
            dest.len()
        ));
    }

    tch::no_grad(|| {
        for (name, src) in src.iter() {
            let dest = dest
                .get_mut(name)
                .ok_or_else(|| anyhow!("Variable {} not found in destination", name))?;
            dest.copy_(src);
            trace!("Copy variable {}", name);
        }
        Ok(())
    })
}

/// Converts a flat buffer into an `f64` tensor of the given shape.
///
/// The number of elements of `data` must agree with `shape`, otherwise
/// [`RlpackError::ShapeMismatch`] is returned; data is never truncated or padded.
pub fn slice_to_tensor(data: &[f64], shape: &[i64]) -> Result<Tensor> {
    if let Some(d) = shape.iter().find(|&&d| d < 0) {
        return Err(RlpackError::InvalidInput(format!(
            "negative dimension {} in shape {:?}",
            d, shape
        ))
        .into());
    }

    let expected = shape
        .iter()
        .try_fold(1usize, |n, &d| n.checked_mul(d as usize))
        .ok_or_else(|| {
            RlpackError::InvalidInput(format!("number of elements of shape {:?} overflows", shape))
        })?;
    if expected != data.len() {
        return Err(RlpackError::ShapeMismatch {
            shape: shape.to_vec(),
            expected,
            actual: data.len(),
        }
        .into());
    }

    Ok(Tensor::from_slice(data).f_reshape(shape)?)
}

/// Converts [`ndarray::ArrayD`] to an `f64` [`Tensor`] of the same shape.
pub fn arrayd_to_tensor<T>(a: &ArrayD<T>) -> Result<Tensor>
where
    T: AsPrimitive<f64>,
{
    let shape = a.shape().iter().map(|&d| d as i64).collect::<Vec<_>>();
    let v = a.iter().map(|e| e.as_()).collect::<Vec<f64>>();
    slice_to_tensor(&v, &shape)
}

#[cfg(test)]
mod test {
    use super::*;
    use ndarray::{Array, IxDyn};
    use std::convert::TryFrom;
    use tch::Kind;

    #[test]
    fn test_slice_to_tensor() -> Result<()> {
        let data = (0..8).map(|i| i as f64).collect::<Vec<_>>();
        let t = slice_to_tensor(&data, &[4, 2])?;
        assert_eq!(t.size(), vec![4, 2]);
        assert_eq!(t.kind(), Kind::Double);
        assert_eq!(t.double_value(&[3, 1]), 7.0);
        Ok(())
    }

    #[test]
    fn test_slice_to_tensor_mismatch() {
        let data = vec![0f64; 7];
        let err = slice_to_tensor(&data, &[4, 2]).unwrap_err();
        assert_eq!(
            err.downcast_ref::<RlpackError>(),
            Some(&RlpackError::ShapeMismatch {
                shape: vec![4, 2],
                expected: 8,
                actual: 7
            })
        );

        let err = slice_to_tensor(&data, &[-1, 7]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RlpackError>(),
            Some(RlpackError::InvalidInput(_))
        ));

        // The element count would wrap around to zero.
        let err = slice_to_tensor(&[], &[1 << 40, 1 << 40]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RlpackError>(),
            Some(RlpackError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_arrayd_to_tensor() -> Result<()> {
        let a = Array::from_shape_fn(IxDyn(&[2, 3]), |ix| (ix[0] * 3 + ix[1]) as f32);
        let t = arrayd_to_tensor(&a)?;
        assert_eq!(t.size(), vec![2, 3]);
        let v = Vec::<f64>::try_from(&t.flatten(0, -1))?;
        assert_eq!(v, vec![0., 1., 2., 3., 4., 5.]);
        Ok(())
    }
}

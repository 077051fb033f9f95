//! Definition of interfaces of neural networks.
use anyhow::Result;
use std::path::Path;
use tch::nn::VarStore;

/// Base interface.
pub trait ModelBase {
    /// Returns `var_store` as mutable reference.
    fn get_var_store_mut(&mut self) -> &mut VarStore;

    /// Returns `var_store`.
    fn get_var_store(&self) -> &VarStore;

    /// Save parameters of the neural network.
    fn save<T: AsRef<Path>>(&self, path: T) -> Result<()>;

    /// Load parameters of the neural network.
    fn load<T: AsRef<Path>>(&mut self, path: T) -> Result<()>;
}

/// Neural network model that can be initialized with [`VarStore`] and configuration.
///
/// Modules consisting a neural network share a [`VarStore`], so structs
/// implementing this trait are initialized with a given [`VarStore`].
/// Cloning with another [`VarStore`] gives a network of the same architecture
/// owning its own parameters, as needed for a target network.
///
/// [`VarStore`]: https://docs.rs/tch/0.16.0/tch/nn/struct.VarStore.html
pub trait SubModel {
    /// Configuration from which [`SubModel`] is constructed.
    type Config;

    /// Input of the [`SubModel`].
    type Input;

    /// Output of the [`SubModel`].
    type Output;

    /// Builds [`SubModel`] with [`VarStore`] and [`SubModel::Config`].
    ///
    /// Fails if the configuration does not describe a valid network.
    fn build(var_store: &VarStore, config: Self::Config) -> Result<Self>
    where
        Self: Sized;

    /// Clones [`SubModel`] with [`VarStore`].
    fn clone_with_var_store(&self, var_store: &VarStore) -> Self;

    /// A generalized forward function.
    ///
    /// Stochastic layers such as dropout are active only if `train` is `true`.
    fn forward_t(&self, input: &Self::Input, train: bool) -> Self::Output;

    /// Shape of a single input sample, without the batch dimension.
    fn in_shape(&self) -> &[i64];
}

//! Parameter-owning instance of a Q-network.
use crate::{model::{ModelBase, SubModel}, util::OutDim};
use anyhow::Result;
use log::{info, trace};
use std::path::Path;
use tch::{nn, Device, Tensor};

/// Represents an action-value function of a DQN agent.
///
/// Each instance owns its own [`nn::VarStore`], holding the parameters in `f64`.
pub struct DqnModel<Q>
where
    Q: SubModel<Output = Tensor>,
    Q::Config: OutDim,
{
    device: Device,
    var_store: nn::VarStore,

    // Dimension of the output vector (equal to the number of actions).
    pub(super) out_dim: i64,

    // Action-value function
    q: Q,
}

impl<Q> DqnModel<Q>
where
    Q: SubModel<Output = Tensor>,
    Q::Config: OutDim,
{
    /// Constructs a model with freshly initialized parameters.
    pub fn build(config: Q::Config, device: Device) -> Result<Self> {
        let out_dim = config.get_out_dim();
        let var_store = nn::VarStore::new(device);
        let q = Q::build(&var_store, config)?;

        Self::_build(device, out_dim, q, var_store, None)
    }

    fn _build(
        device: Device,
        out_dim: i64,
        q: Q,
        mut var_store: nn::VarStore,
        var_store_src: Option<&nn::VarStore>,
    ) -> Result<Self> {
        var_store.double();

        // Copy var_store
        if let Some(var_store_src) = var_store_src {
            var_store.copy(var_store_src)?;
        }

        Ok(Self {
            device,
            out_dim,
            var_store,
            q,
        })
    }

    /// Constructs a model of the same architecture with a copy of the parameters.
    pub fn try_clone(&self) -> Result<Self> {
        let var_store = nn::VarStore::new(self.device);
        let q = self.q.clone_with_var_store(&var_store);

        Self::_build(
            self.device,
            self.out_dim,
            q,
            var_store,
            Some(&self.var_store),
        )
    }

    /// Outputs the action-value given an observation.
    pub fn forward_t(&self, x: &Q::Input, train: bool) -> Tensor {
        let a = self.q.forward_t(x, train);
        debug_assert_eq!(a.size().as_slice()[1], self.out_dim);
        a
    }

    /// Shape of a single input sample.
    pub fn in_shape(&self) -> &[i64] {
        self.q.in_shape()
    }

    /// Device on which the parameters live.
    pub fn device(&self) -> Device {
        self.device
    }
}

impl<Q> ModelBase for DqnModel<Q>
where
    Q: SubModel<Output = Tensor>,
    Q::Config: OutDim,
{
    fn get_var_store_mut(&mut self) -> &mut nn::VarStore {
        &mut self.var_store
    }

    fn get_var_store(&self) -> &nn::VarStore {
        &self.var_store
    }

    fn save<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        self.var_store.save(&path)?;
        info!("Save DQN model to {:?}", path.as_ref());
        let vs = self.var_store.variables();
        for (name, _) in vs.iter() {
            trace!("Save variable {}", name);
        }
        Ok(())
    }

    fn load<T: AsRef<Path>>(&mut self, path: T) -> Result<()> {
        self.var_store.load(&path)?;
        info!("Load DQN model from {:?}", path.as_ref());
        Ok(())
    }
}

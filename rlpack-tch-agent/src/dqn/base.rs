//! DQN agent implemented with tch-rs.
use super::{config::DqnConfig, explorer::EpsilonGreedy, model::DqnModel};
use crate::{
    model::{ModelBase, SubModel},
    opt::{Optimizer, OptimizerConfig},
    util::{hard_update, slice_to_tensor, CriticLoss, OutDim},
};
use anyhow::Result;
use log::{debug, info};
use rlpack_core::{
    error::RlpackError,
    record::{Record, RecordValue},
    replay_buffer::{Transition, TransitionMemory, TransitionMemoryConfig},
    Agent, ExperienceBufferBase,
};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tch::{no_grad, Device, Kind, Reduction, Tensor};

/// DQN agent implemented with tch-rs.
///
/// The agent owns a policy network, which is optimized and drives action
/// selection, and a target network, which gives the bootstrapped targets and
/// is overwritten by the policy network every `target_model_update_rate`
/// training steps.
pub struct Dqn<Q>
where
    Q: SubModel<Input = Tensor, Output = Tensor>,
    Q::Config: OutDim + Clone,
{
    pub(in crate::dqn) qnet: DqnModel<Q>,
    pub(in crate::dqn) qnet_tgt: DqnModel<Q>,
    pub(in crate::dqn) opt: Optimizer,
    pub(in crate::dqn) memory: TransitionMemory<Tensor>,
    pub(in crate::dqn) explorer: EpsilonGreedy,
    pub(in crate::dqn) gamma: f64,
    pub(in crate::dqn) batch_size: usize,
    pub(in crate::dqn) target_model_update_rate: usize,
    pub(in crate::dqn) policy_model_update_rate: usize,
    pub(in crate::dqn) num_actions: i64,
    pub(in crate::dqn) critic_loss: CriticLoss,
    pub(in crate::dqn) save_path: PathBuf,
    pub(in crate::dqn) device: Device,
    pub(in crate::dqn) n_steps: usize,
    pub(in crate::dqn) n_opts: usize,
    pub(in crate::dqn) n_target_syncs: usize,
}

impl<Q> Dqn<Q>
where
    Q: SubModel<Input = Tensor, Output = Tensor>,
    Q::Config: OutDim + Clone,
{
    /// Constructs DQN agent.
    ///
    /// Both networks are built from `q_config`. They are initialized
    /// independently unless [`DqnConfig::copy_target_on_build`] is set.
    pub fn build(q_config: Q::Config, config: DqnConfig) -> Result<Self> {
        config.check()?;
        if q_config.get_out_dim() != config.num_actions {
            return Err(RlpackError::InvalidConfig(format!(
                "the model has {} outputs but num_actions = {}",
                q_config.get_out_dim(),
                config.num_actions
            ))
            .into());
        }
        let opt_config = OptimizerConfig::from_name(&config.optimizer, config.lr)?;

        if let Some(seed) = config.seed {
            tch::manual_seed(seed as i64);
        }
        let device = config.device;
        let qnet = DqnModel::build(q_config.clone(), device)?;
        let qnet_tgt = if config.copy_target_on_build {
            qnet.try_clone()?
        } else {
            DqnModel::build(q_config, device)?
        };
        let opt = opt_config.build(qnet.get_var_store())?;

        let mut memory_config =
            TransitionMemoryConfig::default().capacity(config.memory_buffer_size);
        if let Some(seed) = config.seed {
            memory_config = memory_config.seed(seed);
        }
        let memory = TransitionMemory::build(&memory_config);
        let explorer = EpsilonGreedy::new(
            config.epsilon,
            config.epsilon_decay_rate,
            config.min_epsilon,
            config.seed,
        );

        let mut dqn = Dqn {
            qnet,
            qnet_tgt,
            opt,
            memory,
            explorer,
            gamma: config.gamma,
            batch_size: config.get_batch_size(),
            target_model_update_rate: config.target_model_update_rate,
            policy_model_update_rate: config.policy_model_update_rate,
            num_actions: config.num_actions,
            critic_loss: config.critic_loss,
            save_path: config.save_path,
            device,
            n_steps: 0,
            n_opts: 0,
            n_target_syncs: 0,
        };
        info!(
            "Construct DQN agent with {} actions, batch size {}",
            dqn.num_actions, dqn.batch_size
        );

        if config.load_on_build {
            let path = dqn.save_path.clone();
            dqn.load_params(&path)?;
        }

        Ok(dqn)
    }

    /// Converts a state into the per-sample form stored in the memory.
    ///
    /// Accepts `in_shape` or `[1, in_shape..]`. The result is an `f64` tensor
    /// on the agent's device that shares no storage with `x`.
    fn prepare_state(&self, x: &Tensor) -> Result<Tensor> {
        let in_shape = self.qnet.in_shape();
        let size = x.size();
        let x = if size.as_slice() == in_shape {
            x.shallow_clone()
        } else if size.len() == in_shape.len() + 1 && size[0] == 1 && &size[1..] == in_shape {
            x.squeeze_dim(0)
        } else {
            return Err(RlpackError::InvalidInput(format!(
                "state of shape {:?}, expected {:?}",
                size, in_shape
            ))
            .into());
        };
        Ok(x.detach().to_device(self.device).to_kind(Kind::Double).copy())
    }

    fn update_critic(&mut self) -> Result<f32> {
        let (state, next_state, action, reward, not_done) = {
            let batch = self.memory.sample(self.batch_size)?;
            let state = Tensor::stack(&batch.iter().map(|t| &t.state).collect::<Vec<_>>(), 0);
            let next_state =
                Tensor::stack(&batch.iter().map(|t| &t.next_state).collect::<Vec<_>>(), 0);
            let action = batch.iter().map(|t| t.action).collect::<Vec<_>>();
            let reward = batch.iter().map(|t| t.reward).collect::<Vec<_>>();
            let not_done = batch
                .iter()
                .map(|t| if t.done { 0f64 } else { 1f64 })
                .collect::<Vec<_>>();
            (
                state,
                next_state,
                Tensor::from_slice(&action).to(self.device).unsqueeze(-1),
                Tensor::from_slice(&reward).to(self.device),
                Tensor::from_slice(&not_done).to(self.device),
            )
        };

        let pred = self
            .qnet
            .forward_t(&state, true)
            .gather(-1, &action, false)
            .squeeze_dim(-1);

        let tgt = no_grad(|| {
            let (q, _) = self.qnet_tgt.forward_t(&next_state, false).max_dim(-1, false);
            reward + not_done * self.gamma * q
        });

        let loss = match self.critic_loss {
            CriticLoss::Mse => pred.mse_loss(&tgt, Reduction::Mean),
            CriticLoss::SmoothL1 => pred.smooth_l1_loss(&tgt, Reduction::Mean, 1.0),
        };
        self.opt.backward_step(&loss);

        Ok(loss.double_value(&[]) as f32)
    }

    fn sync_target(&mut self) -> Result<()> {
        hard_update(&mut self.qnet_tgt, &self.qnet)?;
        self.n_target_syncs += 1;
        debug!(
            "Copy policy network to target network at step {}",
            self.n_steps
        );
        Ok(())
    }

    /// Same as [`Agent::train`], with states given as flat buffers and shapes.
    ///
    /// Fails with [`RlpackError::ShapeMismatch`] if the number of elements of
    /// a buffer does not agree with its shape.
    #[allow(clippy::too_many_arguments)]
    pub fn train_flat(
        &mut self,
        state_current: &[f64],
        state_next: &[f64],
        reward: f64,
        action: i64,
        done: bool,
        state_current_shape: &[i64],
        state_next_shape: &[i64],
    ) -> Result<i64> {
        let state_current = slice_to_tensor(state_current, state_current_shape)?;
        let state_next = slice_to_tensor(state_next, state_next_shape)?;
        self.train(&state_current, &state_next, reward, action, done)
    }

    /// Same as [`Agent::policy`], with the state given as a flat buffer and a shape.
    pub fn policy_flat(&self, state_current: &[f64], state_current_shape: &[i64]) -> Result<i64> {
        let state_current = slice_to_tensor(state_current, state_current_shape)?;
        self.policy(&state_current)
    }

    /// Saves both networks into the directory given in [`DqnConfig::save_path`].
    pub fn save(&self) -> Result<()> {
        self.save_params(&self.save_path)
    }

    /// Number of calls of [`Agent::train`] so far.
    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// Number of optimization steps of the policy network so far.
    pub fn n_opts(&self) -> usize {
        self.n_opts
    }

    /// Number of copies of the policy network into the target network so far.
    pub fn n_target_syncs(&self) -> usize {
        self.n_target_syncs
    }

    /// Current exploration rate.
    pub fn epsilon(&self) -> f64 {
        self.explorer.eps()
    }

    /// Transition memory.
    pub fn memory(&self) -> &TransitionMemory<Tensor> {
        &self.memory
    }

    /// Policy network.
    pub fn policy_model(&self) -> &DqnModel<Q> {
        &self.qnet
    }

    /// Target network.
    pub fn target_model(&self) -> &DqnModel<Q> {
        &self.qnet_tgt
    }
}

impl<Q> Agent for Dqn<Q>
where
    Q: SubModel<Input = Tensor, Output = Tensor>,
    Q::Config: OutDim + Clone,
{
    type State = Tensor;
    type Action = i64;

    fn train_with_record(
        &mut self,
        state_current: &Tensor,
        state_next: &Tensor,
        reward: f64,
        action: i64,
        done: bool,
    ) -> Result<(i64, Record)> {
        if !(0..self.num_actions).contains(&action) {
            return Err(RlpackError::InvalidInput(format!(
                "action {} not in [0, {})",
                action, self.num_actions
            ))
            .into());
        }
        let state_current = self.prepare_state(state_current)?;
        let state_next = self.prepare_state(state_next)?;

        self.n_steps += 1;
        self.memory.push(Transition::new(
            state_current,
            state_next.shallow_clone(),
            action,
            reward,
            done,
        ))?;

        let q_next = no_grad(|| self.qnet.forward_t(&state_next, false));
        let act = self.explorer.action(&q_next);

        let mut record = Record::empty();
        if self.memory.len() >= self.batch_size && self.n_steps % self.policy_model_update_rate == 0
        {
            let loss = self.update_critic()?;
            self.n_opts += 1;
            debug!("Optimize policy network at step {}, loss = {}", self.n_steps, loss);
            record.insert("loss", RecordValue::Scalar(loss));
        }

        let synced = self.n_steps % self.target_model_update_rate == 0;
        if synced {
            self.sync_target()?;
        }

        self.explorer.decay();

        record.insert("epsilon", RecordValue::Scalar(self.explorer.eps() as f32));
        record.insert("n_steps", RecordValue::Scalar(self.n_steps as f32));
        record.insert(
            "target_synced",
            RecordValue::Scalar(if synced { 1.0 } else { 0.0 }),
        );

        Ok((act, record))
    }

    fn policy(&self, state: &Tensor) -> Result<i64> {
        let x = self.prepare_state(state)?;
        let a = no_grad(|| self.qnet.forward_t(&x, false));
        Ok(a.argmax(-1, false).int64_value(&[0]))
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)?;
        self.qnet.save(path.join("qnet.pt"))?;
        self.qnet_tgt.save(path.join("qnet_tgt.pt"))?;
        info!("Save DQN agent to {:?}", path);
        Ok(())
    }

    fn load_params(&mut self, path: &Path) -> Result<()> {
        self.qnet.load(path.join("qnet.pt"))?;
        self.qnet_tgt.load(path.join("qnet_tgt.pt"))?;
        info!("Load DQN agent from {:?}", path);
        Ok(())
    }
}

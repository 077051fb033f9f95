//! Agent.
use crate::record::Record;
use anyhow::Result;
use std::path::Path;

/// Represents a value-based agent trained online from single transitions.
///
/// The driving loop calls [`Agent::train`] once per environment step with the
/// transition it has just observed and receives the action to take next.
/// [`Agent::policy`] is the read-only path used for evaluation or deployment.
pub trait Agent {
    /// State observed from the environment.
    type State;

    /// Action taken in the environment.
    type Action;

    /// Stores a transition, possibly performs an optimization step and returns
    /// the action for the next step.
    fn train(
        &mut self,
        state_current: &Self::State,
        state_next: &Self::State,
        reward: f64,
        action: Self::Action,
        done: bool,
    ) -> Result<Self::Action> {
        let (act, _) =
            self.train_with_record(state_current, state_next, reward, action, done)?;
        Ok(act)
    }

    /// Same as [`Agent::train`], but also returns some information on the step.
    fn train_with_record(
        &mut self,
        state_current: &Self::State,
        state_next: &Self::State,
        reward: f64,
        action: Self::Action,
        done: bool,
    ) -> Result<(Self::Action, Record)>;

    /// Returns the greedy action for the given state without changing the agent.
    fn policy(&self, state: &Self::State) -> Result<Self::Action>;

    /// Save the parameters of the agent in the given directory.
    /// The DQN agent in `rlpack_tch_agent` writes two files, one for the policy
    /// network and one for the target network.
    fn save_params(&self, path: &Path) -> Result<()>;

    /// Load the parameters of the agent from the given directory.
    fn load_params(&mut self, path: &Path) -> Result<()>;
}

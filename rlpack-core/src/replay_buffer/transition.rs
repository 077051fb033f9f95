/// A single experience `(state, action, reward, next_state, done)`.
///
/// Transitions are not modified after being pushed into a
/// [`TransitionMemory`](super::TransitionMemory).
#[derive(Debug, Clone, PartialEq)]
pub struct Transition<S> {
    /// State at which `action` was taken.
    pub state: S,

    /// State reached after taking `action`.
    pub next_state: S,

    /// Index of the discrete action.
    pub action: i64,

    /// Reward received on the transition.
    pub reward: f64,

    /// `true` if `next_state` is terminal.
    pub done: bool,
}

impl<S> Transition<S> {
    /// Constructs a transition.
    pub fn new(state: S, next_state: S, action: i64, reward: f64, done: bool) -> Self {
        Self {
            state,
            next_state,
            action,
            reward,
            done,
        }
    }
}

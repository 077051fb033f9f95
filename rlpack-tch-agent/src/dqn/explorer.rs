//! Exploration strategy of DQN.
use tch::Tensor;

/// Epsilon-greedy explorer with multiplicative decay.
///
/// With probability `eps` a uniformly random action is taken, otherwise the
/// action with the highest value. [`EpsilonGreedy::decay`] multiplies `eps` by
/// the decay rate, never going below `eps_min`.
#[derive(Debug, Clone)]
pub struct EpsilonGreedy {
    eps: f64,
    decay_rate: f64,
    eps_min: f64,
    rng: fastrand::Rng,
}

impl EpsilonGreedy {
    /// Constructs epsilon-greedy explorer.
    ///
    /// `eps` must not be below `eps_min`.
    pub fn new(eps: f64, decay_rate: f64, eps_min: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        Self {
            eps,
            decay_rate,
            eps_min,
            rng,
        }
    }

    /// Current exploration rate.
    pub fn eps(&self) -> f64 {
        self.eps
    }

    /// Takes an action given action values of shape `[1, n_actions]`.
    pub fn action(&mut self, a: &Tensor) -> i64 {
        if self.rng.f64() < self.eps {
            let n_actions = a.size()[1];
            self.rng.i64(0..n_actions)
        } else {
            a.argmax(-1, false).int64_value(&[0])
        }
    }

    /// Decays the exploration rate.
    pub fn decay(&mut self) {
        if self.eps > self.eps_min {
            self.eps = (self.eps * self.decay_rate).max(self.eps_min);
        }
    }
}

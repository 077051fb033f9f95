//! Ring buffer of transitions.
use super::{Transition, TransitionMemoryConfig};
use crate::{error::RlpackError, ExperienceBufferBase};
use anyhow::Result;
use log::{info, trace};
use rand::{rngs::StdRng, seq::index, SeedableRng};

/// A fixed-capacity memory of transitions.
///
/// Once `capacity` transitions have been pushed, each new transition
/// overwrites the oldest one. Minibatches are drawn uniformly at random
/// without replacement.
///
/// ```
/// use rlpack_core::{
///     replay_buffer::{Transition, TransitionMemory, TransitionMemoryConfig},
///     ExperienceBufferBase,
/// };
///
/// let config = TransitionMemoryConfig::default().capacity(2);
/// let mut memory = TransitionMemory::build(&config);
/// for i in 0..3 {
///     memory.push(Transition::new(i, i + 1, 0, 0.0, false)).unwrap();
/// }
/// assert_eq!(memory.len(), 2);
/// assert!(memory.sample(3).is_err());
/// ```
pub struct TransitionMemory<S> {
    capacity: usize,

    /// Position overwritten by the next push once the memory is full.
    i: usize,

    transitions: Vec<Transition<S>>,
    rng: StdRng,
}

impl<S> TransitionMemory<S> {
    /// Builds a memory from the given configuration.
    ///
    /// # Panics
    ///
    /// Panics if the capacity is zero.
    pub fn build(config: &TransitionMemoryConfig) -> Self {
        assert!(config.capacity > 0, "capacity of TransitionMemory must be positive");
        info!(
            "Construct transition memory with capacity = {}",
            config.capacity
        );

        Self {
            capacity: config.capacity,
            i: 0,
            transitions: Vec::with_capacity(config.capacity),
            rng: StdRng::seed_from_u64(config.seed),
        }
    }

    /// Maximum number of transitions held at once.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Removes all transitions.
    pub fn clear(&mut self) {
        self.transitions.clear();
        self.i = 0;
    }

    /// Iterates over the stored transitions from the oldest to the newest.
    pub fn iter(&self) -> impl Iterator<Item = &Transition<S>> {
        let (newer, older) = self.transitions.split_at(self.i);
        older.iter().chain(newer.iter())
    }

    /// Draws `batch_size` distinct transitions uniformly at random.
    ///
    /// Fails with [`RlpackError::InsufficientData`] if fewer than `batch_size`
    /// transitions are stored.
    pub fn sample(&mut self, batch_size: usize) -> Result<Vec<&Transition<S>>> {
        let len = self.transitions.len();
        if len < batch_size {
            return Err(RlpackError::InsufficientData { len, batch_size }.into());
        }

        let ixs = index::sample(&mut self.rng, len, batch_size);
        trace!("Sample {} transitions out of {}", batch_size, len);
        let transitions = &self.transitions;
        Ok(ixs.iter().map(|ix| &transitions[ix]).collect())
    }
}

impl<S> ExperienceBufferBase for TransitionMemory<S> {
    type Item = Transition<S>;

    fn push(&mut self, tr: Self::Item) -> Result<()> {
        if self.transitions.len() < self.capacity {
            self.transitions.push(tr);
        } else {
            self.transitions[self.i] = tr;
        }
        self.i = (self.i + 1) % self.capacity;
        Ok(())
    }

    fn len(&self) -> usize {
        self.transitions.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashSet;

    fn memory(capacity: usize) -> TransitionMemory<i64> {
        TransitionMemory::build(&TransitionMemoryConfig::default().capacity(capacity))
    }

    fn transition(i: i64) -> Transition<i64> {
        Transition::new(i, i + 1, i % 2, i as f64, false)
    }

    #[test]
    fn test_len_never_exceeds_capacity() -> Result<()> {
        let mut memory = memory(5);
        for i in 0..12 {
            memory.push(transition(i))?;
            assert!(memory.len() <= memory.capacity());
        }
        assert_eq!(memory.len(), 5);
        Ok(())
    }

    #[test]
    fn test_oldest_are_evicted() -> Result<()> {
        let capacity = 4;
        let k = 3;
        let mut memory = memory(capacity);
        for i in 0..(capacity + k) as i64 {
            memory.push(transition(i))?;
        }

        let order = memory.iter().map(|t| t.state).collect::<Vec<_>>();
        assert_eq!(order, vec![3, 4, 5, 6]);

        // Sampling the whole memory many times never returns an evicted state.
        for _ in 0..20 {
            let states = memory
                .sample(capacity)?
                .iter()
                .map(|t| t.state)
                .collect::<HashSet<_>>();
            assert_eq!(states, (k as i64..(capacity + k) as i64).collect());
        }
        Ok(())
    }

    #[test]
    fn test_sample_without_replacement() -> Result<()> {
        let mut memory = memory(100);
        for i in 0..100 {
            memory.push(transition(i))?;
        }
        for _ in 0..10 {
            let batch = memory.sample(32)?;
            let states = batch.iter().map(|t| t.state).collect::<HashSet<_>>();
            assert_eq!(states.len(), 32);
        }
        Ok(())
    }

    #[test]
    fn test_insufficient_data() -> Result<()> {
        let mut memory = memory(8);
        for i in 0..3 {
            memory.push(transition(i))?;
        }
        let err = memory.sample(4).err().expect("sampling should fail");
        assert_eq!(
            err.downcast_ref::<RlpackError>(),
            Some(&RlpackError::InsufficientData {
                len: 3,
                batch_size: 4
            })
        );
        assert_eq!(memory.sample(3)?.len(), 3);
        Ok(())
    }

    #[test]
    fn test_clear() -> Result<()> {
        let mut memory = memory(3);
        for i in 0..5 {
            memory.push(transition(i))?;
        }
        memory.clear();
        assert!(memory.is_empty());
        memory.push(transition(9))?;
        assert_eq!(memory.iter().map(|t| t.state).collect::<Vec<_>>(), vec![9]);
        Ok(())
    }
}

//! Configuration of [`TransitionMemory`](super::TransitionMemory).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`TransitionMemory`](super::TransitionMemory).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TransitionMemoryConfig {
    pub(super) capacity: usize,
    pub(super) seed: u64,
}

impl Default for TransitionMemoryConfig {
    fn default() -> Self {
        Self {
            capacity: 10000,
            seed: 42,
        }
    }
}

impl TransitionMemoryConfig {
    /// Sets the capacity of the memory.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the seed of the random number generator used for sampling.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Loads [`TransitionMemoryConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TransitionMemoryConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_transition_memory_config() -> Result<()> {
        let config = TransitionMemoryConfig::default().capacity(4).seed(7);

        let dir = TempDir::new("transition_memory_config")?;
        let path = dir.path().join("memory.yaml");
        config.save(&path)?;
        let config_ = TransitionMemoryConfig::load(&path)?;
        assert_eq!(config, config_);

        Ok(())
    }
}

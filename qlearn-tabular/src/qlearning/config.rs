//! Configuration of Q-learning agent.
use anyhow::Result;
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`QLearningAgent`](super::QLearningAgent).
///
/// None of the values are validated. `alpha`, `epsilon` and `discount` are
/// expected to lie in `[0, 1]`.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct QLearningConfig {
    /// Learning rate, the step size toward the TD target.
    pub alpha: f64,

    /// Probability of taking a uniformly random legal action.
    pub epsilon: f64,

    /// Discount factor of future values.
    pub discount: f64,

    /// Seed of the random number generator used for exploration.
    pub seed: u64,
}

impl Default for QLearningConfig {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            epsilon: 0.25,
            discount: 0.99,
            seed: 42,
        }
    }
}

impl QLearningConfig {
    /// Sets the learning rate.
    pub fn alpha(mut self, v: f64) -> Self {
        self.alpha = v;
        self
    }

    /// Sets the exploration rate.
    pub fn epsilon(mut self, v: f64) -> Self {
        self.epsilon = v;
        self
    }

    /// Sets the discount factor.
    pub fn discount(mut self, v: f64) -> Self {
        self.discount = v;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Loads [`QLearningConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        info!("Load config of Q-learning agent from {}", path_.display());
        Ok(b)
    }

    /// Saves [`QLearningConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path_ = path.as_ref().to_owned();
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        info!("Save config of Q-learning agent into {}", path_.display());
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_qlearning_config() -> Result<()> {
        let config = QLearningConfig::default()
            .alpha(0.1)
            .epsilon(1.0)
            .discount(0.9)
            .seed(7);

        let dir = TempDir::new("qlearning_config")?;
        let path = dir.path().join("qlearning_config.yaml");

        config.save(&path)?;
        let config_ = QLearningConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }
}

//! Configuration of [`Trainer`](super::Trainer).
use anyhow::Result;
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Trainer`](super::Trainer).
///
/// All intervals are counted in episodes.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TrainerConfig {
    /// The number of training episodes.
    pub max_episodes: usize,

    /// Episodes are truncated after this many environment steps.
    pub max_steps_per_episode: usize,

    /// Interval of evaluation in episodes. `0` disables evaluation.
    pub eval_interval: usize,

    /// Interval of flushing records in episodes.
    pub flush_record_interval: usize,

    /// Interval of saving the agent in episodes.
    pub save_interval: usize,

    /// Factor the exploration rate is multiplied with after every episode.
    pub epsilon_decay: f64,

    /// Lower bound of the decayed exploration rate.
    pub min_epsilon: f64,

    /// Where to save the trained agent.
    pub model_dir: Option<String>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            max_episodes: 0,
            max_steps_per_episode: usize::MAX,
            eval_interval: 0,
            flush_record_interval: usize::MAX,
            save_interval: usize::MAX,
            epsilon_decay: 1.0,
            min_epsilon: 0.0,
            model_dir: None,
        }
    }
}

impl TrainerConfig {
    /// Sets the number of training episodes.
    pub fn max_episodes(mut self, v: usize) -> Self {
        self.max_episodes = v;
        self
    }

    /// Sets the maximum number of steps in an episode.
    pub fn max_steps_per_episode(mut self, v: usize) -> Self {
        self.max_steps_per_episode = v;
        self
    }

    /// Sets the interval of evaluation in episodes.
    pub fn eval_interval(mut self, v: usize) -> Self {
        self.eval_interval = v;
        self
    }

    /// Sets the interval of flushing records in episodes.
    pub fn flush_record_interval(mut self, v: usize) -> Self {
        self.flush_record_interval = v;
        self
    }

    /// Sets the interval of saving in episodes.
    pub fn save_interval(mut self, v: usize) -> Self {
        self.save_interval = v;
        self
    }

    /// Sets the per-episode decay factor of the exploration rate.
    pub fn epsilon_decay(mut self, v: f64) -> Self {
        self.epsilon_decay = v;
        self
    }

    /// Sets the lower bound of the exploration rate.
    pub fn min_epsilon(mut self, v: f64) -> Self {
        self.min_epsilon = v;
        self
    }

    /// Sets the directory the agent is saved in.
    pub fn model_dir(mut self, v: impl Into<String>) -> Self {
        self.model_dir = Some(v.into());
        self
    }

    /// Constructs [`TrainerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path_ = path.as_ref().to_owned();
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        info!("Load config of trainer from {}", path_.display());
        Ok(b)
    }

    /// Saves [`TrainerConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path_ = path.as_ref().to_owned();
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        info!("Save config of trainer into {}", path_.display());
        Ok(())
    }
}

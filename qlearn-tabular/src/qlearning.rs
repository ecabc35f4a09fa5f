//! Q-learning agent.
mod base;
mod config;
pub use base::QLearningAgent;
pub use config::QLearningConfig;

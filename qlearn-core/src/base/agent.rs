//! Agent.
use super::{Env, Policy, Transition};
use crate::record::Record;
use anyhow::Result;
use std::path::Path;

/// Represents a trainable policy on an environment.
///
/// Tabular agents learn online: every observed [`Transition`] is handed to
/// [`Agent::opt`] right after the environment step that produced it.
pub trait Agent<E: Env>: Policy<E> {
    /// Set the policy to training mode.
    fn train(&mut self);

    /// Set the policy to evaluation mode.
    fn eval(&mut self);

    /// Return if it is in training mode.
    fn is_train(&self) -> bool;

    /// Performs an optimization step with a single transition.
    fn opt(&mut self, transition: &Transition<E>) {
        let _ = self.opt_with_record(transition);
    }

    /// Performs an optimization step and returns some information.
    fn opt_with_record(&mut self, transition: &Transition<E>) -> Record;

    /// Save the parameters of the agent in the given directory.
    fn save_params(&self, path: &Path) -> Result<()>;

    /// Load the parameters of the agent from the given directory.
    fn load_params(&mut self, path: &Path) -> Result<()>;
}

/// An agent whose exploration rate can be adjusted from outside.
///
/// The agent itself never changes the rate; [`Trainer`](crate::Trainer)
/// decays it between episodes.
pub trait Exploration {
    /// Current exploration rate.
    fn exploration_rate(&self) -> f64;

    /// Overwrites the exploration rate.
    fn set_exploration_rate(&mut self, v: f64);
}

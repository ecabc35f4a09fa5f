//! Environment.
use super::{Info, Step};
use crate::record::Record;
use anyhow::Result;
use std::fmt::Debug;

/// Represents an environment, typically an episodic MDP with discrete
/// states and actions.
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Observation of the environment.
    ///
    /// Tabular agents use it directly as the state key.
    type Obs: Clone + Debug;

    /// Action of the environment.
    type Act: Clone + Debug;

    /// Information in the [`Step`] object.
    type Info: Info;

    /// Builds an environment with a given random seed.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Performes an environment step.
    fn step(&mut self, a: &Self::Act) -> (Step<Self>, Record)
    where
        Self: Sized;

    /// Resets the environment and returns the initial observation.
    fn reset(&mut self) -> Result<Self::Obs>;

    /// Resets the environment with a given index.
    ///
    /// The index is used in an arbitrary way. For example, it can be used as a random seed,
    /// which is useful when evaluating a trained agent. This method is called
    /// by [`DefaultEvaluator`] with the episode index.
    ///
    /// [`DefaultEvaluator`]: crate::DefaultEvaluator
    fn reset_with_index(&mut self, ix: usize) -> Result<Self::Obs> {
        let _ = ix;
        self.reset()
    }
}

//! Policy.
use super::Env;

/// A policy on an environment.
///
/// Policy is a mapping from an observation to an action.
/// The mapping can be either of deterministic or stochastic.
pub trait Policy<E: Env> {
    /// Sample an action given an observation.
    ///
    /// Returns `None` when there is no action to take, e.g. in a terminal state.
    fn sample(&mut self, obs: &E::Obs) -> Option<E::Act>;
}

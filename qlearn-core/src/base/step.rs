//! Environment step.
use super::Env;

/// Additional information to `Obs` and `Act`.
pub trait Info {}

impl Info for () {}

/// Represents an action, observation and reward tuple `(a_t, o_t+1, r_t)`
/// with some additional information.
///
/// An environment emits a [`Step`] object at every interaction step.
/// [`Sampler`](crate::Sampler) combines it with the previous observation
/// into a [`Transition`].
pub struct Step<E: Env> {
    /// Action.
    pub act: E::Act,

    /// Observation.
    pub obs: E::Obs,

    /// Reward.
    pub reward: f64,

    /// Flag denoting if episode is terminated.
    pub is_terminated: bool,

    /// Flag denoting if episode is truncated.
    pub is_truncated: bool,

    /// Information defined by user.
    pub info: E::Info,
}

impl<E: Env> Step<E> {
    /// Constructs a [`Step`] object.
    pub fn new(
        obs: E::Obs,
        act: E::Act,
        reward: f64,
        is_terminated: bool,
        is_truncated: bool,
        info: E::Info,
    ) -> Self {
        Step {
            act,
            obs,
            reward,
            is_terminated,
            is_truncated,
            info,
        }
    }

    #[inline]
    /// Terminated or truncated.
    pub fn is_done(&self) -> bool {
        self.is_terminated || self.is_truncated
    }
}

/// A single observed transition `(o_t, a_t, o_t+1, r_t)`.
///
/// This is what an [`Agent`](crate::Agent) learns from.
pub struct Transition<E: Env> {
    /// Observation before the action.
    pub obs: E::Obs,

    /// Action taken.
    pub act: E::Act,

    /// Observation after the action.
    pub next_obs: E::Obs,

    /// Reward.
    pub reward: f64,

    /// Flag denoting if episode is terminated.
    pub is_terminated: bool,

    /// Flag denoting if episode is truncated.
    pub is_truncated: bool,
}

impl<E: Env> Clone for Transition<E> {
    fn clone(&self) -> Self {
        Self {
            obs: self.obs.clone(),
            act: self.act.clone(),
            next_obs: self.next_obs.clone(),
            reward: self.reward,
            is_terminated: self.is_terminated,
            is_truncated: self.is_truncated,
        }
    }
}

impl<E: Env> Transition<E> {
    /// Builds a transition from the previous observation and a [`Step`].
    pub fn from_step(obs: E::Obs, step: &Step<E>) -> Self {
        Self {
            obs,
            act: step.act.clone(),
            next_obs: step.obs.clone(),
            reward: step.reward,
            is_terminated: step.is_terminated,
            is_truncated: step.is_truncated,
        }
    }
}

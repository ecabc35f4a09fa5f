#![warn(missing_docs)]
//! Core abstractions for tabular reinforcement learning.
//!
//! The crate defines how an agent talks to an environment ([`Env`], [`Policy`],
//! [`Agent`]), the capability an agent uses to enumerate legal actions
//! ([`LegalActions`]), a small metrics system ([`record`]) and an episodic
//! training loop ([`Trainer`]) that drives everything.
pub mod error;
pub mod record;
pub mod util;

mod base;
pub use base::{Agent, Env, Exploration, Info, LegalActions, Policy, Step, Transition};

mod evaluator;
pub use evaluator::{DefaultEvaluator, Evaluator};

mod trainer;
pub use trainer::{Sampler, Trainer, TrainerConfig};

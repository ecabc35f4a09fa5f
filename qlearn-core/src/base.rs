//! Core functionalities.
mod agent;
mod env;
mod legal_actions;
mod policy;
mod step;
pub use agent::{Agent, Exploration};
pub use env::Env;
pub use legal_actions::LegalActions;
pub use policy::Policy;
pub use step::{Info, Step, Transition};

#![warn(missing_docs)]
//! Tabular Q-learning.
//!
//! [`QLearningAgent`] keeps one estimate per `(state, action)` pair in a
//! [`QTable`], acts epsilon-greedily with respect to it and learns from each
//! transition with the one-step temporal-difference rule
//!
//! ```text
//! Q(s, a) <- (1 - alpha) * Q(s, a) + alpha * (r + discount * max_a' Q(s', a'))
//! ```
//!
//! Legal actions are supplied by the caller through
//! [`LegalActions`](qlearn_core::LegalActions); a state without legal actions
//! is terminal and has value `0.0`.
//!
//! ```rust
//! use qlearn_tabular::QLearningAgent;
//! use rand::{rngs::SmallRng, SeedableRng};
//!
//! let legal_actions = |s: &u8| if *s == 0 { vec!["stay", "go"] } else { vec![] };
//! let mut agent = QLearningAgent::new(0.5, 0.0, 0.99, legal_actions, SmallRng::seed_from_u64(0));
//!
//! agent.update(&0, &"go", &1, 10.0);
//! assert_eq!(agent.get_q_value(&0, &"go"), 5.0);
//! assert_eq!(agent.get_policy(&0), Some("go"));
//! assert_eq!(agent.get_action(&1), None);
//!
//! // Exploration is scheduled by the caller.
//! agent.epsilon *= 0.99;
//! ```
pub mod qlearning;
mod qtable;
pub use qlearning::{QLearningAgent, QLearningConfig};
pub use qtable::QTable;

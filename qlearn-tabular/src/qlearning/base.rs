//! Q-learning agent with a lookup table.
#![allow(clippy::float_cmp)]
use super::QLearningConfig;
use crate::QTable;
use anyhow::Result;
use log::info;
use qlearn_core::{
    record::{Record, RecordValue},
    Agent, Env, Exploration, LegalActions, Policy, Transition,
};
use rand::{rngs::SmallRng, seq::SliceRandom, Rng, SeedableRng};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs::{self, File},
    hash::Hash,
    io::{BufReader, Write},
    path::Path,
};

const QTABLE_FILE: &str = "qtable.yaml";

/// Tabular Q-learning agent.
///
/// * `S` - state, used as a table key and never inspected.
/// * `A` - action.
/// * `L` - legal-action provider, queried on every decision and never cached.
/// * `R` - random number generator for exploration.
///
/// `alpha`, `epsilon` and `discount` are public so that a training loop can
/// schedule them between episodes; the agent never changes them itself.
pub struct QLearningAgent<S, A, L, R = SmallRng> {
    /// Learning rate.
    pub alpha: f64,

    /// Exploration rate.
    pub epsilon: f64,

    /// Discount factor.
    pub discount: f64,

    legal_actions: L,
    q_values: QTable<S, A>,
    rng: R,
    train: bool,
}

impl<S, A, L> QLearningAgent<S, A, L, SmallRng>
where
    S: Eq + Hash + Clone,
    A: Eq + Hash + Clone,
    L: LegalActions<S, A>,
{
    /// Constructs an agent from a configuration, seeding a [`SmallRng`]
    /// with `config.seed`.
    pub fn build(config: QLearningConfig, legal_actions: L) -> Self {
        Self::new(
            config.alpha,
            config.epsilon,
            config.discount,
            legal_actions,
            SmallRng::seed_from_u64(config.seed),
        )
    }
}

impl<S, A, L, R> QLearningAgent<S, A, L, R>
where
    S: Eq + Hash + Clone,
    A: Eq + Hash + Clone,
    L: LegalActions<S, A>,
    R: Rng,
{
    /// Constructs an agent with an empty table.
    pub fn new(alpha: f64, epsilon: f64, discount: f64, legal_actions: L, rng: R) -> Self {
        Self {
            alpha,
            epsilon,
            discount,
            legal_actions,
            q_values: QTable::new(),
            rng,
            train: true,
        }
    }

    /// Returns `Q(state, action)`, `0.0` for pairs never written.
    pub fn get_q_value(&self, state: &S, action: &A) -> f64 {
        self.q_values.get(state, action)
    }

    /// Sets `Q(state, action)` to `value`.
    pub fn set_q_value(&mut self, state: S, action: A, value: f64) {
        self.q_values.set(state, action, value);
    }

    /// Returns the maximum of `Q(state, a)` over the legal actions `a`, or
    /// `0.0` if there is none.
    pub fn get_value(&self, state: &S) -> f64 {
        let actions = self.legal_actions.legal_actions(state);
        self.max_q_value(state, &actions)
    }

    /// Returns the greedy action, `None` if there is no legal action.
    ///
    /// Among actions sharing the maximal value, the one enumerated first by the
    /// legal-action provider wins. The choice between ties is therefore only
    /// as stable as the provider's ordering.
    pub fn get_policy(&self, state: &S) -> Option<A> {
        let actions = self.legal_actions.legal_actions(state);
        self.greedy(state, actions)
    }

    /// Returns the action to take, exploring with probability `epsilon`.
    ///
    /// With probability `epsilon` an action is drawn uniformly from the legal
    /// actions, otherwise the greedy action of [`get_policy`] is returned.
    /// `None` if there is no legal action; the random number generator is not
    /// touched in that case.
    ///
    /// [`get_policy`]: Self::get_policy
    pub fn get_action(&mut self, state: &S) -> Option<A> {
        let actions = self.legal_actions.legal_actions(state);
        if actions.is_empty() {
            return None;
        }

        if self.rng.gen::<f64>() < self.epsilon {
            actions.choose(&mut self.rng).cloned()
        } else {
            self.greedy(state, actions)
        }
    }

    /// Applies the one-step TD update for the transition
    /// `(state, action, reward, next_state)`.
    ///
    /// The target bootstraps from the greedy value of `next_state` under the
    /// current table, whatever action is actually taken next.
    pub fn update(&mut self, state: &S, action: &A, next_state: &S, reward: f64) {
        let target = reward + self.discount * self.get_value(next_state);
        let q = (1.0 - self.alpha) * self.get_q_value(state, action) + self.alpha * target;
        self.q_values.set_ref(state, action, q);
    }

    /// Returns the table of action values.
    pub fn q_table(&self) -> &QTable<S, A> {
        &self.q_values
    }

    /// Returns the legal-action provider.
    pub fn legal_actions(&self) -> &L {
        &self.legal_actions
    }

    // Scans in enumeration order and keeps the first strictly larger value.
    fn max_q_value(&self, state: &S, actions: &[A]) -> f64 {
        let mut actions = actions.iter();
        match actions.next() {
            None => 0.0,
            Some(first) => actions.fold(self.get_q_value(state, first), |max, a| {
                let v = self.get_q_value(state, a);
                if v > max {
                    v
                } else {
                    max
                }
            }),
        }
    }

    fn greedy(&self, state: &S, actions: Vec<A>) -> Option<A> {
        let max = self.max_q_value(state, &actions);
        actions
            .into_iter()
            .find(|a| self.get_q_value(state, a) == max)
    }
}

impl<E, S, A, L, R> Policy<E> for QLearningAgent<S, A, L, R>
where
    E: Env<Obs = S, Act = A>,
    S: Eq + Hash + Clone,
    A: Eq + Hash + Clone,
    L: LegalActions<S, A>,
    R: Rng,
{
    /// Explores in training mode, acts greedily in evaluation mode.
    fn sample(&mut self, obs: &S) -> Option<A> {
        if self.train {
            self.get_action(obs)
        } else {
            self.get_policy(obs)
        }
    }
}

impl<E, S, A, L, R> Agent<E> for QLearningAgent<S, A, L, R>
where
    E: Env<Obs = S, Act = A>,
    S: Eq + Hash + Clone + Serialize + DeserializeOwned,
    A: Eq + Hash + Clone + Serialize + DeserializeOwned,
    L: LegalActions<S, A>,
    R: Rng,
{
    fn train(&mut self) {
        self.train = true;
    }

    fn eval(&mut self) {
        self.train = false;
    }

    fn is_train(&self) -> bool {
        self.train
    }

    fn opt(&mut self, transition: &Transition<E>) {
        self.update(
            &transition.obs,
            &transition.act,
            &transition.next_obs,
            transition.reward,
        );
    }

    /// Records `"td_error"`, the target minus the estimate before the update,
    /// and `"q_value"`, the estimate after it.
    fn opt_with_record(&mut self, transition: &Transition<E>) -> Record {
        let q_old = self.get_q_value(&transition.obs, &transition.act);
        let target = transition.reward + self.discount * self.get_value(&transition.next_obs);
        self.update(
            &transition.obs,
            &transition.act,
            &transition.next_obs,
            transition.reward,
        );
        let q_new = self.get_q_value(&transition.obs, &transition.act);

        Record::from_slice(&[
            ("td_error", RecordValue::Scalar((target - q_old) as f32)),
            ("q_value", RecordValue::Scalar(q_new as f32)),
        ])
    }

    /// Writes the table to `qtable.yaml` in the given directory.
    fn save_params(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)?;
        let path = path.join(QTABLE_FILE);
        let mut file = File::create(&path)?;
        file.write_all(serde_yaml::to_string(&self.q_values)?.as_bytes())?;
        info!(
            "Save Q-table with {} entries into {}",
            self.q_values.len(),
            path.display()
        );
        Ok(())
    }

    /// Replaces the table with the one in `qtable.yaml` in the given directory.
    fn load_params(&mut self, path: &Path) -> Result<()> {
        let path = path.join(QTABLE_FILE);
        let rdr = BufReader::new(File::open(&path)?);
        self.q_values = serde_yaml::from_reader(rdr)?;
        info!(
            "Load Q-table with {} entries from {}",
            self.q_values.len(),
            path.display()
        );
        Ok(())
    }
}

impl<S, A, L, R> Exploration for QLearningAgent<S, A, L, R> {
    fn exploration_rate(&self) -> f64 {
        self.epsilon
    }

    fn set_exploration_rate(&mut self, v: f64) {
        self.epsilon = v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    type Provider = fn(&u8) -> Vec<char>;

    // State 0 offers three actions, state 1 offers one, everything else is terminal.
    fn provider(s: &u8) -> Vec<char> {
        match *s {
            0 => vec!['a', 'b', 'c'],
            1 => vec!['x'],
            _ => vec![],
        }
    }

    fn agent(epsilon: f64, seed: u64) -> QLearningAgent<u8, char, Provider> {
        QLearningAgent::new(0.5, epsilon, 0.9, provider, SmallRng::seed_from_u64(seed))
    }

    #[test]
    fn test_terminal_state() {
        let mut agent = agent(0.5, 0);
        assert_eq!(agent.get_value(&9), 0.0);
        assert_eq!(agent.get_policy(&9), None);
        assert_eq!(agent.get_action(&9), None);
    }

    #[test]
    fn test_unwritten_q_value_is_zero() {
        let mut agent = agent(0.0, 0);
        agent.set_q_value(0, 'a', 3.0);
        assert_eq!(agent.get_q_value(&0, &'b'), 0.0);
        assert_eq!(agent.get_q_value(&1, &'a'), 0.0);
        assert_eq!(agent.q_table().len(), 1);
    }

    #[test]
    fn test_value_is_max_over_legal_actions() {
        let mut agent = agent(0.0, 0);
        agent.set_q_value(0, 'a', -1.0);
        agent.set_q_value(0, 'b', 4.0);
        agent.set_q_value(0, 'c', 2.0);
        // Not legal in state 0, must be ignored.
        agent.set_q_value(0, 'x', 100.0);
        assert_eq!(agent.get_value(&0), 4.0);
        assert_eq!(agent.get_policy(&0), Some('b'));
    }

    #[test]
    fn test_value_can_be_negative() {
        let mut agent = agent(0.0, 0);
        agent.set_q_value(0, 'a', -3.0);
        agent.set_q_value(0, 'b', -1.0);
        agent.set_q_value(0, 'c', -2.0);
        assert_eq!(agent.get_value(&0), -1.0);
        assert_eq!(agent.get_policy(&0), Some('b'));
    }

    #[test]
    fn test_policy_tie_break_is_first_in_order() {
        let mut agent = agent(0.0, 0);
        assert_eq!(agent.get_policy(&0), Some('a'));

        agent.set_q_value(0, 'b', 1.0);
        agent.set_q_value(0, 'c', 1.0);
        assert_eq!(agent.get_policy(&0), Some('b'));

        // Reversing the enumeration order flips the winner among ties.
        let reversed = |s: &u8| {
            let mut v = provider(s);
            v.reverse();
            v
        };
        let mut agent_rev = QLearningAgent::new(0.5, 0.0, 0.9, reversed, SmallRng::seed_from_u64(0));
        agent_rev.set_q_value(0, 'b', 1.0);
        agent_rev.set_q_value(0, 'c', 1.0);
        assert_eq!(agent_rev.get_policy(&0), Some('c'));
    }

    #[test]
    fn test_greedy_when_epsilon_is_zero() {
        let mut agent = agent(0.0, 3);
        agent.set_q_value(0, 'c', 0.5);
        for _ in 0..100 {
            assert_eq!(agent.get_action(&0), agent.get_policy(&0));
        }
    }

    #[test]
    fn test_queries_are_idempotent() {
        let mut agent = agent(0.3, 11);
        agent.set_q_value(0, 'a', 0.2);
        agent.set_q_value(0, 'c', 0.7);

        let value = agent.get_value(&0);
        let policy = agent.get_policy(&0);
        for _ in 0..10 {
            assert_eq!(agent.get_value(&0), value);
            assert_eq!(agent.get_policy(&0), policy);
        }

        let actions: Vec<_> = (0..20).map(|_| agent.get_action(&0)).collect();
        let mut agent_ = self::agent(0.3, 11);
        agent_.set_q_value(0, 'a', 0.2);
        agent_.set_q_value(0, 'c', 0.7);
        let actions_: Vec<_> = (0..20).map(|_| agent_.get_action(&0)).collect();
        assert_eq!(actions, actions_);
    }

    #[test]
    fn test_random_actions_follow_seeded_sequence() {
        let mut agent = agent(1.0, 1234);
        let mut rng = SmallRng::seed_from_u64(1234);
        let legal = provider(&0);

        for _ in 0..200 {
            let u = rng.gen::<f64>();
            assert!(u < 1.0);
            let expected = legal.choose(&mut rng).cloned();
            assert_eq!(agent.get_action(&0), expected);
        }
    }

    #[test]
    fn test_random_actions_are_uniform() {
        let mut agent = agent(1.0, 99);
        // A strongly preferred action must not bias exploration.
        agent.set_q_value(0, 'a', 10.0);

        let n = 30_000;
        let mut counts = HashMap::new();
        for _ in 0..n {
            let a = agent.get_action(&0).unwrap();
            *counts.entry(a).or_insert(0usize) += 1;
        }

        assert_eq!(counts.len(), 3);
        for a in ['a', 'b', 'c'] {
            let p = counts[&a] as f64 / n as f64;
            assert!((p - 1.0 / 3.0).abs() < 0.02, "{}: {}", a, p);
        }
    }

    #[test]
    fn test_update_converges_to_terminal_reward() {
        let mut agent = agent(0.0, 0);
        agent.alpha = 0.5;

        let expected = [5.0, 7.5, 8.75, 9.375];
        for q in expected {
            agent.update(&1, &'x', &9, 10.0);
            assert_eq!(agent.get_q_value(&1, &'x'), q);
        }
        for _ in 0..100 {
            agent.update(&1, &'x', &9, 10.0);
        }
        assert!((agent.get_q_value(&1, &'x') - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_update_bootstraps_from_max_of_next_state() {
        let mut agent = agent(0.0, 0);
        agent.alpha = 1.0;
        agent.discount = 0.5;
        agent.set_q_value(1, 'x', 8.0);

        agent.update(&0, &'a', &1, 1.0);
        assert_eq!(agent.get_q_value(&0, &'a'), 1.0 + 0.5 * 8.0);
        // Only the updated pair is written.
        assert_eq!(agent.q_table().len(), 2);
    }

    #[test]
    fn test_update_with_zero_alpha_keeps_estimate() {
        let mut agent = agent(0.0, 0);
        agent.alpha = 0.0;
        agent.set_q_value(0, 'a', 2.0);
        agent.update(&0, &'a', &9, 100.0);
        assert_eq!(agent.get_q_value(&0, &'a'), 2.0);
    }

    proptest! {
        #[test]
        fn prop_value_and_policy_match_table(
            values in proptest::collection::vec(-5i32..5, 1..8),
        ) {
            // Integer-valued entries make ties likely.
            let n = values.len() as u8;
            let legal = move |_: &u8| (0..n).collect::<Vec<u8>>();
            let mut agent = QLearningAgent::new(0.5, 0.0, 0.9, legal, SmallRng::seed_from_u64(0));
            for (a, v) in values.iter().enumerate() {
                agent.set_q_value(0u8, a as u8, *v as f64);
            }

            let max = values.iter().copied().max().unwrap() as f64;
            prop_assert_eq!(agent.get_value(&0), max);

            let first = values.iter().position(|v| *v as f64 == max).unwrap() as u8;
            let policy = agent.get_policy(&0).unwrap();
            prop_assert_eq!(policy, first);
            prop_assert_eq!(agent.get_q_value(&0, &policy), agent.get_value(&0));
        }
    }
}

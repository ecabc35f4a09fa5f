//! Default implementation of the [`Evaluator`] trait.
use super::Evaluator;
use crate::{record::Record, Agent, Env};
use anyhow::Result;
use log::debug;

/// Runs a fixed number of episodes and reports the average return as
/// `"eval_reward"`.
///
/// Episodes end when the environment terminates or truncates, when the agent
/// has no action to take, or after `max_steps` steps.
///
/// ```ignore
/// let mut evaluator = DefaultEvaluator::new(&config, 42, 10)?;
/// let record = evaluator.evaluate(&mut agent)?;
/// println!("Average return: {}", record.get_scalar("eval_reward")?);
/// ```
pub struct DefaultEvaluator<E: Env> {
    /// The number of episodes to run during evaluation.
    n_episodes: usize,

    /// Episodes are cut off after this many steps.
    max_steps: usize,

    /// The environment instance used for evaluation.
    env: E,
}

impl<E: Env> Evaluator<E> for DefaultEvaluator<E> {
    fn evaluate<A>(&mut self, agent: &mut A) -> Result<Record>
    where
        A: Agent<E>,
    {
        let mut r_total = 0f64;

        for ix in 0..self.n_episodes {
            let mut prev_obs = self.env.reset_with_index(ix)?;
            let mut r_episode = 0f64;

            for _ in 0..self.max_steps {
                let act = match agent.sample(&prev_obs) {
                    Some(act) => act,
                    None => break,
                };
                let (step, _) = self.env.step(&act);
                r_episode += step.reward;
                if step.is_done() {
                    break;
                }
                prev_obs = step.obs;
            }

            debug!("Evaluation episode {}: return = {}", ix, r_episode);
            r_total += r_episode;
        }

        let n = self.n_episodes.max(1) as f64;
        Ok(Record::from_scalar("eval_reward", (r_total / n) as f32))
    }
}

impl<E: Env> DefaultEvaluator<E> {
    /// Constructs a new [`DefaultEvaluator`].
    ///
    /// * `config` - Configuration for the environment
    /// * `seed` - Random seed for environment initialization
    /// * `n_episodes` - Number of episodes to run during evaluation
    pub fn new(config: &E::Config, seed: i64, n_episodes: usize) -> Result<Self> {
        Ok(Self {
            n_episodes,
            max_steps: usize::MAX,
            env: E::build(config, seed)?,
        })
    }

    /// Cuts evaluation episodes off after `v` steps.
    ///
    /// A greedy policy can loop forever in an environment with cycles, so
    /// set this for anything but strictly acyclic environments.
    pub fn max_steps(mut self, v: usize) -> Self {
        self.max_steps = v;
        self
    }
}

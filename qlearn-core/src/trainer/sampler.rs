//! Interaction between an agent and an environment.
use crate::{
    record::{Record, RecordValue},
    Agent, Env, Transition,
};
use anyhow::Result;
use log::trace;

/// Drives one environment on behalf of an agent.
///
/// Every call to [`Sampler::sample_and_opt`] performs at most one environment
/// step: the agent chooses an action for the previous observation, the
/// environment applies it, and the resulting [`Transition`] is handed back to
/// the agent with [`Agent::opt_with_record`]. The environment is reset lazily
/// at the first call after an episode ended.
pub struct Sampler<E: Env> {
    env: E,

    /// Previous observation, `None` right after an episode ended.
    prev_obs: Option<E::Obs>,

    /// Episodes are truncated after this many steps.
    max_steps: usize,

    episode_length: usize,
    episode_return: f64,
}

impl<E: Env> Sampler<E> {
    /// Creates a sampler truncating episodes after `max_steps` steps.
    pub fn new(env: E, max_steps: usize) -> Self {
        Self {
            env,
            prev_obs: None,
            max_steps,
            episode_length: 0,
            episode_return: 0.0,
        }
    }

    /// Samples a transition and lets the agent learn from it.
    ///
    /// The second value of the returned tuple is `true` if the episode ended
    /// with this call. In that case the record carries `"episode_return"` and
    /// `"episode_length"`. An episode also ends, without an environment step,
    /// when the agent has no action for the current observation.
    pub fn sample_and_opt<A: Agent<E>>(&mut self, agent: &mut A) -> Result<(Record, bool)> {
        let obs = match self.prev_obs.take() {
            Some(obs) => obs,
            None => {
                self.episode_length = 0;
                self.episode_return = 0.0;
                self.env.reset()?
            }
        };

        let act = match agent.sample(&obs) {
            Some(act) => act,
            None => {
                trace!("No action available for {:?}, ending the episode", obs);
                return Ok((self.episode_record(Record::empty()), true));
            }
        };

        let (step, record_env) = self.env.step(&act);
        self.episode_length += 1;
        self.episode_return += step.reward;

        let transition = Transition::from_step(obs, &step);
        let record_agent = agent.opt_with_record(&transition);
        let record = record_env.merge(record_agent);

        if step.is_done() || self.episode_length >= self.max_steps {
            Ok((self.episode_record(record), true))
        } else {
            self.prev_obs = Some(step.obs);
            Ok((record, false))
        }
    }

    fn episode_record(&self, mut record: Record) -> Record {
        record.insert(
            "episode_return",
            RecordValue::Scalar(self.episode_return as f32),
        );
        record.insert(
            "episode_length",
            RecordValue::Scalar(self.episode_length as f32),
        );
        record
    }
}

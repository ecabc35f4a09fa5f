//! Train [`Agent`].
mod config;
mod sampler;
use crate::{
    record::{RecordValue::Scalar, Recorder},
    Agent, Env, Evaluator, Exploration,
};
use anyhow::Result;
pub use config::TrainerConfig;
use log::{info, warn};
pub use sampler::Sampler;
use std::path::{Path, PathBuf};

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Manages the episodic training loop.
///
/// # Training loop
///
/// 0. Given an agent implementing [`Agent`] and [`Exploration`], a recorder
///    implementing [`Recorder`] and an [`Evaluator`].
/// 1. Wrap the environment in a [`Sampler`] and set the agent to training mode.
/// 2. Do an environment step. The agent picks an action for the current
///    observation, the environment applies it and the agent learns from the
///    resulting transition right away. The records of the step are stored
///    in the recorder.
/// 3. When the episode ends (terminated, truncated, or no legal action left):
///     1. `episodes += 1`, record `"episode"`, `"episode_return"`,
///        `"episode_length"` and the current `"epsilon"`.
///     2. Multiply the exploration rate by `epsilon_decay`, but not below
///        `min_epsilon`.
///     3. If `episodes % eval_interval == 0`, evaluate the agent in evaluation
///        mode and record `"eval_reward"`. If it is the best so far, the agent
///        is saved in `(model_dir)/best`.
///     4. If `episodes % save_interval == 0`, the agent is saved in
///        `(model_dir)/(episodes)`.
///     5. If `episodes % flush_record_interval == 0`, flush the recorder.
///     6. If `episodes == max_episodes`, finish training.
/// 4. Back to step 2.
///
/// # Interaction of objects
///
/// ```mermaid
/// graph LR
///     A[Agent]-->|Env::Act|B[Env]
///     B -->|Env::Obs|A
///     B -->|"Step&lt;E: Env&gt;"|C[Sampler]
///     C -->|"Transition&lt;E: Env&gt;"|A
/// ```
pub struct Trainer {
    /// The number of training episodes.
    max_episodes: usize,

    /// Episodes are truncated after this many steps.
    max_steps_per_episode: usize,

    /// Interval of evaluation in episodes.
    eval_interval: usize,

    /// Interval of flushing records in episodes.
    flush_records_interval: usize,

    /// Interval of saving the agent in episodes.
    save_interval: usize,

    /// Per-episode decay factor of the exploration rate.
    epsilon_decay: f64,

    /// Lower bound of the exploration rate.
    min_epsilon: f64,

    /// Where to save the trained agent.
    model_dir: Option<String>,
}

impl Trainer {
    /// Constructs a trainer.
    pub fn build(config: TrainerConfig) -> Self {
        Self {
            max_episodes: config.max_episodes,
            max_steps_per_episode: config.max_steps_per_episode,
            eval_interval: config.eval_interval,
            flush_records_interval: config.flush_record_interval,
            save_interval: config.save_interval,
            epsilon_decay: config.epsilon_decay,
            min_epsilon: config.min_epsilon,
            model_dir: config.model_dir,
        }
    }

    fn save_model<E: Env, A: Agent<E>>(agent: &A, model_dir: PathBuf) {
        match agent.save_params(&model_dir) {
            Ok(()) => info!("Saved the model in {:?}.", &model_dir),
            Err(e) => warn!("Failed to save model in {:?}: {}", &model_dir, e),
        }
    }

    fn save_best_model<E: Env, A: Agent<E>>(agent: &A, model_dir: &str) {
        Self::save_model::<E, A>(agent, Path::new(model_dir).join("best"));
    }

    fn save_model_with_episodes<E: Env, A: Agent<E>>(agent: &A, model_dir: &str, episodes: usize) {
        Self::save_model::<E, A>(agent, Path::new(model_dir).join(episodes.to_string()));
    }

    fn decay_epsilon<A: Exploration>(&self, agent: &mut A) {
        let eps = agent.exploration_rate();
        if eps > self.min_epsilon {
            agent.set_exploration_rate((eps * self.epsilon_decay).max(self.min_epsilon));
        }
    }

    fn is_interval(episodes: usize, interval: usize) -> bool {
        interval > 0 && episodes % interval == 0
    }

    /// Train the agent.
    ///
    /// Returns the best evaluation reward, if any evaluation was done.
    pub fn train<E, A, D>(
        &mut self,
        env: E,
        agent: &mut A,
        recorder: &mut dyn Recorder,
        evaluator: &mut D,
    ) -> Result<Option<f32>>
    where
        E: Env,
        A: Agent<E> + Exploration,
        D: Evaluator<E>,
    {
        let mut sampler = Sampler::new(env, self.max_steps_per_episode);
        let mut max_eval_reward: Option<f32> = None;
        let mut episodes: usize = 0;
        agent.train();

        while episodes < self.max_episodes {
            let (mut record, is_done) = sampler.sample_and_opt(agent)?;

            if !is_done {
                if !record.is_empty() {
                    recorder.store(record);
                }
                continue;
            }

            // Postprocessing after each episode
            episodes += 1;
            record.insert("episode", Scalar(episodes as f32));
            record.insert("epsilon", Scalar(agent.exploration_rate() as f32));
            self.decay_epsilon(agent);

            // Evaluation
            if Self::is_interval(episodes, self.eval_interval) {
                info!("Starts evaluation of the trained agent");
                agent.eval();
                let eval_record = evaluator.evaluate(agent)?;
                agent.train();
                let eval_reward = eval_record.get_scalar("eval_reward")?;
                info!("Episode {}: eval_reward = {}", episodes, eval_reward);
                record.merge_inplace(eval_record);

                // Save the best model up to the current episode
                if max_eval_reward.map_or(true, |best| eval_reward > best) {
                    max_eval_reward = Some(eval_reward);
                    if let Some(model_dir) = self.model_dir.as_ref() {
                        Self::save_best_model::<E, A>(agent, model_dir);
                    }
                }
            }

            // Save the current model
            if Self::is_interval(episodes, self.save_interval) {
                if let Some(model_dir) = self.model_dir.as_ref() {
                    Self::save_model_with_episodes::<E, A>(agent, model_dir, episodes);
                }
            }

            recorder.store(record);

            if Self::is_interval(episodes, self.flush_records_interval) {
                recorder.flush(episodes as _);
            }
        }

        Ok(max_eval_reward)
    }
}

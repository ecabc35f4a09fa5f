//! Utilities for interaction of agents and environments.
use crate::{
    record::{RecordValue, Recorder},
    Env, Policy,
};
use anyhow::Result;

/// Run episodes with a policy and recorder.
///
/// Every step is written to `recorder` with the keys `"reward"`, `"episode"`
/// and `"step"`, merged with whatever the environment put in its own record.
/// Episodes end when the environment is done, when the policy has no action,
/// or after `max_steps` steps. Returns the return of each episode.
pub fn eval_with_recorder<E, P, R>(
    env: &mut E,
    policy: &mut P,
    n_episodes: usize,
    max_steps: usize,
    recorder: &mut R,
) -> Result<Vec<f64>>
where
    E: Env,
    P: Policy<E>,
    R: Recorder + ?Sized,
{
    let mut rs = Vec::with_capacity(n_episodes);

    for episode in 0..n_episodes {
        let mut prev_obs = env.reset_with_index(episode)?;
        let mut r_total = 0.0;

        for count_step in 0..max_steps {
            let act = match policy.sample(&prev_obs) {
                Some(act) => act,
                None => break,
            };
            let (step, mut record) = env.step(&act);
            r_total += step.reward;

            record.insert("reward", RecordValue::Scalar(step.reward as _));
            record.insert("episode", RecordValue::Scalar(episode as _));
            record.insert("step", RecordValue::Scalar(count_step as _));
            recorder.write(record);

            if step.is_done() {
                break;
            }
            prev_obs = step.obs;
        }
        rs.push(r_total);
    }

    Ok(rs)
}

mod common;

use anyhow::Result;
use common::{Corridor, CorridorActions, CorridorConfig, LEFT, RIGHT};
use qlearn_core::{Agent, Env, Policy, Transition};
use qlearn_tabular::{QLearningAgent, QLearningConfig};
use rand::{rngs::SmallRng, SeedableRng};
use tempdir::TempDir;

const LENGTH: usize = 5;
const N_EPISODES: usize = 500;
const MAX_STEPS: usize = 200;

fn create_agent(config: QLearningConfig) -> QLearningAgent<usize, i8, CorridorActions> {
    QLearningAgent::build(config, CorridorActions { length: LENGTH })
}

// Drives the agent by hand with `get_action` and `update`.
fn run_episode(agent: &mut QLearningAgent<usize, i8, CorridorActions>, env: &mut Corridor) -> Result<usize> {
    let mut state = env.reset()?;
    for n in 0..MAX_STEPS {
        let action = match agent.get_action(&state) {
            Some(action) => action,
            None => return Ok(n),
        };
        let (step, _) = env.step(&action);
        agent.update(&state, &action, &step.obs, step.reward);
        if step.is_done() {
            return Ok(n + 1);
        }
        state = step.obs;
    }
    Ok(MAX_STEPS)
}

#[test]
fn test_two_state_chain() {
    // a --(0)--> b --(10)--> terminal
    let legal_actions = |s: &char| match *s {
        'a' | 'b' => vec!["next"],
        _ => vec![],
    };
    let mut agent = QLearningAgent::new(1.0, 0.0, 1.0, legal_actions, SmallRng::seed_from_u64(0));

    agent.update(&'b', &"next", &'t', 10.0);
    agent.update(&'a', &"next", &'b', 0.0);
    assert_eq!(agent.get_q_value(&'b', &"next"), 10.0);
    assert_eq!(agent.get_q_value(&'a', &"next"), 10.0);
    assert_eq!(agent.get_value(&'a'), 10.0);
    assert_eq!(agent.get_value(&'t'), 0.0);
}

#[test]
fn test_greedy_agent_solves_corridor() -> Result<()> {
    let config = QLearningConfig::default().alpha(0.5).epsilon(1.0).discount(0.9).seed(42);
    let mut agent = create_agent(config);
    let mut env = Corridor::build(&CorridorConfig { length: LENGTH }, 0)?;

    for _ in 0..N_EPISODES {
        run_episode(&mut agent, &mut env)?;
        agent.epsilon = (agent.epsilon * 0.99).max(0.05);
    }

    for s in 0..LENGTH - 1 {
        assert_eq!(agent.get_policy(&s), Some(RIGHT), "state {}", s);
        assert!(agent.get_q_value(&s, &RIGHT) > agent.get_q_value(&s, &LEFT));
    }
    assert_eq!(agent.get_policy(&(LENGTH - 1)), None);
    assert_eq!(agent.get_value(&(LENGTH - 1)), 0.0);

    // Values approach discount^(distance to goal - 1).
    let v0 = agent.get_value(&0);
    assert!((v0 - 0.9f64.powi(LENGTH as i32 - 2)).abs() < 0.05, "{}", v0);

    agent.epsilon = 0.0;
    assert_eq!(run_episode(&mut agent, &mut env)?, LENGTH - 1);
    Ok(())
}

#[test]
fn test_policy_sample_follows_mode() -> Result<()> {
    let config = QLearningConfig::default().epsilon(1.0).seed(3);
    let mut agent = create_agent(config);
    agent.set_q_value(0, RIGHT, 1.0);

    // Fully exploring in training mode, both directions show up.
    let mut seen_left = false;
    for _ in 0..100 {
        if Policy::<Corridor>::sample(&mut agent, &0) == Some(LEFT) {
            seen_left = true;
        }
    }
    assert!(seen_left);

    Agent::<Corridor>::eval(&mut agent);
    assert!(!Agent::<Corridor>::is_train(&agent));
    for _ in 0..100 {
        assert_eq!(Policy::<Corridor>::sample(&mut agent, &0), Some(RIGHT));
    }
    assert_eq!(Policy::<Corridor>::sample(&mut agent, &(LENGTH - 1)), None);
    Ok(())
}

#[test]
fn test_opt_with_record() -> Result<()> {
    let config = QLearningConfig::default().alpha(0.5).discount(0.9);
    let mut agent = create_agent(config);
    let mut env = Corridor::build(&CorridorConfig { length: LENGTH }, 0)?;
    let obs = env.reset()?;
    agent.set_q_value(1, RIGHT, 2.0);

    let (step, _) = env.step(&RIGHT);
    let transition = Transition::from_step(obs, &step);
    let record = Agent::<Corridor>::opt_with_record(&mut agent, &transition);

    // target = 0 + 0.9 * 2.0, estimate moves half way from 0.
    assert!((record.get_scalar("td_error")? - 1.8).abs() < 1e-6);
    assert!((record.get_scalar("q_value")? - 0.9).abs() < 1e-6);
    assert_eq!(agent.get_q_value(&0, &RIGHT), 0.5 * 1.8);
    Ok(())
}

#[test]
fn test_save_and_load_params() -> Result<()> {
    let mut agent = create_agent(QLearningConfig::default());
    agent.set_q_value(0, RIGHT, 0.729);
    agent.set_q_value(0, LEFT, 0.5);
    agent.set_q_value(3, RIGHT, 1.0);

    let dir = TempDir::new("qlearning_params")?;
    Agent::<Corridor>::save_params(&agent, dir.path())?;
    assert!(dir.path().join("qtable.yaml").exists());

    let mut agent_ = create_agent(QLearningConfig::default());
    agent_.set_q_value(2, LEFT, 9.0);
    Agent::<Corridor>::load_params(&mut agent_, dir.path())?;

    // The table is replaced, not merged.
    assert_eq!(agent_.q_table().len(), 3);
    assert_eq!(agent_.get_q_value(&2, &LEFT), 0.0);
    for s in 0..LENGTH {
        for a in [LEFT, RIGHT] {
            assert_eq!(agent_.get_q_value(&s, &a), agent.get_q_value(&s, &a));
        }
    }
    assert_eq!(agent_.get_policy(&0), Some(RIGHT));
    Ok(())
}

#[test]
fn test_load_params_from_missing_dir() -> Result<()> {
    let dir = TempDir::new("qlearning_params")?;
    let mut agent = create_agent(QLearningConfig::default());
    assert!(Agent::<Corridor>::load_params(&mut agent, &dir.path().join("nothing")).is_err());
    Ok(())
}

use anyhow::Result;
use clap::Parser;
use qlearn_core::{
    record::{LogRecorder, Record},
    util, Agent, DefaultEvaluator, Env, LegalActions, Step, Trainer, TrainerConfig,
};
use qlearn_tabular::{QLearningAgent, QLearningConfig};
use std::path::Path;

const LENGTH: usize = 10;
const STEP_REWARD: f64 = -0.01;
const GOAL_REWARD: f64 = 1.0;
const ALPHA: f64 = 0.5;
const EPSILON: f64 = 1.0;
const DISCOUNT_FACTOR: f64 = 0.99;
const EPSILON_DECAY: f64 = 0.99;
const MIN_EPSILON: f64 = 0.01;
const MAX_STEPS_PER_EPISODE: usize = 500;
const EVAL_INTERVAL: usize = 50;
const N_EPISODES_PER_EVAL: usize = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
enum Move {
    Left,
    Right,
}

#[derive(Clone, Debug)]
struct CorridorConfig {
    length: usize,
}

/// Walk from the left end of a corridor to the right end.
struct Corridor {
    length: usize,
    pos: usize,
}

impl Env for Corridor {
    type Config = CorridorConfig;
    type Obs = usize;
    type Act = Move;
    type Info = ();

    fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
        Ok(Self {
            length: config.length,
            pos: 0,
        })
    }

    fn step(&mut self, a: &Move) -> (Step<Self>, Record) {
        self.pos = match a {
            Move::Left => self.pos.saturating_sub(1),
            Move::Right => (self.pos + 1).min(self.length - 1),
        };
        let is_terminated = self.pos == self.length - 1;
        let reward = if is_terminated { GOAL_REWARD } else { STEP_REWARD };
        let step = Step::new(self.pos, *a, reward, is_terminated, false, ());
        (step, Record::empty())
    }

    fn reset(&mut self) -> Result<usize> {
        self.pos = 0;
        Ok(self.pos)
    }
}

#[derive(Clone)]
struct CorridorActions {
    length: usize,
}

impl LegalActions<usize, Move> for CorridorActions {
    fn legal_actions(&self, state: &usize) -> Vec<Move> {
        if *state + 1 >= self.length {
            vec![]
        } else {
            vec![Move::Left, Move::Right]
        }
    }
}

type QAgent = QLearningAgent<usize, Move, CorridorActions>;

fn create_agent(seed: u64) -> QAgent {
    let config = QLearningConfig::default()
        .alpha(ALPHA)
        .epsilon(EPSILON)
        .discount(DISCOUNT_FACTOR)
        .seed(seed);
    QLearningAgent::build(config, CorridorActions { length: LENGTH })
}

/// Train a tabular Q-learning agent in a corridor and show its greedy walk
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Number of training episodes
    #[arg(long, default_value_t = 500)]
    episodes: usize,

    /// Random seed of exploration
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Directory where the trained Q-table is saved
    #[arg(long)]
    model_dir: Option<String>,
}

fn train(args: &Args) -> Result<QAgent> {
    let env_config = CorridorConfig { length: LENGTH };
    let mut trainer_config = TrainerConfig::default()
        .max_episodes(args.episodes)
        .max_steps_per_episode(MAX_STEPS_PER_EPISODE)
        .eval_interval(EVAL_INTERVAL)
        .flush_record_interval(EVAL_INTERVAL)
        .epsilon_decay(EPSILON_DECAY)
        .min_epsilon(MIN_EPSILON);
    if let Some(model_dir) = args.model_dir.as_ref() {
        trainer_config = trainer_config.model_dir(model_dir.as_str()).save_interval(args.episodes);
    }

    let env = Corridor::build(&env_config, args.seed as _)?;
    let mut agent = create_agent(args.seed);
    let mut recorder = LogRecorder::new();
    let mut evaluator = DefaultEvaluator::<Corridor>::new(&env_config, 0, N_EPISODES_PER_EVAL)?
        .max_steps(MAX_STEPS_PER_EPISODE);
    let mut trainer = Trainer::build(trainer_config);

    trainer.train(env, &mut agent, &mut recorder, &mut evaluator)?;
    Ok(agent)
}

fn eval(agent: &mut QAgent) -> Result<()> {
    Agent::<Corridor>::eval(agent);
    let mut env = Corridor::build(&CorridorConfig { length: LENGTH }, 0)?;
    let mut recorder = LogRecorder::new();
    let returns =
        util::eval_with_recorder(&mut env, agent, 1, MAX_STEPS_PER_EPISODE, &mut recorder)?;
    log::info!("Greedy return: {:.3}", returns[0]);

    for s in 0..LENGTH {
        log::info!(
            "state {}: value = {:.4}, policy = {:?}",
            s,
            agent.get_value(&s),
            agent.get_policy(&s)
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut agent = train(&args)?;
    eval(&mut agent)?;

    if let Some(model_dir) = args.model_dir.as_ref() {
        let mut agent_ = create_agent(args.seed);
        let path = Path::new(model_dir).join(args.episodes.to_string());
        Agent::<Corridor>::load_params(&mut agent_, &path)?;
        log::info!("Reloaded Q-table with {} entries", agent_.q_table().len());
    }

    Ok(())
}

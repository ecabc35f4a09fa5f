use anyhow::Result;
use qlearn_core::{record::Record, Env, LegalActions, Step};

pub const LEFT: i8 = -1;
pub const RIGHT: i8 = 1;

#[derive(Clone, Debug)]
pub struct CorridorConfig {
    pub length: usize,
}

/// Cells `0..length`, starting at `0`. Reaching the last cell ends the episode
/// with reward `1.0`; every other step gives `0.0`.
pub struct Corridor {
    length: usize,
    pos: usize,
}

impl Env for Corridor {
    type Config = CorridorConfig;
    type Obs = usize;
    type Act = i8;
    type Info = ();

    fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
        Ok(Self {
            length: config.length,
            pos: 0,
        })
    }

    fn step(&mut self, a: &i8) -> (Step<Self>, Record) {
        self.pos = match *a {
            LEFT => self.pos.saturating_sub(1),
            _ => (self.pos + 1).min(self.length - 1),
        };
        let is_terminated = self.pos == self.length - 1;
        let reward = if is_terminated { 1.0 } else { 0.0 };
        let step = Step::new(self.pos, *a, reward, is_terminated, false, ());
        (step, Record::empty())
    }

    fn reset(&mut self) -> Result<usize> {
        self.pos = 0;
        Ok(self.pos)
    }
}

/// Both directions in every cell but the goal, which has none.
#[derive(Clone)]
pub struct CorridorActions {
    pub length: usize,
}

impl LegalActions<usize, i8> for CorridorActions {
    fn legal_actions(&self, state: &usize) -> Vec<i8> {
        if *state + 1 >= self.length {
            vec![]
        } else {
            vec![LEFT, RIGHT]
        }
    }
}

//! Slippery frozen-lake grid world.
//!
//! The agent starts on `S` and must reach `G` while avoiding holes `H`;
//! `F` is walkable ice. On slippery ice the agent moves in the intended
//! direction or one of the two perpendicular directions, each with
//! probability 1/3. Reaching the goal yields reward 1, everything else 0,
//! and the episode ends on a hole or the goal.

use crate::{Env, GymError, Info, Observation, Space, Step};

pub const MAP_4X4: [&str; 4] = ["SFFF", "FHFH", "FFFH", "HFFG"];

pub const MAP_8X8: [&str; 8] = [
    "SFFFFFFF", "FFFFFFFF", "FFFHFFFF", "FFFFFHFF", "FFFHFFFF", "FHHFFFHF", "FHFFHFHF", "FFFHFFFG",
];

const LEFT: usize = 0;
const DOWN: usize = 1;
const RIGHT: usize = 2;
const UP: usize = 3;
const NUM_ACTIONS: usize = 4;

const ACTION_NAMES: [&str; NUM_ACTIONS] = ["Left", "Down", "Right", "Up"];

pub struct FrozenLake {
    desc: Vec<Vec<u8>>,
    nrow: usize,
    ncol: usize,
    start: usize,
    slippery: bool,
    state: Option<usize>,
    last_action: Option<usize>,
    rng: fastrand::Rng,
}

impl FrozenLake {
    /// The standard 4×4 slippery lake.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::builtin(&MAP_4X4, seed)
    }

    /// The standard 8×8 slippery lake.
    #[must_use]
    pub fn new_8x8(seed: u64) -> Self {
        Self::builtin(&MAP_8X8, seed)
    }

    /// Builds a lake from rows of `S`, `F`, `H` and `G` characters.
    ///
    /// # Errors
    ///
    /// Returns [`GymError::InvalidMap`] for an empty or ragged map, an unknown
    /// tile, or a start tile count other than one.
    pub fn from_map(rows: &[&str], slippery: bool, seed: u64) -> Result<Self, GymError> {
        let ncol = rows.first().map_or(0, |r| r.len());
        if ncol == 0 {
            return Err(GymError::InvalidMap("map is empty".into()));
        }
        if rows.iter().any(|r| r.len() != ncol) {
            return Err(GymError::InvalidMap("rows differ in length".into()));
        }
        let desc: Vec<Vec<u8>> = rows.iter().map(|r| r.bytes().collect()).collect();
        if let Some(bad) = desc.iter().flatten().find(|&&c| !b"SFHG".contains(&c)) {
            return Err(GymError::InvalidMap(format!("unknown tile {:?}", *bad as char)));
        }
        let starts: Vec<usize> = desc
            .iter()
            .flatten()
            .enumerate()
            .filter(|&(_, &c)| c == b'S')
            .map(|(i, _)| i)
            .collect();
        if starts.len() != 1 {
            return Err(GymError::InvalidMap(format!("expected one start tile, found {}", starts.len())));
        }
        Ok(Self::build(desc, starts[0], slippery, seed))
    }

    // Bundled maps are fixed at compile time and need no validation.
    fn builtin(rows: &[&str], seed: u64) -> Self {
        let desc: Vec<Vec<u8>> = rows.iter().map(|r| r.bytes().collect()).collect();
        let start = desc.iter().flatten().position(|&c| c == b'S').unwrap_or(0);
        Self::build(desc, start, true, seed)
    }

    fn build(desc: Vec<Vec<u8>>, start: usize, slippery: bool, seed: u64) -> Self {
        Self {
            nrow: desc.len(),
            ncol: desc.first().map_or(0, Vec::len),
            desc,
            start,
            slippery,
            state: None,
            last_action: None,
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Number of states, `nrow * ncol`.
    #[must_use]
    pub fn num_states(&self) -> usize {
        self.nrow * self.ncol
    }

    fn tile(&self, s: usize) -> u8 {
        self.desc[s / self.ncol][s % self.ncol]
    }

    fn is_terminal(&self, s: usize) -> bool {
        matches!(self.tile(s), b'H' | b'G')
    }

    fn move_from(&self, s: usize, action: usize) -> usize {
        let (mut row, mut col) = (s / self.ncol, s % self.ncol);
        match action {
            LEFT => col = col.saturating_sub(1),
            DOWN => row = (row + 1).min(self.nrow - 1),
            RIGHT => col = (col + 1).min(self.ncol - 1),
            UP => row = row.saturating_sub(1),
            _ => {}
        }
        row * self.ncol + col
    }
}

impl Env for FrozenLake {
    fn observation_space(&self) -> Space {
        Space::Discrete(self.num_states())
    }

    fn action_space(&self) -> Space {
        Space::Discrete(NUM_ACTIONS)
    }

    fn reset(&mut self) -> Observation {
        self.state = Some(self.start);
        self.last_action = None;
        Observation::Discrete(self.start)
    }

    fn step(&mut self, action: usize) -> Result<Step, GymError> {
        let s = self.state.ok_or(GymError::NotReset)?;
        if action >= NUM_ACTIONS {
            return Err(GymError::InvalidAction { action, n: NUM_ACTIONS });
        }
        let mut info = Info::new();
        // terminal tiles absorb
        if self.is_terminal(s) {
            info.insert("prob".into(), 1.0);
            return Ok(Step { observation: Observation::Discrete(s), reward: 0.0, done: true, info });
        }
        let (direction, prob) = if self.slippery {
            let candidates = [(action + NUM_ACTIONS - 1) % NUM_ACTIONS, action, (action + 1) % NUM_ACTIONS];
            (candidates[self.rng.usize(..candidates.len())], 1.0 / 3.0)
        } else {
            (action, 1.0)
        };
        let next = self.move_from(s, direction);
        self.state = Some(next);
        self.last_action = Some(action);
        info.insert("prob".into(), prob);
        let reward = if self.tile(next) == b'G' { 1.0 } else { 0.0 };
        Ok(Step {
            observation: Observation::Discrete(next),
            reward,
            done: self.is_terminal(next),
            info,
        })
    }

    fn render(&self) -> Result<String, GymError> {
        let s = self.state.ok_or(GymError::NotReset)?;
        let mut out = String::new();
        if let Some(a) = self.last_action {
            out.push_str(&format!("  ({})\n", ACTION_NAMES[a]));
        }
        for (r, row) in self.desc.iter().enumerate() {
            for (c, &tile) in row.iter().enumerate() {
                if r * self.ncol + c == s {
                    out.push('[');
                    out.push(tile as char);
                    out.push(']');
                } else {
                    out.push(' ');
                    out.push(tile as char);
                    out.push(' ');
                }
            }
            out.push('\n');
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_lake_reaches_goal() {
        let mut env = FrozenLake::from_map(&MAP_4X4, false, 0).unwrap();
        assert_eq!(env.reset(), Observation::Discrete(0));
        let path = [RIGHT, RIGHT, DOWN, DOWN, DOWN, RIGHT];
        let mut last = None;
        for a in path {
            last = Some(env.step(a).unwrap());
        }
        let last = last.unwrap();
        assert_eq!(last.observation, Observation::Discrete(15));
        assert_eq!(last.reward, 1.0);
        assert!(last.done);
    }

    #[test]
    fn falling_in_a_hole_ends_without_reward() {
        let mut env = FrozenLake::from_map(&MAP_4X4, false, 0).unwrap();
        env.reset();
        let step = env.step(DOWN).and_then(|_| env.step(RIGHT)).unwrap();
        assert_eq!(step.observation, Observation::Discrete(5));
        assert!(step.done);
        assert_eq!(step.reward, 0.0);
    }

    #[test]
    fn walls_clamp_movement() {
        let mut env = FrozenLake::from_map(&MAP_4X4, false, 0).unwrap();
        env.reset();
        assert_eq!(env.step(LEFT).unwrap().observation, Observation::Discrete(0));
        assert_eq!(env.step(UP).unwrap().observation, Observation::Discrete(0));
    }

    #[test]
    fn slippery_moves_are_never_backwards() {
        let mut env = FrozenLake::new(5);
        for _ in 0..200 {
            env.reset();
            // from the start, intending Right can slip Up (stay) or Down (4)
            let obs = env.step(RIGHT).unwrap().observation;
            assert!(matches!(obs, Observation::Discrete(0 | 1 | 4)), "{obs:?}");
        }
    }

    #[test]
    fn rejects_bad_input() {
        let mut env = FrozenLake::new(0);
        assert_eq!(env.step(0).unwrap_err(), GymError::NotReset);
        env.reset();
        assert_eq!(env.step(4).unwrap_err(), GymError::InvalidAction { action: 4, n: 4 });
        assert!(FrozenLake::from_map(&["SF", "F"], true, 0).is_err());
        assert!(FrozenLake::from_map(&["FF", "FG"], true, 0).is_err());
        assert!(FrozenLake::from_map(&["SX"], true, 0).is_err());
    }

    #[test]
    fn bundled_maps_are_well_formed() {
        for (rows, states) in [(&MAP_4X4[..], 16), (&MAP_8X8[..], 64)] {
            let checked = FrozenLake::from_map(rows, true, 3).unwrap();
            assert_eq!(checked.num_states(), states);
            assert_eq!(checked.start, 0);
        }
        let mut small = FrozenLake::new(3);
        let mut large = FrozenLake::new_8x8(3);
        assert_eq!((small.num_states(), large.num_states()), (16, 64));
        assert_eq!(small.reset(), Observation::Discrete(0));
        assert_eq!(large.reset(), Observation::Discrete(0));
        assert_eq!(large.observation_space(), Space::Discrete(64));
    }

    #[test]
    fn render_marks_the_agent() {
        let mut env = FrozenLake::new(0);
        env.reset();
        let frame = env.render().unwrap();
        assert!(frame.starts_with("[S]"));
        assert_eq!(frame.lines().count(), 4);
    }
}

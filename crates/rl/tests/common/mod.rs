#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use gym::{Env, GymError, Observation, Space, Step};
use rl::{IterationStats, Telemetry};

/// Walks forward one state per step regardless of the action and ends after
/// `episode_len` steps. The observation is the step index within the episode.
/// `renders` is shared so a test can count frames after handing the env over.
pub struct Countdown {
    pub states: usize,
    pub episode_len: usize,
    pub step_reward: f32,
    pub final_reward: f32,
    pub resets: usize,
    pub actions: Vec<usize>,
    pub renders: Rc<Cell<usize>>,
    t: Option<usize>,
}

impl Countdown {
    pub fn new(states: usize, episode_len: usize) -> Self {
        Self {
            states,
            episode_len,
            step_reward: 0.0,
            final_reward: 1.0,
            resets: 0,
            actions: Vec::new(),
            renders: Rc::default(),
            t: None,
        }
    }

    pub fn with_rewards(mut self, step_reward: f32, final_reward: f32) -> Self {
        self.step_reward = step_reward;
        self.final_reward = final_reward;
        self
    }
}

impl Env for Countdown {
    fn observation_space(&self) -> Space {
        Space::Discrete(self.states)
    }

    fn action_space(&self) -> Space {
        Space::Discrete(2)
    }

    fn reset(&mut self) -> Observation {
        self.resets += 1;
        self.t = Some(0);
        Observation::Discrete(0)
    }

    fn step(&mut self, action: usize) -> Result<Step, GymError> {
        if action >= 2 {
            return Err(GymError::InvalidAction { action, n: 2 });
        }
        let t = self.t.ok_or(GymError::NotReset)? + 1;
        self.t = Some(t);
        self.actions.push(action);
        let done = t >= self.episode_len;
        Ok(Step {
            observation: Observation::Discrete(t.min(self.states - 1)),
            reward: if done { self.final_reward } else { self.step_reward },
            done,
            info: HashMap::new(),
        })
    }

    fn render(&self) -> Result<String, GymError> {
        self.renders.set(self.renders.get() + 1);
        Ok(format!("t = {:?}", self.t))
    }
}

/// Two-dimensional vector observations `[t, -t]`, never terminates, no
/// render.
pub struct Drift {
    t: f32,
}

impl Drift {
    pub fn new() -> Self {
        Self { t: 0.0 }
    }
}

impl Env for Drift {
    fn observation_space(&self) -> Space {
        Space::Box { shape: vec![2] }
    }

    fn action_space(&self) -> Space {
        Space::Discrete(3)
    }

    fn reset(&mut self) -> Observation {
        self.t = 0.0;
        Observation::Vector(vec![0.0, 0.0])
    }

    fn step(&mut self, _action: usize) -> Result<Step, GymError> {
        self.t += 0.1;
        Ok(Step {
            observation: Observation::Vector(vec![self.t, -self.t]),
            reward: -1.0,
            done: false,
            info: HashMap::new(),
        })
    }
}

/// Declares whatever spaces it is told to and misbehaves on request.
pub struct Faulty {
    pub observation_space: Space,
    pub action_space: Space,
    pub fault: Fault,
}

#[derive(Clone, Copy, Debug)]
pub enum Fault {
    None,
    NanReward,
    WrongObservationKind,
    StateOutOfRange,
}

impl Faulty {
    pub fn new(observation_space: Space, action_space: Space, fault: Fault) -> Self {
        Self { observation_space, action_space, fault }
    }
}

impl Env for Faulty {
    fn observation_space(&self) -> Space {
        self.observation_space.clone()
    }

    fn action_space(&self) -> Space {
        self.action_space.clone()
    }

    fn reset(&mut self) -> Observation {
        match self.observation_space {
            Space::Discrete(_) => Observation::Discrete(0),
            Space::Box { ref shape } => Observation::Vector(vec![0.0; shape.iter().product()]),
        }
    }

    fn step(&mut self, _action: usize) -> Result<Step, GymError> {
        let mut observation = self.reset();
        let mut reward = 0.0;
        match self.fault {
            Fault::None => {}
            Fault::NanReward => reward = f32::NAN,
            Fault::WrongObservationKind => observation = Observation::Vector(vec![0.5]),
            Fault::StateOutOfRange => observation = Observation::Discrete(10_000),
        }
        Ok(Step { observation, reward, done: false, info: HashMap::new() })
    }
}

/// Shares every record it receives.
#[derive(Clone, Default)]
pub struct Recorder(pub Rc<RefCell<Vec<IterationStats>>>);

impl Telemetry for Recorder {
    fn record(&mut self, stats: &IterationStats) -> anyhow::Result<()> {
        self.0.borrow_mut().push(stats.clone());
        Ok(())
    }
}

/// Always fails.
pub struct Broken;

impl Telemetry for Broken {
    fn record(&mut self, _stats: &IterationStats) -> anyhow::Result<()> {
        anyhow::bail!("disk full")
    }
}

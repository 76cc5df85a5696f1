//! The classic mountain car: an under-powered car in a valley must rock back
//! and forth to reach the flag on the right hill.
//!
//! Observation is `[position, velocity]`; actions are 0 = push left,
//! 1 = no push, 2 = push right. Every step costs -1 and the episode ends
//! once the car reaches `position >= 0.5`.

use crate::{Env, GymError, Info, Observation, Space, Step};

const MIN_POSITION: f32 = -1.2;
const MAX_POSITION: f32 = 0.6;
const MAX_SPEED: f32 = 0.07;
const GOAL_POSITION: f32 = 0.5;
const FORCE: f32 = 0.001;
const GRAVITY: f32 = 0.0025;
const NUM_ACTIONS: usize = 3;
const TRACK_WIDTH: usize = 40;

pub struct MountainCar {
    state: Option<[f32; 2]>,
    rng: fastrand::Rng,
}

impl MountainCar {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self { state: None, rng: fastrand::Rng::with_seed(seed) }
    }

    /// Starts the next episode from an explicit state instead of a random one.
    pub fn reset_to(&mut self, position: f32, velocity: f32) -> Observation {
        self.state = Some([position, velocity]);
        Observation::Vector(vec![position, velocity])
    }
}

impl Env for MountainCar {
    fn observation_space(&self) -> Space {
        Space::Box { shape: vec![2] }
    }

    fn action_space(&self) -> Space {
        Space::Discrete(NUM_ACTIONS)
    }

    fn reset(&mut self) -> Observation {
        let position = -0.6 + 0.2 * self.rng.f32();
        self.reset_to(position, 0.0)
    }

    fn step(&mut self, action: usize) -> Result<Step, GymError> {
        let [mut position, mut velocity] = self.state.ok_or(GymError::NotReset)?;
        if action >= NUM_ACTIONS {
            return Err(GymError::InvalidAction { action, n: NUM_ACTIONS });
        }
        let push = action as f32 - 1.0;
        velocity += push * FORCE - (3.0 * position).cos() * GRAVITY;
        velocity = velocity.clamp(-MAX_SPEED, MAX_SPEED);
        position += velocity;
        position = position.clamp(MIN_POSITION, MAX_POSITION);
        if position <= MIN_POSITION && velocity < 0.0 {
            velocity = 0.0;
        }
        self.state = Some([position, velocity]);
        Ok(Step {
            observation: Observation::Vector(vec![position, velocity]),
            reward: -1.0,
            done: position >= GOAL_POSITION,
            info: Info::new(),
        })
    }

    fn render(&self) -> Result<String, GymError> {
        let [position, velocity] = self.state.ok_or(GymError::NotReset)?;
        let frac = (position - MIN_POSITION) / (MAX_POSITION - MIN_POSITION);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let car = ((frac * (TRACK_WIDTH - 1) as f32).round() as usize).min(TRACK_WIDTH - 1);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let flag = (((GOAL_POSITION - MIN_POSITION) / (MAX_POSITION - MIN_POSITION)) * (TRACK_WIDTH - 1) as f32)
            .round() as usize;
        let track: String = (0..TRACK_WIDTH)
            .map(|i| if i == car { 'C' } else if i == flag { 'F' } else { '_' })
            .collect();
        Ok(format!("{track}  x={position:.3} v={velocity:.4}"))
    }
}

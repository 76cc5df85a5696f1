use std::fmt;
use std::str::FromStr;

use crate::{Env, FrozenLake, GymError, MountainCar};

/// Names of the bundled environments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnvId {
    FrozenLake,
    FrozenLake8x8,
    MountainCar,
}

impl EnvId {
    pub const ALL: [EnvId; 3] = [EnvId::FrozenLake, EnvId::FrozenLake8x8, EnvId::MountainCar];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            EnvId::FrozenLake => "FrozenLake-v0",
            EnvId::FrozenLake8x8 => "FrozenLake8x8-v0",
            EnvId::MountainCar => "MountainCar-v0",
        }
    }
}

impl fmt::Display for EnvId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EnvId {
    type Err = GymError;

    /// Accepts the canonical name (`FrozenLake-v0`) case-insensitively, with or
    /// without the version suffix and with `-`/`_` separators ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm: String = s
            .to_ascii_lowercase()
            .trim_end_matches("-v0")
            .chars()
            .filter(|c| !matches!(c, '-' | '_'))
            .collect();
        match norm.as_str() {
            "frozenlake" => Ok(EnvId::FrozenLake),
            "frozenlake8x8" => Ok(EnvId::FrozenLake8x8),
            "mountaincar" => Ok(EnvId::MountainCar),
            _ => Err(GymError::UnknownEnv(s.to_string())),
        }
    }
}

/// Instantiates the environment registered under `id`.
#[must_use]
pub fn make(id: EnvId, seed: u64) -> Box<dyn Env> {
    match id {
        EnvId::FrozenLake => Box::new(FrozenLake::new(seed)),
        EnvId::FrozenLake8x8 => Box::new(FrozenLake::new_8x8(seed)),
        EnvId::MountainCar => Box::new(MountainCar::new(seed)),
    }
}

//! Simulation settings.
//!
//! Settings come from an optional YAML file and are then overridden field by
//! field by the command line. Missing keys fall back to the defaults below.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::fit::Strategy;

pub const DEFAULT_ARENA_SIZE: usize = 1024;
pub const DEFAULT_TRIAL_COUNT: usize = 10;
pub const DEFAULT_OPERATIONS_PER_TRIAL: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Arena size in units.
    #[serde(alias = "arena-size")]
    pub arena_size: usize,
    /// Number of independent trials, each on a fresh arena.
    #[serde(alias = "trial-count", alias = "trials")]
    pub trial_count: usize,
    /// Workload steps per trial.
    #[serde(alias = "operations-per-trial", alias = "operations")]
    pub operations_per_trial: usize,
    pub strategy: Strategy,
    /// Seed for reproducible runs. Unset means entropy-seeded trials.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            arena_size: DEFAULT_ARENA_SIZE,
            trial_count: DEFAULT_TRIAL_COUNT,
            operations_per_trial: DEFAULT_OPERATIONS_PER_TRIAL,
            strategy: Strategy::default(),
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.arena_size == 0 {
            return Err(ConfigError::Invalid("arena_size must be positive".into()));
        }
        if self.trial_count == 0 {
            return Err(ConfigError::Invalid("trial_count must be positive".into()));
        }
        Ok(())
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }
}

//! File configuration schema for the engine entry points.
//!
//! Plain serde data, YAML-loadable, every field defaulted so a partial
//! file parses. The CLI converts these sections into the runtime `Rules`
//! and search configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rules::{KoRule, Rules, RulesError, ScoringRule};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Rules(#[from] RulesError),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub search: SearchSettings,
}

/// Game rules section; mirrors [`Rules`].
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RulesConfig {
    pub board_size: usize,
    pub komi: f64,
    pub allow_suicide: bool,
    pub ko_rule: KoRule,
    pub scoring_rule: ScoringRule,
}

impl Default for RulesConfig {
    fn default() -> Self {
        let rules = Rules::default();
        Self {
            board_size: rules.board_size,
            komi: rules.komi,
            allow_suicide: rules.allow_suicide,
            ko_rule: rules.ko_rule,
            scoring_rule: rules.scoring_rule,
        }
    }
}

impl RulesConfig {
    pub fn to_rules(&self) -> Result<Rules, RulesError> {
        let rules = Rules {
            board_size: self.board_size,
            komi: self.komi,
            allow_suicide: self.allow_suicide,
            ko_rule: self.ko_rule,
            scoring_rule: self.scoring_rule,
        };
        rules.validate()?;
        Ok(rules)
    }
}

/// Search section; mirrors the agent's `SearchConfig` field for field.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchSettings {
    pub max_playouts: u32,
    pub enable_playout_cap_randomization: bool,
    pub random_playouts_min: u32,
    pub random_playouts_max: u32,
    pub cpuct: f32,
    pub fpu_reduction: f32,
    pub dirichlet_alpha: f32,
    pub dirichlet_epsilon: f32,
    pub temperature: f32,
    pub temperature_move_cutoff: u32,
    pub num_threads: usize,
    pub use_virtual_loss: bool,
    pub virtual_loss: f32,
    pub virtual_loss_visits: i64,
    pub seed: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_playouts: 256,
            enable_playout_cap_randomization: true,
            random_playouts_min: 192,
            random_playouts_max: 384,
            cpuct: 1.6,
            fpu_reduction: 0.2,
            dirichlet_alpha: 0.03,
            dirichlet_epsilon: 0.25,
            temperature: 1.0,
            temperature_move_cutoff: 30,
            num_threads: 1,
            use_virtual_loss: true,
            virtual_loss: 1.0,
            virtual_loss_visits: 1,
            seed: 0x5eed_1234,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&contents)?)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

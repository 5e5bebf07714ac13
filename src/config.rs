//! Flat configuration surface.
//!
//! Every knob a run recognizes lives in one [`Config`] loaded from JSON.
//! Unknown keys are ignored and missing keys fall back to the documented
//! defaults, so configs stay forward- and backward-compatible.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::agent::AgentOptions;
use crate::env::{EnvOptions, RewardWeights};
use crate::training::TrainingOptions;
use crate::Result;

/// Run configuration with documented defaults.
///
/// # Examples
///
/// ```
/// use q_routing::config::Config;
///
/// let config: Config = serde_json::from_str(r#"{"episodes": 200, "unknown_key": 1}"#).unwrap();
/// assert_eq!(config.episodes, 200);
/// assert_eq!(config.batch_size, 64); // default
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Training episodes.
    pub episodes: u64,
    /// Step cap per episode.
    pub max_steps: usize,
    /// Checkpoint cadence in episodes.
    pub save_interval: u64,
    /// Replay batch size.
    pub batch_size: usize,
    /// Replay memory capacity.
    pub memory_size: usize,
    /// Discount factor.
    pub gamma: f64,
    /// Initial exploration rate.
    pub epsilon_start: f64,
    /// Exploration floor.
    pub epsilon_end: f64,
    /// Multiplicative epsilon decay per replay update.
    pub epsilon_decay: f64,
    /// Target network sync cadence in episodes.
    pub target_update_interval: u64,
    /// Estimator learning rate.
    pub learning_rate: f64,
    /// Maximum vehicle load.
    pub max_vehicle_capacity: f64,
    /// Reward shaping weights.
    pub reward_weights: RewardWeights,
    /// Hidden layer sizes of the Q-network.
    pub hidden_layers: Vec<usize>,
    /// Reference travel speed, km/h.
    pub speed_kmh: f64,
    /// Episode horizon, hours.
    pub horizon: f64,
    /// Whether missed time windows terminate episodes.
    pub enforce_time_windows: bool,
    /// RNG seed; omit for a random run.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            episodes: 1000,
            max_steps: 100,
            save_interval: 100,
            batch_size: 64,
            memory_size: 10_000,
            gamma: 0.99,
            epsilon_start: 1.0,
            epsilon_end: 0.01,
            epsilon_decay: 0.995,
            target_update_interval: 10,
            learning_rate: 0.0005,
            max_vehicle_capacity: 6000.0,
            reward_weights: RewardWeights::default(),
            hidden_layers: vec![128, 128],
            speed_kmh: 50.0,
            horizon: 24.0,
            enforce_time_windows: true,
            seed: None,
        }
    }
}

impl Config {
    /// Loads a configuration from a JSON file.
    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Environment options implied by this configuration.
    pub fn env_options(&self) -> EnvOptions {
        EnvOptions::default()
            .with_max_capacity(self.max_vehicle_capacity)
            .with_speed_kmh(self.speed_kmh)
            .with_horizon(self.horizon)
            .with_time_windows(self.enforce_time_windows)
            .with_reward(self.reward_weights)
    }

    /// Agent options implied by this configuration.
    pub fn agent_options(&self) -> AgentOptions {
        AgentOptions {
            gamma: self.gamma,
            epsilon_start: self.epsilon_start,
            epsilon_end: self.epsilon_end,
            epsilon_decay: self.epsilon_decay,
            learning_rate: self.learning_rate,
            batch_size: self.batch_size,
            memory_size: self.memory_size,
            hidden_layers: self.hidden_layers.clone(),
        }
    }

    /// Training options implied by this configuration.
    pub fn training_options(&self) -> TrainingOptions {
        TrainingOptions::default()
            .with_episodes(self.episodes)
            .with_max_steps(self.max_steps)
            .with_save_interval(self.save_interval)
            .with_target_update_interval(self.target_update_interval)
    }
}

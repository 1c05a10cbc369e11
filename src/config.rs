use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Construction parameters of a colony run.
///
/// Every field has a default, so a TOML file only needs to name the values it
/// overrides:
///
/// ```toml
/// width = 30
/// height = 30
/// num_miners = 4
/// seed = 7
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ColonyConfig {
    pub width: u32,
    pub height: u32,
    pub num_scouts: usize,
    pub num_miners: usize,
    pub num_asteroids: usize,
    /// Chance per tick that a solar radiation event is spawned
    pub radiation_probability: f64,
    /// Multiplier applied to every generated deposit value
    pub resource_richness: f64,
    pub scout_sensor_range: u32,
    /// Chance per tick that a fresh deposit appears somewhere on the grid
    pub deposit_spawn_probability: f64,
    pub event_log_capacity: usize,
    /// Fixed RNG seed; `None` draws one from the OS
    pub seed: Option<u64>,
}

impl Default for ColonyConfig {
    fn default() -> Self {
        Self {
            width: 50,
            height: 50,
            num_scouts: 5,
            num_miners: 10,
            num_asteroids: 80,
            radiation_probability: 0.01,
            resource_richness: 1.0,
            scout_sensor_range: 3,
            deposit_spawn_probability: 0.0,
            event_log_capacity: 15,
            seed: None,
        }
    }
}

impl ColonyConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Rejects parameters that make progress impossible.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyGrid {
                width: self.width,
                height: self.height,
            });
        }
        for (name, value) in [
            ("radiation_probability", self.radiation_probability),
            ("deposit_spawn_probability", self.deposit_spawn_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidProbability { name, value });
            }
        }
        if !self.resource_richness.is_finite() || self.resource_richness < 0.0 {
            return Err(ConfigError::InvalidRichness(self.resource_richness));
        }
        if self.scout_sensor_range == 0 {
            return Err(ConfigError::ZeroSensorRange);
        }
        if self.event_log_capacity == 0 {
            return Err(ConfigError::ZeroEventCapacity);
        }
        Ok(())
    }
}

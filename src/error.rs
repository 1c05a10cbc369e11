//! Error types for colony construction.
//!
//! Nothing inside a tick can fail; the only caller-visible failures come from
//! building a world with parameters that make progress impossible or from
//! reading a configuration file.

use thiserror::Error;

/// Errors raised while loading or validating a [`crate::config::ColonyConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The grid has no cells to place the base on
    #[error("grid must have a positive area, got {width}x{height}")]
    EmptyGrid { width: u32, height: u32 },

    /// A per-tick probability outside [0, 1]
    #[error("{name} must be within [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f64 },

    /// Richness multiplier that would produce meaningless deposit values
    #[error("resource richness must be finite and non-negative, got {0}")]
    InvalidRichness(f64),

    /// Scouts that cannot see anything never place a claim
    #[error("scout sensor range must be at least 1")]
    ZeroSensorRange,

    /// The recent-events log needs room for at least one entry
    #[error("event log capacity must be at least 1")]
    ZeroEventCapacity,

    /// TOML parsing errors
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// File system errors
    #[error("config file error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

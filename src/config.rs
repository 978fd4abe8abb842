//! Engine options: neighbour bias, payout factor, cascade ceiling.

use crate::generator::{DEFAULT_NEIGHBOUR_BIAS, GeneratorError};
use thiserror::Error;

/// Credit per popped tile, as a fraction of the wager.
pub const DEFAULT_PER_TILE_FACTOR: f64 = 0.05;

/// Cascades allowed in one round before it is force-settled.
pub const DEFAULT_MAX_CASCADES: u32 = 1000;

/// Options that affect resolution and payout (bias, payout factor, safety ceiling).
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub neighbour_bias: f64,
    pub per_tile_factor: f64,
    /// `None` lets a round cascade without limit.
    pub max_cascades: Option<u32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            neighbour_bias: DEFAULT_NEIGHBOUR_BIAS,
            per_tile_factor: DEFAULT_PER_TILE_FACTOR,
            max_cascades: Some(DEFAULT_MAX_CASCADES),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("per-tile factor must be finite and non-negative, got {0}")]
    InvalidFactor(f64),
    #[error(transparent)]
    Generator(#[from] GeneratorError),
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.per_tile_factor.is_finite() || self.per_tile_factor < 0.0 {
            return Err(ConfigError::InvalidFactor(self.per_tile_factor));
        }
        if !(0.0..=1.0).contains(&self.neighbour_bias) {
            return Err(GeneratorError::InvalidBias(self.neighbour_bias).into());
        }
        Ok(())
    }
}

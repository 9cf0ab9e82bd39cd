// Poll configuration

use super::constants::*;
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};

/// Status polling configuration
///
/// Every field is optional when deserializing; missing fields take the
/// defaults from `constants.rs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Wait before the first status check
    pub initial_interval_ms: u64,
    /// Ceiling on the wait, before jitter
    pub max_interval_ms: u64,
    /// Multiplicative growth applied after every check
    pub growth_factor: f64,
    /// Exclusive upper bound of the additive jitter
    pub max_jitter_ms: u64,
    /// Polling budget, counted once the upload completes; the last check may
    /// start up to one interval later
    pub timeout_ms: u64,
    /// Consecutive failed checks tolerated before aborting
    pub max_status_errors: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_interval_ms: DEFAULT_INITIAL_INTERVAL_MS,
            max_interval_ms: DEFAULT_MAX_INTERVAL_MS,
            growth_factor: DEFAULT_GROWTH_FACTOR,
            max_jitter_ms: DEFAULT_MAX_JITTER_MS,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_status_errors: DEFAULT_MAX_STATUS_ERRORS,
        }
    }
}

impl PollConfig {
    /// Parse a (possibly partial) JSON config and validate it
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: PollConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.initial_interval_ms == 0 {
            return Err(AppError::Config(
                "initial_interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.max_interval_ms < self.initial_interval_ms {
            return Err(AppError::Config(format!(
                "max_interval_ms ({}) must be >= initial_interval_ms ({})",
                self.max_interval_ms, self.initial_interval_ms
            )));
        }
        if !self.growth_factor.is_finite() || self.growth_factor < 1.0 {
            return Err(AppError::Config(format!(
                "growth_factor must be a finite number >= 1.0, got {}",
                self.growth_factor
            )));
        }
        if self.timeout_ms == 0 {
            return Err(AppError::Config("timeout_ms must be greater than 0".to_string()));
        }
        Ok(())
    }
}

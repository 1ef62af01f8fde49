//! Access configuration.
//!
//! Trial lengths and PIN rules. Loaded from environment variables with
//! defaults matching the published pricing page.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Access layer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Length of a single-module trial in days.
    pub app_trial_days: u32,

    /// Length of the organization-wide trial in days.
    pub organization_trial_days: u32,

    /// Minimum number of PIN digits.
    pub pin_min_length: usize,

    /// Maximum number of PIN digits.
    pub pin_max_length: usize,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            app_trial_days: 14,
            organization_trial_days: 30,
            pin_min_length: 4,
            pin_max_length: 6,
        }
    }
}

impl AccessConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `BARKEEP_APP_TRIAL_DAYS`: Module trial length (default: 14)
    /// - `BARKEEP_ORG_TRIAL_DAYS`: Organization trial length (default: 30)
    /// - `BARKEEP_PIN_MIN_LENGTH`: Minimum PIN digits (default: 4)
    /// - `BARKEEP_PIN_MAX_LENGTH`: Maximum PIN digits (default: 6)
    ///
    /// Unparseable values fall back to the defaults; the result is then
    /// validated.
    pub fn from_env() -> Result<Self, ConfigError> {
        let default = Self::default();

        let config = Self {
            app_trial_days: env_or("BARKEEP_APP_TRIAL_DAYS", default.app_trial_days),
            organization_trial_days: env_or(
                "BARKEEP_ORG_TRIAL_DAYS",
                default.organization_trial_days,
            ),
            pin_min_length: env_or("BARKEEP_PIN_MIN_LENGTH", default.pin_min_length),
            pin_max_length: env_or("BARKEEP_PIN_MAX_LENGTH", default.pin_max_length),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app_trial_days == 0 {
            return Err(ConfigError::InvalidValue {
                key: "app_trial_days".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if self.organization_trial_days == 0 {
            return Err(ConfigError::InvalidValue {
                key: "organization_trial_days".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if self.pin_min_length == 0 || self.pin_min_length > self.pin_max_length {
            return Err(ConfigError::InvalidValue {
                key: "pin_min_length".to_string(),
                message: format!(
                    "must be between 1 and pin_max_length ({})",
                    self.pin_max_length
                ),
            });
        }

        Ok(())
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AccessConfig::default();
        assert_eq!(config.app_trial_days, 14);
        assert_eq!(config.organization_trial_days, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_trial() {
        let config = AccessConfig {
            app_trial_days: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_pin_bounds() {
        let config = AccessConfig {
            pin_min_length: 8,
            pin_max_length: 6,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("pin_min_length"));
    }

    #[test]
    fn test_env_or_falls_back() {
        assert_eq!(env_or("BARKEEP_TEST_UNSET_VARIABLE", 7u32), 7);
    }
}

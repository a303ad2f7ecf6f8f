use serde::{Deserialize, Serialize};

use super::errors::ConfigError;
use crate::instance::InstanceConfig;

/// Timing and capacity parameters of the ARP engine. All times are milliseconds.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Period of the sweep that drives retries and expirations.
    #[serde(default = "default_timer_interval_ms")]
    pub timer_interval_ms: u32,

    #[serde(default = "default_entry_timeout_ms")]
    pub default_entry_timeout_ms: u32,

    #[serde(default = "default_retry_count")]
    pub default_retry_count: u32,

    #[serde(default = "default_retry_interval_ms")]
    pub default_retry_interval_ms: u32,

    /// Upper bound on entries across the pending, denied and resolved tables.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    #[serde(default = "default_max_waiters_per_entry")]
    pub max_waiters_per_entry: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timer_interval_ms: default_timer_interval_ms(),
            default_entry_timeout_ms: default_entry_timeout_ms(),
            default_retry_count: default_retry_count(),
            default_retry_interval_ms: default_retry_interval_ms(),
            max_entries: default_max_entries(),
            max_waiters_per_entry: default_max_waiters_per_entry(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timer_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "timer_interval_ms cannot be 0".to_string(),
            ));
        }
        if self.max_entries == 0 || self.max_waiters_per_entry == 0 {
            return Err(ConfigError::Validation(
                "capacity limits cannot be 0".to_string(),
            ));
        }
        if self.default_retry_interval_ms >= self.default_entry_timeout_ms {
            return Err(ConfigError::Validation(format!(
                "retry interval ({} ms) must be shorter than the entry timeout ({} ms)",
                self.default_retry_interval_ms, self.default_entry_timeout_ms
            )));
        }
        Ok(())
    }

    /// Fills the zero timing fields of an instance configuration with the defaults.
    pub fn apply_defaults(&self, mut config: InstanceConfig) -> InstanceConfig {
        if config.entry_timeout_ms == 0 {
            config.entry_timeout_ms = self.default_entry_timeout_ms;
        }
        if config.retry_count == 0 {
            config.retry_count = self.default_retry_count;
        }
        if config.retry_interval_ms == 0 {
            config.retry_interval_ms = self.default_retry_interval_ms;
        }
        config
    }
}

fn default_timer_interval_ms() -> u32 {
    500
}

fn default_entry_timeout_ms() -> u32 {
    400_000
}

fn default_retry_count() -> u32 {
    2
}

fn default_retry_interval_ms() -> u32 {
    500
}

fn default_max_entries() -> usize {
    1024
}

fn default_max_waiters_per_entry() -> usize {
    64
}

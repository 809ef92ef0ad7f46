//! # Playback Configuration
//!
//! Tunables of the playback controller.

use core_runtime::config::{CoreConfig, DEFAULT_REFRESH_INTERVAL, MAX_REFRESH_INTERVAL, MIN_REFRESH_INTERVAL};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Playback controller configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Period of the position refresh task while a unit is loaded.
    ///
    /// Default: 100ms.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            refresh_interval: default_refresh_interval(),
        }
    }
}

impl PlaybackConfig {
    pub fn from_core(config: &CoreConfig) -> Self {
        Self {
            refresh_interval: config.refresh_interval,
        }
    }

    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if !(MIN_REFRESH_INTERVAL..=MAX_REFRESH_INTERVAL).contains(&self.refresh_interval) {
            return Err(format!(
                "refresh_interval must be between {:?} and {:?}",
                MIN_REFRESH_INTERVAL, MAX_REFRESH_INTERVAL
            ));
        }
        Ok(())
    }
}

fn default_refresh_interval() -> Duration {
    DEFAULT_REFRESH_INTERVAL
}

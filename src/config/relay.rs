//! Relay configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::application::{DEFAULT_RECLAIM_INTERVAL, DEFAULT_REPORT_INTERVAL};

/// Relay behavior: upgrade path, maintenance cadence, greeting.
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// Route that accepts WebSocket upgrades
    #[serde(default = "default_path")]
    pub path: String,

    /// Milliseconds between sweeps of closed connections
    #[serde(default = "default_reclaim_interval_ms")]
    pub reclaim_interval_ms: u64,

    /// Milliseconds between connection-count reports
    #[serde(default = "default_report_interval_ms")]
    pub report_interval_ms: u64,

    /// Text of the `welcome` message sent to each new connection
    #[serde(default = "default_welcome_message")]
    pub welcome_message: String,
}

impl RelayConfig {
    pub fn reclaim_interval(&self) -> Duration {
        Duration::from_millis(self.reclaim_interval_ms)
    }

    pub fn report_interval(&self) -> Duration {
        Duration::from_millis(self.report_interval_ms)
    }

    /// Validate relay configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.path.starts_with('/') {
            return Err(ValidationError::InvalidRelayPath(self.path.clone()));
        }
        if self.reclaim_interval_ms == 0 {
            return Err(ValidationError::ZeroInterval("reclaim_interval_ms"));
        }
        if self.report_interval_ms == 0 {
            return Err(ValidationError::ZeroInterval("report_interval_ms"));
        }
        if self.welcome_message.trim().is_empty() {
            return Err(ValidationError::EmptyWelcomeMessage);
        }
        Ok(())
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            reclaim_interval_ms: default_reclaim_interval_ms(),
            report_interval_ms: default_report_interval_ms(),
            welcome_message: default_welcome_message(),
        }
    }
}

fn default_path() -> String {
    "/sensor".to_string()
}

fn default_reclaim_interval_ms() -> u64 {
    DEFAULT_RECLAIM_INTERVAL.as_millis() as u64
}

fn default_report_interval_ms() -> u64 {
    DEFAULT_REPORT_INTERVAL.as_millis() as u64
}

fn default_welcome_message() -> String {
    crate::application::DEFAULT_WELCOME_MESSAGE.to_string()
}

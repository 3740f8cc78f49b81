//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Upper bound for `notification_timeout_ms` (one hour).
const MAX_TIMEOUT_MS: u64 = 60 * 60 * 1000;

/// Tunables for a [`SessionEngine`](crate::engine::SessionEngine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Key the session snapshot is stored under.
    pub storage_key: String,

    /// Lifetime of informational notifications, in milliseconds.
    pub notification_timeout_ms: u64,

    /// Reject phase changes outside the regular day/night cycle.
    pub strict_transitions: bool,

    /// Smallest selection a session can start with.
    pub min_characters: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            storage_key: "werewolf.session".to_string(),
            notification_timeout_ms: 4000,
            strict_transitions: false,
            min_characters: 3,
        }
    }
}

impl EngineConfig {
    /// Parse a TOML document. Missing keys fall back to the defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::Invalid("storage_key is empty".to_string()));
        }
        if self.notification_timeout_ms > MAX_TIMEOUT_MS {
            return Err(ConfigError::Invalid(format!(
                "notification_timeout_ms must not exceed {}",
                MAX_TIMEOUT_MS
            )));
        }
        if self.min_characters < 3 {
            return Err(ConfigError::Invalid(format!(
                "min_characters must be at least 3, got {}",
                self.min_characters
            )));
        }
        Ok(())
    }

    pub fn notification_timeout(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.notification_timeout_ms.min(MAX_TIMEOUT_MS) as i64)
    }
}

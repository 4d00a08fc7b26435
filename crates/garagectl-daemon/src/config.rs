//! Daemon configuration.
//!
//! Loaded from a TOML file; every tunable has a conservative default so a
//! minimal file only names the host, user, key, and the two door commands.

use std::path::Path;
use std::time::Duration;

use garagectl_core::reconciler::ReconcilerConfig;
use serde::Deserialize;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/garagectl/config.toml";

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Path that was attempted.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for this schema.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// Path that was attempted.
        path: String,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },
}

/// Top-level daemon configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Remote login settings for the controller host.
    pub ssh: SshConfig,
    /// Door polling and command settings.
    pub door: DoorConfig,
}

/// Remote login settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SshConfig {
    /// Controller hostname or address.
    pub host: String,
    /// Remote login user.
    pub user: String,
    /// Path to the private key used for authentication.
    pub identity: String,
    /// Upper bound for a single remote command, in seconds.
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,
}

impl SshConfig {
    /// The bounded timeout applied to every remote invocation.
    #[must_use]
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

/// Door accessory settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DoorConfig {
    /// Accessory display name.
    #[serde(default = "default_name")]
    pub name: String,
    /// Remote command whose output reports `open` or `closed`.
    pub status_command: String,
    /// Remote command template; `{direction}` is replaced with `open` or
    /// `close`.
    pub control_command: String,
    /// Seconds a position/target mismatch is tolerated before it is
    /// attributed to an external trigger.
    #[serde(default = "default_tolerance")]
    pub tolerance_secs: u64,
    /// Seconds between periodic evaluations.
    #[serde(default = "default_update_frequency")]
    pub update_frequency_secs: u64,
}

impl DoorConfig {
    /// Reconciler configuration derived from this file.
    #[must_use]
    pub fn reconciler(&self) -> ReconcilerConfig {
        ReconcilerConfig {
            tolerance: Duration::from_secs(self.tolerance_secs),
            update_frequency: Duration::from_secs(self.update_frequency_secs),
        }
    }
}

fn default_command_timeout() -> u64 {
    5
}

fn default_name() -> String {
    "Garage Door".to_string()
}

fn default_tolerance() -> u64 {
    10
}

fn default_update_frequency() -> u64 {
    10
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.display().to_string(), source })?;
        toml::from_str(&raw)
            .map_err(|source| ConfigError::Parse { path: path.display().to_string(), source })
    }
}

//! Client configuration.

use crossplay_core::{LocalState, Participant};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Configuration for a session client.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Participant ID stamped on cells this client edits.
    #[serde(default = "default_participant_id")]
    participant_id: String,

    /// Name shown to other participants.
    #[serde(default = "default_display_name")]
    display_name: String,

    /// Start with autocheck on.
    #[serde(default)]
    autocheck: bool,

    /// Start in pencil mode.
    #[serde(default)]
    pencil_mode: bool,

    /// Tracing filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    log_filter: String,
}

#[instrument]
fn default_participant_id() -> String {
    "player-1".to_string()
}

#[instrument]
fn default_display_name() -> String {
    "Player 1".to_string()
}

#[instrument]
fn default_log_filter() -> String {
    "info,crossplay=debug".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(default_participant_id(), default_display_name())
    }
}

impl ClientConfig {
    /// Creates a configuration with default modes.
    #[instrument(skip(participant_id, display_name), fields(participant_id = %participant_id))]
    pub fn new(participant_id: String, display_name: String) -> Self {
        Self {
            participant_id,
            display_name,
            autocheck: false,
            pencil_mode: false,
            log_filter: default_log_filter(),
        }
    }

    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        if config.participant_id.trim().is_empty() {
            return Err(ConfigError::new("participant_id must not be empty".to_string()));
        }

        info!(participant_id = %config.participant_id, "Config loaded successfully");
        Ok(config)
    }

    /// The local participant.
    pub fn participant(&self) -> Participant {
        Participant::new(self.participant_id.clone(), self.display_name.clone())
    }

    /// Initial local modes.
    pub fn local_state(&self) -> LocalState {
        LocalState {
            autocheck: self.autocheck,
            pencil_mode: self.pencil_mode,
            ..LocalState::default()
        }
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

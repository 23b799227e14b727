//! Engine configuration file support.
//!
//! This module provides utilities for reading engine configuration from TOML
//! configuration files: the placement policy, the visible grid window, and
//! the backend connection settings.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::backend::error::BackendError;
use crate::models::grid::{
    GridWindow, CLOSE_HOUR, INTERACTIVE_GRANULARITY_MIN, OPEN_HOUR, SUMMARY_GRANULARITY_MIN,
};

/// Engine configuration from file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub placement: PlacementPolicy,
    #[serde(default)]
    pub grid: GridSettings,
    #[serde(default)]
    pub backend: BackendSettings,
}

/// Placement policy knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementPolicy {
    /// Session length assumed when a subject is placed without an explicit
    /// end time. The institutional mapping from units to session length is
    /// unconfirmed, so this stays a policy knob rather than a constant.
    #[serde(default = "default_session_minutes")]
    pub default_session_minutes: u32,
}

/// Visible grid window settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSettings {
    #[serde(default = "default_open_hour")]
    pub open_hour: u32,
    #[serde(default = "default_close_hour")]
    pub close_hour: u32,
    #[serde(default = "default_interactive_granularity")]
    pub interactive_granularity_minutes: u32,
    #[serde(default = "default_summary_granularity")]
    pub summary_granularity_minutes: u32,
}

/// Backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Which `ScheduleService` implementation to construct ("local" or "rest").
    #[serde(rename = "type", default = "default_backend_type")]
    pub backend_type: String,
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub bearer_token: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_session_minutes() -> u32 {
    90
}

fn default_open_hour() -> u32 {
    OPEN_HOUR
}

fn default_close_hour() -> u32 {
    CLOSE_HOUR
}

fn default_interactive_granularity() -> u32 {
    INTERACTIVE_GRANULARITY_MIN
}

fn default_summary_granularity() -> u32 {
    SUMMARY_GRANULARITY_MIN
}

fn default_backend_type() -> String {
    "local".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for PlacementPolicy {
    fn default() -> Self {
        Self {
            default_session_minutes: default_session_minutes(),
        }
    }
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            open_hour: default_open_hour(),
            close_hour: default_close_hour(),
            interactive_granularity_minutes: default_interactive_granularity(),
            summary_granularity_minutes: default_summary_granularity(),
        }
    }
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            backend_type: default_backend_type(),
            base_url: String::new(),
            bearer_token: String::new(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl EngineConfig {
    /// Load engine configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, BackendError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            BackendError::configuration(format!("Failed to read config file: {}", e))
        })?;

        let config: EngineConfig = toml::from_str(&content).map_err(|e| {
            BackendError::configuration(format!("Failed to parse config file: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load engine configuration from the default location.
    ///
    /// Searches for `engine.toml` in the current directory, then the parent
    /// directory.
    pub fn from_default_location() -> Result<Self, BackendError> {
        let search_paths = vec![
            PathBuf::from("engine.toml"),
            PathBuf::from("../engine.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(BackendError::configuration(
            "No engine.toml found in standard locations",
        ))
    }

    fn validate(&self) -> Result<(), BackendError> {
        self.grid
            .interactive_window()
            .map_err(BackendError::configuration)?;
        self.grid
            .summary_window()
            .map_err(BackendError::configuration)?;
        if self.placement.default_session_minutes == 0 {
            return Err(BackendError::configuration(
                "placement.default_session_minutes must be positive",
            ));
        }
        Ok(())
    }
}

impl GridSettings {
    /// The configured interactive placement window.
    pub fn interactive_window(&self) -> Result<GridWindow, String> {
        GridWindow::new(
            self.open_hour,
            self.close_hour,
            self.interactive_granularity_minutes,
        )
    }

    /// The configured read-only summary window.
    pub fn summary_window(&self) -> Result<GridWindow, String> {
        GridWindow::new(
            self.open_hour,
            self.close_hour,
            self.summary_granularity_minutes,
        )
    }
}

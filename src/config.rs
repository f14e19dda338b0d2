// SPDX-License-Identifier: GPL-3.0-only

//! User configuration handling
//!
//! Persists metering defaults (last used device, sample interval, capture
//! geometry) as JSON under the user config directory. Loading never fails:
//! a missing or unparsable file falls back to defaults with a warning so the
//! tool stays usable even when the config gets corrupted.

use crate::constants::{self, config_file};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Last used capture device path
    pub last_device_path: Option<String>,
    /// Throttle window between processed frames, in milliseconds
    pub sample_interval_ms: u64,
    /// Requested capture frame width
    pub frame_width: u32,
    /// Requested capture frame height
    pub frame_height: u32,
    /// Requested capture rate in frames per second
    pub fps: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            last_device_path: None,
            sample_interval_ms: constants::DEFAULT_SAMPLE_INTERVAL.as_millis() as u64,
            frame_width: constants::capture::DEFAULT_WIDTH,
            frame_height: constants::capture::DEFAULT_HEIGHT,
            fps: constants::capture::DEFAULT_FPS,
        }
    }
}

impl Config {
    /// Load configuration from the default location, falling back to
    /// defaults when the file is missing or unreadable.
    pub fn load() -> Self {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => {
                warn!("Could not determine config directory, using defaults");
                Self::default()
            }
        }
    }

    /// Load configuration from a specific path, falling back to defaults.
    pub fn load_from(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(_) => {
                debug!(path = %path.display(), "No config file, using defaults");
                return Self::default();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to parse config, using defaults");
                Self::default()
            }
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> AppResult<()> {
        let path = config_path()
            .ok_or_else(|| AppError::Config("Could not determine config directory".to_string()))?;
        self.save_to(&path)
    }

    /// Save configuration to a specific path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;

        debug!(path = %path.display(), "Config saved");
        Ok(())
    }
}

/// Path of the config file under the user config directory
fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(config_file::APP_DIR).join(config_file::FILE_NAME))
}

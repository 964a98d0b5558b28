//! Configuration management for scancam.
//!
//! Provides loading, saving, and validation of the pre-open session
//! configuration: camera settings, zoom behavior, and gesture tuning.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::errors::CameraError;
use crate::gesture::PINCH_EMIT_INTERVAL_MS;
use crate::types::{CameraSettings, CameraZoomConfig};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScancamConfig {
    pub settings: CameraSettings,
    pub zoom: CameraZoomConfig,
    pub gesture: GestureConfig,
}

/// Pinch-gesture tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GestureConfig {
    /// Minimum gap between emitted zoom intents, in input-clock units
    pub emit_interval_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            emit_interval_ms: PINCH_EMIT_INTERVAL_MS,
        }
    }
}

impl ScancamConfig {
    /// Load configuration from a TOML file. A missing file is not an
    /// error: defaults are returned.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, CameraError> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            CameraError::ConfigurationError(format!("Failed to read config file: {}", e))
        })?;

        let config: ScancamConfig = toml::from_str(&contents).map_err(|e| {
            CameraError::ConfigurationError(format!("Failed to parse config file: {}", e))
        })?;

        config.validate()?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration as TOML, creating parent directories as needed.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CameraError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                CameraError::ConfigurationError(format!("Failed to create config dir: {}", e))
            })?;
        }

        let contents = toml::to_string_pretty(self).map_err(|e| {
            CameraError::ConfigurationError(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, contents).map_err(|e| {
            CameraError::ConfigurationError(format!("Failed to write config file: {}", e))
        })?;

        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    pub fn validate(&self) -> Result<(), CameraError> {
        if self.gesture.emit_interval_ms == 0 {
            return Err(CameraError::ConfigurationError(
                "gesture emit interval must be positive".to_string(),
            ));
        }
        if self.zoom.max_zoom < 0 {
            return Err(CameraError::ConfigurationError(
                "max zoom cannot be negative".to_string(),
            ));
        }
        if self.zoom.zoom_step < 0 {
            return Err(CameraError::ConfigurationError(
                "zoom step cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}

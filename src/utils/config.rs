//! Configuration management for DockPlayer
//!
//! This module handles loading and managing application configuration
//! from config files and environment variables.

use crate::player::PlayerConfig;
use crate::utils::error::{DockError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General application settings
    pub general: GeneralConfig,

    /// Player timing and gesture settings
    pub player: PlayerConfig,

    /// Catalog source
    pub catalog: CatalogConfig,
}

/// General application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Catalog configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Path to a catalog TOML file
    pub path: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default sources
    ///
    /// Configuration is loaded in the following order (later sources override earlier):
    /// 1. Default values
    /// 2. System config file (/etc/dockplayer/config.toml on Linux)
    /// 3. User config file (~/.config/dockplayer/config.toml on Linux)
    /// 4. Environment variables (DOCKPLAYER_* prefix)
    pub fn load() -> Result<Self> {
        Self::load_with(None)
    }

    /// Load configuration, with an explicit file applied after the user file
    pub fn load_with(explicit: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(system_path) = Self::system_config_path() {
            if system_path.exists() {
                config.merge_from_file(&system_path)?;
            }
        }

        if let Some(user_path) = Self::user_config_path() {
            if user_path.exists() {
                config.merge_from_file(&user_path)?;
            }
        }

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(DockError::NotFound(format!("config file {}", path.display())));
            }
            config.merge_from_file(path)?;
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Save configuration to user config file
    pub fn save(&self) -> Result<()> {
        let path = Self::user_config_path()
            .ok_or_else(|| DockError::Config("Cannot determine user config path".to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| DockError::Config(format!("Failed to create config directory: {}", e)))?;
        }

        let toml = toml::to_string_pretty(self)
            .map_err(|e| DockError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(&path, toml)
            .map_err(|e| DockError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Replace configuration with the contents of a TOML file
    ///
    /// Sections and keys missing from the file fall back to defaults.
    fn merge_from_file(&mut self, path: &Path) -> Result<()> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| DockError::Config(format!("Failed to read config file: {}", e)))?;

        *self = Self::from_toml(&contents)?;

        Ok(())
    }

    /// Parse configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| DockError::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(log_level) = std::env::var("DOCKPLAYER_LOG_LEVEL") {
            self.general.log_level = log_level;
        }

        if let Ok(volume) = std::env::var("DOCKPLAYER_VOLUME") {
            self.player.default_volume = volume
                .parse()
                .map_err(|_| DockError::Config("Invalid DOCKPLAYER_VOLUME".to_string()))?;
        }

        if let Ok(countdown) = std::env::var("DOCKPLAYER_COUNTDOWN") {
            self.player.countdown_seconds = countdown
                .parse()
                .map_err(|_| DockError::Config("Invalid DOCKPLAYER_COUNTDOWN".to_string()))?;
        }

        if let Ok(catalog) = std::env::var("DOCKPLAYER_CATALOG") {
            self.catalog.path = Some(PathBuf::from(catalog));
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.general.log_level.as_str()) {
            return Err(DockError::Config(format!(
                "Invalid log level '{}', must be one of: {:?}",
                self.general.log_level, valid_log_levels
            )));
        }

        let player = &self.player;
        if !(0.0..=1.0).contains(&player.default_volume) {
            return Err(DockError::Config("Default volume must be between 0.0 and 1.0".to_string()));
        }

        if player.countdown_seconds == 0 {
            return Err(DockError::Config("Countdown must be at least one second".to_string()));
        }

        if player.flash_duration_ms == 0 || player.controls_idle_ms == 0 {
            return Err(DockError::Config("Timer durations must be non-zero".to_string()));
        }

        if player.drag_distance_threshold <= 0.0 || player.drag_velocity_threshold <= 0.0 {
            return Err(DockError::Config("Drag thresholds must be positive".to_string()));
        }

        if player.skip_step <= 0.0 {
            return Err(DockError::Config("Skip step must be positive".to_string()));
        }

        Ok(())
    }

    /// Get system config file path
    fn system_config_path() -> Option<PathBuf> {
        #[cfg(target_os = "linux")]
        return Some(PathBuf::from("/etc/dockplayer/config.toml"));

        #[cfg(target_os = "windows")]
        return std::env::var("PROGRAMDATA")
            .ok()
            .map(|p| PathBuf::from(p).join("DockPlayer").join("config.toml"));

        #[cfg(target_os = "macos")]
        return Some(PathBuf::from("/Library/Application Support/DockPlayer/config.toml"));

        #[allow(unreachable_code)]
        None
    }

    /// Get user config file path
    pub fn user_config_path() -> Option<PathBuf> {
        #[cfg(target_os = "linux")]
        return dirs::config_dir().map(|p| p.join("dockplayer").join("config.toml"));

        #[cfg(not(target_os = "linux"))]
        return dirs::config_dir().map(|p| p.join("DockPlayer").join("config.toml"));
    }
}

//! Utility module for DockPlayer
//!
//! This module provides common utilities used throughout the crate:
//! - Error handling with a custom error type
//! - Configuration management
//! - Time formatting for the presentation layer

pub mod config;
pub mod error;

// Re-export commonly used items
pub use config::{CatalogConfig, Config, GeneralConfig};
pub use error::{DockError, IntoDockError, Result};

/// Load the application configuration
///
/// Loads configuration from:
/// 1. Default values
/// 2. System configuration file
/// 3. User configuration file
/// 4. Environment variables
pub fn load_config() -> Result<Config> {
    Config::load()
}

/// Format a playback time for display
///
/// Produces `m:ss`, with minutes growing past 59 rather than rolling
/// into hours. Unknown (non-finite or non-positive) values render as `0:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0:00".to_string();
    }

    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

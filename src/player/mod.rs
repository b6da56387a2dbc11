//! Player presentation core for DockPlayer
//!
//! This module owns the single active media session: which view mode it
//! is shown in, how playback controls act on it, how it continues to the
//! next item when one ends, and how a drag on the full view docks it.

mod autoplay;
mod clock;
mod controller;
mod controls;
mod driver;
mod gesture;
mod reducer;
mod session;
mod timer;

pub use autoplay::{AutoplayQueue, Countdown, CountdownStep, COUNTDOWN_TICK};
pub use clock::PlaybackClock;
pub use controller::{PlayerController, PlayerControllerBuilder};
pub use controls::{ControlsIntent, ControlsVisibilityTimer};
pub use driver::{PlayerCommand, PlayerDriver, PlayerHandle, TokioScheduler};
pub use gesture::{GestureOutcome, GestureTransitionHandler};
pub use reducer::{reduce, Effect, Input, PlayerState};
pub use session::{FlashKind, PlaybackFailure, PlayerSession, PlayerSnapshot, TransientFlash};
pub use timer::{ManualScheduler, TimerKind, TimerRegistry, TimerRequest, TimerScheduler, TimerToken};

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How the player is displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayerMode {
    /// No player
    Hidden,

    /// Primary immersive view
    Full,

    /// Small docked view
    Mini,
}

/// Player configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Seconds counted down before autoplay advances
    pub countdown_seconds: u32,

    /// Transient flash lifetime in milliseconds
    pub flash_duration_ms: u64,

    /// Controls idle timeout in milliseconds
    pub controls_idle_ms: u64,

    /// Drag distance (pixels) that minimizes on release
    pub drag_distance_threshold: f64,

    /// Release velocity (pixels/second) that minimizes
    pub drag_velocity_threshold: f64,

    /// Elastic factor for downward drags
    pub drag_elasticity_down: f64,

    /// Elastic factor for upward drags
    pub drag_elasticity_up: f64,

    /// Skip step in seconds
    pub skip_step: f64,

    /// Maximum number of related videos listed
    pub related_limit: usize,

    /// Initial volume (0.0 to 1.0)
    pub default_volume: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            countdown_seconds: 3,
            flash_duration_ms: 500,
            controls_idle_ms: 2500,
            drag_distance_threshold: 60.0,
            drag_velocity_threshold: 400.0,
            drag_elasticity_down: 0.5,
            drag_elasticity_up: 0.05,
            skip_step: 10.0,
            related_limit: 15,
            default_volume: 1.0,
        }
    }
}

impl PlayerConfig {
    pub fn flash_duration(&self) -> Duration {
        Duration::from_millis(self.flash_duration_ms)
    }

    pub fn controls_idle(&self) -> Duration {
        Duration::from_millis(self.controls_idle_ms)
    }
}

/// Receives a snapshot after every transition that changed it
pub trait SnapshotHandler: Send {
    fn on_snapshot(&mut self, snapshot: &PlayerSnapshot);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_config_default() {
        let config = PlayerConfig::default();
        assert_eq!(config.countdown_seconds, 3);
        assert_eq!(config.flash_duration(), Duration::from_millis(500));
        assert_eq!(config.controls_idle(), Duration::from_millis(2500));
        assert_eq!(config.drag_distance_threshold, 60.0);
        assert_eq!(config.drag_velocity_threshold, 400.0);
        assert_eq!(config.related_limit, 15);
    }

    #[test]
    fn test_player_mode() {
        assert_ne!(PlayerMode::Full, PlayerMode::Mini);
        assert_eq!(serde_json::to_string(&PlayerMode::Mini).unwrap(), "\"MINI\"");
    }
}

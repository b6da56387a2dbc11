//! Controls visibility timer
//!
//! Pointer movement over the full view reveals the controls and restarts
//! an idle timeout; the controls hide when it expires. Controls are
//! suppressed in other modes and while an autoplay countdown is showing.

use crate::player::PlayerMode;
use std::time::Duration;

/// What a pointer event asks the player to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlsIntent {
    /// Show controls and (re)start the idle timer
    Reveal { idle: Duration },

    /// Hide controls and cancel the idle timer
    Hide,

    /// Nothing to do
    Ignore,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControlsVisibilityTimer {
    idle: Duration,
}

impl ControlsVisibilityTimer {
    pub fn new(idle: Duration) -> Self {
        Self { idle }
    }

    pub fn idle(&self) -> Duration {
        self.idle
    }

    fn active(mode: PlayerMode, countdown_active: bool) -> bool {
        mode == PlayerMode::Full && !countdown_active
    }

    pub fn on_pointer_move(&self, mode: PlayerMode, countdown_active: bool) -> ControlsIntent {
        if Self::active(mode, countdown_active) {
            ControlsIntent::Reveal { idle: self.idle }
        } else {
            ControlsIntent::Ignore
        }
    }

    pub fn on_pointer_leave(&self, mode: PlayerMode) -> ControlsIntent {
        if mode == PlayerMode::Full {
            ControlsIntent::Hide
        } else {
            ControlsIntent::Ignore
        }
    }

    /// Visibility when the player settles into `mode`
    pub fn initial_visibility(&self, mode: PlayerMode, countdown_active: bool) -> bool {
        Self::active(mode, countdown_active)
    }
}

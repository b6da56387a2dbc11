//! Drag-to-minimize gesture handling
//!
//! Interprets a vertical drag on the full view. Input arrives as two
//! callbacks, an update carrying the accumulated offset and a release
//! carrying the final offset and velocity, so any pointer or touch
//! backend can feed it.

use crate::player::PlayerMode;

/// Outcome of releasing a drag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    /// Dragged far or fast enough: dock the player
    Minimize,

    /// Return the surface to its resting position
    SnapBack,

    /// No gesture applies in the current mode
    Ignored,
}

/// Handler for the full-view drag gesture
#[derive(Debug, Clone, PartialEq)]
pub struct GestureTransitionHandler {
    /// Downward offset (pixels) beyond which release minimizes
    distance_threshold: f64,

    /// Downward velocity (pixels/second) beyond which release minimizes
    velocity_threshold: f64,

    /// Resistance applied to downward drags when rendering
    elasticity_down: f64,

    /// Resistance applied to upward drags when rendering
    elasticity_up: f64,
}

impl GestureTransitionHandler {
    pub fn new(
        distance_threshold: f64,
        velocity_threshold: f64,
        elasticity_down: f64,
        elasticity_up: f64,
    ) -> Self {
        Self {
            distance_threshold,
            velocity_threshold,
            elasticity_down,
            elasticity_up,
        }
    }

    /// Offset to store for a drag update, or None if the update is ignored
    pub fn update(&self, mode: PlayerMode, offset: f64) -> Option<f64> {
        if mode != PlayerMode::Full || !offset.is_finite() {
            return None;
        }
        Some(offset)
    }

    /// Decide what a release does
    pub fn release(&self, mode: PlayerMode, offset: f64, velocity: f64) -> GestureOutcome {
        if mode != PlayerMode::Full {
            return GestureOutcome::Ignored;
        }

        if offset > self.distance_threshold || velocity > self.velocity_threshold {
            GestureOutcome::Minimize
        } else {
            GestureOutcome::SnapBack
        }
    }

    /// Offset as rendered, after elastic resistance
    pub fn elastic_offset(&self, offset: f64) -> f64 {
        if offset >= 0.0 {
            offset * self.elasticity_down
        } else {
            offset * self.elasticity_up
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler() -> GestureTransitionHandler {
        GestureTransitionHandler::new(60.0, 400.0, 0.5, 0.05)
    }

    #[test]
    fn test_far_drag_minimizes() {
        assert_eq!(handler().release(PlayerMode::Full, 70.0, 0.0), GestureOutcome::Minimize);
    }

    #[test]
    fn test_fast_flick_minimizes() {
        assert_eq!(handler().release(PlayerMode::Full, 10.0, 650.0), GestureOutcome::Minimize);
    }

    #[test]
    fn test_short_slow_drag_snaps_back() {
        assert_eq!(handler().release(PlayerMode::Full, 40.0, 100.0), GestureOutcome::SnapBack);
        assert_eq!(handler().release(PlayerMode::Full, 60.0, 400.0), GestureOutcome::SnapBack);
    }

    #[test]
    fn test_upward_drag_snaps_back() {
        assert_eq!(handler().release(PlayerMode::Full, -200.0, -900.0), GestureOutcome::SnapBack);
    }

    #[test]
    fn test_other_modes_ignored() {
        let handler = handler();
        assert_eq!(handler.release(PlayerMode::Mini, 500.0, 0.0), GestureOutcome::Ignored);
        assert_eq!(handler.release(PlayerMode::Hidden, 500.0, 0.0), GestureOutcome::Ignored);
        assert_eq!(handler.update(PlayerMode::Mini, 20.0), None);
        assert_eq!(handler.update(PlayerMode::Full, f64::NAN), None);
        assert_eq!(handler.update(PlayerMode::Full, 20.0), Some(20.0));
    }

    #[test]
    fn test_elastic_offset() {
        let handler = handler();
        assert_eq!(handler.elastic_offset(100.0), 50.0);
        assert_eq!(handler.elastic_offset(-100.0), -5.0);
    }
}

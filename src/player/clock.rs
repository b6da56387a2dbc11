//! Playback clock
//!
//! Tracks position, duration, play state and audio levels for the active
//! item. Seek and skip targets are clamped here so no caller ever sees an
//! out-of-range position.

use serde::Serialize;

/// Position, duration and audio state of the active item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackClock {
    /// Current position in seconds
    pub position: f64,

    /// Duration in seconds, 0 when unknown
    pub duration: f64,

    pub playing: bool,

    pub muted: bool,

    /// Volume level (0.0 to 1.0)
    pub volume: f32,

    /// A scrub drag is in progress; reported progress is ignored
    pub seeking: bool,
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl PlaybackClock {
    /// Create an idle clock with the given volume
    pub fn new(volume: f32) -> Self {
        Self {
            position: 0.0,
            duration: 0.0,
            playing: false,
            muted: false,
            volume: sanitize_volume(volume).unwrap_or(1.0),
            seeking: false,
        }
    }

    /// Reset for a newly selected item and start playing
    ///
    /// Volume and mute carry over between items.
    pub fn restart(&mut self, nominal_duration: f64) {
        self.position = 0.0;
        self.duration = sanitize_duration(nominal_duration);
        self.playing = true;
        self.seeking = false;
    }

    /// Reset to the idle state
    pub fn stop(&mut self) {
        self.position = 0.0;
        self.duration = 0.0;
        self.playing = false;
        self.seeking = false;
    }

    /// Whether the duration is known
    pub fn has_duration(&self) -> bool {
        self.duration > 0.0
    }

    /// Clamp an absolute seek request to `[0, duration]`
    ///
    /// Without a known duration only the lower bound applies.
    pub fn clamp_seek(&self, target: f64) -> f64 {
        if target.is_nan() || (target == f64::INFINITY && !self.has_duration()) {
            return self.position;
        }

        let upper = if self.has_duration() { self.duration } else { f64::INFINITY };
        target.clamp(0.0, upper)
    }

    /// Target of a relative skip
    pub fn skip_target(&self, delta: f64) -> f64 {
        if !delta.is_finite() {
            return self.position;
        }
        self.clamp_seek(self.position + delta)
    }

    /// Apply a progress report from the media surface
    ///
    /// Returns false when the report was ignored because the user is scrubbing.
    pub fn report_progress(&mut self, played: f64) -> bool {
        if self.seeking || !played.is_finite() {
            return false;
        }
        let upper = if self.has_duration() { self.duration } else { f64::INFINITY };
        self.position = played.clamp(0.0, upper);
        true
    }

    /// Apply a reported duration; zero or invalid reports keep the current value
    ///
    /// A shorter duration pulls the position back inside it.
    pub fn report_duration(&mut self, seconds: f64) {
        let seconds = sanitize_duration(seconds);
        if seconds > 0.0 {
            self.duration = seconds;
            self.position = self.position.min(seconds);
        }
    }

    /// Fraction of the item played, 0 when the duration is unknown
    pub fn progress_fraction(&self) -> f64 {
        if self.has_duration() {
            (self.position / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Clamp a requested volume, rejecting NaN
pub fn sanitize_volume(volume: f32) -> Option<f32> {
    if volume.is_nan() {
        None
    } else {
        Some(volume.clamp(0.0, 1.0))
    }
}

fn sanitize_duration(seconds: f64) -> f64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock_at(position: f64, duration: f64) -> PlaybackClock {
        let mut clock = PlaybackClock::default();
        clock.restart(duration);
        clock.position = position;
        clock
    }

    #[test]
    fn test_skip_back_clamps_at_zero() {
        let clock = clock_at(5.0, 120.0);
        assert_eq!(clock.skip_target(-10.0), 0.0);
    }

    #[test]
    fn test_skip_forward_clamps_at_duration() {
        let clock = clock_at(117.0, 120.0);
        assert_eq!(clock.skip_target(10.0), 120.0);
    }

    #[test]
    fn test_skip_without_duration_has_no_upper_bound() {
        let clock = clock_at(50.0, 0.0);
        assert_eq!(clock.skip_target(10.0), 60.0);
        assert_eq!(clock.clamp_seek(1_000.0), 1_000.0);
    }

    #[test]
    fn test_seeking_blocks_progress() {
        let mut clock = clock_at(10.0, 120.0);
        clock.seeking = true;
        assert!(!clock.report_progress(11.0));
        assert_eq!(clock.position, 10.0);

        clock.seeking = false;
        assert!(clock.report_progress(11.0));
        assert_eq!(clock.position, 11.0);
    }

    #[test]
    fn test_progress_clamps_to_known_duration() {
        let mut clock = clock_at(100.0, 120.0);
        assert!(clock.report_progress(125.0));
        assert_eq!(clock.position, 120.0);
        assert_eq!(clock.progress_fraction(), 1.0);

        clock.report_duration(90.0);
        assert_eq!(clock.position, 90.0);

        let mut unknown = clock_at(0.0, 0.0);
        unknown.report_progress(500.0);
        assert_eq!(unknown.position, 500.0);
    }

    #[test]
    fn test_zero_duration_report_keeps_nominal() {
        let mut clock = clock_at(0.0, 120.0);
        clock.report_duration(0.0);
        assert_eq!(clock.duration, 120.0);

        clock.report_duration(118.5);
        assert_eq!(clock.duration, 118.5);
    }

    #[test]
    fn test_restart_keeps_audio_levels() {
        let mut clock = clock_at(30.0, 120.0);
        clock.volume = 0.3;
        clock.muted = true;
        clock.seeking = true;

        clock.restart(60.0);
        assert_eq!(clock.position, 0.0);
        assert_eq!(clock.duration, 60.0);
        assert!(clock.playing);
        assert!(!clock.seeking);
        assert_eq!(clock.volume, 0.3);
        assert!(clock.muted);
    }

    #[test]
    fn test_volume_sanitizing() {
        assert_eq!(sanitize_volume(1.7), Some(1.0));
        assert_eq!(sanitize_volume(-0.2), Some(0.0));
        assert_eq!(sanitize_volume(f32::NAN), None);
    }

    #[test]
    fn test_progress_fraction() {
        assert_eq!(clock_at(30.0, 120.0).progress_fraction(), 0.25);
        assert_eq!(clock_at(30.0, 0.0).progress_fraction(), 0.0);
    }
}

//! Player session state
//!
//! [`PlayerSession`] is the single mutable record of what the player shows.
//! Only the reducer writes to it; the presentation layer receives
//! [`PlayerSnapshot`]s.

use crate::catalog::VideoItem;
use crate::player::autoplay::Countdown;
use crate::player::clock::PlaybackClock;
use crate::player::PlayerMode;
use serde::Serialize;
use std::time::Duration;

/// Short-lived acknowledgment of a control action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlashKind {
    SkipBack,
    SkipForward,
    Play,
    Pause,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransientFlash {
    pub kind: FlashKind,

    /// Player time at which the flash disappears
    pub expires_at: Duration,
}

/// Terminal media failure for the current item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackFailure {
    pub message: String,

    /// Position at the time of failure, used when retrying
    pub position: f64,
}

/// Internal player session
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSession {
    pub current_video: Option<VideoItem>,

    pub mode: PlayerMode,

    pub clock: PlaybackClock,

    pub countdown: Option<Countdown>,

    pub flash: Option<TransientFlash>,

    /// Vertical drag offset in pixels, positive downward
    pub drag_offset: f64,

    pub controls_visible: bool,

    pub failure: Option<PlaybackFailure>,

    /// Incremented on every video switch and close
    pub generation: u64,
}

impl PlayerSession {
    /// Create a hidden session
    pub fn new(volume: f32) -> Self {
        Self {
            current_video: None,
            mode: PlayerMode::Hidden,
            clock: PlaybackClock::new(volume),
            countdown: None,
            flash: None,
            drag_offset: 0.0,
            controls_visible: false,
            failure: None,
            generation: 0,
        }
    }

    /// Whether `video` is the item currently loaded
    pub fn is_current(&self, video: &VideoItem) -> bool {
        self.current_video.as_ref().is_some_and(|current| current.same_as(video))
    }

    /// Check the structural invariants, describing the first violation
    pub fn check_invariants(&self) -> std::result::Result<(), String> {
        match (self.mode, &self.current_video) {
            (PlayerMode::Hidden, Some(video)) => {
                return Err(format!("hidden player still holds '{}'", video.slug));
            }
            (PlayerMode::Full | PlayerMode::Mini, None) => {
                return Err(format!("{:?} player has no video", self.mode));
            }
            _ => {}
        }

        if self.countdown.is_some() && self.clock.playing {
            return Err("countdown pending while playing".to_string());
        }

        if self.clock.position < 0.0 || self.clock.duration < 0.0 {
            return Err(format!(
                "negative time: position {} duration {}",
                self.clock.position, self.clock.duration
            ));
        }

        if !(0.0..=1.0).contains(&self.clock.volume) {
            return Err(format!("volume {} out of range", self.clock.volume));
        }

        if self.mode != PlayerMode::Full && self.drag_offset != 0.0 {
            return Err(format!("drag offset {} outside full view", self.drag_offset));
        }

        Ok(())
    }
}

/// Immutable, render-ready view of the session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSnapshot {
    pub video: Option<VideoItem>,
    pub mode: PlayerMode,
    pub position: f64,
    pub duration: f64,
    pub progress_fraction: f64,
    pub playing: bool,
    pub muted: bool,
    pub volume: f32,
    pub seeking: bool,
    pub countdown: Option<u32>,
    pub up_next: Option<VideoItem>,
    pub flash: Option<FlashKind>,

    /// Player time at which the current flash disappears
    pub flash_expires_at: Option<Duration>,

    pub drag_offset: f64,
    pub elastic_offset: f64,
    pub controls_visible: bool,
    pub failure: Option<PlaybackFailure>,
    pub generation: u64,
}

impl PlayerSnapshot {
    /// Capture a session; `elastic_offset` is the drag offset as rendered
    pub fn capture(session: &PlayerSession, elastic_offset: f64) -> Self {
        Self {
            video: session.current_video.clone(),
            mode: session.mode,
            position: session.clock.position,
            duration: session.clock.duration,
            progress_fraction: session.clock.progress_fraction(),
            playing: session.clock.playing,
            muted: session.clock.muted,
            volume: session.clock.volume,
            seeking: session.clock.seeking,
            countdown: session.countdown.as_ref().map(|c| c.remaining),
            up_next: session.countdown.as_ref().map(|c| c.next.clone()),
            flash: session.flash.map(|f| f.kind),
            flash_expires_at: session.flash.map(|f| f.expires_at),
            drag_offset: session.drag_offset,
            elastic_offset,
            controls_visible: session.controls_visible,
            failure: session.failure.clone(),
            generation: session.generation,
        }
    }

    /// Slug of the current video
    pub fn slug(&self) -> Option<&str> {
        self.video.as_ref().map(|v| v.slug.as_str())
    }
}

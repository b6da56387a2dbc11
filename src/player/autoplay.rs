//! Autoplay continuation
//!
//! When an item ends and a candidate exists, a countdown starts and the
//! candidate plays once it reaches zero. The queue only decides; the
//! reducer applies its decisions to the session.

use crate::catalog::VideoItem;
use serde::Serialize;
use std::time::Duration;

/// Interval between countdown ticks
pub const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

/// A pending autoplay transition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Countdown {
    /// Seconds left before advancing
    pub remaining: u32,

    /// Item that plays when the countdown completes
    pub next: VideoItem,
}

/// Result of one countdown tick
#[derive(Debug, Clone, PartialEq)]
pub enum CountdownStep {
    /// Keep counting with the given remaining seconds
    Continue(u32),

    /// Countdown finished; switch to the item
    Advance(VideoItem),
}

/// Decides when and where playback continues after an item ends
#[derive(Debug, Clone, PartialEq)]
pub struct AutoplayQueue {
    countdown_seconds: u32,
}

impl AutoplayQueue {
    pub fn new(countdown_seconds: u32) -> Self {
        Self {
            countdown_seconds: countdown_seconds.max(1),
        }
    }

    /// Countdown to start for an ended item, if a candidate exists
    pub fn on_ended(&self, candidate: Option<VideoItem>) -> Option<Countdown> {
        candidate.map(|next| Countdown {
            remaining: self.countdown_seconds,
            next,
        })
    }

    /// Advance a running countdown by one second
    pub fn tick(&self, countdown: &Countdown) -> CountdownStep {
        match countdown.remaining.saturating_sub(1) {
            0 => CountdownStep::Advance(countdown.next.clone()),
            remaining => CountdownStep::Continue(remaining),
        }
    }
}

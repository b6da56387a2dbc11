//! Media surface contract for DockPlayer
//!
//! The player core never decodes media. It drives a [`MediaSurface`]
//! with [`MediaCommand`]s and consumes the [`MediaEvent`]s the surface
//! reports back.

mod simulated;

pub use simulated::SimulatedSurface;

use crate::catalog::{MediaType, VideoItem};
use crate::utils::error::Result;
use serde::Serialize;

/// Media surface trait defining the interface to a concrete media element
pub trait MediaSurface: Send {
    /// Load a media source
    ///
    /// # Arguments
    ///
    /// * `url` - Media URL
    /// * `media_type` - Delivery kind of the source
    /// * `hints` - Playback hints for the concrete backend
    fn load(&mut self, url: &str, media_type: MediaType, hints: &PlaybackHints) -> Result<()>;

    /// Start or resume playback
    fn play(&mut self) -> Result<()>;

    /// Pause playback
    fn pause(&mut self) -> Result<()>;

    /// Seek to an absolute position in seconds
    fn seek_to(&mut self, seconds: f64) -> Result<()>;

    /// Set volume (0.0 to 1.0)
    fn set_volume(&mut self, volume: f32) -> Result<()>;

    /// Mute or unmute audio
    fn set_muted(&mut self, muted: bool) -> Result<()>;
}

/// Hints forwarded to the surface alongside a load request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PlaybackHints {
    /// Embedded platform player parameters
    Embedded {
        autoplay: bool,
        /// Show related videos from other channels at the end
        related: bool,
        modest_branding: bool,
        plays_inline: bool,
    },

    /// Direct file playback
    File {
        /// Force the segmented-stream (HLS) pipeline
        force_hls: bool,
    },
}

impl PlaybackHints {
    /// Hints for a catalog item
    pub fn for_video(video: &VideoItem) -> Self {
        match video.media_type {
            MediaType::Youtube => PlaybackHints::Embedded {
                autoplay: true,
                related: false,
                modest_branding: true,
                plays_inline: true,
            },
            MediaType::File => PlaybackHints::File {
                force_hls: video.media_url.ends_with(".m3u8"),
            },
        }
    }
}

/// Command issued by the player to the media surface
#[derive(Debug, Clone, PartialEq)]
pub enum MediaCommand {
    Load {
        url: String,
        media_type: MediaType,
        hints: PlaybackHints,
    },
    Play,
    Pause,
    SeekTo(f64),
    SetVolume(f32),
    SetMuted(bool),
}

impl MediaCommand {
    /// Load command for a catalog item
    pub fn load(video: &VideoItem) -> Self {
        MediaCommand::Load {
            url: video.media_url.clone(),
            media_type: video.media_type,
            hints: PlaybackHints::for_video(video),
        }
    }

    /// Execute this command against a surface
    pub fn apply(&self, surface: &mut dyn MediaSurface) -> Result<()> {
        match self {
            MediaCommand::Load { url, media_type, hints } => surface.load(url, *media_type, hints),
            MediaCommand::Play => surface.play(),
            MediaCommand::Pause => surface.pause(),
            MediaCommand::SeekTo(seconds) => surface.seek_to(*seconds),
            MediaCommand::SetVolume(volume) => surface.set_volume(*volume),
            MediaCommand::SetMuted(muted) => surface.set_muted(*muted),
        }
    }
}

/// Callback reported by the media surface
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// Playback advanced to the given position in seconds
    Progress(f64),

    /// The real duration became known
    DurationKnown(f64),

    /// The surface started playing
    Play,

    /// The surface paused
    Pause,

    /// End of media reached
    Ended,

    /// Load or playback failed
    Error(String),
}

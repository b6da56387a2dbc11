//! Simulated media surface
//!
//! Plays sources without decoding anything: position advances when
//! [`SimulatedSurface::advance`] is called and the surface reports the
//! same callbacks a real element would. Used by the headless binary and
//! by tests, which also inspect the recorded command log.

use crate::catalog::MediaType;
use crate::media::{MediaCommand, MediaEvent, MediaSurface, PlaybackHints};
use crate::utils::error::{DockError, Result};
use log::debug;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Default)]
struct SimulatedState {
    /// Known durations by URL
    durations: HashMap<String, f64>,

    /// URLs that fail to load, with the reported message
    failures: HashMap<String, String>,

    loaded: Option<String>,
    duration_reported: bool,
    position: f64,
    playing: bool,
    volume: f32,
    muted: bool,

    /// Every command received, in order
    commands: Vec<MediaCommand>,
}

/// Shared handle to a simulated media element
#[derive(Debug, Clone, Default)]
pub struct SimulatedSurface {
    state: Arc<Mutex<SimulatedState>>,
}

impl SimulatedSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the real duration of a source
    pub fn register(&self, url: &str, duration: f64) {
        self.state.lock().durations.insert(url.to_string(), duration);
    }

    /// Make loads of `url` fail with `message`
    pub fn fail_url(&self, url: &str, message: &str) {
        self.state.lock().failures.insert(url.to_string(), message.to_string());
    }

    /// Advance simulated time by `dt` seconds and collect the resulting callbacks
    pub fn advance(&self, dt: f64) -> Vec<MediaEvent> {
        let mut state = self.state.lock();
        let mut events = Vec::new();

        let Some(url) = state.loaded.clone() else {
            return events;
        };
        let duration = state.durations.get(&url).copied();

        if !state.duration_reported {
            if let Some(duration) = duration {
                state.duration_reported = true;
                events.push(MediaEvent::DurationKnown(duration));
            }
        }

        if state.playing && dt > 0.0 {
            state.position += dt;
            if let Some(duration) = duration {
                if state.position >= duration {
                    state.position = duration;
                    state.playing = false;
                    events.push(MediaEvent::Progress(duration));
                    events.push(MediaEvent::Ended);
                    return events;
                }
            }
            events.push(MediaEvent::Progress(state.position));
        }

        events
    }

    /// Copy of the command log
    pub fn commands(&self) -> Vec<MediaCommand> {
        self.state.lock().commands.clone()
    }

    /// Drain the command log
    pub fn take_commands(&self) -> Vec<MediaCommand> {
        std::mem::take(&mut self.state.lock().commands)
    }

    /// Currently loaded URL
    pub fn loaded(&self) -> Option<String> {
        self.state.lock().loaded.clone()
    }

    pub fn position(&self) -> f64 {
        self.state.lock().position
    }

    pub fn is_playing(&self) -> bool {
        self.state.lock().playing
    }

    pub fn volume(&self) -> f32 {
        self.state.lock().volume
    }

    pub fn is_muted(&self) -> bool {
        self.state.lock().muted
    }
}

impl MediaSurface for SimulatedSurface {
    fn load(&mut self, url: &str, media_type: MediaType, hints: &PlaybackHints) -> Result<()> {
        let mut state = self.state.lock();
        state.commands.push(MediaCommand::Load {
            url: url.to_string(),
            media_type,
            hints: hints.clone(),
        });

        if let Some(message) = state.failures.get(url).cloned() {
            state.loaded = None;
            state.playing = false;
            return Err(DockError::media_error(message));
        }

        debug!("Simulated surface loading {} ({:?})", url, media_type);
        state.loaded = Some(url.to_string());
        state.duration_reported = false;
        state.position = 0.0;
        state.playing = false;
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        let mut state = self.state.lock();
        state.commands.push(MediaCommand::Play);

        // Playing an ended source restarts it from the beginning
        let duration = state
            .loaded
            .as_ref()
            .and_then(|url| state.durations.get(url).copied());
        if duration.is_some_and(|duration| state.position >= duration) {
            state.position = 0.0;
        }

        state.playing = state.loaded.is_some();
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        let mut state = self.state.lock();
        state.commands.push(MediaCommand::Pause);
        state.playing = false;
        Ok(())
    }

    fn seek_to(&mut self, seconds: f64) -> Result<()> {
        let mut state = self.state.lock();
        state.commands.push(MediaCommand::SeekTo(seconds));
        let upper = state
            .loaded
            .as_ref()
            .and_then(|url| state.durations.get(url).copied())
            .unwrap_or(f64::INFINITY);
        state.position = seconds.clamp(0.0, upper);
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) -> Result<()> {
        let mut state = self.state.lock();
        state.commands.push(MediaCommand::SetVolume(volume));
        state.volume = volume;
        Ok(())
    }

    fn set_muted(&mut self, muted: bool) -> Result<()> {
        let mut state = self.state.lock();
        state.commands.push(MediaCommand::SetMuted(muted));
        state.muted = muted;
        Ok(())
    }
}

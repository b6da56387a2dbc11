//! Player controller implementation for DockPlayer
//!
//! [`PlayerController`] is the single writer of the player session. It
//! feeds inputs through the reducer, executes the resulting media and
//! timer effects, and notifies snapshot handlers after each transition.

use crate::catalog::{self, RelatedSource, VideoItem};
use crate::media::{MediaEvent, MediaSurface};
use crate::player::reducer::{Effect, Input, PlayerState};
use crate::player::session::PlayerSnapshot;
use crate::player::timer::{ManualScheduler, TimerRequest, TimerScheduler, TimerToken};
use crate::player::{PlayerConfig, SnapshotHandler};
use crate::utils::error::{DockError, Result};
use log::{debug, error};
use std::collections::VecDeque;
use std::sync::Arc;

/// Builder for a [`PlayerController`]
pub struct PlayerControllerBuilder {
    config: PlayerConfig,
    surface: Option<Box<dyn MediaSurface>>,
    related: Option<Arc<dyn RelatedSource>>,
    scheduler: Option<Box<dyn TimerScheduler>>,
    handlers: Vec<Box<dyn SnapshotHandler>>,
}

impl Default for PlayerControllerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerControllerBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self {
            config: PlayerConfig::default(),
            surface: None,
            related: None,
            scheduler: None,
            handlers: Vec::new(),
        }
    }

    /// Set player configuration
    pub fn with_config(mut self, config: PlayerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the media surface the player drives
    pub fn with_surface(mut self, surface: impl MediaSurface + 'static) -> Self {
        self.surface = Some(Box::new(surface));
        self
    }

    /// Set the related-list collaborator
    pub fn with_related(mut self, related: Arc<dyn RelatedSource>) -> Self {
        self.related = Some(related);
        self
    }

    /// Set the timer scheduler; defaults to a [`ManualScheduler`]
    pub fn with_scheduler(mut self, scheduler: impl TimerScheduler + 'static) -> Self {
        self.scheduler = Some(Box::new(scheduler));
        self
    }

    /// Add a snapshot handler
    pub fn with_snapshot_handler(mut self, handler: Box<dyn SnapshotHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Whether a scheduler has been set
    pub(crate) fn has_scheduler(&self) -> bool {
        self.scheduler.is_some()
    }

    /// Build the controller
    pub fn build(self) -> Result<PlayerController> {
        let surface = self
            .surface
            .ok_or_else(|| DockError::InvalidInput("a media surface is required".to_string()))?;
        let related = self
            .related
            .ok_or_else(|| DockError::InvalidInput("a related source is required".to_string()))?;
        let scheduler = self
            .scheduler
            .unwrap_or_else(|| Box::new(ManualScheduler::new()));

        let state = PlayerState::new(&self.config);
        let last_snapshot = state.snapshot();

        Ok(PlayerController {
            state,
            config: self.config,
            surface,
            related,
            scheduler,
            handlers: self.handlers,
            last_snapshot,
        })
    }
}

/// Main player controller
pub struct PlayerController {
    state: PlayerState,
    config: PlayerConfig,
    surface: Box<dyn MediaSurface>,
    related: Arc<dyn RelatedSource>,
    scheduler: Box<dyn TimerScheduler>,
    handlers: Vec<Box<dyn SnapshotHandler>>,
    last_snapshot: PlayerSnapshot,
}

impl std::fmt::Debug for PlayerController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerController")
            .field("state", &self.state)
            .field("handlers", &self.handlers.len())
            .finish_non_exhaustive()
    }
}

impl PlayerController {
    /// Start building a controller
    pub fn builder() -> PlayerControllerBuilder {
        PlayerControllerBuilder::new()
    }

    pub fn open(&mut self, video: VideoItem) {
        self.dispatch(Input::Open(video));
    }

    pub fn minimize(&mut self) {
        self.dispatch(Input::Minimize);
    }

    pub fn expand(&mut self) {
        self.dispatch(Input::Expand);
    }

    pub fn close(&mut self) {
        self.dispatch(Input::Close);
    }

    pub fn select_related(&mut self, video: VideoItem) {
        self.dispatch(Input::SelectRelated(video));
    }

    pub fn toggle_play_pause(&mut self) {
        self.dispatch(Input::TogglePlayPause);
    }

    /// Seek relative to the current position by `delta` seconds
    pub fn skip(&mut self, delta: f64) {
        self.dispatch(Input::Skip(delta));
    }

    /// Skip forward by the configured step
    pub fn skip_forward(&mut self) {
        self.skip(self.config.skip_step);
    }

    /// Skip back by the configured step
    pub fn skip_back(&mut self) {
        self.skip(-self.config.skip_step);
    }

    pub fn seek_to(&mut self, seconds: f64) {
        self.dispatch(Input::SeekTo(seconds));
    }

    pub fn begin_scrub(&mut self) {
        self.dispatch(Input::BeginScrub);
    }

    pub fn end_scrub(&mut self) {
        self.dispatch(Input::EndScrub);
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.dispatch(Input::SetVolume(volume));
    }

    pub fn toggle_mute(&mut self) {
        self.dispatch(Input::ToggleMute);
    }

    pub fn cancel_countdown(&mut self) {
        self.dispatch(Input::CancelCountdown);
    }

    pub fn play_next_now(&mut self) {
        self.dispatch(Input::PlayNextNow);
    }

    pub fn retry(&mut self) {
        self.dispatch(Input::Retry);
    }

    pub fn on_drag_update(&mut self, offset: f64) {
        self.dispatch(Input::DragUpdate(offset));
    }

    pub fn on_drag_release(&mut self, offset: f64, velocity: f64) {
        self.dispatch(Input::DragRelease { offset, velocity });
    }

    pub fn on_pointer_move(&mut self) {
        self.dispatch(Input::PointerMoved);
    }

    pub fn on_pointer_leave(&mut self) {
        self.dispatch(Input::PointerLeft);
    }

    /// Handle a media surface callback
    pub fn on_media_event(&mut self, event: MediaEvent) {
        let input = match event {
            MediaEvent::Ended => Input::Ended {
                next: self.next_candidate(),
            },
            other => Input::Media(other),
        };
        self.dispatch(input);
    }

    /// Handle a fired timer
    pub fn on_timer(&mut self, token: TimerToken) {
        self.dispatch(Input::TimerFired(token));
    }

    /// Current render-ready snapshot
    pub fn snapshot(&self) -> PlayerSnapshot {
        self.last_snapshot.clone()
    }

    /// Full state, including armed timers
    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Related videos for the current item, current item excluded
    pub fn related_videos(&self) -> Vec<VideoItem> {
        match &self.state.session.current_video {
            Some(current) => catalog::related_for(self.related.as_ref(), current, self.config.related_limit),
            None => Vec::new(),
        }
    }

    /// Add a snapshot handler
    pub fn add_snapshot_handler(&mut self, handler: Box<dyn SnapshotHandler>) {
        self.handlers.push(handler);
    }

    fn next_candidate(&self) -> Option<VideoItem> {
        let current = self.state.session.current_video.as_ref()?;
        catalog::next_candidate(self.related.as_ref(), current)
    }

    /// Apply an input and everything it triggers, then publish one snapshot
    pub fn dispatch(&mut self, input: Input) {
        let mut queue = VecDeque::from([input]);

        while let Some(input) = queue.pop_front() {
            let now = self.scheduler.now();
            let effects = self.state.apply(input, now);
            if let Some(failure) = self.execute(effects) {
                queue.push_back(Input::Media(MediaEvent::Error(failure)));
            }
        }

        self.publish();
    }

    /// Run effects in order
    ///
    /// After the first failing media command the remaining media commands
    /// of the batch are skipped; the failure message is returned so it can
    /// be fed back as a media error.
    fn execute(&mut self, effects: Vec<Effect>) -> Option<String> {
        let mut failure = None;

        for effect in effects {
            match effect {
                Effect::Media(command) => {
                    if failure.is_some() {
                        debug!("Skipping {:?} after media failure", command);
                        continue;
                    }
                    if let Err(e) = command.apply(self.surface.as_mut()) {
                        error!("Media command {:?} failed: {}", command, e);
                        failure = Some(e.to_string());
                    }
                }
                Effect::Timer(TimerRequest::Schedule { token, after }) => {
                    debug!("Scheduling {:?} timer in {:?}", token.kind, after);
                    self.scheduler.schedule(token, after);
                }
                Effect::Timer(TimerRequest::Cancel(token)) => {
                    debug!("Cancelling {:?} timer", token.kind);
                    self.scheduler.cancel(token);
                }
            }
        }

        failure
    }

    fn publish(&mut self) {
        let snapshot = self.state.snapshot();
        if snapshot == self.last_snapshot {
            return;
        }

        for handler in &mut self.handlers {
            handler.on_snapshot(&snapshot);
        }
        self.last_snapshot = snapshot;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::{catalog, video};
    use crate::catalog::Catalog;
    use crate::media::{MediaCommand, SimulatedSurface};
    use crate::player::{PlayerMode, TimerKind};
    use parking_lot::Mutex;
    use std::time::Duration;

    struct Recorder(Arc<Mutex<Vec<PlayerSnapshot>>>);

    impl SnapshotHandler for Recorder {
        fn on_snapshot(&mut self, snapshot: &PlayerSnapshot) {
            self.0.lock().push(snapshot.clone());
        }
    }

    struct Fixture {
        controller: PlayerController,
        surface: SimulatedSurface,
        clock: ManualScheduler,
        snapshots: Arc<Mutex<Vec<PlayerSnapshot>>>,
        catalog: Arc<Catalog>,
    }

    impl Fixture {
        fn new() -> Self {
            let surface = SimulatedSurface::new();
            let clock = ManualScheduler::new();
            let snapshots = Arc::new(Mutex::new(Vec::new()));
            let catalog = Arc::new(catalog());

            let controller = PlayerController::builder()
                .with_surface(surface.clone())
                .with_related(catalog.clone())
                .with_scheduler(clock.clone())
                .with_snapshot_handler(Box::new(Recorder(snapshots.clone())))
                .build()
                .unwrap();

            Self {
                controller,
                surface,
                clock,
                snapshots,
                catalog,
            }
        }

        fn item(&self, slug: &str) -> VideoItem {
            self.catalog.find(slug).unwrap().clone()
        }

        fn advance(&mut self, by: Duration) {
            let controller = &mut self.controller;
            self.clock.advance(by, |token| controller.on_timer(token));
        }
    }

    #[test]
    fn test_builder_requires_collaborators() {
        let result = PlayerController::builder().build();
        assert!(matches!(result, Err(DockError::InvalidInput(_))));
    }

    #[test]
    fn test_open_drives_surface() {
        let mut fx = Fixture::new();
        let a1 = fx.item("a1");
        fx.controller.open(a1.clone());

        assert_eq!(fx.surface.loaded(), Some(a1.media_url));
        assert!(fx.surface.is_playing());
        assert_eq!(fx.controller.snapshot().mode, PlayerMode::Full);
    }

    #[test]
    fn test_autoplay_countdown_timing() {
        let mut fx = Fixture::new();
        fx.controller.open(fx.item("a1"));
        fx.controller.on_media_event(MediaEvent::Ended);

        assert_eq!(fx.controller.snapshot().countdown, Some(3));
        assert_eq!(fx.controller.snapshot().up_next.unwrap().slug, "a2");

        fx.advance(Duration::from_millis(999));
        assert_eq!(fx.controller.snapshot().countdown, Some(3));

        fx.advance(Duration::from_millis(1));
        assert_eq!(fx.controller.snapshot().countdown, Some(2));

        fx.advance(Duration::from_secs(1));
        assert_eq!(fx.controller.snapshot().countdown, Some(1));

        fx.advance(Duration::from_secs(1));
        let snapshot = fx.controller.snapshot();
        assert_eq!(snapshot.countdown, None);
        assert_eq!(snapshot.slug(), Some("a2"));
        assert!(snapshot.playing);
        assert_eq!(fx.surface.loaded(), Some(fx.item("a2").media_url));

        fx.advance(Duration::from_secs(5));
        assert_eq!(fx.controller.snapshot().slug(), Some("a2"));
    }

    #[test]
    fn test_snapshot_sequence_during_countdown() {
        let mut fx = Fixture::new();
        fx.controller.open(fx.item("a1"));
        fx.controller.on_media_event(MediaEvent::Ended);
        fx.advance(Duration::from_secs(3));

        let countdowns: Vec<Option<u32>> = fx
            .snapshots
            .lock()
            .iter()
            .map(|s| s.countdown)
            .collect();
        assert_eq!(countdowns, vec![None, Some(3), Some(2), Some(1), None]);

        let switches = fx
            .snapshots
            .lock()
            .iter()
            .filter(|s| s.slug() == Some("a2"))
            .count();
        assert_eq!(switches, 1);
    }

    #[test]
    fn test_no_countdown_without_related() {
        let mut fx = Fixture::new();
        fx.controller.open(fx.item("b1"));
        fx.controller.on_media_event(MediaEvent::Ended);

        assert_eq!(fx.controller.snapshot().countdown, None);
        assert!(fx.clock.pending().is_empty());
    }

    #[test]
    fn test_close_during_countdown_never_advances() {
        let mut fx = Fixture::new();
        fx.controller.open(fx.item("a1"));
        fx.controller.on_media_event(MediaEvent::Ended);
        fx.advance(Duration::from_millis(1500));
        fx.controller.close();

        assert!(fx.clock.pending().is_empty());
        fx.advance(Duration::from_secs(10));
        let snapshot = fx.controller.snapshot();
        assert_eq!(snapshot.mode, PlayerMode::Hidden);
        assert!(snapshot.video.is_none());
    }

    #[test]
    fn test_flash_expires() {
        let mut fx = Fixture::new();
        fx.controller.open(fx.item("a1"));
        fx.controller.skip_forward();

        assert!(fx.controller.snapshot().flash.is_some());
        assert_eq!(fx.surface.position(), 10.0);
        fx.advance(Duration::from_millis(500));
        assert!(fx.controller.snapshot().flash.is_none());
    }

    #[test]
    fn test_controls_hide_after_idle() {
        let mut fx = Fixture::new();
        fx.controller.open(fx.item("a1"));
        fx.controller.on_pointer_move();
        fx.advance(Duration::from_secs(2));
        fx.controller.on_pointer_move();
        fx.advance(Duration::from_secs(2));
        assert!(fx.controller.snapshot().controls_visible);

        fx.advance(Duration::from_millis(500));
        assert!(!fx.controller.snapshot().controls_visible);
    }

    #[test]
    fn test_failed_load_becomes_failure() {
        let mut fx = Fixture::new();
        let a1 = fx.item("a1");
        fx.surface.fail_url(&a1.media_url, "403 Forbidden");
        fx.controller.open(a1);

        let snapshot = fx.controller.snapshot();
        assert_eq!(snapshot.mode, PlayerMode::Full);
        assert!(!snapshot.playing);
        assert!(snapshot.failure.unwrap().message.contains("403 Forbidden"));
        assert_eq!(
            fx.surface.commands().iter().filter(|c| **c == MediaCommand::Play).count(),
            0
        );

        fx.controller.on_media_event(MediaEvent::Ended);
        assert_eq!(fx.controller.snapshot().countdown, None);
    }

    #[test]
    fn test_related_videos_limit() {
        let mut fx = Fixture::new();
        let config = PlayerConfig {
            related_limit: 1,
            ..PlayerConfig::default()
        };
        fx.controller = PlayerController::builder()
            .with_config(config)
            .with_surface(fx.surface.clone())
            .with_related(fx.catalog.clone())
            .build()
            .unwrap();

        assert!(fx.controller.related_videos().is_empty());
        fx.controller.open(fx.item("a3"));
        let related = fx.controller.related_videos();
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].slug, "a1");
    }

    #[test]
    fn test_unchanged_snapshot_not_republished() {
        let mut fx = Fixture::new();
        fx.controller.open(fx.item("a1"));
        let published = fx.snapshots.lock().len();

        fx.controller.expand();
        fx.controller.open(fx.item("a1"));
        assert_eq!(fx.snapshots.lock().len(), published);
    }

    #[test]
    fn test_gesture_minimize_keeps_playing() {
        let mut fx = Fixture::new();
        fx.controller.open(video("x", "solo"));
        fx.controller.on_drag_update(75.0);
        fx.controller.on_drag_release(75.0, 10.0);

        let snapshot = fx.controller.snapshot();
        assert_eq!(snapshot.mode, PlayerMode::Mini);
        assert!(snapshot.playing);
        assert!(fx.surface.is_playing());
        assert!(fx.controller.state().timers.armed(TimerKind::ControlsIdle).is_none());
    }
}

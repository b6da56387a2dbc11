//! Player state machine
//!
//! [`reduce`] is a pure transition function: given the current
//! [`PlayerState`], one [`Input`] and the current player time it returns
//! the next state plus the [`Effect`]s the controller must carry out.
//! All changes caused by one input are applied together, so a renderer
//! never observes a half-finished video switch.

use crate::catalog::VideoItem;
use crate::media::{MediaCommand, MediaEvent};
use crate::player::autoplay::{AutoplayQueue, CountdownStep, COUNTDOWN_TICK};
use crate::player::controls::{ControlsIntent, ControlsVisibilityTimer};
use crate::player::gesture::{GestureOutcome, GestureTransitionHandler};
use crate::player::session::{
    FlashKind, PlaybackFailure, PlayerSession, PlayerSnapshot, TransientFlash,
};
use crate::player::timer::{TimerKind, TimerRegistry, TimerRequest, TimerToken};
use crate::player::{clock, PlayerConfig, PlayerMode};
use log::{debug, info, warn};
use std::time::Duration;

/// Everything that can happen to the player
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Open(VideoItem),
    Minimize,
    Expand,
    Close,
    SelectRelated(VideoItem),
    TogglePlayPause,
    Skip(f64),
    SeekTo(f64),
    BeginScrub,
    EndScrub,
    SetVolume(f32),
    ToggleMute,
    CancelCountdown,
    PlayNextNow,
    Retry,
    DragUpdate(f64),
    DragRelease { offset: f64, velocity: f64 },
    PointerMoved,
    PointerLeft,

    /// The current item ended; `next` is the autoplay candidate
    Ended { next: Option<VideoItem> },

    /// Media surface callback; `Ended` here carries no candidate
    Media(MediaEvent),

    TimerFired(TimerToken),
}

/// Side effect requested by a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Media(MediaCommand),
    Timer(TimerRequest),
}

/// Session plus the components that decide transitions
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub session: PlayerSession,
    pub timers: TimerRegistry,
    autoplay: AutoplayQueue,
    gesture: GestureTransitionHandler,
    controls: ControlsVisibilityTimer,
    flash_duration: Duration,
}

/// Pure transition function
pub fn reduce(state: &PlayerState, input: Input, now: Duration) -> (PlayerState, Vec<Effect>) {
    let mut next = state.clone();
    let effects = next.apply(input, now);
    (next, effects)
}

impl PlayerState {
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            session: PlayerSession::new(config.default_volume),
            timers: TimerRegistry::new(),
            autoplay: AutoplayQueue::new(config.countdown_seconds),
            gesture: GestureTransitionHandler::new(
                config.drag_distance_threshold,
                config.drag_velocity_threshold,
                config.drag_elasticity_down,
                config.drag_elasticity_up,
            ),
            controls: ControlsVisibilityTimer::new(config.controls_idle()),
            flash_duration: config.flash_duration(),
        }
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot::capture(&self.session, self.gesture.elastic_offset(self.session.drag_offset))
    }

    /// Apply one input in place and return the effects to execute
    pub fn apply(&mut self, input: Input, now: Duration) -> Vec<Effect> {
        let mut fx = Vec::new();

        match input {
            Input::Open(video) => self.open(video, &mut fx),
            Input::Minimize => self.minimize(&mut fx),
            Input::Expand => self.expand(),
            Input::Close => self.close(&mut fx),
            Input::SelectRelated(video) => self.select_related(video, &mut fx),
            Input::TogglePlayPause => self.toggle_play_pause(now, &mut fx),
            Input::Skip(delta) => self.skip(delta, now, &mut fx),
            Input::SeekTo(target) => self.seek_to(target, &mut fx),
            Input::BeginScrub => self.begin_scrub(),
            Input::EndScrub => self.end_scrub(&mut fx),
            Input::SetVolume(volume) => self.set_volume(volume, &mut fx),
            Input::ToggleMute => self.toggle_mute(&mut fx),
            Input::CancelCountdown => self.cancel_countdown(&mut fx),
            Input::PlayNextNow => self.play_next_now(&mut fx),
            Input::Retry => self.retry(&mut fx),
            Input::DragUpdate(offset) => self.drag_update(offset),
            Input::DragRelease { offset, velocity } => self.drag_release(offset, velocity, &mut fx),
            Input::PointerMoved => self.pointer_moved(&mut fx),
            Input::PointerLeft => self.pointer_left(&mut fx),
            Input::Ended { next } => self.ended(next, &mut fx),
            Input::Media(event) => self.media_event(event, &mut fx),
            Input::TimerFired(token) => self.timer_fired(token, &mut fx),
        }

        debug_assert!(
            self.session.check_invariants().is_ok(),
            "{:?}",
            self.session.check_invariants()
        );
        fx
    }

    fn is_active(&self) -> bool {
        self.session.mode != PlayerMode::Hidden
    }

    fn arm(&mut self, kind: TimerKind, after: Duration, fx: &mut Vec<Effect>) {
        let generation = self.session.generation;
        fx.extend(self.timers.arm(kind, generation, after).into_iter().map(Effect::Timer));
    }

    fn disarm(&mut self, kind: TimerKind, fx: &mut Vec<Effect>) {
        fx.extend(self.timers.disarm(kind).map(Effect::Timer));
    }

    fn media(fx: &mut Vec<Effect>, command: MediaCommand) {
        fx.push(Effect::Media(command));
    }

    /// Replace the current item, resetting playback as one step
    fn switch_to(&mut self, video: VideoItem, mode: PlayerMode, fx: &mut Vec<Effect>) {
        fx.extend(self.timers.disarm_all().into_iter().map(Effect::Timer));

        info!("Switching to '{}' in {:?} mode", video.slug, mode);

        let session = &mut self.session;
        session.generation += 1;
        session.mode = mode;
        session.clock.restart(video.duration_seconds);
        session.countdown = None;
        session.flash = None;
        session.drag_offset = 0.0;
        session.failure = None;
        session.controls_visible = self.controls.initial_visibility(mode, false);

        Self::media(fx, MediaCommand::load(&video));
        Self::media(fx, MediaCommand::SetVolume(session.clock.volume));
        Self::media(fx, MediaCommand::SetMuted(session.clock.muted));
        Self::media(fx, MediaCommand::Play);

        session.current_video = Some(video);
    }

    fn open(&mut self, video: VideoItem, fx: &mut Vec<Effect>) {
        if self.session.is_current(&video) {
            match self.session.mode {
                PlayerMode::Full => debug!("'{}' already open", video.slug),
                _ => self.expand(),
            }
            return;
        }
        self.switch_to(video, PlayerMode::Full, fx);
    }

    fn minimize(&mut self, fx: &mut Vec<Effect>) {
        if self.session.mode != PlayerMode::Full {
            return;
        }
        info!("Player minimized");
        self.disarm(TimerKind::ControlsIdle, fx);
        self.session.mode = PlayerMode::Mini;
        self.session.drag_offset = 0.0;
        self.session.controls_visible = false;
    }

    fn expand(&mut self) {
        if self.session.mode != PlayerMode::Mini {
            return;
        }
        info!("Player expanded");
        self.session.mode = PlayerMode::Full;
        self.session.controls_visible = self
            .controls
            .initial_visibility(PlayerMode::Full, self.session.countdown.is_some());
    }

    fn close(&mut self, fx: &mut Vec<Effect>) {
        if !self.is_active() {
            return;
        }
        fx.extend(self.timers.disarm_all().into_iter().map(Effect::Timer));
        Self::media(fx, MediaCommand::Pause);

        info!("Player closed");
        let session = &mut self.session;
        session.generation += 1;
        session.mode = PlayerMode::Hidden;
        session.current_video = None;
        session.clock.stop();
        session.countdown = None;
        session.flash = None;
        session.drag_offset = 0.0;
        session.controls_visible = false;
        session.failure = None;
    }

    fn select_related(&mut self, video: VideoItem, fx: &mut Vec<Effect>) {
        if !self.is_active() || self.session.is_current(&video) {
            return;
        }
        let mode = self.session.mode;
        self.switch_to(video, mode, fx);
    }

    fn flash(&mut self, kind: FlashKind, now: Duration, fx: &mut Vec<Effect>) {
        self.session.flash = Some(TransientFlash {
            kind,
            expires_at: now + self.flash_duration,
        });
        self.arm(TimerKind::Flash, self.flash_duration, fx);
    }

    fn toggle_play_pause(&mut self, now: Duration, fx: &mut Vec<Effect>) {
        if !self.is_active() || self.session.failure.is_some() {
            return;
        }

        if self.session.countdown.is_some() {
            self.cancel_countdown(fx);
            self.flash(FlashKind::Play, now, fx);
            return;
        }

        let playing = !self.session.clock.playing;
        self.session.clock.playing = playing;
        if playing {
            Self::media(fx, MediaCommand::Play);
            self.flash(FlashKind::Play, now, fx);
        } else {
            Self::media(fx, MediaCommand::Pause);
            self.flash(FlashKind::Pause, now, fx);
        }
    }

    fn skip(&mut self, delta: f64, now: Duration, fx: &mut Vec<Effect>) {
        if !self.is_active() || delta == 0.0 {
            return;
        }
        let target = self.session.clock.skip_target(delta);
        self.session.clock.position = target;
        Self::media(fx, MediaCommand::SeekTo(target));

        let kind = if delta > 0.0 { FlashKind::SkipForward } else { FlashKind::SkipBack };
        self.flash(kind, now, fx);
    }

    fn seek_to(&mut self, target: f64, fx: &mut Vec<Effect>) {
        if !self.is_active() {
            return;
        }
        let target = self.session.clock.clamp_seek(target);
        self.session.clock.position = target;
        if !self.session.clock.seeking {
            Self::media(fx, MediaCommand::SeekTo(target));
        }
    }

    fn begin_scrub(&mut self) {
        if self.is_active() {
            self.session.clock.seeking = true;
        }
    }

    fn end_scrub(&mut self, fx: &mut Vec<Effect>) {
        if !self.session.clock.seeking {
            return;
        }
        self.session.clock.seeking = false;
        Self::media(fx, MediaCommand::SeekTo(self.session.clock.position));
    }

    fn set_volume(&mut self, volume: f32, fx: &mut Vec<Effect>) {
        let Some(volume) = clock::sanitize_volume(volume) else {
            return;
        };
        self.session.clock.volume = volume;
        self.session.clock.muted = false;
        Self::media(fx, MediaCommand::SetVolume(volume));
        Self::media(fx, MediaCommand::SetMuted(false));
    }

    fn toggle_mute(&mut self, fx: &mut Vec<Effect>) {
        let muted = !self.session.clock.muted;
        self.session.clock.muted = muted;
        Self::media(fx, MediaCommand::SetMuted(muted));
    }

    fn cancel_countdown(&mut self, fx: &mut Vec<Effect>) {
        if self.session.countdown.take().is_none() {
            return;
        }
        debug!("Autoplay countdown cancelled");
        self.disarm(TimerKind::Countdown, fx);

        // Resuming an ended item replays it from the start
        let clock = &mut self.session.clock;
        if clock.has_duration() && clock.position >= clock.duration {
            clock.position = 0.0;
            Self::media(fx, MediaCommand::SeekTo(0.0));
        }
        clock.playing = true;

        self.session.controls_visible = self.controls.initial_visibility(self.session.mode, false);
        Self::media(fx, MediaCommand::Play);
    }

    fn play_next_now(&mut self, fx: &mut Vec<Effect>) {
        if let Some(countdown) = self.session.countdown.clone() {
            let mode = self.session.mode;
            self.switch_to(countdown.next, mode, fx);
        }
    }

    fn retry(&mut self, fx: &mut Vec<Effect>) {
        let Some(failure) = self.session.failure.take() else {
            return;
        };
        let Some(video) = self.session.current_video.clone() else {
            return;
        };

        info!("Retrying '{}' at {:.1}s", video.slug, failure.position);
        let clock = &mut self.session.clock;
        clock.position = clock.clamp_seek(failure.position);
        clock.playing = true;

        Self::media(fx, MediaCommand::load(&video));
        Self::media(fx, MediaCommand::SetVolume(clock.volume));
        Self::media(fx, MediaCommand::SetMuted(clock.muted));
        if clock.position > 0.0 {
            Self::media(fx, MediaCommand::SeekTo(clock.position));
        }
        Self::media(fx, MediaCommand::Play);
    }

    fn drag_update(&mut self, offset: f64) {
        if let Some(offset) = self.gesture.update(self.session.mode, offset) {
            self.session.drag_offset = offset;
        }
    }

    fn drag_release(&mut self, offset: f64, velocity: f64, fx: &mut Vec<Effect>) {
        match self.gesture.release(self.session.mode, offset, velocity) {
            GestureOutcome::Minimize => self.minimize(fx),
            GestureOutcome::SnapBack => self.session.drag_offset = 0.0,
            GestureOutcome::Ignored => {}
        }
    }

    fn pointer_moved(&mut self, fx: &mut Vec<Effect>) {
        let intent = self
            .controls
            .on_pointer_move(self.session.mode, self.session.countdown.is_some());
        self.apply_controls(intent, fx);
    }

    fn pointer_left(&mut self, fx: &mut Vec<Effect>) {
        let intent = self.controls.on_pointer_leave(self.session.mode);
        self.apply_controls(intent, fx);
    }

    fn apply_controls(&mut self, intent: ControlsIntent, fx: &mut Vec<Effect>) {
        match intent {
            ControlsIntent::Reveal { idle } => {
                self.session.controls_visible = true;
                self.arm(TimerKind::ControlsIdle, idle, fx);
            }
            ControlsIntent::Hide => {
                self.session.controls_visible = false;
                self.disarm(TimerKind::ControlsIdle, fx);
            }
            ControlsIntent::Ignore => {}
        }
    }

    fn ended(&mut self, next: Option<VideoItem>, fx: &mut Vec<Effect>) {
        if !self.is_active() || self.session.failure.is_some() || self.session.countdown.is_some() {
            return;
        }

        self.session.clock.playing = false;
        self.session.clock.seeking = false;
        if self.session.clock.has_duration() {
            self.session.clock.position = self.session.clock.duration;
        }

        let next = next.filter(|candidate| !self.session.is_current(candidate));
        match self.autoplay.on_ended(next) {
            Some(countdown) => {
                info!(
                    "Playing '{}' in {}s",
                    countdown.next.slug, countdown.remaining
                );
                self.session.countdown = Some(countdown);
                self.arm(TimerKind::Countdown, COUNTDOWN_TICK, fx);
                self.disarm(TimerKind::ControlsIdle, fx);
                self.session.controls_visible = false;
            }
            None => debug!("Playback ended with nothing queued"),
        }
    }

    fn media_event(&mut self, event: MediaEvent, fx: &mut Vec<Effect>) {
        if !self.is_active() {
            return;
        }

        match event {
            MediaEvent::Progress(played) => {
                if self.session.failure.is_none() && self.session.countdown.is_none() {
                    self.session.clock.report_progress(played);
                }
            }
            MediaEvent::DurationKnown(seconds) => self.session.clock.report_duration(seconds),
            MediaEvent::Play => {
                if self.session.failure.is_some() {
                    return;
                }
                if self.session.countdown.is_some() {
                    self.cancel_countdown(fx);
                } else {
                    self.session.clock.playing = true;
                }
            }
            MediaEvent::Pause => self.session.clock.playing = false,
            MediaEvent::Ended => self.ended(None, fx),
            MediaEvent::Error(message) => self.fail(message, fx),
        }
    }

    fn fail(&mut self, message: String, fx: &mut Vec<Effect>) {
        warn!("Playback failed: {}", message);
        if self.session.countdown.take().is_some() {
            self.disarm(TimerKind::Countdown, fx);
        }
        self.session.clock.playing = false;
        self.session.clock.seeking = false;
        self.session.failure = Some(PlaybackFailure {
            message,
            position: self.session.clock.position,
        });
        self.session.controls_visible = self.controls.initial_visibility(self.session.mode, false);
    }

    fn timer_fired(&mut self, token: TimerToken, fx: &mut Vec<Effect>) {
        if !self.timers.accept(token) {
            warn!("Dropping stale {:?} timer (generation {})", token.kind, token.generation);
            return;
        }

        match token.kind {
            TimerKind::Countdown => {
                let Some(countdown) = self.session.countdown.clone() else {
                    return;
                };
                match self.autoplay.tick(&countdown) {
                    CountdownStep::Continue(remaining) => {
                        debug!("Autoplay in {}s", remaining);
                        if let Some(current) = self.session.countdown.as_mut() {
                            current.remaining = remaining;
                        }
                        self.arm(TimerKind::Countdown, COUNTDOWN_TICK, fx);
                    }
                    CountdownStep::Advance(next) => {
                        let mode = self.session.mode;
                        self.switch_to(next, mode, fx);
                    }
                }
            }
            TimerKind::ControlsIdle => self.session.controls_visible = false,
            TimerKind::Flash => self.session.flash = None,
        }
    }
}

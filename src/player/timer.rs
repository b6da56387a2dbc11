//! Timers with cancellation handles
//!
//! The player arms at most one timer per [`TimerKind`]. Every armed timer
//! is identified by a [`TimerToken`] carrying the session generation it
//! belongs to; a token that fires after being replaced or cancelled is
//! rejected by [`TimerRegistry::accept`], so a stale countdown can never
//! act on a newer video.

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Kinds of timers owned by the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TimerKind {
    /// One-second autoplay countdown tick
    Countdown,

    /// Controls idle timeout
    ControlsIdle,

    /// Transient flash expiry
    Flash,
}

impl TimerKind {
    const ALL: [TimerKind; 3] = [TimerKind::Countdown, TimerKind::ControlsIdle, TimerKind::Flash];

    fn slot(self) -> usize {
        match self {
            TimerKind::Countdown => 0,
            TimerKind::ControlsIdle => 1,
            TimerKind::Flash => 2,
        }
    }
}

/// Cancellation handle of one armed timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimerToken {
    pub kind: TimerKind,

    /// Session generation the timer was armed in
    pub generation: u64,

    /// Unique sequence number
    pub seq: u64,
}

/// Request to start or stop a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerRequest {
    Schedule { token: TimerToken, after: Duration },
    Cancel(TimerToken),
}

/// Armed timers, one slot per kind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimerRegistry {
    slots: [Option<TimerToken>; 3],
    next_seq: u64,
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a timer, cancelling any armed timer of the same kind first
    pub fn arm(&mut self, kind: TimerKind, generation: u64, after: Duration) -> Vec<TimerRequest> {
        let mut requests: Vec<TimerRequest> = self.disarm(kind).into_iter().collect();

        self.next_seq += 1;
        let token = TimerToken {
            kind,
            generation,
            seq: self.next_seq,
        };
        self.slots[kind.slot()] = Some(token);
        requests.push(TimerRequest::Schedule { token, after });
        requests
    }

    /// Cancel the armed timer of a kind, if any
    pub fn disarm(&mut self, kind: TimerKind) -> Option<TimerRequest> {
        self.slots[kind.slot()].take().map(TimerRequest::Cancel)
    }

    /// Cancel every armed timer
    pub fn disarm_all(&mut self) -> Vec<TimerRequest> {
        TimerKind::ALL
            .iter()
            .filter_map(|kind| self.disarm(*kind))
            .collect()
    }

    /// Consume a fired token
    ///
    /// Returns true only when `token` is the armed timer of its kind.
    pub fn accept(&mut self, token: TimerToken) -> bool {
        let slot = &mut self.slots[token.kind.slot()];
        if *slot == Some(token) {
            *slot = None;
            true
        } else {
            false
        }
    }

    /// Currently armed timer of a kind
    pub fn armed(&self, kind: TimerKind) -> Option<TimerToken> {
        self.slots[kind.slot()]
    }
}

/// Executes timer requests and reports the current time
pub trait TimerScheduler: Send {
    /// Monotonic time since the scheduler was created
    fn now(&self) -> Duration;

    /// Fire `token` after `after` has elapsed
    fn schedule(&mut self, token: TimerToken, after: Duration);

    /// Stop `token` from firing
    fn cancel(&mut self, token: TimerToken);
}

#[derive(Debug, Default)]
struct ManualState {
    now: Duration,
    pending: Vec<(Duration, TimerToken)>,
}

/// Deterministic scheduler advanced by hand
///
/// Clones share the same clock, so a test can keep one handle while the
/// controller owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    state: Arc<Mutex<ManualState>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance time by `by`, firing due timers in deadline order
    ///
    /// Time is moved to each deadline before its token is handed to `fire`,
    /// so timers scheduled from within `fire` are measured from the firing
    /// moment and fire within the same call if they fall inside the window.
    pub fn advance(&self, by: Duration, mut fire: impl FnMut(TimerToken)) {
        let target = self.state.lock().now + by;

        loop {
            let next = {
                let mut state = self.state.lock();
                let due = state
                    .pending
                    .iter()
                    .enumerate()
                    .filter(|(_, (deadline, _))| *deadline <= target)
                    .min_by_key(|(_, (deadline, token))| (*deadline, token.seq))
                    .map(|(index, _)| index);

                due.map(|index| {
                    let (deadline, token) = state.pending.remove(index);
                    state.now = deadline;
                    token
                })
            };

            match next {
                Some(token) => fire(token),
                None => break,
            }
        }

        self.state.lock().now = target;
    }

    /// Tokens waiting to fire
    pub fn pending(&self) -> Vec<TimerToken> {
        self.state.lock().pending.iter().map(|(_, token)| *token).collect()
    }
}

impl TimerScheduler for ManualScheduler {
    fn now(&self) -> Duration {
        self.state.lock().now
    }

    fn schedule(&mut self, token: TimerToken, after: Duration) {
        let mut state = self.state.lock();
        let deadline = state.now + after;
        state.pending.push((deadline, token));
    }

    fn cancel(&mut self, token: TimerToken) {
        self.state.lock().pending.retain(|(_, t)| *t != token);
    }
}

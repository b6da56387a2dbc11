//! Async player driver
//!
//! [`PlayerDriver`] moves a [`PlayerController`] onto a tokio task and
//! serializes every command, media callback and timer expiry through one
//! channel. Snapshots are published on a `watch` channel so any number of
//! observers can follow the player without blocking it.

use crate::catalog::VideoItem;
use crate::media::MediaEvent;
use crate::player::controller::{PlayerController, PlayerControllerBuilder};
use crate::player::session::PlayerSnapshot;
use crate::player::timer::{TimerScheduler, TimerToken};
use crate::utils::error::{DockError, Result};
use log::{debug, info, warn};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, WeakUnboundedSender};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Commands accepted by the driver
#[derive(Debug)]
pub enum PlayerCommand {
    Open(VideoItem),
    Minimize,
    Expand,
    Close,
    SelectRelated(VideoItem),
    TogglePlayPause,
    Skip(f64),
    SkipForward,
    SkipBack,
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

    /// Callback from the media surface
    Media(MediaEvent),

    /// Expiry of a scheduled timer
    TimerFired(TimerToken),

    /// Reply with the snapshot once every earlier command has been applied
    Query(oneshot::Sender<PlayerSnapshot>),

    /// Stop the driver task
    Shutdown,
}

/// Timer scheduler backed by tokio tasks
///
/// Each timer is a task that sleeps and then posts
/// [`PlayerCommand::TimerFired`] to the driver. The scheduler only holds a
/// weak sender, so pending timers do not keep the driver alive.
#[derive(Debug)]
pub struct TokioScheduler {
    tx: WeakUnboundedSender<PlayerCommand>,
    tasks: HashMap<TimerToken, JoinHandle<()>>,
    origin: Instant,
}

impl TokioScheduler {
    pub fn new(tx: &UnboundedSender<PlayerCommand>) -> Self {
        Self {
            tx: tx.downgrade(),
            tasks: HashMap::new(),
            origin: Instant::now(),
        }
    }
}

impl TimerScheduler for TokioScheduler {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn schedule(&mut self, token: TimerToken, after: Duration) {
        self.tasks.retain(|_, task| !task.is_finished());

        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            if let Some(tx) = tx.upgrade() {
                let _ = tx.send(PlayerCommand::TimerFired(token));
            }
        });
        self.tasks.insert(token, task);
    }

    fn cancel(&mut self, token: TimerToken) {
        if let Some(task) = self.tasks.remove(&token) {
            task.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}

/// Spawns the driver task
pub struct PlayerDriver;

impl PlayerDriver {
    /// Build the controller and run it on a new task
    ///
    /// When the builder has no scheduler a [`TokioScheduler`] is installed.
    /// Must be called from within a tokio runtime.
    pub fn spawn(builder: PlayerControllerBuilder) -> Result<PlayerHandle> {
        let (tx, rx) = mpsc::unbounded_channel();

        let builder = if builder.has_scheduler() {
            builder
        } else {
            builder.with_scheduler(TokioScheduler::new(&tx))
        };
        let controller = builder.build()?;

        let (snapshot_tx, snapshot_rx) = watch::channel(controller.snapshot());
        let task = tokio::spawn(run(controller, rx, snapshot_tx));

        info!("Player driver started");
        Ok(PlayerHandle {
            tx,
            snapshots: snapshot_rx,
            task: Some(task),
        })
    }
}

async fn run(
    mut controller: PlayerController,
    mut rx: UnboundedReceiver<PlayerCommand>,
    snapshots: watch::Sender<PlayerSnapshot>,
) {
    while let Some(command) = rx.recv().await {
        match command {
            PlayerCommand::Shutdown => {
                debug!("Player driver shutting down");
                controller.close();
                break;
            }
            PlayerCommand::Query(reply) => {
                let _ = reply.send(controller.snapshot());
                continue;
            }
            command => execute(&mut controller, command),
        }

        let snapshot = controller.snapshot();
        snapshots.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }

    info!("Player driver stopped");
}

fn execute(controller: &mut PlayerController, command: PlayerCommand) {
    match command {
        PlayerCommand::Open(video) => controller.open(video),
        PlayerCommand::Minimize => controller.minimize(),
        PlayerCommand::Expand => controller.expand(),
        PlayerCommand::Close => controller.close(),
        PlayerCommand::SelectRelated(video) => controller.select_related(video),
        PlayerCommand::TogglePlayPause => controller.toggle_play_pause(),
        PlayerCommand::Skip(delta) => controller.skip(delta),
        PlayerCommand::SkipForward => controller.skip_forward(),
        PlayerCommand::SkipBack => controller.skip_back(),
        PlayerCommand::SeekTo(seconds) => controller.seek_to(seconds),
        PlayerCommand::BeginScrub => controller.begin_scrub(),
        PlayerCommand::EndScrub => controller.end_scrub(),
        PlayerCommand::SetVolume(volume) => controller.set_volume(volume),
        PlayerCommand::ToggleMute => controller.toggle_mute(),
        PlayerCommand::CancelCountdown => controller.cancel_countdown(),
        PlayerCommand::PlayNextNow => controller.play_next_now(),
        PlayerCommand::Retry => controller.retry(),
        PlayerCommand::DragUpdate(offset) => controller.on_drag_update(offset),
        PlayerCommand::DragRelease { offset, velocity } => controller.on_drag_release(offset, velocity),
        PlayerCommand::PointerMoved => controller.on_pointer_move(),
        PlayerCommand::PointerLeft => controller.on_pointer_leave(),
        PlayerCommand::Media(event) => controller.on_media_event(event),
        PlayerCommand::TimerFired(token) => controller.on_timer(token),
        PlayerCommand::Query(_) | PlayerCommand::Shutdown => {
            warn!("Control command reached the executor");
        }
    }
}

/// Handle to a running driver
#[derive(Debug)]
pub struct PlayerHandle {
    tx: UnboundedSender<PlayerCommand>,
    snapshots: watch::Receiver<PlayerSnapshot>,
    task: Option<JoinHandle<()>>,
}

impl PlayerHandle {
    /// Queue a command
    pub fn send(&self, command: PlayerCommand) -> Result<()> {
        self.tx.send(command)?;
        Ok(())
    }

    /// Sender for feeding commands from other tasks
    pub fn sender(&self) -> UnboundedSender<PlayerCommand> {
        self.tx.clone()
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> PlayerSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Snapshot after every command queued so far has been applied
    pub async fn current(&self) -> Result<PlayerSnapshot> {
        let (reply, response) = oneshot::channel();
        self.send(PlayerCommand::Query(reply))?;
        response.await.map_err(|_| DockError::ChannelClosed)
    }

    /// New receiver following published snapshots
    pub fn subscribe(&self) -> watch::Receiver<PlayerSnapshot> {
        self.snapshots.clone()
    }

    /// Close the player and wait for the driver to stop
    pub async fn shutdown(mut self) -> Result<()> {
        self.send(PlayerCommand::Shutdown)?;
        if let Some(task) = self.task.take() {
            task.await
                .map_err(|e| DockError::Internal(format!("driver task failed: {}", e)))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::catalog;
    use crate::media::SimulatedSurface;
    use crate::player::PlayerMode;
    use std::sync::Arc;

    fn builder(surface: &SimulatedSurface) -> PlayerControllerBuilder {
        PlayerController::builder()
            .with_surface(surface.clone())
            .with_related(Arc::new(catalog()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_commands_apply_in_order() {
        let surface = SimulatedSurface::new();
        let handle = PlayerDriver::spawn(builder(&surface)).unwrap();
        let a1 = catalog().find("a1").unwrap().clone();

        handle.send(PlayerCommand::Open(a1)).unwrap();
        handle.send(PlayerCommand::Minimize).unwrap();
        handle.send(PlayerCommand::SetVolume(0.25)).unwrap();

        let snapshot = handle.current().await.unwrap();
        assert_eq!(snapshot.mode, PlayerMode::Mini);
        assert_eq!(snapshot.volume, 0.25);
        assert_eq!(handle.snapshot(), snapshot);
        assert_eq!(surface.volume(), 0.25);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_flash_expires_on_tokio_timer() {
        let surface = SimulatedSurface::new();
        let handle = PlayerDriver::spawn(builder(&surface)).unwrap();
        let a1 = catalog().find("a1").unwrap().clone();

        handle.send(PlayerCommand::Open(a1)).unwrap();
        handle.send(PlayerCommand::SkipForward).unwrap();
        assert!(handle.current().await.unwrap().flash.is_some());

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(handle.current().await.unwrap().flash.is_none());

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_closes_player() {
        let surface = SimulatedSurface::new();
        let handle = PlayerDriver::spawn(builder(&surface)).unwrap();
        let a1 = catalog().find("a1").unwrap().clone();
        let sender = handle.sender();

        handle.send(PlayerCommand::Open(a1)).unwrap();
        handle.shutdown().await.unwrap();

        assert!(!surface.is_playing());
        assert!(sender.send(PlayerCommand::Close).is_err());
    }
}

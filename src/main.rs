use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::{debug, info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use dockplayer::catalog::Catalog;
use dockplayer::media::SimulatedSurface;
use dockplayer::player::{
    PlayerCommand, PlayerController, PlayerDriver, PlayerMode, PlayerSnapshot, SnapshotHandler,
};
use dockplayer::utils::{format_time, Config};

/// Simulated media-tick interval
const TICK: Duration = Duration::from_millis(250);

/// DockPlayer - headless player presentation core
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Slug of the video to open (defaults to the first catalog entry)
    #[arg(value_name = "SLUG")]
    slug: Option<String>,

    /// Catalog file (TOML with [[videos]] entries)
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,

    /// Configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Set initial volume (0-100)
    #[arg(short, long, value_name = "VOLUME", value_parser = clap::value_parser!(u8).range(0..=100))]
    volume: Option<u8>,

    /// Simulated playback speed multiplier
    #[arg(long, default_value = "1.0")]
    speed: f64,

    /// Stop after this many items have played
    #[arg(long, default_value = "3")]
    max_items: u32,

    /// Minimize the player after this many seconds
    #[arg(long, value_name = "SECONDS")]
    minimize_after: Option<f64>,

    /// Print every snapshot as a JSON line
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration before logging so the configured level applies
    let mut config = Config::load_with(args.config.as_deref())?;

    // Initialize logging
    let log_level = if args.debug { "debug" } else { config.general.log_level.as_str() };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();

    info!("Starting DockPlayer v{}", env!("CARGO_PKG_VERSION"));

    if let Some(volume) = args.volume {
        config.player.default_volume = volume as f32 / 100.0;
    }
    if !(args.speed.is_finite() && args.speed > 0.0) {
        anyhow::bail!("Speed must be a positive number, got {}", args.speed);
    }

    // Load the catalog
    let catalog_path = args
        .catalog
        .or(config.catalog.path.clone())
        .context("No catalog given; pass --catalog or set catalog.path")?;
    let catalog = Catalog::load(&catalog_path)
        .with_context(|| format!("Failed to load catalog {:?}", catalog_path))?;

    let first = match &args.slug {
        Some(slug) => catalog
            .find(slug)
            .cloned()
            .with_context(|| format!("No video '{}' in catalog", slug))?,
        None => catalog
            .videos()
            .first()
            .cloned()
            .context("Catalog is empty")?,
    };

    // The simulated surface plays every source for its nominal duration
    let surface = SimulatedSurface::new();
    for video in catalog.videos() {
        surface.register(&video.media_url, video.duration_seconds);
    }

    let builder = PlayerController::builder()
        .with_config(config.player.clone())
        .with_surface(surface.clone())
        .with_related(Arc::new(catalog))
        .with_snapshot_handler(Box::new(LoggingSnapshotHandler::new(args.json)));

    let handle = PlayerDriver::spawn(builder)?;
    let mut snapshots = handle.subscribe();

    info!("Opening '{}'", first.slug);
    handle.send(PlayerCommand::Open(first))?;

    let mut interval = tokio::time::interval(TICK);
    let started = tokio::time::Instant::now();
    let mut minimized = false;
    let mut generation = None;
    let mut items = 0u32;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                for event in surface.advance(TICK.as_secs_f64() * args.speed) {
                    handle.send(PlayerCommand::Media(event))?;
                }

                if let Some(after) = args.minimize_after {
                    if !minimized && started.elapsed().as_secs_f64() >= after {
                        handle.send(PlayerCommand::Minimize)?;
                        minimized = true;
                    }
                }
            }

            changed = snapshots.changed() => {
                if changed.is_err() {
                    warn!("Player driver stopped unexpectedly");
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();

                if snapshot.mode != PlayerMode::Hidden && generation != Some(snapshot.generation) {
                    generation = Some(snapshot.generation);
                    items += 1;
                }

                if snapshot.failure.is_some() {
                    warn!("Stopping after playback failure");
                    break;
                }
                if snapshot.countdown.is_some() && items >= args.max_items {
                    info!("Played {} items, stopping", items);
                    break;
                }
                if !snapshot.playing && snapshot.countdown.is_none() && snapshot.position > 0.0 {
                    info!("Playback finished with nothing queued");
                    break;
                }
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    handle.shutdown().await?;
    info!("DockPlayer stopped");
    Ok(())
}

/// Snapshot handler that logs transitions
struct LoggingSnapshotHandler {
    json: bool,
    last: Option<PlayerSnapshot>,
}

impl LoggingSnapshotHandler {
    fn new(json: bool) -> Self {
        Self { json, last: None }
    }
}

impl SnapshotHandler for LoggingSnapshotHandler {
    fn on_snapshot(&mut self, snapshot: &PlayerSnapshot) {
        if self.json {
            match serde_json::to_string(snapshot) {
                Ok(line) => println!("{}", line),
                Err(e) => warn!("Failed to serialize snapshot: {}", e),
            }
        }

        let previous = self.last.replace(snapshot.clone());
        let previous = previous.as_ref();

        if previous.map(|p| p.slug()) != Some(snapshot.slug()) {
            match &snapshot.video {
                Some(video) => info!(
                    "Now playing '{}' by {} ({})",
                    video.title,
                    video.channel_name,
                    format_time(snapshot.duration)
                ),
                None => info!("Player hidden"),
            }
        }

        if previous.map(|p| p.mode) != Some(snapshot.mode) {
            info!("Mode: {:?}", snapshot.mode);
        }

        if previous.map(|p| p.countdown) != Some(snapshot.countdown) {
            if let (Some(remaining), Some(next)) = (snapshot.countdown, &snapshot.up_next) {
                info!("Up next: '{}' in {}", next.title, remaining);
            }
        }

        if let Some(failure) = &snapshot.failure {
            warn!("Playback failed at {}: {}", format_time(failure.position), failure.message);
        }

        // Log position changes at debug level to avoid spam
        debug!(
            "Position: {} / {}",
            format_time(snapshot.position),
            format_time(snapshot.duration)
        );
    }
}

//! DockPlayer - player presentation core for a media-viewing client
//!
//! The player shows one video at a time in a full view, a docked mini
//! view, or not at all. It counts down into the next related video when
//! one ends and minimizes on a downward drag.

pub mod catalog;
pub mod media;
pub mod player;
pub mod utils;

pub use catalog::{Catalog, MediaType, RelatedSource, VideoItem};
pub use media::{MediaCommand, MediaEvent, MediaSurface, SimulatedSurface};
pub use player::{PlayerConfig, PlayerController, PlayerDriver, PlayerHandle, PlayerMode, PlayerSnapshot};
pub use utils::{Config, DockError, Result};

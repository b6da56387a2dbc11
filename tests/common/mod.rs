//! Shared fixtures for integration tests

#![allow(dead_code)]

use dockplayer::catalog::{Catalog, MediaType, VideoItem};
use std::path::PathBuf;
use tempfile::TempDir;

pub const CATALOG_TOML: &str = r#"
[[videos]]
slug = "intro"
title = "Intro"
channel_name = "Dock Studio"
category_slug = "music"
media_url = "https://media.example/intro.mp4"
media_type = "FILE"
duration_seconds = 2.0
thumbnail_url = "https://media.example/intro.jpg"

[[videos]]
slug = "second"
title = "Second Song"
channel_name = "Dock Studio"
category_slug = "music"
media_url = "https://media.example/second/master.m3u8"
media_type = "FILE"
duration_seconds = 60.0
thumbnail_url = "https://media.example/second.jpg"
views = 1200

[[videos]]
slug = "third"
title = "Third Song"
channel_name = "Other Channel"
category_slug = "music"
media_url = "dQw4w9WgXcQ"
media_type = "YOUTUBE"
duration_seconds = 212.0
thumbnail_url = "https://media.example/third.jpg"

[[videos]]
slug = "bulletin"
title = "Evening Bulletin"
channel_name = "News Desk"
category_slug = "news"
media_url = "https://media.example/bulletin.mp4"
media_type = "FILE"
duration_seconds = 30.0
thumbnail_url = "https://media.example/bulletin.jpg"
"#;

/// A catalog written to a temporary directory
pub struct CatalogFixture {
    pub dir: TempDir,
    pub path: PathBuf,
    pub catalog: Catalog,
}

impl CatalogFixture {
    pub fn new() -> anyhow::Result<Self> {
        let dir = TempDir::new()?;
        let path = dir.path().join("catalog.toml");
        std::fs::write(&path, CATALOG_TOML)?;
        let catalog = Catalog::load(&path)?;

        Ok(Self { dir, path, catalog })
    }

    pub fn video(&self, slug: &str) -> VideoItem {
        self.catalog
            .find(slug)
            .cloned()
            .unwrap_or_else(|| panic!("fixture has no '{}'", slug))
    }

    /// Write an extra file next to the catalog
    pub fn write(&self, name: &str, contents: &str) -> anyhow::Result<PathBuf> {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents)?;
        Ok(path)
    }
}

/// Standalone item for tests that do not need a catalog
pub fn video(slug: &str, category: &str) -> VideoItem {
    VideoItem {
        slug: slug.to_string(),
        title: format!("Video {}", slug),
        channel_name: "Test Channel".to_string(),
        category_slug: category.to_string(),
        media_url: format!("https://media.example/{}.mp4", slug),
        media_type: MediaType::File,
        duration_seconds: 120.0,
        thumbnail_url: format!("https://media.example/{}.jpg", slug),
        views: None,
        uploaded_at: None,
        channel_avatar_url: None,
    }
}

//! Video catalog and the related-queue collaborator
//!
//! The player core only reads [`VideoItem`]s. The ordered list it advances
//! through comes from a [`RelatedSource`]; [`Catalog`] is an in-memory
//! implementation backed by a TOML file.

use crate::utils::error::{DockError, IntoDockError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// How a video's media is delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaType {
    /// Embedded platform stream
    Youtube,

    /// Direct file or segmented (HLS) stream
    File,
}

/// A single catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoItem {
    /// Unique identifier
    pub slug: String,

    pub title: String,

    pub channel_name: String,

    pub category_slug: String,

    pub media_url: String,

    pub media_type: MediaType,

    /// Nominal duration; the media surface may report a different one
    pub duration_seconds: f64,

    pub thumbnail_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_avatar_url: Option<String>,
}

impl VideoItem {
    /// Whether two items refer to the same video
    pub fn same_as(&self, other: &VideoItem) -> bool {
        self.slug == other.slug
    }
}

/// Supplies the ordered related list for a category
pub trait RelatedSource: Send + Sync {
    /// Return the videos of a category in display order
    ///
    /// No item is excluded; callers filter out the current video.
    fn related(&self, category_slug: &str) -> Vec<VideoItem>;
}

/// In-memory catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    videos: Vec<VideoItem>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate slugs
    pub fn new(videos: Vec<VideoItem>) -> Result<Self> {
        let mut seen = HashSet::new();
        for video in &videos {
            if !seen.insert(video.slug.as_str()) {
                return Err(DockError::Catalog(format!("duplicate slug '{}'", video.slug)));
            }
        }
        Ok(Self { videos })
    }

    /// Load a catalog from a TOML file with `[[videos]]` entries
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse a catalog from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let parsed: Catalog = toml::from_str(contents).catalog_err("Failed to parse catalog")?;
        let catalog = Self::new(parsed.videos)?;
        log::debug!("Loaded catalog with {} videos", catalog.len());
        Ok(catalog)
    }

    /// Find a video by slug
    pub fn find(&self, slug: &str) -> Option<&VideoItem> {
        self.videos.iter().find(|v| v.slug == slug)
    }

    /// All videos in catalog order
    pub fn videos(&self) -> &[VideoItem] {
        &self.videos
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }
}

impl RelatedSource for Catalog {
    fn related(&self, category_slug: &str) -> Vec<VideoItem> {
        self.videos
            .iter()
            .filter(|v| v.category_slug == category_slug)
            .cloned()
            .collect()
    }
}

/// Related list for `current`: its category, itself excluded, at most `limit` entries
pub fn related_for(source: &dyn RelatedSource, current: &VideoItem, limit: usize) -> Vec<VideoItem> {
    source
        .related(&current.category_slug)
        .into_iter()
        .filter(|v| !v.same_as(current))
        .take(limit)
        .collect()
}

/// Autoplay candidate for `current`: the first related entry
pub fn next_candidate(source: &dyn RelatedSource, current: &VideoItem) -> Option<VideoItem> {
    related_for(source, current, 1).into_iter().next()
}


#[cfg(test)]
mod tests {
    use super::fixtures::{catalog, video};
    use super::*;

    #[test]
    fn test_duplicate_slugs_rejected() {
        let result = Catalog::new(vec![video("x", "music"), video("x", "news")]);
        assert!(matches!(result, Err(DockError::Catalog(_))));
    }

    #[test]
    fn test_related_keeps_order_and_excludes_current() {
        let catalog = catalog();
        let current = catalog.find("a2").unwrap().clone();

        let related = related_for(&catalog, &current, 15);
        let slugs: Vec<&str> = related.iter().map(|v| v.slug.as_str()).collect();
        assert_eq!(slugs, vec!["a1", "a3"]);

        assert_eq!(next_candidate(&catalog, &current).unwrap().slug, "a1");
    }

    #[test]
    fn test_related_limit() {
        let catalog = catalog();
        let current = catalog.find("a1").unwrap().clone();
        assert_eq!(related_for(&catalog, &current, 1).len(), 1);
    }

    #[test]
    fn test_no_candidate_for_single_item_category() {
        let catalog = catalog();
        let current = catalog.find("b1").unwrap().clone();
        assert!(next_candidate(&catalog, &current).is_none());
    }

    #[test]
    fn test_from_toml() {
        let catalog = Catalog::from_toml(
            r#"
            [[videos]]
            slug = "intro"
            title = "Intro"
            channel_name = "Dock"
            category_slug = "tutorials"
            media_url = "https://cdn.example/intro/master.m3u8"
            media_type = "FILE"
            duration_seconds = 95.0
            thumbnail_url = "https://cdn.example/intro.jpg"
            views = 1200

            [[videos]]
            slug = "talk"
            title = "Talk"
            channel_name = "Dock"
            category_slug = "tutorials"
            media_url = "https://www.youtube.com/watch?v=abc"
            media_type = "YOUTUBE"
            duration_seconds = 600.0
            thumbnail_url = "https://cdn.example/talk.jpg"
            "#,
        )
        .unwrap();

        assert_eq!(catalog.len(), 2);
        let talk = catalog.find("talk").unwrap();
        assert_eq!(talk.media_type, MediaType::Youtube);
        assert_eq!(catalog.find("intro").unwrap().views, Some(1200));
    }
}

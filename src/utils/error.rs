//! Error types for DockPlayer
//!
//! This module defines the error type used by the library. Player
//! operations themselves never fail; errors come from loading
//! configuration and catalogs, from the media surface, and from the
//! driver channel.

use thiserror::Error;

/// Main error type for DockPlayer
#[derive(Error, Debug)]
pub enum DockError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("File error: {0}")]
    FileIO(#[from] std::io::Error),

    /// Catalog loading or lookup errors
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Media surface errors
    #[error("Media error: {0}")]
    Media(String),

    /// Invalid input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The player driver is no longer running
    #[error("Player channel closed")]
    ChannelClosed,

    /// Generic error for unexpected situations
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DockError {
    /// Create a media error from string
    pub fn media_error<S: Into<String>>(msg: S) -> Self {
        DockError::Media(msg.into())
    }
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for DockError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        DockError::ChannelClosed
    }
}

/// Convenience type alias for Results in DockPlayer
pub type Result<T> = std::result::Result<T, DockError>;

/// Extension trait for converting other errors to DockError
pub trait IntoDockError<T> {
    /// Convert this error into a DockError with the given context
    fn config_err(self, context: &str) -> Result<T>;
    fn catalog_err(self, context: &str) -> Result<T>;
    fn media_err(self, context: &str) -> Result<T>;
}

impl<T, E: std::fmt::Display> IntoDockError<T> for std::result::Result<T, E> {
    fn config_err(self, context: &str) -> Result<T> {
        self.map_err(|e| DockError::Config(format!("{}: {}", context, e)))
    }

    fn catalog_err(self, context: &str) -> Result<T> {
        self.map_err(|e| DockError::Catalog(format!("{}: {}", context, e)))
    }

    fn media_err(self, context: &str) -> Result<T> {
        self.map_err(|e| DockError::Media(format!("{}: {}", context, e)))
    }
}

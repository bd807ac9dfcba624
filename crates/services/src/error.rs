//! Shared error types for the services crate.

use thiserror::Error;

use course_core::model::PlaybackSettingsError;
use storage::repository::StorageError;

/// Why a narration did not complete normally.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NarrationError {
    #[error("speech synthesis is not supported")]
    Unsupported,
    #[error("narration was cancelled")]
    Cancelled,
    #[error("narration failed: {0}")]
    Failed(String),
}

/// Errors reported by background music backends.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AudioError {
    #[error("background music is unavailable")]
    Unavailable,
    #[error("audio backend error: {0}")]
    Backend(String),
}

/// Errors emitted by the playback controller.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PlaybackError {
    #[error("playback needs a running tokio runtime")]
    NoRuntime,
    #[error(transparent)]
    Settings(#[from] PlaybackSettingsError),
}

/// Errors emitted by `PlaybackSettingsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SettingsServiceError {
    #[error(transparent)]
    Settings(#[from] PlaybackSettingsError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use course_core::model::{LessonId, PlaybackSettings};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted completion marker for one lesson.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressRecord {
    pub lesson_id: LessonId,
    pub completed_at: DateTime<Utc>,
}

/// Repository contract for lesson completion.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Mark a lesson complete.
    ///
    /// Idempotent: marking an already-complete lesson succeeds and keeps the
    /// original completion time.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the marker cannot be stored.
    async fn mark_complete(&self, lesson_id: &LessonId) -> Result<(), StorageError>;

    /// Whether a lesson has been marked complete.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the lookup fails.
    async fn is_complete(&self, lesson_id: &LessonId) -> Result<bool, StorageError>;

    /// All completion markers, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn completed_lessons(&self) -> Result<Vec<ProgressRecord>, StorageError>;
}

/// Repository contract for the listener's saved playback preferences.
#[async_trait]
pub trait PlaybackSettingsRepository: Send + Sync {
    /// Fetch saved settings, if any were ever stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the lookup fails or stored values are invalid.
    async fn get_settings(&self) -> Result<Option<PlaybackSettings>, StorageError>;

    /// Replace the saved settings.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the settings cannot be stored.
    async fn save_settings(&self, settings: &PlaybackSettings) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    progress: Arc<Mutex<HashMap<LessonId, DateTime<Utc>>>>,
    settings: Arc<Mutex<Option<PlaybackSettings>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            progress: Arc::new(Mutex::new(HashMap::new())),
            settings: Arc::new(Mutex::new(None)),
        }
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn mark_complete(&self, lesson_id: &LessonId) -> Result<(), StorageError> {
        let mut guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.entry(lesson_id.clone()).or_insert_with(Utc::now);
        Ok(())
    }

    async fn is_complete(&self, lesson_id: &LessonId) -> Result<bool, StorageError> {
        let guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.contains_key(lesson_id))
    }

    async fn completed_lessons(&self) -> Result<Vec<ProgressRecord>, StorageError> {
        let guard = self
            .progress
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut records: Vec<ProgressRecord> = guard
            .iter()
            .map(|(lesson_id, completed_at)| ProgressRecord {
                lesson_id: lesson_id.clone(),
                completed_at: *completed_at,
            })
            .collect();
        records.sort_by(|a, b| {
            a.completed_at
                .cmp(&b.completed_at)
                .then_with(|| a.lesson_id.cmp(&b.lesson_id))
        });
        Ok(records)
    }
}

#[async_trait]
impl PlaybackSettingsRepository for InMemoryRepository {
    async fn get_settings(&self) -> Result<Option<PlaybackSettings>, StorageError> {
        let guard = self
            .settings
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn save_settings(&self, settings: &PlaybackSettings) -> Result<(), StorageError> {
        let mut guard = self
            .settings
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(settings.clone());
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
    pub settings: Arc<dyn PlaybackSettingsRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo.clone());
        let settings: Arc<dyn PlaybackSettingsRepository> = Arc::new(repo);
        Self { progress, settings }
    }
}

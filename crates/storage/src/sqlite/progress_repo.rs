use async_trait::async_trait;
use chrono::Utc;
use course_core::model::LessonId;

use crate::repository::{ProgressRecord, ProgressRepository, StorageError};

use super::SqliteRepository;
use super::mapping::map_progress_row;

#[async_trait]
impl ProgressRepository for SqliteRepository {
    async fn mark_complete(&self, lesson_id: &LessonId) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO lesson_progress (lesson_id, completed_at)
            VALUES (?1, ?2)
            ON CONFLICT(lesson_id) DO NOTHING
            ",
        )
        .bind(lesson_id.as_str())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;
        Ok(())
    }

    async fn is_complete(&self, lesson_id: &LessonId) -> Result<bool, StorageError> {
        let row = sqlx::query("SELECT 1 FROM lesson_progress WHERE lesson_id = ?1")
            .bind(lesson_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;
        Ok(row.is_some())
    }

    async fn completed_lessons(&self) -> Result<Vec<ProgressRecord>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT lesson_id, completed_at
            FROM lesson_progress
            ORDER BY completed_at ASC, lesson_id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        rows.iter().map(map_progress_row).collect()
    }
}

use async_trait::async_trait;
use course_core::model::PlaybackSettings;

use crate::repository::{PlaybackSettingsRepository, StorageError};

use super::SqliteRepository;
use super::mapping::map_settings_row;

#[async_trait]
impl PlaybackSettingsRepository for SqliteRepository {
    async fn get_settings(&self) -> Result<Option<PlaybackSettings>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT
                voice,
                rate,
                music_enabled,
                music_volume,
                auto_advance_delay_ms
            FROM playback_settings
            WHERE id = 1
            ",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        row.as_ref().map(map_settings_row).transpose()
    }

    async fn save_settings(&self, settings: &PlaybackSettings) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO playback_settings (
                id,
                voice,
                rate,
                music_enabled,
                music_volume,
                auto_advance_delay_ms
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                voice = excluded.voice,
                rate = excluded.rate,
                music_enabled = excluded.music_enabled,
                music_volume = excluded.music_volume,
                auto_advance_delay_ms = excluded.auto_advance_delay_ms
            ",
        )
        .bind(1_i64)
        .bind(settings.voice().as_str())
        .bind(f64::from(settings.rate()))
        .bind(settings.music_enabled())
        .bind(f64::from(settings.music_volume()))
        .bind(i64::from(settings.auto_advance_delay_ms()))
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }
}

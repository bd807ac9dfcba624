use course_core::model::{LessonId, PlaybackSettings, PlaybackSettingsDraft, Voice};
use sqlx::Row;

use crate::repository::{ProgressRecord, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn map_progress_row(row: &sqlx::sqlite::SqliteRow) -> Result<ProgressRecord, StorageError> {
    let lesson_id: String = row.try_get("lesson_id").map_err(ser)?;
    Ok(ProgressRecord {
        lesson_id: LessonId::new(lesson_id).map_err(ser)?,
        completed_at: row.try_get("completed_at").map_err(ser)?,
    })
}

pub(crate) fn map_settings_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<PlaybackSettings, StorageError> {
    let voice: String = row.try_get("voice").map_err(ser)?;
    let rate: f64 = row.try_get("rate").map_err(ser)?;
    let music_enabled: bool = row.try_get("music_enabled").map_err(ser)?;
    let music_volume: f64 = row.try_get("music_volume").map_err(ser)?;
    let delay_ms: i64 = row.try_get("auto_advance_delay_ms").map_err(ser)?;

    #[allow(clippy::cast_possible_truncation)]
    let draft = PlaybackSettingsDraft {
        voice: voice.parse::<Voice>().map_err(ser)?,
        rate: rate as f32,
        music_enabled,
        music_volume: music_volume as f32,
        auto_advance_delay_ms: u32::try_from(delay_ms)
            .map_err(|_| StorageError::Serialization(format!("delay out of range: {delay_ms}")))?,
    };
    PlaybackSettings::from_persisted(draft).map_err(ser)
}

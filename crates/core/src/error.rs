use thiserror::Error;

use crate::model::{LessonError, ParseIdError, PlaybackSettingsError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Lesson(#[from] LessonError),
    #[error(transparent)]
    Settings(#[from] PlaybackSettingsError),
    #[error(transparent)]
    Id(#[from] ParseIdError),
}

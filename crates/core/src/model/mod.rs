mod ids;
mod lesson;
mod settings;
mod slide;

pub use ids::{LessonId, ParseIdError, TopicId};
pub use lesson::{Lesson, LessonError, Topic};
pub use settings::{
    MAX_AUTO_ADVANCE_MS, MAX_RATE, MIN_RATE, NARRATION_FALLBACK_DELAY, PlaybackSettings,
    PlaybackSettingsDraft, PlaybackSettingsError, Voice, validate_auto_advance_delay,
    validate_music_volume, validate_rate,
};
pub use slide::Slide;

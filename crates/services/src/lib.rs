#![forbid(unsafe_code)]

pub mod error;
pub mod playback;
pub mod settings_service;

pub use error::{AudioError, NarrationError, PlaybackError, SettingsServiceError};
pub use playback::{
    AudioService, KeyOutcome, NarrationOptions, NarrationService, PlaybackController,
    PlaybackKey, PlaybackPhase, PlaybackSession, PlaybackSnapshot, VolumeFader, VolumeSink,
    handle_key,
};
pub use settings_service::PlaybackSettingsService;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum PlaybackSettingsError {
    #[error("speech rate must be between 0.5 and 2.0 (got {0})")]
    InvalidRate(f32),

    #[error("music volume must be between 0 and 1 (got {0})")]
    InvalidMusicVolume(f32),

    #[error("auto-advance delay must be at most 60000 ms (got {0})")]
    InvalidAutoAdvanceDelay(u32),

    #[error("unknown voice: {0}")]
    UnknownVoice(String),
}

//
// ─── VOICE ─────────────────────────────────────────────────────────────────────
//

/// Which of the two narrator voices reads the slides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Voice {
    #[default]
    Primary,
    Alternate,
}

impl Voice {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Voice::Primary => "primary",
            Voice::Alternate => "alternate",
        }
    }

    /// The other voice; used by the "switch voice" control.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Voice::Primary => Voice::Alternate,
            Voice::Alternate => Voice::Primary,
        }
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Voice {
    type Err = PlaybackSettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "primary" | "a" => Ok(Voice::Primary),
            "alternate" | "b" => Ok(Voice::Alternate),
            other => Err(PlaybackSettingsError::UnknownVoice(other.to_string())),
        }
    }
}

//
// ─── SETTINGS ──────────────────────────────────────────────────────────────────
//

pub const MIN_RATE: f32 = 0.5;
pub const MAX_RATE: f32 = 2.0;
pub const MAX_AUTO_ADVANCE_MS: u32 = 60_000;

/// Delay used instead of the configured one when narration fails or is unavailable.
pub const NARRATION_FALLBACK_DELAY: Duration = Duration::from_secs(2);

/// Listener preferences applied to a playback session when it starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSettings {
    voice: Voice,
    rate: f32,
    music_enabled: bool,
    music_volume: f32,
    auto_advance_delay_ms: u32,
}

/// Unvalidated settings as they arrive from storage, flags or a settings form.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSettingsDraft {
    pub voice: Voice,
    pub rate: f32,
    pub music_enabled: bool,
    pub music_volume: f32,
    pub auto_advance_delay_ms: u32,
}

impl Default for PlaybackSettingsDraft {
    fn default() -> Self {
        Self {
            voice: Voice::Primary,
            rate: 1.0,
            music_enabled: false,
            music_volume: 0.3,
            auto_advance_delay_ms: 1_500,
        }
    }
}

impl PlaybackSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the draft into settings.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackSettingsError` for an out-of-range rate, volume or delay.
    pub fn validate(self) -> Result<PlaybackSettings, PlaybackSettingsError> {
        Ok(PlaybackSettings {
            voice: self.voice,
            rate: validate_rate(self.rate)?,
            music_enabled: self.music_enabled,
            music_volume: validate_music_volume(self.music_volume)?,
            auto_advance_delay_ms: validate_auto_advance_delay(self.auto_advance_delay_ms)?,
        })
    }
}

/// Checks a speech rate.
///
/// # Errors
///
/// Returns `PlaybackSettingsError::InvalidRate` outside `[MIN_RATE, MAX_RATE]`.
pub fn validate_rate(rate: f32) -> Result<f32, PlaybackSettingsError> {
    if rate.is_finite() && (MIN_RATE..=MAX_RATE).contains(&rate) {
        Ok(rate)
    } else {
        Err(PlaybackSettingsError::InvalidRate(rate))
    }
}

/// Checks a music volume.
///
/// # Errors
///
/// Returns `PlaybackSettingsError::InvalidMusicVolume` outside `[0, 1]`.
pub fn validate_music_volume(volume: f32) -> Result<f32, PlaybackSettingsError> {
    if volume.is_finite() && (0.0..=1.0).contains(&volume) {
        Ok(volume)
    } else {
        Err(PlaybackSettingsError::InvalidMusicVolume(volume))
    }
}

/// Checks an auto-advance delay in milliseconds.
///
/// # Errors
///
/// Returns `PlaybackSettingsError::InvalidAutoAdvanceDelay` above `MAX_AUTO_ADVANCE_MS`.
pub fn validate_auto_advance_delay(delay_ms: u32) -> Result<u32, PlaybackSettingsError> {
    if delay_ms <= MAX_AUTO_ADVANCE_MS {
        Ok(delay_ms)
    } else {
        Err(PlaybackSettingsError::InvalidAutoAdvanceDelay(delay_ms))
    }
}

impl PlaybackSettings {
    /// Rehydrate settings from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackSettingsError` if stored values are out of range.
    pub fn from_persisted(draft: PlaybackSettingsDraft) -> Result<Self, PlaybackSettingsError> {
        draft.validate()
    }

    #[must_use]
    pub fn to_draft(&self) -> PlaybackSettingsDraft {
        PlaybackSettingsDraft {
            voice: self.voice,
            rate: self.rate,
            music_enabled: self.music_enabled,
            music_volume: self.music_volume,
            auto_advance_delay_ms: self.auto_advance_delay_ms,
        }
    }

    #[must_use]
    pub fn voice(&self) -> Voice {
        self.voice
    }

    #[must_use]
    pub fn rate(&self) -> f32 {
        self.rate
    }

    #[must_use]
    pub fn music_enabled(&self) -> bool {
        self.music_enabled
    }

    #[must_use]
    pub fn music_volume(&self) -> f32 {
        self.music_volume
    }

    #[must_use]
    pub fn auto_advance_delay_ms(&self) -> u32 {
        self.auto_advance_delay_ms
    }

    #[must_use]
    pub fn auto_advance_delay(&self) -> Duration {
        Duration::from_millis(u64::from(self.auto_advance_delay_ms))
    }
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        let draft = PlaybackSettingsDraft::default();
        Self {
            voice: draft.voice,
            rate: draft.rate,
            music_enabled: draft.music_enabled,
            music_volume: draft.music_volume,
            auto_advance_delay_ms: draft.auto_advance_delay_ms,
        }
    }
}

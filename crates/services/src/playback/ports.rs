//! Collaborators the engine drives but does not implement.

use std::time::Duration;

use async_trait::async_trait;
use course_core::model::Voice;

use crate::error::{AudioError, NarrationError};

/// Voice parameters for one utterance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NarrationOptions {
    pub voice: Voice,
    pub rate: f32,
}

/// Speech synthesis backend.
///
/// `speak` may not be truly abortable; the engine only relies on `cancel`
/// being a best-effort request and ignores results it no longer wants.
#[async_trait]
pub trait NarrationService: Send + Sync {
    /// Speak `text`, settling when the utterance ends or fails.
    ///
    /// # Errors
    ///
    /// Returns `NarrationError` if synthesis fails or is interrupted.
    async fn speak(&self, text: &str, options: NarrationOptions) -> Result<(), NarrationError>;

    /// Request cancellation of any in-flight utterance.
    ///
    /// Must be idempotent and must not call back into the playback controller.
    fn cancel(&self);

    fn is_speaking(&self) -> bool;

    /// Capability flag, queried once when a session is built.
    fn is_supported(&self) -> bool;
}

/// Background music player.
pub trait AudioService: Send + Sync {
    /// # Errors
    ///
    /// Returns `AudioError` if playback cannot start.
    fn play(&self) -> Result<(), AudioError>;

    /// # Errors
    ///
    /// Returns `AudioError` if playback cannot be paused.
    fn pause(&self) -> Result<(), AudioError>;

    /// Fade up to `volume` over `duration`, replacing any running fade.
    ///
    /// # Errors
    ///
    /// Returns `AudioError` if the fade cannot be started.
    fn fade_in(&self, volume: f32, duration: Duration) -> Result<(), AudioError>;

    /// Fade down to silence over `duration`, replacing any running fade.
    ///
    /// # Errors
    ///
    /// Returns `AudioError` if the fade cannot be started.
    fn fade_out(&self, duration: Duration) -> Result<(), AudioError>;
}

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use course_core::model::{
    LessonId, NARRATION_FALLBACK_DELAY, PlaybackSettings, Slide, Voice, validate_auto_advance_delay,
    validate_music_volume, validate_rate,
};
use storage::repository::{ProgressRepository, StorageError};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use super::completion::CompletionReporter;
use super::ducking::AudioDucker;
use super::ports::{AudioService, NarrationService};
use super::session::{PlaybackPhase, PlaybackSession, PlaybackSnapshot};
use crate::error::PlaybackError;

/// Everything guarded by the session lock.
///
/// Narration results and timer callbacks re-check the generation while holding
/// this lock, so once `cancel_pending` returns nothing from an older generation
/// can touch it.
pub(crate) struct EngineState {
    pub(crate) session: PlaybackSession,
    pub(crate) phase: PlaybackPhase,
    pub(crate) ducker: AudioDucker,
    pub(crate) narration_task: Option<JoinHandle<()>>,
    pub(crate) advance_timer: Option<JoinHandle<()>>,
}

pub(crate) struct PlaybackEngine {
    state: Mutex<EngineState>,
    pub(crate) narrator: Arc<dyn NarrationService>,
    pub(crate) reporter: CompletionReporter,
    pub(crate) runtime: Handle,
    pub(crate) narration_supported: bool,
    pub(crate) fallback_delay: Duration,
}

impl PlaybackEngine {
    pub(crate) fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Builds a `PlaybackController` for one playback view.
pub struct PlaybackBuilder {
    sequence: Vec<Slide>,
    settings: PlaybackSettings,
    narrator: Arc<dyn NarrationService>,
    progress: Arc<dyn ProgressRepository>,
    audio: Option<Arc<dyn AudioService>>,
    fallback_delay: Duration,
}

impl PlaybackBuilder {
    #[must_use]
    pub fn with_settings(mut self, settings: PlaybackSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn with_audio(mut self, audio: Arc<dyn AudioService>) -> Self {
        self.audio = Some(audio);
        self
    }

    /// Overrides the delay used after a failed or unsupported narration.
    #[must_use]
    pub fn with_fallback_delay(mut self, delay: Duration) -> Self {
        self.fallback_delay = delay;
        self
    }

    /// Create the session and its controller.
    ///
    /// Narration support is queried here, once.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::NoRuntime` when called outside a Tokio runtime.
    pub fn build(self) -> Result<PlaybackController, PlaybackError> {
        let runtime = Handle::try_current().map_err(|_| PlaybackError::NoRuntime)?;
        let narration_supported = self.narrator.is_supported();
        if !narration_supported {
            log::warn!(
                "speech synthesis unavailable; slides will advance every {:?}",
                self.fallback_delay
            );
        }

        let ducker = AudioDucker::new(self.audio, self.settings.music_enabled());
        let session = PlaybackSession::new(self.sequence, &self.settings);
        log::debug!("playback session created with {} slides", session.len());

        let engine = PlaybackEngine {
            state: Mutex::new(EngineState {
                session,
                phase: PlaybackPhase::Idle,
                ducker,
                narration_task: None,
                advance_timer: None,
            }),
            narrator: self.narrator,
            reporter: CompletionReporter::new(self.progress, runtime.clone()),
            runtime,
            narration_supported,
            fallback_delay: self.fallback_delay,
        };
        Ok(PlaybackController {
            engine: Arc::new(engine),
        })
    }
}

/// Handle to one playback session, shared with UI bindings.
///
/// Clones refer to the same session; separate `build` calls give fully
/// independent sessions. All methods must be called from within the Tokio
/// runtime the session was built on (or any thread while it is running).
#[derive(Clone)]
pub struct PlaybackController {
    engine: Arc<PlaybackEngine>,
}

impl PlaybackController {
    #[must_use]
    pub fn builder(
        sequence: Vec<Slide>,
        narrator: Arc<dyn NarrationService>,
        progress: Arc<dyn ProgressRepository>,
    ) -> PlaybackBuilder {
        PlaybackBuilder {
            sequence,
            settings: PlaybackSettings::default(),
            narrator,
            progress,
            audio: None,
            fallback_delay: NARRATION_FALLBACK_DELAY,
        }
    }

    // ─── Navigation ────────────────────────────────────────────────────────────

    /// Start or resume. No-op when already playing or when there are no slides.
    pub fn play(&self) {
        let mut state = self.engine.lock();
        if !state.session.is_playing() {
            self.engine.toggle_locked(&mut state);
        }
    }

    /// Pause if playing.
    pub fn pause(&self) {
        let mut state = self.engine.lock();
        if state.session.is_playing() {
            self.engine.toggle_locked(&mut state);
        }
    }

    pub fn toggle_play_pause(&self) {
        let mut state = self.engine.lock();
        self.engine.toggle_locked(&mut state);
    }

    pub fn next(&self) {
        let mut state = self.engine.lock();
        self.engine.next_locked(&mut state);
    }

    pub fn previous(&self) {
        let mut state = self.engine.lock();
        self.engine.previous_locked(&mut state);
    }

    /// Move to `index`, clamped into the sequence.
    pub fn jump_to(&self, index: usize) {
        let mut state = self.engine.lock();
        self.engine.jump_to_locked(&mut state, index);
    }

    /// Rewind to the first slide and play.
    pub fn restart(&self) {
        let mut state = self.engine.lock();
        self.engine.restart_locked(&mut state);
    }

    /// Cancel narration and timers and stop playing. Safe to call repeatedly.
    pub fn stop(&self) {
        let mut state = self.engine.lock();
        self.engine.stop_locked(&mut state);
    }

    /// Tear the session down when its view is left.
    pub fn shutdown(&self) {
        let mut state = self.engine.lock();
        self.engine.stop_locked(&mut state);
        state.ducker.stop_music();
        log::debug!("playback session shut down");
    }

    // ─── Settings ──────────────────────────────────────────────────────────────

    /// Takes effect from the next narration.
    pub fn set_voice(&self, voice: Voice) {
        self.engine.lock().session.set_voice(voice);
    }

    /// Takes effect from the next narration.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::Settings` if the rate is out of range.
    pub fn set_rate(&self, rate: f32) -> Result<(), PlaybackError> {
        let rate = validate_rate(rate)?;
        self.engine.lock().session.set_rate(rate);
        Ok(())
    }

    /// Switching music off pauses the track at once; switching it on while
    /// playing starts it (already ducked if a narration is speaking).
    pub fn set_music_enabled(&self, enabled: bool) {
        let mut state = self.engine.lock();
        let playing = state.session.is_playing();
        let speaking = state.phase == PlaybackPhase::Speaking;
        let volume = state.session.music_volume();
        state.session.set_music_enabled(enabled);
        state.ducker.set_enabled(enabled, playing, speaking, volume);
    }

    /// # Errors
    ///
    /// Returns `PlaybackError::Settings` if the volume is outside `[0, 1]`.
    pub fn set_music_volume(&self, volume: f32) -> Result<(), PlaybackError> {
        let volume = validate_music_volume(volume)?;
        let mut state = self.engine.lock();
        state.session.set_music_volume(volume);
        state.ducker.adjust_volume(volume);
        Ok(())
    }

    /// Applies to the next auto-advance that gets scheduled.
    ///
    /// # Errors
    ///
    /// Returns `PlaybackError::Settings` if the delay exceeds the allowed maximum.
    pub fn set_auto_advance_delay(&self, delay: Duration) -> Result<(), PlaybackError> {
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        let millis = validate_auto_advance_delay(millis)?;
        self.engine
            .lock()
            .session
            .set_auto_advance_delay(Duration::from_millis(u64::from(millis)));
        Ok(())
    }

    // ─── Queries ───────────────────────────────────────────────────────────────

    #[must_use]
    pub fn snapshot(&self) -> PlaybackSnapshot {
        let narrator_speaking =
            self.engine.narration_supported && self.engine.narrator.is_speaking();
        let state = self.engine.lock();
        let session = &state.session;
        PlaybackSnapshot {
            phase: state.phase,
            current_index: session.current_index(),
            total: session.len(),
            is_playing: session.is_playing(),
            slide_title: session.current_slide().map(|slide| slide.title().to_string()),
            lesson_id: session.current_lesson_id().cloned(),
            generation: session.generation(),
            narration_supported: self.engine.narration_supported,
            narrator_speaking,
            voice: session.voice(),
            rate: session.rate(),
            music_enabled: session.music_enabled(),
        }
    }

    /// Copy of the session as it is right now.
    #[must_use]
    pub fn session(&self) -> PlaybackSession {
        self.engine.lock().session.clone()
    }

    #[must_use]
    pub fn phase(&self) -> PlaybackPhase {
        self.engine.lock().phase
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.engine.lock().session.current_index()
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.engine.lock().session.is_playing()
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.engine.lock().session.generation()
    }

    #[must_use]
    pub fn narration_supported(&self) -> bool {
        self.engine.narration_supported
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the progress store lookup fails.
    pub async fn is_lesson_complete(&self, lesson_id: &LessonId) -> Result<bool, StorageError> {
        self.engine.reporter.is_complete(lesson_id).await
    }
}

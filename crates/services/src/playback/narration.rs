use std::sync::Arc;
use std::time::Duration;

use course_core::model::LessonId;

use super::ducking::{DUCK_FADE, RESTORE_FADE};
use super::engine::{EngineState, PlaybackEngine};
use super::ports::NarrationOptions;
use super::session::PlaybackPhase;
use crate::error::NarrationError;

impl PlaybackEngine {
    /// Narrate the current slide under the current generation.
    ///
    /// Does nothing unless the session is playing and has slides.
    pub(crate) fn speak_current(self: &Arc<Self>, state: &mut EngineState) {
        if !state.session.is_playing() {
            return;
        }
        let Some(slide) = state.session.current_slide().cloned() else {
            return;
        };
        let generation = state.session.generation();
        let options = NarrationOptions {
            voice: state.session.voice(),
            rate: state.session.rate(),
        };

        if state.session.music_enabled() {
            state.ducker.duck(DUCK_FADE);
        }
        state.phase = PlaybackPhase::Speaking;
        log::debug!(
            "narrating slide {} (generation {generation})",
            state.session.current_index()
        );

        let engine = Arc::clone(self);
        let task = self.runtime.spawn(async move {
            // The task may first run after a skip; it must not start speaking then.
            if engine.lock().session.generation() != generation {
                log::debug!("narration for generation {generation} never started");
                return;
            }
            let outcome = if engine.narration_supported {
                engine.narrator.speak(slide.text(), options).await
            } else {
                Err(NarrationError::Unsupported)
            };
            engine.settle_narration(generation, slide.source_lesson_id(), &outcome);
        });
        if let Some(previous) = state.narration_task.replace(task) {
            previous.abort();
        }
    }

    /// Handle a finished narration, unless it belongs to an older generation.
    fn settle_narration(
        self: &Arc<Self>,
        generation: u64,
        lesson_id: &LessonId,
        outcome: &Result<(), NarrationError>,
    ) {
        let mut state = self.lock();
        let current = state.session.generation();
        if current != generation {
            log::debug!("dropping narration result from generation {generation} (now {current})");
            return;
        }

        // This task is the running narration; nothing left to abort.
        state.narration_task = None;
        let delay = match outcome {
            Ok(()) => state.session.auto_advance_delay(),
            Err(NarrationError::Unsupported) => self.fallback_delay,
            Err(err) => {
                log::warn!("narration failed, advancing after {:?}: {err}", self.fallback_delay);
                self.fallback_delay
            }
        };

        // Lessons are credited on any settle, including failures.
        self.reporter.report_visited(lesson_id.clone());
        if state.session.music_enabled() && state.ducker.is_ducked() {
            let volume = state.session.music_volume();
            state.ducker.restore(volume, RESTORE_FADE);
        }
        state.phase = PlaybackPhase::WaitingToAdvance;
        self.schedule_advance(&mut state, generation, delay);
    }

    fn schedule_advance(self: &Arc<Self>, state: &mut EngineState, generation: u64, delay: Duration) {
        let engine = Arc::clone(self);
        let timer = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            engine.fire_advance(generation);
        });
        if let Some(previous) = state.advance_timer.replace(timer) {
            previous.abort();
        }
    }

    fn fire_advance(self: &Arc<Self>, generation: u64) {
        let mut state = self.lock();
        if state.session.generation() != generation || !state.session.is_playing() {
            log::debug!("dropping auto-advance from generation {generation}");
            return;
        }
        // This task is the pending timer; nothing left to abort.
        state.advance_timer = None;
        self.next_locked(&mut state);
    }

    /// Invalidate in-flight narration and any pending auto-advance.
    ///
    /// Bumps the generation, asks the narrator to cancel, aborts the narration
    /// task and the timer, and lifts an outstanding duck. Idempotent apart from
    /// the generation count.
    pub(crate) fn cancel_pending(&self, state: &mut EngineState) -> u64 {
        let generation = state.session.bump_generation();
        if self.narration_supported {
            self.narrator.cancel();
        }
        // Dropping the task also drops a `speak` future that has not settled.
        if let Some(task) = state.narration_task.take() {
            task.abort();
        }
        if let Some(timer) = state.advance_timer.take() {
            timer.abort();
        }
        if state.ducker.is_ducked() {
            let volume = state.session.music_volume();
            state.ducker.restore(volume, RESTORE_FADE);
        }
        generation
    }
}

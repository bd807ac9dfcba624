use std::sync::Arc;

use super::engine::{EngineState, PlaybackEngine};
use super::session::PlaybackPhase;

// Every entry point here cancels pending work before it touches the position
// or the play flag.
impl PlaybackEngine {
    pub(crate) fn next_locked(self: &Arc<Self>, state: &mut EngineState) {
        self.cancel_pending(state);
        let Some(last) = state.session.last_index() else {
            return;
        };
        let index = state.session.current_index();
        if index >= last {
            state.session.set_playing(false);
            state.phase = PlaybackPhase::Finished;
            log::debug!("reached the last slide; playback finished");
            return;
        }
        state.session.set_current_index(index + 1);
        self.continue_at_position(state);
    }

    pub(crate) fn previous_locked(self: &Arc<Self>, state: &mut EngineState) {
        self.cancel_pending(state);
        if state.session.is_empty() {
            return;
        }
        let index = state.session.current_index().saturating_sub(1);
        state.session.set_current_index(index);
        self.continue_at_position(state);
    }

    pub(crate) fn jump_to_locked(self: &Arc<Self>, state: &mut EngineState, index: usize) {
        self.cancel_pending(state);
        if state.session.is_empty() {
            return;
        }
        state.session.set_current_index(index);
        self.continue_at_position(state);
    }

    /// Pause when playing; otherwise play the current slide from its start.
    pub(crate) fn toggle_locked(self: &Arc<Self>, state: &mut EngineState) {
        if state.session.is_playing() {
            self.cancel_pending(state);
            state.session.set_playing(false);
            state.phase = PlaybackPhase::Paused;
            return;
        }
        if state.session.is_empty() {
            return;
        }
        state.session.set_playing(true);
        state.ducker.start();
        self.speak_current(state);
    }

    pub(crate) fn restart_locked(self: &Arc<Self>, state: &mut EngineState) {
        self.cancel_pending(state);
        if state.session.is_empty() {
            return;
        }
        state.session.set_current_index(0);
        state.session.set_playing(true);
        state.ducker.start();
        self.speak_current(state);
    }

    /// Public stop: cancel everything and stop playing. A finished session stays finished.
    pub(crate) fn stop_locked(&self, state: &mut EngineState) {
        self.cancel_pending(state);
        state.session.set_playing(false);
        if state.phase != PlaybackPhase::Finished {
            state.phase = PlaybackPhase::Paused;
        }
    }

    fn continue_at_position(self: &Arc<Self>, state: &mut EngineState) {
        if state.session.is_playing() {
            self.speak_current(state);
        } else if state.phase != PlaybackPhase::Idle {
            state.phase = PlaybackPhase::Paused;
        }
    }
}

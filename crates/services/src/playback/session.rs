use std::time::Duration;

use course_core::model::{LessonId, PlaybackSettings, Slide, Voice};
use serde::Serialize;

/// Where the engine is in its narrate / wait / advance cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackPhase {
    /// Session created, nothing played yet.
    Idle,
    /// A narration for the current slide is in flight.
    Speaking,
    /// Narration settled; the auto-advance timer is pending.
    WaitingToAdvance,
    Paused,
    /// Advanced past the last slide. Not playing.
    Finished,
}

/// Mutable state of one playback view.
///
/// A plain record: every mutation goes through the controllers in this module,
/// which is why the setters are crate-private.
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    sequence: Vec<Slide>,
    current_index: usize,
    is_playing: bool,
    voice: Voice,
    rate: f32,
    music_enabled: bool,
    music_volume: f32,
    auto_advance_delay: Duration,
    generation: u64,
}

impl PlaybackSession {
    #[must_use]
    pub fn new(sequence: Vec<Slide>, settings: &PlaybackSettings) -> Self {
        Self {
            sequence,
            current_index: 0,
            is_playing: false,
            voice: settings.voice(),
            rate: settings.rate(),
            music_enabled: settings.music_enabled(),
            music_volume: settings.music_volume(),
            auto_advance_delay: settings.auto_advance_delay(),
            generation: 0,
        }
    }

    #[must_use]
    pub fn sequence(&self) -> &[Slide] {
        &self.sequence
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    #[must_use]
    pub fn last_index(&self) -> Option<usize> {
        self.sequence.len().checked_sub(1)
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn current_slide(&self) -> Option<&Slide> {
        self.sequence.get(self.current_index)
    }

    #[must_use]
    pub fn current_lesson_id(&self) -> Option<&LessonId> {
        self.current_slide().map(Slide::source_lesson_id)
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.is_playing
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
    pub fn auto_advance_delay(&self) -> Duration {
        self.auto_advance_delay
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Invalidates everything tagged with the current generation.
    pub(crate) fn bump_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Sets the position, clamped into the sequence.
    pub(crate) fn set_current_index(&mut self, index: usize) {
        self.current_index = self.last_index().map_or(0, |last| index.min(last));
    }

    pub(crate) fn set_playing(&mut self, playing: bool) {
        self.is_playing = playing;
    }

    pub(crate) fn set_voice(&mut self, voice: Voice) {
        self.voice = voice;
    }

    pub(crate) fn set_rate(&mut self, rate: f32) {
        self.rate = rate;
    }

    pub(crate) fn set_music_enabled(&mut self, enabled: bool) {
        self.music_enabled = enabled;
    }

    pub(crate) fn set_music_volume(&mut self, volume: f32) {
        self.music_volume = volume;
    }

    pub(crate) fn set_auto_advance_delay(&mut self, delay: Duration) {
        self.auto_advance_delay = delay;
    }
}

/// Read-only view of a session for UI bindings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackSnapshot {
    pub phase: PlaybackPhase,
    pub current_index: usize,
    pub total: usize,
    pub is_playing: bool,
    pub slide_title: Option<String>,
    pub lesson_id: Option<LessonId>,
    pub generation: u64,
    pub narration_supported: bool,
    pub narrator_speaking: bool,
    pub voice: Voice,
    pub rate: f32,
    pub music_enabled: bool,
}

impl PlaybackSnapshot {
    /// Fraction of the sequence reached, counting the current slide.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let ratio = (self.current_index + 1) as f32 / self.total as f32;
        ratio.min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slides(n: usize) -> Vec<Slide> {
        (0..n)
            .map(|i| {
                Slide::new(
                    format!("S{i}"),
                    format!("text {i}"),
                    LessonId::new("lesson").unwrap(),
                )
            })
            .collect()
    }

    #[test]
    fn new_session_starts_at_zero_not_playing() {
        let session = PlaybackSession::new(slides(3), &PlaybackSettings::default());
        assert_eq!(session.current_index(), 0);
        assert!(!session.is_playing());
        assert_eq!(session.generation(), 0);
        assert_eq!(session.current_slide().unwrap().title(), "S0");
    }

    #[test]
    fn bump_generation_increments_by_one() {
        let mut session = PlaybackSession::new(slides(1), &PlaybackSettings::default());
        assert_eq!(session.bump_generation(), 1);
        assert_eq!(session.bump_generation(), 2);
        assert_eq!(session.generation(), 2);
    }

    #[test]
    fn set_current_index_clamps() {
        let mut session = PlaybackSession::new(slides(3), &PlaybackSettings::default());
        session.set_current_index(10);
        assert_eq!(session.current_index(), 2);

        let mut empty = PlaybackSession::new(Vec::new(), &PlaybackSettings::default());
        empty.set_current_index(4);
        assert_eq!(empty.current_index(), 0);
        assert!(empty.current_slide().is_none());
        assert_eq!(empty.last_index(), None);
    }

    #[test]
    fn snapshot_serializes_for_ui_bindings() {
        let snapshot = PlaybackSnapshot {
            phase: PlaybackPhase::WaitingToAdvance,
            current_index: 1,
            total: 4,
            is_playing: true,
            slide_title: Some("S1".into()),
            lesson_id: Some(LessonId::new("lesson").unwrap()),
            generation: 3,
            narration_supported: true,
            narrator_speaking: false,
            voice: Voice::Alternate,
            rate: 1.0,
            music_enabled: false,
        };
        assert_eq!(snapshot.progress(), 0.5);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["phase"], "waiting_to_advance");
        assert_eq!(json["voice"], "alternate");
        assert_eq!(json["lesson_id"], "lesson");
    }
}

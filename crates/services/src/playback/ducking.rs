use std::sync::Arc;
use std::time::Duration;

use super::ports::AudioService;

/// Fade used to pull music down before a narration starts.
pub const DUCK_FADE: Duration = Duration::from_millis(400);
/// Fade used to bring music back once a narration settles.
pub const RESTORE_FADE: Duration = Duration::from_millis(800);

/// Lowers background music while narration plays.
///
/// Ducking is an enhancement only: with music disabled or no audio service
/// attached every call is a no-op, and backend failures are logged and dropped.
/// Overlapping fades are not queued; the audio service replaces the running one.
pub struct AudioDucker {
    audio: Option<Arc<dyn AudioService>>,
    enabled: bool,
    started: bool,
    ducked: bool,
}

impl AudioDucker {
    #[must_use]
    pub fn new(audio: Option<Arc<dyn AudioService>>, enabled: bool) -> Self {
        Self {
            audio,
            enabled,
            started: false,
            ducked: false,
        }
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.audio.is_some()
    }

    /// Music is both enabled and backed by an audio service.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.enabled && self.audio.is_some()
    }

    /// A duck is outstanding and has not been restored yet.
    #[must_use]
    pub fn is_ducked(&self) -> bool {
        self.ducked
    }

    fn active_audio(&self) -> Option<&Arc<dyn AudioService>> {
        if self.enabled { self.audio.as_ref() } else { None }
    }

    /// Starts the music track once per session.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        let Some(audio) = self.active_audio() else {
            return;
        };
        match audio.play() {
            Ok(()) => self.started = true,
            Err(err) => log::debug!("background music did not start: {err}"),
        }
    }

    pub fn duck(&mut self, duration: Duration) {
        let Some(audio) = self.active_audio() else {
            return;
        };
        if let Err(err) = audio.fade_out(duration) {
            log::debug!("music duck failed: {err}");
        }
        self.ducked = true;
    }

    pub fn restore(&mut self, target_volume: f32, duration: Duration) {
        let Some(audio) = self.active_audio() else {
            return;
        };
        if let Err(err) = audio.fade_in(target_volume, duration) {
            log::debug!("music restore failed: {err}");
        }
        self.ducked = false;
    }

    /// Re-applies a new target volume when music is audible.
    pub fn adjust_volume(&mut self, target_volume: f32) {
        if self.ducked || !self.started {
            return;
        }
        if let Some(audio) = self.active_audio() {
            if let Err(err) = audio.fade_in(target_volume, DUCK_FADE) {
                log::debug!("music volume change failed: {err}");
            }
        }
    }

    /// Turns music on or off mid-session.
    ///
    /// Enabling while paused waits for the next `start`; enabling while a
    /// narration is speaking starts the track already ducked.
    pub fn set_enabled(&mut self, enabled: bool, playing: bool, speaking: bool, target_volume: f32) {
        if enabled == self.enabled {
            return;
        }
        self.enabled = enabled;
        if !enabled {
            self.stop_music();
            return;
        }
        if !playing {
            return;
        }
        self.start();
        if speaking {
            self.duck(DUCK_FADE);
        } else if self.started {
            self.restore(target_volume, RESTORE_FADE);
        }
    }

    /// Pauses the track; used on teardown and when music is switched off.
    pub fn stop_music(&mut self) {
        if let Some(audio) = self.audio.as_ref() {
            if self.started {
                if let Err(err) = audio.pause() {
                    log::debug!("music pause failed: {err}");
                }
            }
        }
        self.started = false;
        self.ducked = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AudioError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
        fail: bool,
    }

    impl Recorder {
        fn record(&self, call: String) -> Result<(), AudioError> {
            self.calls.lock().unwrap().push(call);
            if self.fail {
                Err(AudioError::Backend("device lost".into()))
            } else {
                Ok(())
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl AudioService for Recorder {
        fn play(&self) -> Result<(), AudioError> {
            self.record("play".into())
        }

        fn pause(&self) -> Result<(), AudioError> {
            self.record("pause".into())
        }

        fn fade_in(&self, volume: f32, _duration: Duration) -> Result<(), AudioError> {
            self.record(format!("in:{volume}"))
        }

        fn fade_out(&self, _duration: Duration) -> Result<(), AudioError> {
            self.record("out".into())
        }
    }

    #[test]
    fn disabled_music_never_touches_audio() {
        let recorder = Arc::new(Recorder::default());
        let mut ducker = AudioDucker::new(Some(recorder.clone()), false);
        ducker.start();
        ducker.duck(DUCK_FADE);
        ducker.restore(0.5, RESTORE_FADE);
        assert!(recorder.calls().is_empty());
        assert!(!ducker.is_ducked());
    }

    #[test]
    fn missing_audio_is_a_no_op() {
        let mut ducker = AudioDucker::new(None, true);
        ducker.start();
        ducker.duck(DUCK_FADE);
        assert!(!ducker.is_active());
        assert!(!ducker.is_ducked());
    }

    #[test]
    fn duck_then_restore_pairs_up() {
        let recorder = Arc::new(Recorder::default());
        let mut ducker = AudioDucker::new(Some(recorder.clone()), true);
        ducker.start();
        ducker.duck(DUCK_FADE);
        assert!(ducker.is_ducked());
        ducker.restore(0.5, RESTORE_FADE);
        assert!(!ducker.is_ducked());
        assert_eq!(recorder.calls(), vec!["play", "out", "in:0.5"]);
    }

    #[test]
    fn backend_failures_are_swallowed() {
        let recorder = Arc::new(Recorder {
            fail: true,
            ..Recorder::default()
        });
        let mut ducker = AudioDucker::new(Some(recorder.clone()), true);
        ducker.start();
        ducker.duck(DUCK_FADE);
        ducker.restore(0.5, RESTORE_FADE);
        assert_eq!(recorder.calls().len(), 3);
    }

    #[test]
    fn enabling_mid_narration_starts_ducked() {
        let recorder = Arc::new(Recorder::default());
        let mut ducker = AudioDucker::new(Some(recorder.clone()), false);
        ducker.set_enabled(true, true, true, 0.4);
        assert!(ducker.is_ducked());
        ducker.set_enabled(false, true, true, 0.4);
        assert!(!ducker.is_ducked());
        assert_eq!(recorder.calls(), vec!["play", "out", "pause"]);
    }
}

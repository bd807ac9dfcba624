use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use super::ports::AudioService;
use crate::error::AudioError;

const FADE_STEP: Duration = Duration::from_millis(25);

/// Minimal volume-controllable music output.
pub trait VolumeSink: Send + Sync {
    /// # Errors
    ///
    /// Returns `AudioError` if the output rejects the level.
    fn set_volume(&self, volume: f32) -> Result<(), AudioError>;

    fn volume(&self) -> f32;

    /// # Errors
    ///
    /// Returns `AudioError` if the output cannot start.
    fn play(&self) -> Result<(), AudioError>;

    /// # Errors
    ///
    /// Returns `AudioError` if the output cannot pause.
    fn pause(&self) -> Result<(), AudioError>;
}

/// `AudioService` that animates fades on a `VolumeSink` with the tokio timer.
///
/// At most one fade runs at a time: starting a fade aborts the previous one,
/// which leaves the volume wherever it had got to and ramps from there.
pub struct VolumeFader {
    sink: Arc<dyn VolumeSink>,
    active: Mutex<Option<JoinHandle<()>>>,
}

impl VolumeFader {
    #[must_use]
    pub fn new(sink: Arc<dyn VolumeSink>) -> Self {
        Self {
            sink,
            active: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn is_fading(&self) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|fade| !fade.is_finished())
    }

    fn cancel_fade(&self) {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(fade) = active.take() {
            fade.abort();
        }
    }

    fn fade_to(&self, target: f32, duration: Duration) -> Result<(), AudioError> {
        let target = target.clamp(0.0, 1.0);
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(fade) = active.take() {
            fade.abort();
        }

        let Ok(runtime) = Handle::try_current() else {
            return self.sink.set_volume(target);
        };
        if duration.is_zero() {
            return self.sink.set_volume(target);
        }

        let steps = u32::try_from(duration.as_millis() / FADE_STEP.as_millis())
            .unwrap_or(u32::MAX)
            .max(1);
        let tick = duration / steps;
        let start = self.sink.volume();
        let sink = Arc::clone(&self.sink);

        *active = Some(runtime.spawn(async move {
            let mut ticker = tokio::time::interval(tick);
            ticker.tick().await;
            for step in 1..=steps {
                ticker.tick().await;
                #[allow(clippy::cast_precision_loss)]
                let level = start + (target - start) * (step as f32 / steps as f32);
                if let Err(err) = sink.set_volume(level) {
                    log::debug!("fade aborted by sink: {err}");
                    return;
                }
            }
        }));
        Ok(())
    }
}

impl AudioService for VolumeFader {
    fn play(&self) -> Result<(), AudioError> {
        self.sink.play()
    }

    fn pause(&self) -> Result<(), AudioError> {
        self.cancel_fade();
        self.sink.pause()
    }

    fn fade_in(&self, volume: f32, duration: Duration) -> Result<(), AudioError> {
        self.fade_to(volume, duration)
    }

    fn fade_out(&self, duration: Duration) -> Result<(), AudioError> {
        self.fade_to(0.0, duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Level(Mutex<f32>);

    impl VolumeSink for Level {
        fn set_volume(&self, volume: f32) -> Result<(), AudioError> {
            *self.0.lock().unwrap() = volume;
            Ok(())
        }

        fn volume(&self) -> f32 {
            *self.0.lock().unwrap()
        }

        fn play(&self) -> Result<(), AudioError> {
            Ok(())
        }

        fn pause(&self) -> Result<(), AudioError> {
            Ok(())
        }
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[tokio::test(start_paused = true)]
    async fn fade_out_reaches_silence() {
        let sink = Arc::new(Level(Mutex::new(0.8)));
        let fader = VolumeFader::new(sink.clone());
        fader.fade_out(Duration::from_millis(200)).unwrap();
        assert!(fader.is_fading());

        tokio::time::sleep(Duration::from_millis(100)).await;
        let midway = sink.volume();
        assert!(midway < 0.8 && midway > 0.0, "midway volume was {midway}");

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(approx(sink.volume(), 0.0));
        assert!(!fader.is_fading());
    }

    #[tokio::test(start_paused = true)]
    async fn new_fade_overrides_running_one() {
        let sink = Arc::new(Level(Mutex::new(1.0)));
        let fader = VolumeFader::new(sink.clone());
        fader.fade_out(Duration::from_secs(2)).unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        fader.fade_in(0.6, Duration::from_millis(100)).unwrap();
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(approx(sink.volume(), 0.6), "volume was {}", sink.volume());
    }

    #[test]
    fn without_runtime_volume_jumps_to_target() {
        let sink = Arc::new(Level(Mutex::new(0.2)));
        let fader = VolumeFader::new(sink.clone());
        fader.fade_in(1.5, Duration::from_secs(1)).unwrap();
        assert!(approx(sink.volume(), 1.0));
    }
}

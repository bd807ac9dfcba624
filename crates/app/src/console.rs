//! Terminal stand-ins for the speech and music backends.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use services::{AudioError, NarrationError, NarrationOptions, NarrationService, VolumeSink};
use tokio::sync::Notify;

/// Average speaking pace at rate 1.0.
const WORDS_PER_SECOND: f32 = 2.5;

/// Prints each slide and waits roughly as long as reading it aloud would take.
#[derive(Default)]
pub struct ConsoleNarrator {
    speaking: AtomicBool,
    cancelled: Notify,
}

#[async_trait]
impl NarrationService for ConsoleNarrator {
    async fn speak(&self, text: &str, options: NarrationOptions) -> Result<(), NarrationError> {
        println!("  [{}] {text}", options.voice.as_str());
        self.speaking.store(true, Ordering::SeqCst);
        let result = tokio::select! {
            () = tokio::time::sleep(reading_time(text, options.rate)) => Ok(()),
            () = self.cancelled.notified() => Err(NarrationError::Cancelled),
        };
        self.speaking.store(false, Ordering::SeqCst);
        result
    }

    fn cancel(&self) {
        // Wakes only an utterance already waiting; `notify_waiters` stores no
        // permit. Utterances that have not started are dropped by the engine
        // aborting their task.
        self.cancelled.notify_waiters();
    }

    fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }

    fn is_supported(&self) -> bool {
        true
    }
}

fn reading_time(text: &str, rate: f32) -> Duration {
    let words = text.split_whitespace().count().max(1);
    #[allow(clippy::cast_precision_loss)]
    let seconds = words as f32 / (WORDS_PER_SECOND * rate.max(0.1));
    Duration::from_secs_f32(seconds)
}

/// Volume-only music output that logs level changes.
///
/// The level is kept as `f32` bits; zero bits is silence.
#[derive(Default)]
pub struct ConsoleMusic {
    volume: AtomicU32,
}

impl VolumeSink for ConsoleMusic {
    fn set_volume(&self, volume: f32) -> Result<(), AudioError> {
        self.volume.store(volume.to_bits(), Ordering::SeqCst);
        log::trace!("music volume {volume:.2}");
        Ok(())
    }

    fn volume(&self) -> f32 {
        f32::from_bits(self.volume.load(Ordering::SeqCst))
    }

    fn play(&self) -> Result<(), AudioError> {
        println!("  ♪ background music on");
        Ok(())
    }

    fn pause(&self) -> Result<(), AudioError> {
        println!("  ♪ background music off");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reading_time_scales_with_rate() {
        let text = "one two three four five";
        assert_eq!(reading_time(text, 1.0), Duration::from_secs(2));
        assert_eq!(reading_time(text, 2.0), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_ends_the_utterance() {
        let narrator = std::sync::Arc::new(ConsoleNarrator::default());
        let speaking = {
            let narrator = narrator.clone();
            tokio::spawn(async move {
                narrator
                    .speak(
                        "a long sentence that takes a while",
                        NarrationOptions {
                            voice: course_core::model::Voice::Primary,
                            rate: 1.0,
                        },
                    )
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(narrator.is_speaking());
        narrator.cancel();
        assert_eq!(speaking.await.unwrap(), Err(NarrationError::Cancelled));
    }
}

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use course_core::model::{LessonId, PlaybackSettings, PlaybackSettingsDraft, Slide};
use services::{AudioError, AudioService, NarrationError, NarrationOptions, NarrationService};
use storage::repository::{ProgressRecord, ProgressRepository, StorageError};
use tokio::sync::oneshot;

type Completion = oneshot::Sender<Result<(), NarrationError>>;

pub enum NarratorMode {
    /// Every utterance succeeds after the given time.
    Timed(Duration),
    /// Utterances stay pending until the test settles them.
    Manual,
    /// Every utterance fails after the given time.
    Failing(Duration),
    Unsupported,
}

pub struct FakeNarrator {
    mode: NarratorMode,
    spoken: Mutex<Vec<String>>,
    pending: Mutex<Vec<Option<Completion>>>,
    cancels: AtomicUsize,
    speaking: AtomicBool,
}

impl FakeNarrator {
    pub fn new(mode: NarratorMode) -> Arc<Self> {
        Arc::new(Self {
            mode,
            spoken: Mutex::new(Vec::new()),
            pending: Mutex::new(Vec::new()),
            cancels: AtomicUsize::new(0),
            speaking: AtomicBool::new(false),
        })
    }

    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }

    pub fn cancel_count(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }

    /// Settle the `index`-th manual utterance.
    pub fn complete(&self, index: usize, result: Result<(), NarrationError>) {
        let sender = self.pending.lock().unwrap()[index]
            .take()
            .expect("utterance already settled");
        let _ = sender.send(result);
    }
}

#[async_trait]
impl NarrationService for FakeNarrator {
    async fn speak(&self, text: &str, _options: NarrationOptions) -> Result<(), NarrationError> {
        self.spoken.lock().unwrap().push(text.to_string());
        self.speaking.store(true, Ordering::SeqCst);
        let result = match &self.mode {
            NarratorMode::Timed(duration) => {
                tokio::time::sleep(*duration).await;
                Ok(())
            }
            NarratorMode::Failing(duration) => {
                tokio::time::sleep(*duration).await;
                Err(NarrationError::Failed("synthesis error".into()))
            }
            NarratorMode::Manual => {
                let (tx, rx) = oneshot::channel();
                self.pending.lock().unwrap().push(Some(tx));
                rx.await.unwrap_or(Err(NarrationError::Cancelled))
            }
            NarratorMode::Unsupported => Err(NarrationError::Unsupported),
        };
        self.speaking.store(false, Ordering::SeqCst);
        result
    }

    fn cancel(&self) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
    }

    fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }

    fn is_supported(&self) -> bool {
        !matches!(self.mode, NarratorMode::Unsupported)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AudioCall {
    Play,
    Pause,
    FadeIn(f32),
    FadeOut,
}

#[derive(Default)]
pub struct RecordingAudio {
    calls: Mutex<Vec<AudioCall>>,
}

impl RecordingAudio {
    pub fn calls(&self) -> Vec<AudioCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: AudioCall) -> Result<(), AudioError> {
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

impl AudioService for RecordingAudio {
    fn play(&self) -> Result<(), AudioError> {
        self.record(AudioCall::Play)
    }

    fn pause(&self) -> Result<(), AudioError> {
        self.record(AudioCall::Pause)
    }

    fn fade_in(&self, volume: f32, _duration: Duration) -> Result<(), AudioError> {
        self.record(AudioCall::FadeIn(volume))
    }

    fn fade_out(&self, _duration: Duration) -> Result<(), AudioError> {
        self.record(AudioCall::FadeOut)
    }
}

/// Progress store that is always offline.
#[derive(Default)]
pub struct OfflineProgress {
    attempts: AtomicUsize,
}

impl OfflineProgress {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProgressRepository for OfflineProgress {
    async fn mark_complete(&self, _lesson_id: &LessonId) -> Result<(), StorageError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(StorageError::Connection("offline".into()))
    }

    async fn is_complete(&self, _lesson_id: &LessonId) -> Result<bool, StorageError> {
        Err(StorageError::Connection("offline".into()))
    }

    async fn completed_lessons(&self) -> Result<Vec<ProgressRecord>, StorageError> {
        Err(StorageError::Connection("offline".into()))
    }
}

pub fn lesson(id: &str) -> LessonId {
    LessonId::new(id).unwrap()
}

/// One slide per `(lesson, text)` pair; titles are the slide's position.
pub fn slides(specs: &[(&str, &str)]) -> Vec<Slide> {
    specs
        .iter()
        .enumerate()
        .map(|(index, (lesson_id, text))| Slide::new(format!("Slide {index}"), *text, lesson(lesson_id)))
        .collect()
}

pub fn numbered_slides(count: usize) -> Vec<Slide> {
    (0..count)
        .map(|index| Slide::new(format!("Slide {index}"), format!("text {index}"), lesson("only")))
        .collect()
}

pub fn settings_with_music(volume: f32) -> PlaybackSettings {
    PlaybackSettingsDraft {
        music_enabled: true,
        music_volume: volume,
        ..PlaybackSettingsDraft::default()
    }
    .validate()
    .unwrap()
}

/// Let spawned tasks run without moving the paused clock far.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use course_core::model::LessonId;
use storage::repository::{ProgressRepository, StorageError};
use tokio::runtime::Handle;

/// Best-effort "lesson visited" notifications to the progress store.
///
/// Reports are fire-and-forget: failures are logged and never reach the
/// playback state machine. A lesson is reported at most once per session
/// unless its report fails, in which case the next visit tries again.
#[derive(Clone)]
pub struct CompletionReporter {
    store: Arc<dyn ProgressRepository>,
    reported: Arc<Mutex<HashSet<LessonId>>>,
    runtime: Handle,
}

impl CompletionReporter {
    #[must_use]
    pub fn new(store: Arc<dyn ProgressRepository>, runtime: Handle) -> Self {
        Self {
            store,
            reported: Arc::new(Mutex::new(HashSet::new())),
            runtime,
        }
    }

    pub fn report_visited(&self, lesson_id: LessonId) {
        if !claim(&self.reported, &lesson_id) {
            return;
        }
        let store = Arc::clone(&self.store);
        let reported = Arc::clone(&self.reported);
        self.runtime.spawn(async move {
            match store.mark_complete(&lesson_id).await {
                Ok(()) => log::debug!("lesson {lesson_id} marked complete"),
                Err(err) => {
                    log::warn!("could not mark lesson {lesson_id} complete: {err}");
                    release(&reported, &lesson_id);
                }
            }
        });
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the store lookup fails.
    pub async fn is_complete(&self, lesson_id: &LessonId) -> Result<bool, StorageError> {
        self.store.is_complete(lesson_id).await
    }
}

fn claim(reported: &Mutex<HashSet<LessonId>>, lesson_id: &LessonId) -> bool {
    reported
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(lesson_id.clone())
}

fn release(reported: &Mutex<HashSet<LessonId>>, lesson_id: &LessonId) {
    reported
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(lesson_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;
    use storage::repository::{InMemoryRepository, ProgressRecord};

    #[derive(Default)]
    struct FlakyStore {
        calls: Mutex<Vec<LessonId>>,
        fail: bool,
    }

    #[async_trait]
    impl ProgressRepository for FlakyStore {
        async fn mark_complete(&self, lesson_id: &LessonId) -> Result<(), StorageError> {
            self.calls.lock().unwrap().push(lesson_id.clone());
            if self.fail {
                Err(StorageError::Connection("offline".into()))
            } else {
                Ok(())
            }
        }

        async fn is_complete(&self, _lesson_id: &LessonId) -> Result<bool, StorageError> {
            Ok(false)
        }

        async fn completed_lessons(&self) -> Result<Vec<ProgressRecord>, StorageError> {
            Ok(Vec::new())
        }
    }

    async fn drain() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn reports_each_lesson_once() {
        let store = Arc::new(FlakyStore::default());
        let reporter = CompletionReporter::new(store.clone(), Handle::current());
        let lesson = LessonId::new("intro").unwrap();

        reporter.report_visited(lesson.clone());
        reporter.report_visited(lesson.clone());
        drain().await;

        assert_eq!(store.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_report_is_retried_on_next_visit() {
        let store = Arc::new(FlakyStore {
            fail: true,
            ..FlakyStore::default()
        });
        let reporter = CompletionReporter::new(store.clone(), Handle::current());
        let lesson = LessonId::new("intro").unwrap();

        reporter.report_visited(lesson.clone());
        drain().await;
        reporter.report_visited(lesson.clone());
        drain().await;

        assert_eq!(store.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn is_complete_reads_through_to_store() {
        let repo = Arc::new(InMemoryRepository::new());
        let reporter = CompletionReporter::new(repo.clone(), Handle::current());
        let lesson = LessonId::new("intro").unwrap();
        assert!(!reporter.is_complete(&lesson).await.unwrap());

        repo.mark_complete(&lesson).await.unwrap();
        assert!(reporter.is_complete(&lesson).await.unwrap());
    }
}

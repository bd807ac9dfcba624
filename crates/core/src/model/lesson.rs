use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{LessonId, TopicId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LessonError {
    #[error("lesson title cannot be empty")]
    EmptyTitle,

    #[error("topic title cannot be empty")]
    EmptyTopicTitle,

    #[error("duplicate lesson id in topic: {0}")]
    DuplicateLesson(LessonId),
}

/// A single lesson as authored: raw markdown plus its place within a topic.
///
/// Lessons are read-only inputs to playback; nothing in the engine mutates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    id: LessonId,
    title: String,
    raw_content: String,
    position: u32,
}

impl Lesson {
    /// Creates a lesson.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::EmptyTitle` if the title is blank.
    pub fn new(
        id: LessonId,
        title: impl Into<String>,
        raw_content: impl Into<String>,
        position: u32,
    ) -> Result<Self, LessonError> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(LessonError::EmptyTitle);
        }
        Ok(Self {
            id,
            title,
            raw_content: raw_content.into(),
            position,
        })
    }

    #[must_use]
    pub fn id(&self) -> &LessonId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn raw_content(&self) -> &str {
        &self.raw_content
    }

    #[must_use]
    pub fn position(&self) -> u32 {
        self.position
    }
}

/// A topic groups the lessons of one course section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    id: TopicId,
    title: String,
    lessons: Vec<Lesson>,
}

impl Topic {
    /// Creates a topic from its lessons.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::EmptyTopicTitle` for a blank title and
    /// `LessonError::DuplicateLesson` if two lessons share an id.
    pub fn new(
        id: TopicId,
        title: impl Into<String>,
        lessons: Vec<Lesson>,
    ) -> Result<Self, LessonError> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(LessonError::EmptyTopicTitle);
        }
        for (idx, lesson) in lessons.iter().enumerate() {
            if lessons[..idx].iter().any(|other| other.id() == lesson.id()) {
                return Err(LessonError::DuplicateLesson(lesson.id().clone()));
            }
        }
        Ok(Self { id, title, lessons })
    }

    #[must_use]
    pub fn id(&self) -> &TopicId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Lessons in authored order (by position; ties keep insertion order).
    #[must_use]
    pub fn ordered_lessons(&self) -> Vec<&Lesson> {
        let mut ordered: Vec<&Lesson> = self.lessons.iter().collect();
        ordered.sort_by_key(|lesson| lesson.position());
        ordered
    }

    #[must_use]
    pub fn lesson_count(&self) -> usize {
        self.lessons.len()
    }
}

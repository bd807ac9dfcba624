use serde::{Deserialize, Serialize};

use crate::model::ids::LessonId;

/// One narratable unit of plain text derived from a lesson section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slide {
    title: String,
    text: String,
    source_lesson_id: LessonId,
}

impl Slide {
    #[must_use]
    pub fn new(title: impl Into<String>, text: impl Into<String>, source_lesson_id: LessonId) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            source_lesson_id,
        }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Plain text handed to the narration service.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn source_lesson_id(&self) -> &LessonId {
        &self.source_lesson_id
    }
}

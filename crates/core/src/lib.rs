#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod sequencer;

pub use error::Error;
pub use sequencer::{Section, plain_text, sequence_lessons, sequence_topics, slides_for_lesson, split_sections};

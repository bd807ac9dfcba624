//! Turns raw lesson markdown into the flat list of narratable slides.
//!
//! Everything here works on the authored text only. Nothing depends on how a
//! lesson is rendered, so the output is deterministic and testable without a
//! display surface.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

use crate::model::{Lesson, Slide, Topic};

/// One heading-delimited chunk of a lesson, already reduced to plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub text: String,
}

/// Flattens lessons, in the order given, into slides.
///
/// Sections without narratable text are dropped; a lesson with no such
/// sections contributes nothing.
#[must_use]
pub fn sequence_lessons<'a>(lessons: impl IntoIterator<Item = &'a Lesson>) -> Vec<Slide> {
    lessons.into_iter().flat_map(slides_for_lesson).collect()
}

/// Flattens topics in order, each topic contributing its lessons by position.
#[must_use]
pub fn sequence_topics(topics: &[Topic]) -> Vec<Slide> {
    topics
        .iter()
        .flat_map(|topic| sequence_lessons(topic.ordered_lessons()))
        .collect()
}

/// Slides for a single lesson in source order.
#[must_use]
pub fn slides_for_lesson(lesson: &Lesson) -> Vec<Slide> {
    split_sections(lesson.raw_content())
        .into_iter()
        .map(|section| {
            let title = if section.title.is_empty() {
                lesson.title().to_string()
            } else {
                section.title
            };
            Slide::new(title, section.text, lesson.id().clone())
        })
        .collect()
}

/// Splits raw markdown at heading lines and strips markup from each chunk.
///
/// The first non-blank line of a chunk becomes its title (heading markers
/// removed); the rest becomes the narratable text. Chunks whose text is empty
/// are not returned.
#[must_use]
pub fn split_sections(raw: &str) -> Vec<Section> {
    chunk_at_headings(raw)
        .into_iter()
        .filter_map(|chunk| {
            let mut lines = chunk.into_iter().skip_while(|line| line.trim().is_empty());
            let first = lines.next()?;
            let body: Vec<&str> = lines.collect();
            let text = plain_text(&body.join("\n"));
            if text.is_empty() {
                return None;
            }
            Some(Section {
                title: plain_text(strip_heading_marker(first)),
                text,
            })
        })
        .collect()
}

fn chunk_at_headings(raw: &str) -> Vec<Vec<&str>> {
    let mut chunks: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut fence: Option<char> = None;

    for line in raw.lines() {
        if let Some(marker) = fence_marker(line) {
            match fence {
                None => fence = Some(marker),
                Some(open) if open == marker => fence = None,
                Some(_) => {}
            }
        } else if fence.is_none()
            && is_heading(line)
            && current.iter().any(|l| !l.trim().is_empty())
        {
            chunks.push(std::mem::take(&mut current));
        }
        current.push(line);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn fence_marker(line: &str) -> Option<char> {
    let trimmed = line.trim_start();
    if trimmed.starts_with("```") {
        Some('`')
    } else if trimmed.starts_with("~~~") {
        Some('~')
    } else {
        None
    }
}

/// ATX heading: up to three spaces of indent, one to six `#`, then space or end of line.
fn is_heading(line: &str) -> bool {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return false;
    }
    let rest = &line[indent..];
    let hashes = rest.len() - rest.trim_start_matches('#').len();
    if !(1..=6).contains(&hashes) {
        return false;
    }
    rest[hashes..]
        .chars()
        .next()
        .is_none_or(char::is_whitespace)
}

fn strip_heading_marker(line: &str) -> &str {
    line.trim()
        .trim_start_matches('#')
        .trim_end_matches('#')
        .trim()
}

/// Reduces markdown to the words a narrator should read.
///
/// Emphasis and inline-code markers disappear while their content stays;
/// fenced and indented code blocks, images and raw HTML are dropped entirely.
/// Whitespace is collapsed to single spaces.
#[must_use]
pub fn plain_text(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut out = String::with_capacity(markdown.len());
    let mut code_depth = 0usize;
    let mut image_depth = 0usize;

    for event in Parser::new_ext(markdown, options) {
        match event {
            Event::Start(Tag::CodeBlock(_)) => code_depth += 1,
            Event::End(TagEnd::CodeBlock) => code_depth = code_depth.saturating_sub(1),
            Event::Start(Tag::Image { .. }) => image_depth += 1,
            Event::End(TagEnd::Image) => image_depth = image_depth.saturating_sub(1),
            _ if code_depth > 0 || image_depth > 0 => {}
            Event::Text(text) | Event::Code(text) => out.push_str(&text),
            Event::SoftBreak | Event::HardBreak | Event::Rule => out.push(' '),
            Event::End(
                TagEnd::Paragraph
                | TagEnd::Heading(_)
                | TagEnd::Item
                | TagEnd::List(_)
                | TagEnd::BlockQuote(_)
                | TagEnd::TableCell
                | TagEnd::TableRow
                | TagEnd::TableHead,
            ) => out.push(' '),
            _ => {}
        }
    }

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

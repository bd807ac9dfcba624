use std::fs;
use std::path::Path;

use course_core::model::{Lesson, LessonId};

/// Loads every `*.md` file in `dir` as a lesson, ordered by file name.
///
/// The lesson id is the file stem; the title is the first `#` heading, or the
/// stem when the file has none.
pub fn load_lessons(dir: &Path) -> Result<Vec<Lesson>, Box<dyn std::error::Error>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "md") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut lessons = Vec::with_capacity(paths.len());
    for (position, path) in paths.iter().enumerate() {
        let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
            log::warn!("skipping lesson with a non UTF-8 name: {}", path.display());
            continue;
        };
        let raw = fs::read_to_string(path)?;
        let title = first_heading(&raw).unwrap_or(stem).to_string();
        let position = u32::try_from(position)?;
        lessons.push(Lesson::new(LessonId::new(stem)?, title, raw, position)?);
    }
    Ok(lessons)
}

fn first_heading(raw: &str) -> Option<&str> {
    raw.lines()
        .find_map(|line| line.trim_start().strip_prefix('#'))
        .map(|rest| rest.trim_start_matches('#').trim())
        .filter(|title| !title.is_empty())
}

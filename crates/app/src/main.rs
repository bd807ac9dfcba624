mod console;
mod lessons;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use course_core::model::{PlaybackSettings, Voice};
use course_core::sequence_lessons;
use services::{
    KeyOutcome, PlaybackController, PlaybackKey, PlaybackPhase, PlaybackSettingsService,
    VolumeFader, handle_key,
};
use storage::repository::Storage;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::console::{ConsoleMusic, ConsoleNarrator};
use crate::lessons::load_lessons;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidValue { flag: &'static str, raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidValue { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- play     [--db <sqlite_url>] [--dir <lessons>] [options]");
    eprintln!("  cargo run -p app -- progress [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Play options:");
    eprintln!("  --start <index>      first slide to play (default 0)");
    eprintln!("  --voice <a|b>        narration voice");
    eprintln!("  --rate <0.5..2.0>    narration rate");
    eprintln!("  --music              enable background music");
    eprintln!("  --remember           persist the options above as defaults");
    eprintln!();
    eprintln!("Keys (type and press enter): p/space toggle, n next, b previous,");
    eprintln!("  r restart, s status, q quit");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  COURSE_DB_URL, COURSE_DIR, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Progress,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "progress" => Some(Self::Progress),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct Overrides {
    voice: Option<Voice>,
    rate: Option<f32>,
    music: bool,
    remember: bool,
}

struct Args {
    db_url: String,
    lessons_dir: PathBuf,
    start: usize,
    overrides: Overrides,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("COURSE_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://course.sqlite3".into(), normalize_sqlite_url);
        let mut lessons_dir = std::env::var("COURSE_DIR")
            .ok()
            .map_or_else(|| PathBuf::from("lessons"), PathBuf::from);
        let mut start = 0;
        let mut overrides = Overrides::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--dir" => lessons_dir = PathBuf::from(require_value(args, "--dir")?),
                "--start" => {
                    let value = require_value(args, "--start")?;
                    start = value.parse().map_err(|_| ArgsError::InvalidValue {
                        flag: "--start",
                        raw: value.clone(),
                    })?;
                }
                "--voice" => {
                    let value = require_value(args, "--voice")?;
                    let voice = value.parse().map_err(|_| ArgsError::InvalidValue {
                        flag: "--voice",
                        raw: value.clone(),
                    })?;
                    overrides.voice = Some(voice);
                }
                "--rate" => {
                    let value = require_value(args, "--rate")?;
                    let rate = value.parse().map_err(|_| ArgsError::InvalidValue {
                        flag: "--rate",
                        raw: value.clone(),
                    })?;
                    overrides.rate = Some(rate);
                }
                "--music" => overrides.music = true,
                "--remember" => overrides.remember = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            lessons_dir,
            start,
            overrides,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

/// Apply command-line overrides on top of the stored preferences.
async fn resolve_settings(
    service: &PlaybackSettingsService,
    overrides: &Overrides,
) -> Result<PlaybackSettings, Box<dyn std::error::Error>> {
    let stored = service.load().await?;
    let mut draft = stored.to_draft();
    if let Some(voice) = overrides.voice {
        draft.voice = voice;
    }
    if let Some(rate) = overrides.rate {
        draft.rate = rate;
    }
    if overrides.music {
        draft.music_enabled = true;
    }

    if overrides.remember {
        return Ok(service.save(draft).await?);
    }
    Ok(draft.validate()?)
}

fn key_for_line(line: &str) -> Option<PlaybackKey> {
    match line {
        "" | "p" | "space" => Some(PlaybackKey::Space),
        "n" | "next" => Some(PlaybackKey::ArrowRight),
        "b" | "back" | "prev" => Some(PlaybackKey::ArrowLeft),
        "q" | "quit" => Some(PlaybackKey::Escape),
        other => PlaybackKey::from_key_name(other),
    }
}

fn print_status(player: &PlaybackController) {
    let snapshot = player.snapshot();
    println!(
        "slide {}/{} {:?} {} ({:.0}%)",
        snapshot.current_index + 1,
        snapshot.total,
        snapshot.phase,
        snapshot.slide_title.as_deref().unwrap_or("-"),
        snapshot.progress() * 100.0,
    );
}

async fn play(storage: Storage, args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let lessons = load_lessons(&args.lessons_dir)?;
    let slides = sequence_lessons(&lessons);
    if slides.is_empty() {
        eprintln!("no slides found in {}", args.lessons_dir.display());
        return Ok(());
    }
    println!("{} lessons, {} slides", lessons.len(), slides.len());

    let settings_service = PlaybackSettingsService::new(Arc::clone(&storage.settings));
    let settings = resolve_settings(&settings_service, &args.overrides).await?;

    let music = Arc::new(VolumeFader::new(Arc::new(ConsoleMusic::default())));
    let player = PlaybackController::builder(
        slides,
        Arc::new(ConsoleNarrator::default()),
        Arc::clone(&storage.progress),
    )
    .with_settings(settings)
    .with_audio(music)
    .build()?;

    player.jump_to(args.start);
    player.play();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(Duration::from_millis(250));
    let mut shown = None;
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.trim() {
                    "r" | "restart" => player.restart(),
                    "s" | "status" => print_status(&player),
                    other => match key_for_line(other) {
                        Some(key) => {
                            if handle_key(&player, key) == KeyOutcome::ExitRequested {
                                break;
                            }
                        }
                        None => eprintln!("unknown key: {other}"),
                    },
                }
            }
            _ = ticker.tick() => {
                let snapshot = player.snapshot();
                if shown != Some(snapshot.current_index) {
                    shown = Some(snapshot.current_index);
                    print_status(&player);
                }
                if snapshot.phase == PlaybackPhase::Finished {
                    println!("finished");
                    break;
                }
            }
        }
    }

    player.shutdown();
    Ok(())
}

async fn show_progress(storage: Storage) -> Result<(), Box<dyn std::error::Error>> {
    let records = storage.progress.completed_lessons().await?;
    if records.is_empty() {
        println!("no lessons completed yet");
    }
    for record in records {
        println!("{}  {}", record.completed_at.to_rfc3339(), record.lesson_id);
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::Play,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Play,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let parsed = Args::parse(&mut argv.into_iter()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite here so the library crates never touch the filesystem.
    prepare_sqlite_file(&parsed.db_url)?;
    let storage = Storage::sqlite(&parsed.db_url).await?;
    log::debug!("opened progress store at {}", parsed.db_url);

    match cmd {
        Command::Play => play(storage, parsed).await,
        Command::Progress => show_progress(storage).await,
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

//! Narrated slide playback for the cinema, podcast and presentation views.
//!
//! A [`PlaybackController`] owns one [`PlaybackSession`]. Navigation always
//! cancels pending work first; narration results and auto-advance timers carry
//! the generation they were started under and are dropped if it has moved on.

mod completion;
mod ducking;
mod engine;
mod fader;
mod keyboard;
mod narration;
mod navigation;
mod ports;
mod session;

pub use completion::CompletionReporter;
pub use ducking::{AudioDucker, DUCK_FADE, RESTORE_FADE};
pub use engine::{PlaybackBuilder, PlaybackController};
pub use fader::{VolumeFader, VolumeSink};
pub use keyboard::{KeyOutcome, PlaybackKey, handle_key};
pub use ports::{AudioService, NarrationOptions, NarrationService};
pub use session::{PlaybackPhase, PlaybackSession, PlaybackSnapshot};

//! Key bindings offered to whatever UI hosts a playback view.

use super::engine::PlaybackController;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaybackKey {
    Space,
    ArrowRight,
    ArrowLeft,
    Escape,
}

impl PlaybackKey {
    /// Maps a DOM-style `KeyboardEvent.key` value.
    #[must_use]
    pub fn from_key_name(name: &str) -> Option<Self> {
        match name {
            " " | "Space" | "Spacebar" => Some(Self::Space),
            "ArrowRight" | "Right" => Some(Self::ArrowRight),
            "ArrowLeft" | "Left" => Some(Self::ArrowLeft),
            "Escape" | "Esc" => Some(Self::Escape),
            _ => None,
        }
    }
}

/// What the host view should do after a key was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Handled,
    /// Playback is paused; the host should leave the playback view.
    ExitRequested,
}

pub fn handle_key(controller: &PlaybackController, key: PlaybackKey) -> KeyOutcome {
    match key {
        PlaybackKey::Space => controller.toggle_play_pause(),
        // `next`/`previous` stop the current narration before moving.
        PlaybackKey::ArrowRight => controller.next(),
        PlaybackKey::ArrowLeft => controller.previous(),
        PlaybackKey::Escape => {
            controller.pause();
            return KeyOutcome::ExitRequested;
        }
    }
    KeyOutcome::Handled
}

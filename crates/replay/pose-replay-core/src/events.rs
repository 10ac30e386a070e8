//! Playback events.
//!
//! The controller records one event per state transition. Hosts drain them
//! after each call and forward them to their UI layer (JS callbacks, Bevy
//! events). `SequenceEmptied` is the signal to hide playback controls.

use serde::{Deserialize, Serialize};

use crate::controller::SessionId;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum PlaybackEvent {
    /// A non-empty sequence replaced the previous one.
    SequenceLoaded {
        session: SessionId,
        frame_count: usize,
    },
    /// The sequence became empty after being non-empty.
    SequenceEmptied { session: SessionId },
    Started { index: usize },
    Paused { index: usize },
    Seeked { requested: i64, index: usize },
    Advanced { from: usize, to: usize },
    /// Autoplay ran past the last frame; playback stopped at index 0.
    Completed { frame_count: usize },
}

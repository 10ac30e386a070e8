//! Pose Replay Core (host-agnostic)
//!
//! Frame data, the fixed skeleton topology, a deterministic skeleton renderer,
//! the nominal-rate playback clock and the playback controller. Hosts (web,
//! Bevy) own a [`ReplaySession`] and drive it from their own tick source.

pub mod clock;
pub mod config;
pub mod controller;
pub mod data;
pub mod error;
pub mod events;
pub mod loader;
pub mod render;
pub mod session;
pub mod topology;

// Re-exports for consumers (adapters)
pub use clock::{ClockTick, PlaybackClock};
pub use config::{CanvasSize, RenderStyle, ReplayConfig};
pub use controller::{PlaybackController, PlaybackMode, PlaybackState, SessionId, TickOutcome};
pub use data::{FrameStore, JumpEvent, Keypoint, Keypoints, PoseFrame};
pub use error::ReplayError;
pub use events::PlaybackEvent;
pub use loader::{parse_jump_event_json, parse_pose_frames_json, parse_replay_json, ReplaySource};
pub use render::{render, DrawCommand, Point, Rgba, Scene, SkeletonRenderer, Surface};
pub use session::{Controls, Readout, ReplaySession};
pub use topology::{Joint, JOINT_COUNT, SKELETON_CONNECTIONS};

/// Result type for the fallible edges of the core (parsing, configuration).
pub type Result<T> = core::result::Result<T, ReplayError>;

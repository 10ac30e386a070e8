//! Replay session: one frame store, one optional jump event, one controller.
//!
//! This is what hosts hold. It answers "what is on screen now": the rendered
//! scene for the current frame, the frame/time readout and the state of the
//! scrub and play/pause controls.

use std::fmt;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::config::ReplayConfig;
use crate::controller::{PlaybackController, PlaybackMode, PlaybackState, SessionId, TickOutcome};
use crate::data::{FrameStore, JumpEvent, PoseFrame};
use crate::error::ReplayError;
use crate::events::PlaybackEvent;
use crate::loader::ReplaySource;
use crate::render::{Scene, SkeletonRenderer, Surface};

/// Frame/time readout shown under the canvas.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Readout {
    /// One-based position in the sequence.
    pub frame_number: usize,
    pub frame_count: usize,
    /// Source frame index of the displayed frame.
    pub frame_index: u32,
    pub timestamp_ms: f64,
    pub airborne: bool,
}

impl Readout {
    #[inline]
    pub fn seconds(&self) -> f64 {
        self.timestamp_ms / 1000.0
    }
}

impl fmt::Display for Readout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Frame {}/{} - {:.2}s",
            self.frame_number,
            self.frame_count,
            self.seconds()
        )
    }
}

/// State of the UI affordances bound to the controller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Controls {
    /// False for an empty sequence: scrub and toggle are disabled.
    pub enabled: bool,
    pub scrub_max: usize,
    pub scrub_value: usize,
    pub toggle_label: &'static str,
}

#[derive(Clone, Debug)]
pub struct ReplaySession {
    config: ReplayConfig,
    renderer: SkeletonRenderer,
    frames: FrameStore,
    event: Option<JumpEvent>,
    controller: PlaybackController,
}

impl Default for ReplaySession {
    fn default() -> Self {
        let config = ReplayConfig::default();
        Self {
            renderer: SkeletonRenderer::from_config(&config),
            controller: PlaybackController::new(0, config.playback_fps),
            frames: FrameStore::empty(),
            event: None,
            config,
        }
    }
}

impl ReplaySession {
    /// Create an empty session. Fails only on an invalid configuration.
    pub fn new(config: ReplayConfig) -> Result<Self, ReplayError> {
        config.validate()?;
        Ok(Self {
            renderer: SkeletonRenderer::from_config(&config),
            controller: PlaybackController::new(0, config.playback_fps),
            frames: FrameStore::empty(),
            event: None,
            config,
        })
    }

    pub fn with_sequence(
        config: ReplayConfig,
        frames: impl Into<FrameStore>,
        event: Option<JumpEvent>,
    ) -> Result<Self, ReplayError> {
        let mut session = Self::new(config)?;
        session.load(frames, event);
        Ok(session)
    }

    /// Supply a new sequence; playback resets to frame 0, stopped. Ordering
    /// problems are logged, not rejected. An event outside the sequence is
    /// dropped so it can never highlight.
    pub fn load(&mut self, frames: impl Into<FrameStore>, event: Option<JumpEvent>) -> SessionId {
        let frames = frames.into();
        if let Err(e) = frames.validate() {
            warn!("pose sequence accepted with ordering problem: {e}");
        }
        let event = event.filter(|ev| {
            let keep = ev.is_ordered()
                && frames
                    .last_frame_index()
                    .is_some_and(|last| ev.is_within(last));
            if !keep {
                warn!(
                    "jump event [{}, {}] is outside the sequence; airborne highlight disabled",
                    ev.takeoff_frame, ev.landing_frame
                );
            }
            keep
        });
        self.frames = frames;
        self.event = event;
        self.controller.load(self.frames.len())
    }

    pub fn load_source(&mut self, source: ReplaySource) -> SessionId {
        self.load(source.frames, source.event)
    }

    /// Tear down the sequence. The clock is cancelled first.
    pub fn clear(&mut self) -> SessionId {
        let session = self.controller.clear();
        self.frames = FrameStore::empty();
        self.event = None;
        session
    }

    pub fn play(&mut self) -> bool {
        self.controller.play()
    }

    pub fn pause(&mut self) -> bool {
        self.controller.pause()
    }

    pub fn toggle(&mut self) -> bool {
        self.controller.toggle()
    }

    pub fn seek(&mut self, index: i64) -> Option<usize> {
        self.controller.seek(index)
    }

    pub fn tick(&mut self, now_ms: f64) -> TickOutcome {
        self.controller.tick(now_ms)
    }

    pub fn tick_session(&mut self, session: SessionId, now_ms: f64) -> TickOutcome {
        self.controller.tick_session(session, now_ms)
    }

    pub fn current_frame(&self) -> Option<&PoseFrame> {
        self.controller
            .current_frame_index()
            .and_then(|i| self.frames.get(i))
    }

    /// Render the current frame onto a scene of the configured canvas size.
    pub fn scene(&self) -> Scene {
        let canvas = self.config.canvas;
        self.renderer.render(
            self.current_frame(),
            canvas.width,
            canvas.height,
            self.event.as_ref(),
        )
    }

    pub fn paint<S: Surface + ?Sized>(&self, surface: &mut S) {
        self.scene().paint(surface);
    }

    pub fn readout(&self) -> Option<Readout> {
        let position = self.controller.current_frame_index()?;
        let frame = self.frames.get(position)?;
        Some(Readout {
            frame_number: position + 1,
            frame_count: self.frames.len(),
            frame_index: frame.frame_index,
            timestamp_ms: frame.timestamp_ms,
            airborne: self
                .event
                .as_ref()
                .is_some_and(|ev| ev.contains(frame.frame_index)),
        })
    }

    pub fn controls(&self) -> Controls {
        let count = self.frames.len();
        Controls {
            enabled: count > 0,
            scrub_max: count.saturating_sub(1),
            scrub_value: self.controller.current_frame_index().unwrap_or(0),
            toggle_label: match self.controller.mode() {
                PlaybackMode::Playing => "Pause",
                PlaybackMode::Stopped => "Play",
            },
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.controller.state()
    }

    #[inline]
    pub fn session(&self) -> SessionId {
        self.controller.session()
    }

    pub fn frames(&self) -> &FrameStore {
        &self.frames
    }

    pub fn event(&self) -> Option<&JumpEvent> {
        self.event.as_ref()
    }

    pub fn config(&self) -> &ReplayConfig {
        &self.config
    }

    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        self.controller.drain_events()
    }
}

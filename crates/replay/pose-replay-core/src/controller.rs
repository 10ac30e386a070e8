//! Playback controller: the `Stopped`/`Playing` state machine.
//!
//! The controller is the only writer of playback state. It knows the frame
//! count, not the frames, so it can be driven and tested without any frame
//! data or drawing surface.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::clock::{ClockTick, PlaybackClock};
use crate::events::PlaybackEvent;

/// Pending events kept when a host never drains them; oldest are dropped first.
const MAX_PENDING_EVENTS: usize = 256;

/// Identifies one loaded sequence. Bumped on every load/clear.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackMode {
    Stopped,
    Playing,
}

impl PlaybackMode {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Playing => "playing",
        }
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }
}

/// Snapshot read by renderers and UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackState {
    /// `None` when the sequence is empty.
    pub current_frame_index: Option<usize>,
    pub is_playing: bool,
}

/// Result of a host tick as seen by the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not playing.
    Idle,
    /// Tick belongs to an older session and was dropped.
    Stale,
    /// Playing, but the nominal interval has not elapsed.
    Waiting,
    Advanced { from: usize, to: usize },
    /// Ran past the last frame: now stopped at index 0.
    Completed,
}

#[derive(Clone, Debug)]
pub struct PlaybackController {
    frame_count: usize,
    current: Option<usize>,
    mode: PlaybackMode,
    clock: PlaybackClock,
    session: SessionId,
    events: Vec<PlaybackEvent>,
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::with_clock(0, PlaybackClock::default())
    }
}

impl PlaybackController {
    pub fn new(frame_count: usize, playback_fps: f64) -> Self {
        Self::with_clock(frame_count, PlaybackClock::new(playback_fps))
    }

    pub fn with_clock(frame_count: usize, mut clock: PlaybackClock) -> Self {
        clock.stop();
        Self {
            frame_count,
            current: (frame_count > 0).then_some(0),
            mode: PlaybackMode::Stopped,
            clock,
            session: SessionId(0),
            events: Vec::new(),
        }
    }

    fn push_event(&mut self, event: PlaybackEvent) {
        if self.events.len() >= MAX_PENDING_EVENTS {
            self.events.remove(0);
        }
        self.events.push(event);
    }

    /// Replace the sequence. The clock is cancelled before state is reset so
    /// no tick scheduled for the old sequence can move the new index.
    pub fn load(&mut self, frame_count: usize) -> SessionId {
        self.clock.stop();
        let was_non_empty = self.frame_count > 0;
        self.session = SessionId(self.session.0.wrapping_add(1));
        self.frame_count = frame_count;
        self.mode = PlaybackMode::Stopped;
        self.current = (frame_count > 0).then_some(0);
        debug!(
            "replay session {:?} loaded with {} frames",
            self.session, frame_count
        );
        if frame_count > 0 {
            self.push_event(PlaybackEvent::SequenceLoaded {
                session: self.session,
                frame_count,
            });
        } else if was_non_empty {
            self.push_event(PlaybackEvent::SequenceEmptied {
                session: self.session,
            });
        }
        self.session
    }

    /// Tear down: stop the clock and drop the sequence.
    pub fn clear(&mut self) -> SessionId {
        self.load(0)
    }

    /// Stopped -> Playing. Returns whether a transition happened.
    pub fn play(&mut self) -> bool {
        if self.mode.is_playing() || self.frame_count == 0 {
            return false;
        }
        let index = self.current.unwrap_or(0);
        self.mode = PlaybackMode::Playing;
        self.clock.start();
        debug!("playback started at frame {index}");
        self.push_event(PlaybackEvent::Started { index });
        true
    }

    /// Playing -> Stopped, keeping the index. Returns whether a transition happened.
    pub fn pause(&mut self) -> bool {
        if !self.mode.is_playing() {
            return false;
        }
        self.stop_clock();
        let index = self.current.unwrap_or(0);
        debug!("playback paused at frame {index}");
        self.push_event(PlaybackEvent::Paused { index });
        true
    }

    /// Play/pause button. Returns whether playback is running afterwards.
    pub fn toggle(&mut self) -> bool {
        if self.mode.is_playing() {
            self.pause();
        } else {
            self.play();
        }
        self.mode.is_playing()
    }

    /// Scrub to `index`, clamped into `[0, frame_count - 1]`. Always leaves
    /// playback stopped. Returns the new index, `None` on an empty sequence.
    pub fn seek(&mut self, index: i64) -> Option<usize> {
        if self.frame_count == 0 {
            return None;
        }
        self.pause();
        let last = self.frame_count - 1;
        let clamped = index.clamp(0, last as i64) as usize;
        self.current = Some(clamped);
        debug!("seek to {index} -> frame {clamped}");
        self.push_event(PlaybackEvent::Seeked {
            requested: index,
            index: clamped,
        });
        Some(clamped)
    }

    /// Feed one host tick. On an accepted step the index advances by exactly
    /// one; a step taken on the last frame stops playback and rewinds to 0.
    pub fn tick(&mut self, now_ms: f64) -> TickOutcome {
        if !self.mode.is_playing() {
            return TickOutcome::Idle;
        }
        match self.clock.tick(now_ms) {
            ClockTick::Idle => TickOutcome::Idle,
            ClockTick::Waiting => TickOutcome::Waiting,
            ClockTick::Step => self.step(),
        }
    }

    /// Like [`tick`](Self::tick), but drops ticks scheduled for another session.
    pub fn tick_session(&mut self, session: SessionId, now_ms: f64) -> TickOutcome {
        if session != self.session {
            return TickOutcome::Stale;
        }
        self.tick(now_ms)
    }

    fn step(&mut self) -> TickOutcome {
        let from = self.current.unwrap_or(0);
        if from + 1 >= self.frame_count {
            self.stop_clock();
            self.current = Some(0);
            debug!("playback completed after {} frames", self.frame_count);
            self.push_event(PlaybackEvent::Completed {
                frame_count: self.frame_count,
            });
            return TickOutcome::Completed;
        }
        let to = from + 1;
        self.current = Some(to);
        self.push_event(PlaybackEvent::Advanced { from, to });
        TickOutcome::Advanced { from, to }
    }

    fn stop_clock(&mut self) {
        self.clock.stop();
        self.mode = PlaybackMode::Stopped;
    }

    pub fn state(&self) -> PlaybackState {
        PlaybackState {
            current_frame_index: self.current,
            is_playing: self.mode.is_playing(),
        }
    }

    #[inline]
    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.mode.is_playing()
    }

    #[inline]
    pub fn current_frame_index(&self) -> Option<usize> {
        self.current
    }

    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    #[inline]
    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    /// Events recorded since the last drain.
    pub fn events(&self) -> &[PlaybackEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state() {
        let c = PlaybackController::new(3, 30.0);
        assert_eq!(c.mode(), PlaybackMode::Stopped);
        assert_eq!(c.current_frame_index(), Some(0));

        let empty = PlaybackController::default();
        assert_eq!(empty.current_frame_index(), None);
        assert!(!empty.is_playing());
    }

    #[test]
    fn play_and_pause_are_idempotent() {
        let mut c = PlaybackController::new(3, 30.0);
        assert!(c.play());
        assert!(!c.play());
        assert!(c.pause());
        assert!(!c.pause());
        assert_eq!(c.events().len(), 2);
    }

    #[test]
    fn pause_keeps_index() {
        let mut c = PlaybackController::new(5, 30.0);
        c.play();
        c.tick(0.0);
        c.tick(40.0);
        assert_eq!(c.current_frame_index(), Some(2));
        c.pause();
        assert_eq!(c.current_frame_index(), Some(2));
        assert_eq!(c.tick(200.0), TickOutcome::Idle);
    }

    #[test]
    fn toggle_flips_mode() {
        let mut c = PlaybackController::new(2, 30.0);
        assert!(c.toggle());
        assert!(!c.toggle());
        assert_eq!(c.mode(), PlaybackMode::Stopped);
    }

    #[test]
    fn resume_after_pause_waits_for_first_tick() {
        let mut c = PlaybackController::new(5, 30.0);
        c.play();
        assert_eq!(c.tick(0.0), TickOutcome::Advanced { from: 0, to: 1 });
        c.pause();
        c.play();
        assert_eq!(c.tick(1.0), TickOutcome::Advanced { from: 1, to: 2 });
        assert_eq!(c.tick(2.0), TickOutcome::Waiting);
    }

    #[test]
    fn event_buffer_is_bounded() {
        let mut c = PlaybackController::new(2, 30.0);
        for i in 0..(MAX_PENDING_EVENTS as i64 + 10) {
            c.seek(i % 2);
        }
        assert_eq!(c.events().len(), MAX_PENDING_EVENTS);
        assert_eq!(c.drain_events().len(), MAX_PENDING_EVENTS);
        assert!(c.events().is_empty());
    }

    #[test]
    fn mode_names() {
        assert_eq!(PlaybackMode::Playing.name(), "playing");
        assert_eq!(
            serde_json::to_string(&PlaybackMode::Stopped).unwrap(),
            "\"stopped\""
        );
    }
}

//! Nominal-rate playback clock.
//!
//! The clock owns no timer. Hosts call [`PlaybackClock::tick`] from whatever
//! recurring callback they have (`requestAnimationFrame`, a Bevy schedule) with
//! a monotonic timestamp in milliseconds, and the clock decides whether that
//! tick is an accepted step. Accepted steps are spaced at least one nominal
//! interval apart; a host slower than the nominal rate gets one step per tick.

use crate::config::DEFAULT_PLAYBACK_FPS;

/// Result of feeding one host tick to the clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockTick {
    /// Clock is stopped; tick ignored.
    Idle,
    /// Observed, but too soon since the last accepted step.
    Waiting,
    /// Accepted: the caller advances by exactly one frame.
    Step,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlaybackClock {
    interval_ms: f64,
    running: bool,
    /// Host time of the last accepted step; `None` until the first tick after `start`.
    last_step_ms: Option<f64>,
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::new(DEFAULT_PLAYBACK_FPS)
    }
}

impl PlaybackClock {
    /// `steps_per_second` must be positive and finite (see `ReplayConfig::validate`).
    pub fn new(steps_per_second: f64) -> Self {
        Self::from_interval_ms(1000.0 / steps_per_second)
    }

    pub fn from_interval_ms(interval_ms: f64) -> Self {
        Self {
            interval_ms,
            running: false,
            last_step_ms: None,
        }
    }

    #[inline]
    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Arm the clock. The first tick afterwards is always accepted.
    pub fn start(&mut self) {
        self.running = true;
        self.last_step_ms = None;
    }

    /// Disarm and forget the baseline; pending ticks become [`ClockTick::Idle`].
    pub fn stop(&mut self) {
        self.running = false;
        self.last_step_ms = None;
    }

    pub fn tick(&mut self, now_ms: f64) -> ClockTick {
        if !self.running {
            return ClockTick::Idle;
        }
        if !now_ms.is_finite() {
            return ClockTick::Waiting;
        }
        match self.last_step_ms {
            None => {
                self.last_step_ms = Some(now_ms);
                ClockTick::Step
            }
            // Host clock went backwards: re-base, do not advance.
            Some(last) if now_ms < last => {
                self.last_step_ms = Some(now_ms);
                ClockTick::Waiting
            }
            Some(last) if now_ms - last >= self.interval_ms => {
                self.last_step_ms = Some(now_ms);
                ClockTick::Step
            }
            Some(_) => ClockTick::Waiting,
        }
    }
}

//! Core configuration for pose-replay-core.

use serde::{Deserialize, Serialize};

use crate::error::ReplayError;
use crate::render::Rgba;

pub const DEFAULT_PLAYBACK_FPS: f64 = 30.0;
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.3;
pub const DEFAULT_CANVAS_WIDTH: u32 = 360;
pub const DEFAULT_CANVAS_HEIGHT: u32 = 640;

/// Replay configuration. Every field has a default, so hosts may pass a
/// partial JSON object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Nominal clock rate in steps per second.
    pub playback_fps: f64,
    /// Joints at or below this confidence are not drawn.
    pub confidence_threshold: f64,
    pub canvas: CanvasSize,
    pub style: RenderStyle,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            playback_fps: DEFAULT_PLAYBACK_FPS,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            canvas: CanvasSize::default(),
            style: RenderStyle::default(),
        }
    }
}

impl ReplayConfig {
    /// Minimum spacing between accepted clock steps.
    #[inline]
    pub fn frame_interval_ms(&self) -> f64 {
        1000.0 / self.playback_fps
    }

    pub fn validate(&self) -> Result<(), ReplayError> {
        if !self.playback_fps.is_finite() || self.playback_fps <= 0.0 {
            return Err(ReplayError::config(
                "playback_fps",
                format!("must be a positive number, got {}", self.playback_fps),
            ));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ReplayError::config(
                "confidence_threshold",
                format!("must be in [0, 1], got {}", self.confidence_threshold),
            ));
        }
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(ReplayError::config(
                "canvas",
                format!(
                    "dimensions must be non-zero, got {}x{}",
                    self.canvas.width, self.canvas.height
                ),
            ));
        }
        self.style.validate()
    }
}

/// Drawing surface size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_CANVAS_WIDTH,
            height: DEFAULT_CANVAS_HEIGHT,
        }
    }
}

/// Colors and metrics used by the skeleton renderer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderStyle {
    pub segment_color: Rgba,
    pub segment_width: f32,
    pub marker_color: Rgba,
    pub marker_radius: f32,
    /// Full-canvas overlay drawn inside the airborne window.
    pub tint_color: Rgba,
    pub label_text: String,
    pub label_font: String,
    pub label_color: Rgba,
    /// Text baseline origin, top-left corner.
    pub label_x: f32,
    pub label_y: f32,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            segment_color: Rgba::opaque(0x0e, 0xa5, 0xe9),
            segment_width: 2.0,
            marker_color: Rgba::opaque(0x38, 0xbd, 0xf8),
            marker_radius: 4.0,
            tint_color: Rgba::new(14, 165, 233, 0.12),
            label_text: "AIRBORNE".to_string(),
            label_font: "12px monospace".to_string(),
            label_color: Rgba::opaque(0x0e, 0xa5, 0xe9),
            label_x: 8.0,
            label_y: 16.0,
        }
    }
}

impl RenderStyle {
    fn validate(&self) -> Result<(), ReplayError> {
        for (field, v) in [
            ("style.segment_width", self.segment_width),
            ("style.marker_radius", self.marker_radius),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(ReplayError::config(field, format!("must be positive, got {v}")));
            }
        }
        for (field, c) in [
            ("style.segment_color", self.segment_color),
            ("style.marker_color", self.marker_color),
            ("style.tint_color", self.tint_color),
            ("style.label_color", self.label_color),
        ] {
            if !(0.0..=1.0).contains(&c.a) {
                return Err(ReplayError::config(field, format!("alpha must be in [0, 1], got {}", c.a)));
            }
        }
        Ok(())
    }
}

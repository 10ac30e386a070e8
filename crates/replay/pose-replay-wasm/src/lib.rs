use js_sys::JSON;
use serde::Serialize;
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;
use web_sys::CanvasRenderingContext2d;

use pose_replay_core::{
    parse_jump_event_json, parse_pose_frames_json, parse_replay_json, FrameStore, JumpEvent,
    Point, ReplayConfig, ReplaySession, Rgba, SessionId, Surface, TickOutcome,
};

#[wasm_bindgen]
pub struct PoseReplayViewer {
    core: ReplaySession,
}

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

/// Plain objects instead of JS `Map`s so results can go straight to `JSON.stringify`.
fn to_js<T: Serialize + ?Sized>(value: &T, what: &str) -> Result<JsValue, JsError> {
    value
        .serialize(&swb::Serializer::json_compatible())
        .map_err(|e| JsError::new(&format!("{what} error: {e}")))
}

fn stringify(value: &JsValue, what: &str) -> Result<String, JsError> {
    JSON::stringify(value)
        .map_err(|e| JsError::new(&format!("{what} stringify error: {:?}", e)))?
        .as_string()
        .ok_or_else(|| JsError::new(&format!("{what}: stringify produced non-string")))
}

fn tick_outcome_name(outcome: TickOutcome) -> &'static str {
    match outcome {
        TickOutcome::Idle => "idle",
        TickOutcome::Stale => "stale",
        TickOutcome::Waiting => "waiting",
        TickOutcome::Advanced { .. } => "advanced",
        TickOutcome::Completed => "completed",
    }
}

/// Canvas 2D context as a replay surface.
struct CanvasSurface<'a> {
    ctx: &'a CanvasRenderingContext2d,
}

impl Surface for CanvasSurface<'_> {
    fn clear(&mut self, width: u32, height: u32) {
        self.ctx
            .clear_rect(0.0, 0.0, f64::from(width), f64::from(height));
    }

    fn stroke_line(&mut self, start: Point, end: Point, color: Rgba, width: f32) {
        self.ctx.set_stroke_style_str(&color.to_css());
        self.ctx.set_line_width(f64::from(width));
        self.ctx.begin_path();
        self.ctx.move_to(f64::from(start.x), f64::from(start.y));
        self.ctx.line_to(f64::from(end.x), f64::from(end.y));
        self.ctx.stroke();
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Rgba) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.begin_path();
        // arc only fails on a negative radius, which the config rejects.
        let _ = self.ctx.arc(
            f64::from(center.x),
            f64::from(center.y),
            f64::from(radius),
            0.0,
            std::f64::consts::TAU,
        );
        self.ctx.fill();
    }

    fn fill_rect(&mut self, origin: Point, width: f32, height: f32, color: Rgba) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill_rect(
            f64::from(origin.x),
            f64::from(origin.y),
            f64::from(width),
            f64::from(height),
        );
    }

    fn fill_text(&mut self, text: &str, origin: Point, font: &str, color: Rgba) {
        self.ctx.set_font(font);
        self.ctx.set_fill_style_str(&color.to_css());
        let _ = self
            .ctx
            .fill_text(text, f64::from(origin.x), f64::from(origin.y));
    }
}

#[wasm_bindgen]
impl PoseReplayViewer {
    /// Create an empty viewer. Pass a JSON config object or undefined/null for defaults.
    /// Example:
    ///   new PoseReplayViewer({ playback_fps: 30, canvas: { width: 360, height: 640 } })
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<PoseReplayViewer, JsError> {
        console_error_panic_hook::set_once();

        let cfg: ReplayConfig = if jsvalue_is_undefined_or_null(&config) {
            ReplayConfig::default()
        } else {
            swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))?
        };
        let core = ReplaySession::new(cfg).map_err(|e| JsError::new(&format!("config error: {e}")))?;
        Ok(PoseReplayViewer { core })
    }

    /// Load an array of pose frames and an optional jump event.
    /// Playback resets to the first frame, stopped. Returns the new session id.
    /// Fails only when `frames` is not an array of frames.
    #[wasm_bindgen]
    pub fn load(&mut self, frames: JsValue, event: JsValue) -> Result<u32, JsError> {
        let frames = if jsvalue_is_undefined_or_null(&frames) {
            FrameStore::empty()
        } else {
            let s = stringify(&frames, "load frames")?;
            parse_pose_frames_json(&s)
                .map_err(|e| JsError::new(&format!("load frames parse error: {e}")))?
        };
        // An unreadable event is dropped, as in `load_result`.
        let event: Option<JumpEvent> = if jsvalue_is_undefined_or_null(&event) {
            None
        } else {
            stringify(&event, "load event")
                .ok()
                .and_then(|s| parse_jump_event_json(&s))
        };
        Ok(self.core.load(frames, event).0)
    }

    /// Load an analysis result object (`pose_frames_sample` + `jump_event`)
    /// or a bare frame array. Returns the new session id.
    #[wasm_bindgen(js_name = load_result)]
    pub fn load_result(&mut self, result: JsValue) -> Result<u32, JsError> {
        if jsvalue_is_undefined_or_null(&result) {
            return Err(JsError::new("load_result: result is null/undefined"));
        }
        let s = stringify(&result, "load_result")?;
        let source =
            parse_replay_json(&s).map_err(|e| JsError::new(&format!("load_result parse error: {e}")))?;
        Ok(self.core.load_source(source).0)
    }

    /// Start playback. Returns false when there is nothing to play.
    #[wasm_bindgen]
    pub fn play(&mut self) -> bool {
        self.core.play()
    }

    #[wasm_bindgen]
    pub fn pause(&mut self) -> bool {
        self.core.pause()
    }

    /// Returns true when now playing.
    #[wasm_bindgen]
    pub fn toggle(&mut self) -> bool {
        self.core.toggle()
    }

    /// Jump to a frame position (clamped) and stop. Returns the new position
    /// or undefined for an empty sequence.
    #[wasm_bindgen]
    pub fn seek(&mut self, index: f64) -> Option<u32> {
        let target = if index.is_nan() { 0 } else { index as i64 };
        self.core.seek(target).map(|i| i as u32)
    }

    /// Host tick, usually from `requestAnimationFrame`. `now_ms` is the
    /// callback timestamp. Returns "idle", "waiting", "advanced" or "completed".
    #[wasm_bindgen]
    pub fn tick(&mut self, now_ms: f64) -> String {
        tick_outcome_name(self.core.tick(now_ms)).to_string()
    }

    /// Like `tick`, but ignored ("stale") when `session` is not the current one.
    #[wasm_bindgen(js_name = tick_session)]
    pub fn tick_session(&mut self, session: u32, now_ms: f64) -> String {
        tick_outcome_name(self.core.tick_session(SessionId(session), now_ms)).to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn session(&self) -> u32 {
        self.core.session().0
    }

    /// `{ current_frame_index, is_playing }`.
    #[wasm_bindgen]
    pub fn state(&self) -> Result<JsValue, JsError> {
        to_js(&self.core.state(), "state")
    }

    /// Frame/time readout for the current frame, or null when empty.
    #[wasm_bindgen]
    pub fn readout(&self) -> Result<JsValue, JsError> {
        to_js(&self.core.readout(), "readout")
    }

    /// The readout as display text, e.g. "Frame 5/10 - 0.13s".
    #[wasm_bindgen(js_name = readout_text)]
    pub fn readout_text(&self) -> Option<String> {
        self.core.readout().map(|r| r.to_string())
    }

    #[wasm_bindgen]
    pub fn controls(&self) -> Result<JsValue, JsError> {
        to_js(&self.core.controls(), "controls")
    }

    /// Draw commands for the current frame.
    #[wasm_bindgen]
    pub fn scene(&self) -> Result<JsValue, JsError> {
        to_js(&self.core.scene(), "scene")
    }

    /// Paint the current frame onto a canvas 2D context.
    #[wasm_bindgen]
    pub fn paint(&self, ctx: &CanvasRenderingContext2d) {
        self.core.paint(&mut CanvasSurface { ctx });
    }

    /// Playback events since the last drain.
    #[wasm_bindgen(js_name = drain_events)]
    pub fn drain_events(&mut self) -> Result<JsValue, JsError> {
        let events = self.core.drain_events();
        to_js(&events, "events")
    }

    /// Drop the sequence. Returns the new session id.
    #[wasm_bindgen]
    pub fn clear(&mut self) -> u32 {
        self.core.clear().0
    }
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}

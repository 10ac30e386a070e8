//! Gizmo painting for the replay scene.
//!
//! Gizmos draw outlines only and have no text, so markers become circle
//! outlines, the airborne tint a framing rectangle, and the "AIRBORNE" label
//! is left to an app-provided entity tagged [`AirborneOverlay`].

use bevy::prelude::*;
use pose_replay_core::{Point, ReplaySession, Rgba, Surface};

use crate::{PoseReplay, ReplaySet};

/// Entities shown only while the current frame is inside the flight phase.
#[derive(Component, Debug, Default)]
pub struct AirborneOverlay;

pub struct PoseReplayGizmosPlugin;

impl Plugin for PoseReplayGizmosPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (draw_replay_gizmos, sync_airborne_overlay).after(ReplaySet::Tick),
        );
    }
}

/// The immediate-mode shapes the replay needs, in world space.
/// Implemented for [`Gizmos`]; anything else can record or forward them.
pub trait GizmoSink {
    fn segment(&mut self, start: Vec2, end: Vec2, color: Color);
    fn ring(&mut self, center: Vec2, radius: f32, color: Color);
    fn frame(&mut self, center: Vec2, size: Vec2, color: Color);
}

impl GizmoSink for Gizmos<'_, '_> {
    fn segment(&mut self, start: Vec2, end: Vec2, color: Color) {
        self.line_2d(start, end, color);
    }

    fn ring(&mut self, center: Vec2, radius: f32, color: Color) {
        self.circle_2d(center, radius, color);
    }

    fn frame(&mut self, center: Vec2, size: Vec2, color: Color) {
        self.rect_2d(center, 0.0, size, color);
    }
}

/// Canvas coordinates (origin top-left, y down) to world coordinates
/// centered on the origin with y up.
pub fn canvas_to_world(p: Point, width: u32, height: u32) -> Vec2 {
    Vec2::new(p.x - width as f32 / 2.0, height as f32 / 2.0 - p.y)
}

fn to_color(c: Rgba) -> Color {
    let [r, g, b, a] = c.to_f32_array();
    Color::srgba(r, g, b, a)
}

struct GizmoSurface<'a, G: GizmoSink + ?Sized> {
    sink: &'a mut G,
    width: u32,
    height: u32,
}

impl<G: GizmoSink + ?Sized> Surface for GizmoSurface<'_, G> {
    fn clear(&mut self, width: u32, height: u32) {
        // Immediate mode: nothing persists between frames.
        self.width = width;
        self.height = height;
    }

    // Line width comes from the gizmo config group.
    fn stroke_line(&mut self, start: Point, end: Point, color: Rgba, _width: f32) {
        let (w, h) = (self.width, self.height);
        self.sink.segment(
            canvas_to_world(start, w, h),
            canvas_to_world(end, w, h),
            to_color(color),
        );
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Rgba) {
        self.sink.ring(
            canvas_to_world(center, self.width, self.height),
            radius,
            to_color(color),
        );
    }

    fn fill_rect(&mut self, origin: Point, width: f32, height: f32, color: Rgba) {
        let center = Point::new(origin.x + width / 2.0, origin.y + height / 2.0);
        self.sink.frame(
            canvas_to_world(center, self.width, self.height),
            Vec2::new(width, height),
            to_color(Rgba::opaque(color.r, color.g, color.b)),
        );
    }

    fn fill_text(&mut self, _text: &str, _origin: Point, _font: &str, _color: Rgba) {}
}

/// Paint the session's current frame onto `sink`.
pub fn paint_gizmos<G: GizmoSink + ?Sized>(session: &ReplaySession, sink: &mut G) {
    let canvas = session.config().canvas;
    let mut surface = GizmoSurface {
        sink,
        width: canvas.width,
        height: canvas.height,
    };
    session.paint(&mut surface);
}

pub fn draw_replay_gizmos(replay: Res<PoseReplay>, mut gizmos: Gizmos) {
    paint_gizmos(&replay.0, &mut gizmos);
}

pub fn sync_airborne_overlay(
    replay: Res<PoseReplay>,
    mut overlays: Query<&mut Visibility, With<AirborneOverlay>>,
) {
    let airborne = replay.0.readout().is_some_and(|r| r.airborne);
    let wanted = if airborne {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    };
    for mut vis in &mut overlays {
        if *vis != wanted {
            *vis = wanted;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pose_replay_core::{Joint, JumpEvent, Keypoints, PoseFrame, ReplayConfig};

    #[derive(Default)]
    struct Recorded {
        segments: Vec<(Vec2, Vec2)>,
        rings: Vec<(Vec2, f32)>,
        frames: Vec<(Vec2, Vec2, Color)>,
    }

    impl GizmoSink for Recorded {
        fn segment(&mut self, start: Vec2, end: Vec2, _color: Color) {
            self.segments.push((start, end));
        }
        fn ring(&mut self, center: Vec2, radius: f32, _color: Color) {
            self.rings.push((center, radius));
        }
        fn frame(&mut self, center: Vec2, size: Vec2, color: Color) {
            self.frames.push((center, size, color));
        }
    }

    fn leg_frame(frame_index: u32, knee_conf: f64) -> PoseFrame {
        PoseFrame::new(frame_index, f64::from(frame_index) * 33.3).with_keypoints(
            Keypoints::new()
                .with(Joint::LeftHip, 180.0, 320.0, 0.9)
                .with(Joint::LeftKnee, 180.0, 420.0, knee_conf),
        )
    }

    #[test]
    fn canvas_corners_map_to_centered_world() {
        let world = |x, y| canvas_to_world(Point::new(x, y), 360, 640);
        assert_eq!(world(0.0, 0.0), Vec2::new(-180.0, 320.0));
        assert_eq!(world(360.0, 640.0), Vec2::new(180.0, -320.0));
        assert_eq!(world(180.0, 320.0), Vec2::ZERO);
    }

    #[test]
    fn confident_joints_become_segments_and_rings() {
        let mut session = ReplaySession::with_sequence(
            ReplayConfig::default(),
            vec![leg_frame(0, 0.9), leg_frame(1, 0.2)],
            None,
        )
        .unwrap();

        let mut out = Recorded::default();
        paint_gizmos(&session, &mut out);
        assert_eq!(out.segments, vec![(Vec2::new(0.0, 0.0), Vec2::new(0.0, -100.0))]);
        assert_eq!(
            out.rings,
            vec![(Vec2::new(0.0, 0.0), 4.0), (Vec2::new(0.0, -100.0), 4.0)]
        );
        assert!(out.frames.is_empty());

        session.seek(1);
        let mut out = Recorded::default();
        paint_gizmos(&session, &mut out);
        assert!(out.segments.is_empty());
        assert_eq!(out.rings, vec![(Vec2::new(0.0, 0.0), 4.0)]);
    }

    /// it should frame the canvas only while inside [takeoff, landing]
    #[test]
    fn framing_rect_follows_airborne_window() {
        let frames: Vec<PoseFrame> = (0..5).map(|i| leg_frame(i, 0.9)).collect();
        let event = Some(JumpEvent::new(2, 3));
        let mut session =
            ReplaySession::with_sequence(ReplayConfig::default(), frames, event).unwrap();

        let framed: Vec<bool> = (0..5)
            .map(|i| {
                session.seek(i);
                let mut out = Recorded::default();
                paint_gizmos(&session, &mut out);
                !out.frames.is_empty()
            })
            .collect();
        assert_eq!(framed, vec![false, false, true, true, false]);

        session.seek(2);
        let mut out = Recorded::default();
        paint_gizmos(&session, &mut out);
        let (center, size, color) = out.frames[0];
        assert_eq!(center, Vec2::ZERO);
        assert_eq!(size, Vec2::new(360.0, 640.0));
        // Outline only: the translucent tint is drawn opaque.
        assert_eq!(color, Color::srgba(14.0 / 255.0, 165.0 / 255.0, 233.0 / 255.0, 1.0));
    }

    #[test]
    fn empty_session_paints_nothing() {
        let mut out = Recorded::default();
        paint_gizmos(&ReplaySession::default(), &mut out);
        assert!(out.segments.is_empty() && out.rings.is_empty() && out.frames.is_empty());
    }
}

//! Skeleton renderer.
//!
//! Rendering is split in two: [`SkeletonRenderer::render`] is a pure function
//! from `(frame, canvas size, event)` to a [`Scene`] (an ordered list of draw
//! commands), and [`Scene::paint`] replays those commands onto any host
//! [`Surface`]. Tests assert on the scene geometry instead of pixels.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{RenderStyle, ReplayConfig, DEFAULT_CONFIDENCE_THRESHOLD};
use crate::data::{JumpEvent, PoseFrame};
use crate::topology::{Joint, SKELETON_CONNECTIONS};

/// sRGB color with straight alpha.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Normalized `[r, g, b, a]`.
    pub fn to_f32_array(self) -> [f32; 4] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
            self.a,
        ]
    }

    /// CSS color string: `#rrggbb` when opaque, `rgba(...)` otherwise.
    pub fn to_css(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a >= 1.0 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One primitive of a rendered scene.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawCommand {
    Clear {
        width: u32,
        height: u32,
    },
    Segment {
        from: Joint,
        to: Joint,
        start: Point,
        end: Point,
        color: Rgba,
        width: f32,
    },
    Marker {
        joint: Joint,
        center: Point,
        radius: f32,
        color: Rgba,
    },
    Tint {
        color: Rgba,
        width: u32,
        height: u32,
    },
    Label {
        text: String,
        origin: Point,
        font: String,
        color: Rgba,
    },
}

/// A 2D drawing target. Implemented by hosts (canvas context, gizmos) and
/// by test recorders.
pub trait Surface {
    fn clear(&mut self, width: u32, height: u32);
    fn stroke_line(&mut self, start: Point, end: Point, color: Rgba, width: f32);
    fn fill_circle(&mut self, center: Point, radius: f32, color: Rgba);
    fn fill_rect(&mut self, origin: Point, width: f32, height: f32, color: Rgba);
    fn fill_text(&mut self, text: &str, origin: Point, font: &str, color: Rgba);
}

/// Output of one render pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub commands: Vec<DrawCommand>,
}

impl Scene {
    /// Just a cleared surface.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            commands: vec![DrawCommand::Clear { width, height }],
        }
    }

    /// Replay every command onto `surface`, in order.
    pub fn paint<S: Surface + ?Sized>(&self, surface: &mut S) {
        for cmd in &self.commands {
            match cmd {
                DrawCommand::Clear { width, height } => surface.clear(*width, *height),
                DrawCommand::Segment {
                    start,
                    end,
                    color,
                    width,
                    ..
                } => surface.stroke_line(*start, *end, *color, *width),
                DrawCommand::Marker {
                    center,
                    radius,
                    color,
                    ..
                } => surface.fill_circle(*center, *radius, *color),
                DrawCommand::Tint {
                    color,
                    width,
                    height,
                } => surface.fill_rect(Point::new(0.0, 0.0), *width as f32, *height as f32, *color),
                DrawCommand::Label {
                    text,
                    origin,
                    font,
                    color,
                } => surface.fill_text(text, *origin, font, *color),
            }
        }
    }

    /// Joint pairs of drawn segments, in draw order.
    pub fn segments(&self) -> impl Iterator<Item = (Joint, Joint)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Segment { from, to, .. } => Some((*from, *to)),
            _ => None,
        })
    }

    /// Joints with a drawn marker, in draw order.
    pub fn markers(&self) -> impl Iterator<Item = Joint> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Marker { joint, .. } => Some(*joint),
            _ => None,
        })
    }

    pub fn is_airborne(&self) -> bool {
        self.commands
            .iter()
            .any(|c| matches!(c, DrawCommand::Tint { .. }))
    }

    /// Nothing beyond the clear.
    pub fn is_blank(&self) -> bool {
        self.commands
            .iter()
            .all(|c| matches!(c, DrawCommand::Clear { .. }))
    }
}

/// Stateless skeleton renderer. Holds only configuration.
#[derive(Clone, Debug)]
pub struct SkeletonRenderer {
    threshold: f64,
    style: RenderStyle,
    topology: &'static [(Joint, Joint)],
}

impl Default for SkeletonRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIDENCE_THRESHOLD, RenderStyle::default())
    }
}

impl SkeletonRenderer {
    pub fn new(threshold: f64, style: RenderStyle) -> Self {
        Self {
            threshold,
            style,
            topology: &SKELETON_CONNECTIONS,
        }
    }

    pub fn from_config(cfg: &ReplayConfig) -> Self {
        Self::new(cfg.confidence_threshold, cfg.style.clone())
    }

    /// Replace the connection set (defaults to [`SKELETON_CONNECTIONS`]).
    pub fn with_topology(mut self, topology: &'static [(Joint, Joint)]) -> Self {
        self.topology = topology;
        self
    }

    #[inline]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    /// Render one frame. Draw order: clear, segments (topology order),
    /// markers (joint order), then tint and label inside the airborne window.
    pub fn render(
        &self,
        frame: Option<&PoseFrame>,
        width: u32,
        height: u32,
        event: Option<&JumpEvent>,
    ) -> Scene {
        let mut scene = Scene::blank(width, height);
        let Some(frame) = frame else {
            return scene;
        };
        let kps = &frame.keypoints;
        let style = &self.style;

        for &(a, b) in self.topology {
            let (ka, kb) = (kps.get(a), kps.get(b));
            if ka.is_confident(self.threshold) && kb.is_confident(self.threshold) {
                scene.commands.push(DrawCommand::Segment {
                    from: a,
                    to: b,
                    start: Point::new(ka.x, ka.y),
                    end: Point::new(kb.x, kb.y),
                    color: style.segment_color,
                    width: style.segment_width,
                });
            }
        }

        for (joint, k) in kps.iter() {
            if k.is_confident(self.threshold) && k.has_position() {
                scene.commands.push(DrawCommand::Marker {
                    joint,
                    center: Point::new(k.x, k.y),
                    radius: style.marker_radius,
                    color: style.marker_color,
                });
            }
        }

        if event.is_some_and(|ev| ev.contains(frame.frame_index)) {
            scene.commands.push(DrawCommand::Tint {
                color: style.tint_color,
                width,
                height,
            });
            scene.commands.push(DrawCommand::Label {
                text: style.label_text.clone(),
                origin: Point::new(style.label_x, style.label_y),
                font: style.label_font.clone(),
                color: style.label_color,
            });
        }

        scene
    }
}

/// Render with the default threshold and style.
pub fn render(
    frame: Option<&PoseFrame>,
    width: u32,
    height: u32,
    event: Option<&JumpEvent>,
) -> Scene {
    SkeletonRenderer::default().render(frame, width, height, event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Keypoints;

    fn arm_frame(conf: f64) -> PoseFrame {
        PoseFrame::new(0, 0.0).with_keypoints(
            Keypoints::new()
                .with(Joint::LeftShoulder, 100.0, 200.0, 0.9)
                .with(Joint::LeftElbow, 120.0, 260.0, conf)
                .with(Joint::LeftWrist, 130.0, 320.0, 0.9),
        )
    }

    #[test]
    fn no_frame_renders_cleared_surface_only() {
        let scene = render(None, 360, 640, Some(&JumpEvent::new(0, 10)));
        assert!(scene.is_blank());
        assert_eq!(scene.commands, vec![DrawCommand::Clear { width: 360, height: 640 }]);
    }

    #[test]
    fn low_confidence_joint_drops_both_adjacent_segments() {
        let scene = render(Some(&arm_frame(0.2)), 360, 640, None);
        assert_eq!(scene.segments().count(), 0);
        assert_eq!(
            scene.markers().collect::<Vec<_>>(),
            vec![Joint::LeftShoulder, Joint::LeftWrist]
        );

        let scene = render(Some(&arm_frame(0.8)), 360, 640, None);
        assert_eq!(
            scene.segments().collect::<Vec<_>>(),
            vec![
                (Joint::LeftShoulder, Joint::LeftElbow),
                (Joint::LeftElbow, Joint::LeftWrist)
            ]
        );
    }

    #[test]
    fn marker_requires_strictly_positive_coordinates() {
        let frame = PoseFrame::new(0, 0.0).with_keypoints(
            Keypoints::new()
                .with(Joint::Nose, 0.0, 50.0, 0.9)
                .with(Joint::LeftEye, 10.0, 0.0, 0.9)
                .with(Joint::RightEye, 10.0, 10.0, 0.9),
        );
        let scene = render(Some(&frame), 360, 640, None);
        assert_eq!(scene.markers().collect::<Vec<_>>(), vec![Joint::RightEye]);
        // Segments only look at confidence.
        assert_eq!(
            scene.segments().collect::<Vec<_>>(),
            vec![(Joint::Nose, Joint::LeftEye), (Joint::Nose, Joint::RightEye)]
        );
    }

    #[test]
    fn custom_topology_is_honoured() {
        static ONLY_ARM: [(Joint, Joint); 1] = [(Joint::LeftShoulder, Joint::LeftWrist)];
        let r = SkeletonRenderer::default().with_topology(&ONLY_ARM);
        let scene = r.render(Some(&arm_frame(0.9)), 360, 640, None);
        assert_eq!(
            scene.segments().collect::<Vec<_>>(),
            vec![(Joint::LeftShoulder, Joint::LeftWrist)]
        );
    }

    #[test]
    fn css_colors() {
        assert_eq!(Rgba::opaque(0x0e, 0xa5, 0xe9).to_css(), "#0ea5e9");
        assert_eq!(Rgba::new(14, 165, 233, 0.12).to_css(), "rgba(14, 165, 233, 0.12)");
    }
}

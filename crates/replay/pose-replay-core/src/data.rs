//! Pose frame data model: keypoints, frames, the frame store and the jump event.
//!
//! Wire names follow the analysis-result payload (`frame_idx`, `timestamp_ms`,
//! `keypoints: { name: [x, y, confidence] }`, `takeoff_frame`, `landing_frame`).

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, warn};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ReplayError;
use crate::topology::{Joint, JOINT_COUNT};

/// One joint estimate in canvas space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    /// Detection confidence in [0, 1]. Kept at payload precision so the
    /// strict threshold comparison sees the producer's value.
    pub confidence: f64,
}

impl Keypoint {
    /// Placeholder for omitted or invalid joints.
    pub const ABSENT: Keypoint = Keypoint {
        x: 0.0,
        y: 0.0,
        confidence: 0.0,
    };

    pub const fn new(x: f32, y: f32, confidence: f64) -> Self {
        Self { x, y, confidence }
    }

    /// Builds a keypoint only when all components are finite and the
    /// confidence lies in [0, 1].
    pub fn checked(x: f32, y: f32, confidence: f64) -> Option<Self> {
        let finite = x.is_finite() && y.is_finite() && confidence.is_finite();
        (finite && (0.0..=1.0).contains(&confidence)).then_some(Self::new(x, y, confidence))
    }

    /// Confidence strictly above `threshold`.
    #[inline]
    pub fn is_confident(&self, threshold: f64) -> bool {
        self.confidence > threshold
    }

    /// Both coordinates strictly positive (origin placeholders excluded).
    #[inline]
    pub fn has_position(&self) -> bool {
        self.x > 0.0 && self.y > 0.0
    }

    #[inline]
    pub fn is_absent(&self) -> bool {
        *self == Self::ABSENT
    }
}

/// Keypoints of one frame, one slot per [`Joint`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Keypoints([Keypoint; JOINT_COUNT]);

impl Keypoints {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, joint: Joint) -> Keypoint {
        self.0[joint.index()]
    }

    #[inline]
    pub fn set(&mut self, joint: Joint, keypoint: Keypoint) {
        self.0[joint.index()] = keypoint;
    }

    /// Builder-style setter.
    pub fn with(mut self, joint: Joint, x: f32, y: f32, confidence: f64) -> Self {
        self.set(joint, Keypoint::new(x, y, confidence));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (Joint, Keypoint)> + '_ {
        Joint::ALL.iter().map(move |j| (*j, self.get(*j)))
    }

    /// Joints carrying anything other than the absent placeholder.
    pub fn present_count(&self) -> usize {
        self.0.iter().filter(|k| !k.is_absent()).count()
    }
}

fn keypoint_from_value(value: &serde_json::Value) -> Option<Keypoint> {
    let items = value.as_array()?;
    if items.len() != 3 {
        return None;
    }
    let x = items[0].as_f64()? as f32;
    let y = items[1].as_f64()? as f32;
    let confidence = items[2].as_f64()?;
    Keypoint::checked(x, y, confidence)
}

impl Serialize for Keypoints {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let present: Vec<(Joint, Keypoint)> = self.iter().filter(|(_, k)| !k.is_absent()).collect();
        let mut map = serializer.serialize_map(Some(present.len()))?;
        for (joint, k) in present {
            map.serialize_entry(joint.name(), &(k.x, k.y, k.confidence))?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Keypoints {
    /// Never fails on content: unknown joints are ignored and malformed
    /// entries become [`Keypoint::ABSENT`].
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        let mut out = Keypoints::default();
        let entries: BTreeMap<String, serde_json::Value> = match raw {
            serde_json::Value::Object(map) => map.into_iter().collect(),
            serde_json::Value::Null => BTreeMap::new(),
            other => {
                warn!("keypoints is not an object ({other}); treating frame as empty");
                BTreeMap::new()
            }
        };
        for (name, value) in entries {
            let Some(joint) = Joint::from_name(&name) else {
                debug!("ignoring unknown joint '{name}'");
                continue;
            };
            match keypoint_from_value(&value) {
                Some(k) => out.set(joint, k),
                None => warn!("joint '{name}' has invalid entry {value}; treating as absent"),
            }
        }
        Ok(out)
    }
}

/// One sampled instant of the motion sequence.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseFrame {
    /// Source frame index; strictly increasing across a sequence.
    #[serde(rename = "frame_idx", alias = "frameIndex")]
    pub frame_index: u32,
    /// Source-video time this frame represents.
    #[serde(alias = "timestampMs")]
    pub timestamp_ms: f64,
    #[serde(default)]
    pub keypoints: Keypoints,
}

impl PoseFrame {
    pub fn new(frame_index: u32, timestamp_ms: f64) -> Self {
        Self {
            frame_index,
            timestamp_ms,
            keypoints: Keypoints::default(),
        }
    }

    pub fn with_keypoints(mut self, keypoints: Keypoints) -> Self {
        self.keypoints = keypoints;
        self
    }

    #[inline]
    pub fn timestamp_seconds(&self) -> f64 {
        self.timestamp_ms / 1000.0
    }
}

/// Detected flight phase, in source frame indices (inclusive on both ends).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JumpEvent {
    #[serde(alias = "takeoffFrame")]
    pub takeoff_frame: i64,
    #[serde(alias = "landingFrame")]
    pub landing_frame: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub takeoff_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landing_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flight_time_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_inches: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl JumpEvent {
    pub fn new(takeoff_frame: i64, landing_frame: i64) -> Self {
        Self {
            takeoff_frame,
            landing_frame,
            takeoff_ms: None,
            landing_ms: None,
            flight_time_ms: None,
            height_inches: None,
            height_cm: None,
            confidence: None,
        }
    }

    #[inline]
    pub fn is_ordered(&self) -> bool {
        self.takeoff_frame <= self.landing_frame
    }

    /// Whether `frame_index` is inside the airborne window. Inverted events
    /// contain nothing.
    #[inline]
    pub fn contains(&self, frame_index: u32) -> bool {
        let i = i64::from(frame_index);
        self.is_ordered() && self.takeoff_frame <= i && i <= self.landing_frame
    }

    /// Both ends reference indices in `[0, last_frame_index]`.
    pub fn is_within(&self, last_frame_index: u32) -> bool {
        let last = i64::from(last_frame_index);
        (0..=last).contains(&self.takeoff_frame) && (0..=last).contains(&self.landing_frame)
    }
}

/// Immutable, ordered frame sequence shared read-only between the caller and
/// the core. Cloning is cheap.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<PoseFrame>", into = "Vec<PoseFrame>")]
pub struct FrameStore {
    frames: Arc<[PoseFrame]>,
}

impl FrameStore {
    pub fn new(frames: impl Into<Arc<[PoseFrame]>>) -> Self {
        Self {
            frames: frames.into(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    #[inline]
    pub fn get(&self, position: usize) -> Option<&PoseFrame> {
        self.frames.get(position)
    }

    pub fn as_slice(&self) -> &[PoseFrame] {
        &self.frames
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PoseFrame> {
        self.frames.iter()
    }

    /// `frame_idx` of the last frame, if any.
    pub fn last_frame_index(&self) -> Option<u32> {
        self.frames.last().map(|f| f.frame_index)
    }

    /// Check ordering invariants: finite non-negative timestamps, strictly
    /// increasing `frame_idx`, non-decreasing `timestamp_ms`.
    pub fn validate(&self) -> Result<(), ReplayError> {
        let mut prev: Option<&PoseFrame> = None;
        for (position, frame) in self.frames.iter().enumerate() {
            if !frame.timestamp_ms.is_finite() || frame.timestamp_ms < 0.0 {
                return Err(ReplayError::InvalidSequence {
                    position,
                    reason: format!("timestamp_ms {} is not a valid time", frame.timestamp_ms),
                });
            }
            if let Some(p) = prev {
                if frame.frame_index <= p.frame_index {
                    return Err(ReplayError::InvalidSequence {
                        position,
                        reason: format!(
                            "frame_idx {} does not increase after {}",
                            frame.frame_index, p.frame_index
                        ),
                    });
                }
                if frame.timestamp_ms < p.timestamp_ms {
                    return Err(ReplayError::InvalidSequence {
                        position,
                        reason: format!(
                            "timestamp_ms {} decreases after {}",
                            frame.timestamp_ms, p.timestamp_ms
                        ),
                    });
                }
            }
            prev = Some(frame);
        }
        Ok(())
    }
}

impl Default for FrameStore {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Vec<PoseFrame>> for FrameStore {
    fn from(frames: Vec<PoseFrame>) -> Self {
        Self::new(frames)
    }
}

impl From<FrameStore> for Vec<PoseFrame> {
    fn from(store: FrameStore) -> Self {
        store.frames.to_vec()
    }
}

impl<'a> IntoIterator for &'a FrameStore {
    type Item = &'a PoseFrame;
    type IntoIter = std::slice::Iter<'a, PoseFrame>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

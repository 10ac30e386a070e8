use log::warn;
use serde::Deserialize;

use crate::data::{FrameStore, JumpEvent, PoseFrame};
use crate::error::ReplayError;

/// Frames and event ready to hand to a [`ReplaySession`](crate::ReplaySession).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReplaySource {
    pub frames: FrameStore,
    pub event: Option<JumpEvent>,
}

/// Public API: parse a replay payload into frames and an optional event.
///
/// Accepted shapes:
/// - the analysis-result object (`pose_frames_sample`, `jump_event`, other fields ignored);
///   `pose_frames` and `frames` are accepted as aliases for the frame list;
/// - a bare JSON array of frames.
///
/// Notes:
/// - Malformed joints never fail the parse; they load as absent.
/// - A `jump_event` that is null, missing, or not a valid event loads as `None`.
/// - Ordering violations are logged and tolerated (see `FrameStore::validate`).
pub fn parse_replay_json(s: &str) -> Result<ReplaySource, ReplayError> {
    let payload: RawPayload = serde_json::from_str(s)?;
    let source = match payload {
        RawPayload::Frames(frames) => ReplaySource {
            frames: frames.into(),
            event: None,
        },
        RawPayload::Result(result) => ReplaySource {
            frames: result.pose_frames_sample.into(),
            event: result.jump_event.and_then(to_event),
        },
    };
    if let Err(e) = source.frames.validate() {
        warn!("replay payload has an ordering problem: {e}");
    }
    Ok(source)
}

/// Parse a bare JSON array of frames.
pub fn parse_pose_frames_json(s: &str) -> Result<FrameStore, ReplayError> {
    let frames: Vec<PoseFrame> = serde_json::from_str(s)?;
    Ok(frames.into())
}

/// Parse a standalone jump event. Never fails: malformed JSON or an
/// unreadable event is logged and yields `None`, same as inside a payload.
pub fn parse_jump_event_json(s: &str) -> Option<JumpEvent> {
    match serde_json::from_str::<serde_json::Value>(s) {
        Ok(raw) => to_event(raw),
        Err(e) => {
            warn!("ignoring unparseable jump_event: {e}");
            None
        }
    }
}

fn to_event(raw: serde_json::Value) -> Option<JumpEvent> {
    if raw.is_null() {
        return None;
    }
    match serde_json::from_value::<JumpEvent>(raw) {
        Ok(ev) => Some(ev),
        Err(e) => {
            warn!("ignoring unreadable jump_event: {e}");
            None
        }
    }
}

// ----- JSON schema (serde) -----

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPayload {
    Frames(Vec<PoseFrame>),
    Result(AnalysisPayload),
}

#[derive(Debug, Deserialize)]
struct AnalysisPayload {
    #[serde(default, alias = "pose_frames", alias = "frames")]
    pose_frames_sample: Vec<PoseFrame>,
    #[serde(default)]
    jump_event: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_array_has_no_event() {
        let src = parse_replay_json(
            r#"[{"frame_idx": 0, "timestamp_ms": 0.0, "keypoints": {"nose": [5, 5, 0.9]}}]"#,
        )
        .unwrap();
        assert_eq!(src.frames.len(), 1);
        assert!(src.event.is_none());
    }

    #[test]
    fn unreadable_event_is_dropped() {
        let src = parse_replay_json(
            r#"{"pose_frames_sample": [{"frame_idx": 0, "timestamp_ms": 0.0}], "jump_event": {}}"#,
        )
        .unwrap();
        assert_eq!(src.frames.len(), 1);
        assert!(src.event.is_none());
    }

    #[test]
    fn aliases_for_frame_list() {
        let src = parse_replay_json(
            r#"{"frames": [{"frame_idx": 3, "timestamp_ms": 100.0}], "jump_event": null}"#,
        )
        .unwrap();
        assert_eq!(src.frames.last_frame_index(), Some(3));
    }

    #[test]
    fn standalone_event_is_tolerant() {
        let ev = parse_jump_event_json(r#"{"takeoff_frame": 3, "landing_frame": 7}"#).unwrap();
        assert_eq!((ev.takeoff_frame, ev.landing_frame), (3, 7));
        assert!(parse_jump_event_json(r#"{"takeoff_frame": "soon"}"#).is_none());
        assert!(parse_jump_event_json("null").is_none());
        assert!(parse_jump_event_json("{oops").is_none());
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        assert!(matches!(
            parse_replay_json("{not json"),
            Err(ReplayError::Parse { .. })
        ));
        assert!(parse_pose_frames_json(r#"{"frame_idx": 0}"#).is_err());
    }
}

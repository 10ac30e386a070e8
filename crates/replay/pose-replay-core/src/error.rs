//! Error types for the fallible edges of the replay core.
//!
//! Playback and rendering never fail; bad pose data degrades to drawing less.
//! Only payload parsing, configuration and sequence validation report errors.

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ReplayError {
    /// Payload could not be decoded
    #[error("Parse error: {reason}")]
    Parse { reason: String },

    /// Configuration value out of its accepted domain
    #[error("Invalid config: {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    /// Frame ordering invariant violated
    #[error("Invalid sequence at position {position}: {reason}")]
    InvalidSequence { position: usize, reason: String },
}

impl ReplayError {
    pub(crate) fn config(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Parse { .. } => "serialization",
            Self::InvalidConfig { .. } => "config",
            Self::InvalidSequence { .. } => "validation",
        }
    }
}

impl From<serde_json::Error> for ReplayError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories() {
        assert_eq!(ReplayError::config("canvas", "zero").category(), "config");
        let seq = ReplayError::InvalidSequence {
            position: 3,
            reason: "frame_idx not increasing".into(),
        };
        assert_eq!(seq.category(), "validation");
        assert_eq!(
            seq.to_string(),
            "Invalid sequence at position 3: frame_idx not increasing"
        );
    }

    #[test]
    fn json_errors_convert_to_parse() {
        let err: ReplayError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, ReplayError::Parse { .. }));
        assert_eq!(err.category(), "serialization");
    }
}

//! Submission lifecycle state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the current submission is.
///
/// ```text
/// Idle ──► Validating ──► InFlight ──► Succeeded(msg)
///              │              └──────► Failed(msg)
///              └────────────────────► Failed(msg)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum SubmissionState {
    #[default]
    Idle,
    Validating,
    InFlight,
    Succeeded(String),
    Failed(String),
}

impl SubmissionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SubmissionState::Succeeded(_) | SubmissionState::Failed(_))
    }

    /// Validating or waiting on the service.
    pub fn is_busy(&self) -> bool {
        matches!(self, SubmissionState::Validating | SubmissionState::InFlight)
    }

    /// Whether a new submission may start from here.
    pub fn accepts_submit(&self) -> bool {
        !self.is_busy()
    }

    /// Message of a terminal state.
    pub fn message(&self) -> Option<&str> {
        match self {
            SubmissionState::Succeeded(msg) | SubmissionState::Failed(msg) => Some(msg),
            _ => None,
        }
    }
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionState::Idle => write!(f, "idle"),
            SubmissionState::Validating => write!(f, "validating"),
            SubmissionState::InFlight => write!(f, "in flight"),
            SubmissionState::Succeeded(msg) => write!(f, "succeeded: {}", msg),
            SubmissionState::Failed(msg) => write!(f, "failed: {}", msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicates() {
        assert!(SubmissionState::Idle.accepts_submit());
        assert!(!SubmissionState::Validating.accepts_submit());
        assert!(!SubmissionState::InFlight.accepts_submit());
        assert!(SubmissionState::Failed("x".into()).accepts_submit());
        assert!(SubmissionState::Succeeded("ok".into()).is_terminal());
        assert!(!SubmissionState::InFlight.is_terminal());
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(SubmissionState::Succeeded("Scan started".into())).unwrap();
        assert_eq!(json["state"], "succeeded");
        assert_eq!(json["message"], "Scan started");

        let json = serde_json::to_value(SubmissionState::InFlight).unwrap();
        assert_eq!(json["state"], "in_flight");
    }
}

//! Tri-state session signal.

use serde::{Deserialize, Serialize};

use crate::identity::Identity;

/// Resolution of the current authentication status.
///
/// `Unresolved` only covers the gap before the provider's first answer;
/// once resolved the signal moves between `Absent` and `Present`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", content = "identity", rename_all = "snake_case")]
pub enum SessionSignal {
    /// No answer from the provider yet
    #[default]
    Unresolved,
    /// The provider confirmed there is no session
    Absent,
    /// A signed-in identity
    Present(Identity),
}

impl SessionSignal {
    /// Whether the provider has answered at least once.
    pub fn is_resolved(&self) -> bool {
        !matches!(self, SessionSignal::Unresolved)
    }

    /// The identity, if present.
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionSignal::Present(identity) => Some(identity),
            _ => None,
        }
    }

    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            SessionSignal::Unresolved => "unresolved",
            SessionSignal::Absent => "absent",
            SessionSignal::Present(_) => "present",
        }
    }
}

use serde::{Deserialize, Serialize};

/// Lifecycle state of one session instance
///
/// Transitions only move forward. `Ended` is terminal; a new session
/// needs a fresh controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Connecting,
    Active,
    Ending,
    Ended,
}

impl SessionState {
    /// Connecting or Active: a stop command has something to end
    pub fn is_live(&self) -> bool {
        matches!(self, SessionState::Connecting | SessionState::Active)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Ended)
    }
}

use super::state::SessionState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Observable snapshot of a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    pub session_id: String,

    /// Current lifecycle state
    pub state: SessionState,

    /// Whether the assistant is currently speaking (UI only)
    pub assistant_speaking: bool,

    /// Number of finalized utterances
    pub utterance_count: usize,

    /// Whether a speaker turn is still accumulating
    pub open_turn: bool,

    /// When the call went active
    pub started_at: Option<DateTime<Utc>>,

    /// Seconds since the call went active
    pub duration_secs: f64,
}

impl SessionStats {
    pub(crate) fn idle(session_id: String) -> Self {
        Self {
            session_id,
            state: SessionState::Idle,
            assistant_speaking: false,
            utterance_count: 0,
            open_turn: false,
            started_at: None,
            duration_secs: 0.0,
        }
    }
}

use thiserror::Error;

use crate::session::SessionState;

/// Result type alias for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors raised by the interview session engine
///
/// None of these are fatal to the process. Post-session failures
/// (scoring, persistence) are logged and never reach the state machine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("Session already active (state: {state:?})")]
    AlreadyActive { state: SessionState },

    #[error("Voice transport error: {0}")]
    Transport(String),

    #[error("Capture error: {0}")]
    Capture(String),

    #[error("Face detection error: {0}")]
    Detection(String),

    #[error("Scoring error: {0}")]
    Scoring(String),

    #[error("Malformed evaluation: {0}")]
    MalformedEvaluation(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Session controller is no longer running")]
    ControllerGone,
}

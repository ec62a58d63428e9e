use crate::evaluation::EvaluationResult;

/// Non-fatal, observable side effects of a session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionNotice {
    /// A presence check found no face
    SubjectNotVisible { session_id: String, tick: u64 },

    /// Evaluation scored and persisted
    EvaluationRecorded {
        session_id: String,
        result: EvaluationResult,
    },

    /// Evaluation could not be scored or persisted
    EvaluationFailed { session_id: String, reason: String },
}

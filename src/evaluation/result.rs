use crate::error::{SessionError, SessionResult};
use serde::{Deserialize, Serialize};

/// Structured scores returned by the scoring service
///
/// Every score is an integer in 1..=10.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub clarity: u8,
    pub problem_solving: u8,
    pub communication: u8,
    pub confidence: u8,
    pub technical: u8,
    pub overall_feedback: String,
}

impl EvaluationResult {
    /// Parse and validate a raw scoring reply
    ///
    /// Tolerates a surrounding Markdown code fence. Anything that does not
    /// match the expected shape is a `MalformedEvaluation` error.
    pub fn parse(raw: &str) -> SessionResult<Self> {
        let body = strip_code_fence(raw);

        let result: EvaluationResult = serde_json::from_str(body)
            .map_err(|e| SessionError::MalformedEvaluation(e.to_string()))?;

        result.validate()?;
        Ok(result)
    }

    /// Check the score ranges
    pub fn validate(&self) -> SessionResult<()> {
        let scores = [
            ("clarity", self.clarity),
            ("problemSolving", self.problem_solving),
            ("communication", self.communication),
            ("confidence", self.confidence),
            ("technical", self.technical),
        ];

        for (name, score) in scores {
            if !(1..=10).contains(&score) {
                return Err(SessionError::MalformedEvaluation(format!(
                    "{} score {} outside 1..=10",
                    name, score
                )));
            }
        }

        if self.overall_feedback.trim().is_empty() {
            return Err(SessionError::MalformedEvaluation(
                "overallFeedback is empty".to_string(),
            ));
        }

        Ok(())
    }
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop an optional language tag on the opening fence line
    let inner = match inner.find('\n') {
        Some(newline) => &inner[newline + 1..],
        None => inner,
    };

    inner.strip_suffix("```").unwrap_or(inner).trim()
}

use super::document::render_document;
use super::result::EvaluationResult;
use crate::error::{SessionError, SessionResult};
use crate::session::SessionNotice;
use crate::transcript::Transcript;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Scoring capability: turns an evaluation document into scores
#[async_trait::async_trait]
pub trait Scorer: Send + Sync {
    /// Score a rendered evaluation document
    ///
    /// Replies not matching the `EvaluationResult` shape must be
    /// reported as errors.
    async fn evaluate(&self, document: &str) -> SessionResult<EvaluationResult>;
}

/// Persistence capability: records a subject's evaluation
#[async_trait::async_trait]
pub trait PerformanceStore: Send + Sync {
    async fn update_performance(
        &self,
        subject_id: &str,
        result: &EvaluationResult,
    ) -> SessionResult<()>;
}

/// How a detached evaluation finished
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// Scored and persisted under the subject id
    Recorded(EvaluationResult),
    /// Scored, but no subject id to persist under
    Unrecorded(EvaluationResult),
    /// Scoring failed; nothing was persisted
    ScoringFailed(SessionError),
    /// Scored, but persisting the result failed
    PersistenceFailed {
        result: EvaluationResult,
        error: SessionError,
    },
}

/// Formats the final transcript, scores it and persists the result
#[derive(Clone)]
pub struct EvaluationDispatcher {
    scorer: Arc<dyn Scorer>,
    store: Arc<dyn PerformanceStore>,
    timeout: Duration,
    notices: Option<broadcast::Sender<SessionNotice>>,
}

impl EvaluationDispatcher {
    pub fn new(scorer: Arc<dyn Scorer>, store: Arc<dyn PerformanceStore>, timeout: Duration) -> Self {
        Self {
            scorer,
            store,
            timeout,
            notices: None,
        }
    }

    /// Publish evaluation notices on this channel
    pub fn with_notices(mut self, notices: broadcast::Sender<SessionNotice>) -> Self {
        self.notices = Some(notices);
        self
    }

    /// Start the evaluation in the background
    ///
    /// Returns immediately. The handle is only for observers; nothing in
    /// the session lifecycle waits on it.
    pub fn dispatch(
        &self,
        session_id: String,
        transcript: &Transcript,
        subject_id: Option<String>,
    ) -> JoinHandle<DispatchOutcome> {
        let document = render_document(transcript);
        let dispatcher = self.clone();

        info!(
            "Dispatching evaluation for session {} ({} utterances)",
            session_id,
            transcript.len()
        );

        tokio::spawn(async move {
            dispatcher
                .run(&session_id, &document, subject_id.as_deref())
                .await
        })
    }

    /// Score the document and persist the result
    pub async fn run(
        &self,
        session_id: &str,
        document: &str,
        subject_id: Option<&str>,
    ) -> DispatchOutcome {
        let result = match self.score(document).await {
            Ok(result) => result,
            Err(e) => {
                error!(
                    "Session {} ended without a recorded evaluation: {}",
                    session_id, e
                );
                self.notify(SessionNotice::EvaluationFailed {
                    session_id: session_id.to_string(),
                    reason: e.to_string(),
                });
                return DispatchOutcome::ScoringFailed(e);
            }
        };

        let Some(subject_id) = subject_id else {
            warn!(
                "Session {} has no subject id; evaluation not persisted",
                session_id
            );
            return DispatchOutcome::Unrecorded(result);
        };

        match self.persist(subject_id, &result).await {
            Ok(()) => {
                info!(
                    "Recorded evaluation for subject {} (session {})",
                    subject_id, session_id
                );
                self.notify(SessionNotice::EvaluationRecorded {
                    session_id: session_id.to_string(),
                    result: result.clone(),
                });
                DispatchOutcome::Recorded(result)
            }
            Err(e) => {
                error!(
                    "Session {} ended without a recorded evaluation: {}",
                    session_id, e
                );
                self.notify(SessionNotice::EvaluationFailed {
                    session_id: session_id.to_string(),
                    reason: e.to_string(),
                });
                DispatchOutcome::PersistenceFailed { result, error: e }
            }
        }
    }

    async fn score(&self, document: &str) -> SessionResult<EvaluationResult> {
        match tokio::time::timeout(self.timeout, self.scorer.evaluate(document)).await {
            Ok(result) => {
                let result = result?;
                result.validate()?;
                Ok(result)
            }
            Err(_) => Err(SessionError::Scoring(format!(
                "timed out after {:?}",
                self.timeout
            ))),
        }
    }

    async fn persist(&self, subject_id: &str, result: &EvaluationResult) -> SessionResult<()> {
        match tokio::time::timeout(self.timeout, self.store.update_performance(subject_id, result))
            .await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(SessionError::Persistence(format!(
                "timed out after {:?}",
                self.timeout
            ))),
        }
    }

    fn notify(&self, notice: SessionNotice) {
        if let Some(notices) = &self.notices {
            // No subscribers is fine
            let _ = notices.send(notice);
        }
    }
}

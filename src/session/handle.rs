use super::config::StartRequest;
use super::controller::SessionOutcome;
use super::events::SessionEvent;
use super::notice::SessionNotice;
use super::state::SessionState;
use super::stats::SessionStats;
use crate::error::{SessionError, SessionResult};
use crate::transcript::Transcript;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::debug;

/// Cloneable front end to a running session controller
///
/// Commands go through the same ordered inbox as transport events.
#[derive(Clone)]
pub struct SessionHandle {
    session_id: String,
    inbox: mpsc::Sender<SessionEvent>,
    stats: watch::Receiver<SessionStats>,
    transcript: watch::Receiver<Transcript>,
    notices: broadcast::Sender<SessionNotice>,
    task: Arc<Mutex<Option<JoinHandle<SessionOutcome>>>>,
}

impl SessionHandle {
    pub(crate) fn new(
        session_id: String,
        inbox: mpsc::Sender<SessionEvent>,
        stats: watch::Receiver<SessionStats>,
        transcript: watch::Receiver<Transcript>,
        notices: broadcast::Sender<SessionNotice>,
        task: JoinHandle<SessionOutcome>,
    ) -> Self {
        Self {
            session_id,
            inbox,
            stats,
            transcript,
            notices,
            task: Arc::new(Mutex::new(Some(task))),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Start the session. Fails with `AlreadyActive` unless Idle.
    pub async fn start(&self, request: StartRequest) -> SessionResult<()> {
        let (reply, response) = oneshot::channel();

        // A finished controller drops its inbox; the instance is spent
        let spent = || SessionError::AlreadyActive {
            state: self.state(),
        };

        if self
            .inbox
            .send(SessionEvent::Start { request, reply })
            .await
            .is_err()
        {
            return Err(spent());
        }

        response.await.map_err(|_| spent())?
    }

    /// Stop the session. No-op unless Connecting or Active.
    pub async fn stop(&self) {
        if self.inbox.send(SessionEvent::Stop).await.is_err() {
            debug!("Stop ignored: session {} already finished", self.session_id);
        }
    }

    /// Current snapshot
    pub fn stats(&self) -> SessionStats {
        self.stats.borrow().clone()
    }

    pub fn state(&self) -> SessionState {
        self.stats.borrow().state
    }

    /// Finalized utterances so far
    pub fn transcript(&self) -> Transcript {
        self.transcript.borrow().clone()
    }

    pub fn subscribe_notices(&self) -> broadcast::Receiver<SessionNotice> {
        self.notices.subscribe()
    }

    /// Wait until the session reaches `target` (or any later state)
    pub async fn wait_for_state(&self, target: SessionState) -> SessionResult<SessionState> {
        let mut stats = self.stats.clone();
        loop {
            let state = stats.borrow_and_update().state;
            if state as u8 >= target as u8 {
                return Ok(state);
            }
            stats
                .changed()
                .await
                .map_err(|_| SessionError::ControllerGone)?;
        }
    }

    /// Wait for the controller to finish and take its outcome
    ///
    /// Only the first caller receives the outcome.
    pub async fn finished(&self) -> SessionResult<SessionOutcome> {
        let task = self.task.lock().await.take();
        match task {
            Some(task) => task.await.map_err(|_| SessionError::ControllerGone),
            None => Err(SessionError::ControllerGone),
        }
    }
}

use super::config::{SessionConfig, StartRequest};
use super::events::{SessionEvent, VoiceEvent};
use super::handle::SessionHandle;
use super::notice::SessionNotice;
use super::state::SessionState;
use super::stats::SessionStats;
use crate::capture::{CaptureLease, MediaCapture};
use crate::error::{SessionError, SessionResult};
use crate::evaluation::{DispatchOutcome, EvaluationDispatcher};
use crate::presence::{FaceDetector, PresenceMonitor, PresenceMonitorHandle};
use crate::transcript::{Fragment, Transcript, UtteranceConsolidator};
use crate::voice::VoiceSession;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// External capabilities a session drives
#[derive(Clone)]
pub struct SessionCollaborators {
    pub voice: Arc<dyn VoiceSession>,
    pub capture: Arc<dyn MediaCapture>,
    pub detector: Arc<dyn FaceDetector>,
    pub dispatcher: EvaluationDispatcher,
}

/// What a finished session leaves behind
#[derive(Debug)]
pub struct SessionOutcome {
    pub session_id: String,

    /// Final transcript, open turn included
    pub transcript: Transcript,

    /// Detached evaluation, if one was dispatched
    pub evaluation: Option<JoinHandle<DispatchOutcome>>,
}

/// Why a live session is being torn down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Termination {
    UserStop,
    TransportEnded,
    TransportError,
}

/// Owns the lifecycle of one interview session
///
/// All state (lifecycle, speaking flag, consolidator) lives here and is
/// mutated only from the controller task, one event at a time.
pub struct SessionController {
    session_id: String,
    config: SessionConfig,
    collaborators: SessionCollaborators,

    state: SessionState,
    consolidator: UtteranceConsolidator,
    next_seq: u64,
    assistant_speaking: bool,
    subject_id: Option<String>,
    started_at: Option<DateTime<Utc>>,

    /// One-shot guard for terminal handling
    terminated: bool,

    lease: Option<CaptureLease>,
    monitor: Option<PresenceMonitorHandle>,
    voice_pump: Option<JoinHandle<()>>,
    evaluation: Option<JoinHandle<DispatchOutcome>>,

    inbox: mpsc::WeakSender<SessionEvent>,
    stats_tx: watch::Sender<SessionStats>,
    transcript_tx: watch::Sender<Transcript>,
    notices: broadcast::Sender<SessionNotice>,
}

impl SessionController {
    /// Generate a fresh session identifier
    pub fn new_session_id() -> String {
        format!("interview-{}", uuid::Uuid::new_v4())
    }

    /// Create a session with a generated id and run its controller task
    pub fn spawn(config: SessionConfig, collaborators: SessionCollaborators) -> SessionHandle {
        Self::spawn_with_id(Self::new_session_id(), config, collaborators)
    }

    /// Create a session and run its controller task
    pub fn spawn_with_id(
        session_id: String,
        config: SessionConfig,
        collaborators: SessionCollaborators,
    ) -> SessionHandle {
        info!("Creating interview session: {}", session_id);

        let (inbox_tx, inbox_rx) = mpsc::channel(config.event_capacity.max(1));
        let (stats_tx, stats_rx) = watch::channel(SessionStats::idle(session_id.clone()));
        let (transcript_tx, transcript_rx) = watch::channel(Transcript::new());
        let (notices, _) = broadcast::channel(64);

        let mut collaborators = collaborators;
        collaborators.dispatcher = collaborators.dispatcher.with_notices(notices.clone());

        let controller = Self {
            session_id: session_id.clone(),
            config,
            collaborators,
            state: SessionState::Idle,
            consolidator: UtteranceConsolidator::new(),
            next_seq: 0,
            assistant_speaking: false,
            subject_id: None,
            started_at: None,
            terminated: false,
            lease: None,
            monitor: None,
            voice_pump: None,
            evaluation: None,
            inbox: inbox_tx.downgrade(),
            stats_tx,
            transcript_tx,
            notices: notices.clone(),
        };

        let task = tokio::spawn(controller.run(inbox_rx));

        SessionHandle::new(session_id, inbox_tx, stats_rx, transcript_rx, notices, task)
    }

    /// Consume events until the session ends
    async fn run(mut self, mut inbox: mpsc::Receiver<SessionEvent>) -> SessionOutcome {
        while let Some(event) = inbox.recv().await {
            self.handle_event(event).await;
            if self.state.is_terminal() {
                break;
            }
        }

        if self.state.is_live() {
            warn!(
                "All handles to session {} dropped while live; ending it",
                self.session_id
            );
            self.terminate(Termination::UserStop).await;
        }

        info!("Session controller finished: {}", self.session_id);

        SessionOutcome {
            session_id: self.session_id.clone(),
            transcript: self.consolidator.transcript().clone(),
            evaluation: self.evaluation.take(),
        }
    }

    async fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Start { request, reply } => {
                let result = self.start(request).await;
                // Caller may have gone away
                let _ = reply.send(result);
            }
            SessionEvent::Stop => self.stop().await,
            SessionEvent::Voice(event) => self.on_voice_event(event).await,
        }
    }

    /// Idle → Connecting
    async fn start(&mut self, request: StartRequest) -> SessionResult<()> {
        if self.state != SessionState::Idle {
            warn!(
                "Start rejected for session {}: state is {:?}",
                self.session_id, self.state
            );
            return Err(SessionError::AlreadyActive { state: self.state });
        }

        info!(
            "Starting session {} with assistant {} ({})",
            self.session_id, request.assistant.assistant_id, request.assistant.role
        );

        self.subject_id = request.subject_id.clone();
        self.set_state(SessionState::Connecting);

        match CaptureLease::acquire(Arc::clone(&self.collaborators.capture)).await {
            Ok(lease) => self.lease = Some(lease),
            Err(e) => {
                error!("Failed to acquire capture for {}: {:#}", self.session_id, e);
                self.terminate(Termination::TransportError).await;
                return Err(SessionError::Capture(format!("{:#}", e)));
            }
        }

        let voice_config = request.voice_config();
        let events = match self
            .collaborators
            .voice
            .start(&request.assistant.assistant_id, &voice_config)
            .await
        {
            Ok(events) => events,
            Err(e) => {
                error!(
                    "Failed to start voice session {} on {}: {:#}",
                    self.session_id,
                    self.collaborators.voice.name(),
                    e
                );
                self.terminate(Termination::TransportError).await;
                return Err(SessionError::Transport(format!("{:#}", e)));
            }
        };

        self.voice_pump = Some(spawn_voice_pump(events, self.inbox.clone()));

        Ok(())
    }

    /// User-initiated stop; no-op unless Connecting or Active
    async fn stop(&mut self) {
        if !self.state.is_live() {
            debug!(
                "Stop ignored for session {}: state is {:?}",
                self.session_id, self.state
            );
            return;
        }

        info!("Stop requested for session {}", self.session_id);
        self.terminate(Termination::UserStop).await;
    }

    async fn on_voice_event(&mut self, event: VoiceEvent) {
        match event {
            VoiceEvent::Started => {
                if self.state != SessionState::Connecting {
                    debug!("Ignoring call start in state {:?}", self.state);
                    return;
                }
                self.activate();
            }
            VoiceEvent::Ended => {
                if self.state.is_live() {
                    info!("Voice session {} ended", self.session_id);
                    self.terminate(Termination::TransportEnded).await;
                }
            }
            VoiceEvent::Error { detail } => {
                error!("Voice transport error in session {}: {}", self.session_id, detail);
                if self.state.is_live() {
                    self.terminate(Termination::TransportError).await;
                }
            }
            VoiceEvent::SpeakingStarted => self.set_speaking(true),
            VoiceEvent::SpeakingEnded => self.set_speaking(false),
            VoiceEvent::Fragment { role, text } => {
                if self.state != SessionState::Active {
                    debug!("Dropping {:?} fragment in state {:?}", role, self.state);
                    return;
                }

                let fragment = Fragment::new(role, text, self.next_seq);
                self.next_seq += 1;

                let before = self.consolidator.transcript().len();
                self.consolidator.ingest(fragment);
                if self.consolidator.transcript().len() != before {
                    self.publish_transcript();
                }
                self.publish_stats();
            }
        }
    }

    fn set_speaking(&mut self, speaking: bool) {
        if self.state != SessionState::Active {
            return;
        }
        self.assistant_speaking = speaking;
        self.publish_stats();
    }

    /// Connecting → Active
    fn activate(&mut self) {
        self.consolidator.reset();
        self.next_seq = 0;
        self.started_at = Some(Utc::now());
        self.set_state(SessionState::Active);
        self.publish_transcript();

        if let Some(lease) = &self.lease {
            let monitor = PresenceMonitor::new(
                self.session_id.clone(),
                Arc::clone(&self.collaborators.detector),
                lease.capture(),
                self.notices.clone(),
                self.config.detection_timeout,
            );
            self.monitor = Some(monitor.spawn(self.config.presence_interval));
        }

        info!("Session {} is active", self.session_id);
    }

    /// Live → Ending → Ended, at most once
    async fn terminate(&mut self, reason: Termination) {
        if self.terminated {
            return;
        }
        self.terminated = true;

        info!("Ending session {} ({:?})", self.session_id, reason);
        self.set_state(SessionState::Ending);

        if let Some(monitor) = self.monitor.take() {
            monitor.stop();
        }
        if let Some(lease) = self.lease.take() {
            lease.release();
        }

        if reason == Termination::UserStop {
            if let Err(e) = self.collaborators.voice.stop().await {
                warn!("Failed to stop voice session {}: {:#}", self.session_id, e);
            }
        }
        if let Some(pump) = self.voice_pump.take() {
            pump.abort();
        }

        self.consolidator.flush();
        self.assistant_speaking = false;
        self.publish_transcript();

        let transcript = self.consolidator.transcript().clone();
        self.evaluation = Some(self.collaborators.dispatcher.dispatch(
            self.session_id.clone(),
            &transcript,
            self.subject_id.clone(),
        ));

        self.set_state(SessionState::Ended);
        info!(
            "Session {} ended with {} utterances",
            self.session_id,
            transcript.len()
        );
    }

    fn set_state(&mut self, state: SessionState) {
        debug!("Session {}: {:?} -> {:?}", self.session_id, self.state, state);
        self.state = state;
        self.publish_stats();
    }

    fn publish_stats(&self) {
        let duration_secs = self
            .started_at
            .map(|started| {
                Utc::now().signed_duration_since(started).num_milliseconds() as f64 / 1000.0
            })
            .unwrap_or(0.0);

        self.stats_tx.send_replace(SessionStats {
            session_id: self.session_id.clone(),
            state: self.state,
            assistant_speaking: self.assistant_speaking,
            utterance_count: self.consolidator.transcript().len(),
            open_turn: self.consolidator.has_open_turn(),
            started_at: self.started_at,
            duration_secs,
        });
    }

    fn publish_transcript(&self) {
        self.transcript_tx
            .send_replace(self.consolidator.transcript().clone());
    }
}

/// Forward transport events into the controller inbox, preserving order
///
/// Holds only a weak sender so dropping every handle still closes the inbox.
fn spawn_voice_pump(
    mut events: mpsc::Receiver<VoiceEvent>,
    inbox: mpsc::WeakSender<SessionEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let Some(sender) = inbox.upgrade() else {
                return;
            };
            if sender.send(SessionEvent::Voice(event)).await.is_err() {
                return;
            }
        }

        debug!("Voice event stream closed");
        if let Some(sender) = inbox.upgrade() {
            let _ = sender
                .send(SessionEvent::Voice(VoiceEvent::Error {
                    detail: "voice event stream closed".to_string(),
                }))
                .await;
        }
    })
}

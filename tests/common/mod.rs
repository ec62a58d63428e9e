// Shared fakes for the collaborator traits
#![allow(dead_code)]

use anyhow::Result;
use interview_session::{
    Detection, EvaluationDispatcher, EvaluationResult, FaceDetector, MediaCapture,
    PerformanceStore, Scorer, SessionCollaborators, SessionConfig, SessionError, SessionHandle,
    SessionResult, SessionStats, StartRequest, VideoFrame, VoiceEvent, VoiceSession,
    VoiceStartConfig,
};
use interview_session::session::AssistantProfile;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, Notify};

// ============================================================================
// Voice transport
// ============================================================================

#[derive(Default)]
pub struct FakeVoice {
    pub fail_start: AtomicBool,
    pub starts: Mutex<Vec<(String, VoiceStartConfig)>>,
    pub stops: AtomicUsize,
    sender: Mutex<Option<mpsc::Sender<VoiceEvent>>>,
}

impl FakeVoice {
    pub async fn emit(&self, event: VoiceEvent) {
        let sender = self.sender.lock().unwrap().clone();
        if let Some(sender) = sender {
            let _ = sender.send(event).await;
        }
    }

    pub async fn say(&self, role: interview_session::Speaker, text: &str) {
        self.emit(VoiceEvent::Fragment {
            role,
            text: text.to_string(),
        })
        .await;
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl VoiceSession for FakeVoice {
    async fn start(
        &self,
        assistant_id: &str,
        config: &VoiceStartConfig,
    ) -> Result<mpsc::Receiver<VoiceEvent>> {
        if self.fail_start.load(Ordering::SeqCst) {
            anyhow::bail!("assistant unreachable");
        }

        self.starts
            .lock()
            .unwrap()
            .push((assistant_id.to_string(), config.clone()));

        let (tx, rx) = mpsc::channel(64);
        *self.sender.lock().unwrap() = Some(tx);
        Ok(rx)
    }

    async fn stop(&self) -> Result<()> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &str {
        "fake-voice"
    }
}

// ============================================================================
// Capture
// ============================================================================

#[derive(Default)]
pub struct FakeCapture {
    pub fail_acquire: AtomicBool,
    pub acquired: AtomicUsize,
    pub released: AtomicUsize,
    pub frame: Mutex<Option<VideoFrame>>,
}

impl FakeCapture {
    pub fn with_frame() -> Self {
        let capture = Self::default();
        *capture.frame.lock().unwrap() = Some(sample_frame());
        capture
    }

    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl MediaCapture for FakeCapture {
    async fn acquire(&self) -> Result<()> {
        if self.fail_acquire.load(Ordering::SeqCst) {
            anyhow::bail!("camera busy");
        }
        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn release(&self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }

    fn current_frame(&self) -> Option<VideoFrame> {
        self.frame.lock().unwrap().clone()
    }

    fn name(&self) -> &str {
        "fake-capture"
    }
}

pub fn sample_frame() -> VideoFrame {
    VideoFrame {
        data: vec![0xFF, 0xD8, 0xFF],
        width: 640,
        height: 480,
        sequence: 1,
    }
}

// ============================================================================
// Detection
// ============================================================================

pub struct FakeDetector {
    pub calls: AtomicUsize,
    pub faces: AtomicUsize,
    pub fail: AtomicBool,
    /// When set, every call waits for a notification before answering
    pub gate: Option<Arc<Notify>>,
}

impl FakeDetector {
    pub fn seeing(faces: usize) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            faces: AtomicUsize::new(faces),
            fail: AtomicBool::new(false),
            gate: None,
        }
    }

    pub fn gated(faces: usize, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::seeing(faces)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl FaceDetector for FakeDetector {
    async fn estimate_faces(&self, _frame: &VideoFrame) -> SessionResult<Vec<Detection>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        if self.fail.load(Ordering::SeqCst) {
            return Err(SessionError::Detection("model not loaded".to_string()));
        }

        let faces = self.faces.load(Ordering::SeqCst);
        Ok((0..faces)
            .map(|_| Detection {
                x: 0.25,
                y: 0.25,
                width: 0.5,
                height: 0.5,
                score: 0.9,
            })
            .collect())
    }
}

// ============================================================================
// Scoring and persistence
// ============================================================================

pub fn sample_result() -> EvaluationResult {
    EvaluationResult {
        clarity: 7,
        problem_solving: 6,
        communication: 8,
        confidence: 7,
        technical: 5,
        overall_feedback: "Clear communicator; go deeper on system design.".to_string(),
    }
}

pub struct FakeScorer {
    pub documents: Mutex<Vec<String>>,
    pub reply: Mutex<SessionResult<EvaluationResult>>,
    pub delay: Option<Duration>,
}

impl FakeScorer {
    pub fn replying(reply: SessionResult<EvaluationResult>) -> Self {
        Self {
            documents: Mutex::new(Vec::new()),
            reply: Mutex::new(reply),
            delay: None,
        }
    }

    pub fn calls(&self) -> usize {
        self.documents.lock().unwrap().len()
    }

    pub fn documents(&self) -> Vec<String> {
        self.documents.lock().unwrap().clone()
    }
}

impl Default for FakeScorer {
    fn default() -> Self {
        Self::replying(Ok(sample_result()))
    }
}

#[async_trait::async_trait]
impl Scorer for FakeScorer {
    async fn evaluate(&self, document: &str) -> SessionResult<EvaluationResult> {
        self.documents.lock().unwrap().push(document.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.reply.lock().unwrap().clone()
    }
}

#[derive(Default)]
pub struct FakeStore {
    pub fail: AtomicBool,
    pub records: Mutex<Vec<(String, EvaluationResult)>>,
}

impl FakeStore {
    pub fn records(&self) -> Vec<(String, EvaluationResult)> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl PerformanceStore for FakeStore {
    async fn update_performance(
        &self,
        subject_id: &str,
        result: &EvaluationResult,
    ) -> SessionResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(SessionError::Persistence("503 Service Unavailable".to_string()));
        }
        self.records
            .lock()
            .unwrap()
            .push((subject_id.to_string(), result.clone()));
        Ok(())
    }
}

// ============================================================================
// Wiring
// ============================================================================

/// All fakes for one session, kept so tests can inspect them
pub struct Fakes {
    pub voice: Arc<FakeVoice>,
    pub capture: Arc<FakeCapture>,
    pub detector: Arc<FakeDetector>,
    pub scorer: Arc<FakeScorer>,
    pub store: Arc<FakeStore>,
}

impl Fakes {
    pub fn new() -> Self {
        Self {
            voice: Arc::new(FakeVoice::default()),
            capture: Arc::new(FakeCapture::with_frame()),
            detector: Arc::new(FakeDetector::seeing(1)),
            scorer: Arc::new(FakeScorer::default()),
            store: Arc::new(FakeStore::default()),
        }
    }

    pub fn collaborators(&self) -> SessionCollaborators {
        SessionCollaborators {
            voice: self.voice.clone(),
            capture: self.capture.clone(),
            detector: self.detector.clone(),
            dispatcher: EvaluationDispatcher::new(
                self.scorer.clone(),
                self.store.clone(),
                Duration::from_secs(5),
            ),
        }
    }
}

pub fn fast_config() -> SessionConfig {
    SessionConfig {
        presence_interval: Duration::from_millis(20),
        detection_timeout: Duration::from_millis(500),
        evaluation_timeout: Duration::from_secs(5),
        event_capacity: 64,
    }
}

pub fn start_request(subject_id: Option<&str>) -> StartRequest {
    let mut personalization = HashMap::new();
    personalization.insert("candidateName".to_string(), "Ada".to_string());

    StartRequest {
        session_credential: "pk-test".to_string(),
        assistant: AssistantProfile {
            assistant_id: "asst-backend".to_string(),
            role: "backend engineer".to_string(),
        },
        subject_id: subject_id.map(str::to_string),
        personalization,
    }
}

/// Poll the session snapshot until `check` holds (or fail after 2s)
pub async fn wait_until<F>(handle: &SessionHandle, check: F) -> Result<SessionStats>
where
    F: Fn(&SessionStats) -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        let stats = handle.stats();
        if check(&stats) {
            return Ok(stats);
        }
        if tokio::time::Instant::now() >= deadline {
            anyhow::bail!("condition not reached; last stats: {:?}", stats);
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

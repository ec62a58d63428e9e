use crate::capture::{MediaCapture, VideoFrame};
use crate::error::{SessionError, SessionResult};
use crate::session::SessionNotice;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// One detected face (normalized box + confidence)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub score: f32,
}

/// Result of one presence check. Not retained past the check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenceSample {
    pub face_count: usize,
    pub captured_at: u64,
}

/// Detection capability
#[async_trait::async_trait]
pub trait FaceDetector: Send + Sync {
    async fn estimate_faces(&self, frame: &VideoFrame) -> SessionResult<Vec<Detection>>;
}

/// What a monitor tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A detection query was issued
    Issued,
    /// A previous query has not returned yet
    SkippedInFlight,
    /// No video frame available yet
    NoFrame,
}

/// Periodic presence checker for one session
pub struct PresenceMonitor {
    session_id: String,
    detector: Arc<dyn FaceDetector>,
    capture: Arc<dyn MediaCapture>,
    notices: broadcast::Sender<SessionNotice>,
    detection_timeout: Duration,
    ticks: u64,
    pending: Option<JoinHandle<Option<PresenceSample>>>,
    /// Cleared on stop; notices are only sent while set
    active: Arc<Mutex<bool>>,
}

impl PresenceMonitor {
    pub fn new(
        session_id: String,
        detector: Arc<dyn FaceDetector>,
        capture: Arc<dyn MediaCapture>,
        notices: broadcast::Sender<SessionNotice>,
        detection_timeout: Duration,
    ) -> Self {
        Self {
            session_id,
            detector,
            capture,
            notices,
            detection_timeout,
            ticks: 0,
            pending: None,
            active: Arc::new(Mutex::new(true)),
        }
    }

    /// Whether a detection query is still outstanding
    pub fn in_flight(&self) -> bool {
        self.pending.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Run one monitor cycle
    pub fn tick(&mut self) -> TickOutcome {
        self.ticks += 1;
        let tick = self.ticks;

        if self.in_flight() {
            debug!(
                "Presence check still in flight; skipping cycle {} (session {})",
                tick, self.session_id
            );
            return TickOutcome::SkippedInFlight;
        }

        let Some(frame) = self.capture.current_frame() else {
            debug!("No video frame yet; skipping cycle {}", tick);
            return TickOutcome::NoFrame;
        };

        let detector = Arc::clone(&self.detector);
        let notices = self.notices.clone();
        let session_id = self.session_id.clone();
        let detection_timeout = self.detection_timeout;
        let active = Arc::clone(&self.active);

        self.pending = Some(tokio::spawn(async move {
            let detections =
                match tokio::time::timeout(detection_timeout, detector.estimate_faces(&frame))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(SessionError::Detection(format!(
                        "timed out after {}ms",
                        detection_timeout.as_millis()
                    ))),
                };

            let detections = match detections {
                Ok(detections) => detections,
                Err(e) => {
                    warn!("Presence check {} produced no data: {}", tick, e);
                    return None;
                }
            };

            let sample = PresenceSample {
                face_count: detections.len(),
                captured_at: tick,
            };

            if sample.face_count == 0 {
                // Held across the send so a stopped monitor stays silent
                let active = active.lock().unwrap_or_else(|e| e.into_inner());
                if !*active {
                    debug!("Presence check {} finished after stop; discarded", tick);
                    return None;
                }
                warn!("Subject not visible (session {}, cycle {})", session_id, tick);
                // No subscribers is fine
                let _ = notices.send(SessionNotice::SubjectNotVisible { session_id, tick });
            }

            Some(sample)
        }));

        TickOutcome::Issued
    }

    /// Run the monitor on a fixed period until the handle is stopped
    pub fn spawn(mut self, period: Duration) -> PresenceMonitorHandle {
        info!(
            "Presence monitor started for session {} (every {}ms)",
            self.session_id,
            period.as_millis()
        );

        let active = Arc::clone(&self.active);

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately
            interval.tick().await;

            loop {
                interval.tick().await;
                self.tick();
            }
        });

        PresenceMonitorHandle {
            task: Some(task),
            active,
        }
    }
}

impl Drop for PresenceMonitor {
    fn drop(&mut self) {
        if let Some(task) = self.pending.take() {
            task.abort();
        }
    }
}

/// Stops the monitor when stopped or dropped
///
/// Once stopped, a detection still in flight can no longer raise a notice.
pub struct PresenceMonitorHandle {
    task: Option<JoinHandle<()>>,
    active: Arc<Mutex<bool>>,
}

impl PresenceMonitorHandle {
    pub fn stop(mut self) {
        self.abort();
    }

    fn abort(&mut self) {
        *self.active.lock().unwrap_or_else(|e| e.into_inner()) = false;
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("Presence monitor stopped");
        }
    }
}

impl Drop for PresenceMonitorHandle {
    fn drop(&mut self) {
        self.abort();
    }
}

pub mod capture;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod http;
pub mod nats;
pub mod persistence;
pub mod presence;
pub mod scoring;
pub mod session;
pub mod transcript;
pub mod voice;

pub use capture::{CaptureLease, MediaCapture, VideoFrame};
pub use config::Config;
pub use error::{SessionError, SessionResult};
pub use evaluation::{
    render_document, DispatchOutcome, EvaluationDispatcher, EvaluationResult, PerformanceStore,
    Scorer,
};
pub use http::{create_router, AppState, CollaboratorFactory};
pub use nats::{NatsClient, NatsFaceDetector, NatsFrameCapture, NatsVoiceSession};
pub use presence::{Detection, FaceDetector, PresenceMonitor, TickOutcome};
pub use session::{
    SessionCollaborators, SessionConfig, SessionController, SessionHandle, SessionNotice,
    SessionState, SessionStats, StartRequest, VoiceEvent,
};
pub use transcript::{Fragment, Speaker, Transcript, Utterance, UtteranceConsolidator};
pub use voice::{VoiceSession, VoiceStartConfig};

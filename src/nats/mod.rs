//! NATS-backed collaborators
//!
//! - `NatsVoiceSession` - call control and event stream
//! - `NatsFrameCapture` - latest video frame from the capture component
//! - `NatsFaceDetector` - face estimation over request/reply

pub mod capture;
pub mod client;
pub mod detector;
pub mod messages;
pub mod voice;

pub use capture::NatsFrameCapture;
pub use client::NatsClient;
pub use detector::NatsFaceDetector;
pub use messages::{
    FaceEstimateReply, FaceEstimateRequest, VideoFrameMessage, VoiceCommandMessage,
    VoiceEventMessage, WireRole,
};
pub use voice::NatsVoiceSession;

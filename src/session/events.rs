use super::config::StartRequest;
use crate::error::SessionResult;
use crate::transcript::Speaker;
use tokio::sync::oneshot;

/// Events reported by the voice transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceEvent {
    /// Call connected
    Started,
    /// Call finished
    Ended,
    /// Assistant began speaking
    SpeakingStarted,
    /// Assistant stopped speaking
    SpeakingEnded,
    /// Streamed transcript text
    Fragment { role: Speaker, text: String },
    /// Transport failure
    Error { detail: String },
}

/// Everything the controller consumes, in arrival order
#[derive(Debug)]
pub enum SessionEvent {
    Start {
        request: StartRequest,
        reply: oneshot::Sender<SessionResult<()>>,
    },
    Stop,
    Voice(VoiceEvent),
}

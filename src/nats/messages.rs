use crate::presence::Detection;
use crate::session::VoiceEvent;
use crate::transcript::Speaker;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Speaker tag as sent by the voice transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireRole {
    Assistant,
    User,
}

impl From<WireRole> for Speaker {
    fn from(role: WireRole) -> Self {
        match role {
            WireRole::Assistant => Speaker::Interviewer,
            WireRole::User => Speaker::Candidate,
        }
    }
}

/// Call event received from the voice transport
///
/// Unknown `type` tags or roles fail to deserialize and are dropped at
/// the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum VoiceEventMessage {
    CallStart,
    CallEnd,
    SpeechStart,
    SpeechEnd,
    Transcript {
        role: WireRole,
        transcript: String,
        #[serde(rename = "transcriptType", default)]
        transcript_type: Option<String>,
    },
    Error {
        #[serde(default)]
        detail: String,
    },
}

impl From<VoiceEventMessage> for VoiceEvent {
    fn from(message: VoiceEventMessage) -> Self {
        match message {
            VoiceEventMessage::CallStart => VoiceEvent::Started,
            VoiceEventMessage::CallEnd => VoiceEvent::Ended,
            VoiceEventMessage::SpeechStart => VoiceEvent::SpeakingStarted,
            VoiceEventMessage::SpeechEnd => VoiceEvent::SpeakingEnded,
            VoiceEventMessage::Transcript {
                role, transcript, ..
            } => VoiceEvent::Fragment {
                role: role.into(),
                text: transcript,
            },
            VoiceEventMessage::Error { detail } => VoiceEvent::Error { detail },
        }
    }
}

/// Call control command published to the voice transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum VoiceCommandMessage {
    Start {
        session_id: String,
        assistant_id: String,
        credential: String,
        #[serde(rename = "variableValues")]
        variable_values: HashMap<String, String>,
    },
    Stop {
        session_id: String,
    },
}

/// Video frame published by the capture component
#[derive(Debug, Serialize, Deserialize)]
pub struct VideoFrameMessage {
    pub session_id: String,
    pub sequence: u64,
    pub image: String, // Base64-encoded JPEG bytes
    pub width: u32,
    pub height: u32,
    pub timestamp: String, // RFC3339 timestamp
}

/// Face estimation request sent to the detection service
#[derive(Debug, Serialize, Deserialize)]
pub struct FaceEstimateRequest {
    pub image: String, // Base64-encoded JPEG bytes
    pub width: u32,
    pub height: u32,
}

/// Face estimation reply from the detection service
#[derive(Debug, Serialize, Deserialize)]
pub struct FaceEstimateReply {
    #[serde(default)]
    pub faces: Vec<Detection>,
    #[serde(default)]
    pub error: Option<String>,
}

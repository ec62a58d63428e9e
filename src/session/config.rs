use crate::voice::VoiceStartConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Tuning for an interview session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Period of the presence check
    /// Default: 1 second
    pub presence_interval: Duration,

    /// Upper bound for one face-detection call
    pub detection_timeout: Duration,

    /// Upper bound for each scoring and persistence call
    pub evaluation_timeout: Duration,

    /// Capacity of the controller's inbound event queue
    pub event_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            presence_interval: Duration::from_secs(1),
            detection_timeout: Duration::from_secs(5),
            evaluation_timeout: Duration::from_secs(60),
            event_capacity: 256,
        }
    }
}

/// Role-specific voice assistant to run the interview
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantProfile {
    pub assistant_id: String,

    /// Job role the assistant interviews for (e.g. "backend engineer")
    pub role: String,
}

/// Inputs needed to start a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartRequest {
    pub session_credential: String,
    pub assistant: AssistantProfile,

    /// Subject the evaluation is recorded under; none means not persisted
    pub subject_id: Option<String>,

    /// Display values for the assistant (e.g. candidate name)
    pub personalization: HashMap<String, String>,
}

impl StartRequest {
    pub(crate) fn voice_config(&self) -> VoiceStartConfig {
        VoiceStartConfig {
            credential: self.session_credential.clone(),
            variable_values: self.personalization.clone(),
        }
    }
}

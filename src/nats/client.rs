use super::messages::{FaceEstimateReply, FaceEstimateRequest, VoiceCommandMessage};
use anyhow::{Context, Result};
use async_nats::Client;
use tracing::{debug, info};

/// Subject layout:
/// - `<prefix>.voice.<session>.control` - commands to the voice transport
/// - `<prefix>.voice.<session>.events` - call events from the voice transport
/// - `<prefix>.video.<session>.frames` - frames from the capture component
/// - `<prefix>.vision.faces` - face estimation request/reply
pub struct NatsClient {
    client: Client,
    subject_prefix: String,
}

impl NatsClient {
    /// Connect to NATS server
    pub async fn connect(url: &str, subject_prefix: impl Into<String>) -> Result<Self> {
        info!("Connecting to NATS at {}", url);

        let client = async_nats::connect(url)
            .await
            .context("Failed to connect to NATS")?;

        info!("Connected to NATS successfully");

        Ok(Self {
            client,
            subject_prefix: subject_prefix.into(),
        })
    }

    pub fn control_subject(&self, session_id: &str) -> String {
        format!("{}.voice.{}.control", self.subject_prefix, session_id)
    }

    pub fn events_subject(&self, session_id: &str) -> String {
        format!("{}.voice.{}.events", self.subject_prefix, session_id)
    }

    pub fn frames_subject(&self, session_id: &str) -> String {
        format!("{}.video.{}.frames", self.subject_prefix, session_id)
    }

    pub fn faces_subject(&self) -> String {
        format!("{}.vision.faces", self.subject_prefix)
    }

    /// Publish a call control command
    pub async fn publish_command(&self, session_id: &str, command: &VoiceCommandMessage) -> Result<()> {
        let subject = self.control_subject(session_id);
        let payload = serde_json::to_vec(command)?;

        self.client
            .publish(subject.clone(), payload.into())
            .await
            .context("Failed to publish voice command")?;

        debug!("Published voice command to {}", subject);

        Ok(())
    }

    /// Subscribe to call events for a session
    pub async fn subscribe_events(&self, session_id: &str) -> Result<async_nats::Subscriber> {
        self.subscribe(self.events_subject(session_id)).await
    }

    /// Subscribe to video frames for a session
    pub async fn subscribe_frames(&self, session_id: &str) -> Result<async_nats::Subscriber> {
        self.subscribe(self.frames_subject(session_id)).await
    }

    /// Ask the detection service to estimate faces in one image
    pub async fn request_faces(&self, request: &FaceEstimateRequest) -> Result<FaceEstimateReply> {
        let payload = serde_json::to_vec(request)?;

        let message = self
            .client
            .request(self.faces_subject(), payload.into())
            .await
            .context("Face estimation request failed")?;

        serde_json::from_slice(&message.payload).context("Malformed face estimation reply")
    }

    async fn subscribe(&self, subject: String) -> Result<async_nats::Subscriber> {
        info!("Subscribing to {}", subject);

        let subscriber = self
            .client
            .subscribe(subject.clone())
            .await
            .context("Failed to subscribe")?;

        info!("Subscribed to {}", subject);

        Ok(subscriber)
    }
}

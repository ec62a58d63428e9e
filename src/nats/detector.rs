use super::client::NatsClient;
use super::messages::FaceEstimateRequest;
use crate::capture::VideoFrame;
use crate::error::{SessionError, SessionResult};
use crate::presence::{Detection, FaceDetector};
use base64::Engine;
use std::sync::Arc;

/// Face detection service reached over NATS request/reply
pub struct NatsFaceDetector {
    client: Arc<NatsClient>,
}

impl NatsFaceDetector {
    pub fn new(client: Arc<NatsClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl FaceDetector for NatsFaceDetector {
    async fn estimate_faces(&self, frame: &VideoFrame) -> SessionResult<Vec<Detection>> {
        let request = FaceEstimateRequest {
            image: base64::engine::general_purpose::STANDARD.encode(&frame.data),
            width: frame.width,
            height: frame.height,
        };

        let reply = self
            .client
            .request_faces(&request)
            .await
            .map_err(|e| SessionError::Detection(format!("{:#}", e)))?;

        match reply.error {
            Some(error) => Err(SessionError::Detection(error)),
            None => Ok(reply.faces),
        }
    }
}

use super::client::NatsClient;
use super::messages::VideoFrameMessage;
use crate::capture::{MediaCapture, VideoFrame};
use anyhow::{Context, Result};
use base64::Engine;
use futures::stream::StreamExt;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Capture fed by frames the capture component publishes to NATS
///
/// Keeps only the most recent frame.
pub struct NatsFrameCapture {
    client: Arc<NatsClient>,
    session_id: String,
    latest: Arc<Mutex<Option<VideoFrame>>>,
    frame_task_handle: Mutex<Option<JoinHandle<()>>>,
}

impl NatsFrameCapture {
    pub fn new(client: Arc<NatsClient>, session_id: impl Into<String>) -> Self {
        Self {
            client,
            session_id: session_id.into(),
            latest: Arc::new(Mutex::new(None)),
            frame_task_handle: Mutex::new(None),
        }
    }

    /// Decode a wire frame
    pub fn decode(message: &VideoFrameMessage) -> Result<VideoFrame> {
        let data = base64::engine::general_purpose::STANDARD
            .decode(&message.image)
            .context("Invalid base64 frame data")?;

        Ok(VideoFrame {
            data,
            width: message.width,
            height: message.height,
            sequence: message.sequence,
        })
    }
}

#[async_trait::async_trait]
impl MediaCapture for NatsFrameCapture {
    async fn acquire(&self) -> Result<()> {
        let mut subscriber = self
            .client
            .subscribe_frames(&self.session_id)
            .await
            .context("Failed to subscribe to video frames")?;

        let latest = Arc::clone(&self.latest);

        let frame_task = tokio::spawn(async move {
            info!("Frame receiving task started");

            while let Some(msg) = subscriber.next().await {
                let frame = serde_json::from_slice::<VideoFrameMessage>(&msg.payload)
                    .context("Malformed frame message")
                    .and_then(|message| Self::decode(&message));

                match frame {
                    Ok(frame) => {
                        *latest.lock().unwrap_or_else(|e| e.into_inner()) = Some(frame);
                    }
                    Err(e) => warn!("Dropping video frame: {:#}", e),
                }
            }

            info!("Frame receiving task stopped");
        });

        let previous = self
            .frame_task_handle
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(frame_task);
        if let Some(previous) = previous {
            previous.abort();
        }

        Ok(())
    }

    fn release(&self) {
        let task = self
            .frame_task_handle
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(task) = task {
            task.abort();
        }
        *self.latest.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }

    fn current_frame(&self) -> Option<VideoFrame> {
        self.latest.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn name(&self) -> &str {
        "nats-frames"
    }
}

use super::client::NatsClient;
use super::messages::{VoiceCommandMessage, VoiceEventMessage};
use crate::session::VoiceEvent;
use crate::voice::{VoiceSession, VoiceStartConfig};
use anyhow::{Context, Result};
use futures::stream::{Stream, StreamExt};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Voice transport reached over NATS
pub struct NatsVoiceSession {
    client: Arc<NatsClient>,
    session_id: String,
    event_capacity: usize,

    /// Handle for the event receiving task
    event_task_handle: Mutex<Option<JoinHandle<()>>>,
}

impl NatsVoiceSession {
    pub fn new(client: Arc<NatsClient>, session_id: impl Into<String>, event_capacity: usize) -> Self {
        Self {
            client,
            session_id: session_id.into(),
            event_capacity: event_capacity.max(1),
            event_task_handle: Mutex::new(None),
        }
    }
}

#[async_trait::async_trait]
impl VoiceSession for NatsVoiceSession {
    async fn start(
        &self,
        assistant_id: &str,
        config: &VoiceStartConfig,
    ) -> Result<mpsc::Receiver<VoiceEvent>> {
        // Subscribe first so the call start event cannot be missed
        let subscriber = self
            .client
            .subscribe_events(&self.session_id)
            .await
            .context("Failed to subscribe to voice events")?;

        let (event_tx, event_rx) = mpsc::channel(self.event_capacity);
        let session_id = self.session_id.clone();

        let payloads = subscriber.map(|msg| msg.payload);
        let event_task = tokio::spawn(forward_events(payloads, event_tx, session_id));

        if let Some(previous) = self.event_task_handle.lock().await.replace(event_task) {
            previous.abort();
        }

        let command = VoiceCommandMessage::Start {
            session_id: self.session_id.clone(),
            assistant_id: assistant_id.to_string(),
            credential: config.credential.clone(),
            variable_values: config.variable_values.clone(),
        };
        self.client
            .publish_command(&self.session_id, &command)
            .await
            .context("Failed to request call start")?;

        Ok(event_rx)
    }

    async fn stop(&self) -> Result<()> {
        let command = VoiceCommandMessage::Stop {
            session_id: self.session_id.clone(),
        };
        let result = self.client.publish_command(&self.session_id, &command).await;

        // Unsubscribe regardless of whether the command went out
        if let Some(task) = self.event_task_handle.lock().await.take() {
            task.abort();
        }

        result.context("Failed to request call stop")
    }

    fn name(&self) -> &str {
        "nats-voice"
    }
}

impl Drop for NatsVoiceSession {
    fn drop(&mut self) {
        if let Some(task) = self.event_task_handle.get_mut().take() {
            task.abort();
        }
    }
}

/// Parse wire payloads and forward them as voice events
///
/// Ends when the subscription ends or the receiver is dropped, which drops
/// the subscription with it.
async fn forward_events<S, P>(mut payloads: S, event_tx: mpsc::Sender<VoiceEvent>, session_id: String)
where
    S: Stream<Item = P> + Unpin,
    P: AsRef<[u8]>,
{
    info!("Voice event receiving task started");

    loop {
        let payload = tokio::select! {
            _ = event_tx.closed() => break,
            payload = payloads.next() => match payload {
                Some(payload) => payload,
                None => break,
            },
        };

        match serde_json::from_slice::<VoiceEventMessage>(payload.as_ref()) {
            Ok(message) => {
                if event_tx.send(message.into()).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                warn!("Dropping malformed voice event for {}: {}", session_id, e);
            }
        }
    }

    info!("Voice event receiving task stopped");
}

//! Voice-session capability
//!
//! The voice transport runs the actual call. It is started with an
//! assistant id and per-session configuration and reports back through
//! a channel of `VoiceEvent`s, which the session controller consumes in
//! arrival order.

use crate::session::VoiceEvent;
use anyhow::Result;
use std::collections::HashMap;
use tokio::sync::mpsc;

/// Per-session configuration handed to the voice transport
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceStartConfig {
    /// Credential authorizing the call
    pub credential: String,

    /// Display values substituted into the assistant prompt (e.g. candidate name)
    pub variable_values: HashMap<String, String>,
}

/// Voice transport trait
#[async_trait::async_trait]
pub trait VoiceSession: Send + Sync {
    /// Start the call
    ///
    /// Returns a channel receiver that will receive call events. Dropping
    /// the receiver unsubscribes.
    async fn start(
        &self,
        assistant_id: &str,
        config: &VoiceStartConfig,
    ) -> Result<mpsc::Receiver<VoiceEvent>>;

    /// End the call
    async fn stop(&self) -> Result<()>;

    /// Get transport name for logging
    fn name(&self) -> &str;
}

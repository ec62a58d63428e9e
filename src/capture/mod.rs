//! Video/audio capture resource
//!
//! Camera and microphone acquisition is owned by an external component;
//! this module only scopes it to a session. A `CaptureLease` is taken
//! when the session starts connecting and released on every exit path,
//! explicitly or on drop.

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

/// One captured video frame (encoded image bytes)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub sequence: u64,
}

/// Capture backend trait
#[async_trait::async_trait]
pub trait MediaCapture: Send + Sync {
    /// Start capturing
    async fn acquire(&self) -> Result<()>;

    /// Stop capturing and free the device. Must be idempotent.
    fn release(&self);

    /// Most recent video frame, if one has arrived
    fn current_frame(&self) -> Option<VideoFrame>;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Scoped ownership of an acquired capture resource
pub struct CaptureLease {
    capture: Arc<dyn MediaCapture>,
    released: bool,
}

impl CaptureLease {
    /// Acquire the capture resource
    pub async fn acquire(capture: Arc<dyn MediaCapture>) -> Result<Self> {
        capture.acquire().await?;
        info!("Capture acquired: {}", capture.name());

        Ok(Self {
            capture,
            released: false,
        })
    }

    /// Shared handle for reading frames while the lease is held
    pub fn capture(&self) -> Arc<dyn MediaCapture> {
        Arc::clone(&self.capture)
    }

    /// Release the capture resource now
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.capture.release();
        info!("Capture released: {}", self.capture.name());
    }
}

impl Drop for CaptureLease {
    fn drop(&mut self) {
        if !self.released {
            warn!("Capture lease dropped without explicit release");
            self.release_inner();
        }
    }
}

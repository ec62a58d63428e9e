use crate::session::{SessionCollaborators, SessionConfig, SessionHandle};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Builds the collaborators for a new session
pub trait CollaboratorFactory: Send + Sync {
    fn collaborators(&self, session_id: &str) -> SessionCollaborators;
}

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub factory: Arc<dyn CollaboratorFactory>,
    pub session_config: SessionConfig,

    /// The live (or most recently finished) session
    pub current: Arc<RwLock<Option<SessionHandle>>>,
}

impl AppState {
    pub fn new(factory: Arc<dyn CollaboratorFactory>, session_config: SessionConfig) -> Self {
        Self {
            factory,
            session_config,
            current: Arc::new(RwLock::new(None)),
        }
    }
}

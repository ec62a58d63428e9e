//! HTTP API for controlling the interview session
//!
//! One session is live at a time:
//! - POST /interviews/start - Start a new session
//! - POST /interviews/stop - Stop the live session
//! - GET /interviews/status - Query session status
//! - GET /interviews/transcript - Get finalized utterances
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use handlers::{StartInterviewRequest, StartInterviewResponse};
pub use routes::create_router;
pub use state::{AppState, CollaboratorFactory};

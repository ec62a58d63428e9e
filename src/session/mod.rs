//! Interview session management
//!
//! This module provides the `SessionController` state machine that manages:
//! - Session lifecycle (Idle, Connecting, Active, Ending, Ended)
//! - Voice transport events, consumed through a single ordered inbox
//! - Transcript consolidation while the session is active
//! - Presence monitoring and capture scoping
//! - Evaluation dispatch at termination

mod config;
mod controller;
mod events;
mod handle;
mod notice;
mod state;
mod stats;

pub use config::{AssistantProfile, SessionConfig, StartRequest};
pub use controller::{SessionCollaborators, SessionController, SessionOutcome};
pub use events::{SessionEvent, VoiceEvent};
pub use handle::SessionHandle;
pub use notice::SessionNotice;
pub use state::SessionState;
pub use stats::SessionStats;

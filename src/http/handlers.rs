use super::state::AppState;
use crate::error::SessionError;
use crate::session::{AssistantProfile, SessionController, SessionState, StartRequest};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartInterviewRequest {
    /// Credential for the voice transport
    pub session_credential: String,

    /// Role-specific assistant to run
    pub assistant_id: String,

    /// Job role being interviewed for
    pub role: String,

    /// Subject the evaluation is recorded under
    pub subject_id: Option<String>,

    /// Display values for the assistant (e.g. candidate name)
    #[serde(default)]
    pub personalization: HashMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartInterviewResponse {
    pub session_id: String,
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: String) -> axum::response::Response {
    (status, Json(ErrorResponse { error })).into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /interviews/start
/// Start a new interview session
pub async fn start_interview(
    State(state): State<AppState>,
    Json(req): Json<StartInterviewRequest>,
) -> impl IntoResponse {
    // Held across start so concurrent starts serialize
    let mut current = state.current.write().await;

    if let Some(handle) = current.as_ref() {
        let session_state = handle.state();
        if !session_state.is_terminal() {
            return error_response(
                StatusCode::CONFLICT,
                SessionError::AlreadyActive {
                    state: session_state,
                }
                .to_string(),
            );
        }
    }

    let session_id = SessionController::new_session_id();
    info!("Starting interview session: {}", session_id);

    let collaborators = state.factory.collaborators(&session_id);
    let handle = SessionController::spawn_with_id(
        session_id.clone(),
        state.session_config.clone(),
        collaborators,
    );

    let request = StartRequest {
        session_credential: req.session_credential,
        assistant: AssistantProfile {
            assistant_id: req.assistant_id,
            role: req.role,
        },
        subject_id: req.subject_id,
        personalization: req.personalization,
    };

    let result = handle.start(request).await;
    *current = Some(handle);

    match result {
        Ok(()) => (
            StatusCode::OK,
            Json(StartInterviewResponse {
                session_id: session_id.clone(),
                status: "connecting".to_string(),
                message: format!("Interview {} is connecting", session_id),
            }),
        )
            .into_response(),
        Err(e @ SessionError::AlreadyActive { .. }) => {
            error_response(StatusCode::CONFLICT, e.to_string())
        }
        Err(e) => {
            error!("Failed to start interview {}: {}", session_id, e);
            error_response(
                StatusCode::BAD_GATEWAY,
                format!("Failed to start interview: {}", e),
            )
        }
    }
}

/// POST /interviews/stop
/// Stop the live interview session
pub async fn stop_interview(State(state): State<AppState>) -> impl IntoResponse {
    let handle = state.current.read().await.clone();

    match handle {
        Some(handle) => {
            let was_live = handle.state().is_live();
            handle.stop().await;
            info!("Stop requested for interview: {}", handle.session_id());

            if was_live {
                if let Err(e) = handle.wait_for_state(SessionState::Ended).await {
                    error!("Interview {} did not end cleanly: {}", handle.session_id(), e);
                }
            }

            (StatusCode::OK, Json(handle.stats())).into_response()
        }
        None => error_response(StatusCode::NOT_FOUND, "No interview session".to_string()),
    }
}

/// GET /interviews/status
/// Get status of the current session
pub async fn get_interview_status(State(state): State<AppState>) -> impl IntoResponse {
    let current = state.current.read().await;

    match current.as_ref() {
        Some(handle) => (StatusCode::OK, Json(handle.stats())).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "No interview session".to_string()),
    }
}

/// GET /interviews/transcript
/// Get finalized utterances of the current session
pub async fn get_interview_transcript(State(state): State<AppState>) -> impl IntoResponse {
    let current = state.current.read().await;

    match current.as_ref() {
        Some(handle) => (StatusCode::OK, Json(handle.transcript())).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "No interview session".to_string()),
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

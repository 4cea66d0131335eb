//! Axum route handlers for the screening conversation.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::session::{Progress, Reply, SessionState};
use crate::screening::machine;
use crate::state::AppState;

/// Longest candidate message accepted, in characters.
pub const MAX_MESSAGE_CHARS: usize = 4000;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct TurnResponse {
    pub session_id: Uuid,
    pub reply: Reply,
    pub progress: Progress,
}

#[derive(Debug, Serialize)]
pub struct SessionSnapshot {
    #[serde(flatten)]
    pub session: SessionState,
    pub progress: Progress,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
///
/// Starts a new conversation and returns the greeting.
pub async fn handle_start_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<TurnResponse>), AppError> {
    let turn = machine::start(SessionState::new());
    let response = TurnResponse {
        session_id: turn.session.id,
        reply: turn.reply,
        progress: turn.session.progress(),
    };
    state.sessions.insert(turn.session)?;
    let active_sessions = state.sessions.len()?;
    tracing::info!(
        session_id = %response.session_id,
        active_sessions,
        "Session started"
    );

    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/sessions/:id/messages
///
/// Feeds one candidate message to the state machine. Messages for the same
/// session are processed one at a time.
pub async fn handle_message(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<MessageRequest>,
) -> Result<Json<TurnResponse>, AppError> {
    if request.text.chars().count() > MAX_MESSAGE_CHARS {
        return Err(AppError::Validation(format!(
            "text must be at most {MAX_MESSAGE_CHARS} characters"
        )));
    }

    let handle = state.sessions.get(session_id)?;
    let mut guard = handle.lock().await;

    // Work on a copy so an abandoned request leaves the stored state untouched.
    let turn = machine::handle_message(guard.clone(), &request.text, &state.questions).await;
    *guard = turn.session;

    Ok(Json(TurnResponse {
        session_id,
        reply: turn.reply,
        progress: guard.progress(),
    }))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let handle = state.sessions.get(session_id)?;
    let session = handle.lock().await.clone();
    let progress = session.progress();
    Ok(Json(SessionSnapshot { session, progress }))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_end_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.remove(session_id)?;
    tracing::info!(session_id = %session_id, "Session removed");
    Ok(StatusCode::NO_CONTENT)
}

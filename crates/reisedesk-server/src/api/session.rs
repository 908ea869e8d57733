// ABOUTME: Session API handlers exposing the active conversation and its reset.
// ABOUTME: Reset opens a fresh remote thread; the old one is abandoned, not deleted.

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;

use crate::app_state::SharedState;

/// GET /api/session - Report the active session, its thread, and the transcript.
pub async fn show(State(state): State<SharedState>) -> impl IntoResponse {
    let session = state.session.lock().await;

    Json(serde_json::json!({
        "session_id": session.session_id.to_string(),
        "thread_id": session.thread_id,
        "variant": state.variant.as_str(),
        "agent_id": state.relay.orchestrator(),
        "started_at": session.started_at.to_rfc3339(),
        "history": session.history.exchanges,
    }))
}

/// POST /api/session/reset - Swap in a fresh thread and drop the transcript.
pub async fn reset(State(state): State<SharedState>) -> impl IntoResponse {
    // Lock before creating the thread so no send lands between the swap
    // and the response.
    let mut session = state.session.lock().await;

    let thread_id = match state.relay.start_thread().await {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("session reset failed: {}", e);
            return (
                super::agents_error_status(&e),
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response();
        }
    };

    let old_thread = session.thread_id.clone();
    session.reset(thread_id);
    tracing::debug!(old = %old_thread, new = %session.thread_id, "session reset, old thread abandoned");

    Json(serde_json::json!({
        "thread_id": session.thread_id,
        "history": session.history.exchanges,
    }))
    .into_response()
}

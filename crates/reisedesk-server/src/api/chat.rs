// ABOUTME: Chat API handler relaying one user message to the agent squad.
// ABOUTME: Validates the message, drives the relay, and records the exchange.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;

use crate::app_state::SharedState;
use crate::web::CHAT_MAX_LENGTH;

/// Request body for sending a chat message.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// POST /api/chat - Send a message to the squad and wait for the reply.
pub async fn send(
    State(state): State<SharedState>,
    Json(req): Json<ChatRequest>,
) -> impl IntoResponse {
    let message = req.message.trim().to_string();
    if message.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "message cannot be empty" })),
        )
            .into_response();
    }
    if message.chars().count() > CHAT_MAX_LENGTH {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": format!("message too long (max {} characters)", CHAT_MAX_LENGTH)
            })),
        )
            .into_response();
    }

    // Holding the session lock across the send keeps runs strictly serial.
    let mut session = state.session.lock().await;
    let outcome = match state.relay.send(&session.thread_id, &message).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("chat send failed: {}", e);
            return (
                super::agents_error_status(&e),
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response();
        }
    };

    session.history.record(message.clone(), outcome.reply.clone());

    Json(serde_json::json!({
        "echo": message,
        "reply": outcome.reply,
        "run_status": outcome.run_status,
        "history": session.history.exchanges,
    }))
    .into_response()
}

// ABOUTME: Route definitions for the reisedesk HTTP server.
// ABOUTME: Assembles the web UI and JSON API routes into a single Axum Router.

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::api;
use crate::app_state::SharedState;
use crate::auth::AuthLayer;
use crate::web;

/// Build the complete Axum router with all routes and shared state.
/// When an auth token is given, /api/* routes require it as a bearer token.
pub fn create_router(state: SharedState, auth_token: Option<String>) -> Router {
    let router = Router::new()
        .route("/", get(web::index))
        .route("/health", get(health))
        .route("/web/chat", get(web::transcript).post(web::send_message))
        .route("/web/chat/clear", post(web::clear_chat))
        .route("/web/squad", get(web::squad_status))
        .route("/api/chat", post(api::chat::send))
        .route("/api/session", get(api::session::show))
        .route("/api/session/reset", post(api::session::reset))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    match auth_token {
        Some(token) => router.layer(AuthLayer::new(token)),
        None => router,
    }
}

/// Health check handler. Returns 200 OK with a simple JSON body.
async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}

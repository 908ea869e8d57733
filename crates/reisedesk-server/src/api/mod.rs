// ABOUTME: API module containing all HTTP handler functions for the reisedesk JSON API.
// ABOUTME: Organized into sub-modules for chat sends and session inspection/reset.

use axum::http::StatusCode;
use reisedesk_agents::AgentsError;

pub mod chat;
pub mod session;

/// Map a relay/service failure to the status we answer the browser with.
/// The service being slow or broken is an upstream fault, not ours.
pub(crate) fn agents_error_status(error: &AgentsError) -> StatusCode {
    match error {
        AgentsError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        AgentsError::RunTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::BAD_GATEWAY,
    }
}

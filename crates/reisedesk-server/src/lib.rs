// ABOUTME: HTTP server for reisedesk, serving the JSON API and the HTMX chat UI.
// ABOUTME: Uses Axum with shared session state over the agents-service relay.

pub mod api;
pub mod app_state;
pub mod auth;
pub mod config;
pub mod routes;
pub mod web;

pub use app_state::{AppState, SharedState, SquadVariant};
pub use config::{Config, ConfigError};
pub use routes::create_router;

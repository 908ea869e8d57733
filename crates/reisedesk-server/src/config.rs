// ABOUTME: Configuration loading and validation for the reisedesk server.
// ABOUTME: Reads agents-service coordinates and server settings from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PROJECT_ENDPOINT is not set; the agents service base URL is required")]
    MissingEndpoint,

    #[error("MODEL_DEPLOYMENT_NAME is not set; required for creating agents")]
    MissingModel,

    #[error("REISEDESK_BIND is not a valid socket address: {0}")]
    InvalidBind(String),

    #[error("REISEDESK_RUN_TIMEOUT_SECS is not a whole number of seconds: {0}")]
    InvalidTimeout(String),

    #[error("REISEDESK_ALLOW_REMOTE is true but REISEDESK_AUTH_TOKEN is not set; refusing to start without authentication")]
    RemoteWithoutToken,
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model_deployment: String,
    pub bind: SocketAddr,
    pub agent_id: Option<String>,
    pub policy_file: PathBuf,
    pub run_timeout: Duration,
    pub allow_remote: bool,
    pub auth_token: Option<String>,
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// Environment variables:
    /// - PROJECT_ENDPOINT: base URL of the hosted agents service (required)
    /// - PROJECT_API_KEY: bearer token sent to the agents service (optional)
    /// - MODEL_DEPLOYMENT_NAME: model used when creating agents (required)
    /// - REISEDESK_BIND: socket address to bind (default: 127.0.0.1:7878)
    /// - REISEDESK_AGENT_ID: bind one existing agent instead of provisioning (optional)
    /// - REISEDESK_POLICY_FILE: travel policy document (default: resources/reiserichtlinie.md)
    /// - REISEDESK_RUN_TIMEOUT_SECS: run poll deadline in seconds (default: 120)
    /// - REISEDESK_ALLOW_REMOTE: allow non-loopback connections (default: false)
    /// - REISEDESK_AUTH_TOKEN: bearer token for API auth (optional)
    pub fn from_env() -> Result<Self, ConfigError> {
        let endpoint = std::env::var("PROJECT_ENDPOINT")
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingEndpoint)?;

        let api_key = std::env::var("PROJECT_API_KEY").ok().filter(|k| !k.is_empty());

        let model_deployment = std::env::var("MODEL_DEPLOYMENT_NAME")
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingModel)?;

        let bind_str = std::env::var("REISEDESK_BIND")
            .unwrap_or_else(|_| "127.0.0.1:7878".to_string());
        let bind: SocketAddr = bind_str
            .parse()
            .map_err(|_| ConfigError::InvalidBind(bind_str))?;

        let agent_id = std::env::var("REISEDESK_AGENT_ID").ok().filter(|v| !v.is_empty());

        let policy_file = std::env::var("REISEDESK_POLICY_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("resources/reiserichtlinie.md"));

        let timeout_str = std::env::var("REISEDESK_RUN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".to_string());
        let timeout_secs: u64 = timeout_str
            .parse()
            .map_err(|_| ConfigError::InvalidTimeout(timeout_str))?;
        let run_timeout = Duration::from_secs(timeout_secs);

        let allow_remote = std::env::var("REISEDESK_ALLOW_REMOTE")
            .map(|v| v == "true" || v == "1" || v == "yes")
            .unwrap_or(false);

        let auth_token = std::env::var("REISEDESK_AUTH_TOKEN").ok().filter(|t| !t.is_empty());

        // Security validation: if allowing remote access, require auth token
        if allow_remote && auth_token.is_none() {
            return Err(ConfigError::RemoteWithoutToken);
        }

        Ok(Self {
            endpoint,
            api_key,
            model_deployment,
            bind,
            agent_id,
            policy_file,
            run_timeout,
            allow_remote,
            auth_token,
        })
    }
}

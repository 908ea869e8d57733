// ABOUTME: Shared application state for the reisedesk HTTP server.
// ABOUTME: Holds the relay, the single chat session, and the provisioned squad, if any.

use std::sync::Arc;

use reisedesk_agents::{ProvisionedSquad, Relay};
use reisedesk_core::ChatSession;
use tokio::sync::Mutex;

/// Which agent lineup the relay talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SquadVariant {
    /// One pre-existing agent, bound by id at startup.
    Single,
    /// Orchestrator plus three provisioned specialists.
    Multi,
}

impl SquadVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            SquadVariant::Single => "single-agent",
            SquadVariant::Multi => "multi-agent",
        }
    }
}

/// Shared application state accessible by all Axum handlers.
/// The session mutex serializes sends, so at most one run is in flight
/// against the active thread at any time.
pub struct AppState {
    pub relay: Relay,
    pub session: Mutex<ChatSession>,
    pub variant: SquadVariant,
    /// Present in the multi-agent variant; used by the squad status view
    /// and by teardown at shutdown.
    pub squad: Option<ProvisionedSquad>,
}

/// Type alias for the Arc-wrapped state used with Axum's State extractor.
pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(
        relay: Relay,
        session: ChatSession,
        variant: SquadVariant,
        squad: Option<ProvisionedSquad>,
    ) -> Self {
        Self {
            relay,
            session: Mutex::new(session),
            variant,
            squad,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_labels_are_stable() {
        assert_eq!(SquadVariant::Single.as_str(), "single-agent");
        assert_eq!(SquadVariant::Multi.as_str(), "multi-agent");
    }
}

// ABOUTME: Core library for reisedesk, containing session and conversation types.
// ABOUTME: This crate defines the shared data model used across all reisedesk components.

pub mod conversation;
pub mod ids;
pub mod session;

pub use conversation::{ChatHistory, Exchange};
pub use ids::{AgentId, ThreadId};
pub use session::ChatSession;

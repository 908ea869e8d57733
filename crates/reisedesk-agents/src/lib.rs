// ABOUTME: Agents-service integration for reisedesk: wire types, HTTP client, squad lifecycle.
// ABOUTME: The Relay bridges one chat message to one run of the orchestrator agent.

pub mod client;
pub mod instructions;
pub mod provision;
pub mod relay;
pub mod testing;
pub mod types;

pub use client::{AgentsApi, AgentsClient, AgentsError};
pub use provision::{
    ProvisionError, ProvisionedSquad, bind_existing, provision_squad, teardown_squad,
};
pub use relay::{Relay, SendOutcome, latest_agent_reply};
pub use types::{
    Agent, Message, MessageContent, MessagePage, MessageRole, NewAgent, Run, RunError, RunStatus,
    Thread, UploadedFile, VectorStore,
};

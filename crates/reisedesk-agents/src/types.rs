// ABOUTME: Wire types for the hosted agents service (agents, threads, messages, runs).
// ABOUTME: Also builds the tool definition payloads for connected agents and file search.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use reisedesk_core::{AgentId, ThreadId};

/// An agent definition as returned by the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: Option<String>,
    pub model: Option<String>,
}

impl Agent {
    /// Name for logs and UI, falling back to the id when the service
    /// returned none.
    pub fn display_name(&self) -> &str {
        match &self.name {
            Some(name) if !name.is_empty() => name,
            _ => self.id.as_str(),
        }
    }
}

/// Request body for creating an agent.
#[derive(Debug, Clone, Serialize)]
pub struct NewAgent {
    pub model: String,
    pub name: String,
    pub instructions: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_resources: Option<Value>,
}

impl NewAgent {
    /// An agent with no tools, just a model and instructions.
    pub fn plain(model: &str, name: &str, instructions: &str) -> Self {
        Self {
            model: model.to_string(),
            name: name.to_string(),
            instructions: instructions.to_string(),
            tools: Vec::new(),
            tool_resources: None,
        }
    }
}

/// A conversation thread on the service. Messages and runs hang off it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    pub id: ThreadId,
}

/// Who authored a message. The service calls the squad side "assistant".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageRole {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Agent,
}

/// The inner text payload of a text content segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextValue {
    pub value: String,
}

/// One content segment of a message. Only text segments carry a reply we can
/// show; anything else (images, files) is preserved as Unsupported so a
/// message with mixed content still deserializes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    Text { text: TextValue },
    #[serde(other)]
    Unsupported,
}

/// A message on a thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    #[serde(default)]
    pub content: Vec<MessageContent>,
}

impl Message {
    /// The last text segment of this message, if it has any.
    pub fn latest_text(&self) -> Option<&str> {
        self.content.iter().rev().find_map(|segment| match segment {
            MessageContent::Text { text } => Some(text.value.as_str()),
            MessageContent::Unsupported => None,
        })
    }
}

/// One page of a message listing. `has_more` with `last_id` drives cursor
/// pagination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagePage {
    pub data: Vec<Message>,
    #[serde(default)]
    pub has_more: bool,
    pub last_id: Option<String>,
}

/// Lifecycle states of a run. Terminal states stop the relay's polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Expired,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunStatus::Completed | RunStatus::Failed | RunStatus::Cancelled | RunStatus::Expired
        )
    }
}

/// Error detail attached to a failed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunError {
    #[serde(default)]
    pub code: String,
    pub message: String,
}

/// A run of an agent over a thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub id: String,
    pub status: RunStatus,
    pub last_error: Option<RunError>,
}

/// A file uploaded to the service. Status is empty when the service does not
/// report processing state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedFile {
    pub id: String,
    #[serde(default)]
    pub status: String,
    pub filename: Option<String>,
}

/// A vector store indexing one or more uploaded files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStore {
    pub id: String,
    #[serde(default)]
    pub status: String,
    pub name: Option<String>,
}

/// Tool definition exposing another agent as a callable tool of the
/// orchestrator.
pub fn connected_agent_tool(agent_id: &AgentId, name: &str, description: &str) -> Value {
    json!({
        "type": "connected_agent",
        "connected_agent": {
            "id": agent_id.as_str(),
            "name": name,
            "description": description,
        }
    })
}

/// Tool definition enabling document search over the agent's vector stores.
pub fn file_search_tool() -> Value {
    json!({ "type": "file_search" })
}

/// Tool resources pointing file search at the given vector stores.
pub fn file_search_resources(vector_store_ids: &[String]) -> Value {
    json!({ "file_search": { "vector_store_ids": vector_store_ids } })
}

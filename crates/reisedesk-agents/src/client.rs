// ABOUTME: Reqwest client for the hosted agents service and the AgentsApi trait.
// ABOUTME: All REST paths, auth headers, and error mapping live here.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use reisedesk_core::{AgentId, ThreadId};

use crate::types::{
    Agent, Message, MessagePage, MessageRole, NewAgent, Run, Thread, UploadedFile, VectorStore,
};

/// Pinned service API version, sent as a query parameter on every call.
const API_VERSION: &str = "2025-05-01";

/// Page size requested when listing messages.
const LIST_PAGE_LIMIT: &str = "100";

/// Errors from talking to the agents service. A failed run is not an error
/// at this level; it comes back as a reply with an Error prefix.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AgentsError {
    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("Unauthorized: check PROJECT_API_KEY")]
    Unauthorized,

    #[error("Rate limited")]
    RateLimited,

    #[error("Service error {status}: {message}")]
    Service { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Run did not finish within {0} seconds")]
    RunTimeout(u64),
}

/// The slice of the agents service reisedesk uses. One method per REST call;
/// polling and pagination loops live in the callers so tests can script each
/// step.
#[async_trait]
pub trait AgentsApi: Send + Sync {
    async fn create_agent(&self, new_agent: NewAgent) -> Result<Agent, AgentsError>;
    async fn get_agent(&self, agent_id: &AgentId) -> Result<Agent, AgentsError>;
    async fn delete_agent(&self, agent_id: &AgentId) -> Result<(), AgentsError>;

    async fn create_thread(&self) -> Result<Thread, AgentsError>;
    async fn create_message(
        &self,
        thread_id: &ThreadId,
        role: MessageRole,
        content: &str,
    ) -> Result<Message, AgentsError>;
    /// List messages oldest-first, starting after the given message id.
    async fn list_messages(
        &self,
        thread_id: &ThreadId,
        after: Option<&str>,
    ) -> Result<MessagePage, AgentsError>;

    async fn create_run(
        &self,
        thread_id: &ThreadId,
        agent_id: &AgentId,
    ) -> Result<Run, AgentsError>;
    async fn get_run(&self, thread_id: &ThreadId, run_id: &str) -> Result<Run, AgentsError>;

    async fn upload_file(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedFile, AgentsError>;
    async fn get_file(&self, file_id: &str) -> Result<UploadedFile, AgentsError>;

    async fn create_vector_store(
        &self,
        name: &str,
        file_ids: Vec<String>,
    ) -> Result<VectorStore, AgentsError>;
    async fn get_vector_store(&self, vector_store_id: &str) -> Result<VectorStore, AgentsError>;
}

/// HTTP implementation of [`AgentsApi`] against a project endpoint.
pub struct AgentsClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl AgentsClient {
    /// Create a client for the given project endpoint. The api key is
    /// optional; without one, requests go out unauthenticated (useful against
    /// local emulators).
    pub fn new(endpoint: String, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}?api-version={}", self.endpoint, path, API_VERSION)
    }

    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        let mut builder = self.client.request(method, url);
        if let Some(api_key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {}", api_key));
        }
        builder
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, AgentsError> {
        let response = request
            .send()
            .await
            .map_err(|e| AgentsError::Transport(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AgentsError::RateLimited);
        }

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(AgentsError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentsError::Service {
                status: status.as_u16(),
                message: extract_error_message(&body),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AgentsError::InvalidResponse(format!("failed to parse JSON: {}", e)))
    }
}

/// Pull the human-readable message out of a service error envelope
/// (`{"error": {"message": ...}}`), falling back to the raw body.
fn extract_error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body)
        && let Some(message) = value
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
    {
        return message.to_string();
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        "no error detail".to_string()
    } else {
        trimmed.to_string()
    }
}

#[async_trait]
impl AgentsApi for AgentsClient {
    async fn create_agent(&self, new_agent: NewAgent) -> Result<Agent, AgentsError> {
        let request = self
            .request(reqwest::Method::POST, self.url("/assistants"))
            .json(&new_agent);
        self.execute(request).await
    }

    async fn get_agent(&self, agent_id: &AgentId) -> Result<Agent, AgentsError> {
        let request = self.request(
            reqwest::Method::GET,
            self.url(&format!("/assistants/{}", agent_id)),
        );
        self.execute(request).await
    }

    async fn delete_agent(&self, agent_id: &AgentId) -> Result<(), AgentsError> {
        let request = self.request(
            reqwest::Method::DELETE,
            self.url(&format!("/assistants/{}", agent_id)),
        );
        let _: Value = self.execute(request).await?;
        Ok(())
    }

    async fn create_thread(&self) -> Result<Thread, AgentsError> {
        let request = self
            .request(reqwest::Method::POST, self.url("/threads"))
            .json(&json!({}));
        self.execute(request).await
    }

    async fn create_message(
        &self,
        thread_id: &ThreadId,
        role: MessageRole,
        content: &str,
    ) -> Result<Message, AgentsError> {
        let request = self
            .request(
                reqwest::Method::POST,
                self.url(&format!("/threads/{}/messages", thread_id)),
            )
            .json(&json!({ "role": role, "content": content }));
        self.execute(request).await
    }

    async fn list_messages(
        &self,
        thread_id: &ThreadId,
        after: Option<&str>,
    ) -> Result<MessagePage, AgentsError> {
        let mut request = self
            .request(
                reqwest::Method::GET,
                self.url(&format!("/threads/{}/messages", thread_id)),
            )
            .query(&[("order", "asc"), ("limit", LIST_PAGE_LIMIT)]);
        if let Some(after) = after {
            request = request.query(&[("after", after)]);
        }
        self.execute(request).await
    }

    async fn create_run(
        &self,
        thread_id: &ThreadId,
        agent_id: &AgentId,
    ) -> Result<Run, AgentsError> {
        let request = self
            .request(
                reqwest::Method::POST,
                self.url(&format!("/threads/{}/runs", thread_id)),
            )
            .json(&json!({ "assistant_id": agent_id }));
        self.execute(request).await
    }

    async fn get_run(&self, thread_id: &ThreadId, run_id: &str) -> Result<Run, AgentsError> {
        let request = self.request(
            reqwest::Method::GET,
            self.url(&format!("/threads/{}/runs/{}", thread_id, run_id)),
        );
        self.execute(request).await
    }

    async fn upload_file(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedFile, AgentsError> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new()
            .text("purpose", "agents")
            .part("file", part);
        let request = self
            .request(reqwest::Method::POST, self.url("/files"))
            .multipart(form);
        self.execute(request).await
    }

    async fn get_file(&self, file_id: &str) -> Result<UploadedFile, AgentsError> {
        let request = self.request(reqwest::Method::GET, self.url(&format!("/files/{}", file_id)));
        self.execute(request).await
    }

    async fn create_vector_store(
        &self,
        name: &str,
        file_ids: Vec<String>,
    ) -> Result<VectorStore, AgentsError> {
        let request = self
            .request(reqwest::Method::POST, self.url("/vector_stores"))
            .json(&json!({ "name": name, "file_ids": file_ids }));
        self.execute(request).await
    }

    async fn get_vector_store(&self, vector_store_id: &str) -> Result<VectorStore, AgentsError> {
        let request = self.request(
            reqwest::Method::GET,
            self.url(&format!("/vector_stores/{}", vector_store_id)),
        );
        self.execute(request).await
    }
}

// ABOUTME: Test utilities for reisedesk-agents, including a scripted in-memory service.
// ABOUTME: Used in tests to walk provisioning and relay flows without real API calls.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use reisedesk_core::{AgentId, ThreadId};

use crate::client::{AgentsApi, AgentsError};
use crate::types::{
    Agent, Message, MessageContent, MessagePage, MessageRole, NewAgent, Run, RunError, RunStatus,
    TextValue, Thread, UploadedFile, VectorStore,
};

/// Build an agent message with a single text segment.
pub fn agent_text_message(id: &str, text: &str) -> Message {
    Message {
        id: id.to_string(),
        role: MessageRole::Agent,
        content: vec![MessageContent::Text {
            text: TextValue {
                value: text.to_string(),
            },
        }],
    }
}

/// Build a user message with a single text segment.
pub fn user_text_message(id: &str, text: &str) -> Message {
    Message {
        id: id.to_string(),
        role: MessageRole::User,
        content: vec![MessageContent::Text {
            text: TextValue {
                value: text.to_string(),
            },
        }],
    }
}

/// Build an agent message carrying no text segments at all.
pub fn textless_agent_message(id: &str) -> Message {
    Message {
        id: id.to_string(),
        role: MessageRole::Agent,
        content: vec![MessageContent::Unsupported],
    }
}

struct Script {
    next_agent: u64,
    next_thread: u64,
    next_message: u64,
    next_run: u64,
    next_file: u64,
    next_store: u64,
    page_size: usize,
    run_statuses: VecDeque<RunStatus>,
    final_run_status: RunStatus,
    run_error: Option<RunError>,
    queued_replies: VecDeque<Vec<MessageContent>>,
    agents: HashMap<String, Agent>,
    threads: HashMap<String, Vec<Message>>,
    created_agents: Vec<NewAgent>,
    deleted_agents: Vec<AgentId>,
    uploaded_files: Vec<String>,
    file_statuses: VecDeque<String>,
    store_statuses: VecDeque<String>,
    created_stores: Vec<(String, Vec<String>)>,
    failures: HashMap<&'static str, AgentsError>,
    calls: Vec<String>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            next_agent: 0,
            next_thread: 0,
            next_message: 0,
            next_run: 0,
            next_file: 0,
            next_store: 0,
            page_size: usize::MAX,
            run_statuses: VecDeque::new(),
            final_run_status: RunStatus::Completed,
            run_error: None,
            queued_replies: VecDeque::new(),
            agents: HashMap::new(),
            threads: HashMap::new(),
            created_agents: Vec::new(),
            deleted_agents: Vec::new(),
            uploaded_files: Vec::new(),
            file_statuses: VecDeque::new(),
            store_statuses: VecDeque::new(),
            created_stores: Vec::new(),
            failures: HashMap::new(),
            calls: Vec::new(),
        }
    }
}

impl Script {
    fn take_failure(&mut self, op: &'static str) -> Option<AgentsError> {
        self.failures.remove(op)
    }

    /// Next status a run reports, consuming the scripted sequence first.
    fn next_run_status(&mut self) -> (RunStatus, Option<RunError>) {
        let status = self
            .run_statuses
            .pop_front()
            .unwrap_or(self.final_run_status);
        let error = if status == RunStatus::Failed {
            self.run_error.clone()
        } else {
            None
        };
        (status, error)
    }

    /// When a run completes, the squad's queued reply lands on the thread.
    fn deliver_reply_if_completed(&mut self, thread_id: &ThreadId, status: RunStatus) {
        if status != RunStatus::Completed {
            return;
        }
        let Some(content) = self.queued_replies.pop_front() else {
            return;
        };
        self.next_message += 1;
        let message = Message {
            id: format!("msg_{}", self.next_message),
            role: MessageRole::Agent,
            content,
        };
        self.threads
            .entry(thread_id.as_str().to_string())
            .or_default()
            .push(message);
    }
}

/// An in-memory stand-in for the agents service with scriptable behavior.
///
/// Runs complete immediately by default; tests can stretch them out with
/// [`script_run_statuses`](Self::script_run_statuses), make them fail, or
/// make any single call error via [`fail_next`](Self::fail_next). Every call
/// is recorded so tests can assert on order and absence.
pub struct ScriptedAgentsApi {
    state: Mutex<Script>,
}

impl ScriptedAgentsApi {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(Script::default()),
        }
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.state.lock().expect("script mutex poisoned")
    }

    /// Cap list_messages pages at `page_size` entries.
    pub fn set_page_size(&self, page_size: usize) {
        self.script().page_size = page_size;
    }

    /// Statuses reported by successive run calls before the final status.
    pub fn script_run_statuses(&self, statuses: &[RunStatus]) {
        self.script().run_statuses = statuses.iter().copied().collect();
    }

    /// Make runs end in failure with the given error detail.
    pub fn fail_run(&self, code: &str, message: &str) {
        let mut script = self.script();
        script.final_run_status = RunStatus::Failed;
        script.run_error = Some(RunError {
            code: code.to_string(),
            message: message.to_string(),
        });
    }

    /// Make runs end in failure with no error detail attached.
    pub fn fail_run_without_detail(&self) {
        let mut script = self.script();
        script.final_run_status = RunStatus::Failed;
        script.run_error = None;
    }

    /// Keep runs in_progress forever.
    pub fn stall_runs(&self) {
        self.script().final_run_status = RunStatus::InProgress;
    }

    /// Queue the text of the agent reply delivered when the next run
    /// completes.
    pub fn queue_reply(&self, text: &str) {
        self.script()
            .queued_replies
            .push_back(vec![MessageContent::Text {
                text: TextValue {
                    value: text.to_string(),
                },
            }]);
    }

    /// Statuses reported by upload_file and subsequent get_file calls.
    pub fn script_file_statuses(&self, statuses: &[&str]) {
        self.script().file_statuses = statuses.iter().map(|s| s.to_string()).collect();
    }

    /// Statuses reported by create_vector_store and get_vector_store calls.
    pub fn script_store_statuses(&self, statuses: &[&str]) {
        self.script().store_statuses = statuses.iter().map(|s| s.to_string()).collect();
    }

    /// Pre-register an agent so get_agent can find it.
    pub fn register_agent(&self, id: &str, name: &str) {
        self.script().agents.insert(
            id.to_string(),
            Agent {
                id: AgentId::from(id),
                name: Some(name.to_string()),
                model: None,
            },
        );
    }

    /// Append a message directly to a thread, bypassing the API surface.
    pub fn push_message(&self, thread_id: &ThreadId, message: Message) {
        self.script()
            .threads
            .entry(thread_id.as_str().to_string())
            .or_default()
            .push(message);
    }

    /// Make the next call to `op` (method name) return the given error.
    pub fn fail_next(&self, op: &'static str, error: AgentsError) {
        self.script().failures.insert(op, error);
    }

    pub fn calls(&self) -> Vec<String> {
        self.script().calls.clone()
    }

    pub fn created_agents(&self) -> Vec<NewAgent> {
        self.script().created_agents.clone()
    }

    pub fn deleted_agents(&self) -> Vec<AgentId> {
        self.script().deleted_agents.clone()
    }

    pub fn uploaded_files(&self) -> Vec<String> {
        self.script().uploaded_files.clone()
    }

    pub fn created_vector_stores(&self) -> Vec<(String, Vec<String>)> {
        self.script().created_stores.clone()
    }
}

impl Default for ScriptedAgentsApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AgentsApi for ScriptedAgentsApi {
    async fn create_agent(&self, new_agent: NewAgent) -> Result<Agent, AgentsError> {
        let mut script = self.script();
        script.calls.push(format!("create_agent {}", new_agent.name));
        if let Some(error) = script.take_failure("create_agent") {
            return Err(error);
        }

        script.next_agent += 1;
        let agent = Agent {
            id: AgentId::new(format!("agent_{}", script.next_agent)),
            name: Some(new_agent.name.clone()),
            model: Some(new_agent.model.clone()),
        };
        script
            .agents
            .insert(agent.id.as_str().to_string(), agent.clone());
        script.created_agents.push(new_agent);
        Ok(agent)
    }

    async fn get_agent(&self, agent_id: &AgentId) -> Result<Agent, AgentsError> {
        let mut script = self.script();
        script.calls.push(format!("get_agent {}", agent_id));
        if let Some(error) = script.take_failure("get_agent") {
            return Err(error);
        }

        script
            .agents
            .get(agent_id.as_str())
            .cloned()
            .ok_or_else(|| AgentsError::Service {
                status: 404,
                message: "agent not found".to_string(),
            })
    }

    async fn delete_agent(&self, agent_id: &AgentId) -> Result<(), AgentsError> {
        let mut script = self.script();
        script.calls.push(format!("delete_agent {}", agent_id));
        if let Some(error) = script.take_failure("delete_agent") {
            return Err(error);
        }

        match script.agents.remove(agent_id.as_str()) {
            Some(agent) => {
                script.deleted_agents.push(agent.id);
                Ok(())
            }
            None => Err(AgentsError::Service {
                status: 404,
                message: "agent not found".to_string(),
            }),
        }
    }

    async fn create_thread(&self) -> Result<Thread, AgentsError> {
        let mut script = self.script();
        script.calls.push("create_thread".to_string());
        if let Some(error) = script.take_failure("create_thread") {
            return Err(error);
        }

        script.next_thread += 1;
        let id = format!("thread_{}", script.next_thread);
        script.threads.insert(id.clone(), Vec::new());
        Ok(Thread {
            id: ThreadId::new(id),
        })
    }

    async fn create_message(
        &self,
        thread_id: &ThreadId,
        role: MessageRole,
        content: &str,
    ) -> Result<Message, AgentsError> {
        let mut script = self.script();
        script.calls.push(format!("create_message {}", thread_id));
        if let Some(error) = script.take_failure("create_message") {
            return Err(error);
        }

        script.next_message += 1;
        let message = Message {
            id: format!("msg_{}", script.next_message),
            role,
            content: vec![MessageContent::Text {
                text: TextValue {
                    value: content.to_string(),
                },
            }],
        };
        script
            .threads
            .entry(thread_id.as_str().to_string())
            .or_default()
            .push(message.clone());
        Ok(message)
    }

    async fn list_messages(
        &self,
        thread_id: &ThreadId,
        after: Option<&str>,
    ) -> Result<MessagePage, AgentsError> {
        let mut script = self.script();
        script
            .calls
            .push(format!("list_messages {} after={:?}", thread_id, after));
        if let Some(error) = script.take_failure("list_messages") {
            return Err(error);
        }

        let messages = script
            .threads
            .get(thread_id.as_str())
            .cloned()
            .unwrap_or_default();
        let start = match after {
            Some(after) => match messages.iter().position(|m| m.id == after) {
                Some(index) => index + 1,
                None => messages.len(),
            },
            None => 0,
        };
        let end = (start + script.page_size).min(messages.len());
        let data: Vec<Message> = messages[start..end].to_vec();
        Ok(MessagePage {
            has_more: end < messages.len(),
            last_id: data.last().map(|m| m.id.clone()),
            data,
        })
    }

    async fn create_run(
        &self,
        thread_id: &ThreadId,
        agent_id: &AgentId,
    ) -> Result<Run, AgentsError> {
        let mut script = self.script();
        script
            .calls
            .push(format!("create_run {} {}", thread_id, agent_id));
        if let Some(error) = script.take_failure("create_run") {
            return Err(error);
        }

        script.next_run += 1;
        let id = format!("run_{}", script.next_run);
        let (status, last_error) = script.next_run_status();
        script.deliver_reply_if_completed(thread_id, status);
        Ok(Run {
            id,
            status,
            last_error,
        })
    }

    async fn get_run(&self, thread_id: &ThreadId, run_id: &str) -> Result<Run, AgentsError> {
        let mut script = self.script();
        script
            .calls
            .push(format!("get_run {} {}", thread_id, run_id));
        if let Some(error) = script.take_failure("get_run") {
            return Err(error);
        }

        let (status, last_error) = script.next_run_status();
        script.deliver_reply_if_completed(thread_id, status);
        Ok(Run {
            id: run_id.to_string(),
            status,
            last_error,
        })
    }

    async fn upload_file(
        &self,
        filename: &str,
        _bytes: Vec<u8>,
    ) -> Result<UploadedFile, AgentsError> {
        let mut script = self.script();
        script.calls.push(format!("upload_file {}", filename));
        if let Some(error) = script.take_failure("upload_file") {
            return Err(error);
        }

        script.next_file += 1;
        script.uploaded_files.push(filename.to_string());
        let status = script
            .file_statuses
            .pop_front()
            .unwrap_or_else(|| "processed".to_string());
        Ok(UploadedFile {
            id: format!("file_{}", script.next_file),
            status,
            filename: Some(filename.to_string()),
        })
    }

    async fn get_file(&self, file_id: &str) -> Result<UploadedFile, AgentsError> {
        let mut script = self.script();
        script.calls.push(format!("get_file {}", file_id));
        if let Some(error) = script.take_failure("get_file") {
            return Err(error);
        }

        let status = script
            .file_statuses
            .pop_front()
            .unwrap_or_else(|| "processed".to_string());
        Ok(UploadedFile {
            id: file_id.to_string(),
            status,
            filename: None,
        })
    }

    async fn create_vector_store(
        &self,
        name: &str,
        file_ids: Vec<String>,
    ) -> Result<VectorStore, AgentsError> {
        let mut script = self.script();
        script.calls.push(format!("create_vector_store {}", name));
        if let Some(error) = script.take_failure("create_vector_store") {
            return Err(error);
        }

        script.next_store += 1;
        script
            .created_stores
            .push((name.to_string(), file_ids.clone()));
        let status = script
            .store_statuses
            .pop_front()
            .unwrap_or_else(|| "completed".to_string());
        Ok(VectorStore {
            id: format!("vs_{}", script.next_store),
            status,
            name: Some(name.to_string()),
        })
    }

    async fn get_vector_store(&self, vector_store_id: &str) -> Result<VectorStore, AgentsError> {
        let mut script = self.script();
        script
            .calls
            .push(format!("get_vector_store {}", vector_store_id));
        if let Some(error) = script.take_failure("get_vector_store") {
            return Err(error);
        }

        let status = script
            .store_statuses
            .pop_front()
            .unwrap_or_else(|| "completed".to_string());
        Ok(VectorStore {
            id: vector_store_id.to_string(),
            status,
            name: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_run_statuses_play_in_order() {
        let api = ScriptedAgentsApi::new();
        api.script_run_statuses(&[RunStatus::Queued, RunStatus::InProgress]);
        let thread = api.create_thread().await.unwrap();
        let agent = AgentId::from("agent_x");

        let run = api.create_run(&thread.id, &agent).await.unwrap();
        assert_eq!(run.status, RunStatus::Queued);
        let run = api.get_run(&thread.id, &run.id).await.unwrap();
        assert_eq!(run.status, RunStatus::InProgress);
        let run = api.get_run(&thread.id, &run.id).await.unwrap();
        assert_eq!(run.status, RunStatus::Completed);
    }

    #[tokio::test]
    async fn completed_run_delivers_queued_reply() {
        let api = ScriptedAgentsApi::new();
        api.queue_reply("Angekommen");
        let thread = api.create_thread().await.unwrap();

        api.create_run(&thread.id, &AgentId::from("agent_x"))
            .await
            .unwrap();

        let page = api.list_messages(&thread.id, None).await.unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].role, MessageRole::Agent);
        assert_eq!(page.data[0].latest_text(), Some("Angekommen"));
    }

    #[tokio::test]
    async fn list_messages_paginates_with_cursor() {
        let api = ScriptedAgentsApi::new();
        api.set_page_size(2);
        let thread = api.create_thread().await.unwrap();
        for i in 1..=5 {
            api.push_message(&thread.id, user_text_message(&format!("msg_{i}"), "hallo"));
        }

        let first = api.list_messages(&thread.id, None).await.unwrap();
        assert_eq!(first.data.len(), 2);
        assert!(first.has_more);
        assert_eq!(first.last_id.as_deref(), Some("msg_2"));

        let second = api
            .list_messages(&thread.id, first.last_id.as_deref())
            .await
            .unwrap();
        assert_eq!(second.data.len(), 2);
        assert!(second.has_more);

        let third = api
            .list_messages(&thread.id, second.last_id.as_deref())
            .await
            .unwrap();
        assert_eq!(third.data.len(), 1);
        assert!(!third.has_more);
    }

    #[tokio::test]
    async fn fail_next_fires_once() {
        let api = ScriptedAgentsApi::new();
        api.fail_next("create_thread", AgentsError::RateLimited);

        let error = api.create_thread().await.expect_err("first call fails");
        assert!(matches!(error, AgentsError::RateLimited));

        api.create_thread().await.expect("second call succeeds");
    }
}

// ABOUTME: Relay bridging one chat message to one run of the orchestrator agent.
// ABOUTME: Appends the user message, drives the run to a terminal state, extracts the reply.

use std::sync::Arc;
use std::time::Duration;

use reisedesk_core::{AgentId, ThreadId};

use crate::client::{AgentsApi, AgentsError};
use crate::types::{Message, MessageRole, Run, RunStatus};

const RUN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Reply prefix used when a run fails instead of answering.
const ERROR_REPLY_PREFIX: &str = "Error: ";

/// What a send produced: the reply text to show and the terminal status the
/// run ended in. A failed run still yields a reply (the error text).
#[derive(Debug, Clone)]
pub struct SendOutcome {
    pub reply: String,
    pub run_status: RunStatus,
}

/// Drives the message-run-reply cycle against one orchestrator agent.
pub struct Relay {
    api: Arc<dyn AgentsApi>,
    orchestrator: AgentId,
    run_timeout: Duration,
}

impl Relay {
    pub fn new(api: Arc<dyn AgentsApi>, orchestrator: AgentId, run_timeout: Duration) -> Self {
        Self {
            api,
            orchestrator,
            run_timeout,
        }
    }

    pub fn orchestrator(&self) -> &AgentId {
        &self.orchestrator
    }

    pub fn api(&self) -> &dyn AgentsApi {
        self.api.as_ref()
    }

    /// Open a fresh remote thread. Used at session start and on every reset;
    /// the previous thread, if any, is simply abandoned.
    pub async fn start_thread(&self) -> Result<ThreadId, AgentsError> {
        let thread = self.api.create_thread().await?;
        tracing::debug!(thread_id = %thread.id, "thread opened");
        Ok(thread.id)
    }

    /// Send one user message through the squad and wait for its reply.
    ///
    /// The message is appended to the thread, a run of the orchestrator is
    /// started and polled until it reaches a terminal state, then the newest
    /// agent reply is read back. When the run fails, the service's error
    /// detail becomes the reply and the thread is not re-read.
    pub async fn send(&self, thread_id: &ThreadId, text: &str) -> Result<SendOutcome, AgentsError> {
        self.api
            .create_message(thread_id, MessageRole::User, text)
            .await?;

        let run = self.api.create_run(thread_id, &self.orchestrator).await?;
        tracing::debug!(run_id = %run.id, thread_id = %thread_id, "run started");
        let run = self.wait_for_run(thread_id, run).await?;

        if run.status == RunStatus::Failed {
            let detail = run
                .last_error
                .map(|error| error.message)
                .unwrap_or_else(|| "unknown".to_string());
            tracing::warn!(run_id = %run.id, detail = %detail, "run failed");
            return Ok(SendOutcome {
                reply: format!("{ERROR_REPLY_PREFIX}{detail}"),
                run_status: RunStatus::Failed,
            });
        }

        tracing::debug!(run_id = %run.id, status = ?run.status, "run finished");
        let reply = latest_agent_reply(self.api.as_ref(), thread_id).await?;
        Ok(SendOutcome {
            reply,
            run_status: run.status,
        })
    }

    async fn wait_for_run(&self, thread_id: &ThreadId, run: Run) -> Result<Run, AgentsError> {
        let poll = async {
            let mut run = run;
            loop {
                if run.status.is_terminal() {
                    return Ok(run);
                }
                tokio::time::sleep(RUN_POLL_INTERVAL).await;
                run = self.api.get_run(thread_id, &run.id).await?;
            }
        };

        match tokio::time::timeout(self.run_timeout, poll).await {
            Ok(result) => result,
            Err(_) => Err(AgentsError::RunTimeout(self.run_timeout.as_secs())),
        }
    }
}

/// Walk the full message list of a thread and return the newest agent reply.
///
/// Pages arrive oldest-first and are stitched together, then scanned from the
/// newest end. Agent messages without a text segment are skipped. An empty
/// string means the squad has not answered on this thread.
pub async fn latest_agent_reply(
    api: &dyn AgentsApi,
    thread_id: &ThreadId,
) -> Result<String, AgentsError> {
    let mut messages: Vec<Message> = Vec::new();
    let mut after: Option<String> = None;
    loop {
        let page = api.list_messages(thread_id, after.as_deref()).await?;
        messages.extend(page.data);
        if !page.has_more {
            break;
        }
        match page.last_id {
            Some(last_id) => after = Some(last_id),
            // A page claiming more data without a cursor would loop forever.
            None => {
                return Err(AgentsError::InvalidResponse(
                    "message page has has_more set but no last_id".to_string(),
                ));
            }
        }
    }

    for message in messages.iter().rev() {
        if message.role == MessageRole::Agent
            && let Some(text) = message.latest_text()
        {
            return Ok(text.to_string());
        }
    }

    Ok(String::new())
}

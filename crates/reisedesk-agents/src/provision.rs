// ABOUTME: Creates and tears down the travel squad on the agents service.
// ABOUTME: Provisioning runs in a fixed order; a failure rolls back agents created so far.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reisedesk_core::AgentId;

use crate::client::{AgentsApi, AgentsError};
use crate::instructions::{
    BOOKING_AGENT_INSTRUCTIONS, BOOKING_AGENT_NAME, BOOKING_TOOL_DESCRIPTION,
    ORCHESTRATOR_AGENT_NAME, ORCHESTRATOR_INSTRUCTIONS, POLICY_AGENT_INSTRUCTIONS,
    POLICY_AGENT_NAME, POLICY_TOOL_DESCRIPTION, RESEARCH_AGENT_INSTRUCTIONS, RESEARCH_AGENT_NAME,
    RESEARCH_TOOL_DESCRIPTION, VECTOR_STORE_NAME,
};
use crate::types::{
    Agent, NewAgent, UploadedFile, VectorStore, connected_agent_tool, file_search_resources,
    file_search_tool,
};

const POLL_INTERVAL: Duration = Duration::from_secs(1);

const FILE_STATUS_PROCESSED: &str = "processed";
const FILE_STATUS_ERROR: &str = "error";
const STORE_STATUS_COMPLETED: &str = "completed";
const STORE_STATUS_IN_PROGRESS: &str = "in_progress";

/// The four agents provisioned for the multi-agent variant, plus the ids of
/// the policy document and its vector store.
#[derive(Debug, Clone)]
pub struct ProvisionedSquad {
    pub orchestrator: Agent,
    pub policy: Agent,
    pub research: Agent,
    pub booking: Agent,
    pub policy_file_id: String,
    pub vector_store_id: String,
}

impl ProvisionedSquad {
    /// All four agent ids, orchestrator first.
    pub fn agent_ids(&self) -> [&AgentId; 4] {
        [
            &self.orchestrator.id,
            &self.policy.id,
            &self.research.id,
            &self.booking.id,
        ]
    }
}

/// Errors raised while standing up the squad.
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("could not read policy document {path}: {source}")]
    PolicyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{step} failed: {source}")]
    Step {
        step: &'static str,
        #[source]
        source: AgentsError,
    },

    #[error("policy document {file_id} finished processing with status {status:?}")]
    FileProcessing { file_id: String, status: String },

    #[error("vector store {vector_store_id} finished indexing with status {status:?}")]
    StoreIndexing {
        vector_store_id: String,
        status: String,
    },
}

/// Stand up the full travel squad: the two plain specialists, the policy
/// document with its vector store, the policy specialist wired to it, and
/// finally the orchestrator connected to all three.
///
/// If any step fails, agents created so far are deleted best-effort before
/// the error is returned, so a crashed startup does not leak agents.
pub async fn provision_squad(
    api: &dyn AgentsApi,
    model: &str,
    policy_file: &Path,
) -> Result<ProvisionedSquad, ProvisionError> {
    let mut created: Vec<AgentId> = Vec::new();

    match provision_steps(api, model, policy_file, &mut created).await {
        Ok(squad) => Ok(squad),
        Err(error) => {
            if !created.is_empty() {
                tracing::warn!(
                    count = created.len(),
                    "provisioning failed, deleting partially created agents"
                );
                for agent_id in &created {
                    if let Err(delete_error) = api.delete_agent(agent_id).await {
                        tracing::warn!(
                            agent_id = %agent_id,
                            error = %delete_error,
                            "could not delete partially provisioned agent"
                        );
                    }
                }
            }
            Err(error)
        }
    }
}

async fn provision_steps(
    api: &dyn AgentsApi,
    model: &str,
    policy_file: &Path,
    created: &mut Vec<AgentId>,
) -> Result<ProvisionedSquad, ProvisionError> {
    let research = api
        .create_agent(NewAgent::plain(
            model,
            RESEARCH_AGENT_NAME,
            RESEARCH_AGENT_INSTRUCTIONS,
        ))
        .await
        .map_err(|source| ProvisionError::Step {
            step: "creating research agent",
            source,
        })?;
    created.push(research.id.clone());
    tracing::info!(agent_id = %research.id, "created research agent");

    let booking = api
        .create_agent(NewAgent::plain(
            model,
            BOOKING_AGENT_NAME,
            BOOKING_AGENT_INSTRUCTIONS,
        ))
        .await
        .map_err(|source| ProvisionError::Step {
            step: "creating booking agent",
            source,
        })?;
    created.push(booking.id.clone());
    tracing::info!(agent_id = %booking.id, "created booking agent");

    let bytes = tokio::fs::read(policy_file)
        .await
        .map_err(|source| ProvisionError::PolicyFile {
            path: policy_file.to_path_buf(),
            source,
        })?;
    let filename = policy_file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "reiserichtlinie.md".to_string());

    let uploaded = api
        .upload_file(&filename, bytes)
        .await
        .map_err(|source| ProvisionError::Step {
            step: "uploading policy document",
            source,
        })?;
    let file = wait_for_file(api, uploaded).await?;
    tracing::info!(file_id = %file.id, filename = %filename, "policy document uploaded");

    let store = api
        .create_vector_store(VECTOR_STORE_NAME, vec![file.id.clone()])
        .await
        .map_err(|source| ProvisionError::Step {
            step: "creating vector store",
            source,
        })?;
    let store = wait_for_store(api, store).await?;
    tracing::info!(vector_store_id = %store.id, "policy vector store ready");

    let policy = api
        .create_agent(NewAgent {
            model: model.to_string(),
            name: POLICY_AGENT_NAME.to_string(),
            instructions: POLICY_AGENT_INSTRUCTIONS.to_string(),
            tools: vec![file_search_tool()],
            tool_resources: Some(file_search_resources(&[store.id.clone()])),
        })
        .await
        .map_err(|source| ProvisionError::Step {
            step: "creating policy agent",
            source,
        })?;
    created.push(policy.id.clone());
    tracing::info!(agent_id = %policy.id, "created policy agent");

    let orchestrator = api
        .create_agent(NewAgent {
            model: model.to_string(),
            name: ORCHESTRATOR_AGENT_NAME.to_string(),
            instructions: ORCHESTRATOR_INSTRUCTIONS.to_string(),
            tools: vec![
                connected_agent_tool(&policy.id, POLICY_AGENT_NAME, POLICY_TOOL_DESCRIPTION),
                connected_agent_tool(&research.id, RESEARCH_AGENT_NAME, RESEARCH_TOOL_DESCRIPTION),
                connected_agent_tool(&booking.id, BOOKING_AGENT_NAME, BOOKING_TOOL_DESCRIPTION),
            ],
            tool_resources: None,
        })
        .await
        .map_err(|source| ProvisionError::Step {
            step: "creating orchestrator agent",
            source,
        })?;
    created.push(orchestrator.id.clone());
    tracing::info!(agent_id = %orchestrator.id, "created orchestrator agent");

    Ok(ProvisionedSquad {
        orchestrator,
        policy,
        research,
        booking,
        policy_file_id: file.id,
        vector_store_id: store.id,
    })
}

async fn wait_for_file(
    api: &dyn AgentsApi,
    uploaded: UploadedFile,
) -> Result<UploadedFile, ProvisionError> {
    let mut file = uploaded;
    loop {
        // An empty status means the service does not report processing state.
        if file.status.is_empty() || file.status == FILE_STATUS_PROCESSED {
            return Ok(file);
        }
        if file.status == FILE_STATUS_ERROR {
            return Err(ProvisionError::FileProcessing {
                file_id: file.id,
                status: file.status,
            });
        }

        tracing::debug!(file_id = %file.id, status = %file.status, "waiting for policy document");
        tokio::time::sleep(POLL_INTERVAL).await;
        file = api
            .get_file(&file.id)
            .await
            .map_err(|source| ProvisionError::Step {
                step: "polling uploaded policy document",
                source,
            })?;
    }
}

async fn wait_for_store(
    api: &dyn AgentsApi,
    store: VectorStore,
) -> Result<VectorStore, ProvisionError> {
    let mut store = store;
    loop {
        if store.status.is_empty() || store.status == STORE_STATUS_COMPLETED {
            return Ok(store);
        }
        if store.status != STORE_STATUS_IN_PROGRESS {
            return Err(ProvisionError::StoreIndexing {
                vector_store_id: store.id,
                status: store.status,
            });
        }

        tracing::debug!(vector_store_id = %store.id, "waiting for vector store indexing");
        tokio::time::sleep(POLL_INTERVAL).await;
        store = api
            .get_vector_store(&store.id)
            .await
            .map_err(|source| ProvisionError::Step {
                step: "polling vector store",
                source,
            })?;
    }
}

/// Look up an already-provisioned agent by id for the single-agent variant.
pub async fn bind_existing(api: &dyn AgentsApi, agent_id: &AgentId) -> Result<Agent, AgentsError> {
    let agent = api.get_agent(agent_id).await?;
    tracing::info!(agent_id = %agent.id, name = agent.display_name(), "bound to existing agent");
    Ok(agent)
}

/// Delete all four squad agents. Failures are logged and skipped so one
/// stubborn agent does not keep the rest alive. The uploaded policy document
/// and vector store stay in place.
pub async fn teardown_squad(api: &dyn AgentsApi, squad: &ProvisionedSquad) {
    for agent_id in squad.agent_ids() {
        match api.delete_agent(agent_id).await {
            Ok(()) => tracing::info!(agent_id = %agent_id, "deleted squad agent"),
            Err(error) => {
                tracing::warn!(agent_id = %agent_id, error = %error, "could not delete squad agent")
            }
        }
    }
}

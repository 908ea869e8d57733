// ABOUTME: Entry point for the reisedesk binary.
// ABOUTME: Loads configuration, provisions or binds the agent squad, and serves the chat UI.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use reisedesk_agents::{
    AgentsApi, AgentsClient, Relay, bind_existing, provision_squad, teardown_squad,
};
use reisedesk_core::{AgentId, ChatSession};
use reisedesk_server::{AppState, Config, SquadVariant, create_router};

#[derive(Debug, Parser)]
#[command(name = "reisedesk", about = "Travel-booking chat desk over a hosted agent squad")]
struct Args {
    /// Listen address; overrides REISEDESK_BIND.
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Bind one existing agent by id instead of provisioning the squad;
    /// overrides REISEDESK_AGENT_ID.
    #[arg(long)]
    agent_id: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reisedesk=debug,tower_http=debug".parse().unwrap()),
        )
        .init();

    let args = Args::parse();
    let mut config = Config::from_env().context("loading configuration")?;
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    if args.agent_id.is_some() {
        config.agent_id = args.agent_id;
    }

    if !config.bind.ip().is_loopback() && !config.allow_remote {
        anyhow::bail!(
            "refusing to bind non-loopback address {} without REISEDESK_ALLOW_REMOTE=true",
            config.bind
        );
    }

    tracing::info!("reisedesk starting up");

    let api: Arc<dyn AgentsApi> = Arc::new(AgentsClient::new(
        config.endpoint.clone(),
        config.api_key.clone(),
    ));

    let (orchestrator, variant, squad) = match &config.agent_id {
        Some(agent_id) => {
            let agent = bind_existing(api.as_ref(), &AgentId::from(agent_id.as_str()))
                .await
                .context("binding existing agent")?;
            (agent.id, SquadVariant::Single, None)
        }
        None => {
            let squad =
                provision_squad(api.as_ref(), &config.model_deployment, &config.policy_file)
                    .await
                    .context("provisioning agent squad")?;
            (squad.orchestrator.id.clone(), SquadVariant::Multi, Some(squad))
        }
    };

    let relay = Relay::new(Arc::clone(&api), orchestrator, config.run_timeout);
    let thread_id = relay.start_thread().await.context("opening first thread")?;
    let session = ChatSession::new(thread_id);

    let state = Arc::new(AppState::new(relay, session, variant, squad));
    let router = create_router(Arc::clone(&state), config.auth_token.clone());

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("binding {}", config.bind))?;
    tracing::info!("listening on http://{}", config.bind);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("server error")?;

    if let Some(squad) = &state.squad {
        tracing::info!("shutting down, deleting provisioned agents");
        teardown_squad(state.relay.api(), squad).await;
    }

    tracing::info!("reisedesk stopped");
    Ok(())
}

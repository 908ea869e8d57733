// ABOUTME: Web UI route handlers serving HTML via Askama templates and HTMX.
// ABOUTME: Renders the chat transcript, send/clear actions, and the squad status chip.

use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse};
use serde::Deserialize;

use reisedesk_core::Exchange;

use crate::app_state::{SharedState, SquadVariant};

use askama::Template;
use askama_derive_axum::IntoResponse as AskamaIntoResponse;

/// Maximum allowed length for a chat message (in characters).
pub const CHAT_MAX_LENGTH: usize = 10_000;

/// Index page: header, transcript region, example prompts, input form.
#[derive(Template, AskamaIntoResponse)]
#[template(path = "index.html")]
pub struct IndexTemplate {}

/// GET / - Render the main chat page.
pub async fn index() -> IndexTemplate {
    IndexTemplate {}
}

/// One transcript entry prepared for rendering: the user text stays plain
/// (the template escapes it), the agent reply arrives as Markdown and is
/// rendered to HTML here.
pub struct ExchangeView {
    pub user: String,
    pub reply_html: String,
    pub timestamp: String,
}

impl ExchangeView {
    fn from_exchange(exchange: &Exchange) -> Self {
        Self {
            user: exchange.user.clone(),
            reply_html: markdown_to_html(&exchange.reply),
            timestamp: exchange.at.format("%H:%M:%S").to_string(),
        }
    }
}

/// Render an agent reply's Markdown to HTML for the transcript.
fn markdown_to_html(text: &str) -> String {
    let parser = pulldown_cmark::Parser::new(text);
    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, parser);
    html
}

/// Partial: the chat transcript.
#[derive(Template, AskamaIntoResponse)]
#[template(path = "partials/chat.html")]
pub struct ChatTemplate {
    pub exchanges: Vec<ExchangeView>,
}

/// GET /web/chat - Return the transcript as an HTML partial.
pub async fn transcript(State(state): State<SharedState>) -> ChatTemplate {
    let session = state.session.lock().await;
    ChatTemplate {
        exchanges: session
            .history
            .exchanges
            .iter()
            .map(ExchangeView::from_exchange)
            .collect(),
    }
}

/// Form data for sending a chat message.
#[derive(Deserialize)]
pub struct ChatForm {
    pub message: String,
}

/// POST /web/chat - Send a message to the squad, return the refreshed transcript.
pub async fn send_message(
    State(state): State<SharedState>,
    Form(form): Form<ChatForm>,
) -> impl IntoResponse {
    // Validate message: trim whitespace, reject empty, cap length
    let message = form.message.trim().to_string();
    if message.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Html("<p class=\"error-msg\">Bitte gib eine Nachricht ein.</p>".to_string()),
        )
            .into_response();
    }
    if message.chars().count() > CHAT_MAX_LENGTH {
        return (
            StatusCode::BAD_REQUEST,
            Html(format!(
                "<p class=\"error-msg\">Nachricht zu lang (maximal {} Zeichen).</p>",
                CHAT_MAX_LENGTH
            )),
        )
            .into_response();
    }

    // Holding the session lock across the send keeps runs strictly serial.
    let mut session = state.session.lock().await;
    let outcome = match state.relay.send(&session.thread_id, &message).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("chat send failed: {}", e);
            return (
                StatusCode::BAD_GATEWAY,
                Html(format!(
                    "<p class=\"error-msg\">Das Reisebüro ist gerade nicht erreichbar: {}</p>",
                    e
                )),
            )
                .into_response();
        }
    };

    session.history.record(message, outcome.reply);

    ChatTemplate {
        exchanges: session
            .history
            .exchanges
            .iter()
            .map(ExchangeView::from_exchange)
            .collect(),
    }
    .into_response()
}

/// POST /web/chat/clear - Start over on a fresh thread, return the empty transcript.
pub async fn clear_chat(State(state): State<SharedState>) -> impl IntoResponse {
    let mut session = state.session.lock().await;

    let thread_id = match state.relay.start_thread().await {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("chat clear failed: {}", e);
            return (
                StatusCode::BAD_GATEWAY,
                Html(format!(
                    "<p class=\"error-msg\">Zurücksetzen fehlgeschlagen: {}</p>",
                    e
                )),
            )
                .into_response();
        }
    };

    session.reset(thread_id);
    tracing::debug!(thread_id = %session.thread_id, "chat cleared onto fresh thread");

    ChatTemplate { exchanges: vec![] }.into_response()
}

/// One specialist row in the squad status chip.
pub struct SpecialistView {
    pub role: String,
    pub id: String,
}

/// Partial: which agents the relay talks to.
#[derive(Template, AskamaIntoResponse)]
#[template(path = "partials/squad_status.html")]
pub struct SquadStatusTemplate {
    pub variant: String,
    pub orchestrator: String,
    pub specialists: Vec<SpecialistView>,
}

/// GET /web/squad - Render the agent wiring status partial.
pub async fn squad_status(State(state): State<SharedState>) -> SquadStatusTemplate {
    let specialists = match (&state.variant, &state.squad) {
        (SquadVariant::Multi, Some(squad)) => vec![
            SpecialistView {
                role: "Richtlinie".to_string(),
                id: squad.policy.id.to_string(),
            },
            SpecialistView {
                role: "Recherche".to_string(),
                id: squad.research.id.to_string(),
            },
            SpecialistView {
                role: "Buchung".to_string(),
                id: squad.booking.id.to_string(),
            },
        ],
        _ => vec![],
    };

    SquadStatusTemplate {
        variant: state.variant.as_str().to_string(),
        orchestrator: state.relay.orchestrator().to_string(),
        specialists,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_state::AppState;
    use crate::routes::create_router;
    use axum::body::Body;
    use http::Request;
    use reisedesk_agents::testing::ScriptedAgentsApi;
    use reisedesk_agents::{AgentsApi, AgentsError, Relay};
    use reisedesk_core::{AgentId, ChatSession};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    async fn test_state() -> (Arc<ScriptedAgentsApi>, SharedState) {
        let api = Arc::new(ScriptedAgentsApi::new());
        let thread = api.create_thread().await.unwrap();
        let relay = Relay::new(
            api.clone(),
            AgentId::from("agent_orch"),
            Duration::from_secs(30),
        );
        let state = Arc::new(AppState::new(
            relay,
            ChatSession::new(thread.id),
            SquadVariant::Single,
            None,
        ));
        (api, state)
    }

    async fn body_html(resp: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn index_template_renders() {
        let tmpl = IndexTemplate {};
        let rendered = tmpl.render().unwrap();
        assert!(rendered.contains("reisedesk"));
        assert!(rendered.contains("Beschreibe deine Geschäftsreise"));
        assert!(rendered.contains("/web/chat"));
        assert!(rendered.contains("Ich muss Dienstag bis Freitag nach Berlin reisen."));
    }

    #[test]
    fn chat_template_renders_empty() {
        let tmpl = ChatTemplate { exchanges: vec![] };
        let rendered = tmpl.render().unwrap();
        assert!(rendered.contains("Noch keine Nachrichten"));
    }

    #[test]
    fn chat_template_renders_exchanges() {
        let tmpl = ChatTemplate {
            exchanges: vec![ExchangeView {
                user: "Ich muss nach Berlin.".to_string(),
                reply_html: markdown_to_html("Gerne, **wann** soll es losgehen?"),
                timestamp: "12:34:56".to_string(),
            }],
        };
        let rendered = tmpl.render().unwrap();
        assert!(rendered.contains("Ich muss nach Berlin."));
        assert!(rendered.contains("<strong>wann</strong>"));
        assert!(rendered.contains("12:34:56"));
    }

    #[test]
    fn chat_template_escapes_user_text() {
        let tmpl = ChatTemplate {
            exchanges: vec![ExchangeView {
                user: "<script>alert(1)</script>".to_string(),
                reply_html: String::new(),
                timestamp: "12:00:00".to_string(),
            }],
        };
        let rendered = tmpl.render().unwrap();
        assert!(!rendered.contains("<script>alert(1)</script>"));
        assert!(rendered.contains("&lt;script&gt;"));
    }

    #[test]
    fn squad_template_renders_single_variant() {
        let tmpl = SquadStatusTemplate {
            variant: "single-agent".to_string(),
            orchestrator: "asst_existing".to_string(),
            specialists: vec![],
        };
        let rendered = tmpl.render().unwrap();
        assert!(rendered.contains("single-agent"));
        assert!(rendered.contains("asst_existing"));
    }

    #[test]
    fn squad_template_renders_specialists() {
        let tmpl = SquadStatusTemplate {
            variant: "multi-agent".to_string(),
            orchestrator: "agent_1".to_string(),
            specialists: vec![
                SpecialistView {
                    role: "Richtlinie".to_string(),
                    id: "agent_2".to_string(),
                },
                SpecialistView {
                    role: "Recherche".to_string(),
                    id: "agent_3".to_string(),
                },
                SpecialistView {
                    role: "Buchung".to_string(),
                    id: "agent_4".to_string(),
                },
            ],
        };
        let rendered = tmpl.render().unwrap();
        assert!(rendered.contains("Richtlinie"));
        assert!(rendered.contains("agent_3"));
    }

    #[test]
    fn markdown_renders_lists_and_emphasis() {
        let html = markdown_to_html("- Flug um 9:00\n- Hotel *zentral*");
        assert!(html.contains("<ul>"));
        assert!(html.contains("<em>zentral</em>"));
    }

    #[tokio::test]
    async fn get_index_returns_html() {
        let (_api, state) = test_state().await;
        let app = create_router(state, None);

        let resp = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), 200);
        let html = body_html(resp).await;
        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("reisedesk"));
    }

    #[tokio::test]
    async fn get_web_chat_returns_empty_transcript() {
        let (_api, state) = test_state().await;
        let app = create_router(state, None);

        let resp = app
            .oneshot(Request::get("/web/chat").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), 200);
        let html = body_html(resp).await;
        assert!(html.contains("Noch keine Nachrichten"));
    }

    #[tokio::test]
    async fn post_web_chat_appends_exchange() {
        let (api, state) = test_state().await;
        api.queue_reply("Gerne. Für welche Daten genau?");
        let app = create_router(Arc::clone(&state), None);

        let resp = app
            .oneshot(
                Request::post("/web/chat")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from(
                        "message=Ich+muss+Dienstag+bis+Freitag+nach+Berlin+reisen.",
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), 200);
        let html = body_html(resp).await;
        assert!(html.contains("Ich muss Dienstag bis Freitag nach Berlin reisen."));
        assert!(html.contains("Gerne. Für welche Daten genau?"));
        assert_eq!(state.session.lock().await.history.len(), 1);
    }

    #[tokio::test]
    async fn post_web_chat_rejects_empty_message() {
        let (_api, state) = test_state().await;
        let app = create_router(state, None);

        let resp = app
            .oneshot(
                Request::post("/web/chat")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from("message=++"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let html = body_html(resp).await;
        assert!(html.contains("error-msg"));
    }

    #[tokio::test]
    async fn post_web_chat_renders_failed_run_as_error_reply() {
        let (api, state) = test_state().await;
        api.fail_run("server_error", "timeout");
        let app = create_router(Arc::clone(&state), None);

        let resp = app
            .oneshot(
                Request::post("/web/chat")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from("message=Bitte+ein+Hotel+in+Frankfurt."))
                    .unwrap(),
            )
            .await
            .unwrap();

        // A failed run still answers the chat; the error text is the reply.
        assert_eq!(resp.status(), 200);
        let html = body_html(resp).await;
        assert!(html.contains("Error: timeout"));
        assert_eq!(state.session.lock().await.history.len(), 1);
    }

    #[tokio::test]
    async fn post_web_chat_maps_service_failure_to_bad_gateway() {
        let (api, state) = test_state().await;
        api.fail_next(
            "create_message",
            AgentsError::Transport("connection refused".to_string()),
        );
        let app = create_router(Arc::clone(&state), None);

        let resp = app
            .oneshot(
                Request::post("/web/chat")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from("message=Hallo"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        assert!(state.session.lock().await.history.is_empty());
    }

    #[tokio::test]
    async fn post_web_chat_clear_starts_fresh_thread() {
        let (api, state) = test_state().await;
        api.queue_reply("Erste Antwort");
        let old_thread = state.session.lock().await.thread_id.clone();

        let app = create_router(Arc::clone(&state), None);
        let resp = app
            .oneshot(
                Request::post("/web/chat")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from("message=Hallo"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);

        let app2 = create_router(Arc::clone(&state), None);
        let resp = app2
            .oneshot(
                Request::post("/web/chat/clear")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), 200);
        let html = body_html(resp).await;
        assert!(html.contains("Noch keine Nachrichten"));
        assert!(!html.contains("Erste Antwort"));

        let session = state.session.lock().await;
        assert!(session.history.is_empty());
        assert_ne!(session.thread_id, old_thread);
    }

    #[tokio::test]
    async fn get_web_squad_reports_variant() {
        let (_api, state) = test_state().await;
        let app = create_router(state, None);

        let resp = app
            .oneshot(Request::get("/web/squad").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(resp.status(), 200);
        let html = body_html(resp).await;
        assert!(html.contains("single-agent"));
        assert!(html.contains("agent_orch"));
    }
}

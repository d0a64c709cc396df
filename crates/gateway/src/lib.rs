//! HTTP gateway for Wardline.
//!
//! Endpoints:
//!
//! - `GET    /health`              — engine reachability
//! - `GET    /agents`              — responder discovery
//! - `POST   /query`               — route a staff question
//! - `POST   /research`            — force the research responder
//! - `GET    /conversations/{id}`  — conversation history
//! - `DELETE /conversations/{id}`  — drop a conversation
//!
//! Built on Axum. The orchestrator is shared immutably; all request
//! concurrency lands on the session store's per-conversation locks.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use wardline_agent::{AgentInfo, Answer, Orchestrator};
use wardline_config::AppConfig;
use wardline_core::{Query, ResponderKind, RoutingDecision, SearchBackend, SessionId, StaffRole};
use wardline_engines::HttpEngine;
use wardline_retrieval::{HttpSearchBackend, MemoryIndex};
use wardline_session::SessionStore;

type SharedState = Arc<Orchestrator>;

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::DELETE,
        ])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_handler))
        .route("/agents", get(agents_handler))
        .route("/query", post(query_handler))
        .route("/research", post(research_handler))
        .route("/conversations/{id}", get(get_conversation_handler))
        .route("/conversations/{id}", axum::routing::delete(delete_conversation_handler))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server: wire the engine, retrieval backends,
/// session store, and orchestrator from configuration, then serve.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let engine = Arc::new(HttpEngine::from_config(&config.engine)?);
    let (protocols, policies, inventory) = build_backends(&config)?;
    let sessions = Arc::new(SessionStore::new());

    // The store never sweeps itself; the gateway owns the schedule.
    let ttl_secs = (config.session.idle_timeout_minutes * 60) as i64;
    let sweeper_sessions = Arc::clone(&sessions);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(300));
        loop {
            interval.tick().await;
            sweeper_sessions.sweep_idle(ttl_secs).await;
        }
    });

    let orchestrator = Arc::new(Orchestrator::new(
        engine, &config, protocols, policies, inventory, sessions,
    ));

    let app = build_router(orchestrator);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

type Backends = (
    Arc<dyn SearchBackend>,
    Arc<dyn SearchBackend>,
    Arc<dyn SearchBackend>,
);

/// One search backend per domain, seeded or remote per configuration.
fn build_backends(config: &AppConfig) -> Result<Backends, Box<dyn std::error::Error>> {
    if config.retrieval.backend == "http" {
        let endpoint_for = |domain: &str| -> Result<Arc<dyn SearchBackend>, Box<dyn std::error::Error>> {
            let endpoint = config
                .retrieval
                .endpoints
                .get(domain)
                .ok_or_else(|| format!("retrieval.endpoints is missing '{domain}'"))?;
            Ok(Arc::new(HttpSearchBackend::new(
                domain.to_string(),
                endpoint,
                config.engine.timeout_secs,
            )?))
        };
        return Ok((
            endpoint_for("nursing")?,
            endpoint_for("hr")?,
            endpoint_for("pharmacy")?,
        ));
    }

    Ok((
        Arc::new(MemoryIndex::nursing()),
        Arc::new(MemoryIndex::hr()),
        Arc::new(MemoryIndex::pharmacy()),
    ))
}

// ── Request / Response types ──────────────────────────────────────────────

#[derive(Deserialize)]
struct QueryRequest {
    text: String,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    responder: Option<String>,
}

#[derive(Serialize)]
struct QueryResponse {
    answer: String,
    answer_summary: String,
    responder: ResponderKind,
    routing: RoutingDecision,
    language: String,
    session_id: String,
    citations: Vec<String>,
    complete: bool,
    tool_calls: Vec<ToolCallDto>,
}

#[derive(Serialize)]
struct ToolCallDto {
    iteration: usize,
    tool: String,
    arguments: serde_json::Value,
    result_summary: String,
}

impl From<Answer> for QueryResponse {
    fn from(answer: Answer) -> Self {
        Self {
            answer: answer.text,
            answer_summary: answer.summary,
            responder: answer.responder,
            routing: answer.decision,
            language: answer.language.code().to_string(),
            session_id: answer.session.to_string(),
            citations: answer.citations,
            complete: answer.complete,
            tool_calls: answer
                .records
                .into_iter()
                .map(|r| ToolCallDto {
                    iteration: r.iteration,
                    tool: r.tool,
                    arguments: r.arguments,
                    result_summary: r.result_summary,
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct AgentsResponse {
    agents: Vec<AgentInfo>,
    count: usize,
}

#[derive(Serialize)]
struct ConversationResponse {
    id: String,
    turns: Vec<TurnDto>,
}

#[derive(Serialize)]
struct TurnDto {
    query: String,
    answer: String,
    responder: ResponderKind,
    at: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn bad_request(message: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn health_handler(State(state): State<SharedState>) -> (StatusCode, Json<HealthResponse>) {
    match state.health_check().await {
        Ok(true) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                version: env!("CARGO_PKG_VERSION"),
            }),
        ),
        Ok(false) | Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "degraded",
                version: env!("CARGO_PKG_VERSION"),
            }),
        ),
    }
}

async fn agents_handler(State(state): State<SharedState>) -> Json<AgentsResponse> {
    let agents = state.agent_info();
    let count = agents.len();
    Json(AgentsResponse { agents, count })
}

fn parse_query(payload: QueryRequest) -> Result<Query, (StatusCode, Json<ErrorResponse>)> {
    if payload.text.trim().is_empty() {
        return Err(bad_request("'text' must not be empty"));
    }

    let mut query = Query::new(payload.text);

    if let Some(role) = payload.role {
        let role = StaffRole::from_str(&role).map_err(bad_request)?;
        query = query.with_role(role);
    }
    if let Some(responder) = payload.responder {
        let responder = ResponderKind::from_str(&responder).map_err(bad_request)?;
        query = query.with_responder(responder);
    }
    if let Some(session_id) = payload.session_id {
        query = query.with_session(SessionId::from(&session_id));
    }

    Ok(query)
}

async fn query_handler(
    State(state): State<SharedState>,
    Json(payload): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, (StatusCode, Json<ErrorResponse>)> {
    let query = parse_query(payload)?;
    let answer = state.route(query).await;
    Ok(Json(answer.into()))
}

async fn research_handler(
    State(state): State<SharedState>,
    Json(payload): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, (StatusCode, Json<ErrorResponse>)> {
    let query = parse_query(payload)?;
    let answer = state.research(query).await;
    if !answer.complete {
        warn!(session = %answer.session, "Research returned incomplete");
    }
    Ok(Json(answer.into()))
}

async fn get_conversation_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ConversationResponse>, StatusCode> {
    let session_id = SessionId::from(&id);
    match state.sessions().history(&session_id).await {
        Ok(turns) => Ok(Json(ConversationResponse {
            id,
            turns: turns
                .into_iter()
                .map(|t| TurnDto {
                    query: t.query,
                    answer: t.answer,
                    responder: t.responder,
                    at: t.at.to_rfc3339(),
                })
                .collect(),
        })),
        Err(e) => {
            error!(conversation = %id, error = %e, "Conversation lookup failed");
            Err(StatusCode::NOT_FOUND)
        }
    }
}

async fn delete_conversation_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> StatusCode {
    if state.sessions().delete(&SessionId::from(&id)).await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

//! JSON HTTP server for the chat widget.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/v1/chat` | Handle one chat message |
//! | `POST` | `/v1/site/sync` | Explicitly (re)sync a site's content |
//! | `GET`  | `/health` | Health check |
//! | `GET`  | `/v1/debug/sites` | In-memory index summaries, no auth |
//! | `GET`  | `/v1/debug/logs` | Recent chat log ring buffer, no auth |
//!
//! # Error Contract
//!
//! Chat-path errors use `{ "error": { "code", "message" } }`; the explicit
//! sync endpoint answers in its own `{ "ok": false, "error", "details" }`
//! shape because the embed script inspects it.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted: the widget is embedded
//! on arbitrary customer sites.

use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::chat;
use crate::models::{ChatReply, ChatRequest, SyncRequest, SyncResponse};
use crate::ratelimit::client_key;
use crate::sitekey::resolve_site_key;
use crate::state::AppState;
use crate::sync::sync_site;
use crate::urls::normalize_base;

/// Builds the application router. Split out from [`run_server`] so tests can
/// bind it to an ephemeral port.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/v1/chat", post(handle_chat))
        .route("/v1/site/sync", post(handle_site_sync))
        .route("/health", get(handle_health))
        .route("/v1/debug/sites", get(handle_debug_sites))
        .route("/v1/debug/logs", get(handle_debug_logs))
        .layer(cors)
        .with_state(state)
}

/// Starts the HTTP server and runs until the process is terminated.
pub async fn run_server(state: Arc<AppState>) -> anyhow::Result<()> {
    let bind_addr = state.config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    println!("sitechat listening on http://{}", bind_addr);
    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn rate_limited() -> AppError {
    AppError {
        status: StatusCode::TOO_MANY_REQUESTS,
        code: "rate_limited".to_string(),
        message: "Too many requests. Please wait a moment and try again.".to_string(),
    }
}

// ============ POST /v1/chat ============

async fn handle_chat(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatReply>, AppError> {
    // Rate limit before any other per-request work
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok());
    let client = client_key(forwarded, Some(&peer.ip().to_string()));
    if !state.check_rate(&client, Utc::now()) {
        return Err(rate_limited());
    }

    Ok(Json(chat::handle_chat(&state, &req).await))
}

// ============ POST /v1/site/sync ============

/// Failure body of `POST /v1/site/sync`, inspected by the embed script.
#[derive(Serialize)]
struct SyncFailure {
    ok: bool,
    error: String,
    details: Option<String>,
}

impl SyncFailure {
    fn response(status: StatusCode, error: &str, details: Option<String>) -> Response {
        let body = SyncFailure {
            ok: false,
            error: error.to_string(),
            details,
        };
        (status, Json(body)).into_response()
    }
}

async fn handle_site_sync(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SyncRequest>,
) -> Response {
    let site_url = match req.site_url.as_deref().map(str::trim) {
        Some(u) if !u.is_empty() => u.to_string(),
        _ => {
            return SyncFailure::response(StatusCode::BAD_REQUEST, "siteUrl is required", None);
        }
    };

    let base = match normalize_base(&site_url) {
        Some(b) => b,
        None => {
            return SyncFailure::response(
                StatusCode::BAD_REQUEST,
                "siteUrl must be an absolute http(s) URL",
                Some(site_url),
            );
        }
    };

    let site_key = resolve_site_key(req.domain.as_deref(), req.site_id.as_deref());

    match sync_site(&state, &base, &site_key).await {
        Ok(outcome) => Json(SyncResponse {
            ok: true,
            site_key: outcome.site_key,
            count: outcome.count,
            updated_at: outcome.updated_at,
        })
        .into_response(),
        Err(err) => {
            SyncFailure::response(StatusCode::BAD_GATEWAY, "sync failed", Some(err.to_string()))
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    ts: chrono::DateTime<Utc>,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        ts: Utc::now(),
    })
}

// ============ GET /v1/debug/* ============

async fn handle_debug_sites(State(state): State<Arc<AppState>>) -> Response {
    Json(state.site_summaries()).into_response()
}

async fn handle_debug_logs(State(state): State<Arc<AppState>>) -> Response {
    Json(state.logs()).into_response()
}

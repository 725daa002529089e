//! HTTP API for the default group conversation and for mention resolution.
//!
//! Thin authenticated surface consumed by the companion mini-app: join or
//! leave the default group roster, fetch its conversation id, and run the
//! mention-resolution pipeline over a message. Everything under `/api/*`
//! requires the `x-api-secret` header; `/health` is open.

pub mod store;

pub use store::FileGroupStore;

use std::sync::Arc;

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
};
use mention_core::NameResolver;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

/// Membership of the default group conversation. The shipped implementation
/// is the file-backed [`FileGroupStore`]; a transport-synced implementation
/// can replace it without touching the handlers.
#[async_trait]
pub trait GroupMembership: Send + Sync {
    fn group_id(&self) -> String;
    async fn is_member(&self, inbox_id: &str) -> Result<bool>;
    async fn add_member(&self, inbox_id: &str) -> Result<()>;
    async fn remove_member(&self, inbox_id: &str) -> Result<()>;
}

#[derive(Clone)]
pub struct ApiState {
    pub group: Arc<dyn GroupMembership>,
    pub resolver: Arc<dyn NameResolver>,
    pub api_secret: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InboxRequest {
    inbox_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResolveRequest {
    message: String,
    #[serde(default)]
    member_addresses: Option<Vec<String>>,
}

type ApiError = (StatusCode, Json<Value>);

/// Constant-time comparison so the shared secret cannot be probed through
/// response timing.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

/// Check the `x-api-secret` header. Returns `None` if authorized.
fn check_auth(headers: &HeaderMap, api_secret: &str) -> Option<ApiError> {
    let supplied = headers
        .get("x-api-secret")
        .and_then(|value| value.to_str().ok());
    match supplied {
        Some(secret) if constant_time_eq(secret, api_secret) => None,
        Some(_) | None => Some((
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Unauthorized"})),
        )),
    }
}

fn parse_inbox(
    body: Result<Json<InboxRequest>, axum::extract::rejection::JsonRejection>,
) -> Result<String, ApiError> {
    let Json(request) = body.map_err(|error| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": format!("invalid request: {error}")})),
        )
    })?;
    let inbox_id = request.inbox_id.trim().to_owned();
    if inbox_id.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "inboxId must not be empty"})),
        ));
    }
    Ok(inbox_id)
}

fn internal_error(error: &anyhow::Error) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": format!("{error:#}")})),
    )
}

/// `GET /health` — unauthenticated liveness probe.
async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// `POST /api/xmtp/add-inbox` — add an inbox to the default group roster.
async fn add_inbox(
    headers: HeaderMap,
    State(state): State<ApiState>,
    body: Result<Json<InboxRequest>, axum::extract::rejection::JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    if let Some(err) = check_auth(&headers, &state.api_secret) {
        return Err(err);
    }
    let inbox_id = parse_inbox(body)?;

    let already = state
        .group
        .is_member(&inbox_id)
        .await
        .map_err(|e| internal_error(&e))?;
    if already {
        warn!(inbox_id = %inbox_id, "inbox already in default group, skipping");
        return Ok(Json(json!({
            "success": true,
            "message": "User already in default group chat",
        })));
    }

    state
        .group
        .add_member(&inbox_id)
        .await
        .map_err(|e| internal_error(&e))?;
    info!(inbox_id = %inbox_id, "added inbox to default group");
    Ok(Json(json!({
        "success": true,
        "message": "Successfully added user to default group chat",
    })))
}

/// `POST /api/xmtp/remove-inbox` — remove an inbox from the roster.
async fn remove_inbox(
    headers: HeaderMap,
    State(state): State<ApiState>,
    body: Result<Json<InboxRequest>, axum::extract::rejection::JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    if let Some(err) = check_auth(&headers, &state.api_secret) {
        return Err(err);
    }
    let inbox_id = parse_inbox(body)?;

    let member = state
        .group
        .is_member(&inbox_id)
        .await
        .map_err(|e| internal_error(&e))?;
    if !member {
        return Ok(Json(json!({
            "success": true,
            "message": "User not in default group chat",
        })));
    }

    state
        .group
        .remove_member(&inbox_id)
        .await
        .map_err(|e| internal_error(&e))?;
    info!(inbox_id = %inbox_id, "removed inbox from default group");
    Ok(Json(json!({
        "success": true,
        "message": "Successfully removed user from default group chat",
    })))
}

/// `GET /api/xmtp/get-group-id` — conversation id of the default group.
async fn get_group_id(
    headers: HeaderMap,
    State(state): State<ApiState>,
) -> Result<Json<Value>, ApiError> {
    if let Some(err) = check_auth(&headers, &state.api_secret) {
        return Err(err);
    }
    Ok(Json(json!({"groupId": state.group.group_id()})))
}

/// `POST /api/resolve` — run the mention-resolution pipeline over a message.
///
/// Always answers with one entry per extracted candidate; unresolvable
/// candidates map to `null`, never to an error.
async fn resolve(
    headers: HeaderMap,
    State(state): State<ApiState>,
    body: Result<Json<ResolveRequest>, axum::extract::rejection::JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    if let Some(err) = check_auth(&headers, &state.api_secret) {
        return Err(err);
    }
    let Json(request) = body.map_err(|error| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": format!("invalid request: {error}")})),
        )
    })?;

    let results = mention_core::resolve_mentions_in_message(
        &request.message,
        request.member_addresses.as_deref(),
        state.resolver.as_ref(),
    )
    .await;

    let mapping: serde_json::Map<String, Value> = results
        .into_iter()
        .map(|(candidate, address)| (candidate, address.map_or(Value::Null, Value::String)))
        .collect();
    Ok(Json(json!({"results": mapping})))
}

/// Build the axum router with shared state.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/resolve", post(resolve))
        .route("/api/xmtp/add-inbox", post(add_inbox))
        .route("/api/xmtp/remove-inbox", post(remove_inbox))
        .route("/api/xmtp/get-group-id", get(get_group_id))
        .layer(axum::extract::DefaultBodyLimit::max(64 * 1024))
        .with_state(state)
}

/// Bind and serve until the listener fails.
pub async fn serve(state: ApiState, addr: &str) -> Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding API listener on {addr}"))?;
    info!(addr, "API server listening");
    axum::serve(listener, app)
        .await
        .context("API server terminated")?;
    Ok(())
}

use super::{required, ApiError, ApiJson, ApiResult};
use crate::config::McpState;
use crate::middleware::session::{session_id_from_headers, RequiredSession};
use axum::{extract::State, http::HeaderMap, Json};
use notion_bridge_core::{Session, SessionId, ToolCall};
use notion_bridge_mcp::McpError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Health check endpoint, reporting live session count
pub async fn health_check(State(state): State<Arc<McpState>>) -> Json<Value> {
    Json(serde_json::json!({
        "status": "ok",
        "variant": "mcp",
        "version": env!("CARGO_PKG_VERSION"),
        "sessions": state.registry.len(),
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub success: bool,
    pub session_id: SessionId,
}

/// Negotiate a new upstream session
pub async fn create_session(
    State(state): State<Arc<McpState>>,
) -> ApiResult<Json<CreateSessionResponse>> {
    let session_id = state
        .sessions
        .create_session()
        .await
        .map_err(ApiError::SessionCreation)?;

    Ok(Json(CreateSessionResponse {
        success: true,
        session_id,
    }))
}

/// List the tools the upstream offers, verbatim
pub async fn list_tools(
    State(state): State<Arc<McpState>>,
    RequiredSession(session): RequiredSession,
) -> ApiResult<Json<Value>> {
    let tools = state.sessions.list_tools(&session).await?;
    Ok(Json(tools))
}

#[derive(Debug, Deserialize)]
pub struct ExecuteBody {
    #[serde(default)]
    pub tool: Option<String>,
    #[serde(default)]
    pub arguments: Option<Value>,
}

/// Call any upstream tool by name, returning its result verbatim
pub async fn execute(
    State(state): State<Arc<McpState>>,
    RequiredSession(session): RequiredSession,
    ApiJson(body): ApiJson<ExecuteBody>,
) -> ApiResult<Json<Value>> {
    let tool = required(body.tool, "tool")?;
    let arguments = body.arguments.unwrap_or_else(|| serde_json::json!({}));

    let result = state
        .sessions
        .call_tool(&session, ToolCall::new(tool, arguments))
        .await?;
    Ok(Json(result))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResultEnvelope {
    pub success: bool,
    pub session_id: SessionId,
    pub result: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchArgs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Value>,
}

/// Search through the upstream `search` tool, creating a session if needed
pub async fn search(
    State(state): State<Arc<McpState>>,
    headers: HeaderMap,
    ApiJson(args): ApiJson<SearchArgs>,
) -> ApiResult<Json<ToolResultEnvelope>> {
    let session = ensure_session(&state, &headers).await?;
    let arguments = serde_json::to_value(args).map_err(McpError::from)?;
    call_named_tool(&state, session, "search", arguments).await
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatePageArgs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
}

/// Create a page through the upstream `create_page` tool, creating a session if needed
pub async fn create_page(
    State(state): State<Arc<McpState>>,
    headers: HeaderMap,
    ApiJson(args): ApiJson<CreatePageArgs>,
) -> ApiResult<Json<ToolResultEnvelope>> {
    let session = ensure_session(&state, &headers).await?;
    let arguments = serde_json::to_value(args).map_err(McpError::from)?;
    call_named_tool(&state, session, "create_page", arguments).await
}

/// Get-or-create step run before a convenience action. Handshake failures
/// surface through the ordinary upstream error path.
async fn ensure_session(state: &McpState, headers: &HeaderMap) -> ApiResult<Session> {
    Ok(state
        .sessions
        .get_or_create(session_id_from_headers(headers))
        .await?)
}

async fn call_named_tool(
    state: &McpState,
    session: Session,
    tool: &str,
    arguments: Value,
) -> ApiResult<Json<ToolResultEnvelope>> {
    let result = state
        .sessions
        .call_tool(&session, ToolCall::new(tool, arguments))
        .await?;

    Ok(Json(ToolResultEnvelope {
        success: true,
        session_id: session.id,
        result,
    }))
}

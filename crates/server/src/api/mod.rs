use crate::config::{McpState, RestState, ServerConfig, Variant};
use anyhow::Result;
use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use notion_bridge_core::SessionRegistry;
use notion_bridge_mcp::McpError;
use notion_bridge_sdk::NotionError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

mod mcp;
mod rest;

/// Start the API server for the chosen variant
pub async fn serve(addr: &str, config: ServerConfig, variant: Variant) -> Result<()> {
    let app = build_app(&config, variant)?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("API server listening on {} ({} variant)", addr, variant);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Build the router for a variant; the MCP variant also starts the expiry sweeper
pub fn build_app(config: &ServerConfig, variant: Variant) -> Result<Router> {
    let app = match variant {
        Variant::Rest => create_rest_router(RestState::new(config)?),
        Variant::Mcp => {
            let state = McpState::new(config)?;
            if let Some(ttl) = state.registry.ttl() {
                spawn_session_sweeper(state.registry.clone(), ttl);
            }
            create_mcp_router(state)
        }
    };
    Ok(app)
}

/// Router proxying straight to the Notion REST API
pub fn create_rest_router(state: RestState) -> Router {
    Router::new()
        .route("/health", get(rest::health_check))
        .route("/notion/search", post(rest::search))
        .route("/notion/create-page", post(rest::create_page))
        .route("/notion/update-page", post(rest::update_page))
        .route("/notion/get-page", post(rest::get_page))
        .route("/notion/query-database", post(rest::query_database))
        .route("/notion/create-database-item", post(rest::create_database_item))
        .route("/notion/append-content", post(rest::append_content))
        .layer(trace_layer())
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Router proxying through MCP tool calls
pub fn create_mcp_router(state: McpState) -> Router {
    Router::new()
        .route("/health", get(mcp::health_check))
        .route("/session", post(mcp::create_session))
        .route("/tools", get(mcp::list_tools))
        .route("/execute", post(mcp::execute))
        .route("/notion/search", post(mcp::search))
        .route("/notion/create-page", post(mcp::create_page))
        .layer(trace_layer())
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

fn trace_layer() -> TraceLayer<
    tower_http::classify::SharedClassifier<tower_http::classify::ServerErrorsAsFailures>,
> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().include_headers(true))
        .on_response(DefaultOnResponse::new().include_headers(true))
}

/// Periodically drop expired sessions so the table stays bounded
fn spawn_session_sweeper(registry: Arc<SessionRegistry>, ttl: Duration) {
    let period = (ttl / 2).max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            registry.sweep_expired();
        }
    });
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutdown signal received");
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    /// Upstream structured error body when there is one, otherwise a message
    pub error: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: serde_json::Value::String(error.into()),
            details: None,
        }
    }

    pub fn upstream(body: Option<serde_json::Value>, message: String) -> Self {
        match body {
            Some(body) => Self {
                success: false,
                error: body,
                details: Some(message),
            },
            None => Self::new(message),
        }
    }
}

/// Error type for API handlers
#[derive(Debug)]
pub enum ApiError {
    /// Missing or unknown `x-session-id`
    Unauthorized,
    /// Required body field absent
    MissingField(&'static str),
    /// Body missing, not JSON, or not the expected JSON shape
    InvalidBody(JsonRejection),
    /// Explicit session creation failed
    SessionCreation(McpError),
    Notion(NotionError),
    Mcp(McpError),
}

pub const INVALID_SESSION_MESSAGE: &str = "Invalid or missing session";
pub const SESSION_CREATION_MESSAGE: &str = "Failed to create session";

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse::new(INVALID_SESSION_MESSAGE),
            ),
            ApiError::MissingField(field) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(format!("Missing required field: {}", field)),
            ),
            ApiError::InvalidBody(rejection) => {
                (rejection.status(), ErrorResponse::new(rejection.body_text()))
            }
            ApiError::SessionCreation(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    details: Some(err.to_string()),
                    ..ErrorResponse::new(SESSION_CREATION_MESSAGE)
                },
            ),
            ApiError::Notion(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::upstream(err.body().cloned(), err.to_string()),
            ),
            ApiError::Mcp(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::upstream(err.detail(), err.to_string()),
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody(rejection)
    }
}

impl From<NotionError> for ApiError {
    fn from(err: NotionError) -> Self {
        Self::Notion(err)
    }
}

impl From<McpError> for ApiError {
    fn from(err: McpError) -> Self {
        Self::Mcp(err)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// `Json` body extractor whose rejections use the bridge's error envelope
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Unwrap a required body field or fail with 400
pub(crate) fn required<T>(value: Option<T>, field: &'static str) -> ApiResult<T> {
    value.ok_or(ApiError::MissingField(field))
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    pub async fn send(
        router: Router,
        method: &str,
        uri: &str,
        session: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(session) = session {
            builder = builder.header("x-session-id", session);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    /// Send a raw body, optionally without a content type
    pub async fn send_raw(
        router: Router,
        uri: &str,
        session: Option<&str>,
        content_type: Option<&str>,
        body: &str,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method("POST").uri(uri);
        if let Some(session) = session {
            builder = builder.header("x-session-id", session);
        }
        if let Some(content_type) = content_type {
            builder = builder.header("content-type", content_type);
        }
        let request = builder.body(Body::from(body.to_string())).unwrap();

        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }
}

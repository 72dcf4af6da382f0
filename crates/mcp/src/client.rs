// MCP client over the streamable HTTP transport

use crate::error::{McpError, McpResult};
use crate::protocol::{
    CallToolParams, ClientInfo, InitializeParams, InitializeResult, JsonRpcRequest,
    JsonRpcResponse, METHOD_INITIALIZE, METHOD_INITIALIZED, METHOD_TOOLS_CALL, METHOD_TOOLS_LIST,
    PROTOCOL_VERSION, PROTOCOL_VERSION_HEADER, SESSION_HEADER,
};
use crate::sse;
use notion_bridge_core::ToolCall;
use reqwest::{header, Client};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};
use url::Url;

/// Default remote MCP endpoint
pub const DEFAULT_ENDPOINT: &str = "https://mcp.notion.com/mcp";

/// Default value of the `Notion-Version` header
pub const DEFAULT_NOTION_VERSION: &str = "2022-06-28";

#[derive(Debug, Clone)]
pub struct McpClientConfig {
    pub endpoint: Url,
    pub token: String,
    pub notion_version: String,
    pub protocol_version: String,
    pub client_info: ClientInfo,
    pub timeout: Option<Duration>,
}

impl McpClientConfig {
    pub fn new(endpoint: Url, token: impl Into<String>) -> Self {
        Self {
            endpoint,
            token: token.into(),
            notion_version: DEFAULT_NOTION_VERSION.to_string(),
            protocol_version: PROTOCOL_VERSION.to_string(),
            client_info: ClientInfo::default(),
            timeout: None,
        }
    }
}

/// Result of a successful `initialize` call
#[derive(Debug, Clone)]
pub struct Handshake {
    pub session_handle: Option<String>,
    pub capabilities: serde_json::Value,
}

/// Stateless JSON-RPC poster; the session handle is passed per call so one
/// client serves every session.
#[derive(Clone)]
pub struct McpClient {
    http: Client,
    config: Arc<McpClientConfig>,
    next_id: Arc<AtomicU64>,
}

impl McpClient {
    pub fn new(config: McpClientConfig) -> McpResult<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", config.token))
                .map_err(|_| McpError::Config("Invalid token format".to_string()))?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json, text/event-stream"),
        );
        headers.insert(
            header::HeaderName::from_static("notion-version"),
            header::HeaderValue::from_str(&config.notion_version)
                .map_err(|_| McpError::Config("Invalid Notion-Version format".to_string()))?,
        );
        headers.insert(
            header::HeaderName::from_static(PROTOCOL_VERSION_HEADER),
            header::HeaderValue::from_str(&config.protocol_version)
                .map_err(|_| McpError::Config("Invalid protocol version format".to_string()))?,
        );

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            config: Arc::new(config),
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }

    /// Send `initialize` and capture the session handle and capabilities
    pub async fn initialize(&self) -> McpResult<Handshake> {
        let params = InitializeParams::new(
            self.config.protocol_version.clone(),
            self.config.client_info.clone(),
        );
        let request = self.request(METHOD_INITIALIZE, Some(serde_json::to_value(params)?));

        let (result, session_handle) = self.send_request(METHOD_INITIALIZE, None, &request).await?;
        let init: InitializeResult = serde_json::from_value(result)?;

        debug!(
            session_handle = session_handle.as_deref().unwrap_or("-"),
            protocol_version = init.protocol_version.as_deref().unwrap_or("-"),
            "MCP initialize succeeded"
        );

        Ok(Handshake {
            session_handle,
            capabilities: init.capabilities,
        })
    }

    /// Send the `notifications/initialized` notification. Any 2xx counts as delivered.
    pub async fn notify_initialized(&self, session_handle: Option<&str>) -> McpResult<()> {
        let notification = JsonRpcRequest::notification(METHOD_INITIALIZED, None);

        let mut builder = self.http.post(self.config.endpoint.clone()).json(&notification);
        if let Some(handle) = session_handle {
            builder = builder.header(SESSION_HEADER, handle);
        }

        let response = builder
            .send()
            .await
            .inspect_err(|e| error!(operation = METHOD_INITIALIZED, error = %e, "MCP request failed"))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                error!(operation = METHOD_INITIALIZED, error = %e, "Failed to read MCP error body");
                String::new()
            }
        };
        let err = McpError::from_response(status.as_u16(), &body);
        error!(operation = METHOD_INITIALIZED, status = status.as_u16(), error = %err, "MCP request failed");
        Err(err)
    }

    /// `tools/list`, returning the upstream result untouched
    pub async fn list_tools(&self, session_handle: Option<&str>) -> McpResult<serde_json::Value> {
        let request = self.request(METHOD_TOOLS_LIST, None);
        let (result, _) = self
            .send_request(METHOD_TOOLS_LIST, session_handle, &request)
            .await?;
        Ok(result)
    }

    /// `tools/call`, returning the upstream result untouched
    pub async fn call_tool(
        &self,
        session_handle: Option<&str>,
        call: ToolCall,
    ) -> McpResult<serde_json::Value> {
        let operation = call.name.clone();
        let params = CallToolParams {
            name: call.name,
            arguments: call.arguments,
        };
        let request = self.request(METHOD_TOOLS_CALL, Some(serde_json::to_value(params)?));
        let (result, _) = self
            .send_request(&operation, session_handle, &request)
            .await?;
        Ok(result)
    }

    fn request(&self, method: &str, params: Option<serde_json::Value>) -> JsonRpcRequest {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        JsonRpcRequest::new(id, method, params)
    }

    /// Post a request and return its `result` plus any session header on the response
    async fn send_request(
        &self,
        operation: &str,
        session_handle: Option<&str>,
        request: &JsonRpcRequest,
    ) -> McpResult<(serde_json::Value, Option<String>)> {
        let outcome = self.exchange(session_handle, request).await;
        if let Err(e) = &outcome {
            error!(operation, method = %request.method, error = %e, "MCP request failed");
        }
        outcome
    }

    async fn exchange(
        &self,
        session_handle: Option<&str>,
        request: &JsonRpcRequest,
    ) -> McpResult<(serde_json::Value, Option<String>)> {
        let mut builder = self.http.post(self.config.endpoint.clone()).json(request);
        if let Some(handle) = session_handle {
            builder = builder.header(SESSION_HEADER, handle);
        }

        let response = builder.send().await?;
        let status = response.status();
        let session_header = response
            .headers()
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let body = response.text().await?;

        if !status.is_success() {
            return Err(McpError::from_response(status.as_u16(), &body));
        }

        debug!(method = %request.method, content_type = %content_type, "MCP response");

        let message = if content_type.starts_with("text/event-stream") {
            sse::find_response(&body)
                .ok_or_else(|| McpError::InvalidResponse("no JSON-RPC response in event stream".to_string()))?
        } else {
            serde_json::from_str::<serde_json::Value>(&body)
                .map_err(|e| McpError::InvalidResponse(format!("body is not JSON: {e}")))?
        };

        let response: JsonRpcResponse = serde_json::from_value(message)
            .map_err(|e| McpError::InvalidResponse(format!("not a JSON-RPC response: {e}")))?;

        if let Some(err) = response.error {
            return Err(McpError::Rpc(err));
        }
        let result = response
            .result
            .ok_or_else(|| McpError::InvalidResponse("missing result".to_string()))?;

        Ok((result, session_header))
    }
}

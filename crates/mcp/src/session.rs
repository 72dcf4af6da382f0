// Session lifecycle: handshake, registration and lookup

use crate::client::McpClient;
use crate::error::{McpResult, SessionError};
use notion_bridge_core::{Session, SessionId, SessionRegistry, ToolCall};
use std::sync::Arc;

/// Runs handshakes against the MCP upstream and keeps the resulting sessions.
///
/// A session is registered only after both `initialize` and the
/// `notifications/initialized` notification succeed; a failure at either step
/// leaves the registry untouched.
#[derive(Clone)]
pub struct SessionManager {
    client: McpClient,
    registry: Arc<SessionRegistry>,
}

impl SessionManager {
    pub fn new(client: McpClient, registry: Arc<SessionRegistry>) -> Self {
        Self { client, registry }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Perform the handshake and return the new local session id
    pub async fn create_session(&self) -> McpResult<SessionId> {
        Ok(self.establish().await?.id)
    }

    /// Resolve a caller-supplied session id
    pub fn resolve(&self, session_id: Option<&str>) -> Result<Session, SessionError> {
        let raw = session_id
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(SessionError::Missing)?;

        self.registry
            .get(&SessionId::from(raw))
            .ok_or_else(|| SessionError::Unknown(raw.to_string()))
    }

    /// Resolve the given id, or negotiate a fresh session if it is missing or unknown
    pub async fn get_or_create(&self, session_id: Option<&str>) -> McpResult<Session> {
        match self.resolve(session_id) {
            Ok(session) => Ok(session),
            Err(reason) => {
                tracing::debug!(%reason, "No usable session, negotiating a new one");
                self.establish().await
            }
        }
    }

    pub async fn list_tools(&self, session: &Session) -> McpResult<serde_json::Value> {
        self.client
            .list_tools(session.upstream_handle.as_deref())
            .await
    }

    pub async fn call_tool(&self, session: &Session, call: ToolCall) -> McpResult<serde_json::Value> {
        self.client
            .call_tool(session.upstream_handle.as_deref(), call)
            .await
    }

    async fn establish(&self) -> McpResult<Session> {
        let handshake = self
            .client
            .initialize()
            .await
            .inspect_err(|e| tracing::error!(step = "initialize", error = %e, "Failed to initialize session"))?;

        self.client
            .notify_initialized(handshake.session_handle.as_deref())
            .await
            .inspect_err(|e| tracing::error!(step = "initialized", error = %e, "Failed to initialize session"))?;

        let session = self
            .registry
            .register(handshake.session_handle, handshake.capabilities);

        tracing::info!(
            session_id = %session.id,
            active_sessions = self.registry.len(),
            "Created MCP session"
        );
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::McpClientConfig;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use url::Url;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn manager_for(server: &MockServer) -> SessionManager {
        let endpoint = Url::parse(&format!("{}/mcp", server.uri())).unwrap();
        let client = McpClient::new(McpClientConfig::new(endpoint, "secret_test")).unwrap();
        SessionManager::new(client, Arc::new(SessionRegistry::new()))
    }

    /// Each initialize hands out `handle-<n>`
    async fn mount_handshake(server: &MockServer) {
        let counter = Arc::new(AtomicUsize::new(0));
        Mock::given(method("POST"))
            .and(path("/mcp"))
            .and(body_partial_json(json!({"method": "initialize"})))
            .respond_with(move |_: &Request| {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                ResponseTemplate::new(200)
                    .insert_header("mcp-session-id", format!("handle-{n}").as_str())
                    .set_body_json(json!({
                        "jsonrpc": "2.0",
                        "id": 1,
                        "result": {"capabilities": {"tools": {}}}
                    }))
            })
            .mount(server)
            .await;

        Mock::given(method("POST"))
            .and(path("/mcp"))
            .and(body_partial_json(json!({"method": "notifications/initialized"})))
            .respond_with(ResponseTemplate::new(202))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_create_session_registers_after_handshake() {
        let server = MockServer::start().await;
        mount_handshake(&server).await;
        let manager = manager_for(&server);

        let id = manager.create_session().await.unwrap();
        let session = manager.registry().get(&id).unwrap();

        assert_eq!(session.upstream_handle.as_deref(), Some("handle-1"));
        assert_eq!(session.capabilities, json!({"tools": {}}));
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_two_handshakes_yield_independent_sessions() {
        let server = MockServer::start().await;
        mount_handshake(&server).await;
        let manager = manager_for(&server);

        let a = manager.create_session().await.unwrap();
        let b = manager.create_session().await.unwrap();

        assert_ne!(a, b);
        let handle_a = manager.registry().get(&a).unwrap().upstream_handle;
        let handle_b = manager.registry().get(&b).unwrap().upstream_handle;
        assert_ne!(handle_a, handle_b);
        assert_eq!(manager.registry().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_initialize_registers_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/mcp"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "down"})))
            .expect(1)
            .mount(&server)
            .await;
        let manager = manager_for(&server);

        assert!(manager.create_session().await.is_err());
        assert_eq!(manager.registry().len(), 0);
    }

    #[tokio::test]
    async fn test_failed_notification_registers_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/mcp"))
            .and(body_partial_json(json!({"method": "initialize"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("mcp-session-id", "doomed")
                    .set_body_json(json!({"jsonrpc": "2.0", "id": 1, "result": {"capabilities": {}}})),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/mcp"))
            .and(header("mcp-session-id", "doomed"))
            .respond_with(ResponseTemplate::new(400))
            .expect(1)
            .mount(&server)
            .await;
        let manager = manager_for(&server);

        assert!(manager.create_session().await.is_err());
        assert!(manager.registry().is_empty());
    }

    #[tokio::test]
    async fn test_resolve() {
        let server = MockServer::start().await;
        let manager = manager_for(&server);

        assert_eq!(manager.resolve(None), Err(SessionError::Missing));
        assert_eq!(manager.resolve(Some("  ")), Err(SessionError::Missing));
        assert_eq!(
            manager.resolve(Some("ghost")),
            Err(SessionError::Unknown("ghost".to_string()))
        );

        let id = manager.registry().create(Some("h".to_string()), json!({}));
        assert_eq!(manager.resolve(Some(id.as_str())).unwrap().id, id);
    }

    #[tokio::test]
    async fn test_get_or_create_reuses_known_session() {
        let server = MockServer::start().await;
        let manager = manager_for(&server);
        let id = manager.registry().create(Some("h".to_string()), json!({}));

        let session = manager.get_or_create(Some(id.as_str())).await.unwrap();
        assert_eq!(session.id, id);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_or_create_negotiates_for_unknown_session() {
        let server = MockServer::start().await;
        mount_handshake(&server).await;
        let manager = manager_for(&server);

        let session = manager.get_or_create(Some("stale-id")).await.unwrap();
        assert_ne!(session.id.as_str(), "stale-id");
        assert_eq!(manager.registry().len(), 1);
    }
}

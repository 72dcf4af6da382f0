//! HTTP transport layer for the Notion client.

use crate::config::ClientConfig;
use crate::error::{NotionError, NotionResult};
use reqwest::{header, Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

/// HTTP transport for making API requests.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: Arc<ClientConfig>,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given configuration.
    pub fn new(config: Arc<ClientConfig>) -> NotionResult<Self> {
        let mut headers = header::HeaderMap::new();

        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", config.token))
                .map_err(|_| NotionError::Config("Invalid token format".to_string()))?,
        );
        headers.insert(
            header::HeaderName::from_static("notion-version"),
            header::HeaderValue::from_str(&config.notion_version)
                .map_err(|_| NotionError::Config("Invalid Notion-Version format".to_string()))?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, config })
    }

    /// Build a URL under the API base. Each segment is percent-encoded on its
    /// own, so an id containing `/`, `?`, `#` or `..` stays a single segment.
    fn build_url(&self, segments: &[&str]) -> NotionResult<url::Url> {
        let mut url = self.config.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| NotionError::Config("Base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Read an error body, falling back to empty when the read itself fails.
    async fn error_body(operation: &str, response: Response) -> String {
        match response.text().await {
            Ok(body) => body,
            Err(e) => {
                error!(operation, error = %e, "Failed to read Notion error body");
                String::new()
            }
        }
    }

    /// Send a request once and turn non-success statuses into errors.
    async fn execute(&self, operation: &str, request: RequestBuilder) -> NotionResult<Response> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                error!(operation, error = %e, "Notion request failed");
                return Err(e.into());
            }
        };

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let body = Self::error_body(operation, response).await;
        let err = NotionError::from_response(status, &body);
        error!(operation, status, error = %err, "Notion request failed");
        Err(err)
    }

    /// Execute a GET request.
    pub async fn get<T: DeserializeOwned>(
        &self,
        operation: &str,
        path: &[&str],
    ) -> NotionResult<T> {
        let url = self.build_url(path)?;
        debug!(operation, url = %url, "GET request");

        let response = self.execute(operation, self.client.get(url)).await?;
        let body = response.json().await?;
        Ok(body)
    }

    /// Execute a POST request.
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        operation: &str,
        path: &[&str],
        body: &B,
    ) -> NotionResult<T> {
        let url = self.build_url(path)?;
        debug!(operation, url = %url, "POST request");

        let response = self
            .execute(operation, self.client.post(url).json(body))
            .await?;
        let body = response.json().await?;
        Ok(body)
    }

    /// Execute a PATCH request.
    pub async fn patch<T: DeserializeOwned, B: Serialize>(
        &self,
        operation: &str,
        path: &[&str],
        body: &B,
    ) -> NotionResult<T> {
        let url = self.build_url(path)?;
        debug!(operation, url = %url, "PATCH request");

        let response = self
            .execute(operation, self.client.patch(url).json(body))
            .await?;
        let body = response.json().await?;
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestResponse {
        object: String,
        id: String,
    }

    fn create_config(base_url: &str) -> Arc<ClientConfig> {
        Arc::new(ClientConfig::new(
            url::Url::parse(base_url).unwrap(),
            "secret_test",
        ))
    }

    #[tokio::test]
    async fn test_get_request_carries_notion_headers() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/pages/p1"))
            .and(header("Authorization", "Bearer secret_test"))
            .and(header("Notion-Version", "2022-06-28"))
            .and(header("Content-Type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(TestResponse {
                object: "page".to_string(),
                id: "p1".to_string(),
            }))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(create_config(&format!("{}/v1", server.uri()))).unwrap();

        let result: TestResponse = transport.get("get_page", &["pages", "p1"]).await.unwrap();
        assert_eq!(result.id, "p1");
    }

    #[tokio::test]
    async fn test_post_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/search"))
            .and(body_json(serde_json::json!({"query": "foo"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(TestResponse {
                object: "list".to_string(),
                id: "-".to_string(),
            }))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(create_config(&format!("{}/v1/", server.uri()))).unwrap();

        let result: TestResponse = transport
            .post("search", &["search"], &serde_json::json!({"query": "foo"}))
            .await
            .unwrap();
        assert_eq!(result.object, "list");
    }

    #[tokio::test]
    async fn test_patch_request() {
        let server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/v1/pages/p2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(TestResponse {
                object: "page".to_string(),
                id: "p2".to_string(),
            }))
            .mount(&server)
            .await;

        let transport = HttpTransport::new(create_config(&format!("{}/v1/", server.uri()))).unwrap();

        let result: TestResponse = transport
            .patch("update_page", &["pages", "p2"], &serde_json::json!({"properties": {}}))
            .await
            .unwrap();
        assert_eq!(result.id, "p2");
    }

    #[tokio::test]
    async fn test_error_keeps_structured_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/pages/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "object": "error",
                "status": 404,
                "code": "object_not_found",
                "message": "Could not find page"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(create_config(&format!("{}/v1/", server.uri()))).unwrap();

        let result: NotionResult<TestResponse> = transport.get("get_page", &["pages", "missing"]).await;
        match result {
            Err(NotionError::Api { status, message, body }) => {
                assert_eq!(status, 404);
                assert_eq!(message, "Could not find page");
                assert_eq!(body.unwrap()["code"], "object_not_found");
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_is_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/search"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(create_config(&format!("{}/v1/", server.uri()))).unwrap();

        let result: NotionResult<TestResponse> = transport
            .post("search", &["search"], &serde_json::json!({}))
            .await;
        assert!(matches!(result, Err(NotionError::Api { status: 503, body: None, .. })));
    }

    #[test]
    fn test_build_url() {
        let transport = HttpTransport::new(create_config("https://api.notion.com/v1")).unwrap();

        let url = transport.build_url(&["databases", "db1", "query"]).unwrap();
        assert_eq!(url.as_str(), "https://api.notion.com/v1/databases/db1/query");
    }

    #[test]
    fn test_build_url_keeps_ids_in_one_segment() {
        let transport = HttpTransport::new(create_config("https://api.notion.com/v1/")).unwrap();

        let cases = [
            ("../users/me", "https://api.notion.com/v1/pages/..%2Fusers%2Fme"),
            ("abc?filter=1", "https://api.notion.com/v1/pages/abc%3Ffilter=1"),
            ("abc#frag", "https://api.notion.com/v1/pages/abc%23frag"),
            ("a/b", "https://api.notion.com/v1/pages/a%2Fb"),
        ];
        for (id, expected) in cases {
            let url = transport.build_url(&["pages", id]).unwrap();
            assert_eq!(url.as_str(), expected, "id {id:?}");
            assert!(url.query().is_none());
            assert!(url.fragment().is_none());
        }
    }

    #[test]
    fn test_invalid_token_is_config_error() {
        let config = Arc::new(ClientConfig::new(
            url::Url::parse("https://api.notion.com/v1/").unwrap(),
            "bad\ntoken",
        ));
        assert!(matches!(HttpTransport::new(config), Err(NotionError::Config(_))));
    }

    /// Answer one request with a response whose body stops short of its declared length
    async fn truncated_response_server(status_line: &str) -> std::net::SocketAddr {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!("HTTP/1.1 {status_line}\r\ncontent-length: 64\r\n\r\n{{\"mess");
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            socket.write_all(response.as_bytes()).await.unwrap();
        });
        addr
    }

    #[tokio::test]
    async fn test_unreadable_error_body_still_reports_status() {
        let addr = truncated_response_server("502 Bad Gateway").await;
        let transport = HttpTransport::new(create_config(&format!("http://{addr}/v1/"))).unwrap();

        let result: NotionResult<TestResponse> = transport.get("get_page", &["pages", "p1"]).await;
        match result {
            Err(NotionError::Api { status, message, body }) => {
                assert_eq!(status, 502);
                assert_eq!(message, "request failed with status 502");
                assert!(body.is_none());
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }
}

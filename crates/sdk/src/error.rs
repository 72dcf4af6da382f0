//! Error types for the Notion client.

/// Result type for client operations.
pub type NotionResult<T> = Result<T, NotionError>;

/// Errors that can occur when calling the Notion API.
#[derive(Debug, thiserror::Error)]
pub enum NotionError {
    /// HTTP request failed before a response was received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Notion returned a non-success status.
    #[error("Notion API error (status {status}): {message}")]
    Api {
        status: u16,
        message: String,
        /// Structured error body as returned by Notion, if it was JSON.
        body: Option<serde_json::Value>,
    },

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl NotionError {
    /// Create an API error from a status code and response body.
    pub fn from_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<serde_json::Value>(body) {
            Ok(value) => {
                let message = value
                    .get("message")
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
                    .unwrap_or_else(|| body.to_string());
                Self::Api {
                    status,
                    message,
                    body: Some(value),
                }
            }
            Err(_) => Self::Api {
                status,
                message: if body.is_empty() {
                    format!("request failed with status {status}")
                } else {
                    body.to_string()
                },
                body: None,
            },
        }
    }

    /// HTTP status reported by Notion, when there was a response at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Structured error body returned by Notion, if any
    pub fn body(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Api { body, .. } => body.as_ref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_response_keeps_structured_body() {
        let raw = r#"{"object":"error","status":400,"code":"validation_error","message":"bad parent"}"#;
        let err = NotionError::from_response(400, raw);

        assert_eq!(err.status(), Some(400));
        assert_eq!(err.body().unwrap()["code"], "validation_error");
        assert_eq!(err.to_string(), "Notion API error (status 400): bad parent");
    }

    #[test]
    fn test_from_response_plain_text() {
        let err = NotionError::from_response(502, "Bad Gateway");
        assert!(err.body().is_none());
        assert_eq!(err.to_string(), "Notion API error (status 502): Bad Gateway");
    }

    #[test]
    fn test_from_response_empty_body() {
        let err = NotionError::from_response(503, "");
        assert_eq!(
            err.to_string(),
            "Notion API error (status 503): request failed with status 503"
        );
    }
}

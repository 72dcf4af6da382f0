// Error types for the MCP client and session manager

use crate::protocol::JsonRpcError;

pub type McpResult<T> = Result<T, McpError>;

#[derive(Debug, thiserror::Error)]
pub enum McpError {
    /// Transport failure before any response arrived
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("MCP upstream error (status {status}): {message}")]
    Upstream {
        status: u16,
        message: String,
        body: Option<serde_json::Value>,
    },

    /// Upstream answered with a JSON-RPC error object
    #[error("MCP call failed: {0}")]
    Rpc(JsonRpcError),

    /// Response could not be interpreted as JSON-RPC
    #[error("Invalid MCP response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl McpError {
    /// Build an upstream error from a status code and raw response body
    pub fn from_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<serde_json::Value>(body) {
            Ok(value) => {
                let message = value
                    .pointer("/error/message")
                    .or_else(|| value.get("message"))
                    .or_else(|| value.get("error"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
                    .unwrap_or_else(|| body.to_string());
                Self::Upstream {
                    status,
                    message,
                    body: Some(value),
                }
            }
            Err(_) => Self::Upstream {
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

    /// Structured error detail from the upstream, when it sent one
    pub fn detail(&self) -> Option<serde_json::Value> {
        match self {
            Self::Upstream { body, .. } => body.clone(),
            Self::Rpc(err) => serde_json::to_value(err).ok(),
            _ => None,
        }
    }
}

/// Why a caller-supplied session id could not be used
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("missing session id")]
    Missing,

    #[error("unknown session id: {0}")]
    Unknown(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_response_jsonrpc_error_body() {
        let body = r#"{"jsonrpc":"2.0","id":null,"error":{"code":-32001,"message":"Session not found"}}"#;
        let err = McpError::from_response(404, body);

        assert_eq!(err.to_string(), "MCP upstream error (status 404): Session not found");
        assert_eq!(err.detail().unwrap()["error"]["code"], -32001);
    }

    #[test]
    fn test_from_response_plain_error_field() {
        let err = McpError::from_response(401, r#"{"error":"invalid_token"}"#);
        assert_eq!(err.to_string(), "MCP upstream error (status 401): invalid_token");
    }

    #[test]
    fn test_from_response_text() {
        let err = McpError::from_response(500, "boom");
        assert!(err.detail().is_none());
    }

    #[test]
    fn test_rpc_detail_is_error_object() {
        let err = McpError::Rpc(JsonRpcError {
            code: -32602,
            message: "Unknown tool".to_string(),
            data: None,
        });
        assert_eq!(err.detail().unwrap(), json!({"code": -32602, "message": "Unknown tool"}));
    }
}

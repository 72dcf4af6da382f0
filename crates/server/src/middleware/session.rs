use crate::api::ApiError;
use crate::config::McpState;
use axum::{extract::FromRequestParts, http::request::Parts, http::HeaderMap};
use notion_bridge_core::Session;
use std::sync::Arc;

/// Header carrying the bridge-issued session id
pub const SESSION_ID_HEADER: &str = "x-session-id";

/// Extract the caller's session id from request headers
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers.get(SESSION_ID_HEADER)?.to_str().ok()
}

/// A session that must already exist; rejects with 401 otherwise.
///
/// Being a parts extractor, it runs before any body extractor, so a bad
/// session is rejected without looking at the body or calling upstream.
pub struct RequiredSession(pub Session);

impl FromRequestParts<Arc<McpState>> for RequiredSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<McpState>,
    ) -> Result<Self, Self::Rejection> {
        state
            .sessions
            .resolve(session_id_from_headers(&parts.headers))
            .map(RequiredSession)
            .map_err(|reason| {
                tracing::warn!(path = %parts.uri.path(), %reason, "Rejected request without a valid session");
                ApiError::Unauthorized
            })
    }
}

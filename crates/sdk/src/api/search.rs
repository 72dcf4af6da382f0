//! Search API endpoint.

use super::ListResponse;
use crate::client::NotionClient;
use crate::error::NotionResult;
use serde::{Deserialize, Serialize};

/// Search API over pages and databases shared with the integration.
pub struct SearchApi<'a> {
    client: &'a NotionClient,
}

impl<'a> SearchApi<'a> {
    pub(crate) fn new(client: &'a NotionClient) -> Self {
        Self { client }
    }

    /// Search by title.
    pub async fn query(&self, request: &SearchRequest) -> NotionResult<ListResponse> {
        self.client.http.post("search", &["search"], request).await
    }
}

/// Request body for `POST /search`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Default::default()
        }
    }
}

//! Databases API endpoints.

use super::ListResponse;
use crate::client::NotionClient;
use crate::error::NotionResult;
use serde::{Deserialize, Serialize};

/// Databases API for querying database rows.
pub struct DatabasesApi<'a> {
    client: &'a NotionClient,
}

impl<'a> DatabasesApi<'a> {
    pub(crate) fn new(client: &'a NotionClient) -> Self {
        Self { client }
    }

    /// Query a database with optional filter and sorts.
    pub async fn query(
        &self,
        database_id: &str,
        request: &QueryDatabaseRequest,
    ) -> NotionResult<ListResponse> {
        self.client
            .http
            .post(
                "query_database",
                &["databases", database_id, "query"],
                request,
            )
            .await
    }
}

/// Request body for `POST /databases/{id}/query`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryDatabaseRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sorts: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

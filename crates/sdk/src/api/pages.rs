//! Pages API endpoints.

use crate::client::NotionClient;
use crate::error::NotionResult;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Pages API for creating, reading and updating pages.
pub struct PagesApi<'a> {
    client: &'a NotionClient,
}

impl<'a> PagesApi<'a> {
    pub(crate) fn new(client: &'a NotionClient) -> Self {
        Self { client }
    }

    /// Create a page under a page or database parent.
    pub async fn create(&self, request: &CreatePageRequest) -> NotionResult<Value> {
        self.client.http.post("create_page", &["pages"], request).await
    }

    /// Retrieve a page by id.
    pub async fn retrieve(&self, page_id: &str) -> NotionResult<Value> {
        self.client
            .http
            .get("get_page", &["pages", page_id])
            .await
    }

    /// Update page properties.
    pub async fn update(&self, page_id: &str, properties: Value) -> NotionResult<Value> {
        self.client
            .http
            .patch(
                "update_page",
                &["pages", page_id],
                &UpdatePageRequest { properties },
            )
            .await
    }
}

/// Request body for `POST /pages`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePageRequest {
    pub parent: Value,
    pub properties: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Value>>,
}

/// Request body for `PATCH /pages/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePageRequest {
    pub properties: Value,
}

/// Shape a caller-supplied parent into a Notion parent object.
///
/// A bare string is taken as a page id; anything else is passed through.
pub fn page_parent(parent: Value) -> Value {
    match parent {
        Value::String(id) => json!({ "page_id": id }),
        other => other,
    }
}

/// Parent object for a page created inside a database.
pub fn database_parent(database_id: &str) -> Value {
    json!({ "database_id": database_id })
}

/// Properties object holding only a page title.
pub fn title_property(title: &str) -> Value {
    json!({
        "title": {
            "title": [
                { "text": { "content": title } }
            ]
        }
    })
}

//! Blocks API endpoints.

use crate::client::NotionClient;
use crate::error::NotionResult;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Blocks API for appending content to pages.
pub struct BlocksApi<'a> {
    client: &'a NotionClient,
}

impl<'a> BlocksApi<'a> {
    pub(crate) fn new(client: &'a NotionClient) -> Self {
        Self { client }
    }

    /// Append child blocks to a block or page.
    pub async fn append_children(&self, block_id: &str, children: Vec<Value>) -> NotionResult<Value> {
        self.client
            .http
            .patch(
                "append_block_children",
                &["blocks", block_id, "children"],
                &AppendChildrenRequest { children },
            )
            .await
    }
}

/// Request body for `PATCH /blocks/{id}/children`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppendChildrenRequest {
    pub children: Vec<Value>,
}

/// A paragraph block containing plain text.
pub fn paragraph(text: &str) -> Value {
    json!({
        "object": "block",
        "type": "paragraph",
        "paragraph": {
            "rich_text": [
                { "type": "text", "text": { "content": text } }
            ]
        }
    })
}

/// Turn caller-supplied content into a list of blocks.
///
/// Text becomes one paragraph per non-empty line, an array is already a block
/// list, and a lone object is a single block.
pub fn blocks_from_content(content: Value) -> Vec<Value> {
    match content {
        Value::Null => Vec::new(),
        Value::String(text) => text
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .map(paragraph)
            .collect(),
        Value::Array(blocks) => blocks,
        other @ Value::Object(_) => vec![other],
        other => vec![paragraph(&other.to_string())],
    }
}

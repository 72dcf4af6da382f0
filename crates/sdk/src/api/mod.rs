//! Notion API groups.

pub mod blocks;
pub mod databases;
pub mod pages;
pub mod search;

pub use blocks::*;
pub use databases::*;
pub use pages::*;
pub use search::*;

use serde::{Deserialize, Serialize};

/// Paginated list envelope shared by search and database queries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListResponse {
    #[serde(default)]
    pub results: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_more: Option<bool>,
}

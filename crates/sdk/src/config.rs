//! Configuration types for the Notion client.

use std::time::Duration;
use url::Url;

/// Default Notion REST API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1/";

/// Default value of the `Notion-Version` header.
pub const DEFAULT_NOTION_VERSION: &str = "2022-06-28";

/// Configuration for the Notion client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the Notion API. Always ends with `/` so relative paths join under it.
    pub base_url: Url,
    /// Integration token sent as a bearer credential.
    pub token: String,
    /// Value of the `Notion-Version` header.
    pub notion_version: String,
    /// Request timeout. `None` leaves the transport default in place.
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    /// Create a new configuration with the given base URL and token.
    pub fn new(base_url: Url, token: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            token: token.into(),
            notion_version: DEFAULT_NOTION_VERSION.to_string(),
            timeout: None,
        }
    }
}

/// Ensure the base URL path ends with a slash.
///
/// `Url::join` replaces the last path segment otherwise, which would turn
/// `https://api.notion.com/v1` + `search` into `https://api.notion.com/search`.
pub(crate) fn normalize_base_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

//! Main client for the Notion REST API.

use crate::api::*;
use crate::config::{normalize_base_url, ClientConfig, DEFAULT_BASE_URL, DEFAULT_NOTION_VERSION};
use crate::error::{NotionError, NotionResult};
use crate::transport::HttpTransport;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Client for the subset of the Notion API the bridge proxies.
#[derive(Clone)]
pub struct NotionClient {
    config: Arc<ClientConfig>,
    pub(crate) http: HttpTransport,
}

impl NotionClient {
    /// Create a new client builder.
    pub fn builder() -> NotionClientBuilder {
        NotionClientBuilder::new()
    }

    /// Create a client from configuration.
    pub fn from_config(config: ClientConfig) -> NotionResult<Self> {
        let config = Arc::new(config);
        let http = HttpTransport::new(config.clone())?;

        Ok(Self { config, http })
    }

    /// Configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the search API.
    pub fn search(&self) -> SearchApi<'_> {
        SearchApi::new(self)
    }

    /// Get the pages API.
    pub fn pages(&self) -> PagesApi<'_> {
        PagesApi::new(self)
    }

    /// Get the databases API.
    pub fn databases(&self) -> DatabasesApi<'_> {
        DatabasesApi::new(self)
    }

    /// Get the blocks API.
    pub fn blocks(&self) -> BlocksApi<'_> {
        BlocksApi::new(self)
    }
}

/// Builder for creating a NotionClient.
pub struct NotionClientBuilder {
    base_url: String,
    token: Option<String>,
    notion_version: String,
    timeout: Option<Duration>,
}

impl NotionClientBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            notion_version: DEFAULT_NOTION_VERSION.to_string(),
            timeout: None,
        }
    }

    /// Override the Notion API base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the integration token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the `Notion-Version` header value.
    pub fn notion_version(mut self, version: impl Into<String>) -> Self {
        self.notion_version = version.into();
        self
    }

    /// Set a request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    ///
    /// A missing token is not rejected here; Notion refuses the first call instead.
    pub fn build(self) -> NotionResult<NotionClient> {
        let base_url = Url::parse(&self.base_url)?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(NotionError::Config(format!(
                "unsupported base_url scheme: {}",
                base_url.scheme()
            )));
        }

        let config = ClientConfig {
            base_url: normalize_base_url(base_url),
            token: self.token.unwrap_or_default(),
            notion_version: self.notion_version,
            timeout: self.timeout,
        };

        NotionClient::from_config(config)
    }
}

impl Default for NotionClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

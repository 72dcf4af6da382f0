use anyhow::{Context, Result};
use notion_bridge_core::SessionRegistry;
use notion_bridge_mcp::protocol::{ClientInfo, PROTOCOL_VERSION};
use notion_bridge_mcp::{McpClient, McpClientConfig, SessionManager, DEFAULT_ENDPOINT};
use notion_bridge_sdk::{NotionClient, DEFAULT_BASE_URL, DEFAULT_NOTION_VERSION};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Which upstream the bridge talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Proxy straight to the Notion REST API
    Rest,
    /// Proxy through the remote MCP tool endpoint
    Mcp,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Rest => "rest",
            Variant::Mcp => "mcp",
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub notion: NotionConfig,

    #[serde(default)]
    pub mcp: McpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotionConfig {
    /// Integration token; an empty token is accepted and fails upstream
    #[serde(default)]
    pub token: String,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_notion_version")]
    pub version: String,

    /// Upstream request timeout. Unset keeps the HTTP client default.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpConfig {
    #[serde(default = "default_mcp_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_protocol_version")]
    pub protocol_version: String,

    #[serde(default = "default_client_name")]
    pub client_name: String,

    #[serde(default = "default_client_version")]
    pub client_version: String,

    /// Session lifetime in seconds; 0 keeps sessions for the process lifetime
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
}

fn default_api_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_notion_version() -> String {
    DEFAULT_NOTION_VERSION.to_string()
}

fn default_mcp_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_protocol_version() -> String {
    PROTOCOL_VERSION.to_string()
}

fn default_client_name() -> String {
    ClientInfo::default().name
}

fn default_client_version() -> String {
    ClientInfo::default().version
}

fn default_session_ttl_secs() -> u64 {
    3600
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_base_url: default_api_base_url(),
            version: default_notion_version(),
            timeout_secs: None,
        }
    }
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            endpoint: default_mcp_endpoint(),
            protocol_version: default_protocol_version(),
            client_name: default_client_name(),
            client_version: default_client_version(),
            session_ttl_secs: default_session_ttl_secs(),
        }
    }
}

impl ServerConfig {
    pub fn load(config_path: &Path) -> Result<Self> {
        // Load config file if it exists, otherwise use defaults
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .context("Failed to read configuration file")?;
            toml::from_str(&content).context("Failed to parse configuration file")
        } else {
            tracing::info!("Configuration file not found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.notion.timeout_secs.map(Duration::from_secs)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.mcp.session_ttl_secs)
    }
}

/// State shared by the REST variant's handlers
#[derive(Clone)]
pub struct RestState {
    pub notion: NotionClient,
}

impl RestState {
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let mut builder = NotionClient::builder()
            .base_url(&config.notion.api_base_url)
            .token(&config.notion.token)
            .notion_version(&config.notion.version);
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        let notion = builder.build().context("Failed to create Notion client")?;
        Ok(Self { notion })
    }
}

/// State shared by the MCP variant's handlers
#[derive(Clone)]
pub struct McpState {
    pub registry: Arc<SessionRegistry>,
    pub sessions: SessionManager,
}

impl McpState {
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let endpoint = url::Url::parse(&config.mcp.endpoint).context("Invalid MCP endpoint URL")?;

        let mut client_config = McpClientConfig::new(endpoint, config.notion.token.clone());
        client_config.notion_version = config.notion.version.clone();
        client_config.protocol_version = config.mcp.protocol_version.clone();
        client_config.client_info = ClientInfo {
            name: config.mcp.client_name.clone(),
            version: config.mcp.client_version.clone(),
        };
        client_config.timeout = config.timeout();

        let client = McpClient::new(client_config).context("Failed to create MCP client")?;
        let registry = Arc::new(SessionRegistry::with_ttl(config.session_ttl()));
        let sessions = SessionManager::new(client, registry.clone());

        Ok(Self { registry, sessions })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = ServerConfig::load(Path::new("/nonexistent/notion-bridge.toml")).unwrap();

        assert_eq!(config.notion.api_base_url, "https://api.notion.com/v1/");
        assert_eq!(config.notion.version, "2022-06-28");
        assert!(config.notion.token.is_empty());
        assert_eq!(config.mcp.endpoint, "https://mcp.notion.com/mcp");
        assert_eq!(config.mcp.protocol_version, "2025-06-18");
        assert_eq!(config.session_ttl(), Duration::from_secs(3600));
        assert!(config.timeout().is_none());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[notion]
token = "secret_file"
timeout_secs = 15

[mcp]
session_ttl_secs = 0
client_name = "my-bridge"
"#
        )
        .unwrap();

        let config = ServerConfig::load(file.path()).unwrap();
        assert_eq!(config.notion.token, "secret_file");
        assert_eq!(config.timeout(), Some(Duration::from_secs(15)));
        assert_eq!(config.notion.version, "2022-06-28");
        assert_eq!(config.mcp.client_name, "my-bridge");
        assert_eq!(config.session_ttl(), Duration::ZERO);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[notion\ntoken = ").unwrap();
        assert!(ServerConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_mcp_state_honours_zero_ttl() {
        let mut config = ServerConfig::default();
        config.mcp.session_ttl_secs = 0;

        let state = McpState::new(&config).unwrap();
        assert!(state.registry.ttl().is_none());
    }

    #[test]
    fn test_mcp_state_rejects_bad_endpoint() {
        let mut config = ServerConfig::default();
        config.mcp.endpoint = "not a url".to_string();
        assert!(McpState::new(&config).is_err());
    }
}

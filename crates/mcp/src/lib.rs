// MCP (Model Context Protocol) client side of the bridge
// Negotiates sessions with the remote tool endpoint and forwards tool calls

pub mod client;
pub mod error;
pub mod protocol;
pub mod session;
pub mod sse;

pub use client::{Handshake, McpClient, McpClientConfig, DEFAULT_ENDPOINT};
pub use error::{McpError, McpResult, SessionError};
pub use session::SessionManager;

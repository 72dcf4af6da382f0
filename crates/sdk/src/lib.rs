//! # Notion Bridge SDK
//!
//! Minimal async client for the Notion REST API, covering the calls the
//! bridge proxies: search, pages, database queries and block appends.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use notion_bridge_sdk::{NotionClient, NotionResult, SearchRequest};
//!
//! #[tokio::main]
//! async fn main() -> NotionResult<()> {
//!     let client = NotionClient::builder()
//!         .token("secret_your_integration_token")
//!         .build()?;
//!
//!     let found = client.search().query(&SearchRequest::new("roadmap")).await?;
//!     println!("Found {} results", found.results.len());
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod transport;

pub use api::*;
pub use client::{NotionClient, NotionClientBuilder};
pub use config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_NOTION_VERSION};
pub use error::{NotionError, NotionResult};

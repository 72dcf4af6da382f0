//! Transport layer for the Notion client.

pub mod http;

pub use http::HttpTransport;

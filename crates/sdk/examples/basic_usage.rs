//! Basic SDK usage example.
//!
//! Searches the workspace and prints the first page found, then reads it back.
//!
//! Run with: NOTION_TOKEN=secret_... cargo run --example basic_usage

use notion_bridge_sdk::{NotionClient, NotionResult, SearchRequest};
use std::time::Duration;

#[tokio::main]
async fn main() -> NotionResult<()> {
    // Initialize tracing for debug output
    tracing_subscriber::fmt::init();

    let token = std::env::var("NOTION_TOKEN").unwrap_or_default();

    let client = NotionClient::builder()
        .token(token)
        .timeout(Duration::from_secs(30))
        .build()?;

    println!("Searching for pages...");
    let found = client.search().query(&SearchRequest::new("")).await?;
    println!("Found {} results", found.results.len());

    for result in found.results.iter().take(5) {
        println!(
            "  {} {}",
            result["object"].as_str().unwrap_or("?"),
            result["id"].as_str().unwrap_or("?")
        );
    }

    if let Some(page_id) = found
        .results
        .iter()
        .find(|r| r["object"] == "page")
        .and_then(|r| r["id"].as_str())
    {
        let page = client.pages().retrieve(page_id).await?;
        println!("\nFirst page last edited: {}", page["last_edited_time"]);
    }

    Ok(())
}

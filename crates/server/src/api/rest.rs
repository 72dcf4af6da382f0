use super::{required, ApiJson, ApiResult};
use crate::config::RestState;
use axum::{extract::State, response::IntoResponse, Json};
use notion_bridge_sdk::{
    blocks_from_content, database_parent, page_parent, title_property, CreatePageRequest,
    ListResponse, QueryDatabaseRequest, SearchRequest,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "variant": "rest",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[derive(Debug, Serialize)]
pub struct ListEnvelope {
    pub success: bool,
    #[serde(flatten)]
    pub list: ListResponse,
}

impl From<ListResponse> for ListEnvelope {
    fn from(list: ListResponse) -> Self {
        Self {
            success: true,
            list,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PageEnvelope {
    pub success: bool,
    pub page: Value,
}

impl From<Value> for PageEnvelope {
    fn from(page: Value) -> Self {
        Self {
            success: true,
            page,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ResultEnvelope {
    pub success: bool,
    pub result: Value,
}

#[derive(Debug, Deserialize)]
pub struct SearchBody {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub filter: Option<Value>,
    #[serde(default)]
    pub sort: Option<Value>,
    #[serde(default)]
    pub start_cursor: Option<String>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

/// Search pages and databases by title
pub async fn search(
    State(state): State<Arc<RestState>>,
    ApiJson(body): ApiJson<SearchBody>,
) -> ApiResult<Json<ListEnvelope>> {
    let request = SearchRequest {
        query: body.query,
        filter: body.filter,
        sort: body.sort,
        start_cursor: body.start_cursor,
        page_size: body.page_size,
    };

    let list = state.notion.search().query(&request).await?;
    tracing::debug!(results = list.results.len(), "Search completed");
    Ok(Json(list.into()))
}

#[derive(Debug, Deserialize)]
pub struct CreatePageBody {
    #[serde(default)]
    pub parent: Option<Value>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<Value>,
}

/// Create a titled page, optionally with text or block content
pub async fn create_page(
    State(state): State<Arc<RestState>>,
    ApiJson(body): ApiJson<CreatePageBody>,
) -> ApiResult<Json<PageEnvelope>> {
    let parent = required(body.parent, "parent")?;
    let title = required(body.title, "title")?;
    let children = body.content.map(blocks_from_content).filter(|c| !c.is_empty());

    let request = CreatePageRequest {
        parent: page_parent(parent),
        properties: title_property(&title),
        children,
    };

    let page = state.notion.pages().create(&request).await?;
    tracing::info!(page_id = page["id"].as_str().unwrap_or("-"), "Created page");
    Ok(Json(page.into()))
}

#[derive(Debug, Deserialize)]
pub struct UpdatePageBody {
    #[serde(default)]
    pub page_id: Option<String>,
    #[serde(default)]
    pub properties: Option<Value>,
}

/// Update page properties
pub async fn update_page(
    State(state): State<Arc<RestState>>,
    ApiJson(body): ApiJson<UpdatePageBody>,
) -> ApiResult<Json<PageEnvelope>> {
    let page_id = required(body.page_id, "page_id")?;
    let properties = required(body.properties, "properties")?;

    let page = state.notion.pages().update(&page_id, properties).await?;
    Ok(Json(page.into()))
}

#[derive(Debug, Deserialize)]
pub struct GetPageBody {
    #[serde(default)]
    pub page_id: Option<String>,
}

/// Retrieve a page
pub async fn get_page(
    State(state): State<Arc<RestState>>,
    ApiJson(body): ApiJson<GetPageBody>,
) -> ApiResult<Json<PageEnvelope>> {
    let page_id = required(body.page_id, "page_id")?;

    let page = state.notion.pages().retrieve(&page_id).await?;
    Ok(Json(page.into()))
}

#[derive(Debug, Deserialize)]
pub struct QueryDatabaseBody {
    #[serde(default)]
    pub database_id: Option<String>,
    #[serde(default)]
    pub filter: Option<Value>,
    #[serde(default)]
    pub sorts: Option<Value>,
    #[serde(default)]
    pub start_cursor: Option<String>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

/// Query a database
pub async fn query_database(
    State(state): State<Arc<RestState>>,
    ApiJson(body): ApiJson<QueryDatabaseBody>,
) -> ApiResult<Json<ListEnvelope>> {
    let database_id = required(body.database_id, "database_id")?;
    let request = QueryDatabaseRequest {
        filter: body.filter,
        sorts: body.sorts,
        start_cursor: body.start_cursor,
        page_size: body.page_size,
    };

    let list = state.notion.databases().query(&database_id, &request).await?;
    Ok(Json(list.into()))
}

#[derive(Debug, Deserialize)]
pub struct CreateDatabaseItemBody {
    #[serde(default)]
    pub database_id: Option<String>,
    #[serde(default)]
    pub properties: Option<Value>,
    #[serde(default)]
    pub content: Option<Value>,
}

/// Create a row (page) inside a database
pub async fn create_database_item(
    State(state): State<Arc<RestState>>,
    ApiJson(body): ApiJson<CreateDatabaseItemBody>,
) -> ApiResult<Json<PageEnvelope>> {
    let database_id = required(body.database_id, "database_id")?;
    let properties = required(body.properties, "properties")?;
    let children = body.content.map(blocks_from_content).filter(|c| !c.is_empty());

    let request = CreatePageRequest {
        parent: database_parent(&database_id),
        properties,
        children,
    };

    let page = state.notion.pages().create(&request).await?;
    Ok(Json(page.into()))
}

#[derive(Debug, Deserialize)]
pub struct AppendContentBody {
    #[serde(default)]
    pub page_id: Option<String>,
    #[serde(default)]
    pub content: Option<Value>,
}

/// Append text or blocks to the end of a page
pub async fn append_content(
    State(state): State<Arc<RestState>>,
    ApiJson(body): ApiJson<AppendContentBody>,
) -> ApiResult<Json<ResultEnvelope>> {
    let page_id = required(body.page_id, "page_id")?;
    let content = required(body.content, "content")?;

    let result = state
        .notion
        .blocks()
        .append_children(&page_id, blocks_from_content(content))
        .await?;
    Ok(Json(ResultEnvelope {
        success: true,
        result,
    }))
}

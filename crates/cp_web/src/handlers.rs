use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use cp_core::Article;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ScrapeParams {
    pub limit: Option<usize>,
    pub model: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ModelParam {
    pub model: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScrapeResponse {
    pub message: String,
    pub articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    pub model: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub response: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub models: Vec<String>,
}

pub async fn list_articles(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Article>>> {
    Ok(Json(state.manager.recent_articles().await?))
}

pub async fn get_article(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> ApiResult<Json<Article>> {
    Ok(Json(state.manager.article(id).await?))
}

/// Scrape and persist; summaries arrive later over the websocket.
pub async fn scrape(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ScrapeParams>,
) -> ApiResult<Json<ScrapeResponse>> {
    let limit = params.limit.unwrap_or(state.default_limit);
    let outcome = state.manager.scrape(limit, params.model).await?;
    info!(stored = outcome.stored.len(), skipped = outcome.skipped, "Scrape request served");

    Ok(Json(ScrapeResponse {
        message: format!("Successfully scraped {} articles", outcome.stored.len()),
        articles: outcome.stored,
    }))
}

pub async fn summarize_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(params): Query<ModelParam>,
) -> ApiResult<impl IntoResponse> {
    state.manager.resummarize(id, params.model).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({
            "message": "Summary generation started",
            "article_id": id,
        })),
    ))
}

pub async fn query(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QueryRequest>,
) -> ApiResult<Json<QueryResponse>> {
    let response = state
        .manager
        .query(&request.question, request.model.as_deref())
        .await?;
    Ok(Json(QueryResponse { response }))
}

pub async fn list_models(State(state): State<Arc<AppState>>) -> ApiResult<Json<ModelsResponse>> {
    Ok(Json(ModelsResponse {
        models: state.manager.list_models().await?,
    }))
}

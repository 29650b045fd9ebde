use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::models::search::SearchResults;
use crate::services::SearchQuery;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub user_id: String,

    #[serde(default)]
    pub term: String,

    pub limit: Option<u64>,

    pub cursor: Option<u64>,

    pub since: Option<i64>,

    pub until: Option<i64>,
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Path(provider_id): Path<String>,
    Query(request): Query<SearchRequest>,
) -> Result<Json<ApiResponse<SearchResults>>, ApiError> {
    let provider = state
        .shared
        .provider(&provider_id)
        .ok_or_else(|| ApiError::not_found(format!("Unknown search provider: {provider_id}")))?
        .clone();

    let (default_limit, max_limit) = {
        let config = state.config().read().await;
        (config.search.default_limit, config.search.max_limit)
    };

    let query = SearchQuery {
        term: request.term,
        limit: request.limit.unwrap_or(default_limit).min(max_limit).max(1),
        cursor: request.cursor,
        since: request.since,
        until: request.until,
    };

    let results = provider.search(&request.user_id, &query).await?;

    Ok(Json(ApiResponse::success(results)))
}

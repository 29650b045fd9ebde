use axum::{Json, extract::State};
use serde::Serialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub struct JobDto {
    pub id: i32,
    pub absence_id: i32,
    pub user_id: String,
    pub event: String,
    pub run_at: i64,
    pub created_at: String,
}

pub async fn list_jobs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<JobDto>>>, ApiError> {
    let jobs = state
        .store()
        .list_pending_jobs()
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    let dtos = jobs
        .into_iter()
        .map(|j| JobDto {
            id: j.id,
            absence_id: j.absence_id,
            user_id: j.user_id,
            event: j.event,
            run_at: j.run_at,
            created_at: j.created_at,
        })
        .collect();

    Ok(Json(ApiResponse::success(dtos)))
}

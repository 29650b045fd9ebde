use axum::{
    Json,
    extract::{Path, State},
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::models::absence::Absence;

#[derive(Debug, Deserialize)]
pub struct UpsertAbsenceRequest {
    pub first_day: NaiveDate,

    pub last_day: NaiveDate,

    #[serde(default)]
    pub short_message: String,

    #[serde(default)]
    pub message: String,
}

pub async fn get_absence(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Absence>>, ApiError> {
    let absence = state
        .shared
        .absence_service
        .get(&user_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("No absence configured for {user_id}")))?;

    Ok(Json(ApiResponse::success(absence)))
}

pub async fn upsert_absence(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(request): Json<UpsertAbsenceRequest>,
) -> Result<Json<ApiResponse<Absence>>, ApiError> {
    let absence = state
        .shared
        .absence_service
        .create_or_update(
            &user_id,
            request.first_day,
            request.last_day,
            &request.short_message,
            &request.message,
        )
        .await?;

    Ok(Json(ApiResponse::success(absence)))
}

pub async fn clear_absence(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    let cleared = state.shared.absence_service.clear(&user_id).await?;

    if !cleared {
        return Err(ApiError::not_found(format!(
            "No absence configured for {user_id}"
        )));
    }

    Ok(Json(ApiResponse::success("Absence cleared".to_string())))
}

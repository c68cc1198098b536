//! Summary endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::db::repos::{Summary, SummaryRepo};
use crate::http::error::ApiError;
use crate::http::extractors::{ApiJson, ValidUuid};
use crate::http::server::AppState;
use crate::models::SummaryInput;

/// POST /api/v1/summary - one per simulation, a second one is 409
async fn create_summary(
    State(state): State<Arc<AppState>>,
    ApiJson(input): ApiJson<SummaryInput>,
) -> Result<(StatusCode, Json<Summary>), ApiError> {
    let new = input.validate()?;
    let summary = SummaryRepo::new(&state.pool).create(&new).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

/// GET /api/v1/summary/{simulation_id}
async fn get_summary(
    State(state): State<Arc<AppState>>,
    ValidUuid(simulation_id): ValidUuid,
) -> Result<Json<Summary>, ApiError> {
    Ok(Json(
        SummaryRepo::new(&state.pool)
            .get_for_simulation(simulation_id)
            .await?,
    ))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/summary", post(create_summary))
        .route("/api/v1/summary/{simulation_id}", get(get_summary))
}

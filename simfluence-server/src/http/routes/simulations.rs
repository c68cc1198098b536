//! Simulation endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::db::repos::{Simulation, SimulationDetail, SimulationRepo};
use crate::http::error::ApiError;
use crate::http::extractors::{ApiJson, ApiQuery, ValidUuid};
use crate::http::server::AppState;
use crate::models::{
    SimulationFilter, SimulationFilterParams, SimulationInput, SimulationPatchInput,
    SimulationStatus, ValidationError,
};

/// `{success, simulation, message}` envelope used by `/start` and `/status`
#[derive(Debug, Serialize)]
pub struct SimulationEnvelope {
    pub success: bool,
    pub simulation: Simulation,
    pub message: &'static str,
}

#[derive(Debug, Deserialize)]
struct StatusRequest {
    status: Option<String>,
}

/// POST /api/v1/simulation
async fn create_simulation(
    State(state): State<Arc<AppState>>,
    ApiJson(input): ApiJson<SimulationInput>,
) -> Result<(StatusCode, Json<Simulation>), ApiError> {
    let new = input.validate()?;
    let simulation = SimulationRepo::new(&state.pool).create(&new).await?;
    Ok((StatusCode::CREATED, Json(simulation)))
}

/// POST /api/v1/simulation/start - always starts PENDING
async fn start_simulation(
    State(state): State<Arc<AppState>>,
    ApiJson(input): ApiJson<SimulationInput>,
) -> Result<(StatusCode, Json<SimulationEnvelope>), ApiError> {
    let new = input.validate()?.pending();
    let simulation = SimulationRepo::new(&state.pool).create(&new).await?;

    tracing::info!(
        simulation_id = %simulation.id,
        platform = %simulation.platform,
        "Simulation started"
    );
    Ok((
        StatusCode::CREATED,
        Json(SimulationEnvelope {
            success: true,
            simulation,
            message: "Simulation started successfully",
        }),
    ))
}

/// GET /api/v1/simulation?userId=&platform=&status=
async fn list_simulations(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<SimulationFilterParams>,
) -> Result<Json<Vec<SimulationDetail>>, ApiError> {
    let filter = SimulationFilter::try_from(params)?;
    Ok(Json(SimulationRepo::new(&state.pool).list(filter).await?))
}

/// GET /api/v1/simulation/{id}
async fn get_simulation(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
) -> Result<Json<SimulationDetail>, ApiError> {
    Ok(Json(SimulationRepo::new(&state.pool).get_detail(id).await?))
}

/// PUT /api/v1/simulation/{id}
async fn update_simulation(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
    ApiJson(input): ApiJson<SimulationPatchInput>,
) -> Result<Json<Simulation>, ApiError> {
    let patch = input.validate()?;
    Ok(Json(SimulationRepo::new(&state.pool).update(id, &patch).await?))
}

/// PATCH /api/v1/simulation/{id}/status
async fn update_status(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
    ApiJson(req): ApiJson<StatusRequest>,
) -> Result<Json<SimulationEnvelope>, ApiError> {
    let status = match req.status.as_deref() {
        None | Some("") => return Err(ValidationError::Empty { field: "status" }.into()),
        Some(s) => SimulationStatus::parse(s)?,
    };
    let simulation = SimulationRepo::new(&state.pool)
        .set_status(id, status)
        .await?;

    tracing::debug!(simulation_id = %id, %status, "Simulation status updated");
    Ok(Json(SimulationEnvelope {
        success: true,
        simulation,
        message: "Simulation status updated successfully",
    }))
}

/// DELETE /api/v1/simulation/{id}
async fn delete_simulation(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
) -> Result<StatusCode, ApiError> {
    SimulationRepo::new(&state.pool).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Simulation routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/v1/simulation",
            post(create_simulation).get(list_simulations),
        )
        .route("/api/v1/simulation/start", post(start_simulation))
        .route(
            "/api/v1/simulation/{id}",
            get(get_simulation)
                .put(update_simulation)
                .delete(delete_simulation),
        )
        .route("/api/v1/simulation/{id}/status", patch(update_status))
}

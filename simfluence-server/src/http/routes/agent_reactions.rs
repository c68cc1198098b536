//! Agent reaction endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::db::repos::{AgentReaction, AgentReactionRepo};
use crate::http::error::ApiError;
use crate::http::extractors::{ApiJson, ValidUuid};
use crate::http::server::AppState;
use crate::models::AgentReactionInput;

/// POST /api/v1/agentReaction
async fn create_reaction(
    State(state): State<Arc<AppState>>,
    ApiJson(input): ApiJson<AgentReactionInput>,
) -> Result<(StatusCode, Json<AgentReaction>), ApiError> {
    let new = input.validate()?;
    let reaction = AgentReactionRepo::new(&state.pool).create(&new).await?;
    Ok((StatusCode::CREATED, Json(reaction)))
}

/// GET /api/v1/agentReaction/{simulation_id}
async fn list_reactions(
    State(state): State<Arc<AppState>>,
    ValidUuid(simulation_id): ValidUuid,
) -> Result<Json<Vec<AgentReaction>>, ApiError> {
    let reactions = AgentReactionRepo::new(&state.pool)
        .list_for_simulation(simulation_id)
        .await?;
    Ok(Json(reactions))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/agentReaction", post(create_reaction))
        .route("/api/v1/agentReaction/{simulation_id}", get(list_reactions))
}

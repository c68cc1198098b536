//! Likes prediction proxy

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::http::error::ApiError;
use crate::http::extractors::ApiJson;
use crate::http::server::AppState;

/// POST /api/v1/ai/likes - body is forwarded as-is
async fn predict_likes(
    State(state): State<Arc<AppState>>,
    ApiJson(simulation): ApiJson<Value>,
) -> Result<Json<Value>, ApiError> {
    let likes = state.ai.predict_likes(&simulation).await?;
    Ok(Json(json!({ "likes": likes })))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/v1/ai/likes", post(predict_likes))
}

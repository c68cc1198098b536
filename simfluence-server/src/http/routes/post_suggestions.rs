//! Post suggestion endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};

use crate::db::repos::{PostSuggestion, PostSuggestionRepo};
use crate::http::error::ApiError;
use crate::http::extractors::{ApiJson, ValidUuid};
use crate::http::server::AppState;
use crate::models::PostSuggestionInput;

/// POST /api/v1/postSuggestion
async fn create_suggestion(
    State(state): State<Arc<AppState>>,
    ApiJson(input): ApiJson<PostSuggestionInput>,
) -> Result<(StatusCode, Json<PostSuggestion>), ApiError> {
    let new = input.validate()?;
    let suggestion = PostSuggestionRepo::new(&state.pool).create(&new).await?;
    Ok((StatusCode::CREATED, Json(suggestion)))
}

/// GET /api/v1/postSuggestion/{simulation_id}
async fn list_suggestions(
    State(state): State<Arc<AppState>>,
    ValidUuid(simulation_id): ValidUuid,
) -> Result<Json<Vec<PostSuggestion>>, ApiError> {
    let suggestions = PostSuggestionRepo::new(&state.pool)
        .list_for_simulation(simulation_id)
        .await?;
    Ok(Json(suggestions))
}

/// PATCH /api/v1/postSuggestion/apply/{id}
async fn apply_suggestion(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
) -> Result<Json<PostSuggestion>, ApiError> {
    Ok(Json(PostSuggestionRepo::new(&state.pool).apply(id).await?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/postSuggestion", post(create_suggestion))
        .route(
            "/api/v1/postSuggestion/{simulation_id}",
            get(list_suggestions),
        )
        .route("/api/v1/postSuggestion/apply/{id}", patch(apply_suggestion))
}

#[cfg(test)]
mod tests {
    use crate::http::server::testing::{app, send};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn suggestion_requires_text() {
        let (status, body) = send(
            app(),
            Method::POST,
            "/api/v1/postSuggestion",
            Some(json!({"simulationId": uuid::Uuid::new_v4(), "suggestionText": ""})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "suggestionText is required");
    }

    #[tokio::test]
    async fn apply_route_is_not_shadowed_by_list() {
        let (status, body) = send(
            app(),
            Method::PATCH,
            "/api/v1/postSuggestion/apply/oops",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "id: invalid UUID format");
    }
}

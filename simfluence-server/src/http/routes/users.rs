//! User endpoints

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use simfluence_reddit::{RedditAnalytics, RedditClient};

use crate::db::repos::{LeaderboardEntry, User, UserRepo};
use crate::http::error::ApiError;
use crate::http::extractors::{ApiJson, ApiQuery, ValidUuid};
use crate::http::server::AppState;
use crate::models::{
    LeaderboardParams, LeaderboardQuery, Paginated, Pagination, PaginationParams, UserAnalytics,
    UserInput, ValidationError,
};

/// POST /api/v1/user
async fn create_user(
    State(state): State<Arc<AppState>>,
    ApiJson(input): ApiJson<UserInput>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let profile = input.validate()?;
    let email = profile.require_email()?;
    let user = UserRepo::new(&state.pool).create(&profile, email).await?;

    tracing::info!(user_id = %user.id, "User created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /api/v1/user/findOrCreate - login sync from the frontend
async fn find_or_create_user(
    State(state): State<Arc<AppState>>,
    ApiJson(input): ApiJson<UserInput>,
) -> Result<Json<User>, ApiError> {
    let profile = input.validate()?;
    if profile.email.is_none() && profile.reddit_id.is_none() {
        return Err(ValidationError::Empty { field: "email" }.into());
    }

    let user = UserRepo::new(&state.pool).find_or_create(&profile).await?;
    Ok(Json(user))
}

/// GET /api/v1/user - newest first, paginated
async fn list_users(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<PaginationParams>,
) -> Result<Json<Paginated<User>>, ApiError> {
    let page = Pagination::from(params);
    Ok(Json(UserRepo::new(&state.pool).list(page).await?))
}

/// GET /api/v1/user/{id}
async fn get_user(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
) -> Result<Json<User>, ApiError> {
    Ok(Json(UserRepo::new(&state.pool).get(id).await?))
}

/// GET /api/v1/user/reddit/{reddit_id}
async fn get_user_by_reddit_id(
    State(state): State<Arc<AppState>>,
    Path(reddit_id): Path<String>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(
        UserRepo::new(&state.pool)
            .get_by_reddit_id(&reddit_id)
            .await?,
    ))
}

/// PUT /api/v1/user/{id}/analytics
async fn update_analytics(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
    ApiJson(analytics): ApiJson<UserAnalytics>,
) -> Result<Json<User>, ApiError> {
    let analytics = analytics.validate()?;
    let user = UserRepo::new(&state.pool)
        .update_analytics(id, &analytics)
        .await?;
    Ok(Json(user))
}

/// GET /api/v1/user/analytics/leaderboard
async fn leaderboard(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<LeaderboardParams>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    let query = LeaderboardQuery::try_from(params)?;
    Ok(Json(UserRepo::new(&state.pool).leaderboard(query).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RedditSyncRequest {
    access_token: Option<String>,
    /// Overrides the stored `redditUsername`
    username: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RedditSyncResponse {
    message: &'static str,
    user: User,
    reddit_analytics: RedditAnalytics,
}

/// PUT /api/v1/user/{id}/reddit-analytics - pull fresh numbers from Reddit
async fn sync_reddit_analytics(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
    ApiJson(req): ApiJson<RedditSyncRequest>,
) -> Result<Json<RedditSyncResponse>, ApiError> {
    let token = req
        .access_token
        .filter(|t| !t.trim().is_empty())
        .ok_or(ValidationError::Empty {
            field: "accessToken",
        })?;

    let repo = UserRepo::new(&state.pool);
    let username = match req.username.filter(|u| !u.trim().is_empty()) {
        Some(username) => username,
        None => repo
            .get(id)
            .await?
            .reddit_username
            .ok_or(ValidationError::Empty { field: "username" })?,
    };

    let analytics = RedditClient::with_base_url(&state.reddit_base_url, token)
        .with_http_client(state.http.clone())
        .user_analytics(username.trim())
        .await?;
    let user = repo.apply_reddit_analytics(id, &analytics).await?;

    tracing::info!(user_id = %id, reddit_username = %analytics.reddit_username, "Reddit analytics synced");
    Ok(Json(RedditSyncResponse {
        message: "User analytics updated successfully",
        user,
        reddit_analytics: analytics,
    }))
}

/// User routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/user", post(create_user).get(list_users))
        .route("/api/v1/user/findOrCreate", post(find_or_create_user))
        .route("/api/v1/user/analytics/leaderboard", get(leaderboard))
        .route("/api/v1/user/reddit/{reddit_id}", get(get_user_by_reddit_id))
        .route("/api/v1/user/{id}", get(get_user))
        .route("/api/v1/user/{id}/analytics", put(update_analytics))
        .route("/api/v1/user/{id}/reddit-analytics", put(sync_reddit_analytics))
}

#[cfg(test)]
mod tests {
    use crate::config::IntegrationsConfig;
    use crate::db::repos::{testing, UserRepo};
    use crate::http::server::testing::{app, app_with, send};
    use crate::http::server::{build_router, AppState, ServerConfig};
    use crate::models::UserInput;
    use axum::extract::Path;
    use axum::http::{Method, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn create_requires_email() {
        let (status, body) = send(
            app(),
            Method::POST,
            "/api/v1/user",
            Some(json!({"name": "Ana"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "email is required");
    }

    #[tokio::test]
    async fn create_rejects_malformed_email() {
        let (status, body) = send(
            app(),
            Method::POST,
            "/api/v1/user",
            Some(json!({"email": "not-an-email"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
    }

    #[tokio::test]
    async fn find_or_create_needs_an_identity() {
        let (status, _) = send(
            app(),
            Method::POST,
            "/api/v1/user/findOrCreate",
            Some(json!({"name": "Ana", "followers": 10})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_json_is_400() {
        let (status, body) = send(
            app(),
            Method::POST,
            "/api/v1/user",
            Some(json!({"email": 42})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
    }

    #[tokio::test]
    async fn invalid_id_is_400() {
        let (status, body) = send(app(), Method::GET, "/api/v1/user/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "id: invalid UUID format");
    }

    #[tokio::test]
    async fn negative_analytics_rejected() {
        let id = uuid::Uuid::new_v4();
        let (status, body) = send(
            app(),
            Method::PUT,
            &format!("/api/v1/user/{}/analytics", id),
            Some(json!({"followers": -5})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "followers must not be negative");
    }

    #[tokio::test]
    async fn leaderboard_rejects_unknown_sort() {
        let (status, _) = send(
            app(),
            Method::GET,
            "/api/v1/user/analytics/leaderboard?sortBy=email",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn reddit_sync_requires_token() {
        let id = uuid::Uuid::new_v4();
        let (status, body) = send(
            app(),
            Method::PUT,
            &format!("/api/v1/user/{}/reddit-analytics", id),
            Some(json!({"username": "spez"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "accessToken is required");
    }

    #[tokio::test]
    async fn reddit_sync_rejects_path_like_username() {
        let id = uuid::Uuid::new_v4();
        let (status, body) = send(
            app(),
            Method::PUT,
            &format!("/api/v1/user/{}/reddit-analytics", id),
            Some(json!({"accessToken": "tok", "username": "../api/v1/me"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "username: not a valid Reddit username");
    }

    #[tokio::test]
    async fn reddit_outage_is_502() {
        let reddit = serve(Router::new().route(
            "/user/{name}/about",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "try later") }),
        ))
        .await;
        let app = app_with(IntegrationsConfig {
            reddit_api_base: reddit,
            ..IntegrationsConfig::default()
        });

        let id = uuid::Uuid::new_v4();
        let (status, body) = send(
            app,
            Method::PUT,
            &format!("/api/v1/user/{}/reddit-analytics", id),
            Some(json!({"accessToken": "tok", "username": "spez"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "bad_gateway");
    }

    #[tokio::test]
    async fn reddit_rejected_token_is_401() {
        let reddit = serve(Router::new().route(
            "/user/{name}/about",
            get(|| async { (StatusCode::UNAUTHORIZED, "{}") }),
        ))
        .await;
        let app = app_with(IntegrationsConfig {
            reddit_api_base: reddit,
            ..IntegrationsConfig::default()
        });

        let id = uuid::Uuid::new_v4();
        let (status, _) = send(
            app,
            Method::PUT,
            &format!("/api/v1/user/{}/reddit-analytics", id),
            Some(json!({"accessToken": "expired", "username": "spez"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    fn fake_reddit() -> Router {
        Router::new()
            .route(
                "/user/{name}/about",
                get(|Path(name): Path<String>| async move {
                    Json(json!({"data": {
                        "id": "t2_sync",
                        "name": name,
                        "total_karma": 120,
                        "link_karma": 100,
                        "comment_karma": 20,
                        "created_utc": 1_600_000_000.0
                    }}))
                }),
            )
            .route(
                "/user/{name}/submitted",
                get(|| async {
                    Json(json!({"data": {"children": [
                        {"data": {"id": "p1", "score": 8, "num_comments": 2}}
                    ]}}))
                }),
            )
            .route(
                "/user/{name}/comments",
                get(|| async { Json(json!({"data": {"children": []}})) }),
            )
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn reddit_sync_falls_back_to_stored_username() {
        let pool = testing::pool().await;
        let profile = UserInput {
            email: Some(format!("{}@example.com", uuid::Uuid::new_v4())),
            reddit_username: Some("stored_name".into()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        let user = UserRepo::new(&pool)
            .create(&profile, profile.require_email().unwrap())
            .await
            .unwrap();

        let integrations = IntegrationsConfig {
            reddit_api_base: serve(fake_reddit()).await,
            ..IntegrationsConfig::default()
        };
        let app = build_router(AppState::new(pool, integrations), &ServerConfig::default());

        let (status, body) = send(
            app,
            Method::PUT,
            &format!("/api/v1/user/{}/reddit-analytics", user.id),
            Some(json!({"accessToken": "tok"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "User analytics updated successfully");
        assert_eq!(body["redditAnalytics"]["redditUsername"], "stored_name");
        assert_eq!(body["user"]["redditId"], "t2_sync");
        assert_eq!(body["user"]["redditKarma"], 120);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn reddit_sync_without_any_username_is_400() {
        let pool = testing::pool().await;
        let user = testing::user(&pool).await;
        let app = build_router(
            AppState::new(pool, IntegrationsConfig::default()),
            &ServerConfig::default(),
        );

        let (status, body) = send(
            app,
            Method::PUT,
            &format!("/api/v1/user/{}/reddit-analytics", user.id),
            Some(json!({"accessToken": "tok"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "username is required");
    }
}

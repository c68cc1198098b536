//! Health check endpoints

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Value};

use crate::http::server::AppState;

async fn ping(state: &AppState) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(&state.pool).await.map(|_| ())
}

fn health_report(result: Result<(), sqlx::Error>, timestamp: String) -> (StatusCode, Value) {
    match result {
        Ok(()) => (
            StatusCode::OK,
            json!({
                "status": "healthy",
                "timestamp": timestamp,
                "database": "connected",
                "message": "All systems operational"
            }),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "status": "unhealthy",
                    "timestamp": timestamp,
                    "database": "disconnected",
                    "error": e.to_string()
                }),
            )
        }
    }
}

fn database_report(
    result: Result<(), sqlx::Error>,
    elapsed: Duration,
    timestamp: String,
) -> (StatusCode, Value) {
    match result {
        Ok(()) => (
            StatusCode::OK,
            json!({
                "database": "connected",
                "responseTime": format!("{}ms", elapsed.as_millis()),
                "timestamp": timestamp,
                "message": "Database connection successful"
            }),
        ),
        Err(e) => {
            tracing::warn!("Database health check failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "database": "disconnected",
                    "timestamp": timestamp,
                    "error": e.to_string(),
                    "message": "Database connection failed"
                }),
            )
        }
    }
}

/// GET /api/health
async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    let result = ping(&state).await;
    let (status, body) = health_report(result, Utc::now().to_rfc3339());
    (status, Json(body))
}

/// GET /api/health/db
async fn database(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    let started = Instant::now();
    let result = ping(&state).await;
    let (status, body) = database_report(result, started.elapsed(), Utc::now().to_rfc3339());
    (status, Json(body))
}

/// Health routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/health/db", get(database))
}

//! Axum server setup
//!
//! Server skeleton with:
//! - CORS limited to the frontend's origins by default
//! - Tracing middleware
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::routes;
use crate::config::IntegrationsConfig;
use crate::services::{AiClient, CloudinaryClient};

/// Origins the Next.js frontend runs on in development
pub const DEFAULT_CORS_ORIGINS: &[&str] = &["http://localhost:3000", "http://127.0.0.1:3000"];

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:3001)
    pub bind_addr: SocketAddr,

    /// Allow any origin. Only for local experiments.
    pub cors_permissive: bool,

    /// Allowed browser origins when not permissive
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3001)),
            cors_permissive: false,
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    /// Shared connection pool for outbound calls
    pub http: reqwest::Client,
    pub reddit_base_url: String,
    /// `None` when Cloudinary credentials are not configured
    pub cloudinary: Option<CloudinaryClient>,
    pub ai: AiClient,
}

impl AppState {
    pub fn new(pool: PgPool, integrations: IntegrationsConfig) -> Self {
        let http = reqwest::Client::new();
        Self {
            pool,
            cloudinary: integrations
                .cloudinary
                .map(|config| CloudinaryClient::new(config).with_http_client(http.clone())),
            ai: AiClient::new(integrations.ai_service_url).with_http_client(http.clone()),
            reddit_base_url: integrations.reddit_api_base,
            http,
        }
    }
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    if config.cors_permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build the full application router.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::users::router())
        .merge(routes::simulations::router())
        .merge(routes::agent_reactions::router())
        .merge(routes::summaries::router())
        .merge(routes::post_suggestions::router())
        .merge(routes::upload::router())
        .merge(routes::ai::router())
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Run the HTTP server.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool(&database_url).await?;
/// run_server(pool, ServerConfig::default(), IntegrationsConfig::from_env()).await?;
/// ```
pub async fn run_server(
    pool: PgPool,
    config: ServerConfig,
    integrations: IntegrationsConfig,
) -> Result<(), ServerError> {
    tracing::info!(
        ai_service = %integrations.ai_service_url,
        cloudinary = integrations.cloudinary.is_some(),
        "Integrations loaded"
    );
    let app = build_router(AppState::new(pool, integrations), &config);

    // Bind listener
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    // Run with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

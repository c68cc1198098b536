//! simfluence-server: REST API for the Sim-Fluence post simulator
//!
//! Users, simulations and the feedback attached to them (agent reactions,
//! summaries, post suggestions) live in PostgreSQL. Image uploads go to
//! Cloudinary, likes predictions to an external AI service and account
//! analytics come from Reddit.
//!
//! Layers:
//! - [`models`]: request payloads and validation
//! - [`db`]: pool, migrations, repositories
//! - [`services`]: outbound Cloudinary / AI clients
//! - [`http`]: axum routes, errors, server loop

pub mod config;
pub mod db;
pub mod http;
pub mod models;
pub mod services;

pub use config::IntegrationsConfig;
pub use db::{create_pool, create_pool_with_options, DbError};
pub use http::{build_router, run_server, ApiError, AppState, ServerConfig, ServerError};

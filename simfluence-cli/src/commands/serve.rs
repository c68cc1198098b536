//! HTTP server command
//!
//! Connects to Postgres, applies migrations, then serves the API until
//! Ctrl+C / SIGTERM.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;

use simfluence_server::db::{create_pool_with_options, migrations, pool::DEFAULT_MAX_CONNECTIONS};
use simfluence_server::http::server::DEFAULT_CORS_ORIGINS;
use simfluence_server::{run_server, IntegrationsConfig, ServerConfig};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to
    #[arg(long, short = 'b', env = "SIMFLUENCE_BIND", default_value = "127.0.0.1:3001")]
    pub bind: SocketAddr,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Allowed browser origins, comma-separated
    #[arg(long, env = "CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Vec<String>,

    /// Database URL
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Maximum pooled database connections
    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = DEFAULT_MAX_CONNECTIONS)]
    pub max_connections: u32,

    /// Skip schema migrations on startup
    #[arg(long)]
    pub skip_migrations: bool,
}

impl ServeArgs {
    fn server_config(&self) -> ServerConfig {
        let cors_origins = if self.cors_origins.is_empty() {
            DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect()
        } else {
            self.cors_origins.clone()
        };

        ServerConfig {
            bind_addr: self.bind,
            cors_permissive: self.cors_permissive,
            cors_origins,
        }
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let database_url = args
        .database_url
        .clone()
        .context("DATABASE_URL not set. Set via --database-url, DATABASE_URL env, or .env")?;

    tracing::info!("Starting simfluence server on {}", args.bind);

    let pool = create_pool_with_options(&database_url, args.max_connections)
        .await
        .context("Failed to create database pool")?;

    if !args.skip_migrations {
        migrations::run(&pool)
            .await
            .context("Failed to run database migrations")?;
    }

    // Run server (blocks until shutdown)
    run_server(pool, args.server_config(), IntegrationsConfig::from_env())
        .await
        .context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_origins_when_none_given() {
        let args = ServeArgs::parse_from(["serve", "--database-url", "postgres://x"]);
        let config = args.server_config();
        assert_eq!(config.bind_addr.port(), 3001);
        assert_eq!(config.cors_origins.len(), DEFAULT_CORS_ORIGINS.len());
    }

    #[test]
    fn comma_separated_origins() {
        let args = ServeArgs::parse_from([
            "serve",
            "--cors-origins",
            "https://simfluence.app,https://staging.simfluence.app",
        ]);
        assert_eq!(
            args.server_config().cors_origins,
            ["https://simfluence.app", "https://staging.simfluence.app"]
        );
    }
}

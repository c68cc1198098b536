//! Apply the database schema

use anyhow::{Context, Result};
use clap::Parser;

use simfluence_server::db::{create_pool, migrations};

#[derive(Parser, Debug)]
pub struct MigrateArgs {
    /// Database URL
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

pub async fn run_migrate(args: MigrateArgs) -> Result<()> {
    let database_url = args
        .database_url
        .context("DATABASE_URL not set. Set via --database-url, DATABASE_URL env, or .env")?;

    let pool = create_pool(&database_url)
        .await
        .context("Failed to connect to database")?;
    migrations::run(&pool)
        .await
        .context("Failed to run database migrations")?;

    println!("✓ Schema is up to date");
    Ok(())
}

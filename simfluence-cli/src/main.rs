//! simfluence CLI - Sim-Fluence backend server and tooling
//!
//! - `serve`: run the REST API (migrations run first)
//! - `migrate`: apply the schema without starting the server
//! - `reddit`: fetch a Reddit user's analytics from the terminal
//! - `completions`: shell completion scripts

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod tracing_setup;

use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "simfluence",
    author,
    version,
    about = "Sim-Fluence backend: social post simulation API",
    long_about = "Run the Sim-Fluence REST API (users, simulations, agent reactions, summaries, \
                  post suggestions, image uploads) and inspect Reddit account analytics."
)]
struct Cli {
    /// Enable debug logging (RUST_LOG still wins when set)
    #[arg(long, global = true)]
    debug: bool,

    /// Export traces over OTLP (requires the `telemetry` feature)
    #[arg(long, global = true)]
    otel: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Apply database migrations and exit
    Migrate(commands::migrate::MigrateArgs),
    /// Fetch analytics for a Reddit account
    Reddit(commands::reddit::RedditArgs),
    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; real environment variables still apply
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    tracing_setup::init(&TracingConfig {
        debug: cli.debug,
        otel: cli.otel,
    })
    .ok();

    let result = match cli.command {
        Commands::Serve(args) => commands::run_serve(args).await,
        Commands::Migrate(args) => commands::run_migrate(args).await,
        Commands::Reddit(args) => commands::run_reddit(args).await,
        Commands::Completions(args) => commands::run_completions::<Cli>(args),
    };

    tracing_setup::shutdown_otel();
    result
}

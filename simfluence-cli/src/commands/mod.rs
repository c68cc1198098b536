//! Command implementations for the simfluence CLI

pub mod completions;
pub mod migrate;
pub mod reddit;
pub mod serve;

// Re-export dispatcher functions for flat access from main.rs
pub use completions::run_completions;
pub use migrate::run_migrate;
pub use reddit::run_reddit;
pub use serve::run_serve;

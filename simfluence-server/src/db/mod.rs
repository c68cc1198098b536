//! Database layer - connection pool, schema migrations and repositories
//!
//! - One shared PgPool, handed to short-lived repositories per request
//! - List endpoints batch child lookups with `= ANY($1)` (no N+1)
//! - Rely on DB constraints (unique, foreign keys) and map violations
//!   to typed errors instead of check-then-insert

pub mod migrations;
pub mod pool;
pub mod repos;

pub use pool::{create_pool, create_pool_with_options};
pub use repos::*;

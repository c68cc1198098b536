//! Route handlers, one module per resource
//!
//! Each module exposes `router()` with full paths; the server merges them.

pub mod agent_reactions;
pub mod ai;
pub mod health;
pub mod post_suggestions;
pub mod simulations;
pub mod summaries;
pub mod upload;
pub mod users;

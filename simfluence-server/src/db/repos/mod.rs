//! Repository implementations for database access
//!
//! Each repository borrows the pool for the lifetime of one request and
//! returns plain records. Constraint violations are mapped to
//! [`DbError::NotFound`] (missing parent row) or [`DbError::Conflict`]
//! (duplicate unique key).

pub mod agent_reactions;
pub mod post_suggestions;
pub mod simulations;
pub mod summaries;
pub mod users;

pub use agent_reactions::{AgentReaction, AgentReactionRepo};
pub use post_suggestions::{PostSuggestion, PostSuggestionRepo};
pub use simulations::{Simulation, SimulationDetail, SimulationRepo};
pub use summaries::{Summary, SummaryRepo};
pub use users::{LeaderboardEntry, User, UserRepo};

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("conflict: {resource} {detail}")]
    Conflict {
        resource: &'static str,
        detail: String,
    },
}

impl DbError {
    pub(crate) fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }
}

/// Translate constraint violations on insert/update.
///
/// `parent` names the row a foreign key points at, e.g. the simulation a
/// reaction is attached to.
pub(crate) fn map_write_error(
    err: sqlx::Error,
    resource: &'static str,
    parent: Option<(&'static str, String)>,
) -> DbError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let detail = match db_err.constraint() {
                Some(constraint) => format!("violates unique constraint '{}'", constraint),
                None => "already exists".to_string(),
            };
            return DbError::Conflict { resource, detail };
        }
        if db_err.is_foreign_key_violation() {
            if let Some((parent_resource, parent_id)) = parent {
                return DbError::NotFound {
                    resource: parent_resource,
                    id: parent_id,
                };
            }
        }
    }
    DbError::Sqlx(err)
}

//! Agent reaction repository

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use super::{map_write_error, DbError};
use crate::models::NewAgentReaction;

/// A simulated persona's response to a simulation
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentReaction {
    pub id: Uuid,
    pub simulation_id: Uuid,
    pub agent_name: String,
    pub action: String,
    pub reason: Option<String>,
    pub sentiment: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub struct AgentReactionRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> AgentReactionRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a reaction. Unknown simulation is `NotFound("simulation")`.
    pub async fn create(&self, new: &NewAgentReaction) -> Result<AgentReaction, DbError> {
        sqlx::query_as(
            r#"
            INSERT INTO agent_reactions (simulation_id, agent_name, action, reason, sentiment)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(new.simulation_id)
        .bind(&new.agent_name)
        .bind(&new.action)
        .bind(new.reason.as_deref())
        .bind(new.sentiment.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            map_write_error(
                e,
                "agent reaction",
                Some(("simulation", new.simulation_id.to_string())),
            )
        })
    }

    /// Reactions for one simulation, oldest first. Empty when none exist.
    pub async fn list_for_simulation(
        &self,
        simulation_id: Uuid,
    ) -> Result<Vec<AgentReaction>, DbError> {
        let reactions = sqlx::query_as(
            "SELECT * FROM agent_reactions WHERE simulation_id = $1 ORDER BY created_at, id",
        )
        .bind(simulation_id)
        .fetch_all(self.pool)
        .await?;
        Ok(reactions)
    }
}

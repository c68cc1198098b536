//! Summary repository (at most one summary per simulation)

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use super::{map_write_error, DbError};
use crate::models::NewSummary;

/// Aggregate feedback for a simulation
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub id: Uuid,
    pub simulation_id: Uuid,
    pub summary_text: String,
    pub tone_cloud: Option<Value>,
    pub tone_breakdown: Option<Value>,
    pub section_feedback: Option<Value>,
    pub engagement_data: Option<Value>,
    pub audience_match: Option<f64>,
    pub feedback_score: Option<f64>,
    pub created_at: DateTime<Utc>,
}

pub struct SummaryRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> SummaryRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store the summary. A second summary for the same simulation is a
    /// `Conflict`; an unknown simulation is `NotFound`.
    pub async fn create(&self, new: &NewSummary) -> Result<Summary, DbError> {
        sqlx::query_as(
            r#"
            INSERT INTO summaries (
                simulation_id, summary_text, tone_cloud, tone_breakdown,
                section_feedback, engagement_data, audience_match, feedback_score
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(new.simulation_id)
        .bind(&new.summary_text)
        .bind(new.tone_cloud.as_ref())
        .bind(new.tone_breakdown.as_ref())
        .bind(new.section_feedback.as_ref())
        .bind(new.engagement_data.as_ref())
        .bind(new.audience_match)
        .bind(new.feedback_score)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            map_write_error(e, "summary", Some(("simulation", new.simulation_id.to_string())))
        })
    }

    pub async fn get_for_simulation(&self, simulation_id: Uuid) -> Result<Summary, DbError> {
        sqlx::query_as("SELECT * FROM summaries WHERE simulation_id = $1")
            .bind(simulation_id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("summary", simulation_id))
    }
}

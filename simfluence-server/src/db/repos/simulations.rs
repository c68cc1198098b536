//! Simulation repository
//!
//! - create / update / set_status / delete on the simulations table
//! - get_detail: simulation plus owner, reactions, summary and suggestions
//! - list: filtered, newest first; children loaded with one `= ANY($1)` query per table

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use super::{map_write_error, AgentReaction, DbError, PostSuggestion, Summary, User};
use crate::models::{NewSimulation, SimulationFilter, SimulationPatch, SimulationStatus};

/// Simulation record from database
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Simulation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: Option<String>,
    pub content: String,
    pub status: String,
    pub platform: String,
    pub post_url: Option<String>,
    pub impressions: i64,
    pub likes_estimate: i64,
    pub comments_estimate: i64,
    pub shares_estimate: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Simulation with everything attached to it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationDetail {
    #[serde(flatten)]
    pub simulation: Simulation,
    pub user: Option<User>,
    pub agent_reactions: Vec<AgentReaction>,
    pub summary: Option<Summary>,
    pub post_suggestions: Vec<PostSuggestion>,
}

/// Simulation repository
pub struct SimulationRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> SimulationRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a simulation. Unknown `user_id` is `NotFound("user")`.
    pub async fn create(&self, new: &NewSimulation) -> Result<Simulation, DbError> {
        sqlx::query_as(
            r#"
            INSERT INTO simulations (
                user_id, title, content, status, platform, post_url,
                impressions, likes_estimate, comments_estimate, shares_estimate
            )
            VALUES (
                $1, $2, $3, $4, $5, $6,
                COALESCE($7, 0), COALESCE($8, 0), COALESCE($9, 0), COALESCE($10, 0)
            )
            RETURNING *
            "#,
        )
        .bind(new.user_id)
        .bind(new.title.as_deref())
        .bind(&new.content)
        .bind(new.status.as_str())
        .bind(new.platform.as_str())
        .bind(new.post_url.as_ref().map(|u| u.as_str()))
        .bind(new.estimates.impressions)
        .bind(new.estimates.likes_estimate)
        .bind(new.estimates.comments_estimate)
        .bind(new.estimates.shares_estimate)
        .fetch_one(self.pool)
        .await
        .map_err(|e| map_write_error(e, "simulation", Some(("user", new.user_id.to_string()))))
    }

    /// Get a bare simulation by id
    pub async fn get(&self, id: Uuid) -> Result<Simulation, DbError> {
        sqlx::query_as("SELECT * FROM simulations WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("simulation", id))
    }

    /// Get a simulation with its owner and feedback
    pub async fn get_detail(&self, id: Uuid) -> Result<SimulationDetail, DbError> {
        let simulation = self.get(id).await?;
        let mut details = self.attach(vec![simulation]).await?;
        details
            .pop()
            .ok_or_else(|| DbError::not_found("simulation", id))
    }

    /// List simulations matching the filter, newest first
    pub async fn list(&self, filter: SimulationFilter) -> Result<Vec<SimulationDetail>, DbError> {
        let simulations: Vec<Simulation> = sqlx::query_as(
            r#"
            SELECT * FROM simulations
            WHERE ($1::uuid IS NULL OR user_id = $1)
              AND ($2::text IS NULL OR platform = $2)
              AND ($3::text IS NULL OR status = $3)
            ORDER BY created_at DESC, id
            "#,
        )
        .bind(filter.user_id)
        .bind(filter.platform.map(|p| p.as_str()))
        .bind(filter.status.map(|s| s.as_str()))
        .fetch_all(self.pool)
        .await?;

        self.attach(simulations).await
    }

    /// Partial update; `None` fields keep their stored value
    pub async fn update(&self, id: Uuid, patch: &SimulationPatch) -> Result<Simulation, DbError> {
        sqlx::query_as(
            r#"
            UPDATE simulations SET
                title = COALESCE($2, title),
                content = COALESCE($3, content),
                status = COALESCE($4, status),
                platform = COALESCE($5, platform),
                post_url = COALESCE($6, post_url),
                impressions = COALESCE($7, impressions),
                likes_estimate = COALESCE($8, likes_estimate),
                comments_estimate = COALESCE($9, comments_estimate),
                shares_estimate = COALESCE($10, shares_estimate),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.title.as_deref())
        .bind(patch.content.as_deref())
        .bind(patch.status.map(|s| s.as_str()))
        .bind(patch.platform.map(|p| p.as_str()))
        .bind(patch.post_url.as_ref().map(|u| u.as_str()))
        .bind(patch.estimates.impressions)
        .bind(patch.estimates.likes_estimate)
        .bind(patch.estimates.comments_estimate)
        .bind(patch.estimates.shares_estimate)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("simulation", id))
    }

    pub async fn set_status(
        &self,
        id: Uuid,
        status: SimulationStatus,
    ) -> Result<Simulation, DbError> {
        sqlx::query_as(
            "UPDATE simulations SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("simulation", id))
    }

    /// Delete a simulation; reactions, summary and suggestions cascade.
    pub async fn delete(&self, id: Uuid) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM simulations WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("simulation", id));
        }
        Ok(())
    }

    /// Load owners and feedback for a batch of simulations, preserving order.
    async fn attach(&self, simulations: Vec<Simulation>) -> Result<Vec<SimulationDetail>, DbError> {
        if simulations.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = simulations.iter().map(|s| s.id).collect();
        let mut user_ids: Vec<Uuid> = simulations.iter().map(|s| s.user_id).collect();
        user_ids.sort_unstable();
        user_ids.dedup();

        let users: Vec<User> = sqlx::query_as("SELECT * FROM users WHERE id = ANY($1)")
            .bind(&user_ids)
            .fetch_all(self.pool)
            .await?;
        let reactions: Vec<AgentReaction> = sqlx::query_as(
            "SELECT * FROM agent_reactions WHERE simulation_id = ANY($1) ORDER BY created_at, id",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;
        let summaries: Vec<Summary> =
            sqlx::query_as("SELECT * FROM summaries WHERE simulation_id = ANY($1)")
                .bind(&ids)
                .fetch_all(self.pool)
                .await?;
        let suggestions: Vec<PostSuggestion> = sqlx::query_as(
            "SELECT * FROM post_suggestions WHERE simulation_id = ANY($1) ORDER BY created_at, id",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let users: HashMap<Uuid, User> = users.into_iter().map(|u| (u.id, u)).collect();
        let mut summaries: HashMap<Uuid, Summary> =
            summaries.into_iter().map(|s| (s.simulation_id, s)).collect();
        let mut reactions_by_sim: HashMap<Uuid, Vec<AgentReaction>> = HashMap::new();
        for reaction in reactions {
            reactions_by_sim
                .entry(reaction.simulation_id)
                .or_default()
                .push(reaction);
        }
        let mut suggestions_by_sim: HashMap<Uuid, Vec<PostSuggestion>> = HashMap::new();
        for suggestion in suggestions {
            suggestions_by_sim
                .entry(suggestion.simulation_id)
                .or_default()
                .push(suggestion);
        }

        Ok(simulations
            .into_iter()
            .map(|simulation| SimulationDetail {
                user: users.get(&simulation.user_id).cloned(),
                agent_reactions: reactions_by_sim.remove(&simulation.id).unwrap_or_default(),
                summary: summaries.remove(&simulation.id),
                post_suggestions: suggestions_by_sim.remove(&simulation.id).unwrap_or_default(),
                simulation,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repos::testing;
    use crate::models::{Platform, SimulationInput, SimulationPatchInput};

    #[test]
    fn detail_flattens_simulation_fields() {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let detail = SimulationDetail {
            simulation: Simulation {
                id,
                user_id: Uuid::new_v4(),
                title: Some("Launch".into()),
                content: "Hello".into(),
                status: "COMPLETED".into(),
                platform: "LINKEDIN".into(),
                post_url: None,
                impressions: 100,
                likes_estimate: 7,
                comments_estimate: 1,
                shares_estimate: 0,
                created_at: now,
                updated_at: now,
            },
            user: None,
            agent_reactions: vec![AgentReaction {
                id: Uuid::new_v4(),
                simulation_id: id,
                agent_name: "Skeptic".into(),
                action: "comment".into(),
                reason: None,
                sentiment: Some("negative".into()),
                created_at: now,
            }],
            summary: None,
            post_suggestions: vec![PostSuggestion {
                id: Uuid::new_v4(),
                simulation_id: id,
                suggestion_text: "Shorter hook".into(),
                applied: false,
                created_at: now,
            }],
        };

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["id"], id.to_string());
        assert_eq!(json["likesEstimate"], 7);
        assert!(json.get("simulation").is_none());
        assert!(json["user"].is_null());
        assert!(json["summary"].is_null());
        assert_eq!(json["agentReactions"][0]["agentName"], "Skeptic");
        assert_eq!(json["postSuggestions"][0]["suggestionText"], "Shorter hook");
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn create_returns_persisted_record() {
        let pool = testing::pool().await;
        let user = testing::user(&pool).await;

        let created = testing::simulation(&pool, user.id).await;
        assert_eq!(created.user_id, user.id);
        assert_eq!(created.status, "PENDING");
        assert_eq!(created.likes_estimate, 0);

        let fetched = SimulationRepo::new(&pool).get(created.id).await.unwrap();
        assert_eq!(fetched.content, created.content);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn create_for_unknown_user() {
        let pool = testing::pool().await;
        let missing = Uuid::new_v4();
        let new = SimulationInput {
            user_id: Some(missing),
            content: Some("orphan".into()),
            platform: Some("TWITTER".into()),
            ..Default::default()
        }
        .validate()
        .unwrap();

        let err = SimulationRepo::new(&pool).create(&new).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "user", id } if id == missing.to_string()));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn update_keeps_absent_fields() {
        let pool = testing::pool().await;
        let user = testing::user(&pool).await;
        let sim = testing::simulation(&pool, user.id).await;

        let patch = SimulationPatchInput {
            title: Some("Launch".into()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        let updated = SimulationRepo::new(&pool).update(sim.id, &patch).await.unwrap();

        assert_eq!(updated.title.as_deref(), Some("Launch"));
        assert_eq!(updated.content, sim.content);
        assert_eq!(updated.platform, Platform::Reddit.as_str());
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn list_filters_and_attaches_owner() {
        let pool = testing::pool().await;
        let user = testing::user(&pool).await;
        let first = testing::simulation(&pool, user.id).await;
        let second = testing::simulation(&pool, user.id).await;
        let repo = SimulationRepo::new(&pool);
        repo.set_status(second.id, SimulationStatus::Completed)
            .await
            .unwrap();

        let all = repo
            .list(SimulationFilter {
                user_id: Some(user.id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].simulation.id, second.id, "newest first");
        assert_eq!(all[1].simulation.id, first.id);
        assert_eq!(all[0].user.as_ref().map(|u| u.id), Some(user.id));

        let completed = repo
            .list(SimulationFilter {
                user_id: Some(user.id),
                status: Some(SimulationStatus::Completed),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(completed.len(), 1);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn delete_then_lookup_is_not_found() {
        let pool = testing::pool().await;
        let user = testing::user(&pool).await;
        let sim = testing::simulation(&pool, user.id).await;
        let repo = SimulationRepo::new(&pool);

        repo.delete(sim.id).await.unwrap();
        assert!(matches!(repo.get_detail(sim.id).await, Err(DbError::NotFound { .. })));
        assert!(matches!(repo.delete(sim.id).await, Err(DbError::NotFound { .. })));
    }
}

//! Post suggestion repository

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use super::{map_write_error, DbError};
use crate::models::NewPostSuggestion;

/// A rewrite recommendation; `applied` flips once the user accepts it
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSuggestion {
    pub id: Uuid,
    pub simulation_id: Uuid,
    pub suggestion_text: String,
    pub applied: bool,
    pub created_at: DateTime<Utc>,
}

pub struct PostSuggestionRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> PostSuggestionRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: &NewPostSuggestion) -> Result<PostSuggestion, DbError> {
        sqlx::query_as(
            r#"
            INSERT INTO post_suggestions (simulation_id, suggestion_text)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(new.simulation_id)
        .bind(&new.suggestion_text)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            map_write_error(
                e,
                "post suggestion",
                Some(("simulation", new.simulation_id.to_string())),
            )
        })
    }

    /// Suggestions for one simulation, oldest first
    pub async fn list_for_simulation(
        &self,
        simulation_id: Uuid,
    ) -> Result<Vec<PostSuggestion>, DbError> {
        let suggestions = sqlx::query_as(
            "SELECT * FROM post_suggestions WHERE simulation_id = $1 ORDER BY created_at, id",
        )
        .bind(simulation_id)
        .fetch_all(self.pool)
        .await?;
        Ok(suggestions)
    }

    /// Mark a suggestion applied. Applying twice is a no-op.
    pub async fn apply(&self, id: Uuid) -> Result<PostSuggestion, DbError> {
        sqlx::query_as("UPDATE post_suggestions SET applied = TRUE WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("post suggestion", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repos::testing;

    #[tokio::test]
    #[ignore = "requires database"]
    async fn apply_marks_suggestion() {
        let pool = testing::pool().await;
        let user = testing::user(&pool).await;
        let sim = testing::simulation(&pool, user.id).await;
        let repo = PostSuggestionRepo::new(&pool);

        let created = repo
            .create(&NewPostSuggestion {
                simulation_id: sim.id,
                suggestion_text: "Lead with the number".into(),
            })
            .await
            .unwrap();
        assert!(!created.applied);

        let applied = repo.apply(created.id).await.unwrap();
        assert!(applied.applied);
        assert!(repo.apply(created.id).await.unwrap().applied);

        let listed = repo.list_for_simulation(sim.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].applied);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn apply_unknown_suggestion() {
        let pool = testing::pool().await;
        let err = PostSuggestionRepo::new(&pool)
            .apply(Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "post suggestion", .. }));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn deleting_simulation_cascades() {
        let pool = testing::pool().await;
        let user = testing::user(&pool).await;
        let sim = testing::simulation(&pool, user.id).await;
        let repo = PostSuggestionRepo::new(&pool);
        repo.create(&NewPostSuggestion {
            simulation_id: sim.id,
            suggestion_text: "Shorter title".into(),
        })
        .await
        .unwrap();

        crate::db::SimulationRepo::new(&pool).delete(sim.id).await.unwrap();
        assert!(repo.list_for_simulation(sim.id).await.unwrap().is_empty());
    }
}

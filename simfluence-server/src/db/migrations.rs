//! Schema migrations for the Sim-Fluence tables
//!
//! Every statement is idempotent (`IF NOT EXISTS`), so running on each
//! startup is safe. Requires PostgreSQL 13+ for `gen_random_uuid()`.

use sqlx::PgPool;

/// Ordered DDL statements. Appending is fine; editing shipped ones is not.
const STATEMENTS: &[(&str, &str)] = &[
    (
        "users",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name TEXT,
            email TEXT NOT NULL UNIQUE,
            profile_image_url TEXT,
            reddit_id TEXT UNIQUE,
            reddit_username TEXT,
            followers BIGINT NOT NULL DEFAULT 0 CHECK (followers >= 0),
            following BIGINT NOT NULL DEFAULT 0 CHECK (following >= 0),
            average_post_impressions BIGINT NOT NULL DEFAULT 0,
            total_posts BIGINT NOT NULL DEFAULT 0,
            engagement_rate DOUBLE PRECISION NOT NULL DEFAULT 0,
            average_likes DOUBLE PRECISION NOT NULL DEFAULT 0,
            average_comments DOUBLE PRECISION NOT NULL DEFAULT 0,
            average_shares DOUBLE PRECISION NOT NULL DEFAULT 0,
            account_age BIGINT NOT NULL DEFAULT 0,
            reddit_karma BIGINT NOT NULL DEFAULT 0,
            reddit_account_age BIGINT NOT NULL DEFAULT 0,
            verified BOOLEAN NOT NULL DEFAULT FALSE,
            last_active TIMESTAMPTZ,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "simulations",
        r#"
        CREATE TABLE IF NOT EXISTS simulations (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            title TEXT,
            content TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'PENDING'
                CHECK (status IN ('PENDING', 'IN_PROGRESS', 'COMPLETED', 'FAILED')),
            platform TEXT NOT NULL
                CHECK (platform IN ('FACEBOOK', 'INSTAGRAM', 'TWITTER', 'LINKEDIN', 'REDDIT')),
            post_url TEXT,
            impressions BIGINT NOT NULL DEFAULT 0 CHECK (impressions >= 0),
            likes_estimate BIGINT NOT NULL DEFAULT 0 CHECK (likes_estimate >= 0),
            comments_estimate BIGINT NOT NULL DEFAULT 0 CHECK (comments_estimate >= 0),
            shares_estimate BIGINT NOT NULL DEFAULT 0 CHECK (shares_estimate >= 0),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "simulations_user_idx",
        "CREATE INDEX IF NOT EXISTS simulations_user_created_idx ON simulations (user_id, created_at DESC)",
    ),
    (
        "agent_reactions",
        r#"
        CREATE TABLE IF NOT EXISTS agent_reactions (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            simulation_id UUID NOT NULL REFERENCES simulations(id) ON DELETE CASCADE,
            agent_name TEXT NOT NULL,
            action TEXT NOT NULL,
            reason TEXT,
            sentiment TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "agent_reactions_idx",
        "CREATE INDEX IF NOT EXISTS agent_reactions_simulation_idx ON agent_reactions (simulation_id, created_at)",
    ),
    (
        "summaries",
        r#"
        CREATE TABLE IF NOT EXISTS summaries (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            simulation_id UUID NOT NULL UNIQUE REFERENCES simulations(id) ON DELETE CASCADE,
            summary_text TEXT NOT NULL,
            tone_cloud JSONB,
            tone_breakdown JSONB,
            section_feedback JSONB,
            engagement_data JSONB,
            audience_match DOUBLE PRECISION,
            feedback_score DOUBLE PRECISION,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "post_suggestions",
        r#"
        CREATE TABLE IF NOT EXISTS post_suggestions (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            simulation_id UUID NOT NULL REFERENCES simulations(id) ON DELETE CASCADE,
            suggestion_text TEXT NOT NULL,
            applied BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "post_suggestions_idx",
        "CREATE INDEX IF NOT EXISTS post_suggestions_simulation_idx ON post_suggestions (simulation_id, created_at)",
    ),
];

/// Run all migrations in order.
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running database migrations...");

    for (name, sql) in STATEMENTS {
        tracing::debug!(migration = name, "Applying");
        sqlx::query(sql).execute(pool).await?;
    }

    tracing::info!(count = STATEMENTS.len(), "Migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statements_are_idempotent() {
        for (name, sql) in STATEMENTS {
            assert!(
                sql.contains("IF NOT EXISTS"),
                "migration '{}' must be idempotent",
                name
            );
        }
    }

    #[test]
    fn tables_created_before_dependents() {
        let position = |table: &str| {
            STATEMENTS
                .iter()
                .position(|(name, _)| *name == table)
                .unwrap()
        };
        assert!(position("users") < position("simulations"));
        assert!(position("simulations") < position("agent_reactions"));
        assert!(position("simulations") < position("summaries"));
        assert!(position("simulations") < position("post_suggestions"));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn migrations_run_twice() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.expect("pool creation failed");

        run(&pool).await.expect("first run failed");
        run(&pool).await.expect("second run failed");
    }
}

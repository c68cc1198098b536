//! User repository
//!
//! - create: INSERT with column defaults for absent analytics
//! - find_or_create: lookup by redditId then email, merge or insert (transaction)
//! - update_analytics: COALESCE merge, absent fields keep stored values

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::{FromRow, PgExecutor, PgPool, Postgres, Row};
use uuid::Uuid;

use simfluence_reddit::RedditAnalytics;

use super::{map_write_error, DbError};
use crate::models::{Email, LeaderboardQuery, Paginated, Pagination, UserAnalytics, UserProfile};

/// User record from database
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub profile_image_url: Option<String>,
    pub reddit_id: Option<String>,
    pub reddit_username: Option<String>,
    pub followers: i64,
    pub following: i64,
    pub average_post_impressions: i64,
    pub total_posts: i64,
    pub engagement_rate: f64,
    pub average_likes: f64,
    pub average_comments: f64,
    pub average_shares: f64,
    pub account_age: i64,
    pub reddit_karma: i64,
    pub reddit_account_age: i64,
    pub verified: bool,
    pub last_active: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public leaderboard projection (no email)
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub id: Uuid,
    pub name: Option<String>,
    pub profile_image_url: Option<String>,
    pub reddit_username: Option<String>,
    pub followers: i64,
    pub following: i64,
    pub average_post_impressions: i64,
    pub engagement_rate: f64,
    pub verified: bool,
    pub last_active: Option<DateTime<Utc>>,
}

/// Identity columns touched by a merge; `None` keeps the stored value
#[derive(Debug, Default, Clone, Copy)]
struct IdentityPatch<'a> {
    name: Option<&'a str>,
    profile_image_url: Option<&'a str>,
    reddit_id: Option<&'a str>,
    reddit_username: Option<&'a str>,
}

impl<'a> From<&'a UserProfile> for IdentityPatch<'a> {
    fn from(p: &'a UserProfile) -> Self {
        Self {
            name: p.name.as_deref(),
            profile_image_url: p.profile_image_url.as_ref().map(|u| u.as_str()),
            reddit_id: p.reddit_id.as_deref(),
            reddit_username: p.reddit_username.as_deref(),
        }
    }
}

/// Bind the twelve analytics columns in declaration order.
fn bind_analytics<'q>(
    query: QueryAs<'q, Postgres, User, PgArguments>,
    a: &UserAnalytics,
) -> QueryAs<'q, Postgres, User, PgArguments> {
    query
        .bind(a.followers)
        .bind(a.following)
        .bind(a.average_post_impressions)
        .bind(a.total_posts)
        .bind(a.engagement_rate)
        .bind(a.average_likes)
        .bind(a.average_comments)
        .bind(a.average_shares)
        .bind(a.account_age)
        .bind(a.reddit_karma)
        .bind(a.reddit_account_age)
        .bind(a.verified)
}

async fn insert<'e, E: PgExecutor<'e>>(
    executor: E,
    profile: &UserProfile,
    email: &Email,
) -> Result<User, DbError> {
    let identity = IdentityPatch::from(profile);
    let query = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (
            name, email, profile_image_url, reddit_id, reddit_username,
            followers, following, average_post_impressions, total_posts,
            engagement_rate, average_likes, average_comments, average_shares,
            account_age, reddit_karma, reddit_account_age, verified, last_active
        )
        VALUES (
            $1, $2, $3, $4, $5,
            COALESCE($6, 0), COALESCE($7, 0), COALESCE($8, 0), COALESCE($9, 0),
            COALESCE($10, 0), COALESCE($11, 0), COALESCE($12, 0), COALESCE($13, 0),
            COALESCE($14, 0), COALESCE($15, 0), COALESCE($16, 0), COALESCE($17, FALSE),
            NOW()
        )
        RETURNING *
        "#,
    )
    .bind(identity.name)
    .bind(email.as_str())
    .bind(identity.profile_image_url)
    .bind(identity.reddit_id)
    .bind(identity.reddit_username);

    bind_analytics(query, &profile.analytics)
        .fetch_one(executor)
        .await
        .map_err(|e| map_write_error(e, "user", None))
}

/// Merge identity + analytics into an existing row and refresh `last_active`.
async fn merge<'e, E: PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    identity: IdentityPatch<'_>,
    analytics: &UserAnalytics,
) -> Result<User, DbError> {
    let query = sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET
            name = COALESCE($2, name),
            profile_image_url = COALESCE($3, profile_image_url),
            reddit_id = COALESCE($4, reddit_id),
            reddit_username = COALESCE($5, reddit_username),
            followers = COALESCE($6, followers),
            following = COALESCE($7, following),
            average_post_impressions = COALESCE($8, average_post_impressions),
            total_posts = COALESCE($9, total_posts),
            engagement_rate = COALESCE($10, engagement_rate),
            average_likes = COALESCE($11, average_likes),
            average_comments = COALESCE($12, average_comments),
            average_shares = COALESCE($13, average_shares),
            account_age = COALESCE($14, account_age),
            reddit_karma = COALESCE($15, reddit_karma),
            reddit_account_age = COALESCE($16, reddit_account_age),
            verified = COALESCE($17, verified),
            last_active = NOW(),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(identity.name)
    .bind(identity.profile_image_url)
    .bind(identity.reddit_id)
    .bind(identity.reddit_username);

    bind_analytics(query, analytics)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_write_error(e, "user", None))?
        .ok_or_else(|| DbError::not_found("user", id))
}

/// User repository
pub struct UserRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new user. Duplicate email or redditId is a conflict.
    pub async fn create(&self, profile: &UserProfile, email: &Email) -> Result<User, DbError> {
        insert(self.pool, profile, email).await
    }

    /// Find by redditId, then by email; merge into the match or insert.
    ///
    /// Runs in one transaction with the matched row locked, so two logins
    /// for the same account don't interleave their merges. Without a match
    /// and without an email there is nothing to insert: `NotFound`.
    ///
    /// Two first logins racing for a new account both miss the lookup; the
    /// loser's insert hits the unique index and is retried once, which then
    /// merges into the winner's row.
    pub async fn find_or_create(&self, profile: &UserProfile) -> Result<User, DbError> {
        match self.find_or_create_once(profile).await {
            Err(DbError::Conflict { .. }) => {
                tracing::debug!("Concurrent first login, retrying lookup");
                self.find_or_create_once(profile).await
            }
            other => other,
        }
    }

    async fn find_or_create_once(&self, profile: &UserProfile) -> Result<User, DbError> {
        let mut tx = self.pool.begin().await?;

        let mut existing: Option<User> = None;
        if let Some(reddit_id) = profile.reddit_id.as_deref() {
            existing = sqlx::query_as("SELECT * FROM users WHERE reddit_id = $1 FOR UPDATE")
                .bind(reddit_id)
                .fetch_optional(&mut *tx)
                .await?;
        }
        if existing.is_none() {
            if let Some(email) = profile.email.as_ref() {
                existing = sqlx::query_as("SELECT * FROM users WHERE email = $1 FOR UPDATE")
                    .bind(email.as_str())
                    .fetch_optional(&mut *tx)
                    .await?;
            }
        }

        let user = match existing {
            Some(found) => {
                tracing::debug!(user_id = %found.id, "Merging login into existing user");
                merge(&mut *tx, found.id, IdentityPatch::from(profile), &profile.analytics).await?
            }
            None => {
                let email = profile.email.as_ref().ok_or_else(|| {
                    DbError::not_found("user", profile.reddit_id.as_deref().unwrap_or_default())
                })?;
                tracing::debug!("Creating user on first login");
                insert(&mut *tx, profile, email).await?
            }
        };

        tx.commit().await?;
        Ok(user)
    }

    /// Get a user by id.
    pub async fn get(&self, id: Uuid) -> Result<User, DbError> {
        sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("user", id))
    }

    /// Get a user by Reddit account id.
    pub async fn get_by_reddit_id(&self, reddit_id: &str) -> Result<User, DbError> {
        sqlx::query_as("SELECT * FROM users WHERE reddit_id = $1")
            .bind(reddit_id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("user", reddit_id))
    }

    /// List users, newest first.
    ///
    /// Single query with COUNT(*) OVER() for the total.
    pub async fn list(&self, page: Pagination) -> Result<Paginated<User>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT *, COUNT(*) OVER() AS total
            FROM users
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool)
        .await?;

        let total = rows.first().map(|r| r.get::<i64, _>("total")).unwrap_or(0);
        let items = rows
            .iter()
            .map(User::from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Paginated::new(items, total, page))
    }

    /// Overwrite the supplied analytics fields and refresh `last_active`.
    pub async fn update_analytics(&self, id: Uuid, analytics: &UserAnalytics) -> Result<User, DbError> {
        merge(self.pool, id, IdentityPatch::default(), analytics).await
    }

    /// Store a Reddit analytics snapshot, linking the Reddit account.
    pub async fn apply_reddit_analytics(
        &self,
        id: Uuid,
        analytics: &RedditAnalytics,
    ) -> Result<User, DbError> {
        let identity = IdentityPatch {
            reddit_id: Some(&analytics.reddit_id),
            reddit_username: Some(&analytics.reddit_username),
            ..IdentityPatch::default()
        };
        merge(self.pool, id, identity, &UserAnalytics::from(analytics)).await
    }

    /// Users with at least one follower, ordered by a whitelisted column.
    pub async fn leaderboard(&self, query: LeaderboardQuery) -> Result<Vec<LeaderboardEntry>, DbError> {
        // Column and direction come from closed enums, never from raw input.
        let sql = format!(
            r#"
            SELECT id, name, profile_image_url, reddit_username, followers, following,
                   average_post_impressions, engagement_rate, verified, last_active
            FROM users
            WHERE followers > 0
            ORDER BY {} {} NULLS LAST, id
            LIMIT $1
            "#,
            query.sort.column(),
            query.order.sql(),
        );

        let entries = sqlx::query_as(&sql)
            .bind(query.limit)
            .fetch_all(self.pool)
            .await?;
        Ok(entries)
    }
}

//! Account analytics derived from a Reddit profile and its recent posts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::{RedditPost, RedditProfile};

const SECONDS_PER_DAY: f64 = 24.0 * 60.0 * 60.0;

/// Analytics snapshot for one Reddit account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedditAnalytics {
    pub reddit_id: String,
    pub reddit_username: String,
    pub total_post_karma: i64,
    pub comment_karma: i64,
    pub reddit_karma: i64,
    /// Whole days since the account was created
    pub reddit_account_age: i64,
    pub average_upvotes: i64,
    pub average_comments: i64,
    pub verified: bool,
    /// Number of recent posts sampled, not the lifetime total
    pub total_posts: i64,
    pub engagement_rate: f64,
}

impl RedditAnalytics {
    /// Combine a profile and a sample of recent posts.
    pub fn compute(profile: &RedditProfile, posts: &[RedditPost], now: DateTime<Utc>) -> Self {
        let average_upvotes = average_upvotes(posts);
        let average_comments = average_comments(posts);

        Self {
            reddit_id: profile.id.clone(),
            reddit_username: profile.name.clone(),
            total_post_karma: profile.link_karma,
            comment_karma: profile.comment_karma,
            reddit_karma: profile.total_karma,
            reddit_account_age: account_age_days(profile.created_utc, now),
            average_upvotes,
            average_comments,
            verified: profile.verified,
            total_posts: posts.len() as i64,
            engagement_rate: engagement_rate(average_upvotes, average_comments, posts.len()),
        }
    }
}

/// Mean score of the posts, rounded half-up. Zero when there are no posts.
pub fn average_upvotes(posts: &[RedditPost]) -> i64 {
    rounded_mean(posts.iter().map(|p| p.score), posts.len())
}

/// Mean comment count of the posts, rounded half-up. Zero when there are no posts.
pub fn average_comments(posts: &[RedditPost]) -> i64 {
    rounded_mean(posts.iter().map(|p| p.num_comments), posts.len())
}

/// Whole days elapsed between `created_utc` (unix seconds) and `now`.
pub fn account_age_days(created_utc: f64, now: DateTime<Utc>) -> i64 {
    let now_secs = now.timestamp_millis() as f64 / 1000.0;
    ((now_secs - created_utc) / SECONDS_PER_DAY).floor() as i64
}

/// (average upvotes + average comments) / sampled posts; zero for an empty sample.
pub fn engagement_rate(average_upvotes: i64, average_comments: i64, post_count: usize) -> f64 {
    if post_count == 0 {
        return 0.0;
    }
    (average_upvotes + average_comments) as f64 / post_count as f64
}

fn rounded_mean(values: impl Iterator<Item = i64>, count: usize) -> i64 {
    if count == 0 {
        return 0;
    }
    let total: i64 = values.sum();
    // half-up, so -2.5 rounds to -2 and 2.5 to 3
    (total as f64 / count as f64 + 0.5).floor() as i64
}

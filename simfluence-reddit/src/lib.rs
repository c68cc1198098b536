//! simfluence-reddit - Reddit account analytics
//!
//! This crate provides:
//! - A thin client over Reddit's OAuth API (`oauth.reddit.com`)
//! - Analytics arithmetic over a user's recent posts (averages, account age)
//!
//! ## Flow
//!
//! ```text
//! username → /user/{name}/about ─┐
//!          → /user/{name}/submitted ─┼→ RedditAnalytics
//!          → /user/{name}/comments ─┘
//! ```
//!
//! There is no retry, backoff or rate-limit handling: a failed request
//! surfaces as a [`RedditError`].

pub mod analytics;
pub mod client;
pub mod error;

pub use analytics::{
    account_age_days, average_comments, average_upvotes, engagement_rate, RedditAnalytics,
};
pub use client::{RedditClient, RedditComment, RedditPost, RedditProfile, DEFAULT_BASE_URL, USER_AGENT};
pub use error::RedditError;

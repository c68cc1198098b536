//! Reddit OAuth API client
//!
//! Calls `https://oauth.reddit.com` with a user's bearer token.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::analytics::RedditAnalytics;
use crate::error::{RedditError, Result};

/// Reddit's OAuth API host
pub const DEFAULT_BASE_URL: &str = "https://oauth.reddit.com";

/// User agent sent with every request (Reddit rejects blank agents)
pub const USER_AGENT: &str = "Sim-Fluence/1.0";

/// Posts and comments sampled per user
const DEFAULT_SAMPLE: u32 = 25;

/// Reddit account names: 3-20 letters, digits, `_` or `-`
static USERNAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]{3,20}$").expect("Invalid regex pattern")
});

/// Reject names that would change the request path.
fn user_path(username: &str, resource: &str) -> Result<String> {
    if !USERNAME_RE.is_match(username) {
        return Err(RedditError::InvalidUsername(username.to_string()));
    }
    Ok(format!("/user/{}/{}", username, resource))
}

/// `/user/{name}/about` payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub total_karma: i64,
    #[serde(default)]
    pub link_karma: i64,
    #[serde(default)]
    pub comment_karma: i64,
    pub created_utc: f64,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub subreddit: Option<ProfileSubreddit>,
}

/// The user's own profile subreddit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSubreddit {
    #[serde(default)]
    pub subscribers: Option<i64>,
}

/// A submitted post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditPost {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub num_comments: i64,
    #[serde(default)]
    pub created_utc: f64,
    #[serde(default)]
    pub subreddit: String,
}

/// A comment written by the user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditComment {
    pub id: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub created_utc: f64,
    #[serde(default)]
    pub subreddit: String,
}

#[derive(Debug, Deserialize)]
struct Thing<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct Listing<T> {
    children: Vec<Thing<T>>,
}

/// Reddit API client bound to one access token
#[derive(Debug, Clone)]
pub struct RedditClient {
    client: Client,
    base_url: String,
    access_token: String,
}

impl RedditClient {
    /// Create a client against the public OAuth host.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, access_token)
    }

    /// Create a client against a custom host (proxies, tests).
    pub fn with_base_url(base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        }
    }

    /// Reuse an existing `reqwest::Client` (shared connection pool).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Fetch the account profile.
    pub async fn user_profile(&self, username: &str) -> Result<RedditProfile> {
        let endpoint = user_path(username, "about")?;
        let thing: Thing<RedditProfile> = self.get_json(&endpoint, &[]).await?;
        Ok(thing.data)
    }

    /// Fetch the newest submitted posts.
    pub async fn user_posts(&self, username: &str, limit: u32) -> Result<Vec<RedditPost>> {
        let endpoint = user_path(username, "submitted")?;
        self.get_listing(&endpoint, limit).await
    }

    /// Fetch the newest comments.
    pub async fn user_comments(&self, username: &str, limit: u32) -> Result<Vec<RedditComment>> {
        let endpoint = user_path(username, "comments")?;
        self.get_listing(&endpoint, limit).await
    }

    /// Profile plus a sample of recent activity, reduced to analytics.
    #[instrument(skip(self))]
    pub async fn user_analytics(&self, username: &str) -> Result<RedditAnalytics> {
        let profile = self.user_profile(username).await?;

        // Comments are fetched alongside posts but the metrics only use posts.
        let (posts, comments) = tokio::try_join!(
            self.user_posts(username, DEFAULT_SAMPLE),
            self.user_comments(username, DEFAULT_SAMPLE),
        )?;
        debug!(
            posts = posts.len(),
            comments = comments.len(),
            "Fetched recent Reddit activity"
        );

        Ok(RedditAnalytics::compute(&profile, &posts, chrono::Utc::now()))
    }

    async fn get_listing<T: DeserializeOwned>(&self, endpoint: &str, limit: u32) -> Result<Vec<T>> {
        let limit = limit.to_string();
        let thing: Thing<Listing<T>> = self
            .get_json(endpoint, &[("limit", limit.as_str()), ("sort", "new")])
            .await?;
        Ok(thing.data.children.into_iter().map(|c| c.data).collect())
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, endpoint);

        let response = self
            .client
            .get(&url)
            .query(query)
            .bearer_auth(&self.access_token)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(RedditError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body: truncate(body, 500),
            });
        }

        serde_json::from_str(&body).map_err(|source| RedditError::Payload {
            endpoint: endpoint.to_string(),
            source,
        })
    }
}

/// Cut an error body so it doesn't flood the logs.
fn truncate(mut body: String, max: usize) -> String {
    if body.len() <= max {
        return body;
    }
    let mut end = max;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    body.truncate(end);
    body.push_str("...");
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    fn authorized(headers: &HeaderMap) -> bool {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(|v| v == "Bearer good-token")
            .unwrap_or(false)
    }

    async fn about(Path(name): Path<String>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
        if !authorized(&headers) {
            return (StatusCode::UNAUTHORIZED, Json(json!({"message": "Unauthorized"})));
        }
        (
            StatusCode::OK,
            Json(json!({
                "kind": "t2",
                "data": {
                    "id": "t2_abc",
                    "name": name,
                    "total_karma": 1500,
                    "link_karma": 1000,
                    "comment_karma": 500,
                    "created_utc": 1_577_836_800.0,
                    "verified": true
                }
            })),
        )
    }

    async fn submitted() -> Json<Value> {
        Json(json!({
            "kind": "Listing",
            "data": {
                "children": [
                    {"kind": "t3", "data": {"id": "1", "title": "a", "score": 10, "num_comments": 3, "created_utc": 0.0, "subreddit": "rust"}},
                    {"kind": "t3", "data": {"id": "2", "title": "b", "score": 30, "num_comments": 5, "created_utc": 0.0, "subreddit": "rust"}}
                ]
            }
        }))
    }

    async fn comments() -> Json<Value> {
        Json(json!({
            "kind": "Listing",
            "data": {
                "children": [
                    {"kind": "t1", "data": {"id": "c1", "body": "nice", "score": 2, "created_utc": 0.0, "subreddit": "rust"}}
                ]
            }
        }))
    }

    async fn spawn_fake_reddit() -> String {
        let app = Router::new()
            .route("/user/{name}/about", get(about))
            .route("/user/{name}/submitted", get(submitted))
            .route("/user/{name}/comments", get(comments));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn analytics_from_fake_api() {
        let base = spawn_fake_reddit().await;
        let client = RedditClient::with_base_url(base, "good-token");

        let analytics = client.user_analytics("someone").await.unwrap();
        assert_eq!(analytics.reddit_id, "t2_abc");
        assert_eq!(analytics.reddit_username, "someone");
        assert_eq!(analytics.average_upvotes, 20);
        assert_eq!(analytics.average_comments, 4);
        assert_eq!(analytics.total_posts, 2);
        assert_eq!(analytics.engagement_rate, 12.0);
        assert!(analytics.verified);
    }

    #[tokio::test]
    async fn comments_listing_unwraps_children() {
        let base = spawn_fake_reddit().await;
        let client = RedditClient::with_base_url(base, "good-token");

        let comments = client.user_comments("someone", 25).await.unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].body, "nice");
    }

    #[tokio::test]
    async fn bad_token_is_status_error() {
        let base = spawn_fake_reddit().await;
        let client = RedditClient::with_base_url(base, "bad-token");

        let err = client.user_profile("someone").await.unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short".into(), 500), "short");
        assert_eq!(truncate("héllo".into(), 2), "h...");
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let client = RedditClient::with_base_url("http://localhost:1/", "t");
        assert_eq!(client.base_url, "http://localhost:1");
    }

    #[tokio::test]
    async fn username_cannot_escape_user_path() {
        // Nothing listens on port 1; validation must fail before any request.
        let client = RedditClient::with_base_url("http://127.0.0.1:1", "good-token");

        for name in ["../api/v1/me", "spez?limit=1", "a/b", "ab", ""] {
            let err = client.user_analytics(name).await.unwrap_err();
            assert!(
                matches!(err, RedditError::InvalidUsername(ref n) if n == name),
                "{name:?} gave {err}"
            );
        }
    }

    #[test]
    fn user_path_accepts_reddit_names() {
        assert_eq!(user_path("Some_User-42", "about").unwrap(), "/user/Some_User-42/about");
    }
}

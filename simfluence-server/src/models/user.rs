//! User input validation: identity fields, social analytics, leaderboard ordering

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use simfluence_reddit::RedditAnalytics;

use super::validation::{non_negative, optional_text};
use super::{HttpUrl, ValidationError};

const MAX_EMAIL_LEN: usize = 254;
const MAX_NAME_LEN: usize = 128;

/// Leaderboard size when the caller doesn't ask for one
const DEFAULT_LEADERBOARD_LIMIT: i64 = 10;
const MAX_LEADERBOARD_LIMIT: i64 = 100;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("invalid email regex"));

/// Validated email address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    /// # Example
    /// ```
    /// use simfluence_server::models::Email;
    ///
    /// assert!(Email::new("ana@example.com").is_ok());
    /// assert!(Email::new("ana@example").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "email" });
        }
        if s.len() > MAX_EMAIL_LEN {
            return Err(ValidationError::TooLong {
                field: "email",
                max: MAX_EMAIL_LEN,
            });
        }
        if !EMAIL_RE.is_match(s) {
            return Err(ValidationError::InvalidFormat {
                field: "email",
                reason: "invalid email address",
            });
        }
        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Social-media analytics attached to a user.
///
/// Every field is optional: absent fields keep the stored value on update
/// and fall back to the column default on insert.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAnalytics {
    pub followers: Option<i64>,
    pub following: Option<i64>,
    pub average_post_impressions: Option<i64>,
    pub total_posts: Option<i64>,
    pub engagement_rate: Option<f64>,
    pub average_likes: Option<f64>,
    pub average_comments: Option<f64>,
    pub average_shares: Option<f64>,
    pub account_age: Option<i64>,
    pub reddit_karma: Option<i64>,
    pub reddit_account_age: Option<i64>,
    pub verified: Option<bool>,
}

impl UserAnalytics {
    /// Reject negative counts and rates. Karma may legitimately be negative.
    pub fn validate(self) -> Result<Self, ValidationError> {
        non_negative("followers", self.followers)?;
        non_negative("following", self.following)?;
        non_negative("averagePostImpressions", self.average_post_impressions)?;
        non_negative("totalPosts", self.total_posts)?;
        non_negative("engagementRate", self.engagement_rate)?;
        non_negative("averageLikes", self.average_likes)?;
        non_negative("averageComments", self.average_comments)?;
        non_negative("averageShares", self.average_shares)?;
        non_negative("accountAge", self.account_age)?;
        non_negative("redditAccountAge", self.reddit_account_age)?;
        Ok(self)
    }
}

impl From<&RedditAnalytics> for UserAnalytics {
    fn from(a: &RedditAnalytics) -> Self {
        Self {
            total_posts: Some(a.total_posts),
            engagement_rate: Some(a.engagement_rate.max(0.0)),
            average_likes: Some(a.average_upvotes.max(0) as f64),
            average_comments: Some(a.average_comments.max(0) as f64),
            reddit_karma: Some(a.reddit_karma),
            reddit_account_age: Some(a.reddit_account_age.max(0)),
            verified: Some(a.verified),
            ..Self::default()
        }
    }
}

/// Raw user payload as sent by the frontend
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub profile_image_url: Option<String>,
    pub reddit_id: Option<String>,
    pub reddit_username: Option<String>,
    #[serde(flatten)]
    pub analytics: UserAnalytics,
}

/// Validated user payload. Blank strings have been normalized to `None`.
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub name: Option<String>,
    pub email: Option<Email>,
    pub profile_image_url: Option<HttpUrl>,
    pub reddit_id: Option<String>,
    pub reddit_username: Option<String>,
    pub analytics: UserAnalytics,
}

impl UserInput {
    pub fn validate(self) -> Result<UserProfile, ValidationError> {
        let email = match self.email.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(s) => Some(Email::new(s)?),
        };

        Ok(UserProfile {
            name: optional_text("name", self.name.as_deref(), MAX_NAME_LEN)?,
            email,
            profile_image_url: HttpUrl::optional(
                "profileImageUrl",
                self.profile_image_url.as_deref(),
            )?,
            reddit_id: optional_text("redditId", self.reddit_id.as_deref(), MAX_NAME_LEN)?,
            reddit_username: optional_text(
                "redditUsername",
                self.reddit_username.as_deref(),
                MAX_NAME_LEN,
            )?,
            analytics: self.analytics.validate()?,
        })
    }
}

impl UserProfile {
    /// Email is mandatory whenever a new user row is inserted.
    pub fn require_email(&self) -> Result<&Email, ValidationError> {
        self.email
            .as_ref()
            .ok_or(ValidationError::Empty { field: "email" })
    }
}

/// Whitelisted leaderboard sort keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeaderboardSort {
    #[default]
    Followers,
    Following,
    AveragePostImpressions,
    EngagementRate,
    TotalPosts,
    AverageLikes,
    AverageComments,
    RedditKarma,
    LastActive,
}

impl LeaderboardSort {
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        Ok(match s {
            "followers" => Self::Followers,
            "following" => Self::Following,
            "averagePostImpressions" => Self::AveragePostImpressions,
            "engagementRate" => Self::EngagementRate,
            "totalPosts" => Self::TotalPosts,
            "averageLikes" => Self::AverageLikes,
            "averageComments" => Self::AverageComments,
            "redditKarma" => Self::RedditKarma,
            "lastActive" => Self::LastActive,
            other => {
                return Err(ValidationError::InvalidVariant {
                    field: "sortBy",
                    value: other.to_owned(),
                })
            }
        })
    }

    /// Column name; only ever one of these literals reaches SQL.
    pub fn column(self) -> &'static str {
        match self {
            Self::Followers => "followers",
            Self::Following => "following",
            Self::AveragePostImpressions => "average_post_impressions",
            Self::EngagementRate => "engagement_rate",
            Self::TotalPosts => "total_posts",
            Self::AverageLikes => "average_likes",
            Self::AverageComments => "average_comments",
            Self::RedditKarma => "reddit_karma",
            Self::LastActive => "last_active",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(ValidationError::InvalidVariant {
                field: "order",
                value: s.to_owned(),
            }),
        }
    }

    pub fn sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// `?sortBy=&order=&limit=` for the leaderboard
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardParams {
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub limit: Option<i64>,
}

/// Validated leaderboard query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaderboardQuery {
    pub sort: LeaderboardSort,
    pub order: SortOrder,
    pub limit: i64,
}

impl TryFrom<LeaderboardParams> for LeaderboardQuery {
    type Error = ValidationError;

    fn try_from(params: LeaderboardParams) -> Result<Self, Self::Error> {
        let sort = match params.sort_by.as_deref() {
            None | Some("") => LeaderboardSort::default(),
            Some(s) => LeaderboardSort::parse(s)?,
        };
        let order = match params.order.as_deref() {
            None | Some("") => SortOrder::default(),
            Some(s) => SortOrder::parse(s)?,
        };
        let limit = params
            .limit
            .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
            .clamp(1, MAX_LEADERBOARD_LIMIT);

        Ok(Self { sort, order, limit })
    }
}

//! Simulation lifecycle status, target platform and input validation

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::{non_negative, optional_text, required_text};
use super::{HttpUrl, ValidationError};

/// Maximum post body length (long-form LinkedIn posts fit comfortably)
pub const MAX_CONTENT_LEN: usize = 40_000;
const MAX_TITLE_LEN: usize = 300;

/// Simulation lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SimulationStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl SimulationStatus {
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::InProgress,
        Self::Completed,
        Self::Failed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::InvalidVariant {
                field: "status",
                value: s.to_owned(),
            })
    }
}

impl fmt::Display for SimulationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Social network the post is written for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Platform {
    Facebook,
    Instagram,
    Twitter,
    Linkedin,
    Reddit,
}

impl Platform {
    pub const ALL: [Self; 5] = [
        Self::Facebook,
        Self::Instagram,
        Self::Twitter,
        Self::Linkedin,
        Self::Reddit,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Facebook => "FACEBOOK",
            Self::Instagram => "INSTAGRAM",
            Self::Twitter => "TWITTER",
            Self::Linkedin => "LINKEDIN",
            Self::Reddit => "REDDIT",
        }
    }

    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::InvalidVariant {
                field: "platform",
                value: s.to_owned(),
            })
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engagement estimates; absent values keep the stored (or default 0) value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementEstimates {
    pub impressions: Option<i64>,
    pub likes_estimate: Option<i64>,
    pub comments_estimate: Option<i64>,
    pub shares_estimate: Option<i64>,
}

impl EngagementEstimates {
    pub fn validate(self) -> Result<Self, ValidationError> {
        non_negative("impressions", self.impressions)?;
        non_negative("likesEstimate", self.likes_estimate)?;
        non_negative("commentsEstimate", self.comments_estimate)?;
        non_negative("sharesEstimate", self.shares_estimate)?;
        Ok(self)
    }
}

/// Raw `POST /simulation` and `POST /simulation/start` payload.
///
/// `/start` sends the image as `imageUrl`; the plain create sends `postUrl`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationInput {
    pub user_id: Option<Uuid>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub status: Option<String>,
    pub platform: Option<String>,
    #[serde(alias = "imageUrl")]
    pub post_url: Option<String>,
    #[serde(flatten)]
    pub estimates: EngagementEstimates,
}

/// Validated new simulation
#[derive(Debug, Clone)]
pub struct NewSimulation {
    pub user_id: Uuid,
    pub title: Option<String>,
    pub content: String,
    pub status: SimulationStatus,
    pub platform: Platform,
    pub post_url: Option<HttpUrl>,
    pub estimates: EngagementEstimates,
}

impl SimulationInput {
    pub fn validate(self) -> Result<NewSimulation, ValidationError> {
        let user_id = self.user_id.ok_or(ValidationError::Empty { field: "userId" })?;
        let content = required_text("content", self.content.as_deref(), MAX_CONTENT_LEN)?;
        let platform = match self.platform.as_deref() {
            None | Some("") => return Err(ValidationError::Empty { field: "platform" }),
            Some(p) => Platform::parse(p)?,
        };
        let status = match self.status.as_deref() {
            None | Some("") => SimulationStatus::default(),
            Some(s) => SimulationStatus::parse(s)?,
        };

        Ok(NewSimulation {
            user_id,
            title: optional_text("title", self.title.as_deref(), MAX_TITLE_LEN)?,
            content,
            status,
            platform,
            post_url: HttpUrl::optional("postUrl", self.post_url.as_deref())?,
            estimates: self.estimates.validate()?,
        })
    }
}

impl NewSimulation {
    /// `/start` always begins in PENDING regardless of what the client sent.
    pub fn pending(mut self) -> Self {
        self.status = SimulationStatus::Pending;
        self
    }
}

/// Raw `PUT /simulation/{id}` payload; every field optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationPatchInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub status: Option<String>,
    pub platform: Option<String>,
    pub post_url: Option<String>,
    #[serde(flatten)]
    pub estimates: EngagementEstimates,
}

/// Validated partial update. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct SimulationPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub status: Option<SimulationStatus>,
    pub platform: Option<Platform>,
    pub post_url: Option<HttpUrl>,
    pub estimates: EngagementEstimates,
}

impl SimulationPatchInput {
    pub fn validate(self) -> Result<SimulationPatch, ValidationError> {
        let content = match self.content.as_deref() {
            None => None,
            Some(c) => Some(required_text("content", Some(c), MAX_CONTENT_LEN)?),
        };

        Ok(SimulationPatch {
            title: optional_text("title", self.title.as_deref(), MAX_TITLE_LEN)?,
            content,
            status: self.status.as_deref().map(SimulationStatus::parse).transpose()?,
            platform: self.platform.as_deref().map(Platform::parse).transpose()?,
            post_url: HttpUrl::optional("postUrl", self.post_url.as_deref())?,
            estimates: self.estimates.validate()?,
        })
    }
}

/// `GET /simulation?userId=&platform=&status=`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationFilterParams {
    pub user_id: Option<Uuid>,
    pub platform: Option<String>,
    pub status: Option<String>,
}

/// Validated list filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationFilter {
    pub user_id: Option<Uuid>,
    pub platform: Option<Platform>,
    pub status: Option<SimulationStatus>,
}

impl TryFrom<SimulationFilterParams> for SimulationFilter {
    type Error = ValidationError;

    fn try_from(params: SimulationFilterParams) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: params.user_id,
            platform: params
                .platform
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(Platform::parse)
                .transpose()?,
            status: params
                .status
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(SimulationStatus::parse)
                .transpose()?,
        })
    }
}

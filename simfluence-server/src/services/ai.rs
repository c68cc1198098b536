//! Client for the external likes-prediction service

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

/// Where the prediction service listens in local development
pub const DEFAULT_AI_SERVICE_URL: &str = "http://localhost:5000";

#[derive(Debug, thiserror::Error)]
pub enum AiClientError {
    #[error("AI service request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("AI service returned {status}: {body}")]
    Status { status: u16, body: String },
}

#[derive(Debug, Deserialize)]
struct Prediction {
    #[serde(default)]
    likes: Value,
}

#[derive(Debug, Clone)]
pub struct AiClient {
    client: Client,
    base_url: String,
}

impl AiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Forward simulation data to `/predict-likes` and return its `likes` field
    /// untouched (the service answers with a number, or null when it can't tell).
    #[instrument(skip(self, simulation))]
    pub async fn predict_likes(&self, simulation: &Value) -> Result<Value, AiClientError> {
        let url = format!("{}/predict-likes", self.base_url);
        debug!(%url, "requesting likes prediction");

        let response = self.client.post(&url).json(simulation).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AiClientError::Status {
                status: status.as_u16(),
                body: body.chars().take(500).collect(),
            });
        }

        let prediction: Prediction = response.json().await?;
        Ok(prediction.likes)
    }
}

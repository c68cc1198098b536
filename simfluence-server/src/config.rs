//! Outbound integration settings read from the environment
//!
//! | variable | default |
//! |----------|---------|
//! | `AI_SERVICE_URL` | `http://localhost:5000` |
//! | `REDDIT_API_BASE` | `https://oauth.reddit.com` |
//! | `CLOUDINARY_CLOUD_NAME` / `_API_KEY` / `_API_SECRET` | unset (upload routes answer 503) |
//! | `CLOUDINARY_FOLDER` | `simfluence` |

use crate::services::{CloudinaryConfig, DEFAULT_AI_SERVICE_URL};

#[derive(Debug, Clone)]
pub struct IntegrationsConfig {
    pub ai_service_url: String,
    pub reddit_api_base: String,
    pub cloudinary: Option<CloudinaryConfig>,
}

impl Default for IntegrationsConfig {
    fn default() -> Self {
        Self {
            ai_service_url: DEFAULT_AI_SERVICE_URL.to_string(),
            reddit_api_base: simfluence_reddit::DEFAULT_BASE_URL.to_string(),
            cloudinary: None,
        }
    }
}

impl IntegrationsConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            ai_service_url: get("AI_SERVICE_URL").unwrap_or(defaults.ai_service_url),
            reddit_api_base: get("REDDIT_API_BASE").unwrap_or(defaults.reddit_api_base),
            cloudinary: CloudinaryConfig::from_lookup(&lookup),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| env.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = IntegrationsConfig::from_lookup(lookup(&[]));
        assert_eq!(config.ai_service_url, DEFAULT_AI_SERVICE_URL);
        assert_eq!(config.reddit_api_base, "https://oauth.reddit.com");
        assert!(config.cloudinary.is_none());
    }

    #[test]
    fn blank_values_fall_back() {
        let config = IntegrationsConfig::from_lookup(lookup(&[("AI_SERVICE_URL", "  ")]));
        assert_eq!(config.ai_service_url, DEFAULT_AI_SERVICE_URL);
    }

    #[test]
    fn reads_cloudinary_credentials() {
        let config = IntegrationsConfig::from_lookup(lookup(&[
            ("AI_SERVICE_URL", "http://ai:8000"),
            ("CLOUDINARY_CLOUD_NAME", "demo"),
            ("CLOUDINARY_API_KEY", "key"),
            ("CLOUDINARY_API_SECRET", "secret"),
            ("CLOUDINARY_FOLDER", "staging"),
        ]));
        assert_eq!(config.ai_service_url, "http://ai:8000");
        let cloudinary = config.cloudinary.unwrap();
        assert_eq!(cloudinary.cloud_name, "demo");
        assert_eq!(cloudinary.folder, "staging");
    }
}

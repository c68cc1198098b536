//! Cloudinary image storage client
//!
//! Uploads and deletions go through the signed upload API; listing uses the
//! admin API with basic auth. Request signatures are SHA-256 over the sorted
//! `key=value` parameters followed by the API secret.

use std::collections::BTreeMap;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, instrument};

/// Cloudinary API host
pub const DEFAULT_API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Folder images land in when none is configured
pub const DEFAULT_FOLDER: &str = "simfluence";

/// Fit inside 800x600, automatic quality
pub const UPLOAD_TRANSFORMATION: &str = "c_limit,h_600,w_800/q_auto";

#[derive(Debug, thiserror::Error)]
pub enum CloudinaryError {
    #[error("cloudinary request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("cloudinary {operation} returned {status}: {body}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },

    #[error("cloudinary {operation} returned an unexpected payload: {source}")]
    Payload {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Account credentials and upload target
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: String,
    pub api_base: String,
}

impl CloudinaryConfig {
    /// Read `CLOUDINARY_*` variables. `None` unless name, key and secret are all set.
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Some(Self {
            cloud_name: get("CLOUDINARY_CLOUD_NAME")?,
            api_key: get("CLOUDINARY_API_KEY")?,
            api_secret: get("CLOUDINARY_API_SECRET")?,
            folder: get("CLOUDINARY_FOLDER").unwrap_or_else(|| DEFAULT_FOLDER.to_string()),
            api_base: get("CLOUDINARY_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        })
    }
}

/// Result of a successful upload, shaped for the frontend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedImage {
    pub secure_url: String,
    pub public_id: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub bytes: Option<u64>,
}

/// One page of the folder listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagePage {
    #[serde(default)]
    pub resources: Vec<Value>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

/// Sign upload API parameters.
///
/// Parameters are joined as `k=v` pairs in key order with `&`, the secret is
/// appended, and the result is hashed with SHA-256 (lowercase hex).
pub fn sign(params: &BTreeMap<&str, String>, api_secret: &str) -> String {
    let joined = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Debug, Clone)]
pub struct CloudinaryClient {
    client: Client,
    config: CloudinaryConfig,
}

impl CloudinaryClient {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.cloud_name,
            path
        )
    }

    /// Signed form fields common to upload and destroy
    fn signed_form(&self, mut params: BTreeMap<&'static str, String>) -> Form {
        params.insert("timestamp", chrono::Utc::now().timestamp().to_string());
        let signature = sign(&params, &self.config.api_secret);

        let mut form = Form::new()
            .text("api_key", self.config.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");
        for (key, value) in params {
            form = form.text(key, value);
        }
        form
    }

    /// Upload image bytes into the configured folder.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload_image(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        content_type: Option<&str>,
    ) -> Result<UploadedImage, CloudinaryError> {
        let mut params = BTreeMap::new();
        params.insert("folder", self.config.folder.clone());
        params.insert("transformation", UPLOAD_TRANSFORMATION.to_string());

        let mut part = Part::bytes(bytes).file_name(filename.to_string());
        if let Some(mime) = content_type {
            part = part.mime_str(mime)?;
        }
        let form = self.signed_form(params).part("file", part);

        let response = self
            .client
            .post(self.endpoint("image/upload"))
            .multipart(form)
            .send()
            .await?;
        read_json("upload", response).await
    }

    /// Delete an image. Returns Cloudinary's verdict (`ok`, `not found`, ...).
    #[instrument(skip(self))]
    pub async fn destroy(&self, public_id: &str) -> Result<String, CloudinaryError> {
        let mut params = BTreeMap::new();
        params.insert("public_id", public_id.to_string());

        let response = self
            .client
            .post(self.endpoint("image/destroy"))
            .multipart(self.signed_form(params))
            .send()
            .await?;
        let body: DestroyResponse = read_json("destroy", response).await?;
        Ok(body.result)
    }

    /// List one page of images in the folder.
    #[instrument(skip(self))]
    pub async fn list_images(
        &self,
        max_results: u32,
        next_cursor: Option<&str>,
    ) -> Result<ImagePage, CloudinaryError> {
        let mut query = vec![
            ("type", "upload".to_string()),
            ("prefix", format!("{}/", self.config.folder)),
            ("max_results", max_results.to_string()),
        ];
        if let Some(cursor) = next_cursor {
            query.push(("next_cursor", cursor.to_string()));
        }

        let response = self
            .client
            .get(self.endpoint("resources/image"))
            .basic_auth(&self.config.api_key, Some(&self.config.api_secret))
            .query(&query)
            .send()
            .await?;
        read_json("list", response).await
    }
}

async fn read_json<T: DeserializeOwned>(
    operation: &'static str,
    response: reqwest::Response,
) -> Result<T, CloudinaryError> {
    let status = response.status();
    let body = response.text().await?;
    debug!(operation, status = status.as_u16(), "cloudinary response");

    if !status.is_success() {
        let mut body = body;
        if body.len() > 500 {
            let mut cut = 500;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
            body.push_str("...");
        }
        return Err(CloudinaryError::Status {
            operation,
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|source| CloudinaryError::Payload { operation, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    fn config(api_base: String) -> CloudinaryConfig {
        CloudinaryConfig {
            cloud_name: "demo".into(),
            api_key: "key".into(),
            api_secret: "secret".into(),
            folder: DEFAULT_FOLDER.into(),
            api_base,
        }
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{}", addr)
    }

    #[test]
    fn signature_sorts_params_and_appends_secret() {
        let mut params = BTreeMap::new();
        params.insert("timestamp", "1315060510".to_string());
        params.insert("folder", "simfluence".to_string());

        let expected = {
            let mut hasher = Sha256::new();
            hasher.update(b"folder=simfluence&timestamp=1315060510abcd");
            format!("{:x}", hasher.finalize())
        };
        assert_eq!(sign(&params, "abcd"), expected);
        assert_eq!(expected.len(), 64);
    }

    #[test]
    fn config_requires_all_credentials() {
        let env: HashMap<&str, &str> = [
            ("CLOUDINARY_CLOUD_NAME", "demo"),
            ("CLOUDINARY_API_KEY", "key"),
        ]
        .into();
        let lookup = |k: &str| env.get(k).map(|v| v.to_string());
        assert!(CloudinaryConfig::from_lookup(lookup).is_none());

        let env: HashMap<&str, &str> = [
            ("CLOUDINARY_CLOUD_NAME", "demo"),
            ("CLOUDINARY_API_KEY", "key"),
            ("CLOUDINARY_API_SECRET", "secret"),
        ]
        .into();
        let config = CloudinaryConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.folder, DEFAULT_FOLDER);
        assert_eq!(config.api_base, DEFAULT_API_BASE);
    }

    #[tokio::test]
    async fn upload_parses_result() {
        let app = Router::new().route(
            "/demo/image/upload",
            post(|| async {
                Json(json!({
                    "secure_url": "https://res.cloudinary.com/demo/image/upload/simfluence/a.png",
                    "public_id": "simfluence/a",
                    "width": 800,
                    "height": 450,
                    "format": "png",
                    "bytes": 12345
                }))
            }),
        );
        let client = CloudinaryClient::new(config(serve(app).await));

        let image = client
            .upload_image(vec![1, 2, 3], "a.png", Some("image/png"))
            .await
            .unwrap();
        assert_eq!(image.public_id, "simfluence/a");
        assert_eq!(image.width, Some(800));
        assert_eq!(image.bytes, Some(12345));
    }

    #[tokio::test]
    async fn destroy_reports_verdict() {
        let app = Router::new().route(
            "/demo/image/destroy",
            post(|| async { Json(json!({"result": "not found"})) }),
        );
        let client = CloudinaryClient::new(config(serve(app).await));
        assert_eq!(client.destroy("simfluence/gone").await.unwrap(), "not found");
    }

    #[tokio::test]
    async fn list_sends_folder_prefix() {
        let app = Router::new().route(
            "/demo/resources/image",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                Json(json!({
                    "resources": [{"public_id": q.get("prefix").cloned().unwrap_or_default()}],
                    "next_cursor": q.get("max_results").cloned()
                }))
            }),
        );
        let client = CloudinaryClient::new(config(serve(app).await));

        let page = client.list_images(5, None).await.unwrap();
        assert_eq!(page.resources[0]["public_id"], "simfluence/");
        assert_eq!(page.next_cursor.as_deref(), Some("5"));
    }

    #[tokio::test]
    async fn error_status_is_typed() {
        let app = Router::new().route(
            "/demo/image/destroy",
            post(|| async { (axum::http::StatusCode::UNAUTHORIZED, "bad signature") }),
        );
        let client = CloudinaryClient::new(config(serve(app).await));

        let err = client.destroy("x").await.unwrap_err();
        assert!(matches!(err, CloudinaryError::Status { status: 401, .. }));
    }
}

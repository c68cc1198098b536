//! Image upload endpoints backed by Cloudinary

use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::http::error::ApiError;
use crate::http::extractors::ApiQuery;
use crate::http::server::AppState;
use crate::models::ValidationError;
use crate::services::CloudinaryClient;

/// Largest accepted upload
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const DEFAULT_MAX_RESULTS: u32 = 20;
const MAX_RESULTS_CAP: u32 = 500;

fn cloudinary(state: &AppState) -> Result<&CloudinaryClient, ApiError> {
    state.cloudinary.as_ref().ok_or_else(|| ApiError::Unavailable {
        message: "image uploads are not configured".into(),
    })
}

/// Body-limit failures surface as 413, anything else as 400.
fn multipart_error(status: StatusCode, text: String) -> ApiError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge {
            limit: MAX_UPLOAD_BYTES,
        }
    } else {
        ApiError::bad_request(text)
    }
}

/// POST /api/v1/upload/image - multipart field `image`
async fn upload_image(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let cloudinary = cloudinary(&state)?;
    let mut multipart = multipart.map_err(|e| multipart_error(e.status(), e.body_text()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e.status(), e.body_text()))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        if let Some(mime) = content_type.as_deref() {
            if !mime.starts_with("image/") {
                return Err(ValidationError::InvalidFormat {
                    field: "image",
                    reason: "only image files are accepted",
                }
                .into());
            }
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e.status(), e.body_text()))?;
        if bytes.is_empty() {
            break;
        }

        let image = cloudinary
            .upload_image(bytes.to_vec(), &filename, content_type.as_deref())
            .await?;
        tracing::info!(public_id = %image.public_id, "Image uploaded");

        return Ok(Json(json!({
            "success": true,
            "imageUrl": image.secure_url,
            "publicId": image.public_id,
            "width": image.width,
            "height": image.height,
            "format": image.format,
            "size": image.bytes
        })));
    }

    Err(ValidationError::Empty { field: "image" }.into())
}

/// DELETE /api/v1/upload/image/{*public_id} - public ids contain the folder
async fn delete_image(
    State(state): State<Arc<AppState>>,
    Path(public_id): Path<String>,
) -> Result<Response, ApiError> {
    let cloudinary = cloudinary(&state)?;
    let public_id = public_id.trim_matches('/');
    if public_id.is_empty() {
        return Err(ValidationError::Empty { field: "publicId" }.into());
    }

    let result = cloudinary.destroy(public_id).await?;
    if result == "ok" {
        return Ok(Json(json!({
            "success": true,
            "message": "Image deleted successfully"
        }))
        .into_response());
    }

    Ok((
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "Failed to delete image",
            "details": result
        })),
    )
        .into_response())
}

#[derive(Debug, Default, Deserialize)]
struct ListParams {
    max_results: Option<u32>,
    next_cursor: Option<String>,
}

/// GET /api/v1/upload/images
async fn list_images(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let cloudinary = cloudinary(&state)?;
    let max_results = params
        .max_results
        .unwrap_or(DEFAULT_MAX_RESULTS)
        .clamp(1, MAX_RESULTS_CAP);

    let page = cloudinary
        .list_images(max_results, params.next_cursor.as_deref())
        .await?;
    let total_count = page.resources.len();

    Ok(Json(json!({
        "success": true,
        "images": page.resources,
        "next_cursor": page.next_cursor,
        "total_count": total_count
    })))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/upload/image", post(upload_image))
        .route("/api/v1/upload/image/{*public_id}", delete(delete_image))
        .route("/api/v1/upload/images", get(list_images))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

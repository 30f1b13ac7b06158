//! Product image upload and serving.
//!
//! The entry form submits images as base64 data URLs; decoded bytes land
//! under the configured upload directory and are served back by filename.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::auth::CurrentUser;
use crate::db::AppState;
use crate::domain::ApiError;

const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

#[derive(Debug, Deserialize)]
pub struct UploadImageRequest {
    pub image_data: String,
    #[serde(default)]
    pub file_name: Option<String>,
}

/// Split a `data:image/<ext>;base64,<payload>` URL into extension and
/// payload.
fn parse_data_url(data: &str) -> Option<(&str, &str)> {
    let rest = data.strip_prefix("data:image/")?;
    let (ext, rest) = rest.split_once(";base64,")?;
    if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some((ext, rest))
}

fn sanitize_stem(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "product".to_string()
    } else {
        cleaned
    }
}

/// POST /api/uploads/image
pub async fn upload_image(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(payload): Json<UploadImageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (extension, encoded) = parse_data_url(&payload.image_data)
        .ok_or_else(|| ApiError::Validation("Invalid image data".to_string()))?;

    let ext = extension.to_ascii_lowercase();
    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(ApiError::Validation("Unsupported image format".to_string()));
    }

    let bytes = BASE64
        .decode(encoded.trim())
        .map_err(|_| ApiError::Validation("Invalid image format".to_string()))?;

    let stem = sanitize_stem(payload.file_name.as_deref().unwrap_or("product"));
    let file_name = format!("{}_{}.{}", stem, Utc::now().timestamp_millis(), ext);

    let dir = std::path::Path::new(&state.config.upload_dir);
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    tokio::fs::write(dir.join(&file_name), &bytes)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(json!({
        "success": true,
        "image_url": format!("/api/uploads/{file_name}"),
        "message": "Image uploaded successfully",
    })))
}

fn content_type_for(extension: &str) -> &'static str {
    match extension {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

/// GET /api/uploads/:filename — open, images are embedded in public pages.
pub async fn serve_image(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    // Filenames we generate never contain separators; reject anything else.
    if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
        return Err(ApiError::NotFound("Image not found".to_string()));
    }

    let path = std::path::Path::new(&state.config.upload_dir).join(&filename);
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| ApiError::NotFound("Image not found".to_string()))?;

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, content_type_for(&ext))],
        bytes,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_url_parsing() {
        let (ext, payload) = parse_data_url("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(ext, "png");
        assert_eq!(payload, "aGVsbG8=");

        assert!(parse_data_url("data:text/plain;base64,xx").is_none());
        assert!(parse_data_url("not a data url").is_none());
    }

    #[test]
    fn file_stem_is_sanitized() {
        assert_eq!(sanitize_stem("../../etc/passwd"), "______etc_passwd");
        assert_eq!(sanitize_stem(""), "product");
        assert_eq!(sanitize_stem("serum-50ml"), "serum-50ml");
    }
}

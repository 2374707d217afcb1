//! Multipart image upload.

use std::path::Path;

use axum::Json;
use axum::extract::{Multipart, State};
use serde_json::{Value, json};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Field name the client sends the file under.
const FIELD_NAME: &str = "product";

/// Accept a product image and store it under the upload directory.
///
/// The stored filename is `product_<millis><ext>`, with the extension
/// taken from the client's filename. The response echoes the public URL
/// the file is served from.
#[instrument(skip(state, multipart))]
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(FIELD_NAME) {
            continue;
        }

        let extension = field
            .file_name()
            .map(extension_of)
            .unwrap_or_default()
            .to_owned();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let filename = format!(
            "product_{}{extension}",
            chrono::Utc::now().timestamp_millis()
        );
        let dir = &state.config().upload_dir;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;
        tokio::fs::write(dir.join(&filename), &bytes)
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;

        tracing::info!(filename = %filename, size = bytes.len(), "stored uploaded image");

        let image_url = format!("{}/images/{filename}", state.config().base_url);
        return Ok(Json(json!({ "success": 1, "image_url": image_url })));
    }

    Err(AppError::BadRequest(format!(
        "Missing multipart field `{FIELD_NAME}`"
    )))
}

/// Extension including the leading dot, or empty for bare filenames.
///
/// A leading dot alone (`.gitignore`) does not count as an extension.
fn extension_of(filename: &str) -> &str {
    if Path::new(filename).extension().is_none() {
        return "";
    }
    filename.rfind('.').map_or("", |i| &filename[i..])
}

#[cfg(test)]
mod tests {
    use super::extension_of;

    #[test]
    fn extension_includes_dot() {
        assert_eq!(extension_of("photo.png"), ".png");
        assert_eq!(extension_of("archive.tar.gz"), ".gz");
    }

    #[test]
    fn no_extension_is_empty() {
        assert_eq!(extension_of("photo"), "");
        assert_eq!(extension_of(".gitignore"), "");
    }
}

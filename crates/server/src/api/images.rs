//! Image API handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::IntoResponse,
};
use tracing::warn;

use super::error::{error_response, image_error, ApiError};
use crate::state::AppState;

/// GET /image/{filename}
///
/// Unknown names are served the default image.
pub async fn get_image(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let path = state.resolver().resolve(&filename).map_err(image_error)?;

    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(([(CONTENT_TYPE, "image/jpeg")], bytes)),
        Err(e) => {
            // Only reachable when default.jpg itself is missing.
            warn!("Failed to read image {:?}: {}", path, e);
            Err(error_response(StatusCode::NOT_FOUND, "Image not found"))
        }
    }
}

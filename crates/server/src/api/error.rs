//! Mapping core errors onto HTTP responses.

use std::error::Error as _;

use axum::{http::StatusCode, Json};
use serde::Serialize;
use tracing::{error, warn};

use marketplace_core::{CatalogError, ImageError, SubmitError};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            message: message.into(),
        }),
    )
}

pub fn bad_request(message: impl Into<String>) -> ApiError {
    error_response(StatusCode::BAD_REQUEST, message)
}

pub fn catalog_error(e: CatalogError) -> ApiError {
    match e {
        CatalogError::NotFound(_) => error_response(StatusCode::NOT_FOUND, "Item not found"),
        CatalogError::InvalidRequest(msg) => bad_request(msg),
        CatalogError::Io(_) | CatalogError::StoreUnavailable(_) | CatalogError::CorruptStore(_) => {
            error!("Catalog error: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

pub fn image_error(e: ImageError) -> ApiError {
    match e {
        ImageError::InvalidRequest(msg) => {
            warn!("Rejected image request: {}", msg);
            bad_request(msg)
        }
        ImageError::Io { .. } => {
            error!(cause = ?e.source(), "{}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

pub fn submit_error(e: SubmitError) -> ApiError {
    match e {
        SubmitError::Image(e) => image_error(e),
        SubmitError::Catalog(e) => catalog_error(e),
    }
}

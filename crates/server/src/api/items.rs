//! Item API handlers.

use std::sync::Arc;

use axum::{
    extract::{FromRequest, Multipart, Path, Query, Request, State},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use marketplace_core::{submit_item, CatalogRecord, ImageSource, Submission};

use super::error::{bad_request, catalog_error, submit_error, ApiError};
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

/// Form-encoded submission; `image` names a file in the source directory.
#[derive(Debug, Deserialize)]
pub struct ItemForm {
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub image: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub keyword: String,
}

#[derive(Debug, Serialize)]
pub struct ItemsResponse {
    pub items: Vec<CatalogRecord>,
}

#[derive(Debug, Serialize)]
pub struct CreateItemResponse {
    pub message: String,
    pub item: CatalogRecord,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /items
pub async fn list_items(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ItemsResponse>, ApiError> {
    let items = state.catalog().list().map_err(catalog_error)?;
    Ok(Json(ItemsResponse { items }))
}

/// POST /items
///
/// Accepts `application/x-www-form-urlencoded` with a source image name, or
/// `multipart/form-data` where `image` may be an uploaded file.
pub async fn add_item(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<CreateItemResponse>, ApiError> {
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"));

    let submission = if is_multipart {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| bad_request(e.body_text()))?;
        read_multipart(multipart).await?
    } else {
        let Form(form) = Form::<ItemForm>::from_request(request, &state)
            .await
            .map_err(|e| bad_request(e.body_text()))?;
        Submission {
            name: form.name,
            category: form.category,
            image_source: ImageSource::SourceFile(form.image),
        }
    };

    if submission.name.is_empty() {
        return Err(bad_request("name is required"));
    }

    let item = submit_item(state.ingestor(), state.catalog(), submission).map_err(submit_error)?;
    info!("Receive item: {} ({}, {})", item.name, item.category, item.image);

    Ok(Json(CreateItemResponse {
        message: format!("item received: {}", item.name),
        item,
    }))
}

async fn read_multipart(mut multipart: Multipart) -> Result<Submission, ApiError> {
    let mut name = String::new();
    let mut category = String::new();
    let mut image_source = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(e.body_text()))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        let is_file = field.file_name().is_some();
        match field_name.as_str() {
            "name" => name = field.text().await.map_err(|e| bad_request(e.body_text()))?,
            "category" => category = field.text().await.map_err(|e| bad_request(e.body_text()))?,
            "image" if is_file => {
                let bytes = field.bytes().await.map_err(|e| bad_request(e.body_text()))?;
                image_source = Some(ImageSource::Bytes(bytes.to_vec()));
            }
            "image" => {
                let name = field.text().await.map_err(|e| bad_request(e.body_text()))?;
                image_source = Some(ImageSource::SourceFile(name));
            }
            _ => {}
        }
    }

    let image_source = image_source.ok_or_else(|| bad_request("image is required"))?;
    Ok(Submission {
        name,
        category,
        image_source,
    })
}

/// GET /items/{id}
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CatalogRecord>, ApiError> {
    let id: i64 = id
        .parse()
        .map_err(|_| bad_request(format!("Invalid item id: {}", id)))?;

    let item = state.catalog().get(id).map_err(catalog_error)?;
    Ok(Json(item))
}

/// GET /search?keyword=...
///
/// A missing keyword lists every item.
pub async fn search_items(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<ItemsResponse>, ApiError> {
    let items = state
        .catalog()
        .search(&params.keyword)
        .map_err(catalog_error)?;
    Ok(Json(ItemsResponse { items }))
}

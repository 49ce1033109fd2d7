//! Turning an item submission into a stored record.

use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

use crate::catalog::{CatalogError, CatalogRecord, CatalogStore, NewRecord};
use crate::image::{ImageError, ImageIngestor};

/// Where the submitted image comes from.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// A file on the local filesystem of this process. Never built from
    /// client input.
    Path(PathBuf),
    /// A file name a client gave, read from the ingestor's source directory.
    SourceFile(String),
    /// Uploaded bytes.
    Bytes(Vec<u8>),
}

/// An item posted by a client.
#[derive(Debug, Clone)]
pub struct Submission {
    pub name: String,
    pub category: String,
    pub image_source: ImageSource,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Image(#[from] ImageError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl SubmitError {
    pub fn is_invalid_request(&self) -> bool {
        matches!(
            self,
            SubmitError::Image(ImageError::InvalidRequest(_))
                | SubmitError::Catalog(CatalogError::InvalidRequest(_))
        )
    }
}

/// Ingest the image, then persist the record.
///
/// The image is stored first so that a record never references a file
/// that failed to read. If persisting fails afterwards, the stored image
/// is simply reused by the next identical upload.
pub fn submit_item(
    ingestor: &ImageIngestor,
    catalog: &dyn CatalogStore,
    submission: Submission,
) -> Result<CatalogRecord, SubmitError> {
    let image = match &submission.image_source {
        ImageSource::Path(path) => ingestor.ingest(path)?,
        ImageSource::SourceFile(name) => ingestor.ingest_source(name)?,
        ImageSource::Bytes(bytes) => ingestor.ingest_bytes(bytes)?,
    };
    debug!(name = %submission.name, image = %image, "image ingested for submission");

    let record = catalog.create(NewRecord {
        name: submission.name,
        category: submission.category,
        image,
    })?;
    Ok(record)
}

//! Error types for the image module.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while ingesting or resolving images.
#[derive(Debug, Error)]
pub enum ImageError {
    /// Source image or image directory could not be read or written.
    #[error("Image I/O failed for {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Requested filename failed the extension or path checks.
    #[error("Invalid image request: {0}")]
    InvalidRequest(String),
}

impl ImageError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

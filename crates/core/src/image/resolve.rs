//! Mapping client-requested image names onto the image directory.

use std::path::{Path, PathBuf};
use tracing::debug;

use super::{is_image_filename, ImageError, DEFAULT_IMAGE, IMAGE_EXTENSION};

/// Resolves requested filenames to paths inside the image directory.
#[derive(Debug, Clone)]
pub struct ImageResolver {
    image_dir: PathBuf,
}

impl ImageResolver {
    /// The directory is made absolute once here; it need not exist yet.
    pub fn new(image_dir: impl AsRef<Path>) -> Result<Self, ImageError> {
        let image_dir = image_dir.as_ref();
        let image_dir = std::path::absolute(image_dir).map_err(|e| ImageError::io(image_dir, e))?;
        Ok(Self { image_dir })
    }

    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }

    pub fn default_image(&self) -> PathBuf {
        self.image_dir.join(DEFAULT_IMAGE)
    }

    /// Resolve `requested` to an absolute path that stays inside the image
    /// directory, falling back to the default image if no such file exists.
    pub fn resolve(&self, requested: &str) -> Result<PathBuf, ImageError> {
        // Checked before any filesystem access.
        if !requested.ends_with(IMAGE_EXTENSION) {
            return Err(ImageError::InvalidRequest(format!(
                "image path does not end with {}",
                IMAGE_EXTENSION
            )));
        }
        if !is_image_filename(requested) {
            return Err(ImageError::InvalidRequest(format!(
                "image name must not contain path segments: {:?}",
                requested
            )));
        }

        let path = self.image_dir.join(requested);
        if path.is_file() {
            Ok(path)
        } else {
            debug!(image = %requested, "image not found, serving default");
            Ok(self.default_image())
        }
    }
}

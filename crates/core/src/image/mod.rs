//! Content-addressed image files.
//!
//! Images live in one flat directory as `<sha256-hex>.jpg`, next to a
//! `default.jpg` served for any name that has no file behind it.

mod error;
mod ingest;
mod resolve;

pub use error::ImageError;
pub use ingest::ImageIngestor;
pub use resolve::ImageResolver;

use std::path::{Component, Path};

/// Extension every stored and served image carries.
pub const IMAGE_EXTENSION: &str = ".jpg";

/// Served when the requested image does not exist.
pub const DEFAULT_IMAGE: &str = "default.jpg";

/// True if `name` is a bare `.jpg` file name with no directory parts.
pub fn is_image_filename(name: &str) -> bool {
    name.ends_with(IMAGE_EXTENSION) && is_single_component(name)
}

fn is_single_component(name: &str) -> bool {
    // Backslash is a plain character on unix, but never a valid image name.
    if name.contains('/') || name.contains('\\') {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

//! Hashing and storing incoming images.

use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::{is_image_filename, ImageError, IMAGE_EXTENSION};

/// Writes images into the image directory under their content hash.
///
/// Ingesting the same bytes twice returns the same filename and leaves a
/// single file on disk. Images named by a client are only read from the
/// source directory, if one is set.
#[derive(Debug, Clone)]
pub struct ImageIngestor {
    image_dir: PathBuf,
    source_dir: Option<PathBuf>,
}

impl ImageIngestor {
    pub fn new(image_dir: impl Into<PathBuf>) -> Self {
        Self {
            image_dir: image_dir.into(),
            source_dir: None,
        }
    }

    /// Allow [`ingest_source`](Self::ingest_source) to read from `source_dir`.
    pub fn with_source_dir(mut self, source_dir: impl Into<PathBuf>) -> Self {
        self.source_dir = Some(source_dir.into());
        self
    }

    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }

    pub fn source_dir(&self) -> Option<&Path> {
        self.source_dir.as_deref()
    }

    /// Canonical filename for `bytes`: lowercase hex SHA-256 plus `.jpg`.
    pub fn filename_for(bytes: &[u8]) -> String {
        format!("{:x}{}", Sha256::digest(bytes), IMAGE_EXTENSION)
    }

    /// Read the image at `source`, store it, and return its filename.
    ///
    /// The source is read in full before anything is hashed or written, so
    /// an unreadable source fails here and never yields a filename.
    pub fn ingest(&self, source: &Path) -> Result<String, ImageError> {
        let bytes = fs::read(source).map_err(|e| ImageError::io(source, e))?;
        debug!(source = %source.display(), size = bytes.len(), "read source image");
        self.ingest_bytes(&bytes)
    }

    /// Ingest a client-named file from the source directory.
    ///
    /// `name` must be a bare `.jpg` file name; absolute paths and names
    /// with directory parts are rejected before any filesystem access.
    pub fn ingest_source(&self, name: &str) -> Result<String, ImageError> {
        let Some(source_dir) = &self.source_dir else {
            return Err(ImageError::InvalidRequest(
                "image paths are not accepted; upload the file instead".to_string(),
            ));
        };
        if !is_image_filename(name) {
            return Err(ImageError::InvalidRequest(format!(
                "image must be a {} file name inside the source directory: {:?}",
                IMAGE_EXTENSION, name
            )));
        }
        self.ingest(&source_dir.join(name))
    }

    /// Store image bytes that are already in memory.
    pub fn ingest_bytes(&self, bytes: &[u8]) -> Result<String, ImageError> {
        let filename = Self::filename_for(bytes);
        self.store(&filename, bytes)?;
        Ok(filename)
    }

    fn store(&self, filename: &str, bytes: &[u8]) -> Result<(), ImageError> {
        let target = self.image_dir.join(filename);
        if target.is_file() {
            debug!(image = %filename, "image already stored");
            return Ok(());
        }

        fs::create_dir_all(&self.image_dir).map_err(|e| ImageError::io(&self.image_dir, e))?;

        // Write beside the target and rename, so a hash-named file is
        // never observed half-written.
        let mut tmp =
            NamedTempFile::new_in(&self.image_dir).map_err(|e| ImageError::io(&self.image_dir, e))?;
        tmp.write_all(bytes)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| ImageError::io(tmp.path(), e))?;
        tmp.persist(&target)
            .map_err(|e| ImageError::io(&target, e.error))?;

        info!(image = %filename, size = bytes.len(), "stored image");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn files_in(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_filename_for_known_digest() {
        // SHA-256 of the empty input
        assert_eq!(
            ImageIngestor::filename_for(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855.jpg"
        );
    }

    #[test]
    fn test_ingest_writes_hash_named_copy() {
        let src_dir = TempDir::new().unwrap();
        let image_dir = TempDir::new().unwrap();
        let source = src_dir.path().join("a.jpg");
        fs::write(&source, b"jpeg bytes").unwrap();

        let ingestor = ImageIngestor::new(image_dir.path());
        let filename = ingestor.ingest(&source).unwrap();

        assert_eq!(filename, ImageIngestor::filename_for(b"jpeg bytes"));
        assert_eq!(
            fs::read(image_dir.path().join(&filename)).unwrap(),
            b"jpeg bytes"
        );
    }

    #[test]
    fn test_ingest_same_content_twice_dedups() {
        let src_dir = TempDir::new().unwrap();
        let image_dir = TempDir::new().unwrap();
        let first = src_dir.path().join("first.jpg");
        let second = src_dir.path().join("second.jpg");
        fs::write(&first, b"same").unwrap();
        fs::write(&second, b"same").unwrap();

        let ingestor = ImageIngestor::new(image_dir.path());
        let a = ingestor.ingest(&first).unwrap();
        let b = ingestor.ingest(&second).unwrap();

        assert_eq!(a, b);
        assert_eq!(files_in(image_dir.path()), vec![a]);
    }

    #[test]
    fn test_ingest_different_content_gets_different_names() {
        let image_dir = TempDir::new().unwrap();
        let ingestor = ImageIngestor::new(image_dir.path());

        let a = ingestor.ingest_bytes(b"one").unwrap();
        let b = ingestor.ingest_bytes(b"two").unwrap();

        assert_ne!(a, b);
        assert_eq!(files_in(image_dir.path()).len(), 2);
    }

    #[test]
    fn test_ingest_missing_source_fails_without_writing() {
        let image_dir = TempDir::new().unwrap();
        let ingestor = ImageIngestor::new(image_dir.path());

        let result = ingestor.ingest(Path::new("/nonexistent/source.jpg"));

        assert!(matches!(result, Err(ImageError::Io { .. })));
        assert!(files_in(image_dir.path()).is_empty());
    }

    #[test]
    fn test_ingest_source_reads_from_source_dir() {
        let src_dir = TempDir::new().unwrap();
        let image_dir = TempDir::new().unwrap();
        fs::write(src_dir.path().join("a.jpg"), b"jpeg bytes").unwrap();

        let ingestor = ImageIngestor::new(image_dir.path()).with_source_dir(src_dir.path());
        let filename = ingestor.ingest_source("a.jpg").unwrap();

        assert_eq!(filename, ImageIngestor::filename_for(b"jpeg bytes"));
        assert!(image_dir.path().join(&filename).is_file());
    }

    #[test]
    fn test_ingest_source_rejects_paths_outside_source_dir() {
        let root = TempDir::new().unwrap();
        let src_dir = root.path().join("sources");
        let image_dir = root.path().join("images");
        fs::create_dir_all(&src_dir).unwrap();
        fs::write(root.path().join("secret.jpg"), b"secret").unwrap();
        let secret = root.path().join("secret.jpg");

        let ingestor = ImageIngestor::new(&image_dir).with_source_dir(&src_dir);
        for name in [
            secret.to_str().unwrap(),
            "../secret.jpg",
            "nested/a.jpg",
            "secret.toml",
            "",
        ] {
            let result = ingestor.ingest_source(name);
            assert!(
                matches!(result, Err(ImageError::InvalidRequest(_))),
                "{:?} should be rejected",
                name
            );
        }
        assert!(!image_dir.exists());
    }

    #[test]
    fn test_ingest_source_without_source_dir_is_rejected() {
        let src_dir = TempDir::new().unwrap();
        let image_dir = TempDir::new().unwrap();
        fs::write(src_dir.path().join("a.jpg"), b"jpeg bytes").unwrap();

        let ingestor = ImageIngestor::new(image_dir.path());
        let result = ingestor.ingest_source("a.jpg");

        assert!(matches!(result, Err(ImageError::InvalidRequest(_))));
        assert!(files_in(image_dir.path()).is_empty());
    }

    #[test]
    fn test_ingest_creates_image_dir() {
        let root = TempDir::new().unwrap();
        let image_dir = root.path().join("nested").join("images");
        let ingestor = ImageIngestor::new(&image_dir);

        let filename = ingestor.ingest_bytes(b"data").unwrap();

        assert!(image_dir.join(filename).is_file());
    }
}

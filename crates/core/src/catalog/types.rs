//! Types for the item catalog.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::image::is_image_filename;

/// A persisted marketplace item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    /// Backend-assigned identifier, stable once assigned.
    ///
    /// Older JSON documents carry no `id`; those deserialize as 0 and are
    /// renumbered when the document is loaded.
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub category: String,
    /// Content-addressed image filename (`<sha256>.jpg`) or `default.jpg`.
    pub image: String,
}

impl CatalogRecord {
    /// True if `keyword` is a case-sensitive substring of any field.
    ///
    /// The id is compared in its decimal form. An empty keyword matches.
    pub fn matches(&self, keyword: &str) -> bool {
        self.id.to_string().contains(keyword)
            || self.name.contains(keyword)
            || self.category.contains(keyword)
            || self.image.contains(keyword)
    }
}

/// A record that has not been assigned an identifier yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecord {
    pub name: String,
    pub category: String,
    /// Must come from the image ingestor, never from raw client input.
    pub image: String,
}

impl NewRecord {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        image: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            image: image.into(),
        }
    }

    /// Reject image values that could point outside the image directory.
    pub(crate) fn validate(&self) -> Result<(), CatalogError> {
        if !is_image_filename(&self.image) {
            return Err(CatalogError::InvalidRequest(format!(
                "image must be a bare .jpg filename, got {:?}",
                self.image
            )));
        }
        Ok(())
    }

    pub(crate) fn into_record(self, id: i64) -> CatalogRecord {
        CatalogRecord {
            id,
            name: self.name,
            category: self.category,
            image: self.image,
        }
    }
}

/// Errors for catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The store file could not be read or written.
    #[error("I/O error: {0}")]
    Io(String),

    /// The backing database could not be opened or queried.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Persisted data failed to parse.
    #[error("Corrupt store: {0}")]
    CorruptStore(String),

    #[error("Item not found: {0}")]
    NotFound(i64),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jacket() -> CatalogRecord {
        CatalogRecord {
            id: 12,
            name: "jacket".to_string(),
            category: "fashion".to_string(),
            image: "deadbeef.jpg".to_string(),
        }
    }

    #[test]
    fn test_matches_each_field() {
        let record = jacket();
        assert!(record.matches("jack"));
        assert!(record.matches("fash"));
        assert!(record.matches("beef"));
        assert!(record.matches("12"));
        assert!(record.matches("1"));
        assert!(!record.matches("shoes"));
    }

    #[test]
    fn test_matches_is_case_sensitive() {
        let record = jacket();
        assert!(!record.matches("Jacket"));
        assert!(!record.matches("FASHION"));
    }

    #[test]
    fn test_empty_keyword_matches() {
        assert!(jacket().matches(""));
    }

    #[test]
    fn test_record_without_id_deserializes_as_zero() {
        let json = r#"{"name": "jacket", "category": "fashion", "image": "a.jpg"}"#;
        let record: CatalogRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, 0);
        assert_eq!(record.name, "jacket");
    }

    #[test]
    fn test_new_record_validation() {
        assert!(NewRecord::new("a", "b", "abc.jpg").validate().is_ok());
        assert!(NewRecord::new("a", "b", "default.jpg").validate().is_ok());

        for bad in ["abc.png", "../abc.jpg", "dir/abc.jpg", "", ".jpg/.."] {
            let result = NewRecord::new("a", "b", bad).validate();
            assert!(
                matches!(result, Err(CatalogError::InvalidRequest(_))),
                "expected {:?} to be rejected",
                bad
            );
        }
    }
}

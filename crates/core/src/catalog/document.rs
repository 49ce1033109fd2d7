//! JSON document catalog: the whole collection in one file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use super::{CatalogError, CatalogRecord, CatalogStore, NewRecord};

/// On-disk shape: `{"items": [...]}`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Collection {
    #[serde(default)]
    items: Vec<CatalogRecord>,
}

/// Catalog persisted as a single JSON document.
///
/// Every operation, reads included, holds `gate` for its full
/// read(-modify-write) cycle, so callers never see a lost update or a
/// view older than the last successful `create`.
pub struct DocumentCatalog {
    path: PathBuf,
    gate: Mutex<()>,
}

impl DocumentCatalog {
    /// Open the document at `path`, creating an empty one if absent.
    ///
    /// Existing content is not parsed here; a corrupt document surfaces as
    /// [`CatalogError::CorruptStore`] on first use instead.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, CatalogError> {
        let path = path.into();
        let dir = parent_dir(&path);
        fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;

        if !path.exists() {
            write_collection(&path, &Collection::default())?;
            info!(path = %path.display(), "created empty item document");
        }

        Ok(Self {
            path,
            gate: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // The gate guards no data, and the file is only ever replaced by
        // rename, so a panicked holder leaves nothing inconsistent.
        self.gate.lock().unwrap_or_else(|poisoned| {
            warn!("document catalog gate was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

impl CatalogStore for DocumentCatalog {
    fn create(&self, record: NewRecord) -> Result<CatalogRecord, CatalogError> {
        record.validate()?;

        let _guard = self.lock();
        let mut collection = read_collection(&self.path)?;
        let record = record.into_record(next_id(&collection.items)?);
        collection.items.push(record.clone());
        write_collection(&self.path, &collection)?;

        info!(id = record.id, name = %record.name, image = %record.image, "created item");
        Ok(record)
    }

    fn list(&self) -> Result<Vec<CatalogRecord>, CatalogError> {
        let _guard = self.lock();
        Ok(read_collection(&self.path)?.items)
    }

    fn get(&self, id: i64) -> Result<CatalogRecord, CatalogError> {
        let _guard = self.lock();
        read_collection(&self.path)?
            .items
            .into_iter()
            .find(|r| r.id == id)
            .ok_or(CatalogError::NotFound(id))
    }

    fn search(&self, keyword: &str) -> Result<Vec<CatalogRecord>, CatalogError> {
        let _guard = self.lock();
        let mut items = read_collection(&self.path)?.items;
        items.retain(|r| r.matches(keyword));
        Ok(items)
    }

    fn backend_name(&self) -> &'static str {
        "document"
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

fn io_error(path: &Path, e: std::io::Error) -> CatalogError {
    CatalogError::Io(format!("{}: {}", path.display(), e))
}

fn max_id(items: &[CatalogRecord]) -> i64 {
    items.iter().map(|r| r.id).max().unwrap_or(0).max(0)
}

fn id_after(id: i64) -> Result<i64, CatalogError> {
    id.checked_add(1).ok_or_else(|| {
        CatalogError::CorruptStore(format!("item id {} leaves no room for another id", id))
    })
}

fn next_id(items: &[CatalogRecord]) -> Result<i64, CatalogError> {
    id_after(max_id(items))
}

/// Give records written without an id (legacy documents) a stable one,
/// continuing after the largest id present. A document with no ids at all
/// ends up numbered by position, 1-based.
fn assign_missing_ids(items: &mut [CatalogRecord]) -> Result<(), CatalogError> {
    let mut last = max_id(items);
    for record in items.iter_mut().filter(|r| r.id <= 0) {
        last = id_after(last)?;
        record.id = last;
    }
    Ok(())
}

fn read_collection(path: &Path) -> Result<Collection, CatalogError> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "item document missing, treating as empty");
            return Ok(Collection::default());
        }
        Err(e) => return Err(io_error(path, e)),
    };

    let mut collection: Collection = serde_json::from_slice(&data)
        .map_err(|e| CatalogError::CorruptStore(format!("{}: {}", path.display(), e)))?;
    assign_missing_ids(&mut collection.items)?;
    Ok(collection)
}

/// Replace the document atomically: the old file stays intact until the
/// new one has been fully written and renamed over it.
fn write_collection(path: &Path, collection: &Collection) -> Result<(), CatalogError> {
    let data = serde_json::to_vec(collection)
        .map_err(|e| CatalogError::Io(format!("failed to encode items: {}", e)))?;

    let dir = parent_dir(path);
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| io_error(dir, e))?;
    tmp.write_all(&data)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| io_error(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| io_error(path, e.error))?;
    Ok(())
}

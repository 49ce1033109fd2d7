//! SQLite-backed item catalog implementation.

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OpenFlags, Params};
use tracing::info;

use super::{CatalogError, CatalogRecord, CatalogStore, NewRecord};

const SELECT_ITEMS: &str = "SELECT id, name, category, image FROM items";

/// SQLite-backed item catalog.
///
/// Holds only the database path. Each operation opens its own connection
/// and drops it before returning, on success and error alike.
pub struct SqliteCatalog {
    path: PathBuf,
}

impl SqliteCatalog {
    /// Create a new SQLite catalog, creating the database file and table if needed.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, CatalogError> {
        let path = path.into();
        if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .map_err(|e| CatalogError::StoreUnavailable(format!("{}: {}", dir.display(), e)))?;
        }

        let conn = Connection::open(&path).map_err(unavailable)?;
        Self::initialize_schema(&conn)?;
        info!(path = %path.display(), "item database ready");

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn initialize_schema(conn: &Connection) -> Result<(), CatalogError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                category TEXT NOT NULL,
                image TEXT NOT NULL
            );
            "#,
        )
        .map_err(unavailable)?;

        Ok(())
    }

    /// Open a connection to the existing database.
    ///
    /// No CREATE flag: a database removed after startup is reported as
    /// unavailable rather than silently recreated empty.
    fn connect(&self) -> Result<Connection, CatalogError> {
        Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(unavailable)
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<CatalogRecord> {
        Ok(CatalogRecord {
            id: row.get(0)?,
            name: row.get(1)?,
            category: row.get(2)?,
            image: row.get(3)?,
        })
    }

    fn query_records<P: Params>(
        conn: &Connection,
        sql: &str,
        params: P,
    ) -> Result<Vec<CatalogRecord>, CatalogError> {
        let mut stmt = conn.prepare(sql).map_err(unavailable)?;
        let rows = stmt
            .query_map(params, Self::row_to_record)
            .map_err(query_error)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(query_error)?);
        }
        Ok(records)
    }
}

fn unavailable(e: rusqlite::Error) -> CatalogError {
    CatalogError::StoreUnavailable(e.to_string())
}

/// Decode failures mean the stored rows are bad; anything else is the engine.
fn query_error(e: rusqlite::Error) -> CatalogError {
    match e {
        rusqlite::Error::InvalidColumnType(..)
        | rusqlite::Error::FromSqlConversionFailure(..)
        | rusqlite::Error::IntegralValueOutOfRange(..) => CatalogError::CorruptStore(e.to_string()),
        _ => unavailable(e),
    }
}

impl CatalogStore for SqliteCatalog {
    fn create(&self, record: NewRecord) -> Result<CatalogRecord, CatalogError> {
        record.validate()?;

        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO items (name, category, image) VALUES (?1, ?2, ?3)",
            params![&record.name, &record.category, &record.image],
        )
        .map_err(unavailable)?;
        let record = record.into_record(conn.last_insert_rowid());

        info!(id = record.id, name = %record.name, image = %record.image, "created item");
        Ok(record)
    }

    fn list(&self) -> Result<Vec<CatalogRecord>, CatalogError> {
        let conn = self.connect()?;
        Self::query_records(&conn, &format!("{} ORDER BY id", SELECT_ITEMS), [])
    }

    fn get(&self, id: i64) -> Result<CatalogRecord, CatalogError> {
        let conn = self.connect()?;
        conn.query_row(
            &format!("{} WHERE id = ?1", SELECT_ITEMS),
            params![id],
            Self::row_to_record,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => CatalogError::NotFound(id),
            _ => query_error(e),
        })
    }

    fn search(&self, keyword: &str) -> Result<Vec<CatalogRecord>, CatalogError> {
        // Every row contains the empty string.
        if keyword.is_empty() {
            return self.list();
        }

        // instr() rather than LIKE: LIKE folds ASCII case and treats % and _
        // in the keyword as wildcards.
        let conn = self.connect()?;
        Self::query_records(
            &conn,
            &format!(
                "{} WHERE instr(CAST(id AS TEXT), ?1) > 0
                    OR instr(name, ?1) > 0
                    OR instr(category, ?1) > 0
                    OR instr(image, ?1) > 0
                 ORDER BY id",
                SELECT_ITEMS
            ),
            params![keyword],
        )
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}

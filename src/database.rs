use log::{debug, info};
use rusqlite::{Connection, OpenFlags, TransactionBehavior};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::SchemaPatchError;

/// One row of `pragma_table_info` for a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    pub cid: i64,
    pub name: String,
    pub decl_type: String,
    pub not_null: bool,
    pub default_value: Option<String>,
    pub primary_key: bool,
}

pub struct Database {
    conn: Connection,
    path: PathBuf,
}

impl Database {
    /// Opens an existing database file for reading and writing.
    ///
    /// The file is never created: a missing or unreadable database is a
    /// `StorageConnection` error instead of a fresh empty database.
    pub fn open(path: &Path) -> Result<Self, SchemaPatchError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let to_storage_error = |source| SchemaPatchError::StorageConnection {
            path: path.to_path_buf(),
            source,
        };

        let conn = Connection::open_with_flags(path, flags).map_err(to_storage_error)?;

        // SQLite reads the header lazily; force it so a non-database file
        // fails here rather than at the first statement.
        conn.query_row("PRAGMA schema_version", [], |row| row.get::<_, i64>(0))
            .map_err(to_storage_error)?;

        info!("Database opened at: {}", path.display());

        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn conn_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Runs `f` inside a `BEGIN IMMEDIATE` transaction, committing only if it
    /// returns `Ok`. The write lock is taken up front so a concurrent writer
    /// fails the run before any column is touched.
    pub fn immediate_transaction<T, F>(conn: &mut Connection, f: F) -> Result<T, SchemaPatchError>
    where
        F: FnOnce(&mut rusqlite::Transaction<'_>) -> Result<T, SchemaPatchError>,
    {
        let mut tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = f(&mut tx)?;
        tx.commit()?;
        Ok(value)
    }

    /// Table names compare case-insensitively, as SQLite resolves them.
    pub fn table_exists(conn: &Connection, table: &str) -> Result<bool, SchemaPatchError> {
        let count: i64 = conn.query_row(
            "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE",
            [table],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }

    pub fn columns(conn: &Connection, table: &str) -> Result<Vec<ColumnInfo>, SchemaPatchError> {
        let mut stmt = conn.prepare(
            "SELECT cid, name, type, \"notnull\", dflt_value, pk
             FROM pragma_table_info(?1)
             ORDER BY cid",
        )?;

        let columns = stmt
            .query_map([table], |row| {
                Ok(ColumnInfo {
                    cid: row.get(0)?,
                    name: row.get(1)?,
                    decl_type: row.get(2)?,
                    not_null: row.get::<_, i64>(3)? != 0,
                    default_value: row.get(4)?,
                    primary_key: row.get::<_, i64>(5)? != 0,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Table '{}' has {} columns", table, columns.len());

        Ok(columns)
    }

    pub fn column_names(conn: &Connection, table: &str) -> Result<Vec<String>, SchemaPatchError> {
        Ok(Self::columns(conn, table)?
            .into_iter()
            .map(|c| c.name)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn seeded_db() -> (tempfile::TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("planner.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE contacts (
                id INTEGER PRIMARY KEY,
                name VARCHAR(120) NOT NULL,
                notes TEXT DEFAULT 'none'
            );",
        )
        .unwrap();
        (dir, path)
    }

    #[test]
    fn test_open_missing_file_is_storage_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.db");

        let result = Database::open(&missing);
        assert!(matches!(
            result,
            Err(SchemaPatchError::StorageConnection { .. })
        ));
        assert!(!missing.exists(), "open must not create the database file");
    }

    #[test]
    fn test_open_non_database_file_is_storage_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("planner.db");
        std::fs::write(&path, vec![b'x'; 4096]).unwrap();

        let result = Database::open(&path);
        assert!(matches!(
            result,
            Err(SchemaPatchError::StorageConnection { .. })
        ));
    }

    #[test]
    fn test_open_does_not_create_from_uri() {
        let dir = tempdir().unwrap();
        let created = dir.path().join("x.db");
        let uri = format!("file:{}?mode=rwc", created.display());

        let result = Database::open(Path::new(&uri));
        assert!(matches!(
            result,
            Err(SchemaPatchError::StorageConnection { .. })
        ));
        assert!(!created.exists());
    }

    #[test]
    fn test_table_exists_is_case_insensitive() {
        let (_dir, path) = seeded_db();
        let db = Database::open(&path).unwrap();

        assert!(Database::table_exists(db.conn(), "contacts").unwrap());
        assert!(Database::table_exists(db.conn(), "CONTACTS").unwrap());
        assert!(!Database::table_exists(db.conn(), "ghost").unwrap());
    }

    #[test]
    fn test_columns_reports_structure() {
        let (_dir, path) = seeded_db();
        let db = Database::open(&path).unwrap();

        let columns = Database::columns(db.conn(), "contacts").unwrap();
        assert_eq!(columns.len(), 3);

        assert_eq!(columns[0].name, "id");
        assert!(columns[0].primary_key);

        assert_eq!(columns[1].name, "name");
        assert_eq!(columns[1].decl_type, "VARCHAR(120)");
        assert!(columns[1].not_null);

        assert_eq!(columns[2].default_value.as_deref(), Some("'none'"));
        assert!(!columns[2].not_null);
    }

    #[test]
    fn test_columns_of_missing_table_is_empty() {
        let (_dir, path) = seeded_db();
        let db = Database::open(&path).unwrap();

        assert!(Database::columns(db.conn(), "ghost").unwrap().is_empty());
    }

    #[test]
    fn test_immediate_transaction_rolls_back_on_error() {
        let (_dir, path) = seeded_db();
        let mut db = Database::open(&path).unwrap();

        let result: Result<(), SchemaPatchError> =
            Database::immediate_transaction(db.conn_mut(), |tx| {
                tx.execute("ALTER TABLE contacts ADD COLUMN city TEXT", [])?;
                Err(SchemaPatchError::Error("abort".to_string()))
            });
        assert!(result.is_err());

        let names = Database::column_names(db.conn(), "contacts").unwrap();
        assert_eq!(names, vec!["id", "name", "notes"]);
    }
}

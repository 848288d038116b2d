use rusqlite::Error as RusqliteError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::migrator::ColumnFailure;

#[derive(Error, Debug)]
pub enum SchemaPatchError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] RusqliteError),

    #[error("Could not open database '{}': {source}", .path.display())]
    StorageConnection {
        path: PathBuf,
        #[source]
        source: RusqliteError,
    },

    #[error("Table '{0}' does not exist")]
    TableNotFound(String),

    #[error("{} column(s) could not be added to '{table}': {}", .failures.len(), ColumnFailure::join(.failures))]
    SchemaAlteration {
        table: String,
        failures: Vec<ColumnFailure>,
    },

    #[error("Invalid column spec: {0}")]
    InvalidColumnSpec(String),

    #[error("Unknown migration plan '{0}'")]
    UnknownPlan(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Error: {0}")]
    Error(String), // Allows custom application errors
}

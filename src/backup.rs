use chrono::{DateTime, Local};
use log::info;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::SchemaPatchError;

const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirOutcome {
    Created,
    AlreadyExists,
}

pub struct Backup;

impl Backup {
    /// Copies the database file to `<file name>.backup_<YYYYmmdd_HHMMSS>`,
    /// inside `backup_dir` when given, otherwise next to the database.
    pub fn backup_database(
        db_path: &Path,
        backup_dir: Option<&Path>,
        now: DateTime<Local>,
    ) -> Result<PathBuf, SchemaPatchError> {
        if !db_path.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Database '{}' not found", db_path.display()),
            )
            .into());
        }

        let file_name = db_path
            .file_name()
            .ok_or_else(|| {
                SchemaPatchError::Error(format!(
                    "Database path '{}' has no file name",
                    db_path.display()
                ))
            })?
            .to_string_lossy();

        let backup_name = format!(
            "{}.backup_{}",
            file_name,
            now.format(BACKUP_TIMESTAMP_FORMAT)
        );

        let target_dir = match backup_dir {
            Some(dir) => {
                fs::create_dir_all(dir)?;
                dir.to_path_buf()
            }
            None => db_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        };

        let backup_path = target_dir.join(backup_name);
        fs::copy(db_path, &backup_path)?;
        info!("Created backup: {}", backup_path.display());

        Ok(backup_path)
    }

    /// Makes sure `root/relative` exists as a directory.
    pub fn ensure_asset_dir(
        root: &Path,
        relative: &str,
    ) -> Result<(PathBuf, DirOutcome), SchemaPatchError> {
        let dir = root.join(relative);

        if dir.is_dir() {
            return Ok((dir, DirOutcome::AlreadyExists));
        }
        if dir.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("'{}' exists and is not a directory", dir.display()),
            )
            .into());
        }

        fs::create_dir_all(&dir)?;
        info!("Created directory: {}", dir.display());

        Ok((dir, DirOutcome::Created))
    }
}

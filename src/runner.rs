use chrono::Local;
use log::{debug, info};
use std::path::PathBuf;

use crate::backup::{Backup, DirOutcome};
use crate::config::Config;
use crate::database::{ColumnInfo, Database};
use crate::error::SchemaPatchError;
use crate::migrator::{Backfill, ColumnSpec, MigrationReport, Migrator};
use crate::plans::MigrationPlan;

/// What to migrate: one table, its columns, and the optional extras a plan
/// carries.
#[derive(Debug, Clone)]
pub struct MigrationRequest {
    pub table: String,
    pub columns: Vec<ColumnSpec>,
    pub backfill: Option<Backfill>,
    pub asset_dir: Option<String>,
}

impl MigrationRequest {
    pub fn from_plan(plan: &MigrationPlan) -> Self {
        Self {
            table: plan.table.to_owned(),
            columns: plan.column_specs(),
            backfill: plan.backfill,
            asset_dir: plan.asset_dir.map(str::to_owned),
        }
    }

    pub fn ad_hoc(table: impl Into<String>, columns: Vec<ColumnSpec>) -> Self {
        Self {
            table: table.into(),
            columns,
            backfill: None,
            asset_dir: None,
        }
    }
}

/// Where to migrate. Built from `Config` for the CLI, or directly in tests.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub db_path: PathBuf,
    pub backup: bool,
    pub backup_dir: Option<PathBuf>,
    pub assets_root: PathBuf,
}

impl RunOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            db_path: config.database.path.clone(),
            backup: config.backup.enabled,
            backup_dir: config.backup.dir.clone(),
            assets_root: config.assets.root.clone(),
        }
    }
}

#[derive(Debug)]
pub struct RunSummary {
    pub db_path: PathBuf,
    pub backup: Option<PathBuf>,
    pub report: MigrationReport,
    pub asset_dir: Option<(PathBuf, DirOutcome)>,
    pub structure: Vec<ColumnInfo>,
}

#[derive(Debug)]
pub enum RunOutcome {
    Cancelled,
    Completed(RunSummary),
}

pub struct Runner;

impl Runner {
    /// Open, back up, migrate, then ensure the asset directory.
    ///
    /// `proceed` is asked once, before anything is opened or copied. Returning
    /// `false` cancels the run with no side effects.
    pub fn run<F>(
        request: &MigrationRequest,
        options: &RunOptions,
        proceed: F,
    ) -> Result<RunOutcome, SchemaPatchError>
    where
        F: FnOnce(&MigrationRequest) -> bool,
    {
        if !proceed(request) {
            info!("Migration of '{}' cancelled", request.table);
            return Ok(RunOutcome::Cancelled);
        }

        let mut db = Database::open(&options.db_path)?;

        let backup = if options.backup {
            Some(Backup::backup_database(
                db.path(),
                options.backup_dir.as_deref(),
                Local::now(),
            )?)
        } else {
            debug!("Backup disabled");
            None
        };

        let report = Migrator::ensure_columns_then(
            db.conn_mut(),
            &request.table,
            &request.columns,
            request.backfill.as_ref(),
        )?;

        let asset_dir = match &request.asset_dir {
            Some(relative) => Some(Backup::ensure_asset_dir(&options.assets_root, relative)?),
            None => None,
        };

        let structure = Database::columns(db.conn(), &request.table)?;

        Ok(RunOutcome::Completed(RunSummary {
            db_path: db.path().to_path_buf(),
            backup,
            report,
            asset_dir,
            structure,
        }))
    }
}

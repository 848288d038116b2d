use log::{info, warn, Level};
use logging_timer::timer;
use rusqlite::{Connection, Transaction};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::database::Database;
use crate::error::SchemaPatchError;

/// A column to ensure on a table: a name plus the type descriptor that is
/// spliced verbatim after the name in `ALTER TABLE ... ADD COLUMN`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
    name: String,
    col_type: String,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, col_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            col_type: col_type.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn col_type(&self) -> &str {
        &self.col_type
    }

    /// Checks the spec before it is spliced into SQL. Returns the reason the
    /// spec is rejected, if any.
    fn validate(&self) -> Result<(), String> {
        if !is_identifier(&self.name) {
            return Err(format!("'{}' is not a valid column name", self.name));
        }

        let col_type = self.col_type.trim();
        if col_type.is_empty() {
            return Err("empty type descriptor".to_string());
        }
        if col_type.contains(';') || col_type.contains("--") || col_type.contains("/*") {
            return Err(format!(
                "type descriptor '{}' contains a statement separator or comment",
                col_type
            ));
        }

        Ok(())
    }
}

impl fmt::Display for ColumnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.col_type)
    }
}

/// Parses `name:TYPE`. Only the first `:` separates, so the type may contain
/// colons of its own. The type may be empty here; the migrator reports it.
impl FromStr for ColumnSpec {
    type Err = SchemaPatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, col_type) = s.split_once(':').ok_or_else(|| {
            SchemaPatchError::InvalidColumnSpec(format!("expected NAME:TYPE, got '{}'", s))
        })?;

        let name = name.trim();
        if name.is_empty() {
            return Err(SchemaPatchError::InvalidColumnSpec(format!(
                "missing column name in '{}'",
                s
            )));
        }

        Ok(ColumnSpec::new(name, col_type.trim()))
    }
}

/// A data fix-up statement run after the columns of a plan are in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backfill {
    pub label: &'static str,
    pub sql: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnFailure {
    pub column: String,
    pub reason: String,
}

impl ColumnFailure {
    pub fn new(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            reason: reason.into(),
        }
    }

    pub fn join(failures: &[ColumnFailure]) -> String {
        failures
            .iter()
            .map(|f| format!("{} ({})", f.column, f.reason))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// What happened to one requested column, in the order it was requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ColumnOutcome {
    Added { column: String },
    Skipped { column: String },
    Failed { column: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackfillOutcome {
    pub label: String,
    pub rows_affected: Option<usize>,
    pub error: Option<String>,
}

/// Outcome of one `ensure_columns` run. Every sequence is in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub table: String,
    pub outcomes: Vec<ColumnOutcome>,
    pub added: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<ColumnFailure>,
    pub backfills: Vec<BackfillOutcome>,
    pub column_count: usize,
}

impl MigrationReport {
    fn new(table: &str) -> Self {
        Self {
            table: table.to_owned(),
            ..Default::default()
        }
    }

    fn record_added(&mut self, column: &str) {
        self.added.push(column.to_owned());
        self.outcomes.push(ColumnOutcome::Added {
            column: column.to_owned(),
        });
    }

    fn record_skipped(&mut self, column: &str) {
        self.skipped.push(column.to_owned());
        self.outcomes.push(ColumnOutcome::Skipped {
            column: column.to_owned(),
        });
    }

    fn record_failed(&mut self, column: &str, reason: String) {
        self.failed.push(ColumnFailure::new(column, reason.clone()));
        self.outcomes.push(ColumnOutcome::Failed {
            column: column.to_owned(),
            reason,
        });
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty() || self.backfills.iter().any(|b| b.error.is_some())
    }

    /// Surfaces per-column failures as a hard error. The changes that did
    /// succeed are already committed by the time a report exists.
    pub fn into_result(self) -> Result<MigrationReport, SchemaPatchError> {
        if self.failed.is_empty() {
            Ok(self)
        } else {
            Err(SchemaPatchError::SchemaAlteration {
                table: self.table,
                failures: self.failed,
            })
        }
    }
}

pub struct Migrator;

impl Migrator {
    /// Ensures every column in `specs` exists on `table`, adding the missing
    /// ones. All additions commit together at the end of the batch.
    ///
    /// Fails with `TableNotFound` before any mutation if the table is absent.
    /// A column that cannot be added is recorded in the report's `failed` list
    /// and the remaining columns are still attempted.
    #[allow(dead_code)]
    pub fn ensure_columns(
        conn: &mut Connection,
        table: &str,
        specs: &[ColumnSpec],
    ) -> Result<MigrationReport, SchemaPatchError> {
        Self::ensure_columns_then(conn, table, specs, None)
    }

    /// Same as `ensure_columns`, then runs `backfill` in the same transaction.
    pub fn ensure_columns_then(
        conn: &mut Connection,
        table: &str,
        specs: &[ColumnSpec],
        backfill: Option<&Backfill>,
    ) -> Result<MigrationReport, SchemaPatchError> {
        if !is_identifier(table) {
            return Err(SchemaPatchError::Error(format!(
                "'{}' is not a valid table name",
                table
            )));
        }

        let _tmr = timer!(Level::Debug; "Migrator::ensure_columns", "{} ({} columns)", table, specs.len());

        Database::immediate_transaction(conn, |tx| {
            if !Database::table_exists(tx, table)? {
                return Err(SchemaPatchError::TableNotFound(table.to_owned()));
            }

            let mut existing = Database::column_names(tx, table)?;
            let mut report = MigrationReport::new(table);

            for spec in specs {
                // SQLite resolves column names case-insensitively. An existing
                // column is skipped whatever type was requested for it.
                if existing.iter().any(|c| c.eq_ignore_ascii_case(spec.name())) {
                    info!("Column '{}.{}' already exists", table, spec.name());
                    report.record_skipped(spec.name());
                    continue;
                }

                if let Err(reason) = spec.validate() {
                    warn!("Rejected column spec '{}' for '{}': {}", spec.name(), table, reason);
                    report.record_failed(spec.name(), reason);
                    continue;
                }

                match Self::add_column(tx, table, spec) {
                    Ok(()) => {
                        info!("Added column '{}.{}' as {}", table, spec.name(), spec.col_type());
                        existing.push(spec.name().to_owned());
                        report.record_added(spec.name());
                    }
                    Err(e) => {
                        warn!("Failed to add column '{}.{}': {}", table, spec.name(), e);
                        report.record_failed(spec.name(), e.to_string());
                    }
                }
            }

            if let Some(backfill) = backfill {
                report.backfills.push(Self::run_backfill(tx, backfill));
            }

            report.column_count = Database::columns(tx, table)?.len();

            Ok(report)
        })
    }

    /// Each column gets its own savepoint so a rejected ALTER leaves nothing
    /// behind while the outer transaction carries on.
    fn add_column(
        tx: &mut Transaction<'_>,
        table: &str,
        spec: &ColumnSpec,
    ) -> Result<(), rusqlite::Error> {
        let sp = tx.savepoint()?;
        let sql = format!(
            "ALTER TABLE \"{}\" ADD COLUMN \"{}\" {}",
            table,
            spec.name(),
            spec.col_type().trim()
        );
        sp.execute(&sql, [])?;
        sp.commit()
    }

    fn run_backfill(tx: &mut Transaction<'_>, backfill: &Backfill) -> BackfillOutcome {
        let result = tx.savepoint().and_then(|sp| {
            let rows = sp.execute(backfill.sql, [])?;
            sp.commit()?;
            Ok(rows)
        });

        match result {
            Ok(rows) => {
                info!("Backfill '{}' updated {} rows", backfill.label, rows);
                BackfillOutcome {
                    label: backfill.label.to_owned(),
                    rows_affected: Some(rows),
                    error: None,
                }
            }
            Err(e) => {
                warn!("Backfill '{}' failed: {}", backfill.label, e);
                BackfillOutcome {
                    label: backfill.label.to_owned(),
                    rows_affected: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

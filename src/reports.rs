use clap::ValueEnum;
use std::fmt::Write as _;

use crate::backup::DirOutcome;
use crate::database::ColumnInfo;
use crate::error::SchemaPatchError;
use crate::migrator::{ColumnOutcome, MigrationReport};
use crate::plans::MigrationPlan;
use crate::runner::RunSummary;
use crate::vocabulary::Vocabulary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

const RULE_WIDTH: usize = 50;

pub struct Reports;

impl Reports {
    pub fn print_summary(summary: &RunSummary, format: ReportFormat) -> Result<(), SchemaPatchError> {
        let out = match format {
            ReportFormat::Text => Self::format_summary(summary),
            ReportFormat::Json => serde_json::to_string_pretty(&summary.report).map_err(|e| {
                SchemaPatchError::Error(format!("Failed to serialize migration report: {}", e))
            })?,
        };
        println!("{}", out);
        Ok(())
    }

    pub fn format_summary(summary: &RunSummary) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Database: {}", summary.db_path.display());

        if let Some(backup) = &summary.backup {
            let _ = writeln!(out, "✓ Created backup: {}", backup.display());
        }

        out.push_str(&Self::format_report(&summary.report));

        if let Some((dir, outcome)) = &summary.asset_dir {
            match outcome {
                DirOutcome::Created => {
                    let _ = writeln!(out, "\n✓ Created directory: {}", dir.display());
                }
                DirOutcome::AlreadyExists => {
                    let _ = writeln!(out, "\n→ Directory already exists: {}", dir.display());
                }
            }
        }

        out.push('\n');
        out.push_str(&Self::format_structure(&summary.report.table, &summary.structure));

        out
    }

    /// One line per column in the order requested, then a summary block.
    pub fn format_report(report: &MigrationReport) -> String {
        let mut out = String::new();

        for outcome in &report.outcomes {
            let _ = match outcome {
                ColumnOutcome::Added { column } => writeln!(out, "✓ Added column: {}", column),
                ColumnOutcome::Skipped { column } => {
                    writeln!(out, "→ Column already exists: {}", column)
                }
                ColumnOutcome::Failed { column, reason } => {
                    writeln!(out, "✗ Error adding column {}: {}", column, reason)
                }
            };
        }
        for backfill in &report.backfills {
            match (&backfill.rows_affected, &backfill.error) {
                (_, Some(err)) => {
                    let _ = writeln!(out, "✗ Could not run '{}': {}", backfill.label, err);
                }
                (Some(rows), None) => {
                    let _ = writeln!(out, "✓ Ran '{}' ({} rows updated)", backfill.label, rows);
                }
                (None, None) => {}
            }
        }

        let _ = writeln!(out, "\n{}", "=".repeat(RULE_WIDTH));
        let _ = writeln!(out, "MIGRATION SUMMARY");
        let _ = writeln!(out, "{}", "=".repeat(RULE_WIDTH));
        if !report.added.is_empty() {
            let _ = writeln!(
                out,
                "✓ Successfully added {} columns: {}",
                report.added.len(),
                report.added.join(", ")
            );
        }
        if !report.skipped.is_empty() {
            let _ = writeln!(
                out,
                "→ Skipped {} existing columns: {}",
                report.skipped.len(),
                report.skipped.join(", ")
            );
        }
        if !report.failed.is_empty() {
            let names: Vec<&str> = report.failed.iter().map(|f| f.column.as_str()).collect();
            let _ = writeln!(
                out,
                "✗ Failed to add {} columns: {}",
                report.failed.len(),
                names.join(", ")
            );
        }
        if report.added.is_empty() && report.skipped.is_empty() && report.failed.is_empty() {
            let _ = writeln!(out, "No columns requested");
        }

        out
    }

    pub fn format_structure(table: &str, columns: &[ColumnInfo]) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "{}", "=".repeat(RULE_WIDTH));
        let _ = writeln!(out, "CURRENT {} TABLE STRUCTURE", table.to_uppercase());
        let _ = writeln!(out, "{}", "=".repeat(RULE_WIDTH));
        for col in columns {
            let nullability = if col.not_null { "NOT NULL" } else { "NULL" };
            let default = col
                .default_value
                .as_ref()
                .map(|d| format!("DEFAULT {}", d))
                .unwrap_or_default();
            let line = format!(
                "{:20} {:15} {:8} {}",
                col.name, col.decl_type, nullability, default
            );
            let _ = writeln!(out, "{}", line.trim_end());
        }
        let _ = writeln!(out, "\n{} table now has {} columns", table, columns.len());

        out
    }

    pub fn format_plans(plans: &[MigrationPlan]) -> String {
        let mut out = String::new();
        for plan in plans {
            let _ = writeln!(
                out,
                "{:20} {:20} {:3} columns  {}",
                plan.name,
                plan.table,
                plan.columns.len(),
                plan.description
            );
        }
        out
    }

    pub fn format_vocabulary(vocabulary: Vocabulary) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}:", vocabulary);
        for entry in vocabulary.entries() {
            let _ = writeln!(out, "  {}", entry);
        }
        out
    }
}

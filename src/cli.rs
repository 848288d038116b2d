use chrono::Local;
use clap::{Args, Parser, Subcommand};
use log::info;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crate::backup::Backup;
use crate::config::Config;
use crate::database::Database;
use crate::error::SchemaPatchError;
use crate::migrator::ColumnSpec;
use crate::plans::{MigrationPlan, PLANS};
use crate::reports::{ReportFormat, Reports};
use crate::runner::{MigrationRequest, RunOptions, RunOutcome, Runner};
use crate::vocabulary::Vocabulary;

const CONFIRM_PROMPT: &str = "This will modify your database. Continue? (yes/no): ";

#[derive(Parser)]
#[command(
    name = "schemapatch",
    version,
    about = "schemapatch: add missing columns to SQLite tables, safely and repeatably"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Default)]
pub struct DbArgs {
    /// Database file (default: [database] path from the configuration)
    #[arg(long = "db", short = 'd')]
    pub db: Option<PathBuf>,
}

impl DbArgs {
    fn resolve(&self, config: &Config) -> PathBuf {
        self.db
            .clone()
            .unwrap_or_else(|| config.database.path.clone())
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub db: DbArgs,

    /// Skip the confirmation prompt
    #[arg(long = "yes", short = 'y', default_value_t = false)]
    pub yes: bool,

    /// Do not back up the database before migrating
    #[arg(long = "no-backup", default_value_t = false)]
    pub no_backup: bool,

    /// Output format for the migration report
    #[arg(long = "format", value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the built-in migration plans
    Plans,

    /// Run a built-in migration plan
    Migrate {
        /// Plan name (see `plans`)
        plan: String,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Ensure arbitrary columns on a table
    Add {
        /// Target table
        #[arg(long = "table", short = 't')]
        table: String,

        /// Column as NAME:TYPE, e.g. city:VARCHAR(100). Repeatable
        #[arg(long = "column", short = 'c', required = true)]
        columns: Vec<ColumnSpec>,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Print the structure of a table
    Inspect {
        #[arg(long = "table", short = 't')]
        table: String,

        #[command(flatten)]
        db: DbArgs,
    },

    /// Back up the database without migrating
    Backup {
        #[command(flatten)]
        db: DbArgs,
    },

    /// Print the fixed vocabularies (all of them if no name is given)
    Vocab {
        name: Option<Vocabulary>,

        /// Check whether VALUE belongs to the named vocabulary
        #[arg(long = "check", requires = "name")]
        check: Option<String>,
    },

    /// Print the effective configuration
    Config,
}

impl Cli {
    pub fn handle_command_line() -> Result<(), SchemaPatchError> {
        let args = Cli::parse();
        let config = Config::get();

        match args.command {
            Command::Plans => {
                print!("{}", Reports::format_plans(PLANS));
                Ok(())
            }
            Command::Migrate { plan, run } => {
                let plan = MigrationPlan::find(&plan)?;
                info!("Running plan '{}' on table '{}'", plan.name, plan.table);
                Self::run_migration(MigrationRequest::from_plan(plan), &run, config)
            }
            Command::Add {
                table,
                columns,
                run,
            } => Self::run_migration(MigrationRequest::ad_hoc(table, columns), &run, config),
            Command::Inspect { table, db } => Self::inspect(&table, &db.resolve(config)),
            Command::Backup { db } => {
                let backup = Backup::backup_database(
                    &db.resolve(config),
                    config.backup.dir.as_deref(),
                    Local::now(),
                )?;
                println!("✓ Created backup: {}", backup.display());
                Ok(())
            }
            Command::Vocab { name, check } => Self::vocab(name, check.as_deref()),
            Command::Config => {
                print!("{}", config.to_toml()?);
                Ok(())
            }
        }
    }

    fn run_migration(
        request: MigrationRequest,
        run: &RunArgs,
        config: &Config,
    ) -> Result<(), SchemaPatchError> {
        let mut options = RunOptions::from_config(config);
        options.db_path = run.db.resolve(config);
        if run.no_backup {
            options.backup = false;
        }

        let outcome = if run.yes {
            Runner::run(&request, &options, |_| true)?
        } else {
            Runner::run(&request, &options, |req| {
                Self::describe(req, &options);
                Self::prompt_yes(CONFIRM_PROMPT, io::stdin().lock(), io::stdout())
            })?
        };

        let summary = match outcome {
            RunOutcome::Cancelled => {
                println!("Cancelled.");
                return Ok(());
            }
            RunOutcome::Completed(summary) => summary,
        };

        Reports::print_summary(&summary, run.format)?;

        if !summary.report.has_failures() {
            if run.format == ReportFormat::Text {
                println!("✅ Migration completed successfully!");
            }
            return Ok(());
        }

        if let Some(backup) = &summary.backup {
            eprintln!("Note: You can restore from backup: {}", backup.display());
        }
        summary.report.into_result()?;
        Err(SchemaPatchError::Error(
            "Columns were added but a backfill failed".to_string(),
        ))
    }

    fn describe(request: &MigrationRequest, options: &RunOptions) {
        println!("Database: {}", options.db_path.display());
        println!(
            "Table: {} ({} columns to ensure)",
            request.table,
            request.columns.len()
        );
        for spec in &request.columns {
            println!("  + {}", spec);
        }
    }

    /// Only a literal `yes` (any case) proceeds. EOF or a read error declines.
    pub fn prompt_yes<R: BufRead, W: Write>(prompt: &str, mut input: R, mut output: W) -> bool {
        let _ = write!(output, "{}", prompt);
        let _ = output.flush();

        let mut line = String::new();
        match input.read_line(&mut line) {
            Ok(_) => line.trim().eq_ignore_ascii_case("yes"),
            Err(_) => false,
        }
    }

    fn inspect(table: &str, db_path: &std::path::Path) -> Result<(), SchemaPatchError> {
        let db = Database::open(db_path)?;
        if !Database::table_exists(db.conn(), table)? {
            return Err(SchemaPatchError::TableNotFound(table.to_owned()));
        }
        let columns = Database::columns(db.conn(), table)?;
        print!("{}", Reports::format_structure(table, &columns));
        Ok(())
    }

    fn vocab(name: Option<Vocabulary>, check: Option<&str>) -> Result<(), SchemaPatchError> {
        use strum::IntoEnumIterator;

        match (name, check) {
            (Some(vocabulary), Some(value)) => {
                if vocabulary.contains(value) {
                    println!("'{}' is a valid {} entry", value, vocabulary);
                    Ok(())
                } else {
                    Err(SchemaPatchError::Error(format!(
                        "'{}' is not a valid {} entry",
                        value, vocabulary
                    )))
                }
            }
            (Some(vocabulary), None) => {
                print!("{}", Reports::format_vocabulary(vocabulary));
                Ok(())
            }
            (None, _) => {
                for vocabulary in Vocabulary::iter() {
                    print!("{}", Reports::format_vocabulary(vocabulary));
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Cursor;

    #[test]
    fn test_cli_parsing_migrate() {
        let cli = Cli::try_parse_from(["schemapatch", "migrate", "contacts", "--yes", "--db", "x.db"])
            .unwrap();

        match cli.command {
            Command::Migrate { plan, run } => {
                assert_eq!(plan, "contacts");
                assert!(run.yes);
                assert!(!run.no_backup);
                assert_eq!(run.db.db, Some(PathBuf::from("x.db")));
                assert_eq!(run.format, ReportFormat::Text);
            }
            _ => panic!("expected migrate"),
        }
    }

    #[test]
    fn test_cli_parsing_add_columns() {
        let cli = Cli::try_parse_from([
            "schemapatch",
            "add",
            "--table",
            "contacts",
            "-c",
            "street_address:VARCHAR(255)",
            "-c",
            "city:VARCHAR(100)",
            "--format",
            "json",
            "--no-backup",
        ])
        .unwrap();

        match cli.command {
            Command::Add {
                table,
                columns,
                run,
            } => {
                assert_eq!(table, "contacts");
                assert_eq!(
                    columns,
                    vec![
                        ColumnSpec::new("street_address", "VARCHAR(255)"),
                        ColumnSpec::new("city", "VARCHAR(100)"),
                    ]
                );
                assert!(run.no_backup);
                assert_eq!(run.format, ReportFormat::Json);
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_cli_parsing_invalid_arguments() {
        assert!(Cli::try_parse_from(["schemapatch"]).is_err(), "a command is required");
        assert!(Cli::try_parse_from(["schemapatch", "add", "--table", "contacts"]).is_err());
        assert!(
            Cli::try_parse_from(["schemapatch", "add", "--table", "t", "-c", "no_type"]).is_err()
        );
        assert!(Cli::try_parse_from(["schemapatch", "vocab", "colors"]).is_err());
        assert!(Cli::try_parse_from(["schemapatch", "vocab", "--check", "low"]).is_err());
    }

    #[test]
    fn test_cli_parsing_vocab() {
        let cli = Cli::try_parse_from(["schemapatch", "vocab", "priority-levels", "--check", "high"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Command::Vocab { name: Some(Vocabulary::PriorityLevels), check: Some(ref v) } if v == "high"
        ));
    }

    #[test]
    fn test_prompt_accepts_only_yes() {
        let mut out = Vec::new();
        assert!(Cli::prompt_yes(CONFIRM_PROMPT, Cursor::new("yes\n"), &mut out));
        assert_eq!(String::from_utf8(out).unwrap(), CONFIRM_PROMPT);

        assert!(Cli::prompt_yes("? ", Cursor::new("  YES  \n"), io::sink()));
        assert!(!Cli::prompt_yes("? ", Cursor::new("y\n"), io::sink()));
        assert!(!Cli::prompt_yes("? ", Cursor::new("no\n"), io::sink()));
        assert!(!Cli::prompt_yes("? ", Cursor::new(""), io::sink()));
    }

    #[test]
    fn test_db_args_resolve() {
        let config = Config::default();
        assert_eq!(DbArgs::default().resolve(&config), config.database.path);

        let args = DbArgs {
            db: Some(PathBuf::from("other.db")),
        };
        assert_eq!(args.resolve(&config), PathBuf::from("other.db"));
    }
}

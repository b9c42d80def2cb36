//! strata-migrate CLI
//!
//! Command-line tool for reconciling a MySQL database with a schema
//! document.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use strata_core::Schema;
use strata_mysql::MySqlConnection;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use strata_migrate::prelude::*;

/// Declarative schema reconciliation for MySQL.
#[derive(Parser)]
#[command(name = "strata-migrate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the JSON schema document.
    #[arg(short, long, env = "STRATA_SCHEMA", default_value = "schema.json")]
    schema: PathBuf,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bring the database in line with the schema.
    Migrate {
        /// Introspect and plan without executing any DDL.
        #[arg(long)]
        dry_run: bool,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List declared tables and their columns' physical types.
    Tables,

    /// Print the CREATE TABLE statement a fresh database would receive.
    Sql {
        /// Schema key of the table.
        table: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let schema = Schema::from_path(&cli.schema)
        .with_context(|| format!("Failed to load schema from {}", cli.schema.display()))?;

    match cli.command {
        Commands::Migrate { dry_run, json } => {
            if dry_run {
                info!("Dry run mode - SQL will be planned but not executed.");
            }

            let conn = MySqlConnection::from_schema(&schema);
            let migrator = Migrator::new(conn, MySqlDialect::new()).dry_run(dry_run);
            let report = migrator.run(&schema).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report, migrator.dialect().name());
            }

            let failed = report.failures().count();
            if failed > 0 {
                bail!("{failed} migration step(s) failed");
            }
        }

        Commands::Tables => {
            if schema.tables().is_empty() {
                info!("No tables declared.");
            }
            for table in schema.tables() {
                println!("{} ({})", table.key(), table.physical_name());
                for (key, column) in table.columns() {
                    println!("  {key:<24} {}", column.sql_type());
                }
            }
        }

        Commands::Sql { table } => {
            let Some(declared) = schema.get_table(&table) else {
                bail!("Table '{table}' is not declared in {}", cli.schema.display());
            };
            let dialect = MySqlDialect::new();
            for operation in plan_table(&dialect, declared, &[]) {
                println!("{};", dialect.generate_sql(&operation));
            }
        }
    }

    Ok(())
}

fn print_report(report: &MigrationReport, dialect: &str) {
    let database = match report.database_outcome {
        DatabaseOutcome::Existing => "exists",
        DatabaseOutcome::Created => "created",
        DatabaseOutcome::Skipped => "missing (not created)",
    };
    println!("\nDatabase {} ({dialect}): {database}", report.database);
    println!("{:-<60}", "");

    if report.steps.iter().all(MigrationStep::is_introspection) && !report.has_failures() {
        println!(" Nothing to do.");
    }
    for step in &report.steps {
        let mark = match step.outcome {
            Outcome::Applied => "[X]",
            Outcome::Planned => "[ ]",
            Outcome::Failed(_) => "[!]",
        };
        println!(" {mark} {}: {}", step.table, step.sql);
        if let Outcome::Failed(detail) = &step.outcome {
            println!("       {detail}");
        }
    }
    println!();
}

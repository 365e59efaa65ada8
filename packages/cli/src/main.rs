#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for the crash dashboard.
//!
//! `serve` starts the HTTP dashboard, `load` fills the warehouse from a
//! crash CSV export and `report` prints every report as text. Without a
//! subcommand an interactive menu offers the same actions.
//!
//! Uses `indicatif-log-bridge` (via [`crash_dashboard_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and progress bars never fight for the terminal.

mod load;
mod report;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use crash_dashboard_cli_utils::MultiProgress;
use crash_dashboard_query::TableRef;
use crash_dashboard_server::BindAddress;
use crash_dashboard_warehouse::{WarehouseConfig, WarehouseError};
use dialoguer::{Confirm, Input, Select};

/// San Jose crash data dashboard.
#[derive(Parser)]
#[command(name = "crash_dashboard")]
#[command(about = "Load, serve and summarise San Jose crash data")]
struct Cli {
    /// Warehouse `DuckDB` file (overrides `CRASH_DB_PATH`).
    #[arg(long, global = true)]
    db_path: Option<PathBuf>,

    /// Source table, optionally schema-qualified (overrides `CRASH_TABLE`).
    #[arg(long, global = true)]
    table: Option<String>,

    /// Subcommand to execute; omit for the interactive menu.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Top-level subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP dashboard (honours `BIND_ADDR` and `PORT`).
    Serve,

    /// Create the crash table and load a CSV export into it.
    Load {
        /// Crash CSV export to load.
        #[arg(long)]
        csv: PathBuf,

        /// Drop and recreate the table instead of appending.
        #[arg(long)]
        replace: bool,
    },

    /// Print a text summary of every report.
    Report {
        /// Years to include, comma-separated (default: all).
        #[arg(long, value_delimiter = ',')]
        years: Option<Vec<i32>>,

        /// Severity categories to include, comma-separated (default: all).
        #[arg(long, value_delimiter = ',')]
        severities: Option<Vec<String>>,
    },
}

/// Actions offered by the interactive menu.
enum Tool {
    Serve,
    Load,
    Report,
}

impl Tool {
    const ALL: &[Self] = &[Self::Serve, Self::Load, Self::Report];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Serve => "Start dashboard server",
            Self::Load => "Load crash CSV into the warehouse",
            Self::Report => "Print report summary",
        }
    }
}

/// Reads the warehouse configuration from the environment and applies the
/// command-line overrides.
fn warehouse_config(
    base: WarehouseConfig,
    db_path: Option<PathBuf>,
    table: Option<&str>,
) -> Result<WarehouseConfig, WarehouseError> {
    let mut config = base;
    if let Some(db_path) = db_path {
        config.db_path = db_path;
    }
    if let Some(table) = table {
        config.table = TableRef::new(table)?;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = crash_dashboard_cli_utils::init_logger();
    let cli = Cli::parse();

    let config = warehouse_config(
        WarehouseConfig::from_env()?,
        cli.db_path,
        cli.table.as_deref(),
    )?;

    match cli.command {
        Some(Commands::Serve) => run_serve(config, false).await?,
        Some(Commands::Load { csv, replace }) => run_load(config, csv, replace, multi).await?,
        Some(Commands::Report { years, severities }) => {
            run_report(config, years, severities).await?;
        }
        None => interactive(config, multi).await?,
    }

    Ok(())
}

async fn interactive(
    config: WarehouseConfig,
    multi: MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("San Jose Crash Data Analysis");
    println!();

    let labels: Vec<&str> = Tool::ALL.iter().map(Tool::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Tool::ALL[idx] {
        Tool::Serve => run_serve(config, true).await,
        Tool::Load => {
            let csv: String = Input::new()
                .with_prompt("Crash CSV file")
                .interact_text()?;
            let replace = Confirm::new()
                .with_prompt(format!("Replace existing table {}?", config.table))
                .default(false)
                .interact()?;
            run_load(config, PathBuf::from(csv), replace, multi).await
        }
        Tool::Report => run_report(config, None, None).await,
    }
}

async fn run_serve(
    config: WarehouseConfig,
    prompt: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // The server uses actix-web's runtime, so we need to run it
    // in a blocking task to avoid nesting tokio runtimes.
    tokio::task::spawn_blocking(move || {
        actix_web::rt::System::new().block_on(async move {
            let bind = BindAddress::from_env();
            if prompt {
                crash_dashboard_server::interactive::run(config, bind).await
            } else {
                crash_dashboard_server::run_server(config, bind).await
            }
        })
    })
    .await??;
    Ok(())
}

async fn run_load(
    config: WarehouseConfig,
    csv: PathBuf,
    replace: bool,
    multi: MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    let summary =
        tokio::task::spawn_blocking(move || load::run(&config, &csv, replace, &multi)).await??;
    println!(
        "Loaded {} crashes ({} skipped)",
        summary.inserted, summary.skipped
    );
    Ok(())
}

async fn run_report(
    config: WarehouseConfig,
    years: Option<Vec<i32>>,
    severities: Option<Vec<String>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let summary =
        tokio::task::spawn_blocking(move || report::run(&config, years, severities)).await??;
    print!("{summary}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn base() -> WarehouseConfig {
        WarehouseConfig::from_lookup(|_| None).unwrap()
    }

    #[test]
    fn flags_override_the_environment() {
        let config = warehouse_config(
            base(),
            Some(PathBuf::from("/tmp/other.duckdb")),
            Some("crash_data.processed_crash_data"),
        )
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/other.duckdb"));
        assert_eq!(
            config.table.to_string(),
            "\"crash_data\".\"processed_crash_data\""
        );
        assert_eq!(config.cache_ttl, Duration::from_secs(3600));
    }

    #[test]
    fn missing_flags_keep_the_environment() {
        assert_eq!(warehouse_config(base(), None, None).unwrap(), base());
    }

    #[test]
    fn invalid_table_flag_is_rejected() {
        assert!(warehouse_config(base(), None, Some("bad\"name")).is_err());
    }

    #[test]
    fn report_years_are_comma_separated() {
        let cli = Cli::try_parse_from([
            "crash_dashboard",
            "report",
            "--years",
            "2021,2022",
            "--severities",
            "Injury",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Report { years, severities }) => {
                assert_eq!(years, Some(vec![2021, 2022]));
                assert_eq!(severities, Some(vec!["Injury".to_string()]));
            }
            _ => panic!("expected report subcommand"),
        }
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from([
            "crash_dashboard",
            "load",
            "--csv",
            "crashes.csv",
            "--replace",
            "--db-path",
            "x.duckdb",
        ])
        .unwrap();
        assert_eq!(cli.db_path, Some(PathBuf::from("x.duckdb")));
        assert!(matches!(
            cli.command,
            Some(Commands::Load { replace: true, .. })
        ));
    }

    #[test]
    fn no_subcommand_means_interactive() {
        let cli = Cli::try_parse_from(["crash_dashboard"]).unwrap();
        assert!(cli.command.is_none());
    }
}

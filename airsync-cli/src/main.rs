//! airsync: reconcile a CSV file against an Airtable table.
//!
//! # Usage
//!
//! ```text
//! airsync --csv <path> --base <id> --table <name>
//!         [--api-key <key>] [--api-url <url>] [--config <path>]
//!         [--format csv|json|table] [--output <path>] [-v]
//! ```
//!
//! The report is read-only: nothing is written to either side.

mod exit_codes;
mod output;
mod run;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use colored::Colorize;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "airsync",
    version,
    about = "Compare a CSV file with an Airtable table and report what each side needs",
    long_about = None,
)]
pub struct Cli {
    /// Local CSV file.
    #[arg(long, value_name = "PATH")]
    pub csv: PathBuf,

    /// Airtable base ID (e.g. appXXXXXXXXXXXXXX).
    #[arg(long, value_name = "ID")]
    pub base: String,

    /// Airtable table name or ID.
    #[arg(long, value_name = "NAME")]
    pub table: String,

    /// Airtable personal access token.
    #[arg(long, env = "AIRTABLE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Airtable API root.
    #[arg(long, env = "AIRTABLE_API_URL", value_name = "URL")]
    pub api_url: Option<String>,

    /// Config file (default: ~/.airsync/config.yaml if present).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Report format.
    #[arg(long, value_enum, default_value_t = FormatArg::Csv)]
    pub format: FormatArg,

    /// Write the report to a file instead of stdout.
    #[arg(long, short, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Debug logging on stderr.
    #[arg(long, short)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Csv,
    Json,
    Table,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    // A missing .env is normal.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run::execute(cli) {
        Ok(()) => ExitCode::from(exit_codes::EXIT_SUCCESS),
        Err(err) => {
            eprintln!("{} {err}", "Error:".red().bold());
            ExitCode::from(exit_codes::for_error(&err))
        }
    }
}

/// Logs go to stderr so stdout carries only the report.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

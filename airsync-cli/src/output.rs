//! Report output: machine formats via `airsync-sync`, plus a terminal table.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use tabled::{builder::Builder, settings::Style};

use airsync_core::SyncConfig;
use airsync_sync::{write_report, write_report_file, ReportFormat, SyncOutcome};

use crate::FormatArg;

pub fn emit(
    outcome: &SyncOutcome,
    config: &SyncConfig,
    format: FormatArg,
    output: Option<&Path>,
) -> Result<()> {
    let column = config.fields.identifier.as_str();
    let machine = match format {
        FormatArg::Csv => ReportFormat::Csv,
        FormatArg::Json => ReportFormat::Json,
        FormatArg::Table => {
            if output.is_some() {
                colored::control::set_override(false);
            }
            let rendered = render_table(outcome, config);
            return match output {
                Some(path) => fs::write(path, &rendered)
                    .with_context(|| format!("failed to write report to {}", path.display())),
                None => {
                    print!("{rendered}");
                    Ok(())
                }
            };
        }
    };

    match output {
        Some(path) => write_report_file(&outcome.rows, column, machine, path)?,
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            write_report(&outcome.rows, column, machine, &mut lock)?;
            lock.flush()?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

fn render_table(outcome: &SyncOutcome, config: &SyncConfig) -> String {
    let summary = outcome.summary();
    let mut out = format!(
        "airsync v{} | {} CSV records | {} Airtable records | {} to change\n",
        env!("CARGO_PKG_VERSION"),
        outcome.csv.len(),
        outcome.remote.len(),
        summary.pending(),
    );

    if outcome.rows.is_empty() {
        out.push_str("No records on either side.\n");
        return out;
    }

    let mut builder = Builder::default();
    builder.push_record(["operation", "target", config.fields.identifier.as_str()]);
    for row in &outcome.rows {
        builder.push_record([
            row.operation.to_string(),
            row.target.map(|t| t.to_string()).unwrap_or_default(),
            row.identifier.to_string(),
        ]);
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    out.push_str(&table.to_string());
    out.push('\n');

    out.push_str(&format!(
        "{} create in Airtable  {} create in CSV  {} update Airtable  {} update CSV  {} unchanged\n",
        summary.create_airtable.to_string().green().bold(),
        summary.create_csv.to_string().green().bold(),
        summary.update_airtable.to_string().yellow().bold(),
        summary.update_csv.to_string().yellow().bold(),
        summary.unchanged.to_string().bright_black().bold(),
    ));
    out
}

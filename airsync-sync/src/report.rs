//! Report Emitter.
//!
//! Writes reconciliation rows as CSV (`operation,target,<identifier column>`)
//! or as a JSON document with a summary. The `--output` variant writes to a
//! sibling temp file first and renames it into place.

use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};

use airsync_core::ReconciliationRow;

use crate::error::{io_err, SyncError};
use crate::reconcile::ReconciliationSummary;

/// Machine-readable report encodings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Csv,
    Json,
}

/// Write `rows` to `out` in `format`.
///
/// `identifier_column` names the third column (CSV) or key (JSON).
pub fn write_report<W: Write>(
    rows: &[ReconciliationRow],
    identifier_column: &str,
    format: ReportFormat,
    out: W,
) -> Result<(), SyncError> {
    match format {
        ReportFormat::Csv => write_csv(rows, identifier_column, out),
        ReportFormat::Json => write_json(rows, identifier_column, out),
    }
}

/// Write the report to `path`, replacing any existing file.
pub fn write_report_file(
    rows: &[ReconciliationRow],
    identifier_column: &str,
    format: ReportFormat,
    path: &Path,
) -> Result<(), SyncError> {
    let tmp = tmp_path(path);
    let file = fs::File::create(&tmp).map_err(|e| io_err(&tmp, e))?;
    if let Err(err) = write_report(rows, identifier_column, format, file) {
        let _ = fs::remove_file(&tmp);
        return Err(err);
    }
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        io_err(path, e)
    })?;
    tracing::debug!(path = %path.display(), rows = rows.len(), "wrote report file");
    Ok(())
}

/// `<path>.airsync.tmp`, built on the raw `OsStr` so non-UTF-8 names survive.
fn tmp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".airsync.tmp");
    PathBuf::from(name)
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

fn write_csv<W: Write>(
    rows: &[ReconciliationRow],
    identifier_column: &str,
    out: W,
) -> Result<(), SyncError> {
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(out);

    wtr.write_record(["operation", "target", identifier_column])?;
    for row in rows {
        let operation = row.operation.to_string();
        let target = row.target.map(|t| t.to_string()).unwrap_or_default();
        wtr.write_record([operation.as_str(), target.as_str(), row.identifier.as_str()])?;
    }
    wtr.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct JsonReport {
    summary: ReconciliationSummary,
    rows: Vec<Map<String, Value>>,
}

fn write_json<W: Write>(
    rows: &[ReconciliationRow],
    identifier_column: &str,
    mut out: W,
) -> Result<(), SyncError> {
    let report = JsonReport {
        summary: ReconciliationSummary::from_rows(rows),
        rows: rows
            .iter()
            .map(|row| {
                let mut obj = Map::new();
                obj.insert("operation".into(), serde_json::to_value(row.operation)?);
                obj.insert("target".into(), serde_json::to_value(row.target)?);
                obj.insert(identifier_column.into(), Value::from(row.identifier.as_str()));
                Ok::<_, serde_json::Error>(obj)
            })
            .collect::<Result<_, _>>()?,
    };
    serde_json::to_writer_pretty(&mut out, &report)?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

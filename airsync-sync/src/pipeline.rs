//! Run entrypoint: load both sides, then reconcile.

use airsync_core::{ReconciliationRow, RecordSet, SyncConfig, Target};
use airsync_loader::{load_csv, AirtableClient};

use crate::reconcile::{reconcile, ReconciliationSummary};
use crate::SyncError;

/// Everything one run produced.
#[derive(Debug)]
pub struct SyncOutcome {
    pub csv: RecordSet,
    pub remote: RecordSet,
    pub rows: Vec<ReconciliationRow>,
}

impl SyncOutcome {
    pub fn summary(&self) -> ReconciliationSummary {
        ReconciliationSummary::from_rows(&self.rows)
    }
}

/// Load the CSV file, then the Airtable table, and reconcile them.
///
/// The CSV side loads first so a broken local file fails before any network
/// request is made.
pub fn run(config: &SyncConfig) -> Result<SyncOutcome, SyncError> {
    let client = AirtableClient::from_config(config);
    run_with_client(config, &client)
}

/// [`run`] with a caller-supplied client.
pub fn run_with_client(
    config: &SyncConfig,
    client: &AirtableClient,
) -> Result<SyncOutcome, SyncError> {
    let csv = load_csv(&config.csv_path, &config.fields).map_err(SyncError::load(Target::Csv))?;
    let remote = client
        .fetch_all(&config.base_id, &config.table, &config.fields)
        .map_err(SyncError::load(Target::Airtable))?;

    let rows = reconcile(&csv, &remote);
    let summary = ReconciliationSummary::from_rows(&rows);
    tracing::info!(
        csv_records = csv.len(),
        airtable_records = remote.len(),
        create_airtable = summary.create_airtable,
        create_csv = summary.create_csv,
        update_airtable = summary.update_airtable,
        update_csv = summary.update_csv,
        unchanged = summary.unchanged,
        "reconciliation complete"
    );

    Ok(SyncOutcome { csv, remote, rows })
}

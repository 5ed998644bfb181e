//! Reconciler: decide, per identifier, what each side is missing.
//!
//! Pure and deterministic. The output covers the union of both identifier
//! sets exactly once, in ascending identifier order.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::Serialize;

use airsync_core::{Identifier, Operation, ReconciliationRow, Record, RecordSet, Target};

/// Compare the CSV and Airtable record sets.
///
/// | present in       | timestamps      | row                |
/// |------------------|-----------------|--------------------|
/// | CSV only         |                 | `CREATE, AIRTABLE` |
/// | Airtable only    |                 | `CREATE, CSV`      |
/// | both             | equal           | `NONE`             |
/// | both             | CSV newer       | `UPDATE, AIRTABLE` |
/// | both             | Airtable newer  | `UPDATE, CSV`      |
pub fn reconcile(csv: &RecordSet, remote: &RecordSet) -> Vec<ReconciliationRow> {
    let identifiers: BTreeSet<&Identifier> = csv.identifiers().chain(remote.identifiers()).collect();

    identifiers
        .into_iter()
        .map(|id| decide(id, csv.get(id.as_str()), remote.get(id.as_str())))
        .collect()
}

fn decide(id: &Identifier, local: Option<&Record>, remote: Option<&Record>) -> ReconciliationRow {
    let identifier = id.clone();
    let Some(local) = local else {
        return ReconciliationRow::create(Target::Csv, identifier);
    };
    let Some(remote) = remote else {
        return ReconciliationRow::create(Target::Airtable, identifier);
    };
    // The stale side receives the update.
    match local.updated_at.cmp(&remote.updated_at) {
        Ordering::Equal => ReconciliationRow::unchanged(identifier),
        Ordering::Greater => ReconciliationRow::update(Target::Airtable, identifier),
        Ordering::Less => ReconciliationRow::update(Target::Csv, identifier),
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Per-(operation, target) counts over a reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationSummary {
    pub create_airtable: usize,
    pub create_csv: usize,
    pub update_airtable: usize,
    pub update_csv: usize,
    pub unchanged: usize,
    pub total: usize,
}

impl ReconciliationSummary {
    pub fn from_rows(rows: &[ReconciliationRow]) -> Self {
        rows.iter().fold(Self::default(), |mut acc, row| {
            match (row.operation, row.target) {
                (Operation::Create, Some(Target::Airtable)) => acc.create_airtable += 1,
                (Operation::Create, Some(Target::Csv)) => acc.create_csv += 1,
                (Operation::Update, Some(Target::Airtable)) => acc.update_airtable += 1,
                (Operation::Update, Some(Target::Csv)) => acc.update_csv += 1,
                _ => acc.unchanged += 1,
            }
            acc.total += 1;
            acc
        })
    }

    /// Rows that call for a change on either side.
    pub fn pending(&self) -> usize {
        self.total - self.unchanged
    }
}

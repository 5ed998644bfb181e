//! # airsync-sync
//!
//! Reconciliation and reporting.
//!
//! Call [`run`] with a resolved [`SyncConfig`](airsync_core::SyncConfig) to
//! load both sides and reconcile them, then [`write_report`] to emit the
//! result.

pub mod error;
pub mod pipeline;
pub mod reconcile;
pub mod report;

pub use error::SyncError;
pub use pipeline::{run, run_with_client, SyncOutcome};
pub use reconcile::{reconcile, ReconciliationSummary};
pub use report::{write_report, write_report_file, ReportFormat};

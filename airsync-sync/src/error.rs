//! Error types for airsync-sync.

use std::path::PathBuf;

use thiserror::Error;

use airsync_core::Target;
use airsync_loader::LoadError;

/// All errors that can arise from a reconciliation run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// One side could not be loaded. The loader's message names the file or table.
    #[error("{source}")]
    Load {
        side: Target,
        #[source]
        source: LoadError,
    },

    /// The CSV report could not be written.
    #[error("report CSV error: {0}")]
    Report(#[from] csv::Error),

    /// The JSON report could not be serialized.
    #[error("report JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing the report failed.
    #[error("cannot write report: {0}")]
    Write(#[from] std::io::Error),

    /// An I/O error on the report file, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SyncError {
    pub(crate) fn load(side: Target) -> impl FnOnce(LoadError) -> SyncError {
        move |source| SyncError::Load { side, source }
    }
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

//! Error types for airsync-loader.

use std::path::PathBuf;

use thiserror::Error;

use airsync_core::RecordError;

/// Coarse classification used for exit codes and operator hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The local file is missing, unreadable, or malformed.
    Parse,
    /// The credential was rejected.
    Auth,
    /// The base or table does not exist (or is invisible to the token).
    NotFound,
    /// Retryable failure that persisted past the retry budget.
    Transient,
    /// Any other remote failure.
    Remote,
}

/// All errors that can arise while loading a record set.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The CSV file could not be opened or read.
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV file is malformed.
    #[error("malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A required column is absent from the CSV header.
    #[error("{path} is missing required column '{column}'")]
    MissingColumn { path: PathBuf, column: String },

    /// A single row or remote record could not be turned into a record.
    #[error("{source_name}, {location}: {source}")]
    Record {
        source_name: String,
        location: String,
        #[source]
        source: RecordError,
    },

    /// HTTP 401/403: the credential was rejected.
    #[error("Airtable rejected the API key for table '{table}' (HTTP {status}): {message}")]
    Auth {
        table: String,
        status: u16,
        message: String,
    },

    /// HTTP 404 (or Airtable's 403 model-not-found).
    #[error("Airtable base '{base}' or table '{table}' not found (HTTP {status}): {message}")]
    NotFound {
        base: String,
        table: String,
        status: u16,
        message: String,
    },

    /// Rate limiting, server errors, or transport failures after all retries.
    #[error("Airtable request for table '{table}' failed after {attempts} attempt(s): {message}")]
    Transient {
        table: String,
        attempts: u32,
        message: String,
    },

    /// A non-retryable HTTP status not covered above.
    #[error("Airtable returned HTTP {status} for table '{table}': {message}")]
    Remote {
        table: String,
        status: u16,
        message: String,
    },

    /// The response body was not a list-records page.
    #[error("unexpected Airtable response for table '{table}': {message}")]
    Decode { table: String, message: String },
}

impl LoadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LoadError::Io { .. }
            | LoadError::Csv { .. }
            | LoadError::MissingColumn { .. }
            | LoadError::Record { .. } => ErrorKind::Parse,
            LoadError::Auth { .. } => ErrorKind::Auth,
            LoadError::NotFound { .. } => ErrorKind::NotFound,
            LoadError::Transient { .. } => ErrorKind::Transient,
            LoadError::Remote { .. } | LoadError::Decode { .. } => ErrorKind::Remote,
        }
    }
}

/// Convenience constructor for [`LoadError::Csv`].
pub(crate) fn csv_err(path: impl Into<PathBuf>, source: csv::Error) -> LoadError {
    LoadError::Csv {
        path: path.into(),
        source,
    }
}

//! Error types for airsync-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::Identifier;

/// Errors raised while building a single record or a record set.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    /// The identifier (email) was blank after trimming.
    #[error("identifier is empty")]
    EmptyIdentifier,

    /// The timestamp cell/field was blank or absent.
    #[error("timestamp is missing")]
    MissingTimestamp,

    /// The timestamp could not be parsed into an instant.
    #[error("invalid timestamp '{value}' (expected RFC 3339, e.g. 2024-01-31T09:30:00Z)")]
    InvalidTimestamp { value: String },

    /// The same normalized identifier appeared twice in one source.
    #[error("duplicate identifier '{identifier}'")]
    DuplicateIdentifier { identifier: Identifier },
}

/// All errors that can arise while resolving run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure reading the config file.
    #[error("failed to read config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load. serde_yaml supplies the line context.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// An explicitly requested config file does not exist.
    #[error("config file not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// Neither `--api-key` nor the environment supplied a credential.
    #[error("Airtable API key not provided; use --api-key or set {env_var}")]
    MissingCredential { env_var: &'static str },

    /// A required value was given but blank.
    #[error("{name} must not be empty")]
    MissingValue { name: &'static str },

    /// Field mapping is unusable (blank or clashing column names).
    #[error("invalid field mapping: {0}")]
    InvalidFields(String),

    /// Retry settings are out of range.
    #[error("invalid retry settings: {0}")]
    InvalidRetry(String),
}

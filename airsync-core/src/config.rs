//! Run configuration.
//!
//! # Layering
//!
//! ```text
//! CLI flag / environment (parsed by clap)
//!   > ~/.airsync/config.yaml (or --config <path>)
//!     > built-in defaults
//! ```
//!
//! # API pattern
//!
//! File lookups under the home directory take an explicit `home: &Path`
//! (`load_at`) so tests run against a `TempDir`. [`SyncConfig`] is built once
//! at startup and passed by reference; nothing reads the environment after it
//! exists.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable holding the Airtable personal access token.
pub const API_KEY_ENV: &str = "AIRTABLE_API_KEY";

/// Environment variable overriding the API root.
pub const API_URL_ENV: &str = "AIRTABLE_API_URL";

pub const DEFAULT_API_URL: &str = "https://api.airtable.com";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ---------------------------------------------------------------------------
// 1. File model
// ---------------------------------------------------------------------------

/// Column / field names used on both sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldMapping {
    pub identifier: String,
    pub timestamp: String,
    /// Copied onto records when present; never compared.
    pub passthrough: Vec<String>,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            identifier: "email".to_string(),
            timestamp: "updated_at".to_string(),
            passthrough: vec!["first_name".to_string(), "last_name".to_string()],
        }
    }
}

/// Bounded exponential backoff for transient remote failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetrySettings {
    /// Total attempts per request, including the first.
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay_ms: 500,
            max_delay_ms: 30_000,
        }
    }
}

/// Contents of the optional YAML config file. Every key may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub fields: FieldMapping,
    pub retry: RetrySettings,
}

// ---------------------------------------------------------------------------
// 2. Load
// ---------------------------------------------------------------------------

/// `<home>/.airsync/config.yaml`. Pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(".airsync").join("config.yaml")
}

/// Load the default config file under `home`; a missing file yields defaults.
pub fn load_at(home: &Path) -> Result<FileConfig, ConfigError> {
    let path = config_path_at(home);
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    read_config(path)
}

/// Load an explicitly named config file; a missing file is an error.
pub fn load_from(path: &Path) -> Result<FileConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }
    read_config(path.to_path_buf())
}

fn read_config(path: PathBuf) -> Result<FileConfig, ConfigError> {
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(source) => return Err(ConfigError::Io { path, source }),
    };
    if contents.trim().is_empty() {
        return Ok(FileConfig::default());
    }
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse { path, source })
}

// ---------------------------------------------------------------------------
// 3. Resolved run configuration
// ---------------------------------------------------------------------------

/// Airtable credential. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Values supplied on the command line (or by clap from the environment).
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub csv_path: PathBuf,
    pub base_id: String,
    pub table: String,
    pub api_key: Option<String>,
    pub api_url: Option<String>,
}

/// Everything a run needs, validated.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub csv_path: PathBuf,
    pub base_id: String,
    pub table: String,
    pub api_key: ApiKey,
    /// API root without a trailing slash.
    pub api_url: String,
    pub timeout: Duration,
    pub fields: FieldMapping,
    pub retry: RetrySettings,
}

impl SyncConfig {
    /// Merge overrides onto the file config and validate the result.
    ///
    /// Fails before anything touches the network.
    pub fn resolve(overrides: ConfigOverrides, file: FileConfig) -> Result<Self, ConfigError> {
        let base_id = required(overrides.base_id, "--base")?;
        let table = required(overrides.table, "--table")?;
        if overrides.csv_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingValue { name: "--csv" });
        }

        let api_key = overrides
            .api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .map(ApiKey)
            .ok_or(ConfigError::MissingCredential {
                env_var: API_KEY_ENV,
            })?;

        let api_url = overrides
            .api_url
            .or(file.api_url)
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        validate_fields(&file.fields)?;
        validate_retry(&file.retry)?;

        Ok(Self {
            csv_path: overrides.csv_path,
            base_id,
            table,
            api_key,
            api_url,
            timeout: Duration::from_secs(file.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            fields: file.fields,
            retry: file.retry,
        })
    }
}

fn required(value: String, name: &'static str) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::MissingValue { name });
    }
    Ok(trimmed.to_string())
}

/// Report columns that precede the identifier column.
const REPORT_COLUMNS: [&str; 2] = ["operation", "target"];

fn validate_fields(fields: &FieldMapping) -> Result<(), ConfigError> {
    if fields.identifier.trim().is_empty() || fields.timestamp.trim().is_empty() {
        return Err(ConfigError::InvalidFields(
            "identifier and timestamp names must not be empty".to_string(),
        ));
    }
    if REPORT_COLUMNS.contains(&fields.identifier.as_str()) {
        return Err(ConfigError::InvalidFields(format!(
            "identifier '{}' collides with a report column",
            fields.identifier
        )));
    }
    if fields.identifier == fields.timestamp {
        return Err(ConfigError::InvalidFields(format!(
            "identifier and timestamp both map to '{}'",
            fields.identifier
        )));
    }
    if let Some(clash) = fields
        .passthrough
        .iter()
        .find(|name| **name == fields.identifier || **name == fields.timestamp)
    {
        return Err(ConfigError::InvalidFields(format!(
            "passthrough field '{clash}' is already the identifier or timestamp"
        )));
    }
    Ok(())
}

fn validate_retry(retry: &RetrySettings) -> Result<(), ConfigError> {
    if retry.max_attempts == 0 {
        return Err(ConfigError::InvalidRetry(
            "max_attempts must be at least 1".to_string(),
        ));
    }
    if retry.base_delay_ms > retry.max_delay_ms {
        return Err(ConfigError::InvalidRetry(format!(
            "base_delay_ms ({}) exceeds max_delay_ms ({})",
            retry.base_delay_ms, retry.max_delay_ms
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overrides() -> ConfigOverrides {
        ConfigOverrides {
            csv_path: PathBuf::from("contacts.csv"),
            base_id: "appBase123".to_string(),
            table: "Contacts".to_string(),
            api_key: Some("pat_secret".to_string()),
            api_url: None,
        }
    }

    #[test]
    fn resolve_applies_defaults() {
        let config = SyncConfig::resolve(overrides(), FileConfig::default()).expect("resolve");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.fields.identifier, "email");
        assert_eq!(config.api_key.expose(), "pat_secret");
    }

    #[test]
    fn flag_api_url_wins_over_file_and_trailing_slash_is_dropped() {
        let mut o = overrides();
        o.api_url = Some("http://127.0.0.1:9000/".to_string());
        let file = FileConfig {
            api_url: Some("https://proxy.internal".to_string()),
            ..FileConfig::default()
        };
        let config = SyncConfig::resolve(o, file).expect("resolve");
        assert_eq!(config.api_url, "http://127.0.0.1:9000");
    }

    #[test]
    fn missing_or_blank_key_is_a_credential_error() {
        for key in [None, Some("   ".to_string())] {
            let mut o = overrides();
            o.api_key = key;
            let err = SyncConfig::resolve(o, FileConfig::default()).unwrap_err();
            assert!(matches!(err, ConfigError::MissingCredential { .. }), "got: {err}");
            assert!(err.to_string().contains(API_KEY_ENV));
        }
    }

    #[test]
    fn blank_table_is_rejected() {
        let mut o = overrides();
        o.table = " ".to_string();
        let err = SyncConfig::resolve(o, FileConfig::default()).unwrap_err();
        assert_eq!(err.to_string(), "--table must not be empty");
    }

    #[test]
    fn debug_output_redacts_key() {
        let config = SyncConfig::resolve(overrides(), FileConfig::default()).expect("resolve");
        let debug = format!("{config:?}");
        assert!(!debug.contains("pat_secret"));
        assert!(debug.contains("ApiKey(***)"));
    }

    #[test]
    fn clashing_field_names_are_rejected() {
        let file = FileConfig {
            fields: FieldMapping {
                identifier: "email".to_string(),
                timestamp: "email".to_string(),
                passthrough: vec![],
            },
            ..FileConfig::default()
        };
        let err = SyncConfig::resolve(overrides(), file).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFields(_)));
    }

    #[test]
    fn identifier_named_like_a_report_column_is_rejected() {
        for name in ["operation", "target"] {
            let file = FileConfig {
                fields: FieldMapping {
                    identifier: name.to_string(),
                    ..FieldMapping::default()
                },
                ..FileConfig::default()
            };
            let err = SyncConfig::resolve(overrides(), file).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidFields(_)), "got: {err}");
            assert!(err.to_string().contains(name));
        }
    }

    #[test]
    fn zero_attempts_is_rejected() {
        let file = FileConfig {
            retry: RetrySettings {
                max_attempts: 0,
                ..RetrySettings::default()
            },
            ..FileConfig::default()
        };
        let err = SyncConfig::resolve(overrides(), file).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRetry(_)));
    }
}

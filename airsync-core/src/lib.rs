//! Domain types and configuration shared by the airsync crates.
//!
//! Public API surface:
//! - [`types`]: identifiers, records, record sets, reconciliation rows
//! - [`timestamp`]: parsing and normalization to UTC seconds
//! - [`config`]: config file loading and [`SyncConfig`] resolution
//! - [`error`]: [`RecordError`], [`ConfigError`]

pub mod config;
pub mod error;
pub mod timestamp;
pub mod types;

pub use config::{ApiKey, ConfigOverrides, FieldMapping, FileConfig, RetrySettings, SyncConfig};
pub use error::{ConfigError, RecordError};
pub use types::{Identifier, Operation, ReconciliationRow, Record, RecordSet, Target};

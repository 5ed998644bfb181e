//! Record loaders for `airsync`.
//!
//! Two sources produce the same [`RecordSet`](airsync_core::RecordSet):
//!
//! - [`csv_source`] reads the local file.
//! - [`airtable`] pages through the remote table over the REST API.
//!
//! Both reject duplicate identifiers and unparseable timestamps with an error
//! that names the offending row or record.

pub mod airtable;
pub mod csv_source;
pub mod error;
pub mod retry;

pub use airtable::AirtableClient;
pub use csv_source::{load_csv, load_csv_from_reader};
pub use error::{ErrorKind, LoadError};
pub use retry::RetryPolicy;

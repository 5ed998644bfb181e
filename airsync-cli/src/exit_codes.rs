//! Exit codes. Scripts rely on these.
//!
//! | Code | Meaning                                           |
//! |------|---------------------------------------------------|
//! | 0    | Success                                           |
//! | 1    | Unexpected failure (e.g. report write)            |
//! | 2    | Usage or configuration error                      |
//! | 3    | Local CSV missing or malformed                    |
//! | 4    | Airtable rejected the credential                  |
//! | 5    | Airtable base or table not found                  |
//! | 6    | Airtable failed after retries, or answered badly  |

use airsync_core::ConfigError;
use airsync_loader::{ErrorKind, LoadError};

pub const EXIT_SUCCESS: u8 = 0;

pub const EXIT_ERROR: u8 = 1;

/// Bad arguments (clap uses 2 as well) or an invalid config file.
pub const EXIT_USAGE: u8 = 2;

pub const EXIT_PARSE: u8 = 3;

pub const EXIT_AUTH: u8 = 4;

pub const EXIT_NOT_FOUND: u8 = 5;

pub const EXIT_REMOTE: u8 = 6;

/// Map an error to its exit code by walking the cause chain.
pub fn for_error(err: &anyhow::Error) -> u8 {
    for cause in err.chain() {
        if cause.downcast_ref::<ConfigError>().is_some() {
            return EXIT_USAGE;
        }
        if let Some(load) = cause.downcast_ref::<LoadError>() {
            return for_kind(load.kind());
        }
    }
    EXIT_ERROR
}

fn for_kind(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::Parse => EXIT_PARSE,
        ErrorKind::Auth => EXIT_AUTH,
        ErrorKind::NotFound => EXIT_NOT_FOUND,
        ErrorKind::Transient | ErrorKind::Remote => EXIT_REMOTE,
    }
}

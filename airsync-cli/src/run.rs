//! Resolve configuration, run the reconciliation, emit the report.

use anyhow::Result;

use airsync_core::{config, ConfigOverrides, FileConfig, SyncConfig};

use crate::{output, Cli};

pub fn execute(cli: Cli) -> Result<()> {
    let file = load_file_config(&cli)?;
    let config = SyncConfig::resolve(
        ConfigOverrides {
            csv_path: cli.csv.clone(),
            base_id: cli.base.clone(),
            table: cli.table.clone(),
            api_key: cli.api_key.clone(),
            api_url: cli.api_url.clone(),
        },
        file,
    )?;
    tracing::debug!(?config, "resolved configuration");

    let outcome = airsync_sync::run(&config)?;
    output::emit(&outcome, &config, cli.format, cli.output.as_deref())
}

/// `--config` must exist; the default location is optional.
fn load_file_config(cli: &Cli) -> Result<FileConfig> {
    if let Some(path) = &cli.config {
        return Ok(config::load_from(path)?);
    }
    match dirs::home_dir() {
        Some(home) => Ok(config::load_at(&home)?),
        None => {
            tracing::debug!("no home directory; using default configuration");
            Ok(FileConfig::default())
        }
    }
}

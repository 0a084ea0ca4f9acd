pub mod retry;

use anyhow::{Context, Result};
use tracing::info;

use crate::models::common::Config;

pub fn load_config(file_name: &str) -> Result<Config> {
    info!("Config path: {}", file_name);

    let settings = config::Config::builder()
        .add_source(config::File::with_name(file_name))
        .build()
        .with_context(|| format!("failed to read config file {file_name}"))?;

    settings
        .try_deserialize()
        .context("failed to parse config")
}

//! Layered configuration for the command-line front end
//!
//! Sources, lowest precedence first: defaults, the JSON config file,
//! `SQL_COACH_*` environment variables (also read from `.env`), then
//! command-line flags applied by the caller.

use std::path::Path;
use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use log::debug;

use sql_coach_core::CoreConfig;

/// Environment variable prefix for configuration keys
pub const ENV_PREFIX: &str = "SQL_COACH";

/// Load configuration from an optional file plus the environment
///
/// Nested keys use a double underscore, e.g. `SQL_COACH_CHALLENGE__RNG_SEED=7`.
pub fn load(config_path: Option<&Path>) -> Result<CoreConfig> {
    let mut builder = Config::builder();

    if let Some(path) = config_path {
        debug!("Reading configuration from {}", path.display());
        builder = builder.add_source(File::from(path).format(FileFormat::Json).required(true));
    }

    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config: CoreConfig = builder
        .build()
        .context("Failed to read configuration")?
        .try_deserialize()
        .context("Invalid configuration")?;

    config.validate()?;
    Ok(config)
}

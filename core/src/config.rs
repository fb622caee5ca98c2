//! Configuration for the core crate
//!
//! This module provides configuration options for the core crate,
//! including challenge generation, SQL parsing and the schema location.

use std::path::PathBuf;
use serde::{Serialize, Deserialize};

use crate::challenge::DEFAULT_MAX_SAMPLE_ROWS;
use crate::error::{CoreError, Result};
use crate::sql::SqlDialect;

/// Challenge configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChallengeConfig {
    /// Seed for table and column picks; entropy when unset
    pub rng_seed: Option<u64>,

    /// Sample rows rendered per table in a challenge
    pub max_sample_rows: usize,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        ChallengeConfig {
            rng_seed: None,
            max_sample_rows: DEFAULT_MAX_SAMPLE_ROWS,
        }
    }
}

/// SQL parsing configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqlConfig {
    /// Dialect used to parse submitted and canonical SQL
    pub dialect: SqlDialect,
}

/// Core configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Challenge configuration
    pub challenge: ChallengeConfig,

    /// SQL parsing configuration
    pub sql: SqlConfig,

    /// Schema file (YAML or JSON)
    pub schema_path: Option<PathBuf>,

    /// Log level
    pub log_level: String,

    /// Whether to enable debug mode
    pub debug_mode: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        CoreConfig {
            challenge: ChallengeConfig::default(),
            sql: SqlConfig::default(),
            schema_path: None,
            log_level: "info".to_string(),
            debug_mode: false,
        }
    }
}

impl CoreConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: &str) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let config = serde_json::from_reader(file)?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_file(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        if self.challenge.max_sample_rows > 100 {
            return Err(CoreError::ConfigError(format!(
                "challenge.max_sample_rows must be at most 100, got {}",
                self.challenge.max_sample_rows
            )));
        }
        Ok(())
    }

    /// Create a development configuration
    pub fn development() -> Self {
        let mut config = Self::default();
        config.debug_mode = true;
        config.log_level = "debug".to_string();
        config
    }

    /// Create a testing configuration with reproducible picks
    pub fn testing() -> Self {
        let mut config = Self::default();
        config.debug_mode = true;
        config.log_level = "debug".to_string();
        config.challenge.rng_seed = Some(42);
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = CoreConfig::default();

        assert_eq!(config.challenge.rng_seed, None);
        assert_eq!(config.challenge.max_sample_rows, 3);
        assert_eq!(config.sql.dialect, SqlDialect::Postgres);
        assert_eq!(config.log_level, "info");
        assert!(config.schema_path.is_none());
        assert!(!config.debug_mode);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets() {
        let config = CoreConfig::development();
        assert!(config.debug_mode);
        assert_eq!(config.log_level, "debug");

        let config = CoreConfig::testing();
        assert_eq!(config.challenge.rng_seed, Some(42));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: CoreConfig = serde_json::from_str(
            r#"{"sql": {"dialect": "generic"}, "challenge": {"rng_seed": 9}}"#,
        ).unwrap();

        assert_eq!(config.sql.dialect, SqlDialect::Generic);
        assert_eq!(config.challenge.rng_seed, Some(9));
        assert_eq!(config.challenge.max_sample_rows, 3);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_validate_rejects_large_sample() {
        let mut config = CoreConfig::default();
        config.challenge.max_sample_rows = 1000;

        match config.validate() {
            Err(CoreError::ConfigError(msg)) => assert!(msg.contains("max_sample_rows")),
            other => panic!("Expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_config_file_io() {
        let mut config = CoreConfig::testing();
        config.schema_path = Some(PathBuf::from("schema.yaml"));

        // Create a temporary file
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap();

        config.to_file(path).unwrap();
        let loaded_config = CoreConfig::from_file(path).unwrap();

        assert_eq!(loaded_config, config);
    }
}

//! Error types for the core crate
//!
//! This module provides a consolidated error type for the core crate,
//! wrapping errors from the schema loader, the configuration layer and
//! the challenge engine.

use thiserror::Error;
use std::io;

use crate::schema::ValidationError;

/// Errors raised by challenge generation and answer validation.
///
/// Every variant is recoverable by the caller; none of the messages carry
/// the stored solution text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChallengeError {
    /// Difficulty string is not one of beginner, intermediate, advanced
    #[error("Invalid difficulty '{0}': expected beginner, intermediate or advanced")]
    InvalidDifficulty(String),

    /// No table has both columns and sample rows
    #[error("No table with sample data is available for this challenge")]
    NoEligibleTable,

    /// No table declares a resolvable foreign key
    #[error("No table with foreign keys is available for a join challenge")]
    NoForeignKeys,

    /// Challenge identifier was blank
    #[error("Challenge id is required")]
    MissingId,

    /// Challenge identifier has no answer store entry
    #[error("Unknown challenge id: {0}")]
    UnknownId(String),

    /// Submitted SQL was blank
    #[error("SQL answer is required")]
    MissingSql,
}

/// Core error type
#[derive(Error, Debug)]
pub enum CoreError {
    /// Challenge engine error
    #[error("Challenge error: {0}")]
    Challenge(#[from] ChallengeError),

    /// Schema validation error
    #[error("Schema validation error: {0}")]
    SchemaValidation(#[from] ValidationError),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// State management error
    #[error("State management error: {0}")]
    StateError(String),
}

/// Result type for the core crate
pub type Result<T> = std::result::Result<T, CoreError>;

/// Convert a string error to a StateError
pub fn to_state_error<E: std::fmt::Display>(err: E) -> CoreError {
    CoreError::StateError(err.to_string())
}

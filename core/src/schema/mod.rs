//! Practice schema
//!
//! This module provides the read-only schema view consumed by the challenge
//! engine and the SQL tools, plus loading from YAML or JSON schema files.

mod validator;

pub use validator::{SchemaValidator, ValidationResult, ValidationError};

use std::fs;
use std::path::Path;
use serde::{Serialize, Deserialize};
use log::{debug, info};

use crate::error::Result;
use crate::models::Table;

/// Read-only view of a relational schema
pub trait SchemaProvider: Send + Sync {
    /// All tables, in declaration order
    fn get_all_tables(&self) -> &[Table];

    /// Look up a table by name (case-insensitive)
    fn get_table_by_name(&self, name: &str) -> Option<&Table> {
        self.get_all_tables()
            .iter()
            .find(|table| table.name.eq_ignore_ascii_case(name))
    }

    /// Whether `column` of `table` is covered by an index or a single-column primary key
    fn has_index(&self, table: &str, column: &str) -> bool {
        self.get_table_by_name(table)
            .map(|t| t.is_indexed(column))
            .unwrap_or(false)
    }
}

/// In-memory schema, validated on construction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Tables in declaration order
    tables: Vec<Table>,
}

impl Schema {
    /// Create a schema from tables after validating them
    pub fn new(tables: Vec<Table>) -> ValidationResult<Self> {
        SchemaValidator::validate_schema(&tables)?;
        Ok(Schema { tables })
    }

    /// Parse and validate a YAML schema document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let raw: Schema = serde_yaml::from_str(yaml)?;
        Ok(Self::new(raw.tables)?)
    }

    /// Parse and validate a JSON schema document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: Schema = serde_json::from_str(json)?;
        Ok(Self::new(raw.tables)?)
    }

    /// Load a schema file; `.yaml`/`.yml` is read as YAML, anything else as JSON
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;

        let is_yaml = path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
            .unwrap_or(false);

        debug!("Loading schema from {} as {}", path.display(), if is_yaml { "YAML" } else { "JSON" });

        let schema = if is_yaml {
            Self::from_yaml_str(&contents)?
        } else {
            Self::from_json_str(&contents)?
        };

        info!("Loaded schema with {} tables from {}", schema.table_count(), path.display());
        Ok(schema)
    }

    /// Number of tables
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }
}

impl SchemaProvider for Schema {
    fn get_all_tables(&self) -> &[Table] {
        &self.tables
    }
}

//! Schema validation
//!
//! This module checks a loaded schema for internal consistency before it is
//! handed to the challenge engine. Table and column names end up verbatim in
//! generated SQL, so they must be plain identifiers.

use std::collections::HashSet;
use thiserror::Error;
use log::warn;

use crate::models::Table;

/// Schema validation error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Table already exists
    #[error("Table {0} already exists")]
    TableAlreadyExists(String),

    /// Table has no columns
    #[error("Table {0} has no columns")]
    EmptyTable(String),

    /// Name is not a plain SQL identifier
    #[error("Invalid identifier '{0}'")]
    InvalidIdentifier(String),

    /// Column already exists
    #[error("Column {0} already exists in table {1}")]
    ColumnAlreadyExists(String, String),

    /// Column does not exist
    #[error("Column {0} does not exist in table {1}")]
    ColumnNotFound(String, String),

    /// Primary key columns not found
    #[error("Primary key column(s) not found in table {0}: {1}")]
    PrimaryKeyColumnNotFound(String, String),

    /// Referenced table not found
    #[error("Referenced table {0} not found for foreign key in table {1}")]
    ReferencedTableNotFound(String, String),

    /// Referenced column not found
    #[error("Referenced column(s) {0} not found in table {1} for foreign key")]
    ReferencedColumnNotFound(String, String),
}

/// Schema validation result
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Schema validator
#[derive(Debug, Clone)]
pub struct SchemaValidator;

impl SchemaValidator {
    /// Whether a name is usable verbatim in generated SQL
    pub fn is_identifier(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    fn check_identifier(name: &str) -> ValidationResult<()> {
        if Self::is_identifier(name) {
            Ok(())
        } else {
            Err(ValidationError::InvalidIdentifier(name.to_string()))
        }
    }

    /// Validate a single table
    pub fn validate_table(table: &Table) -> ValidationResult<()> {
        Self::check_identifier(&table.name)?;

        if table.columns.is_empty() {
            return Err(ValidationError::EmptyTable(table.name.clone()));
        }

        // Check for duplicate column names
        let mut column_names = HashSet::new();
        for column in &table.columns {
            Self::check_identifier(&column.name)?;
            if !column_names.insert(column.name.to_lowercase()) {
                return Err(ValidationError::ColumnAlreadyExists(
                    column.name.clone(),
                    table.name.clone()
                ));
            }
        }

        // Ensure primary key columns exist in the table
        for pk_column in table.primary_key.iter().flatten() {
            if !table.has_column(pk_column) {
                return Err(ValidationError::PrimaryKeyColumnNotFound(
                    table.name.clone(),
                    pk_column.clone()
                ));
            }
        }

        for index in &table.indexes {
            for column in &index.columns {
                if !table.has_column(column) {
                    return Err(ValidationError::ColumnNotFound(
                        column.clone(),
                        table.name.clone()
                    ));
                }
            }
        }

        for row in &table.sample_rows {
            for column in row.columns() {
                if !table.has_column(column) {
                    warn!("Sample row in table {} has unknown column {}", table.name, column);
                }
            }
        }

        Ok(())
    }

    /// Validate all tables and the foreign keys between them
    pub fn validate_schema(tables: &[Table]) -> ValidationResult<()> {
        let mut table_names = HashSet::new();
        for table in tables {
            Self::validate_table(table)?;
            if !table_names.insert(table.name.to_lowercase()) {
                return Err(ValidationError::TableAlreadyExists(table.name.clone()));
            }
        }

        for table in tables {
            for fk in &table.foreign_keys {
                if !table.has_column(&fk.column) {
                    return Err(ValidationError::ColumnNotFound(
                        fk.column.clone(),
                        table.name.clone()
                    ));
                }

                let referenced = tables.iter()
                    .find(|t| t.name.eq_ignore_ascii_case(&fk.references_table))
                    .ok_or_else(|| ValidationError::ReferencedTableNotFound(
                        fk.references_table.clone(),
                        table.name.clone()
                    ))?;

                if !referenced.has_column(&fk.references_column) {
                    return Err(ValidationError::ReferencedColumnNotFound(
                        fk.references_column.clone(),
                        referenced.name.clone()
                    ));
                }
            }
        }

        Ok(())
    }
}

//! Database table representation
//!
//! This module provides the read-only description of a relational table:
//! columns, keys, indexes and a handful of sample rows used to build
//! practice challenges.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

/// Type fragments that mark a declared column type as numeric
const NUMERIC_TYPE_MARKERS: [&str; 6] = ["int", "decimal", "number", "float", "double", "real"];

/// Definition of a column in a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Name of the column
    pub name: String,

    /// Declared type, free text (e.g. "varchar(255)", "int")
    #[serde(rename = "type")]
    pub data_type: String,

    /// Whether the column can be null
    #[serde(default = "default_nullable")]
    pub nullable: bool,

    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_nullable() -> bool {
    true
}

impl Column {
    /// Create a new nullable column without description
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Column {
            name: name.into(),
            data_type: data_type.into(),
            nullable: true,
            description: None,
        }
    }

    /// Whether the declared type textually denotes a numeric kind
    pub fn is_numeric(&self) -> bool {
        let data_type = self.data_type.to_lowercase();
        NUMERIC_TYPE_MARKERS.iter().any(|marker| data_type.contains(marker))
    }

    /// Whether the declared type textually denotes a varchar
    pub fn is_varchar(&self) -> bool {
        self.data_type.to_lowercase().contains("varchar")
    }
}

/// Foreign key from a single column to a column of another table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Referencing column in the owning table
    pub column: String,

    /// Referenced table
    pub references_table: String,

    /// Referenced column
    pub references_column: String,
}

/// Secondary index over one or more columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    /// Index name
    pub name: String,

    /// Participating columns, in index order
    pub columns: Vec<String>,

    /// Whether the index enforces uniqueness
    #[serde(default)]
    pub unique: bool,
}

/// Scalar accepted for a sample value in a schema file
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum SampleScalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl From<SampleScalar> for String {
    fn from(value: SampleScalar) -> Self {
        match value {
            SampleScalar::Text(s) => s,
            SampleScalar::Integer(i) => i.to_string(),
            SampleScalar::Float(f) => f.to_string(),
            SampleScalar::Bool(b) => b.to_string(),
        }
    }
}

type RawSampleRow = BTreeMap<String, Option<SampleScalar>>;

/// One sample row: column name to nullable textual value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawSampleRow")]
pub struct SampleRow(BTreeMap<String, Option<String>>);

impl From<RawSampleRow> for SampleRow {
    fn from(raw: RawSampleRow) -> Self {
        SampleRow(
            raw.into_iter()
                .map(|(column, value)| (column, value.map(String::from)))
                .collect(),
        )
    }
}

impl SampleRow {
    /// Build a row from (column, value) pairs
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<String>)>,
        K: Into<String>,
    {
        SampleRow(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Value of a column (case-insensitive); an absent column reads as null
    pub fn value(&self, column: &str) -> Option<&str> {
        let value = match self.0.get(column) {
            Some(value) => value,
            None => self.0.iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(column))
                .map(|(_, value)| value)?,
        };
        value.as_deref()
    }

    /// Column names present in this row
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Description of a database table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Name of the table
    pub name: String,

    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Columns in declaration order
    pub columns: Vec<Column>,

    /// Primary key column names
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<Vec<String>>,

    /// Foreign key constraints
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,

    /// Secondary indexes
    #[serde(default)]
    pub indexes: Vec<Index>,

    /// Sample rows
    #[serde(default, rename = "sample_data")]
    pub sample_rows: Vec<SampleRow>,
}

impl Table {
    /// Create a table with columns only
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Table {
            name: name.into(),
            description: None,
            columns,
            primary_key: None,
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
            sample_rows: Vec::new(),
        }
    }

    /// Set the primary key
    pub fn with_primary_key(mut self, columns: &[&str]) -> Self {
        self.primary_key = Some(columns.iter().map(|c| c.to_string()).collect());
        self
    }

    /// Add a foreign key
    pub fn with_foreign_key(mut self, column: &str, references_table: &str, references_column: &str) -> Self {
        self.foreign_keys.push(ForeignKey {
            column: column.to_string(),
            references_table: references_table.to_string(),
            references_column: references_column.to_string(),
        });
        self
    }

    /// Add an index
    pub fn with_index(mut self, name: &str, columns: &[&str], unique: bool) -> Self {
        self.indexes.push(Index {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            unique,
        });
        self
    }

    /// Add a sample row
    pub fn with_sample_row(mut self, row: SampleRow) -> Self {
        self.sample_rows.push(row);
        self
    }

    /// Get a column by name (case-insensitive)
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|col| col.name.eq_ignore_ascii_case(name))
    }

    /// Check if the table has a column
    pub fn has_column(&self, name: &str) -> bool {
        self.get_column(name).is_some()
    }

    /// Whether the table has sample data to build a challenge from
    pub fn has_sample_data(&self) -> bool {
        !self.sample_rows.is_empty() && !self.columns.is_empty()
    }

    /// Whether a column is covered by an index or a single-column primary key
    pub fn is_indexed(&self, column: &str) -> bool {
        let in_index = self.indexes.iter()
            .any(|index| index.columns.iter().any(|c| c.eq_ignore_ascii_case(column)));

        let is_sole_pk = matches!(
            self.primary_key.as_deref(),
            Some([pk]) if pk.eq_ignore_ascii_case(column)
        );

        in_index || is_sole_pk
    }
}

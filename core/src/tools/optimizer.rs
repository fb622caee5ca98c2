//! Optimization hints
//!
//! Rule-based suggestions for a query against the practice schema. Rules look
//! at query structure and index coverage only; no statistics are involved.

use std::fmt;
use serde::{Serialize, Deserialize};

use crate::schema::SchemaProvider;
use crate::sql::{ParsedSelect, SqlInspector};

/// How strongly a hint should be acted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HintSeverity {
    /// Informational
    Info,
    /// Likely to cost performance
    Warning,
}

impl fmt::Display for HintSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HintSeverity::Info => write!(f, "info"),
            HintSeverity::Warning => write!(f, "warning"),
        }
    }
}

/// A single optimization suggestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizationHint {
    /// Severity
    pub severity: HintSeverity,

    /// Suggestion text
    pub message: String,

    /// Table the hint is about
    pub table: Option<String>,

    /// Column the hint is about
    pub column: Option<String>,
}

impl OptimizationHint {
    fn new(severity: HintSeverity, message: impl Into<String>) -> Self {
        OptimizationHint {
            severity,
            message: message.into(),
            table: None,
            column: None,
        }
    }

    fn on(mut self, table: &str, column: Option<&str>) -> Self {
        self.table = Some(table.to_string());
        self.column = column.map(str::to_string);
        self
    }
}

impl fmt::Display for OptimizationHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)
    }
}

/// Suggest optimizations for a query
///
/// Text that does not parse yields a single warning hint.
pub fn suggest_optimizations(
    inspector: &SqlInspector,
    sql: &str,
    schema: &dyn SchemaProvider,
) -> Vec<OptimizationHint> {
    match inspector.parse(sql) {
        Ok(parsed) => hints_for(&parsed, schema),
        Err(e) => vec![OptimizationHint::new(
            HintSeverity::Warning,
            format!("Query could not be analyzed: {}", e),
        )],
    }
}

fn hints_for(parsed: &ParsedSelect, schema: &dyn SchemaProvider) -> Vec<OptimizationHint> {
    let mut hints = Vec::new();
    let tables = parsed.tables();

    if parsed.has_select_star() {
        hints.push(OptimizationHint::new(
            HintSeverity::Info,
            "SELECT * reads every column; list only the columns you need",
        ));
    }

    for column in parsed.where_columns() {
        // Attribute the column to the first referenced table that declares it
        let owner = tables.iter()
            .filter_map(|name| schema.get_table_by_name(name))
            .find(|table| table.has_column(&column));

        if let Some(table) = owner {
            if !schema.has_index(&table.name, &column) {
                hints.push(
                    OptimizationHint::new(
                        HintSeverity::Warning,
                        format!(
                            "Filtering on {}.{} has no supporting index; consider CREATE INDEX idx_{}_{} ON {} ({})",
                            table.name, column, table.name, column, table.name, column
                        ),
                    )
                    .on(&table.name, Some(&column)),
                );
            }
        }
    }

    if parsed.has_in_subquery() {
        hints.push(OptimizationHint::new(
            HintSeverity::Warning,
            "IN (SELECT ...) can often be rewritten as EXISTS or a JOIN",
        ));
    }

    if parsed.has_window_function() {
        hints.push(OptimizationHint::new(
            HintSeverity::Info,
            "Window functions sort or partition the full input; make sure the PARTITION BY and ORDER BY columns are selective",
        ));
    }

    if parsed.has_group_by() && !parsed.has_where() {
        for table in tables.iter().filter_map(|name| schema.get_table_by_name(name)) {
            if table.has_sample_data() {
                hints.push(
                    OptimizationHint::new(
                        HintSeverity::Info,
                        format!("GROUP BY without WHERE aggregates every row of {}", table.name),
                    )
                    .on(&table.name, None),
                );
            }
        }
    }

    hints
}

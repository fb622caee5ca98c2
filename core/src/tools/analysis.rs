//! Query analysis
//!
//! Summarizes the structure of a submitted query for display next to a
//! challenge. Unparseable text still yields a report, with `parse_error` set.

use serde::{Serialize, Deserialize};
use log::debug;

use crate::sql::SqlInspector;

/// Structural summary of a query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryReport {
    /// Query as submitted
    pub sql: String,

    /// Tables referenced by the query, lowercased
    pub tables: Vec<String>,

    /// Number of joins, counting comma-separated FROM items
    pub join_count: usize,

    /// Number of subqueries
    pub subquery_count: usize,

    /// Whether rows are filtered with WHERE
    pub has_where: bool,

    /// Whether rows are grouped
    pub has_group_by: bool,

    /// Whether groups are filtered with HAVING
    pub has_having: bool,

    /// Whether the output is sorted
    pub has_order_by: bool,

    /// Whether a window function is called
    pub has_window_function: bool,

    /// Whether the projection contains `*`
    pub has_select_star: bool,

    /// Estimated complexity (higher means more complex)
    pub complexity_score: u32,

    /// Human-readable observations
    pub notes: Vec<String>,

    /// Parser message when the query could not be parsed
    pub parse_error: Option<String>,
}

impl QueryReport {
    /// Whether the query parsed
    pub fn is_valid(&self) -> bool {
        self.parse_error.is_none()
    }

    /// Multi-line text rendering of the report
    pub fn render(&self) -> String {
        if let Some(error) = &self.parse_error {
            return format!("Could not parse query: {}", error);
        }

        let mut out = String::new();
        out.push_str(&format!("Tables: {}\n", self.tables.join(", ")));
        out.push_str(&format!("Joins: {}\n", self.join_count));
        out.push_str(&format!("Subqueries: {}\n", self.subquery_count));
        out.push_str(&format!("Complexity: {}\n", self.complexity_score));
        for note in &self.notes {
            out.push_str(&format!("- {}\n", note));
        }
        out
    }
}

/// Analyze the structure of a query
pub fn analyze_query(inspector: &SqlInspector, sql: &str) -> QueryReport {
    let parsed = match inspector.parse(sql) {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!("Analysis skipped, query did not parse: {}", e);
            return QueryReport {
                sql: sql.to_string(),
                parse_error: Some(e.to_string()),
                ..QueryReport::default()
            };
        }
    };

    let mut report = QueryReport {
        sql: sql.to_string(),
        tables: parsed.tables(),
        join_count: parsed.join_count(),
        subquery_count: parsed.subquery_count(),
        has_where: parsed.has_where(),
        has_group_by: parsed.has_group_by(),
        has_having: parsed.has_having(),
        has_order_by: parsed.has_order_by(),
        has_window_function: parsed.has_window_function(),
        has_select_star: parsed.has_select_star(),
        complexity_score: parsed.complexity_score(),
        notes: Vec::new(),
        parse_error: None,
    };

    if report.join_count > 0 {
        report.notes.push(format!("Combines {} tables with {} join(s)", report.tables.len(), report.join_count));
    }
    if report.has_group_by {
        if report.has_having {
            report.notes.push("Aggregates rows and filters the groups with HAVING".to_string());
        } else {
            report.notes.push("Aggregates rows with GROUP BY".to_string());
        }
    } else if report.has_having {
        report.notes.push("HAVING without GROUP BY treats the whole result as one group".to_string());
    }
    if report.subquery_count > 0 {
        report.notes.push(format!("Contains {} subquery(ies)", report.subquery_count));
    }
    if report.has_window_function {
        report.notes.push("Uses a window function".to_string());
    }
    if !report.has_where && !report.has_group_by && report.join_count == 0 {
        report.notes.push("Reads every row of the table".to_string());
    }

    report
}

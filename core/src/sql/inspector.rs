//! SQL structural inspector
//!
//! Parses a single SELECT statement with `sqlparser` and answers yes/no
//! structural questions about it: joins, grouping, subqueries, window
//! functions, `SELECT *`, filtering. It also re-serializes the statement to a
//! canonical textual form, which the answer validator compares on.

use std::collections::HashSet;
use std::ops::ControlFlow;
use serde::{Serialize, Deserialize};
use thiserror::Error;
use log::debug;
use sqlparser::ast::{
    visit_expressions, visit_relations, Expr, GroupByExpr, Query, Select, SelectItem, SetExpr,
    Statement, TableFactor, TableWithJoins,
};
use sqlparser::dialect::{GenericDialect, PostgreSqlDialect};
use sqlparser::parser::{Parser, ParserError};

/// Error produced when text is not a single parseable SELECT
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InspectError {
    /// Parser rejected the text
    #[error("Parse error: {0}")]
    Parse(#[from] ParserError),

    /// No statement in the text
    #[error("Empty SQL statement")]
    Empty,

    /// More than one statement in the text
    #[error("Expected a single statement, found {0}")]
    MultipleStatements(usize),

    /// Statement is not a query
    #[error("Only SELECT statements are supported")]
    NotSelect,
}

/// SQL dialect used for parsing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    /// PostgreSQL
    #[default]
    Postgres,

    /// ANSI-ish generic dialect
    Generic,
}

/// Parser front end for SELECT statements
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlInspector {
    dialect: SqlDialect,
}

impl SqlInspector {
    /// Create an inspector for a dialect
    pub fn new(dialect: SqlDialect) -> Self {
        SqlInspector { dialect }
    }

    /// Parse text into a single SELECT statement
    pub fn parse(&self, sql: &str) -> Result<ParsedSelect, InspectError> {
        let mut statements = match self.dialect {
            SqlDialect::Postgres => Parser::parse_sql(&PostgreSqlDialect {}, sql)?,
            SqlDialect::Generic => Parser::parse_sql(&GenericDialect {}, sql)?,
        };

        match statements.len() {
            0 => return Err(InspectError::Empty),
            1 => {}
            n => return Err(InspectError::MultipleStatements(n)),
        }

        match statements.remove(0) {
            Statement::Query(query) => Ok(ParsedSelect { query }),
            other => {
                debug!("Rejecting non-query statement: {}", other);
                Err(InspectError::NotSelect)
            }
        }
    }

    /// Parse both texts and compare their canonical forms
    ///
    /// Returns `None` when either side fails to parse.
    pub fn canonical_eq(&self, left: &str, right: &str) -> Option<bool> {
        let left = self.parse(left).ok()?;
        let right = self.parse(right).ok()?;
        Some(left.canonical() == right.canonical())
    }
}

/// A parsed SELECT statement
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSelect {
    query: Box<Query>,
}

impl ParsedSelect {
    /// Canonical re-serialization of the statement
    pub fn canonical(&self) -> String {
        self.query.to_string()
    }

    /// SELECT blocks of the top-level query body, including set operation branches
    fn selects(&self) -> Vec<&Select> {
        let mut selects = Vec::new();
        collect_selects(&self.query.body, &mut selects);
        selects
    }

    fn any_expr(&self, mut pred: impl FnMut(&Expr) -> bool) -> bool {
        visit_expressions(self.query.as_ref(), |expr| {
            if pred(expr) {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .is_break()
    }

    /// Number of joins, counting comma-separated FROM items
    pub fn join_count(&self) -> usize {
        self.selects()
            .iter()
            .map(|select| {
                let comma_joins = select.from.len().saturating_sub(1);
                comma_joins + select.from.iter().map(count_joins).sum::<usize>()
            })
            .sum()
    }

    /// Number of subqueries in expressions and derived tables
    pub fn subquery_count(&self) -> usize {
        let mut count = 0;
        let _ = visit_expressions(self.query.as_ref(), |expr| {
            if matches!(expr, Expr::Subquery(_) | Expr::InSubquery { .. } | Expr::Exists { .. }) {
                count += 1;
            }
            ControlFlow::<()>::Continue(())
        });

        count + self.selects()
            .iter()
            .flat_map(|select| select.from.iter())
            .map(count_derived)
            .sum::<usize>()
    }

    /// Whether the query joins tables
    pub fn has_join(&self) -> bool {
        self.join_count() > 0
    }

    /// Whether the query groups rows
    pub fn has_group_by(&self) -> bool {
        self.selects().iter().any(|select| match &select.group_by {
            GroupByExpr::All => true,
            GroupByExpr::Expressions(exprs) => !exprs.is_empty(),
        })
    }

    /// Whether the query filters groups with HAVING
    pub fn has_having(&self) -> bool {
        self.selects().iter().any(|select| select.having.is_some())
    }

    /// Whether the query sorts its output
    pub fn has_order_by(&self) -> bool {
        !self.query.order_by.is_empty()
    }

    /// Whether the query contains any subquery
    pub fn has_subquery(&self) -> bool {
        self.subquery_count() > 0
    }

    /// Whether the query contains `x IN (SELECT ...)`
    pub fn has_in_subquery(&self) -> bool {
        self.any_expr(|expr| matches!(expr, Expr::InSubquery { .. }))
    }

    /// Whether the query calls a function with an OVER clause
    pub fn has_window_function(&self) -> bool {
        self.any_expr(|expr| matches!(expr, Expr::Function(func) if func.over.is_some()))
    }

    /// Whether the projection contains `*` or `table.*`
    pub fn has_select_star(&self) -> bool {
        self.selects().iter().any(|select| {
            select.projection.iter().any(|item| {
                matches!(item, SelectItem::Wildcard(_) | SelectItem::QualifiedWildcard(_, _))
            })
        })
    }

    /// Whether the query has a WHERE clause
    pub fn has_where(&self) -> bool {
        self.selects().iter().any(|select| select.selection.is_some())
    }

    /// Referenced table names, lowercased, in first-seen order
    pub fn tables(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut tables = Vec::new();
        let _ = visit_relations(self.query.as_ref(), |name| {
            let name = name.to_string().to_lowercase();
            if seen.insert(name.clone()) {
                tables.push(name);
            }
            ControlFlow::<()>::Continue(())
        });
        tables
    }

    /// Estimated complexity (higher means more complex)
    pub fn complexity_score(&self) -> u32 {
        let mut complexity = 10;

        for select in self.selects() {
            complexity += select.from.len() as u32 * 5;
            complexity += select.from.iter().map(count_joins).sum::<usize>() as u32 * 10;

            if select.selection.is_some() {
                complexity += 10;
            }

            match &select.group_by {
                GroupByExpr::Expressions(exprs) if exprs.is_empty() => {}
                _ => complexity += 5,
            }

            if select.having.is_some() {
                complexity += 15;
            }
        }

        complexity += self.subquery_count() as u32 * 20;
        if self.has_window_function() {
            complexity += 15;
        }

        complexity += self.query.order_by.len() as u32 * 5;
        if self.query.limit.is_some() {
            complexity += 5;
        }
        if self.query.offset.is_some() {
            complexity += 5;
        }

        complexity
    }

    /// Column names mentioned in top-level WHERE clauses, lowercased
    pub fn where_columns(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut columns = Vec::new();
        for select in self.selects() {
            if let Some(selection) = &select.selection {
                let _ = visit_expressions(selection, |expr| {
                    let column = match expr {
                        Expr::Identifier(ident) => Some(ident.value.to_lowercase()),
                        Expr::CompoundIdentifier(parts) => parts.last().map(|p| p.value.to_lowercase()),
                        _ => None,
                    };
                    if let Some(column) = column {
                        if seen.insert(column.clone()) {
                            columns.push(column);
                        }
                    }
                    ControlFlow::<()>::Continue(())
                });
            }
        }
        columns
    }
}

fn collect_selects<'a>(body: &'a SetExpr, out: &mut Vec<&'a Select>) {
    match body {
        SetExpr::Select(select) => out.push(select.as_ref()),
        SetExpr::Query(query) => collect_selects(&query.body, out),
        SetExpr::SetOperation { left, right, .. } => {
            collect_selects(left, out);
            collect_selects(right, out);
        }
        _ => {}
    }
}

fn count_joins(twj: &TableWithJoins) -> usize {
    twj.joins.len() + match &twj.relation {
        TableFactor::NestedJoin { table_with_joins, .. } => count_joins(table_with_joins),
        _ => 0,
    } + twj.joins.iter().map(|join| match &join.relation {
        TableFactor::NestedJoin { table_with_joins, .. } => count_joins(table_with_joins),
        _ => 0,
    }).sum::<usize>()
}

fn count_derived(twj: &TableWithJoins) -> usize {
    std::iter::once(&twj.relation)
        .chain(twj.joins.iter().map(|join| &join.relation))
        .map(|factor| match factor {
            TableFactor::Derived { .. } => 1,
            TableFactor::NestedJoin { table_with_joins, .. } => count_derived(table_with_joins),
            _ => 0,
        })
        .sum()
}

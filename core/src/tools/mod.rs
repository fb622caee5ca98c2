//! SQL tools
//!
//! Helpers a learner uses alongside challenges: query analysis, schema
//! browsing and optimization hints.

mod analysis;
mod catalog;
mod optimizer;

pub use analysis::{analyze_query, QueryReport};
pub use catalog::{describe_table, list_tables, TableSummary};
pub use optimizer::{suggest_optimizations, HintSeverity, OptimizationHint};

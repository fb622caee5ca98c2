//! SQL text handling
//!
//! Structural inspection of SELECT statements and the normalization helpers
//! shared by the answer validator and the tools.

pub mod inspector;
pub mod normalize;

pub use inspector::{InspectError, ParsedSelect, SqlDialect, SqlInspector};
pub use normalize::{normalize_sql, quote_literal};

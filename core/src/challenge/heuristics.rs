//! Tier heuristics for answer validation
//!
//! Recovers the structure of a canonical solution from its normalized text
//! and checks that a normalized submission contains the clauses that
//! structure requires. All inputs are expected to be lowercased and
//! whitespace-collapsed already.

use std::sync::OnceLock;
use regex::Regex;
use log::debug;

use crate::models::SolutionShape;

fn filter_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"from (\w+) where (\w+) (?:= .+|is null)").expect("valid filter pattern")
    })
}

fn join_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"from (\w+) inner join (\w+) on (\w+)\.(\w+) = (\w+)\.(\w+)")
            .expect("valid join pattern")
    })
}

fn from_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"from (\w+)").expect("valid from pattern"))
}

fn group_by_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"group by (\w+)").expect("valid group by pattern"))
}

/// Recover the solution shape from normalized canonical solution text
pub fn infer_shape(expected: &str) -> Option<SolutionShape> {
    if let Some(caps) = filter_pattern().captures(expected) {
        return Some(SolutionShape::Filter {
            table: caps[1].to_string(),
            column: caps[2].to_string(),
        });
    }

    if let Some(caps) = join_pattern().captures(expected) {
        let left_table = caps[1].to_string();
        let right_table = caps[2].to_string();
        let (left_column, right_column) = if caps[3] == *left_table {
            (caps[4].to_string(), caps[6].to_string())
        } else {
            (caps[6].to_string(), caps[4].to_string())
        };
        return Some(SolutionShape::Join { left_table, right_table, left_column, right_column });
    }

    let table = from_pattern().captures(expected)?;
    let column = group_by_pattern().captures(expected)?;
    Some(SolutionShape::GroupCount {
        table: table[1].to_string(),
        column: column[1].to_string(),
    })
}

fn is_match(pattern: &str, text: &str) -> bool {
    match Regex::new(pattern) {
        Ok(re) => re.is_match(text),
        Err(err) => {
            debug!("Skipping heuristic pattern {}: {}", pattern, err);
            false
        }
    }
}

fn ident(name: &str) -> String {
    regex::escape(&name.to_lowercase())
}

fn references_table(submitted: &str, table: &str) -> bool {
    is_match(&format!(r"\bfrom\s+{}\b", ident(table)), submitted)
}

/// Whether the submission contains every clause the shape requires
pub fn accepts(shape: &SolutionShape, submitted: &str) -> bool {
    match shape {
        SolutionShape::Filter { table, column } => {
            references_table(submitted, table)
                && is_match(&format!(r"\bwhere\b.*\b{}\b", ident(column)), submitted)
                && (submitted.contains("is null") || submitted.contains('='))
        }
        SolutionShape::Join { left_table, right_table, left_column, right_column } => {
            let left = format!(r"\b{}\.{}", ident(left_table), ident(left_column));
            let right = format!(r"\b{}\.{}", ident(right_table), ident(right_column));

            references_table(submitted, left_table)
                && is_match(&format!(r"\bjoin\s+{}\b", ident(right_table)), submitted)
                && is_match(r"\bon\b", submitted)
                && (is_match(&format!(r"\bon\b.*{}\s*=\s*{}\b", left, right), submitted)
                    || is_match(&format!(r"\bon\b.*{}\s*=\s*{}\b", right, left), submitted))
        }
        SolutionShape::GroupCount { table, column } => {
            references_table(submitted, table)
                && is_match(&format!(r"\bgroup\s+by\s+{}\b", ident(column)), submitted)
                && is_match(r"\bhaving\b.*\bcount\s*\(\s*\*\s*\)", submitted)
                && is_match(r"\border\s+by\b.*\bdesc\b", submitted)
        }
    }
}

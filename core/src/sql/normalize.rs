//! SQL text normalization
//!
//! Helpers for comparing SQL text loosely and for building SQL literals.

/// Lowercase, collapse every whitespace run to one space, trim both ends
pub fn normalize_sql(sql: &str) -> String {
    sql.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Single-quote a string literal, doubling embedded quotes
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_sql() {
        assert_eq!(
            normalize_sql("  SELECT *\n\tFROM   Orders\r\nWHERE id = 1;  "),
            "select * from orders where id = 1;"
        );
        assert_eq!(normalize_sql(""), "");
        assert_eq!(normalize_sql(" \n\t "), "");
    }

    #[test]
    fn test_quote_literal() {
        assert_eq!(quote_literal("Pending"), "'Pending'");
        assert_eq!(quote_literal("O'Brien"), "'O''Brien'");
        assert_eq!(quote_literal(""), "''");
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(sql in "[ a-zA-Z0-9_*=;'\t\n]{0,64}") {
            let once = normalize_sql(&sql);
            prop_assert_eq!(normalize_sql(&once), once.clone());
            prop_assert!(!once.starts_with(' ') && !once.ends_with(' '));
            prop_assert!(!once.contains("  "));
        }
    }
}

//! Schema catalog views

use serde::{Serialize, Deserialize};

use crate::models::Table;
use crate::schema::SchemaProvider;

/// One-line overview of a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSummary {
    /// Table name
    pub name: String,

    /// Table description
    pub description: Option<String>,

    /// Number of columns
    pub column_count: usize,

    /// Number of sample rows
    pub sample_row_count: usize,

    /// Tables referenced through foreign keys
    pub references: Vec<String>,
}

impl TableSummary {
    fn of(table: &Table) -> Self {
        let mut references: Vec<String> = Vec::new();
        for fk in &table.foreign_keys {
            if !references.contains(&fk.references_table) {
                references.push(fk.references_table.clone());
            }
        }

        TableSummary {
            name: table.name.clone(),
            description: table.description.clone(),
            column_count: table.columns.len(),
            sample_row_count: table.sample_rows.len(),
            references,
        }
    }
}

/// Summaries of every table, in declaration order
pub fn list_tables(schema: &dyn SchemaProvider) -> Vec<TableSummary> {
    schema.get_all_tables().iter().map(TableSummary::of).collect()
}

/// Text description of one table: columns, keys, indexes and sample count
pub fn describe_table(schema: &dyn SchemaProvider, name: &str) -> Option<String> {
    let table = schema.get_table_by_name(name)?;
    let pk = table.primary_key.as_deref().unwrap_or_default();

    let mut out = format!("Table {}\n", table.name);
    if let Some(description) = &table.description {
        out.push_str(&format!("  {}\n", description));
    }

    out.push_str("Columns:\n");
    for column in &table.columns {
        let mut flags = Vec::new();
        if pk.iter().any(|c| c.eq_ignore_ascii_case(&column.name)) {
            flags.push("primary key".to_string());
        }
        if !column.nullable {
            flags.push("not null".to_string());
        }
        if let Some(fk) = table.foreign_keys.iter().find(|fk| fk.column.eq_ignore_ascii_case(&column.name)) {
            flags.push(format!("references {}.{}", fk.references_table, fk.references_column));
        }

        out.push_str(&format!("  {} {}", column.name, column.data_type));
        if !flags.is_empty() {
            out.push_str(&format!(" ({})", flags.join(", ")));
        }
        if let Some(description) = &column.description {
            out.push_str(&format!(" -- {}", description));
        }
        out.push('\n');
    }

    if !table.indexes.is_empty() {
        out.push_str("Indexes:\n");
        for index in &table.indexes {
            out.push_str(&format!(
                "  {}{} on ({})\n",
                if index.unique { "unique " } else { "" },
                index.name,
                index.columns.join(", ")
            ));
        }
    }

    out.push_str(&format!("Sample rows: {}\n", table.sample_rows.len()));
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Column, SampleRow};
    use crate::schema::Schema;

    fn schema() -> Schema {
        let mut id = Column::new("id", "int");
        id.nullable = false;

        let customers = Table::new("customers", vec![id.clone(), Column::new("name", "varchar(100)")])
            .with_primary_key(&["id"]);
        let orders = Table::new("orders", vec![
            id,
            Column::new("status", "varchar"),
            Column::new("customer_id", "int"),
        ])
        .with_primary_key(&["id"])
        .with_foreign_key("customer_id", "customers", "id")
        .with_index("idx_orders_status", &["status"], false)
        .with_sample_row(SampleRow::from_pairs([("id", Some("1".to_string()))]));

        Schema::new(vec![customers, orders]).unwrap()
    }

    #[test]
    fn test_list_tables() {
        let summaries = list_tables(&schema());

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].name, "customers");
        assert!(summaries[0].references.is_empty());
        assert_eq!(summaries[1].column_count, 3);
        assert_eq!(summaries[1].sample_row_count, 1);
        assert_eq!(summaries[1].references, vec!["customers".to_string()]);
    }

    #[test]
    fn test_describe_table() {
        let text = describe_table(&schema(), "ORDERS").unwrap();

        assert!(text.starts_with("Table orders\n"));
        assert!(text.contains("  id int (primary key, not null)\n"));
        assert!(text.contains("  customer_id int (references customers.id)\n"));
        assert!(text.contains("  idx_orders_status on (status)\n"));
        assert!(text.ends_with("Sample rows: 1\n"));
    }

    #[test]
    fn test_describe_unknown_table() {
        assert_eq!(describe_table(&schema(), "invoices"), None);
    }
}

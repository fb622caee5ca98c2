//! Challenge generator
//!
//! Builds a practice problem for a difficulty tier from the schema and
//! records its canonical solution in the answer store before handing the
//! problem back. The returned [`Challenge`] never contains the solution.

use std::sync::{Arc, Mutex, RwLock};
use chrono::Utc;
use uuid::Uuid;
use log::{debug, info};

use crate::error::{ChallengeError, CoreError, Result};
use crate::models::{Challenge, Column, Difficulty, SolutionShape, StoredSolution, Table};
use crate::schema::SchemaProvider;
use crate::sql::quote_literal;
use super::random::{choose, RandomSource};
use super::store::AnswerStore;

/// Default number of sample rows shown per table
pub const DEFAULT_MAX_SAMPLE_ROWS: usize = 3;

/// Challenge content before an identifier is assigned
struct Draft {
    title: String,
    description: String,
    hints: Vec<String>,
    sample_data: Option<String>,
    solution: StoredSolution,
}

/// Generator of practice challenges
pub struct ChallengeGenerator {
    /// Schema the challenges are drawn from
    schema: RwLock<Arc<dyn SchemaProvider>>,

    /// Answer key shared with the validator
    store: Arc<AnswerStore>,

    /// Source of table and column picks
    rng: Mutex<Box<dyn RandomSource>>,

    /// Sample rows rendered per table
    max_sample_rows: usize,
}

impl ChallengeGenerator {
    /// Create a generator over a schema, writing solutions into `store`
    pub fn new(
        schema: Arc<dyn SchemaProvider>,
        store: Arc<AnswerStore>,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        ChallengeGenerator {
            schema: RwLock::new(schema),
            store,
            rng: Mutex::new(rng),
            max_sample_rows: DEFAULT_MAX_SAMPLE_ROWS,
        }
    }

    /// Set how many sample rows are rendered per table
    pub fn with_max_sample_rows(mut self, max_sample_rows: usize) -> Self {
        self.max_sample_rows = max_sample_rows;
        self
    }

    /// Current schema
    pub fn schema(&self) -> Result<Arc<dyn SchemaProvider>> {
        let schema = self.schema.read()
            .map_err(|e| CoreError::StateError(format!("Failed to read schema: {}", e)))?;
        Ok(Arc::clone(&schema))
    }

    /// Swap the schema used for subsequent challenges
    pub fn set_schema(&self, schema: Arc<dyn SchemaProvider>) -> Result<()> {
        let mut current = self.schema.write()
            .map_err(|e| CoreError::StateError(format!("Failed to write schema: {}", e)))?;
        *current = schema;
        Ok(())
    }

    /// Generate a challenge for a difficulty name (case-insensitive)
    pub fn generate(&self, difficulty: &str) -> Result<Challenge> {
        let difficulty: Difficulty = difficulty.parse()?;
        self.generate_for(difficulty)
    }

    /// Generate a challenge for a difficulty tier
    pub fn generate_for(&self, difficulty: Difficulty) -> Result<Challenge> {
        let schema = self.schema()?;
        let draft = {
            let mut guard = self.rng.lock()
                .map_err(|e| CoreError::StateError(format!("Failed to lock random source: {}", e)))?;
            let rng: &mut dyn RandomSource = &mut **guard;

            match difficulty {
                Difficulty::Beginner => self.beginner(schema.as_ref(), rng)?,
                Difficulty::Intermediate => self.intermediate(schema.as_ref(), rng)?,
                Difficulty::Advanced => self.advanced(schema.as_ref(), rng)?,
            }
        };

        let id = loop {
            let id = Uuid::new_v4();
            if self.store.insert_new(id, draft.solution.clone())? {
                break id;
            }
            debug!("Challenge id {} already in use, drawing another", id);
        };

        info!("Generated {} challenge {}", difficulty, id);

        Ok(Challenge {
            id,
            difficulty,
            title: draft.title,
            description: draft.description,
            hints: draft.hints,
            sample_data: draft.sample_data,
            created_at: Utc::now(),
        })
    }

    fn beginner(&self, schema: &dyn SchemaProvider, rng: &mut dyn RandomSource) -> std::result::Result<Draft, ChallengeError> {
        let eligible = tables_with_samples(schema);
        let table = *choose(rng, &eligible).ok_or(ChallengeError::NoEligibleTable)?;
        let column = choose(rng, &table.columns).ok_or(ChallengeError::NoEligibleTable)?;

        let first_value = table.sample_rows.first().and_then(|row| row.value(&column.name));
        let (predicate, condition) = match first_value {
            None => (
                format!("{} IS NULL", column.name),
                "has no value (is NULL)".to_string(),
            ),
            Some(value) => {
                let literal = filter_literal(column, value);
                (format!("{} = {}", column.name, literal), format!("equals {}", literal))
            }
        };

        let sql = format!("SELECT * FROM {} WHERE {};", table.name, predicate);

        Ok(Draft {
            title: format!("Beginner Challenge: Filter {}", table.name),
            description: format!(
                "Find all records in the `{}` table where `{}` {}. Return every column.",
                table.name, column.name, condition
            ),
            hints: vec![
                format!("Read from the `{}` table.", table.name),
                format!("Filter rows with a WHERE clause on `{}`.", column.name),
                "Text values go in single quotes, and missing values are tested with IS NULL rather than =.".to_string(),
            ],
            sample_data: render_sample(table, self.max_sample_rows),
            solution: StoredSolution::new(sql, SolutionShape::Filter {
                table: table.name.clone(),
                column: column.name.clone(),
            }),
        })
    }

    fn intermediate(&self, schema: &dyn SchemaProvider, rng: &mut dyn RandomSource) -> std::result::Result<Draft, ChallengeError> {
        let eligible: Vec<&Table> = schema.get_all_tables()
            .iter()
            .filter(|table| {
                table.foreign_keys.iter()
                    .any(|fk| schema.get_table_by_name(&fk.references_table).is_some())
            })
            .collect();

        let left = *choose(rng, &eligible).ok_or(ChallengeError::NoForeignKeys)?;
        let resolvable: Vec<_> = left.foreign_keys.iter()
            .filter_map(|fk| schema.get_table_by_name(&fk.references_table).map(|right| (fk, right)))
            .collect();
        let (fk, right) = *choose(rng, &resolvable).ok_or(ChallengeError::NoForeignKeys)?;

        let sql = format!(
            "SELECT {l}.*, {r}.* FROM {l} INNER JOIN {r} ON {l}.{lc} = {r}.{rc};",
            l = left.name,
            r = right.name,
            lc = fk.column,
            rc = fk.references_column,
        );

        let sample_data = match (render_sample(left, self.max_sample_rows), render_sample(right, self.max_sample_rows)) {
            (None, None) => None,
            (l, r) => Some([l, r].into_iter().flatten().collect::<Vec<_>>().join("\n")),
        };

        Ok(Draft {
            title: format!("Intermediate Challenge: Join {} and {}", left.name, right.name),
            description: format!(
                "Combine every row of `{}` with its matching row in `{}`, using the foreign key `{}` that references `{}.{}`. Return all columns from both tables, and only rows that have a match.",
                left.name, right.name, fk.column, right.name, fk.references_column
            ),
            hints: vec![
                "Only matching rows are wanted, so use an INNER JOIN.".to_string(),
                format!("The ON clause links `{}` to the column it references.", fk.column),
                "Qualify columns with their table name to keep them unambiguous.".to_string(),
            ],
            sample_data,
            solution: StoredSolution::new(sql, SolutionShape::Join {
                left_table: left.name.clone(),
                right_table: right.name.clone(),
                left_column: fk.column.clone(),
                right_column: fk.references_column.clone(),
            }),
        })
    }

    fn advanced(&self, schema: &dyn SchemaProvider, rng: &mut dyn RandomSource) -> std::result::Result<Draft, ChallengeError> {
        let eligible = tables_with_samples(schema);
        let table = *choose(rng, &eligible).ok_or(ChallengeError::NoEligibleTable)?;
        let column = table.columns.iter()
            .find(|column| column.is_varchar())
            .or_else(|| table.columns.first())
            .ok_or(ChallengeError::NoEligibleTable)?;

        let sql = format!(
            "SELECT {c}, COUNT(*) AS record_count FROM {t} GROUP BY {c} HAVING COUNT(*) > 1 ORDER BY record_count DESC;",
            c = column.name,
            t = table.name,
        );

        Ok(Draft {
            title: format!("Advanced Challenge: Duplicate {} values", column.name),
            description: format!(
                "In the `{}` table, find every `{}` value that appears more than once. Show each value with its number of occurrences as `record_count`, most frequent first.",
                table.name, column.name
            ),
            hints: vec![
                format!("Aggregate rows per `{}` with GROUP BY.", column.name),
                "Conditions on aggregates belong in HAVING, not WHERE.".to_string(),
                "Sort by the count in descending order.".to_string(),
            ],
            sample_data: render_sample(table, self.max_sample_rows),
            solution: StoredSolution::new(sql, SolutionShape::GroupCount {
                table: table.name.clone(),
                column: column.name.clone(),
            }),
        })
    }
}

fn tables_with_samples(schema: &dyn SchemaProvider) -> Vec<&Table> {
    schema.get_all_tables()
        .iter()
        .filter(|table| table.has_sample_data())
        .collect()
}

/// Literal for a filter value: bare for numeric columns, quoted otherwise
fn filter_literal(column: &Column, value: &str) -> String {
    if column.is_numeric() {
        value.to_string()
    } else {
        quote_literal(value)
    }
}

/// Render up to `max_rows` sample rows of a table as an aligned text grid
fn render_sample(table: &Table, max_rows: usize) -> Option<String> {
    if table.sample_rows.is_empty() || max_rows == 0 {
        return None;
    }

    let header: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
    let rows: Vec<Vec<&str>> = table.sample_rows.iter()
        .take(max_rows)
        .map(|row| header.iter().map(|col| row.value(col).unwrap_or("NULL")).collect())
        .collect();

    let widths: Vec<usize> = header.iter()
        .enumerate()
        .map(|(i, name)| rows.iter().map(|r| r[i].len()).chain(std::iter::once(name.len())).max().unwrap_or(0))
        .collect();

    let format_line = |cells: &[&str]| {
        cells.iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = format!("{}:\n", table.name);
    out.push_str(&format_line(header.as_slice()));
    out.push('\n');
    for row in &rows {
        out.push_str(&format_line(row.as_slice()));
        out.push('\n');
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SampleRow;
    use crate::schema::Schema;
    use crate::challenge::random::{ScriptedRandom, SeededRandom};

    fn row(pairs: &[(&str, Option<&str>)]) -> SampleRow {
        SampleRow::from_pairs(pairs.iter().map(|(k, v)| (*k, v.map(str::to_string))))
    }

    fn orders() -> Table {
        Table::new("orders", vec![
            Column::new("id", "int"),
            Column::new("status", "varchar"),
            Column::new("customer_id", "int"),
        ])
        .with_sample_row(row(&[("id", Some("1")), ("status", Some("Pending")), ("customer_id", Some("7"))]))
        .with_sample_row(row(&[("id", Some("2")), ("status", None), ("customer_id", Some("7"))]))
    }

    fn customers() -> Table {
        Table::new("customers", vec![
            Column::new("id", "int"),
            Column::new("name", "varchar(100)"),
        ])
        .with_sample_row(row(&[("id", Some("7")), ("name", Some("O'Brien"))]))
    }

    fn generator(tables: Vec<Table>, picks: Vec<usize>) -> (ChallengeGenerator, Arc<AnswerStore>) {
        let schema = Arc::new(Schema::new(tables).unwrap());
        let store = Arc::new(AnswerStore::new());
        let gen = ChallengeGenerator::new(schema, Arc::clone(&store), Box::new(ScriptedRandom::new(picks)));
        (gen, store)
    }

    fn solution(store: &AnswerStore, challenge: &Challenge) -> StoredSolution {
        store.get(&challenge.id).unwrap().expect("solution stored")
    }

    #[test]
    fn test_beginner_quotes_text_values() {
        // table 0 (orders), column 1 (status)
        let (gen, store) = generator(vec![orders()], vec![0, 1]);
        let challenge = gen.generate("beginner").unwrap();

        assert_eq!(challenge.difficulty, Difficulty::Beginner);
        assert_eq!(solution(&store, &challenge).sql, "SELECT * FROM orders WHERE status = 'Pending';");
        assert!(challenge.description.contains("'Pending'"));
    }

    #[test]
    fn test_beginner_numeric_unquoted() {
        let (gen, store) = generator(vec![orders()], vec![0, 2]);
        let challenge = gen.generate("beginner").unwrap();

        assert_eq!(solution(&store, &challenge).sql, "SELECT * FROM orders WHERE customer_id = 7;");
    }

    #[test]
    fn test_beginner_null_and_escaping() {
        let mut table = orders();
        table.sample_rows.remove(0);
        let (gen, store) = generator(vec![table], vec![0, 1]);
        let challenge = gen.generate("beginner").unwrap();
        assert_eq!(solution(&store, &challenge).sql, "SELECT * FROM orders WHERE status IS NULL;");

        let (gen, store) = generator(vec![customers()], vec![0, 1]);
        let challenge = gen.generate("beginner").unwrap();
        assert_eq!(solution(&store, &challenge).sql, "SELECT * FROM customers WHERE name = 'O''Brien';");
    }

    #[test]
    fn test_beginner_sample_key_case_differs_from_column() {
        let table = Table::new("orders", vec![
            Column::new("id", "int"),
            Column::new("Status", "varchar"),
        ])
        .with_sample_row(row(&[("id", Some("1")), ("status", Some("Pending"))]));
        let (gen, store) = generator(vec![table], vec![0, 1]);
        let challenge = gen.generate("beginner").unwrap();

        assert_eq!(solution(&store, &challenge).sql, "SELECT * FROM orders WHERE Status = 'Pending';");
        assert!(challenge.sample_data.unwrap().contains("Pending"));
    }

    #[test]
    fn test_beginner_requires_sample_rows() {
        let (gen, store) = generator(vec![Table::new("empty", vec![Column::new("id", "int")])], vec![0]);

        match gen.generate("beginner") {
            Err(CoreError::Challenge(ChallengeError::NoEligibleTable)) => {}
            other => panic!("Expected NoEligibleTable, got {:?}", other),
        }
        match gen.generate("advanced") {
            Err(CoreError::Challenge(ChallengeError::NoEligibleTable)) => {}
            other => panic!("Expected NoEligibleTable, got {:?}", other),
        }
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_intermediate_join() {
        let orders = orders().with_foreign_key("customer_id", "customers", "id");
        let (gen, store) = generator(vec![customers(), orders], vec![0, 0]);
        let challenge = gen.generate("Intermediate").unwrap();

        assert_eq!(
            solution(&store, &challenge).sql,
            "SELECT orders.*, customers.* FROM orders INNER JOIN customers ON orders.customer_id = customers.id;"
        );
        let sample = challenge.sample_data.unwrap();
        assert!(sample.starts_with("orders:"));
        assert!(sample.contains("customers:"));
    }

    #[test]
    fn test_intermediate_requires_foreign_keys() {
        let (gen, store) = generator(vec![orders(), customers()], vec![0]);

        match gen.generate("intermediate") {
            Err(CoreError::Challenge(ChallengeError::NoForeignKeys)) => {}
            other => panic!("Expected NoForeignKeys, got {:?}", other),
        }
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_advanced_prefers_varchar() {
        let (gen, store) = generator(vec![orders()], vec![0]);
        let challenge = gen.generate("ADVANCED").unwrap();

        assert_eq!(
            solution(&store, &challenge).sql,
            "SELECT status, COUNT(*) AS record_count FROM orders GROUP BY status HAVING COUNT(*) > 1 ORDER BY record_count DESC;"
        );

        let table = Table::new("metrics", vec![Column::new("value", "int"), Column::new("note", "text")])
            .with_sample_row(row(&[("value", Some("1"))]));
        let (gen, store) = generator(vec![table], vec![0]);
        let challenge = gen.generate("advanced").unwrap();
        assert!(solution(&store, &challenge).sql.starts_with("SELECT value, COUNT(*)"));
    }

    #[test]
    fn test_invalid_difficulty() {
        let (gen, store) = generator(vec![orders()], vec![0]);

        match gen.generate("expert") {
            Err(CoreError::Challenge(ChallengeError::InvalidDifficulty(d))) => assert_eq!(d, "expert"),
            other => panic!("Expected InvalidDifficulty, got {:?}", other),
        }
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_case_insensitive_difficulty_is_identical() {
        let (gen_a, store_a) = generator(vec![orders()], vec![0, 1]);
        let (gen_b, store_b) = generator(vec![orders()], vec![0, 1]);

        let a = gen_a.generate("BEGINNER").unwrap();
        let b = gen_b.generate("beginner").unwrap();

        assert_eq!(a.description, b.description);
        assert_eq!(a.hints, b.hints);
        assert_eq!(solution(&store_a, &a), solution(&store_b, &b));
    }

    #[test]
    fn test_challenge_never_contains_solution() {
        let orders = orders().with_foreign_key("customer_id", "customers", "id");
        let schema = Arc::new(Schema::new(vec![customers(), orders]).unwrap());
        let store = Arc::new(AnswerStore::new());
        let gen = ChallengeGenerator::new(schema, Arc::clone(&store), Box::new(SeededRandom::from_seed(7)));

        for _ in 0..20 {
            for difficulty in Difficulty::ALL {
                let challenge = gen.generate_for(difficulty).unwrap();
                let sql = solution(&store, &challenge).sql;

                assert!(!challenge.title.contains(&sql));
                assert!(!challenge.description.contains(&sql));
                assert!(challenge.hints.iter().all(|hint| !hint.contains(&sql)));
                assert!(challenge.sample_data.iter().all(|sample| !sample.contains(&sql)));
                assert!(!challenge.render().contains(&sql));
            }
        }
        assert_eq!(store.len().unwrap(), 60);
    }

    #[test]
    fn test_render_sample() {
        let text = render_sample(&orders(), 1).unwrap();

        assert_eq!(text, "orders:\nid | status  | customer_id\n1  | Pending | 7\n");
        assert!(render_sample(&orders(), 0).is_none());
    }

    #[test]
    fn test_ids_are_uuid_shaped() {
        let (gen, _store) = generator(vec![orders()], vec![0, 1]);
        let id = gen.generate("beginner").unwrap().id_string();

        assert_eq!(id.len(), 36);
        assert!(id.chars().all(|c| c == '-' || c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }
}

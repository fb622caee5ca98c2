//! Answer validator
//!
//! Decides whether submitted SQL answers a challenge. Checks run in order and
//! the first match wins:
//!
//! 1. both texts are normalized (lowercase, collapsed whitespace)
//! 2. both are parsed and their canonical re-serializations compared
//! 3. the tier heuristic for the solution's shape is applied
//! 4. the normalized texts are compared directly
//!
//! Anything else fails with a hint that never quotes the stored solution.

use std::sync::Arc;
use uuid::Uuid;
use log::debug;

use crate::error::{ChallengeError, Result};
use crate::models::{Difficulty, SolutionShape, StoredSolution, Verdict};
use crate::sql::{normalize_sql, SqlInspector};
use super::heuristics;
use super::store::AnswerStore;

const PASS_EXACT: &str = "Correct! Your query matches the expected solution.";
const PASS_HEURISTIC: &str = "Correct! Your query contains every clause the task needs.";

/// Validator of submitted answers
#[derive(Debug, Clone)]
pub struct AnswerValidator {
    /// Answer key shared with the generator
    store: Arc<AnswerStore>,

    /// Parser used for canonical comparison
    inspector: SqlInspector,
}

impl AnswerValidator {
    /// Create a validator reading from `store`
    pub fn new(store: Arc<AnswerStore>, inspector: SqlInspector) -> Self {
        AnswerValidator { store, inspector }
    }

    /// Check the request arguments and resolve the identifier
    fn check_request(id: &str, sql: &str) -> std::result::Result<Uuid, ChallengeError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(ChallengeError::MissingId);
        }
        if sql.trim().is_empty() {
            return Err(ChallengeError::MissingSql);
        }
        Uuid::parse_str(id).map_err(|_| ChallengeError::UnknownId(id.to_string()))
    }

    /// Validate an answer without consuming the challenge
    pub fn validate(&self, id: &str, sql: &str) -> Result<Verdict> {
        let uuid = Self::check_request(id, sql)?;
        let solution = self.store.get(&uuid)?
            .ok_or_else(|| ChallengeError::UnknownId(id.trim().to_string()))?;
        Ok(self.judge(&solution, sql))
    }

    /// Validate an answer and remove the challenge from the store on a pass.
    ///
    /// The check and the removal happen under the store lock, so an
    /// identifier passes at most once.
    pub fn validate_and_consume(&self, id: &str, sql: &str) -> Result<Verdict> {
        let uuid = Self::check_request(id, sql)?;
        let verdict = self.store.resolve(&uuid, |solution| self.judge(solution, sql))?
            .ok_or_else(|| ChallengeError::UnknownId(id.trim().to_string()))?;
        Ok(verdict)
    }

    /// Compare a submission with a stored solution
    pub fn judge(&self, solution: &StoredSolution, submitted: &str) -> Verdict {
        let submitted = normalize_sql(submitted);
        let expected = normalize_sql(&solution.sql);

        match self.inspector.canonical_eq(&submitted, &expected) {
            Some(true) => return pass(PASS_EXACT),
            Some(false) => debug!("Canonical forms differ, trying heuristics"),
            None => debug!("Canonical comparison unavailable, trying heuristics"),
        }

        let shape = solution.shape.clone().or_else(|| heuristics::infer_shape(&expected));
        if let Some(shape) = &shape {
            if heuristics::accepts(shape, &submitted) {
                return pass(PASS_HEURISTIC);
            }
        }

        if submitted == expected {
            return pass(PASS_EXACT);
        }

        Verdict::Fail {
            message: failure_hint(shape.as_ref().map(SolutionShape::difficulty)).to_string(),
        }
    }
}

fn pass(message: &str) -> Verdict {
    Verdict::Pass { message: message.to_string() }
}

fn failure_hint(difficulty: Option<Difficulty>) -> &'static str {
    match difficulty {
        Some(Difficulty::Beginner) => {
            "Not quite. Check that you read from the right table and filter on the requested column in a WHERE clause."
        }
        Some(Difficulty::Intermediate) => {
            "Not quite. Join both tables and match the foreign key column to the column it references in the ON clause."
        }
        Some(Difficulty::Advanced) => {
            "Not quite. Group by the requested column, keep only groups with HAVING COUNT(*) > 1, and sort by the count in descending order."
        }
        None => "Not quite. Compare your query with the task description and try again.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    const BEGINNER: &str = "SELECT * FROM orders WHERE status = 'Pending';";
    const INTERMEDIATE: &str =
        "SELECT orders.*, customers.* FROM orders INNER JOIN customers ON orders.customer_id = customers.id;";
    const ADVANCED: &str =
        "SELECT category, COUNT(*) AS record_count FROM events GROUP BY category HAVING COUNT(*) > 1 ORDER BY record_count DESC;";

    fn setup(solution: StoredSolution) -> (AnswerValidator, String) {
        let store = Arc::new(AnswerStore::new());
        let id = Uuid::new_v4();
        store.insert_new(id, solution).unwrap();
        (AnswerValidator::new(store, SqlInspector::default()), id.to_string())
    }

    fn expect_error(result: Result<Verdict>, expected: ChallengeError) {
        match result {
            Err(CoreError::Challenge(err)) => assert_eq!(err, expected),
            other => panic!("Expected {:?}, got {:?}", expected, other),
        }
    }

    #[test]
    fn test_exact_and_reformatted_answers_pass() {
        let (validator, id) = setup(StoredSolution::text_only(BEGINNER));

        assert!(validator.validate(&id, BEGINNER).unwrap().is_pass());
        assert!(validator.validate(&id, "select *\n  from ORDERS\twhere status='Pending'").unwrap().is_pass());
    }

    #[test]
    fn test_beginner_heuristic() {
        let (validator, id) = setup(StoredSolution::text_only(BEGINNER));

        let verdict = validator.validate(&id, "SELECT id, status FROM orders WHERE status = 'Pending';").unwrap();
        assert_eq!(verdict, Verdict::Pass { message: PASS_HEURISTIC.to_string() });

        let verdict = validator.validate(&id, "SELECT * FROM customers WHERE status = 'Pending';").unwrap();
        assert!(!verdict.is_pass());
    }

    #[test]
    fn test_intermediate_heuristic() {
        let (validator, id) = setup(StoredSolution::text_only(INTERMEDIATE));

        assert!(validator
            .validate(&id, "SELECT orders.id, customers.name FROM orders JOIN customers ON customers.id = orders.customer_id")
            .unwrap()
            .is_pass());
        assert!(!validator
            .validate(&id, "SELECT * FROM orders, customers")
            .unwrap()
            .is_pass());
    }

    #[test]
    fn test_advanced_heuristic_with_other_alias() {
        let (validator, id) = setup(StoredSolution::text_only(ADVANCED));

        let verdict = validator
            .validate(&id, "select category, count(*) as c from events group by category having count(*) > 1 order by c desc;")
            .unwrap();
        assert!(verdict.is_pass());
    }

    #[test]
    fn test_structured_shape_is_used() {
        let shape = SolutionShape::Filter { table: "Orders".into(), column: "Status".into() };
        let (validator, id) = setup(StoredSolution::new(BEGINNER, shape));

        assert!(validator.validate(&id, "select status from orders where status = 'x'").unwrap().is_pass());
    }

    #[test]
    fn test_unparseable_exact_text_passes() {
        let (validator, id) = setup(StoredSolution::text_only("SELEKT everything PLEASE"));

        assert!(validator.validate(&id, "  selekt   EVERYTHING please ").unwrap().is_pass());
        assert!(!validator.validate(&id, "selekt something").unwrap().is_pass());
    }

    #[test]
    fn test_failure_never_reveals_solution() {
        for solution in [BEGINNER, INTERMEDIATE, ADVANCED] {
            let (validator, id) = setup(StoredSolution::text_only(solution));
            let verdict = validator.validate(&id, "SELECT 1").unwrap();

            assert!(!verdict.is_pass());
            assert!(!verdict.message().contains(solution));
            assert!(!verdict.message().to_lowercase().contains(&normalize_sql(solution)));
        }
    }

    #[test]
    fn test_request_errors() {
        let (validator, id) = setup(StoredSolution::text_only(BEGINNER));

        expect_error(validator.validate("", BEGINNER), ChallengeError::MissingId);
        expect_error(validator.validate("   ", BEGINNER), ChallengeError::MissingId);
        expect_error(validator.validate(&id, " \n "), ChallengeError::MissingSql);
        expect_error(
            validator.validate("not-a-uuid", BEGINNER),
            ChallengeError::UnknownId("not-a-uuid".to_string()),
        );

        let never_issued = Uuid::new_v4().to_string();
        expect_error(
            validator.validate(&never_issued, BEGINNER),
            ChallengeError::UnknownId(never_issued.clone()),
        );
    }

    #[test]
    fn test_consume_once() {
        let (validator, id) = setup(StoredSolution::text_only(BEGINNER));

        assert!(!validator.validate_and_consume(&id, "SELECT 1").unwrap().is_pass());
        assert!(validator.validate_and_consume(&id, BEGINNER).unwrap().is_pass());
        expect_error(
            validator.validate_and_consume(&id, BEGINNER),
            ChallengeError::UnknownId(id.clone()),
        );
    }
}

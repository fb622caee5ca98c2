//! Practice challenge representation
//!
//! This module provides data structures for generated SQL practice
//! challenges, the hidden solutions kept in the answer store, and the
//! verdicts returned to the user.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use serde::{Serialize, Deserialize};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::ChallengeError;

/// Difficulty tier of a challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Single-table filter
    Beginner,

    /// Two-table inner join over a foreign key
    Intermediate,

    /// Grouped aggregate with HAVING and ORDER BY
    Advanced,
}

impl Difficulty {
    /// All tiers, easiest first
    pub const ALL: [Difficulty; 3] = [Difficulty::Beginner, Difficulty::Intermediate, Difficulty::Advanced];

    /// Get string representation of the tier
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

impl Display for Difficulty {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ChallengeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            _ => Err(ChallengeError::InvalidDifficulty(s.to_string())),
        }
    }
}

/// A generated practice challenge.
///
/// Never carries the canonical solution; that lives only in the answer store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Challenge {
    /// Challenge ID, also the answer store key
    pub id: Uuid,

    /// Difficulty tier
    pub difficulty: Difficulty,

    /// Short title
    pub title: String,

    /// Task description
    pub description: String,

    /// Ordered hints
    pub hints: Vec<String>,

    /// Excerpt of sample rows, rendered as text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_data: Option<String>,

    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Challenge {
    /// Identifier in its 36-character hyphenated form
    pub fn id_string(&self) -> String {
        self.id.hyphenated().to_string()
    }

    /// Render the challenge as plain text for display
    pub fn render(&self) -> String {
        let mut out = format!("{}\n\n{}\n", self.title, self.description);

        if let Some(sample) = &self.sample_data {
            out.push_str("\nSample data:\n");
            out.push_str(sample);
        }

        if !self.hints.is_empty() {
            out.push_str("\nHints:\n");
            for (i, hint) in self.hints.iter().enumerate() {
                out.push_str(&format!("  {}. {}\n", i + 1, hint));
            }
        }

        out.push_str(&format!("\nChallenge ID: {}\n", self.id_string()));
        out
    }
}

/// Structural parameters of a canonical solution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolutionShape {
    /// `SELECT * FROM table WHERE column = value` or `IS NULL`
    Filter {
        /// Filtered table
        table: String,
        /// Filtered column
        column: String,
    },

    /// `SELECT l.*, r.* FROM l INNER JOIN r ON l.lc = r.rc`
    Join {
        /// Left (referencing) table
        left_table: String,
        /// Right (referenced) table
        right_table: String,
        /// Join column on the left
        left_column: String,
        /// Join column on the right
        right_column: String,
    },

    /// Grouped count with HAVING and descending ORDER BY
    GroupCount {
        /// Grouped table
        table: String,
        /// Grouping column
        column: String,
    },
}

impl SolutionShape {
    /// Tier this shape belongs to
    pub fn difficulty(&self) -> Difficulty {
        match self {
            SolutionShape::Filter { .. } => Difficulty::Beginner,
            SolutionShape::Join { .. } => Difficulty::Intermediate,
            SolutionShape::GroupCount { .. } => Difficulty::Advanced,
        }
    }
}

/// Answer store entry: canonical solution text plus its structure when known
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSolution {
    /// Canonical solution SQL
    pub sql: String,

    /// Structured descriptor recorded by the generator
    pub shape: Option<SolutionShape>,
}

impl StoredSolution {
    /// Solution with a known shape
    pub fn new(sql: impl Into<String>, shape: SolutionShape) -> Self {
        StoredSolution { sql: sql.into(), shape: Some(shape) }
    }

    /// Solution known only by its text
    pub fn text_only(sql: impl Into<String>) -> Self {
        StoredSolution { sql: sql.into(), shape: None }
    }
}

/// Outcome of validating a submitted answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "lowercase")]
pub enum Verdict {
    /// Answer accepted
    Pass {
        /// Feedback for the user
        message: String,
    },

    /// Answer rejected
    Fail {
        /// Hint for the user; never contains the solution
        message: String,
    },
}

impl Verdict {
    /// Whether the answer was accepted
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass { .. })
    }

    /// Feedback message
    pub fn message(&self) -> &str {
        match self {
            Verdict::Pass { message } | Verdict::Fail { message } => message,
        }
    }
}

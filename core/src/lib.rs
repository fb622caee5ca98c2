//! # SQL Coach Core
//!
//! Schema-driven SQL practice. Given a relational schema with sample rows,
//! this crate generates challenges at three difficulty tiers, keeps their
//! canonical solutions server-side, and judges submitted answers against
//! them. It also ships small SQL tools (query analysis, schema browsing,
//! optimization hints) built on the same parser.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod challenge;
pub mod config;
pub mod error;
pub mod models;
pub mod schema;
pub mod session;
pub mod sql;
pub mod tools;

/// Re-export common types for ease of use
pub use challenge::{AnswerStore, AnswerValidator, ChallengeGenerator, RandomSource, ScriptedRandom, SeededRandom};
pub use config::CoreConfig;
pub use error::{ChallengeError, CoreError, Result};
pub use models::{Challenge, Difficulty, SolutionShape, StoredSolution, Table, Verdict};
pub use schema::{Schema, SchemaProvider};
pub use session::ChallengeSession;
pub use sql::{SqlDialect, SqlInspector};

/// Version of the core crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

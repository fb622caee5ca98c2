//! Challenge engine
//!
//! This module provides challenge generation, the in-memory answer store and
//! answer validation. Generator and validator share one [`AnswerStore`]
//! handed to both at construction.

pub mod generator;
pub mod heuristics;
pub mod random;
pub mod store;
pub mod validator;

pub use generator::{ChallengeGenerator, DEFAULT_MAX_SAMPLE_ROWS};
pub use random::{RandomSource, ScriptedRandom, SeededRandom};
pub use store::AnswerStore;
pub use validator::AnswerValidator;

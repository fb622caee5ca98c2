//! Data models for SQL Coach
//!
//! This module provides data structures for representing the practice
//! schema and the challenges generated from it.

mod table;
mod challenge;

pub use table::{Table, Column, ForeignKey, Index, SampleRow};
pub use challenge::{Challenge, Difficulty, SolutionShape, StoredSolution, Verdict};

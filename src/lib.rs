/// SQL Coach - schema-driven SQL practice challenges
///
/// This is the root crate that provides workspace-level documentation.
/// Actual implementation is in the subcrates:
/// - `sql-coach-core`: Challenge generation, answer validation, SQL inspection and tools
/// - `sql-coach-cli`: Command-line front end with an interactive practice loop

pub use sql_coach_core as core;

/// Returns the version of the package.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

//! Condition types and the record query engine.

/// Conditions and boolean condition trees.
pub mod condition;

/// The scan-based record query engine.
pub mod engine;

pub use condition::{Comparator, Condition, MultiCondition};
pub use engine::{RecordQuery, ResultSetCursor};

//! Secondary-index extension seam.
//!
//! The scan-based query engine is correct standalone; an engine implementing
//! [`IndexLookup`] could later replace the full scan for a single
//! equality/range condition without changing the public query contract. No
//! in-core type implements it yet.

use std::ops::Bound;

use crate::error::Result;
use crate::types::{PropertyId, RecordDescriptor, Value};

/// Lookup contract of a secondary index over one property.
pub trait IndexLookup {
    /// Descriptors of records whose indexed property equals `value`.
    fn lookup_exact(&self, property_id: PropertyId, value: &Value) -> Result<Vec<RecordDescriptor>>;

    /// Descriptors of records whose indexed property falls in the range.
    fn lookup_range(
        &self,
        property_id: PropertyId,
        low: Bound<&Value>,
        high: Bound<&Value>,
    ) -> Result<Vec<RecordDescriptor>>;
}

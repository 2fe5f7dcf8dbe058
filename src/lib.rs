//! Grafito core: schema catalog and record-query layer of an embedded
//! graph database built atop a sorted key-value store.
//!
//! The catalog durably encodes class and property definitions into compact
//! binary rows keyed for prefix/range scanning; the query engine retrieves,
//! filters, and materializes data records by identity, condition, boolean
//! condition trees, or arbitrary predicates.

pub mod error;
pub mod logging;
pub mod query;
pub mod storage;
pub mod types;

pub use error::{DbError, Result};
pub use query::{Comparator, Condition, MultiCondition, RecordQuery, ResultSetCursor};
pub use storage::catalog::{ClassTable, PropertyTable, SchemaCatalog};
pub use types::{
    ClassAccessInfo, ClassId, ClassType, PropertyAccessInfo, PropertyId, PropertyType, Record,
    RecordDescriptor, RecordMeta, ResultEntry, ResultSet, Value,
};

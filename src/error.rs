//! Error handling for catalog and record-query operations.
//!
//! All public APIs return `Result<T, DbError>`. Operations fail fast; no
//! retry policy lives at this layer. Lookups that can legitimately miss
//! (`get_info`, `get_id`) return empty/zero sentinels instead of errors.

use std::io;

use thiserror::Error;

use crate::query::Comparator;
use crate::types::{ClassId, PropertyType, RecordDescriptor, Value};

/// Result type for all catalog and query operations.
pub type Result<T> = std::result::Result<T, DbError>;

/// Errors raised by the schema catalog and the record query engine.
#[derive(Debug, Error)]
pub enum DbError {
    /// A class with the given name already exists in the catalog.
    #[error("class '{0}' already exists")]
    DuplicateClass(String),

    /// No class with the given name exists in the catalog.
    #[error("class '{0}' not found")]
    ClassNotFound(String),

    /// A property with the given name already exists for the class.
    #[error("property '{name}' already exists for class {class_id}")]
    DuplicateProperty {
        /// Owning class.
        class_id: ClassId,
        /// Offending property name.
        name: String,
    },

    /// No property with the given name exists for the class.
    #[error("property '{name}' not found for class {class_id}")]
    PropertyNotFound {
        /// Owning class.
        class_id: ClassId,
        /// Missing property name.
        name: String,
    },

    /// The descriptor does not resolve to a stored record.
    #[error("record {0} not found")]
    RecordNotFound(RecordDescriptor),

    /// A condition operand disagrees with the schema's declared property type.
    #[error("type mismatch on property '{property}': declared {declared:?}, operand {operand}")]
    TypeMismatch {
        /// Conditioned property name.
        property: String,
        /// Type declared by the schema.
        declared: PropertyType,
        /// Operand value supplied by the condition.
        operand: Value,
    },

    /// A multi-condition leaf references a property name absent from the
    /// supplied name-to-type map.
    #[error("condition references unknown property '{0}'")]
    InvalidConditionReference(String),

    /// The comparator cannot be applied to values of the declared type.
    #[error("comparator {comparator:?} unsupported for property type {property_type:?}")]
    UnsupportedComparator {
        /// Requested comparator.
        comparator: Comparator,
        /// Declared property type it was applied to.
        property_type: PropertyType,
    },

    /// On-disk corruption or a codec/key-format mismatch. Not recoverable
    /// locally; terminates the current operation and, conventionally, the
    /// enclosing transaction.
    #[error("corruption detected: {0}")]
    Corruption(String),

    /// Invalid configuration or argument (e.g. an over-long property name).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// I/O error surfaced by the underlying store.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

//! Storage layer: key-value contracts, binary codecs, schema catalog, and
//! the in-memory reference engine.

/// Schema catalog tables and composite-key format.
pub mod catalog;

/// Fixed-offset binary codec for catalog rows.
pub mod codec;

/// Secondary-index lookup seam.
pub mod index;

/// Contract onto the sorted key-value engine.
pub mod kv;

/// In-memory engine implementing the store contracts.
pub mod memory;

/// Record store contract and record-blob codec.
pub mod record;

pub use catalog::{ClassTable, PropertyTable, SchemaCatalog, MAX_PROPERTY_NAME_LEN};
pub use kv::{KeyValCursor, KeyValEntry, KeyValTree};
pub use memory::{MemoryRecordStore, MemoryTree};
pub use record::{PropertySchema, RecordScan, RecordStore, RECORD_HEADER_LEN};

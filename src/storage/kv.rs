//! Contract consumed from the underlying sorted key-value engine.
//!
//! Keys compare lexicographically as raw bytes. Isolation, locking, and
//! durability all belong to the engine; one trait handle stands for one
//! named table viewed through the caller's open transaction.

use crate::error::Result;

/// One key/value pair produced by a cursor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyValEntry {
    /// Raw key bytes.
    pub key: Vec<u8>,
    /// Raw value bytes.
    pub value: Vec<u8>,
}

/// One named table inside an open transaction.
///
/// Mutations go through `&self`: real engines route writes through an
/// interior transaction handle, exactly like an LMDB dbi bound to a txn.
pub trait KeyValTree {
    /// Point lookup. `None` on a missing key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Inserts or overwrites one key.
    fn put(&self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Deletes one key. Deleting an absent key is a no-op.
    fn del(&self, key: &[u8]) -> Result<()>;

    /// Opens a range-scan cursor over the table.
    fn cursor(&self) -> Result<Box<dyn KeyValCursor + '_>>;
}

/// Forward-only range cursor over a [`KeyValTree`].
pub trait KeyValCursor {
    /// Positions at the first entry with key >= `start`, returning it, or
    /// `None` when the keyspace past `start` is empty.
    fn find_range(&mut self, start: &[u8]) -> Result<Option<KeyValEntry>>;

    /// Advances past the current position. `None` at end of keyspace.
    fn get_next(&mut self) -> Result<Option<KeyValEntry>>;
}

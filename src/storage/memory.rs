//! In-memory engine implementing the store contracts.
//!
//! Stands in for the external transactional key-value engine so the catalog
//! and query engine are usable and testable standalone. Ordered maps behind
//! `parking_lot` locks give the same handle semantics as a real engine's
//! transaction-bound tables; no durability is claimed.

use std::collections::BTreeMap;
use std::ops::Bound;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::storage::kv::{KeyValCursor, KeyValEntry, KeyValTree};
use crate::storage::record::{RecordScan, RecordStore};
use crate::types::{ClassId, PositionId, RecordDescriptor};

/// Ordered in-memory table with byte-lexicographic key order.
#[derive(Default)]
pub struct MemoryTree {
    map: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryTree {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    /// Whether the table holds no keys.
    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }
}

impl KeyValTree for MemoryTree {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.map.read().get(key).cloned())
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.map.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn del(&self, key: &[u8]) -> Result<()> {
        self.map.write().remove(key);
        Ok(())
    }

    fn cursor(&self) -> Result<Box<dyn KeyValCursor + '_>> {
        Ok(Box::new(MemoryCursor {
            tree: self,
            at: None,
        }))
    }
}

struct MemoryCursor<'t> {
    tree: &'t MemoryTree,
    at: Option<Vec<u8>>,
}

impl KeyValCursor for MemoryCursor<'_> {
    fn find_range(&mut self, start: &[u8]) -> Result<Option<KeyValEntry>> {
        let map = self.tree.map.read();
        let entry = map
            .range::<[u8], _>((Bound::Included(start), Bound::Unbounded))
            .next()
            .map(|(k, v)| KeyValEntry {
                key: k.clone(),
                value: v.clone(),
            });
        self.at = entry.as_ref().map(|e| e.key.clone());
        Ok(entry)
    }

    fn get_next(&mut self) -> Result<Option<KeyValEntry>> {
        let Some(cur) = self.at.clone() else {
            return Ok(None);
        };
        let map = self.tree.map.read();
        let entry = map
            .range::<[u8], _>((Bound::Excluded(cur.as_slice()), Bound::Unbounded))
            .next()
            .map(|(k, v)| KeyValEntry {
                key: k.clone(),
                value: v.clone(),
            });
        if let Some(e) = &entry {
            self.at = Some(e.key.clone());
        }
        Ok(entry)
    }
}

#[derive(Default)]
struct ClassRecords {
    rows: BTreeMap<PositionId, Vec<u8>>,
    next_position: u32,
}

/// In-memory record store keyed by `(class id, position id)`.
#[derive(Default)]
pub struct MemoryRecordStore {
    classes: RwLock<FxHashMap<ClassId, ClassRecords>>,
}

impl MemoryRecordStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a blob under the class, assigning the next position id.
    pub fn insert(&self, class_id: ClassId, blob: Vec<u8>) -> RecordDescriptor {
        let mut classes = self.classes.write();
        let class = classes.entry(class_id).or_default();
        class.next_position += 1;
        let position = PositionId(class.next_position);
        class.rows.insert(position, blob);
        RecordDescriptor::new(class_id, position)
    }

    /// Overwrites the blob of an existing descriptor, returning whether the
    /// descriptor resolved.
    pub fn update(&self, descriptor: RecordDescriptor, blob: Vec<u8>) -> bool {
        let mut classes = self.classes.write();
        match classes
            .get_mut(&descriptor.class_id)
            .and_then(|c| c.rows.get_mut(&descriptor.position_id))
        {
            Some(row) => {
                *row = blob;
                true
            }
            None => false,
        }
    }

    /// Removes one record, returning whether the descriptor resolved.
    pub fn remove(&self, descriptor: RecordDescriptor) -> bool {
        let mut classes = self.classes.write();
        classes
            .get_mut(&descriptor.class_id)
            .and_then(|c| c.rows.remove(&descriptor.position_id))
            .is_some()
    }
}

impl RecordStore for MemoryRecordStore {
    fn fetch(&self, class_id: ClassId, position_id: PositionId) -> Result<Option<Vec<u8>>> {
        Ok(self
            .classes
            .read()
            .get(&class_id)
            .and_then(|c| c.rows.get(&position_id))
            .cloned())
    }

    fn scan(&self, class_id: ClassId) -> Result<Box<dyn RecordScan + '_>> {
        Ok(Box::new(MemoryRecordScan {
            store: self,
            class_id,
            at: None,
        }))
    }
}

struct MemoryRecordScan<'s> {
    store: &'s MemoryRecordStore,
    class_id: ClassId,
    at: Option<PositionId>,
}

impl RecordScan for MemoryRecordScan<'_> {
    fn next_record(&mut self) -> Result<Option<(RecordDescriptor, Vec<u8>)>> {
        let classes = self.store.classes.read();
        let Some(class) = classes.get(&self.class_id) else {
            return Ok(None);
        };
        let lower = match self.at {
            Some(pos) => Bound::Excluded(pos),
            None => Bound::Unbounded,
        };
        let next = class
            .rows
            .range((lower, Bound::Unbounded))
            .next()
            .map(|(pos, blob)| (*pos, blob.clone()));
        match next {
            Some((pos, blob)) => {
                self.at = Some(pos);
                Ok(Some((RecordDescriptor::new(self.class_id, pos), blob)))
            }
            None => Ok(None),
        }
    }
}

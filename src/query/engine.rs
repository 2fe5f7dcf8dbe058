//! Record query engine: retrieval and filtering of one class's records.
//!
//! Every filtering path is a full scan over the class's records with a
//! per-record decode. All scans funnel through [`RecordQuery::filtered`],
//! the seam where an [`IndexLookup`](crate::storage::index::IndexLookup)
//! implementation could later replace the scan for a single condition
//! without changing the public contract.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{DbError, Result};
use crate::query::condition::{Condition, MultiCondition};
use crate::storage::catalog::SchemaCatalog;
use crate::storage::record::{
    decode_record, decode_record_with_meta, PropertySchema, RecordScan, RecordStore,
};
use crate::types::{
    ClassAccessInfo, PropertyType, Record, RecordDescriptor, ResultEntry, ResultSet,
};

/// Query interface over the records of one transaction.
///
/// Holds only borrowed handles; no state is retained across calls beyond
/// the transaction-scoped references bound at construction.
pub struct RecordQuery<'tx> {
    catalog: &'tx SchemaCatalog<'tx>,
    records: &'tx dyn RecordStore,
}

impl<'tx> RecordQuery<'tx> {
    /// Binds the engine to the catalog and record store of one transaction.
    pub fn new(catalog: &'tx SchemaCatalog<'tx>, records: &'tx dyn RecordStore) -> Self {
        Self { catalog, records }
    }

    fn schema(&self, class_info: &ClassAccessInfo) -> Result<PropertySchema> {
        let infos = self.catalog.properties.get_infos(class_info.id)?;
        Ok(PropertySchema::from_infos(&infos))
    }

    fn fetch_blob(&self, class_info: &ClassAccessInfo, descriptor: RecordDescriptor) -> Result<Vec<u8>> {
        if descriptor.class_id != class_info.id {
            return Err(DbError::InvalidArgument(format!(
                "descriptor {descriptor} does not belong to class '{}'",
                class_info.name
            )));
        }
        self.records
            .fetch(descriptor.class_id, descriptor.position_id)?
            .ok_or(DbError::RecordNotFound(descriptor))
    }

    /// Fully decoded record for one descriptor.
    pub fn get_record(&self, class_info: &ClassAccessInfo, descriptor: RecordDescriptor) -> Result<Record> {
        let schema = self.schema(class_info)?;
        decode_record(&schema, &self.fetch_blob(class_info, descriptor)?)
    }

    /// Like [`get_record`] but also populates the reserved bookkeeping
    /// fields the plain decode path skips. Property values never diverge.
    ///
    /// [`get_record`]: RecordQuery::get_record
    pub fn get_record_with_basic_info(
        &self,
        class_info: &ClassAccessInfo,
        descriptor: RecordDescriptor,
    ) -> Result<Record> {
        let schema = self.schema(class_info)?;
        decode_record_with_meta(&schema, &self.fetch_blob(class_info, descriptor)?)
    }

    /// Batched retrieval over an explicit descriptor sequence. Input order
    /// is preserved; one missing descriptor fails the whole call.
    pub fn get_result_set_for(
        &self,
        class_info: &ClassAccessInfo,
        descriptors: &[RecordDescriptor],
    ) -> Result<ResultSet> {
        let schema = self.schema(class_info)?;
        descriptors
            .iter()
            .map(|&descriptor| {
                let record = decode_record(&schema, &self.fetch_blob(class_info, descriptor)?)?;
                Ok(ResultEntry { descriptor, record })
            })
            .collect()
    }

    /// Every record of the class, in the record store's native iteration
    /// order. Callers must not assume any semantic ordering.
    pub fn get_result_set(&self, class_info: &ClassAccessInfo) -> Result<ResultSet> {
        self.filtered(class_info, |_| true)
    }

    /// Lazy, forward-only, single-pass counterpart of [`get_result_set`].
    /// Dropping or exhausting the cursor releases the scan resource.
    ///
    /// [`get_result_set`]: RecordQuery::get_result_set
    pub fn get_result_set_cursor(&self, class_info: &ClassAccessInfo) -> Result<ResultSetCursor<'tx>> {
        let schema = self.schema(class_info)?;
        let scan = self.records.scan(class_info.id)?;
        Ok(ResultSetCursor { scan, schema })
    }

    /// Records whose named property, interpreted as `property_type`,
    /// satisfies the condition.
    pub fn get_result_set_by_condition(
        &self,
        class_info: &ClassAccessInfo,
        property_type: PropertyType,
        condition: &Condition,
    ) -> Result<ResultSet> {
        condition.validate(property_type)?;
        self.filtered(class_info, |record| {
            condition.matches(record.get(&condition.property))
        })
    }

    /// Descriptor-only counterpart of [`get_result_set_by_condition`]:
    /// identical scan and filter, no payload materialization for callers
    /// that only need identity.
    ///
    /// [`get_result_set_by_condition`]: RecordQuery::get_result_set_by_condition
    pub fn get_record_descriptor_by_condition(
        &self,
        class_info: &ClassAccessInfo,
        property_type: PropertyType,
        condition: &Condition,
    ) -> Result<Vec<RecordDescriptor>> {
        condition.validate(property_type)?;
        self.filtered_descriptors(class_info, |record| {
            condition.matches(record.get(&condition.property))
        })
    }

    /// Records satisfying a boolean expression tree. Every property name
    /// referenced in the tree must exist in `property_types`; the tree is
    /// validated up front so evaluation never fails mid-scan.
    pub fn get_result_set_by_multi_condition(
        &self,
        class_info: &ClassAccessInfo,
        property_types: &HashMap<String, PropertyType>,
        multi_condition: &MultiCondition,
    ) -> Result<ResultSet> {
        multi_condition.validate(property_types)?;
        self.filtered(class_info, |record| multi_condition.matches(record))
    }

    /// Descriptor-only counterpart of [`get_result_set_by_multi_condition`].
    ///
    /// [`get_result_set_by_multi_condition`]: RecordQuery::get_result_set_by_multi_condition
    pub fn get_record_descriptor_by_multi_condition(
        &self,
        class_info: &ClassAccessInfo,
        property_types: &HashMap<String, PropertyType>,
        multi_condition: &MultiCondition,
    ) -> Result<Vec<RecordDescriptor>> {
        multi_condition.validate(property_types)?;
        self.filtered_descriptors(class_info, |record| multi_condition.matches(record))
    }

    /// Escape hatch: records satisfying an arbitrary caller-supplied
    /// predicate. Opaque to the engine; no index can ever serve this path.
    pub fn get_result_set_by_cmp_function<F>(
        &self,
        class_info: &ClassAccessInfo,
        condition: F,
    ) -> Result<ResultSet>
    where
        F: Fn(&Record) -> bool,
    {
        self.filtered(class_info, condition)
    }

    /// Descriptor-only counterpart of [`get_result_set_by_cmp_function`].
    ///
    /// [`get_result_set_by_cmp_function`]: RecordQuery::get_result_set_by_cmp_function
    pub fn get_record_descriptor_by_cmp_function<F>(
        &self,
        class_info: &ClassAccessInfo,
        condition: F,
    ) -> Result<Vec<RecordDescriptor>>
    where
        F: Fn(&Record) -> bool,
    {
        self.filtered_descriptors(class_info, condition)
    }

    fn filtered<F>(&self, class_info: &ClassAccessInfo, keep: F) -> Result<ResultSet>
    where
        F: Fn(&Record) -> bool,
    {
        let schema = self.schema(class_info)?;
        let mut scan = self.records.scan(class_info.id)?;
        let mut result = Vec::new();
        let mut scanned = 0usize;
        while let Some((descriptor, blob)) = scan.next_record()? {
            scanned += 1;
            let record = decode_record(&schema, &blob)?;
            if keep(&record) {
                result.push(ResultEntry { descriptor, record });
            }
        }
        debug!(class = %class_info.name, scanned, matched = result.len(), "query.scan");
        Ok(result)
    }

    fn filtered_descriptors<F>(
        &self,
        class_info: &ClassAccessInfo,
        keep: F,
    ) -> Result<Vec<RecordDescriptor>>
    where
        F: Fn(&Record) -> bool,
    {
        let schema = self.schema(class_info)?;
        let mut scan = self.records.scan(class_info.id)?;
        let mut result = Vec::new();
        let mut scanned = 0usize;
        while let Some((descriptor, blob)) = scan.next_record()? {
            scanned += 1;
            let record = decode_record(&schema, &blob)?;
            if keep(&record) {
                result.push(descriptor);
            }
        }
        debug!(class = %class_info.name, scanned, matched = result.len(), "query.scan_descriptors");
        Ok(result)
    }
}

/// Lazy, forward-only producer of decoded records over one scan resource.
///
/// Restartable only by requesting a new cursor from the engine. The
/// underlying scan handle is released on drop, on every exit path.
pub struct ResultSetCursor<'tx> {
    scan: Box<dyn RecordScan + 'tx>,
    schema: PropertySchema,
}

impl Iterator for ResultSetCursor<'_> {
    type Item = Result<ResultEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.scan.next_record() {
            Ok(Some((descriptor, blob))) => Some(
                decode_record(&self.schema, &blob).map(|record| ResultEntry { descriptor, record }),
            ),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

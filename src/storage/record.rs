//! Record store contract and the record-blob codec.
//!
//! The record store maps `(class id, position id)` to an encoded
//! property-value blob. This layer consumes it through a narrow read
//! contract; the write path belongs to the engine above.
//!
//! Blob layout:
//! `{version u32-LE}{created_at u64-LE}{updated_at u64-LE}` then repeated
//! `{prop_id u16-LE}{len u32-LE}{value bytes}` entries until the end.
//! Value bytes are interpreted per the schema's declared property type.

use rustc_hash::FxHashMap;

use crate::error::{DbError, Result};
use crate::types::{
    ClassId, PositionId, PropertyAccessInfo, PropertyId, PropertyType, Record, RecordDescriptor,
    RecordMeta, Value,
};

/// Byte length of the fixed blob header preceding property entries.
pub const RECORD_HEADER_LEN: usize = 4 + 8 + 8;

/// Narrow read contract onto the record store.
pub trait RecordStore {
    /// Raw blob for one record, `None` if the position does not resolve.
    fn fetch(&self, class_id: ClassId, position_id: PositionId) -> Result<Option<Vec<u8>>>;

    /// Opens a scan over every record of one class, in the store's native
    /// iteration order.
    fn scan(&self, class_id: ClassId) -> Result<Box<dyn RecordScan + '_>>;
}

/// Forward-only, single-pass producer of `(descriptor, raw blob)` pairs.
/// Dropping the scan releases the underlying store resource.
pub trait RecordScan {
    /// Next record of the class, or `None` when exhausted.
    fn next_record(&mut self) -> Result<Option<(RecordDescriptor, Vec<u8>)>>;
}

/// Property-id resolution map built from one class's catalog rows.
#[derive(Clone, Debug, Default)]
pub struct PropertySchema {
    by_id: FxHashMap<PropertyId, (String, PropertyType)>,
}

impl PropertySchema {
    /// Builds the id-keyed decode map from catalog property rows.
    pub fn from_infos(infos: &[PropertyAccessInfo]) -> Self {
        let mut by_id = FxHashMap::default();
        for info in infos {
            by_id.insert(info.id, (info.name.clone(), info.property_type));
        }
        Self { by_id }
    }

    /// Name and declared type of a property id, if the class declares it.
    pub fn resolve(&self, id: PropertyId) -> Option<(&str, PropertyType)> {
        self.by_id.get(&id).map(|(name, ty)| (name.as_str(), *ty))
    }
}

/// Parses the bookkeeping header of a record blob.
pub fn decode_meta(blob: &[u8]) -> Result<RecordMeta> {
    if blob.len() < RECORD_HEADER_LEN {
        return Err(DbError::Corruption(format!(
            "record blob truncated: {} bytes",
            blob.len()
        )));
    }
    let version = u32::from_le_bytes(blob[0..4].try_into().expect("4-byte slice"));
    let created_at = u64::from_le_bytes(blob[4..12].try_into().expect("8-byte slice"));
    let updated_at = u64::from_le_bytes(blob[12..20].try_into().expect("8-byte slice"));
    Ok(RecordMeta {
        version,
        created_at,
        updated_at,
    })
}

/// Decodes a record blob into typed fields using the class schema. The
/// header is skipped; [`decode_record_with_meta`] parses it as well.
pub fn decode_record(schema: &PropertySchema, blob: &[u8]) -> Result<Record> {
    if blob.len() < RECORD_HEADER_LEN {
        return Err(DbError::Corruption(format!(
            "record blob truncated: {} bytes",
            blob.len()
        )));
    }
    let mut record = Record::default();
    let mut at = RECORD_HEADER_LEN;
    while at < blob.len() {
        if at + 6 > blob.len() {
            return Err(DbError::Corruption(
                "record entry header extends past blob end".into(),
            ));
        }
        let prop_id = PropertyId(u16::from_le_bytes([blob[at], blob[at + 1]]));
        let len = u32::from_le_bytes(blob[at + 2..at + 6].try_into().expect("4-byte slice")) as usize;
        at += 6;
        if at + len > blob.len() {
            return Err(DbError::Corruption(format!(
                "record entry for property {prop_id} extends past blob end"
            )));
        }
        let raw = &blob[at..at + len];
        at += len;
        let Some((name, ty)) = schema.resolve(prop_id) else {
            // A stale or foreign property id means the blob and the schema
            // disagree; dropping the value silently is not an option.
            return Err(DbError::Corruption(format!(
                "record references property id {prop_id} absent from class schema"
            )));
        };
        record.props.insert(name.to_owned(), decode_value(ty, raw)?);
    }
    Ok(record)
}

/// Like [`decode_record`] but also populates the reserved metadata fields.
/// Property values never diverge from the plain path.
pub fn decode_record_with_meta(schema: &PropertySchema, blob: &[u8]) -> Result<Record> {
    let mut record = decode_record(schema, blob)?;
    record.meta = Some(decode_meta(blob)?);
    Ok(record)
}

fn decode_value(ty: PropertyType, raw: &[u8]) -> Result<Value> {
    let fixed = |want: usize| -> Result<()> {
        if raw.len() == want {
            Ok(())
        } else {
            Err(DbError::Corruption(format!(
                "value of type {ty:?} has {} bytes, expected {want}",
                raw.len()
            )))
        }
    };
    match ty {
        PropertyType::Undefined => Err(DbError::Corruption(
            "stored value for property of undefined type".into(),
        )),
        PropertyType::TinyInt => {
            fixed(1)?;
            Ok(Value::TinyInt(raw[0] as i8))
        }
        PropertyType::SmallInt => {
            fixed(2)?;
            Ok(Value::SmallInt(i16::from_le_bytes([raw[0], raw[1]])))
        }
        PropertyType::Integer => {
            fixed(4)?;
            Ok(Value::Int(i32::from_le_bytes(
                raw.try_into().expect("4-byte slice"),
            )))
        }
        PropertyType::BigInt => {
            fixed(8)?;
            Ok(Value::BigInt(i64::from_le_bytes(
                raw.try_into().expect("8-byte slice"),
            )))
        }
        PropertyType::Real => {
            fixed(8)?;
            Ok(Value::Real(f64::from_le_bytes(
                raw.try_into().expect("8-byte slice"),
            )))
        }
        PropertyType::Text => Ok(Value::Text(
            std::str::from_utf8(raw)
                .map_err(|_| DbError::Corruption("text value is not valid UTF-8".into()))?
                .to_owned(),
        )),
        PropertyType::Blob => Ok(Value::Blob(raw.to_vec())),
    }
}

/// Encodes typed fields into a record blob. Counterpart of
/// [`decode_record`]; used by the write path of embedding engines and by
/// fixtures.
pub fn encode_record(meta: RecordMeta, entries: &[(PropertyId, Value)]) -> Result<Vec<u8>> {
    let mut blob = Vec::with_capacity(RECORD_HEADER_LEN + entries.len() * 16);
    blob.extend_from_slice(&meta.version.to_le_bytes());
    blob.extend_from_slice(&meta.created_at.to_le_bytes());
    blob.extend_from_slice(&meta.updated_at.to_le_bytes());
    for (id, value) in entries {
        let raw = encode_value(value)?;
        blob.extend_from_slice(&id.0.to_le_bytes());
        blob.extend_from_slice(&(raw.len() as u32).to_le_bytes());
        blob.extend_from_slice(&raw);
    }
    Ok(blob)
}

fn encode_value(value: &Value) -> Result<Vec<u8>> {
    match value {
        Value::Null => Err(DbError::InvalidArgument(
            "null values are stored by omitting the property".into(),
        )),
        Value::TinyInt(v) => Ok(vec![*v as u8]),
        Value::SmallInt(v) => Ok(v.to_le_bytes().to_vec()),
        Value::Int(v) => Ok(v.to_le_bytes().to_vec()),
        Value::BigInt(v) => Ok(v.to_le_bytes().to_vec()),
        Value::Real(v) => Ok(v.to_le_bytes().to_vec()),
        Value::Text(v) => Ok(v.as_bytes().to_vec()),
        Value::Blob(v) => Ok(v.clone()),
    }
}

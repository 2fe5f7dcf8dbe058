//! Fixed-offset binary codec for catalog rows.
//!
//! Layouts are a durable compatibility surface: other processes and versions
//! must agree on them byte for byte. No checksums; crash consistency is the
//! key-value engine's problem. Semantic validation is the catalog's problem.
//!
//! Class row value: `{id u16-LE}{super_class_id u16-LE}{type u8}`.
//! Property row value: `{id u16-LE}{type u8}`.

use crate::error::{DbError, Result};
use crate::types::{ClassAccessInfo, ClassId, ClassType, PropertyAccessInfo, PropertyId, PropertyType};

/// Encoded size of a class row value.
pub const CLASS_ROW_LEN: usize = 5;
/// Encoded size of a property row value.
pub const PROPERTY_ROW_LEN: usize = 3;

/// Encodes the value bytes of a class row. The key (class name) is not part
/// of the value.
pub fn encode_class(info: &ClassAccessInfo) -> Vec<u8> {
    let mut buf = Vec::with_capacity(CLASS_ROW_LEN);
    buf.extend_from_slice(&info.id.0.to_le_bytes());
    buf.extend_from_slice(&info.super_class_id.0.to_le_bytes());
    buf.push(info.class_type.to_byte());
    buf
}

/// Decodes a class row value, pairing it with the name it was keyed under.
pub fn decode_class(name: &str, value: &[u8]) -> Result<ClassAccessInfo> {
    if value.len() < CLASS_ROW_LEN {
        return Err(DbError::Corruption(format!(
            "class row for '{name}' truncated: {} bytes",
            value.len()
        )));
    }
    let id = u16::from_le_bytes([value[0], value[1]]);
    let super_class_id = u16::from_le_bytes([value[2], value[3]]);
    let class_type = ClassType::from_byte(value[4]).ok_or_else(|| {
        DbError::Corruption(format!("class row for '{name}': unknown type tag {}", value[4]))
    })?;
    Ok(ClassAccessInfo {
        name: name.to_owned(),
        id: ClassId(id),
        super_class_id: ClassId(super_class_id),
        class_type,
    })
}

/// Decodes only the class id from a class row value.
pub fn decode_class_id(value: &[u8]) -> Result<ClassId> {
    if value.len() < 2 {
        return Err(DbError::Corruption(format!(
            "class row truncated: {} bytes",
            value.len()
        )));
    }
    Ok(ClassId(u16::from_le_bytes([value[0], value[1]])))
}

/// Encodes the value bytes of a property row. The composite key is built by
/// the catalog, not here.
pub fn encode_property(info: &PropertyAccessInfo) -> Vec<u8> {
    let mut buf = Vec::with_capacity(PROPERTY_ROW_LEN);
    buf.extend_from_slice(&info.id.0.to_le_bytes());
    buf.push(info.property_type.to_byte());
    buf
}

/// Decodes a property row value, pairing it with the key parts it was
/// stored under.
pub fn decode_property(class_id: ClassId, name: &str, value: &[u8]) -> Result<PropertyAccessInfo> {
    if value.len() < PROPERTY_ROW_LEN {
        return Err(DbError::Corruption(format!(
            "property row for {class_id}/'{name}' truncated: {} bytes",
            value.len()
        )));
    }
    let id = u16::from_le_bytes([value[0], value[1]]);
    let property_type = PropertyType::from_byte(value[2]).ok_or_else(|| {
        DbError::Corruption(format!(
            "property row for {class_id}/'{name}': unknown type tag {}",
            value[2]
        ))
    })?;
    Ok(PropertyAccessInfo {
        class_id,
        name: name.to_owned(),
        id: PropertyId(id),
        property_type,
    })
}

/// Decodes only the property id from a property row value.
pub fn decode_property_id(value: &[u8]) -> Result<PropertyId> {
    if value.len() < 2 {
        return Err(DbError::Corruption(format!(
            "property row truncated: {} bytes",
            value.len()
        )));
    }
    Ok(PropertyId(u16::from_le_bytes([value[0], value[1]])))
}

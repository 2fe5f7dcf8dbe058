//! Core identifier, schema, and value types shared across the catalog and
//! the record query engine.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable numeric identifier of a class. Zero means null/unset.
#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default, Serialize, Deserialize,
)]
pub struct ClassId(pub u16);

/// Identifier of a property, unique within its owning class. Zero means unset.
#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default, Serialize, Deserialize,
)]
pub struct PropertyId(pub u16);

/// Identifier of a secondary index. Zero means unset.
#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default, Serialize, Deserialize,
)]
pub struct IndexId(pub u16);

/// Class-local position of a stored record.
#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default, Serialize, Deserialize,
)]
pub struct PositionId(pub u32);

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for PositionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of a class: vertex, edge, or not yet assigned.
#[repr(u8)]
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Serialize, Deserialize)]
pub enum ClassType {
    /// Not yet assigned.
    #[default]
    Undefined = 0,
    /// Vertex class.
    Vertex = 1,
    /// Edge class.
    Edge = 2,
}

impl ClassType {
    /// Decodes the stored tag byte.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Undefined),
            1 => Some(Self::Vertex),
            2 => Some(Self::Edge),
            _ => None,
        }
    }

    /// Encodes the stored tag byte.
    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

/// Declared value type of a property. Tags are a durable on-disk surface.
#[repr(u8)]
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Serialize, Deserialize)]
pub enum PropertyType {
    /// Not yet assigned.
    #[default]
    Undefined = 0,
    /// 8-bit signed integer.
    TinyInt = 1,
    /// 16-bit signed integer.
    SmallInt = 2,
    /// 32-bit signed integer.
    Integer = 3,
    /// 64-bit signed integer.
    BigInt = 4,
    /// 64-bit floating point.
    Real = 5,
    /// UTF-8 string.
    Text = 6,
    /// Raw bytes.
    Blob = 7,
}

impl PropertyType {
    /// Decodes the stored tag byte.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Undefined),
            1 => Some(Self::TinyInt),
            2 => Some(Self::SmallInt),
            3 => Some(Self::Integer),
            4 => Some(Self::BigInt),
            5 => Some(Self::Real),
            6 => Some(Self::Text),
            7 => Some(Self::Blob),
            _ => None,
        }
    }

    /// Encodes the stored tag byte.
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Whether the type holds a number (integer families or real).
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::TinyInt | Self::SmallInt | Self::Integer | Self::BigInt | Self::Real
        )
    }
}

/// Catalog row identifying a vertex or edge class.
///
/// `name` is the catalog key; `id` is assigned at creation and never reused.
/// `super_class_id` of zero means no parent. Referential validity of the
/// parent is enforced by a higher layer; the catalog only stores the value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassAccessInfo {
    /// Unique, non-empty class name.
    pub name: String,
    /// Stable numeric id; never zero for a stored class.
    pub id: ClassId,
    /// Parent class id, zero when the class has no parent.
    pub super_class_id: ClassId,
    /// Vertex/edge discriminator.
    pub class_type: ClassType,
}

/// Catalog row identifying one property of one class.
///
/// `(class_id, name)` is the catalog key; `id` is unique within the class.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyAccessInfo {
    /// Owning class.
    pub class_id: ClassId,
    /// Property name, unique per class.
    pub name: String,
    /// Numeric id, unique within the class.
    pub id: PropertyId,
    /// Declared value type.
    pub property_type: PropertyType,
}

/// Descriptor row of a secondary index over one property.
///
/// Extension seam: declared for key/layout compatibility, not consulted by
/// the scan-based query engine.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexAccessInfo {
    /// Indexed property.
    pub property_id: PropertyId,
    /// Index id.
    pub id: IndexId,
    /// Whether the index spans multiple properties.
    pub is_composite: bool,
    /// Whether indexed values are unique.
    pub is_unique: bool,
    /// Owning class.
    pub class_id: ClassId,
}

/// Lightweight identity handle of a stored record, without its payload.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
pub struct RecordDescriptor {
    /// Class the record belongs to.
    pub class_id: ClassId,
    /// Class-local position.
    pub position_id: PositionId,
}

impl RecordDescriptor {
    /// Creates a descriptor from raw id parts.
    pub fn new(class_id: ClassId, position_id: PositionId) -> Self {
        Self {
            class_id,
            position_id,
        }
    }
}

impl fmt::Display for RecordDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}:{}", self.class_id, self.position_id)
    }
}

/// Typed property value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "v")]
pub enum Value {
    /// Absent / null value.
    Null,
    /// 8-bit signed integer.
    TinyInt(i8),
    /// 16-bit signed integer.
    SmallInt(i16),
    /// 32-bit signed integer.
    Int(i32),
    /// 64-bit signed integer.
    BigInt(i64),
    /// 64-bit floating point.
    Real(f64),
    /// UTF-8 string.
    Text(String),
    /// Raw bytes.
    Blob(Vec<u8>),
}

impl Value {
    /// Integer view of the value, when it holds one of the integer families.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::TinyInt(v) => Some(i64::from(*v)),
            Value::SmallInt(v) => Some(i64::from(*v)),
            Value::Int(v) => Some(i64::from(*v)),
            Value::BigInt(v) => Some(*v),
            _ => None,
        }
    }

    /// Floating-point view of any numeric value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Real(v) => Some(*v),
            other => other.as_i64().map(|v| v as f64),
        }
    }

    /// Ordered comparison between values of compatible families. Integer
    /// families compare as i64; mixing in a real promotes both sides to f64.
    pub fn partial_cmp_value(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Blob(a), Value::Blob(b)) => Some(a.cmp(b)),
            (Value::Real(_), _) | (_, Value::Real(_)) => {
                self.as_f64()?.partial_cmp(&other.as_f64()?)
            }
            _ => Some(self.as_i64()?.cmp(&other.as_i64()?)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::TinyInt(v) => write!(f, "{v}"),
            Value::SmallInt(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::BigInt(v) => write!(f, "{v}"),
            Value::Real(v) => write!(f, "{v}"),
            Value::Text(v) => write!(f, "{v}"),
            Value::Blob(v) => write!(f, "bytes(len={})", v.len()),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::BigInt(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Blob(value)
    }
}

/// Reserved bookkeeping fields carried in every record blob header and
/// surfaced only by the basic-info retrieval path.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMeta {
    /// Record version, bumped on every overwrite.
    pub version: u32,
    /// Creation time, unix milliseconds.
    pub created_at: u64,
    /// Last modification time, unix milliseconds.
    pub updated_at: u64,
}

/// Decoded mapping from property name to typed value for one stored entity.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    /// Property values keyed by property name.
    pub props: BTreeMap<String, Value>,
    /// Bookkeeping metadata; `None` on the plain decode path.
    pub meta: Option<RecordMeta>,
}

impl Record {
    /// Value of a property, if the record carries it.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.props.get(name)
    }
}

/// One materialized match: identity plus decoded payload.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultEntry {
    /// Identity of the matched record.
    pub descriptor: RecordDescriptor,
    /// Decoded payload.
    pub record: Record,
}

/// Order-preserving collection of materialized matches.
pub type ResultSet = Vec<ResultEntry>;

//! Schema catalog: class and property tables over the key-value store.
//!
//! Class rows are keyed by class name. Property rows use a composite key,
//! `{decimal class id}{':'}{name right-aligned to MAX_PROPERTY_NAME_LEN
//! with ' '}`; the fixed-width padding makes every property of one class
//! share a prefix-aligned key so a single range scan yields the class's
//! properties in name order. Separator, padding character, and width are a
//! durable on-disk surface; changing any of them breaks existing stores.

use tracing::trace;

use crate::error::{DbError, Result};
use crate::storage::codec;
use crate::storage::kv::KeyValTree;
use crate::types::{ClassAccessInfo, ClassId, PropertyAccessInfo, PropertyId};

/// Separator between the class id and the padded property name.
pub const KEY_SEPARATOR: u8 = b':';
/// Padding character used to right-align property names.
pub const KEY_PADDING: u8 = b' ';
/// Fixed width property names are padded to inside composite keys.
pub const MAX_PROPERTY_NAME_LEN: usize = 128;

/// Builds the composite property key, or `None` when the name cannot form a
/// valid key (empty, over-long, or containing the separator).
fn property_key(class_id: ClassId, name: &str) -> Option<Vec<u8>> {
    if name.is_empty()
        || name.len() > MAX_PROPERTY_NAME_LEN
        || name.contains(':')
        || name.starts_with(KEY_PADDING as char)
    {
        return None;
    }
    let id_part = class_id.0.to_string();
    let mut key = Vec::with_capacity(id_part.len() + 1 + MAX_PROPERTY_NAME_LEN);
    key.extend_from_slice(id_part.as_bytes());
    key.push(KEY_SEPARATOR);
    key.resize(key.len() + MAX_PROPERTY_NAME_LEN - name.len(), KEY_PADDING);
    key.extend_from_slice(name.as_bytes());
    Some(key)
}

/// Lexicographically smallest possible key for the class: the scan start of
/// `get_infos`.
fn search_key_begin(class_id: ClassId) -> Vec<u8> {
    let id_part = class_id.0.to_string();
    let mut key = Vec::with_capacity(id_part.len() + 1 + MAX_PROPERTY_NAME_LEN);
    key.extend_from_slice(id_part.as_bytes());
    key.push(KEY_SEPARATOR);
    key.resize(key.len() + MAX_PROPERTY_NAME_LEN, KEY_PADDING);
    key
}

/// Splits a stored composite key back into `(class id, trimmed name)`.
///
/// Exactly one separator must occur; anything else means on-disk corruption
/// or a key-format mismatch and is fatal.
fn split_property_key(key: &[u8]) -> Result<(ClassId, String)> {
    let text = std::str::from_utf8(key)
        .map_err(|_| DbError::Corruption("property key is not valid UTF-8".into()))?;
    let mut parts = text.split(':');
    let (Some(id_part), Some(name_part), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(DbError::Corruption(format!(
            "property key '{text}' does not contain exactly one separator"
        )));
    };
    let class_id = id_part.parse::<u16>().map_err(|_| {
        DbError::Corruption(format!("property key '{text}' has non-numeric class id"))
    })?;
    Ok((
        ClassId(class_id),
        name_part.trim_start_matches(KEY_PADDING as char).to_owned(),
    ))
}

fn validate_property_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(DbError::InvalidArgument("property name is empty".into()));
    }
    if name.len() > MAX_PROPERTY_NAME_LEN {
        return Err(DbError::InvalidArgument(format!(
            "property name '{name}' exceeds {MAX_PROPERTY_NAME_LEN} bytes"
        )));
    }
    if name.contains(':') {
        return Err(DbError::InvalidArgument(format!(
            "property name '{name}' contains the key separator"
        )));
    }
    // Leading padding would not survive the trim on key parse.
    if name.starts_with(KEY_PADDING as char) {
        return Err(DbError::InvalidArgument(format!(
            "property name '{name}' begins with the key padding character"
        )));
    }
    Ok(())
}

/// Class table: `name -> {id, super class id, type}` rows.
pub struct ClassTable<'tx> {
    tree: &'tx dyn KeyValTree,
}

impl<'tx> ClassTable<'tx> {
    /// Binds the table to one open store handle.
    pub fn new(tree: &'tx dyn KeyValTree) -> Self {
        Self { tree }
    }

    /// Inserts a new class row. Fails if the name is already taken.
    pub fn create(&self, info: &ClassAccessInfo) -> Result<()> {
        if info.name.is_empty() {
            return Err(DbError::InvalidArgument("class name is empty".into()));
        }
        if self.tree.get(info.name.as_bytes())?.is_some() {
            return Err(DbError::DuplicateClass(info.name.clone()));
        }
        self.tree.put(info.name.as_bytes(), &codec::encode_class(info))?;
        trace!(class = %info.name, id = %info.id, "catalog.class.create");
        Ok(())
    }

    /// Overwrites the row of an existing class, name unchanged.
    pub fn update(&self, info: &ClassAccessInfo) -> Result<()> {
        if self.tree.get(info.name.as_bytes())?.is_none() {
            return Err(DbError::ClassNotFound(info.name.clone()));
        }
        self.tree.put(info.name.as_bytes(), &codec::encode_class(info))?;
        trace!(class = %info.name, id = %info.id, "catalog.class.update");
        Ok(())
    }

    /// Deletes the class row. Dependent property rows are untouched; see
    /// [`SchemaCatalog::remove_class`] for the cascading variant.
    pub fn remove(&self, name: &str) -> Result<()> {
        if self.tree.get(name.as_bytes())?.is_none() {
            return Err(DbError::ClassNotFound(name.to_owned()));
        }
        self.tree.del(name.as_bytes())?;
        trace!(class = name, "catalog.class.remove");
        Ok(())
    }

    /// Rekeys the class row, preserving id, parent, and type. Atomic within
    /// the host transaction.
    pub fn alter_class_name(&self, old_name: &str, new_name: &str) -> Result<()> {
        if new_name.is_empty() {
            return Err(DbError::InvalidArgument("class name is empty".into()));
        }
        let Some(row) = self.tree.get(old_name.as_bytes())? else {
            return Err(DbError::ClassNotFound(old_name.to_owned()));
        };
        if self.tree.get(new_name.as_bytes())?.is_some() {
            return Err(DbError::DuplicateClass(new_name.to_owned()));
        }
        self.tree.del(old_name.as_bytes())?;
        self.tree.put(new_name.as_bytes(), &row)?;
        trace!(old = old_name, new = new_name, "catalog.class.rename");
        Ok(())
    }

    /// Decoded class row, or a zero-valued info on a miss. Absence is not an
    /// error at this layer.
    pub fn get_info(&self, name: &str) -> Result<ClassAccessInfo> {
        match self.tree.get(name.as_bytes())? {
            Some(row) => codec::decode_class(name, &row),
            None => Ok(ClassAccessInfo::default()),
        }
    }

    /// Numeric class id, or the zero id on a miss.
    pub fn get_id(&self, name: &str) -> Result<ClassId> {
        match self.tree.get(name.as_bytes())? {
            Some(row) => codec::decode_class_id(&row),
            None => Ok(ClassId::default()),
        }
    }
}

/// Property table: composite-keyed `{class id}:{padded name} -> {id, type}`
/// rows, range-scannable per class.
pub struct PropertyTable<'tx> {
    tree: &'tx dyn KeyValTree,
}

impl<'tx> PropertyTable<'tx> {
    /// Binds the table to one open store handle.
    pub fn new(tree: &'tx dyn KeyValTree) -> Self {
        Self { tree }
    }

    /// Inserts a new property row. Fails if `(class id, name)` is taken.
    pub fn create(&self, info: &PropertyAccessInfo) -> Result<()> {
        validate_property_name(&info.name)?;
        let key = property_key(info.class_id, &info.name)
            .ok_or_else(|| DbError::InvalidArgument(format!("bad property name '{}'", info.name)))?;
        if self.tree.get(&key)?.is_some() {
            return Err(DbError::DuplicateProperty {
                class_id: info.class_id,
                name: info.name.clone(),
            });
        }
        self.tree.put(&key, &codec::encode_property(info))?;
        trace!(class = %info.class_id, property = %info.name, id = %info.id, "catalog.property.create");
        Ok(())
    }

    /// Deletes one property row.
    pub fn remove(&self, class_id: ClassId, name: &str) -> Result<()> {
        let key = property_key(class_id, name).ok_or_else(|| DbError::PropertyNotFound {
            class_id,
            name: name.to_owned(),
        })?;
        if self.tree.get(&key)?.is_none() {
            return Err(DbError::PropertyNotFound {
                class_id,
                name: name.to_owned(),
            });
        }
        self.tree.del(&key)?;
        trace!(class = %class_id, property = name, "catalog.property.remove");
        Ok(())
    }

    /// Rekeys one property row, preserving id and type.
    pub fn alter_property_name(&self, class_id: ClassId, old_name: &str, new_name: &str) -> Result<()> {
        validate_property_name(new_name)?;
        let old_key = property_key(class_id, old_name).ok_or_else(|| DbError::PropertyNotFound {
            class_id,
            name: old_name.to_owned(),
        })?;
        let Some(row) = self.tree.get(&old_key)? else {
            return Err(DbError::PropertyNotFound {
                class_id,
                name: old_name.to_owned(),
            });
        };
        let new_key = property_key(class_id, new_name)
            .ok_or_else(|| DbError::InvalidArgument(format!("bad property name '{new_name}'")))?;
        if self.tree.get(&new_key)?.is_some() {
            return Err(DbError::DuplicateProperty {
                class_id,
                name: new_name.to_owned(),
            });
        }
        self.tree.del(&old_key)?;
        self.tree.put(&new_key, &row)?;
        trace!(class = %class_id, old = old_name, new = new_name, "catalog.property.rename");
        Ok(())
    }

    /// Decoded property row, or a zero-valued info on a miss.
    pub fn get_info(&self, class_id: ClassId, name: &str) -> Result<PropertyAccessInfo> {
        let Some(key) = property_key(class_id, name) else {
            return Ok(PropertyAccessInfo::default());
        };
        match self.tree.get(&key)? {
            Some(row) => codec::decode_property(class_id, name, &row),
            None => Ok(PropertyAccessInfo::default()),
        }
    }

    /// Every property of the class in ascending name order, via one range
    /// scan. The scan stops at the first key whose parsed class id differs;
    /// numerically adjacent class ids never bleed into each other. An empty
    /// class yields an empty vec, not an error.
    pub fn get_infos(&self, class_id: ClassId) -> Result<Vec<PropertyAccessInfo>> {
        let mut result = Vec::new();
        let mut cursor = self.tree.cursor()?;
        let mut entry = cursor.find_range(&search_key_begin(class_id))?;
        while let Some(kv) = entry {
            let (key_class_id, name) = split_property_key(&kv.key)?;
            if key_class_id != class_id {
                break;
            }
            result.push(codec::decode_property(key_class_id, &name, &kv.value)?);
            entry = cursor.get_next()?;
        }
        trace!(class = %class_id, count = result.len(), "catalog.property.scan");
        Ok(result)
    }

    /// Numeric property id, or the zero id on a miss.
    pub fn get_id(&self, class_id: ClassId, name: &str) -> Result<PropertyId> {
        let Some(key) = property_key(class_id, name) else {
            return Ok(PropertyId::default());
        };
        match self.tree.get(&key)? {
            Some(row) => codec::decode_property_id(&row),
            None => Ok(PropertyId::default()),
        }
    }
}

/// Facade bundling both catalog tables for one transaction.
pub struct SchemaCatalog<'tx> {
    /// Class name table.
    pub classes: ClassTable<'tx>,
    /// Composite-keyed property table.
    pub properties: PropertyTable<'tx>,
}

impl<'tx> SchemaCatalog<'tx> {
    /// Binds the catalog to the two table handles of one transaction.
    pub fn new(class_tree: &'tx dyn KeyValTree, property_tree: &'tx dyn KeyValTree) -> Self {
        Self {
            classes: ClassTable::new(class_tree),
            properties: PropertyTable::new(property_tree),
        }
    }

    /// Removes a class row and, unlike the raw [`ClassTable::remove`],
    /// cascades to every property row of that class within the same host
    /// transaction.
    pub fn remove_class(&self, name: &str) -> Result<()> {
        let info = self.classes.get_info(name)?;
        if info.id == ClassId::default() {
            return Err(DbError::ClassNotFound(name.to_owned()));
        }
        self.classes.remove(name)?;
        for property in self.properties.get_infos(info.id)? {
            self.properties.remove(info.id, &property.name)?;
        }
        trace!(class = name, id = %info.id, "catalog.class.remove_cascade");
        Ok(())
    }
}

//! Ordered logical → storage field-name map

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::errors::{MappingError, MappingResult};

/// Reserved storage field holding the engine-native object id
pub const OBJECT_ID_FIELD: &str = "_id";

/// Ordered mapping from logical field names to storage field names.
///
/// Logical names are unique. Declaration order is kept, so documents built
/// from the map always list their fields in the same order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    entries: Vec<(String, String)>,
}

impl FieldMap {
    /// Builds a map from (logical, storage) pairs.
    ///
    /// Fails on duplicate logical names or empty names.
    pub fn new<I, L, S>(entries: I) -> MappingResult<Self>
    where
        I: IntoIterator<Item = (L, S)>,
        L: Into<String>,
        S: Into<String>,
    {
        let mut map = Self::default();
        for (logical, storage) in entries {
            map.insert(logical.into(), storage.into())?;
        }
        Ok(map)
    }

    fn insert(&mut self, logical: String, storage: String) -> MappingResult<()> {
        if logical.is_empty() || storage.is_empty() {
            return Err(MappingError::invalid(format!(
                "Empty field name in mapping entry '{}' => '{}'",
                logical, storage
            )));
        }
        if self.contains(&logical) {
            return Err(MappingError::invalid(format!(
                "Logical field '{}' is mapped more than once",
                logical
            )));
        }
        self.entries.push((logical, storage));
        Ok(())
    }

    /// Storage name for a logical field
    pub fn storage_name(&self, logical: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(l, _)| l == logical)
            .map(|(_, s)| s.as_str())
    }

    /// Logical name for a storage field
    pub fn logical_name(&self, storage: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, s)| s == storage)
            .map(|(l, _)| l.as_str())
    }

    /// Returns true if the logical field is mapped
    pub fn contains(&self, logical: &str) -> bool {
        self.storage_name(logical).is_some()
    }

    /// Iterates (logical, storage) pairs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(l, s)| (l.as_str(), s.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for FieldMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (logical, storage) in &self.entries {
            map.serialize_entry(logical, storage)?;
        }
        map.end()
    }
}

struct FieldMapVisitor;

impl<'de> Visitor<'de> for FieldMapVisitor {
    type Value = FieldMap;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "an object of logical field names to storage field names")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<FieldMap, A::Error> {
        let mut map = FieldMap::default();
        while let Some((logical, storage)) = access.next_entry::<String, String>()? {
            map.insert(logical, storage)
                .map_err(|e| serde::de::Error::custom(e.message()))?;
        }
        Ok(map)
    }
}

impl<'de> Deserialize<'de> for FieldMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(FieldMapVisitor)
    }
}

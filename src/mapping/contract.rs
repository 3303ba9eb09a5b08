//! Mapping contract and its validated form

use serde_json::Value;

use super::errors::{MappingError, MappingResult};
use super::field_map::{FieldMap, OBJECT_ID_FIELD};
use crate::engine::document::{flatten, get_path, set_path, Document};

/// Per-entity persistence configuration.
///
/// Describes the collection an entity lives in, how its logical fields are
/// named in storage, which field identifies it, and how a stored document
/// becomes an entity again.
pub trait Mapping {
    /// Entity type produced by hydration
    type Entity;

    /// Collection name
    fn name(&self) -> &str;

    /// Logical → storage field names
    fn map(&self) -> &FieldMap;

    /// Logical name of the identity field
    fn identity(&self) -> &str;

    /// Whether the store generates identities. The identity then lives in `_id`.
    fn auto_generate_id(&self) -> bool {
        false
    }

    /// Builds an entity from a stored document
    fn from_document(&self, document: &Document) -> MappingResult<Self::Entity>;
}

/// Validated, owned snapshot of a mapping.
///
/// Passed explicitly to every compiler call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMapping {
    name: String,
    fields: FieldMap,
    identity: String,
    identity_storage: String,
    auto_generate_id: bool,
}

impl ResolvedMapping {
    /// Validates a mapping.
    ///
    /// Fails if the identity is not a key of the field map or the collection
    /// name is empty.
    pub fn resolve<M: Mapping + ?Sized>(mapping: &M) -> MappingResult<Self> {
        let name = mapping.name();
        if name.is_empty() {
            return Err(MappingError::invalid("Collection name is empty"));
        }

        let fields = mapping.map().clone();
        let identity = mapping.identity();
        let mapped = fields
            .storage_name(identity)
            .ok_or_else(|| MappingError::identity_not_mapped(name, identity))?;

        let identity_storage = if mapping.auto_generate_id() {
            OBJECT_ID_FIELD.to_string()
        } else {
            mapped.to_string()
        };

        Ok(Self {
            name: name.to_string(),
            identity: identity.to_string(),
            identity_storage,
            auto_generate_id: mapping.auto_generate_id(),
            fields,
        })
    }

    /// Replaces the collection name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// Logical identity field
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Storage field the identity is stored under
    pub fn identity_storage(&self) -> &str {
        &self.identity_storage
    }

    pub fn auto_generate_id(&self) -> bool {
        self.auto_generate_id
    }

    /// Translates a logical field. `_id` passes through unchanged and the
    /// identity resolves to where it is stored.
    pub fn storage_name(&self, logical: &str) -> Option<&str> {
        if logical == OBJECT_ID_FIELD {
            return Some(OBJECT_ID_FIELD);
        }
        if logical == self.identity {
            return Some(&self.identity_storage);
        }
        self.fields.storage_name(logical)
    }

    /// Returns true for the identity storage field and `_id`
    pub fn is_identity_storage(&self, storage: &str) -> bool {
        storage == OBJECT_ID_FIELD || storage == self.identity_storage
    }

    /// Builds a storage document from a serialized entity.
    ///
    /// Every mapped field is written; absent ones become null. A null
    /// identity bound for `_id` is omitted so the store can assign one.
    pub fn to_storage(&self, entity: &Value) -> Document {
        let flat = flatten(entity);
        let nested = match entity {
            Value::Object(map) => Some(map),
            _ => None,
        };

        let mut doc = Document::new();
        for (logical, storage) in self.fields.iter() {
            let value = flat
                .get(logical)
                .or_else(|| nested.and_then(|map| get_path(map, logical)))
                .cloned()
                .unwrap_or(Value::Null);

            let storage = if logical == self.identity {
                self.identity_storage.as_str()
            } else {
                storage
            };
            if storage == OBJECT_ID_FIELD && value.is_null() {
                continue;
            }
            doc.insert(storage.to_string(), value);
        }
        doc
    }

    /// Builds a logical document from a stored one.
    ///
    /// Dotted logical names become nested objects. Unmapped storage fields
    /// are dropped.
    pub fn to_logical(&self, stored: &Document) -> Document {
        let mut doc = Document::new();
        for (logical, storage) in self.fields.iter() {
            let storage = if logical == self.identity {
                self.identity_storage.as_str()
            } else {
                storage
            };
            if let Some(value) = get_path(stored, storage) {
                set_path(&mut doc, logical, value.clone());
            }
        }
        doc
    }

    /// Hydrates a stored document through serde using the logical layout
    pub fn hydrate<T: serde::de::DeserializeOwned>(&self, stored: &Document) -> MappingResult<T> {
        serde_json::from_value(Value::Object(self.to_logical(stored)))
            .map_err(|e| MappingError::hydration_failed(e.to_string()).in_collection(&self.name))
    }
}

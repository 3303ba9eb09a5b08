//! Configuration-defined mappings
//!
//! A `StaticMapping` is read from JSON and returns stored documents as-is,
//! translated back to logical field names.

use serde::{Deserialize, Serialize};

use super::contract::{Mapping, ResolvedMapping};
use super::errors::{MappingError, MappingResult};
use super::field_map::FieldMap;
use crate::engine::document::Document;

/// A mapping whose entity is the logical document itself.
///
/// ```json
/// {
///   "name": "customers",
///   "identity": "id",
///   "fields": { "id": "customer_id", "name": "customer_name" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticMapping {
    /// Collection name
    pub name: String,
    /// Logical identity field
    pub identity: String,
    /// Logical → storage names
    pub fields: FieldMap,
    #[serde(default)]
    pub auto_generate_id: bool,
}

impl StaticMapping {
    pub fn new(name: impl Into<String>, identity: impl Into<String>, fields: FieldMap) -> Self {
        Self {
            name: name.into(),
            identity: identity.into(),
            fields,
            auto_generate_id: false,
        }
    }

    pub fn with_auto_generate_id(mut self, auto: bool) -> Self {
        self.auto_generate_id = auto;
        self
    }

    /// Parses and validates a mapping from JSON
    pub fn from_json_str(json: &str) -> MappingResult<Self> {
        let mapping: StaticMapping = serde_json::from_str(json)
            .map_err(|e| MappingError::invalid(format!("Invalid JSON: {}", e)))?;
        ResolvedMapping::resolve(&mapping)?;
        Ok(mapping)
    }
}

impl Mapping for StaticMapping {
    type Entity = Document;

    fn name(&self) -> &str {
        &self.name
    }

    fn map(&self) -> &FieldMap {
        &self.fields
    }

    fn identity(&self) -> &str {
        &self.identity
    }

    fn auto_generate_id(&self) -> bool {
        self.auto_generate_id
    }

    fn from_document(&self, document: &Document) -> MappingResult<Document> {
        Ok(ResolvedMapping::resolve(self)?.to_logical(document))
    }
}

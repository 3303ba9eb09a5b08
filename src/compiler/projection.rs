//! Projection compiler

use serde_json::{Map, Value};

use super::errors::{CompileError, CompileResult};
use crate::mapping::ResolvedMapping;
use crate::model::Fields;

/// Storage fields to return. Engines always include `_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    fields: Vec<String>,
}

impl Projection {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn includes(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    /// Mongo-style rendering, `{"field": 1}`
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        for field in &self.fields {
            map.insert(field.clone(), Value::from(1));
        }
        Value::Object(map)
    }
}

/// Translates a field list to storage fields. No fields means no projection.
pub fn compile_projection(
    fields: &Fields,
    mapping: &ResolvedMapping,
) -> CompileResult<Option<Projection>> {
    if fields.is_empty() {
        return Ok(None);
    }

    let storage = fields
        .get()
        .iter()
        .map(|field| {
            mapping
                .storage_name(field)
                .map(str::to_string)
                .ok_or_else(|| CompileError::field_unmapped(field.as_str()))
        })
        .collect::<CompileResult<Vec<_>>>()?;
    Ok(Some(Projection::new(storage)))
}

//! Sort compiler

use serde_json::{Map, Value};

use super::errors::{CompileError, CompileResult};
use crate::mapping::ResolvedMapping;
use crate::model::Sort;

/// Native sort: storage fields with direction `1` or `-1`, in precedence order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    keys: Vec<(String, i32)>,
}

impl SortSpec {
    pub fn new(keys: Vec<(String, i32)>) -> Self {
        Self { keys }
    }

    pub fn keys(&self) -> &[(String, i32)] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Mongo-style rendering, `{"field": 1}`
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        for (field, direction) in &self.keys {
            map.insert(field.clone(), Value::from(*direction));
        }
        Value::Object(map)
    }
}

/// Translates a sort to storage fields. An empty sort yields `None`.
pub fn compile_sort(sort: &Sort, mapping: &ResolvedMapping) -> CompileResult<Option<SortSpec>> {
    if sort.is_empty() {
        return Ok(None);
    }

    let mut keys = Vec::with_capacity(sort.orders().len());
    for (field, order) in sort.orders() {
        let storage = mapping
            .storage_name(field)
            .ok_or_else(|| CompileError::field_unmapped(field.as_str()))?;
        let direction = if order.is_ascending() { 1 } else { -1 };
        keys.push((storage.to_string(), direction));
    }
    Ok(Some(SortSpec::new(keys)))
}

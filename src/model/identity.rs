//! Identity capability for persisted entities

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Anything that can be addressed by an identity value.
///
/// Entities passed to write operations expose their id through this trait.
pub trait Identity {
    /// The raw id value. `Value::Null` means "no identity assigned yet".
    fn id(&self) -> Value;

    /// String form of the id
    fn id_string(&self) -> String {
        match self.id() {
            Value::String(s) => s,
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    /// Returns true when an identity value is present
    fn has_id(&self) -> bool {
        !self.id().is_null()
    }
}

/// A bare identity value, used for lookups by id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(Value);

impl EntityId {
    pub fn new(id: impl Into<Value>) -> Self {
        Self(id.into())
    }

    pub fn value(&self) -> &Value {
        &self.0
    }
}

impl Identity for EntityId {
    fn id(&self) -> Value {
        self.0.clone()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id_string())
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<i64> for EntityId {
    fn from(id: i64) -> Self {
        Self::new(id)
    }
}

//! Field projection over logical fields

use serde::{Deserialize, Serialize};

/// Ordered set of logical field names. Empty means all fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fields {
    names: Vec<String>,
}

impl Fields {
    /// Builds a projection, dropping duplicate names
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut fields = Self::default();
        for name in names {
            fields.add(name);
        }
        fields
    }

    /// Adds a field if not already present
    pub fn add(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        if !self.names.contains(&name) {
            self.names.push(name);
        }
        self
    }

    pub fn get(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

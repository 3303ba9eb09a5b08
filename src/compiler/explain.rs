//! Explain output for compiled queries
//!
//! Deterministic rendering of what a repository call would send to the
//! engine, without contacting it.

use std::fmt;

use serde_json::{json, Map, Value};

use super::predicate::Predicate;
use super::projection::Projection;
use super::sort::SortSpec;

/// A compiled query ready for introspection
#[derive(Debug, Clone, PartialEq)]
pub struct QueryExplain {
    pub collection: String,
    pub filter: Predicate,
    pub sort: Option<SortSpec>,
    pub projection: Option<Projection>,
    pub skip: Option<u64>,
    pub limit: Option<u64>,
    /// Field whose distinct values are requested
    pub distinct: Option<String>,
}

impl QueryExplain {
    pub fn new(collection: impl Into<String>, filter: Predicate) -> Self {
        Self {
            collection: collection.into(),
            filter,
            sort: None,
            projection: None,
            skip: None,
            limit: None,
            distinct: None,
        }
    }

    pub fn with_sort(mut self, sort: Option<SortSpec>) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_projection(mut self, projection: Option<Projection>) -> Self {
        self.projection = projection;
        self
    }

    pub fn with_window(mut self, skip: u64, limit: u64) -> Self {
        self.skip = Some(skip);
        self.limit = Some(limit);
        self
    }

    pub fn with_distinct(mut self, field: impl Into<String>) -> Self {
        self.distinct = Some(field.into());
        self
    }

    /// Mongo-style command document. Absent parts are omitted.
    pub fn to_value(&self) -> Value {
        let mut doc = Map::new();
        doc.insert("collection".into(), json!(self.collection));
        if let Some(field) = &self.distinct {
            doc.insert("distinct".into(), json!(field));
        }
        doc.insert("filter".into(), self.filter.to_value());
        if let Some(sort) = &self.sort {
            doc.insert("sort".into(), sort.to_value());
        }
        if let Some(projection) = &self.projection {
            doc.insert("projection".into(), projection.to_value());
        }
        if let Some(skip) = self.skip {
            doc.insert("skip".into(), json!(skip));
        }
        if let Some(limit) = self.limit {
            doc.insert("limit".into(), json!(limit));
        }
        Value::Object(doc)
    }
}

impl fmt::Display for QueryExplain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== EXPLAIN ===")?;
        writeln!(f, "Collection: {}", self.collection)?;
        if let Some(field) = &self.distinct {
            writeln!(f, "Distinct: {}", field)?;
        }
        writeln!(f, "Filter: {}", self.filter.to_value())?;
        if let Some(sort) = &self.sort {
            writeln!(f, "Sort: {}", sort.to_value())?;
        }
        if let Some(projection) = &self.projection {
            writeln!(f, "Projection: {}", projection.to_value())?;
        }
        if let Some(skip) = self.skip {
            writeln!(f, "Skip: {}", skip)?;
        }
        if let Some(limit) = self.limit {
            writeln!(f, "Limit: {}", limit)?;
        }
        Ok(())
    }
}

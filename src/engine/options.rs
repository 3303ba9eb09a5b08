//! Engine operation options and results

use serde_json::Value;

use super::document::Document;
use crate::compiler::{Predicate, Projection, SortSpec};

/// Options for `find` and `find_one`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    pub projection: Option<Projection>,
    pub sort: Option<SortSpec>,
    pub limit: Option<u64>,
    pub skip: Option<u64>,
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_projection(mut self, projection: Option<Projection>) -> Self {
        self.projection = projection;
        self
    }

    pub fn with_sort(mut self, sort: Option<SortSpec>) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_window(mut self, skip: u64, limit: u64) -> Self {
        self.skip = Some(skip);
        self.limit = Some(limit);
        self
    }
}

/// Options for `find_one_and_update`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Insert when nothing matches
    pub upsert: bool,
    /// Return the document after the update instead of before
    pub return_updated: bool,
}

/// Options for `bulk_write`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkWriteOptions {
    /// Stop at the first failure
    pub ordered: bool,
}

/// One operation of a bulk write
#[derive(Debug, Clone, PartialEq)]
pub enum WriteModel {
    InsertOne(Document),
    /// Sets fields on the first match
    UpdateOne {
        filter: Predicate,
        set: Document,
        upsert: bool,
    },
}

/// Outcome of a bulk write
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkWriteResult {
    /// `_id` of each inserted document
    pub inserted_ids: Vec<Value>,
    /// `_id` of each document inserted by an upsert
    pub upserted_ids: Vec<Value>,
    pub matched_count: u64,
    pub modified_count: u64,
}

impl BulkWriteResult {
    pub fn upserted_count(&self) -> u64 {
        self.upserted_ids.len() as u64
    }
}

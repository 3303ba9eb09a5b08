//! Storage engine boundary
//!
//! The repository talks to a document store only through these traits.

use serde_json::Value;

use super::document::Document;
use super::errors::EngineResult;
use super::options::{BulkWriteOptions, BulkWriteResult, FindOptions, UpdateOptions, WriteModel};
use crate::compiler::Predicate;

/// A document store holding named collections
pub trait StorageEngine {
    type Collection: Collection;

    /// Returns a handle to a collection, creating it if needed
    fn collection(&self, database: &str, name: &str) -> EngineResult<Self::Collection>;
}

/// Operations on one collection
pub trait Collection: Send + Sync {
    fn find_one(&self, filter: &Predicate, options: &FindOptions)
        -> EngineResult<Option<Document>>;

    fn find(&self, filter: &Predicate, options: &FindOptions) -> EngineResult<Vec<Document>>;

    fn count(&self, filter: &Predicate) -> EngineResult<u64>;

    /// Inserts a document, returning its `_id`
    fn insert_one(&self, document: Document) -> EngineResult<Value>;

    fn insert_many(&self, documents: Vec<Document>) -> EngineResult<Vec<Value>>;

    /// Sets fields on the first match, inserting when `upsert` is set and
    /// nothing matches. Returns the document before or after the update.
    fn find_one_and_update(
        &self,
        filter: &Predicate,
        set: Document,
        options: UpdateOptions,
    ) -> EngineResult<Option<Document>>;

    fn bulk_write(
        &self,
        models: Vec<WriteModel>,
        options: BulkWriteOptions,
    ) -> EngineResult<BulkWriteResult>;

    /// Deletes the first match, returning the number deleted
    fn delete_one(&self, filter: &Predicate) -> EngineResult<u64>;

    fn delete_many(&self, filter: &Predicate) -> EngineResult<u64>;

    /// Unique values of one field over the matches
    fn distinct(
        &self,
        field: &str,
        filter: &Predicate,
        options: &FindOptions,
    ) -> EngineResult<Vec<Value>>;

    /// Removes the collection and every document in it
    fn drop_collection(&self) -> EngineResult<()>;
}

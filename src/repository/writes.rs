//! Repository write operations
//!
//! Writes are not transactional. `add_all` can apply part of a batch
//! before failing, and `transactional` only reports failures; it cannot
//! roll anything back.

use serde::Serialize;
use serde_json::Value;

use super::errors::{RepositoryError, RepositoryResult};
use super::repository::Repository;
use crate::compiler::{FieldOp, Predicate, Projection};
use crate::engine::document::{get_path, Document};
use crate::engine::{BulkWriteOptions, Collection, FindOptions, StorageEngine, UpdateOptions, WriteModel};
use crate::mapping::{Mapping, OBJECT_ID_FIELD};
use crate::model::{Filter, Identity};
use crate::observability::{log_event, Event};

impl<M, E> Repository<M, E>
where
    M: Mapping,
    M::Entity: Identity + Serialize,
    E: StorageEngine,
{
    /// Serializes an entity into a storage document
    fn to_storage(&self, entity: &M::Entity) -> RepositoryResult<Document> {
        let value = serde_json::to_value(entity)?;
        if !value.is_object() {
            return Err(RepositoryError::TypeContract(format!(
                "Entity for '{}' must serialize to an object, got {}",
                self.collection_name(),
                kind_of(&value)
            )));
        }
        Ok(self.resolved_mapping().to_storage(&value))
    }

    fn identity_filter(&self, id: Value) -> Predicate {
        Predicate::eq(self.resolved_mapping().identity_storage(), id)
    }

    fn committed(&self, operation: &str, count: usize) {
        self.metrics().add_documents_written(count as u64);
        log_event(
            Event::WriteCommitted,
            &[
                ("collection", self.collection_name()),
                ("documents", &count.to_string()),
                ("operation", operation),
            ],
        );
    }

    /// Inserts or updates one entity and returns it as stored.
    ///
    /// An entity with an identity is upserted in one round trip. One
    /// without is inserted and read back by its new `_id`.
    pub fn add(&self, entity: &M::Entity) -> RepositoryResult<Option<M::Entity>> {
        let document = self.to_storage(entity)?;
        let collection = self.collection()?;

        let stored = if entity.has_id() {
            let options = UpdateOptions {
                upsert: true,
                return_updated: true,
            };
            collection.find_one_and_update(&self.identity_filter(entity.id()), document, options)?
        } else {
            let id = collection.insert_one(document)?;
            collection.find_one(&Predicate::eq(OBJECT_ID_FIELD, id), &FindOptions::new())?
        };

        self.committed("add", usize::from(stored.is_some()));
        stored.map(|d| self.hydrate(d)).transpose()
    }

    /// Inserts or updates many entities in one bulk write and returns every
    /// affected entity as stored, in storage order.
    ///
    /// Every entity is serialized before anything is written.
    pub fn add_all(&self, entities: &[M::Entity]) -> RepositoryResult<Vec<M::Entity>> {
        if entities.is_empty() {
            return Ok(Vec::new());
        }

        let mut prepared = Vec::with_capacity(entities.len());
        for entity in entities {
            prepared.push((entity.id(), self.to_storage(entity)?));
        }

        let mut models = Vec::with_capacity(prepared.len());
        let mut candidates: Vec<(Value, Document)> = Vec::new();
        for (id, document) in prepared {
            if id.is_null() {
                models.push(WriteModel::InsertOne(document));
            } else {
                candidates.push((id.clone(), document.clone()));
                models.push(WriteModel::UpdateOne {
                    filter: self.identity_filter(id),
                    set: document,
                    upsert: true,
                });
            }
        }

        let collection = self.collection()?;
        let options = BulkWriteOptions {
            ordered: self.config().ordered_bulk_writes,
        };
        let result = collection.bulk_write(models, options)?;
        let mut inserted = result.inserted_ids;
        let candidate_ids: Vec<Value> = candidates.iter().map(|(id, _)| id.clone()).collect();

        // Some engines report matches but silently skip upserts
        if !candidates.is_empty()
            && result.upserted_ids.is_empty()
            && (result.matched_count as usize) < candidates.len()
        {
            inserted.extend(self.insert_missing(collection, candidates, &candidate_ids)?);
        }

        let mut affected = Vec::new();
        if !inserted.is_empty() {
            affected.push(Predicate::field(OBJECT_ID_FIELD, vec![FieldOp::In(inserted)]));
        }
        if !candidate_ids.is_empty() {
            affected.push(Predicate::field(
                self.resolved_mapping().identity_storage(),
                vec![FieldOp::In(candidate_ids)],
            ));
        }
        let documents = collection.find(&Predicate::any(affected), &FindOptions::new())?;

        self.committed("add_all", entities.len());
        self.hydrate_all(documents)
    }

    /// Inserts the candidates whose identity is not stored yet
    fn insert_missing(
        &self,
        collection: &E::Collection,
        candidates: Vec<(Value, Document)>,
        candidate_ids: &[Value],
    ) -> RepositoryResult<Vec<Value>> {
        let identity = self.resolved_mapping().identity_storage();
        let lookup = Predicate::field(identity, vec![FieldOp::In(candidate_ids.to_vec())]);
        let options =
            FindOptions::new().with_projection(Some(Projection::new(vec![identity.to_string()])));
        let existing: Vec<Value> = collection
            .find(&lookup, &options)?
            .iter()
            .filter_map(|d| get_path(d, identity).cloned())
            .collect();

        let missing: Vec<Document> = candidates
            .into_iter()
            .filter(|(id, _)| !existing.contains(id))
            .map(|(_, document)| document)
            .collect();
        if missing.is_empty() {
            return Ok(Vec::new());
        }

        self.metrics().increment_bulk_retries();
        log_event(
            Event::BulkWriteRetry,
            &[
                ("collection", self.collection_name()),
                ("missing", &missing.len().to_string()),
            ],
        );
        Ok(collection.insert_many(missing)?)
    }
}

impl<M: Mapping, E: StorageEngine> Repository<M, E> {
    /// Deletes the document with the id. Deleting nothing is not an error.
    pub fn remove(&self, id: &dyn Identity) -> RepositoryResult<()> {
        let removed = self.collection()?.delete_one(&self.id_filter(id))?;
        self.metrics().add_documents_removed(removed);
        Ok(())
    }

    /// Deletes every match, or drops the whole collection without a filter
    pub fn remove_all(&self, filter: Option<&Filter>) -> RepositoryResult<()> {
        match filter {
            None => {
                self.collection()?.drop_collection()?;
                log_event(Event::CollectionDropped, &[("collection", self.collection_name())]);
            }
            Some(filter) => {
                let predicate = self.compile_filter(Some(filter))?;
                let removed = self.collection()?.delete_many(&predicate)?;
                self.metrics().add_documents_removed(removed);
            }
        }
        Ok(())
    }

    /// Runs an operation, logging and returning its failure unchanged.
    ///
    /// Nothing is rolled back.
    pub fn transactional<T, F>(&self, operation: F) -> RepositoryResult<T>
    where
        F: FnOnce(&Self) -> RepositoryResult<T>,
    {
        operation(self).map_err(|err| {
            log_event(
                Event::TransactionFailed,
                &[
                    ("code", err.code()),
                    ("collection", self.collection_name()),
                    ("message", &err.to_string()),
                ],
            );
            err
        })
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

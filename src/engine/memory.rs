//! In-memory storage engine
//!
//! Each (database, collection) pair owns a vector of documents behind a
//! `RwLock`. Handles share the vector, so a handle stays valid after its
//! collection is dropped and simply sees it empty.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;

use super::document::{get_path, set_path, Document};
use super::errors::{EngineError, EngineResult};
use super::matcher::Matcher;
use super::object_id::ObjectId;
use super::options::{
    BulkWriteOptions, BulkWriteResult, FindOptions, UpdateOptions, WriteModel,
};
use super::sorter::DocumentSorter;
use super::traits::{Collection, StorageEngine};
use crate::compiler::{Predicate, Projection};
use crate::mapping::OBJECT_ID_FIELD;

type Documents = Arc<RwLock<Vec<Document>>>;

/// Reference engine evaluating native predicates in process
#[derive(Debug, Clone, Default)]
pub struct MemoryEngine {
    collections: Arc<RwLock<HashMap<(String, String), Documents>>>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageEngine for MemoryEngine {
    type Collection = MemoryCollection;

    fn collection(&self, database: &str, name: &str) -> EngineResult<MemoryCollection> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| EngineError::Poisoned(e.to_string()))?;
        let documents = collections
            .entry((database.to_string(), name.to_string()))
            .or_default()
            .clone();
        Ok(MemoryCollection {
            namespace: format!("{}.{}", database, name),
            documents,
        })
    }
}

/// Handle to one in-memory collection
#[derive(Debug, Clone)]
pub struct MemoryCollection {
    namespace: String,
    documents: Documents,
}

enum Applied {
    Matched { modified: bool },
    Upserted(Value),
    Skipped,
}

impl MemoryCollection {
    /// `database.collection`
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn poisoned<T>(&self, _: PoisonError<T>) -> EngineError {
        EngineError::Poisoned(self.namespace.clone())
    }

    fn read(&self) -> EngineResult<RwLockReadGuard<'_, Vec<Document>>> {
        self.documents.read().map_err(|e| self.poisoned(e))
    }

    fn write(&self) -> EngineResult<RwLockWriteGuard<'_, Vec<Document>>> {
        self.documents.write().map_err(|e| self.poisoned(e))
    }

    fn insert_into(docs: &mut Vec<Document>, mut document: Document) -> EngineResult<Value> {
        let id = match document.get(OBJECT_ID_FIELD) {
            Some(id) if !id.is_null() => id.clone(),
            _ => {
                let id = Value::String(ObjectId::new().to_hex());
                document.insert(OBJECT_ID_FIELD.to_string(), id.clone());
                id
            }
        };
        if docs.iter().any(|d| d.get(OBJECT_ID_FIELD) == Some(&id)) {
            return Err(EngineError::DuplicateKey(id.to_string()));
        }
        docs.push(document);
        Ok(id)
    }

    /// Sets fields on a document. `_id` is immutable and skipped.
    fn apply_set(document: &mut Document, set: &Document) -> bool {
        let mut modified = false;
        for (key, value) in set {
            if key == OBJECT_ID_FIELD {
                continue;
            }
            if document.get(key) != Some(value) {
                document.insert(key.clone(), value.clone());
                modified = true;
            }
        }
        modified
    }

    fn upsert_document(filter: &Predicate, set: &Document) -> Document {
        let mut document = filter.equality_fields();
        for (key, value) in set {
            document.insert(key.clone(), value.clone());
        }
        document
    }

    fn update_one_in(
        docs: &mut Vec<Document>,
        matcher: &Matcher,
        filter: &Predicate,
        set: &Document,
        upsert: bool,
    ) -> EngineResult<Applied> {
        if let Some(document) = docs.iter_mut().find(|d| matcher.matches(d)) {
            return Ok(Applied::Matched {
                modified: Self::apply_set(document, set),
            });
        }
        if !upsert {
            return Ok(Applied::Skipped);
        }
        let id = Self::insert_into(docs, Self::upsert_document(filter, set))?;
        Ok(Applied::Upserted(id))
    }

    fn project(document: &Document, projection: Option<&Projection>) -> Document {
        let projection = match projection {
            Some(p) => p,
            None => return document.clone(),
        };
        let mut out = Document::new();
        if let Some(id) = document.get(OBJECT_ID_FIELD) {
            out.insert(OBJECT_ID_FIELD.to_string(), id.clone());
        }
        for field in projection.fields() {
            if let Some(value) = document.get(field) {
                out.insert(field.clone(), value.clone());
            } else if let Some(value) = get_path(document, field) {
                set_path(&mut out, field, value.clone());
            }
        }
        out
    }

    fn matching(&self, filter: &Predicate, options: &FindOptions) -> EngineResult<Vec<Document>> {
        let matcher = Matcher::new(filter)?;
        let mut found: Vec<Document> = self
            .read()?
            .iter()
            .filter(|d| matcher.matches(d))
            .cloned()
            .collect();
        if let Some(sort) = &options.sort {
            DocumentSorter::sort(&mut found, sort);
        }
        Ok(found)
    }
}

impl Collection for MemoryCollection {
    fn find_one(
        &self,
        filter: &Predicate,
        options: &FindOptions,
    ) -> EngineResult<Option<Document>> {
        let options = FindOptions {
            limit: Some(1),
            ..options.clone()
        };
        Ok(self.find(filter, &options)?.into_iter().next())
    }

    fn find(&self, filter: &Predicate, options: &FindOptions) -> EngineResult<Vec<Document>> {
        let found = self.matching(filter, options)?;
        let skip = options.skip.unwrap_or(0) as usize;
        let limit = options.limit.map_or(usize::MAX, |l| l as usize);
        Ok(found
            .iter()
            .skip(skip)
            .take(limit)
            .map(|d| Self::project(d, options.projection.as_ref()))
            .collect())
    }

    fn count(&self, filter: &Predicate) -> EngineResult<u64> {
        let matcher = Matcher::new(filter)?;
        Ok(self.read()?.iter().filter(|d| matcher.matches(d)).count() as u64)
    }

    fn insert_one(&self, document: Document) -> EngineResult<Value> {
        Self::insert_into(&mut *self.write()?, document)
    }

    fn insert_many(&self, documents: Vec<Document>) -> EngineResult<Vec<Value>> {
        let mut docs = self.write()?;
        documents
            .into_iter()
            .map(|document| Self::insert_into(&mut docs, document))
            .collect()
    }

    fn find_one_and_update(
        &self,
        filter: &Predicate,
        set: Document,
        options: UpdateOptions,
    ) -> EngineResult<Option<Document>> {
        let matcher = Matcher::new(filter)?;
        let mut docs = self.write()?;

        if let Some(document) = docs.iter_mut().find(|d| matcher.matches(d)) {
            let before = document.clone();
            Self::apply_set(document, &set);
            return Ok(Some(if options.return_updated {
                document.clone()
            } else {
                before
            }));
        }

        if !options.upsert {
            return Ok(None);
        }
        let document = Self::upsert_document(filter, &set);
        let id = Self::insert_into(&mut docs, document)?;
        if !options.return_updated {
            return Ok(None);
        }
        Ok(docs
            .iter()
            .find(|d| d.get(OBJECT_ID_FIELD) == Some(&id))
            .cloned())
    }

    fn bulk_write(
        &self,
        models: Vec<WriteModel>,
        options: BulkWriteOptions,
    ) -> EngineResult<BulkWriteResult> {
        let mut docs = self.write()?;
        let mut result = BulkWriteResult::default();
        let mut applied = 0;
        let mut failures = Vec::new();

        for model in models {
            let outcome = match model {
                WriteModel::InsertOne(document) => {
                    Self::insert_into(&mut docs, document).map(|id| {
                        result.inserted_ids.push(id);
                    })
                }
                WriteModel::UpdateOne {
                    filter,
                    set,
                    upsert,
                } => Matcher::new(&filter)
                    .and_then(|matcher| {
                        Self::update_one_in(&mut docs, &matcher, &filter, &set, upsert)
                    })
                    .map(|change| match change {
                        Applied::Matched { modified } => {
                            result.matched_count += 1;
                            if modified {
                                result.modified_count += 1;
                            }
                        }
                        Applied::Upserted(id) => result.upserted_ids.push(id),
                        Applied::Skipped => {}
                    }),
            };

            match outcome {
                Ok(()) => applied += 1,
                Err(err) => {
                    failures.push(err.to_string());
                    if options.ordered {
                        break;
                    }
                }
            }
        }

        if failures.is_empty() {
            Ok(result)
        } else {
            Err(EngineError::BulkWrite {
                failed: failures.len(),
                applied,
                message: failures.join("; "),
            })
        }
    }

    fn delete_one(&self, filter: &Predicate) -> EngineResult<u64> {
        let matcher = Matcher::new(filter)?;
        let mut docs = self.write()?;
        match docs.iter().position(|d| matcher.matches(d)) {
            Some(index) => {
                docs.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn delete_many(&self, filter: &Predicate) -> EngineResult<u64> {
        let matcher = Matcher::new(filter)?;
        let mut docs = self.write()?;
        let before = docs.len();
        docs.retain(|d| !matcher.matches(d));
        Ok((before - docs.len()) as u64)
    }

    /// Values in first-seen order after sorting. Array values contribute
    /// their elements. Skip and limit are not applied.
    fn distinct(
        &self,
        field: &str,
        filter: &Predicate,
        options: &FindOptions,
    ) -> EngineResult<Vec<Value>> {
        let mut values: Vec<Value> = Vec::new();
        for document in self.matching(filter, options)? {
            let candidates = match get_path(&document, field) {
                Some(Value::Array(items)) => items.clone(),
                Some(value) => vec![value.clone()],
                None => continue,
            };
            for value in candidates {
                if !values.contains(&value) {
                    values.push(value);
                }
            }
        }
        Ok(values)
    }

    fn drop_collection(&self) -> EngineResult<()> {
        self.write()?.clear();
        Ok(())
    }
}

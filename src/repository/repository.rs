//! Repository facade: construction and read operations
//!
//! A repository binds one mapping to one collection of one engine. Every
//! query is compiled through the injected strategies before the engine is
//! contacted, so rejected queries never reach storage.

use std::sync::OnceLock;

use serde_json::Value;

use super::errors::{RepositoryError, RepositoryResult};
use super::page::{total_pages, Page, PageContent, Pageable};
use super::strategies::QueryStrategies;
use crate::compiler::{CompileResult, Predicate, Projection, QueryExplain, SortSpec};
use crate::config::RepositoryConfig;
use crate::engine::document::{normalize, normalize_document, Document};
use crate::engine::{Collection, FindOptions, ObjectId, StorageEngine};
use crate::mapping::{Mapping, ResolvedMapping, OBJECT_ID_FIELD};
use crate::model::{Fields, Filter, Identity, Sort};
use crate::observability::{log_event, Event, Logger, RepositoryMetrics, Severity};

/// Mapping-aware repository over one collection
pub struct Repository<M: Mapping, E: StorageEngine> {
    mapping: M,
    resolved: ResolvedMapping,
    engine: E,
    config: RepositoryConfig,
    strategies: QueryStrategies,
    collection: OnceLock<E::Collection>,
    metrics: RepositoryMetrics,
}

impl<M: Mapping, E: StorageEngine> Repository<M, E> {
    /// Creates a repository with the default configuration.
    ///
    /// Fails if the mapping is invalid.
    pub fn new(mapping: M, engine: E) -> RepositoryResult<Self> {
        Self::with_config(mapping, engine, RepositoryConfig::default())
    }

    pub fn with_config(mapping: M, engine: E, config: RepositoryConfig) -> RepositoryResult<Self> {
        let mut resolved = ResolvedMapping::resolve(&mapping)?;
        if let Some(name) = &config.collection {
            resolved = resolved.with_name(name.clone());
        }
        Ok(Self {
            mapping,
            resolved,
            engine,
            config,
            strategies: QueryStrategies::default(),
            collection: OnceLock::new(),
            metrics: RepositoryMetrics::new(),
        })
    }

    /// Replaces the compilation strategies
    pub fn with_strategies(mut self, strategies: QueryStrategies) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn mapping(&self) -> &M {
        &self.mapping
    }

    pub fn resolved_mapping(&self) -> &ResolvedMapping {
        &self.resolved
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    pub fn metrics(&self) -> &RepositoryMetrics {
        &self.metrics
    }

    /// Collection name used for storage
    pub fn collection_name(&self) -> &str {
        self.resolved.name()
    }

    /// Collection handle, created on first use and reused afterwards
    pub fn collection(&self) -> RepositoryResult<&E::Collection> {
        if let Some(collection) = self.collection.get() {
            return Ok(collection);
        }
        let created = self
            .engine
            .collection(&self.config.database, self.resolved.name())?;
        Ok(self.collection.get_or_init(|| created))
    }

    // ===== compilation =====

    fn checked<T>(&self, result: CompileResult<T>) -> RepositoryResult<T> {
        result.map_err(|err| {
            self.metrics.increment_queries_rejected();
            log_event(
                Event::QueryRejected,
                &[
                    ("code", err.code().code()),
                    ("collection", self.resolved.name()),
                    ("field", err.field().unwrap_or("")),
                    ("message", err.message()),
                ],
            );
            RepositoryError::from(err)
        })
    }

    pub(crate) fn compile_filter(&self, filter: Option<&Filter>) -> RepositoryResult<Predicate> {
        let predicate = match filter {
            Some(filter) => self.checked((self.strategies.filter)(filter, &self.resolved))?,
            None => Predicate::All,
        };
        if Logger::enabled(Severity::Trace) {
            log_event(
                Event::QueryCompiled,
                &[
                    ("collection", self.resolved.name()),
                    ("filter", &predicate.to_value().to_string()),
                ],
            );
        }
        Ok(predicate)
    }

    fn compile_sort(&self, sort: Option<&Sort>) -> RepositoryResult<Option<SortSpec>> {
        match sort {
            Some(sort) => self.checked((self.strategies.sort)(sort, &self.resolved)),
            None => Ok(None),
        }
    }

    fn compile_projection(&self, fields: Option<&Fields>) -> RepositoryResult<Option<Projection>> {
        match fields {
            Some(fields) => self.checked((self.strategies.project)(fields, &self.resolved)),
            None => Ok(None),
        }
    }

    fn find_options(&self, sort: Option<&Sort>, fields: Option<&Fields>) -> RepositoryResult<FindOptions> {
        Ok(FindOptions::new()
            .with_sort(self.compile_sort(sort)?)
            .with_projection(self.compile_projection(fields)?))
    }

    /// Storage field of a single distinct field
    fn distinct_field(&self, fields: &Fields) -> RepositoryResult<String> {
        match fields.get() {
            [field] => {
                let projection = self.compile_projection(Some(fields))?;
                Ok(projection
                    .and_then(|p| p.fields().first().cloned())
                    .unwrap_or_else(|| field.clone()))
            }
            [] => Err(RepositoryError::UnsupportedOperation(
                "Distinct query requires exactly one field, none given".into(),
            )),
            many => Err(RepositoryError::UnsupportedOperation(format!(
                "Distinct query over {} fields is not supported",
                many.len()
            ))),
        }
    }

    /// Lookup filter for an id.
    ///
    /// A value that parses as an object id addresses `_id`; anything else
    /// addresses the identity field.
    pub(crate) fn id_filter(&self, id: &dyn Identity) -> Predicate {
        let raw = id.id();
        if let Value::String(s) = &raw {
            if ObjectId::parse(s).is_ok() {
                return Predicate::eq(OBJECT_ID_FIELD, raw);
            }
        }
        Predicate::eq(self.resolved.identity_storage(), raw)
    }

    // ===== results =====

    pub(crate) fn hydrate(&self, document: Document) -> RepositoryResult<M::Entity> {
        let document = normalize_document(document);
        self.mapping
            .from_document(&document)
            .map_err(|e| RepositoryError::from(e.in_collection(self.resolved.name())))
    }

    pub(crate) fn hydrate_all(&self, documents: Vec<Document>) -> RepositoryResult<Vec<M::Entity>> {
        documents.into_iter().map(|d| self.hydrate(d)).collect()
    }

    pub(crate) fn executed(&self, operation: &str, results: usize) {
        self.metrics.increment_queries_executed();
        if Logger::enabled(Severity::Trace) {
            log_event(
                Event::QueryExecuted,
                &[
                    ("collection", self.resolved.name()),
                    ("operation", operation),
                    ("results", &results.to_string()),
                ],
            );
        }
    }

    // ===== reads =====

    /// Finds one entity by id. Missing entities are `None`.
    pub fn find(&self, id: &dyn Identity, fields: Option<&Fields>) -> RepositoryResult<Option<M::Entity>> {
        let filter = self.id_filter(id);
        let options = self.find_options(None, fields)?;
        let found = self.collection()?.find_one(&filter, &options)?;
        self.executed("find", usize::from(found.is_some()));
        found.map(|d| self.hydrate(d)).transpose()
    }

    /// Finds every entity matching the filter, in sort order
    pub fn find_by(
        &self,
        filter: Option<&Filter>,
        sort: Option<&Sort>,
        fields: Option<&Fields>,
    ) -> RepositoryResult<Vec<M::Entity>> {
        let predicate = self.compile_filter(filter)?;
        let options = self.find_options(sort, fields)?;
        let documents = self.collection()?.find(&predicate, &options)?;
        self.executed("find_by", documents.len());
        self.hydrate_all(documents)
    }

    /// Unique values of exactly one field over the matches
    pub fn find_by_distinct(
        &self,
        distinct: &Fields,
        filter: Option<&Filter>,
        sort: Option<&Sort>,
    ) -> RepositoryResult<Vec<Value>> {
        let field = self.distinct_field(distinct)?;
        let predicate = self.compile_filter(filter)?;
        let options = self.find_options(sort, None)?;
        let values = self.collection()?.distinct(&field, &predicate, &options)?;
        self.executed("find_by_distinct", values.len());
        Ok(values.into_iter().map(normalize).collect())
    }

    /// One page of entities, or every entity as a single page when no
    /// pageable is given.
    ///
    /// A pageable with one distinct field yields that field's distinct
    /// values, unwindowed. Totals always count matching documents.
    pub fn find_all(&self, pageable: Option<&Pageable>) -> RepositoryResult<Page<M::Entity>> {
        let pageable = match pageable {
            Some(pageable) => pageable,
            None => {
                let documents = self
                    .collection()?
                    .find(&Predicate::All, &FindOptions::new())?;
                self.executed("find_all", documents.len());
                let total = documents.len() as u64;
                let content = PageContent::Entities(self.hydrate_all(documents)?);
                return Ok(Page::new(content, total, 1, 1));
            }
        };

        let distinct = match pageable.distinct() {
            Some(fields) if !fields.is_empty() => Some(self.distinct_field(fields)?),
            _ => None,
        };
        let predicate = self.compile_filter(pageable.filter())?;
        let options = self.find_options(pageable.sort(), pageable.fields())?;
        let collection = self.collection()?;
        let total = collection.count(&predicate)?;

        let content = match distinct {
            Some(field) => {
                let values = collection.distinct(&field, &predicate, &options)?;
                self.executed("find_all", values.len());
                PageContent::Values(values.into_iter().map(normalize).collect())
            }
            None => {
                let options = options.with_window(pageable.offset(), pageable.limit());
                let documents = collection.find(&predicate, &options)?;
                self.executed("find_all", documents.len());
                PageContent::Entities(self.hydrate_all(documents)?)
            }
        };

        Ok(Page::new(
            content,
            total,
            pageable.page_number(),
            total_pages(total, pageable.page_size()),
        )
        .echoing(pageable))
    }

    /// Number of documents matching the filter
    pub fn count(&self, filter: Option<&Filter>) -> RepositoryResult<u64> {
        let predicate = self.compile_filter(filter)?;
        let count = self.collection()?.count(&predicate)?;
        self.executed("count", 1);
        Ok(count)
    }

    /// Returns true if a document with the id exists
    pub fn exists(&self, id: &dyn Identity) -> RepositoryResult<bool> {
        let filter = self.id_filter(id);
        let options = FindOptions::new().with_projection(Some(Projection::new(Vec::new())));
        let found = self.collection()?.find_one(&filter, &options)?;
        self.executed("exists", usize::from(found.is_some()));
        Ok(found.is_some())
    }

    /// Compiles a query without running it
    pub fn explain(
        &self,
        filter: Option<&Filter>,
        sort: Option<&Sort>,
        fields: Option<&Fields>,
    ) -> RepositoryResult<QueryExplain> {
        let predicate = self.compile_filter(filter)?;
        let options = self.find_options(sort, fields)?;
        Ok(QueryExplain::new(self.resolved.name(), predicate)
            .with_sort(options.sort)
            .with_projection(options.projection))
    }
}

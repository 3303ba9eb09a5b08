//! Shared fixtures for repository tests
//!
//! A small client domain: entity, mapping, seeded data, and an engine
//! wrapper that counts calls and can ignore upserts.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use aerorepo::compiler::Predicate;
use aerorepo::engine::document::Document;
use aerorepo::engine::{
    BulkWriteOptions, BulkWriteResult, Collection, EngineResult, FindOptions, MemoryCollection,
    MemoryEngine, StorageEngine, UpdateOptions, WriteModel,
};
use aerorepo::mapping::{FieldMap, Mapping, MappingResult, ResolvedMapping, StaticMapping};
use aerorepo::model::Identity;
use aerorepo::repository::Repository;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Domain
// =============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Client {
    pub id: Option<i64>,
    pub name: String,
    pub date: String,
    pub total_orders: i64,
    pub total_earnings: f64,
}

impl Client {
    pub fn new(id: i64, name: &str, date: &str, total_orders: i64, total_earnings: f64) -> Self {
        Self {
            id: Some(id),
            name: name.to_string(),
            date: date.to_string(),
            total_orders,
            total_earnings,
        }
    }
}

impl Identity for Client {
    fn id(&self) -> Value {
        match self.id {
            Some(id) => Value::from(id),
            None => Value::Null,
        }
    }
}

pub struct ClientMapping {
    resolved: ResolvedMapping,
}

impl ClientMapping {
    pub fn new() -> Self {
        let fields = FieldMap::new([
            ("id", "customer_id"),
            ("name", "customer_name"),
            ("totalOrders", "total_orders"),
            ("totalEarnings", "total_earnings"),
            ("date", "created_at"),
        ])
        .unwrap();
        let mapping = StaticMapping::new("clients", "id", fields);
        Self {
            resolved: ResolvedMapping::resolve(&mapping).unwrap(),
        }
    }
}

impl Mapping for ClientMapping {
    type Entity = Client;

    fn name(&self) -> &str {
        self.resolved.name()
    }

    fn map(&self) -> &FieldMap {
        self.resolved.fields()
    }

    fn identity(&self) -> &str {
        self.resolved.identity()
    }

    fn from_document(&self, document: &Document) -> MappingResult<Client> {
        self.resolved.hydrate(document)
    }
}

/// Order whose identity the store generates
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Order {
    pub id: Option<String>,
    pub product: String,
}

impl Order {
    pub fn new(product: &str) -> Self {
        Self {
            id: None,
            product: product.to_string(),
        }
    }
}

impl Identity for Order {
    fn id(&self) -> Value {
        match &self.id {
            Some(id) => Value::from(id.as_str()),
            None => Value::Null,
        }
    }
}

pub struct OrderMapping {
    resolved: ResolvedMapping,
}

impl OrderMapping {
    pub fn new() -> Self {
        let fields = FieldMap::new([("id", "order_id"), ("product", "product_name")]).unwrap();
        let mapping = StaticMapping::new("orders", "id", fields).with_auto_generate_id(true);
        Self {
            resolved: ResolvedMapping::resolve(&mapping).unwrap(),
        }
    }
}

impl Mapping for OrderMapping {
    type Entity = Order;

    fn name(&self) -> &str {
        self.resolved.name()
    }

    fn map(&self) -> &FieldMap {
        self.resolved.fields()
    }

    fn identity(&self) -> &str {
        self.resolved.identity()
    }

    fn auto_generate_id(&self) -> bool {
        true
    }

    fn from_document(&self, document: &Document) -> MappingResult<Order> {
        self.resolved.hydrate(document)
    }
}

pub fn clients() -> Vec<Client> {
    vec![
        Client::new(1, "John Doe", "2014-12-11", 3, 25.125),
        Client::new(2, "Junichi Masuda", "2013-02-22", 3, 50978.125),
        Client::new(3, "Shigeru Miyamoto", "2010-12-01", 5, 47889850.125),
        Client::new(4, "Ken Sugimori", "2010-12-10", 4, 69158.687),
    ]
}

// =============================================================================
// Engine wrapper
// =============================================================================

/// Memory engine that counts collection calls
#[derive(Debug, Clone, Default)]
pub struct TestEngine {
    inner: MemoryEngine,
    calls: Arc<AtomicUsize>,
    ignore_upserts: bool,
}

impl TestEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bulk upserts that match nothing are silently skipped
    pub fn ignoring_upserts() -> Self {
        Self {
            ignore_upserts: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl StorageEngine for TestEngine {
    type Collection = TestCollection;

    fn collection(&self, database: &str, name: &str) -> EngineResult<TestCollection> {
        Ok(TestCollection {
            inner: self.inner.collection(database, name)?,
            calls: Arc::clone(&self.calls),
            ignore_upserts: self.ignore_upserts,
        })
    }
}

pub struct TestCollection {
    inner: MemoryCollection,
    calls: Arc<AtomicUsize>,
    ignore_upserts: bool,
}

impl TestCollection {
    fn call(&self) -> &MemoryCollection {
        self.calls.fetch_add(1, Ordering::SeqCst);
        &self.inner
    }
}

impl Collection for TestCollection {
    fn find_one(&self, filter: &Predicate, options: &FindOptions) -> EngineResult<Option<Document>> {
        self.call().find_one(filter, options)
    }

    fn find(&self, filter: &Predicate, options: &FindOptions) -> EngineResult<Vec<Document>> {
        self.call().find(filter, options)
    }

    fn count(&self, filter: &Predicate) -> EngineResult<u64> {
        self.call().count(filter)
    }

    fn insert_one(&self, document: Document) -> EngineResult<Value> {
        self.call().insert_one(document)
    }

    fn insert_many(&self, documents: Vec<Document>) -> EngineResult<Vec<Value>> {
        self.call().insert_many(documents)
    }

    fn find_one_and_update(
        &self,
        filter: &Predicate,
        set: Document,
        options: UpdateOptions,
    ) -> EngineResult<Option<Document>> {
        self.call().find_one_and_update(filter, set, options)
    }

    fn bulk_write(
        &self,
        models: Vec<WriteModel>,
        options: BulkWriteOptions,
    ) -> EngineResult<BulkWriteResult> {
        let models = if self.ignore_upserts {
            models
                .into_iter()
                .map(|model| match model {
                    WriteModel::UpdateOne { filter, set, .. } => WriteModel::UpdateOne {
                        filter,
                        set,
                        upsert: false,
                    },
                    other => other,
                })
                .collect()
        } else {
            models
        };
        self.call().bulk_write(models, options)
    }

    fn delete_one(&self, filter: &Predicate) -> EngineResult<u64> {
        self.call().delete_one(filter)
    }

    fn delete_many(&self, filter: &Predicate) -> EngineResult<u64> {
        self.call().delete_many(filter)
    }

    fn distinct(
        &self,
        field: &str,
        filter: &Predicate,
        options: &FindOptions,
    ) -> EngineResult<Vec<Value>> {
        self.call().distinct(field, filter, options)
    }

    fn drop_collection(&self) -> EngineResult<()> {
        self.call().drop_collection()
    }
}

// =============================================================================
// Setup
// =============================================================================

pub type ClientRepository = Repository<ClientMapping, TestEngine>;

pub fn empty_repository_on(engine: TestEngine) -> ClientRepository {
    Repository::new(ClientMapping::new(), engine).unwrap()
}

/// Repository seeded with the four sample clients
pub fn seeded_repository() -> ClientRepository {
    let repository = empty_repository_on(TestEngine::new());
    repository.add_all(&clients()).unwrap();
    repository
}

pub type OrderRepository = Repository<OrderMapping, TestEngine>;

pub fn order_repository() -> OrderRepository {
    Repository::new(OrderMapping::new(), TestEngine::new()).unwrap()
}

pub fn names(clients: &[Client]) -> Vec<String> {
    let mut names: Vec<String> = clients.iter().map(|c| c.name.clone()).collect();
    names.sort();
    names
}

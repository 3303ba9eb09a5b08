//! Repository Operation Tests
//!
//! End-to-end behaviour of the repository over the in-memory engine:
//! - Filters select the same documents whichever clause holds them
//! - Rejected queries never reach the engine
//! - Paging totals count every match
//! - Writes upsert by identity and return the stored entities

mod common;

use aerorepo::compiler::{CompileResult, Predicate};
use aerorepo::mapping::ResolvedMapping;
use aerorepo::model::{EntityId, Fields, Filter, Sort};
use aerorepo::repository::{Pageable, QueryStrategies, RepositoryError};
use common::{
    clients, empty_repository_on, names, order_repository, seeded_repository, Client, Order,
    OrderRepository, TestEngine,
};
use serde_json::json;

// =============================================================================
// Filter Tests
// =============================================================================

#[test]
fn test_must_be_greater_than() {
    let repo = seeded_repository();
    let mut filter = Filter::new();
    filter.must().be_greater_than("totalOrders", 2);

    let results = repo.find_by(Some(&filter), None, Some(&Fields::new(["name"]))).unwrap();
    assert_eq!(results.len(), 4);
}

#[test]
fn test_must_and_must_not_less_than_or_equal() {
    let repo = seeded_repository();

    let mut filter = Filter::new();
    filter.must().be_less_than_or_equal("totalOrders", 4);
    assert_eq!(repo.find_by(Some(&filter), None, None).unwrap().len(), 3);

    let mut filter = Filter::new();
    filter.must_not().be_less_than_or_equal("totalOrders", 4);
    let results = repo.find_by(Some(&filter), None, None).unwrap();
    assert_eq!(names(&results), vec!["Shigeru Miyamoto"]);
}

#[test]
fn test_range_and_not_range_partition() {
    let repo = seeded_repository();

    let mut inside = Filter::new();
    inside.must().range("totalOrders", 2, 4);
    let mut outside = Filter::new();
    outside.must().not_range("totalOrders", 2, 4);

    let inside = repo.find_by(Some(&inside), None, None).unwrap();
    let outside = repo.find_by(Some(&outside), None, None).unwrap();
    assert_eq!(inside.len(), 3);
    assert_eq!(names(&outside), vec!["Shigeru Miyamoto"]);
}

#[test]
fn test_should_contain() {
    let repo = seeded_repository();
    let mut filter = Filter::new();
    filter.should().contain("name", "Ken");

    let results = repo.find_by(Some(&filter), None, None).unwrap();
    assert_eq!(names(&results), vec!["Ken Sugimori"]);
}

#[test]
fn test_equal_ignores_case() {
    let repo = seeded_repository();
    let mut filter = Filter::new();
    filter.must().equal("name", "ken sugimori");
    assert_eq!(repo.count(Some(&filter)).unwrap(), 1);

    let mut filter = Filter::new();
    filter.must_not().equal("name", "Ken Sugimori");
    assert_eq!(repo.count(Some(&filter)).unwrap(), 3);
}

#[test]
fn test_prefix_and_suffix() {
    let repo = seeded_repository();

    let mut filter = Filter::new();
    filter.must().starts_with("name", "Ke");
    assert_eq!(repo.count(Some(&filter)).unwrap(), 1);

    let mut filter = Filter::new();
    filter.must_not().ends_with("name", "mori");
    let results = repo.find_by(Some(&filter), None, None).unwrap();
    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|c| !c.name.contains("Ken")));
}

#[test]
fn test_include_group() {
    let repo = seeded_repository();
    let dates = ["2010-12-01", "2010-12-10", "2013-02-22"];

    let mut filter = Filter::new();
    filter.must().include_group("date", dates);
    assert_eq!(repo.count(Some(&filter)).unwrap(), 3);

    let mut filter = Filter::new();
    filter.must().not_include_group("date", dates);
    let results = repo.find_by(Some(&filter), None, None).unwrap();
    assert_eq!(names(&results), vec!["John Doe"]);
}

#[test]
fn test_find_by_on_empty_repository() {
    let repo = empty_repository_on(TestEngine::new());
    let mut filter = Filter::new();
    filter.must().contain("name", "Ken");

    let results = repo
        .find_by(Some(&filter), Some(&Sort::new().asc("name")), None)
        .unwrap();
    assert!(results.is_empty());
}

#[test]
fn test_find_by_sorted_with_projection() {
    let repo = seeded_repository();
    let results = repo
        .find_by(None, Some(&Sort::new().desc("totalOrders").asc("name")), Some(&Fields::new(["name"])))
        .unwrap();

    let ordered: Vec<&str> = results.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        ordered,
        vec!["Shigeru Miyamoto", "Ken Sugimori", "John Doe", "Junichi Masuda"]
    );
    // Unprojected fields are left at their defaults
    assert!(results.iter().all(|c| c.total_orders == 0 && c.id.is_none()));
}

fn match_everything(_: &Filter, _: &ResolvedMapping) -> CompileResult<Predicate> {
    Ok(Predicate::All)
}

#[test]
fn test_injected_filter_strategy() {
    let repo = seeded_repository()
        .with_strategies(QueryStrategies::default().with_filter(match_everything));
    let mut filter = Filter::new();
    filter.must().equal("nickname", "Ken");

    assert_eq!(repo.count(Some(&filter)).unwrap(), 4);
}

// =============================================================================
// Rejection Tests
// =============================================================================

#[test]
fn test_unmapped_field_never_reaches_engine() {
    let engine = TestEngine::new();
    let repo = empty_repository_on(engine.clone());

    let mut filter = Filter::new();
    filter.must().equal("nickname", "Ken");

    let err = repo.find_by(Some(&filter), None, None).unwrap_err();
    assert!(err.is_field_mapping());

    let err = repo.find_by(None, Some(&Sort::new().asc("nickname")), None).unwrap_err();
    assert!(err.is_field_mapping());

    let err = repo.count(Some(&filter)).unwrap_err();
    assert!(err.is_field_mapping());

    assert_eq!(engine.calls(), 0);
    assert_eq!(repo.metrics().snapshot().queries_rejected, 3);
}

#[test]
fn test_distinct_requires_one_field() {
    let repo = seeded_repository();

    let err = repo
        .find_by_distinct(&Fields::new(["name", "date"]), None, None)
        .unwrap_err();
    assert!(err.is_unsupported());

    let err = repo.find_by_distinct(&Fields::default(), None, None).unwrap_err();
    assert!(matches!(err, RepositoryError::UnsupportedOperation(_)));
}

// =============================================================================
// Distinct and Paging Tests
// =============================================================================

#[test]
fn test_find_by_distinct() {
    let repo = seeded_repository();
    let mut values = repo
        .find_by_distinct(&Fields::new(["totalOrders"]), None, None)
        .unwrap();
    values.sort_by_key(|v| v.as_i64());
    assert_eq!(values, vec![json!(3), json!(4), json!(5)]);

    let mut filter = Filter::new();
    filter.must().be_greater_than("totalOrders", 3);
    let values = repo
        .find_by_distinct(&Fields::new(["name"]), Some(&filter), Some(&Sort::new().asc("name")))
        .unwrap();
    assert_eq!(values, vec![json!("Ken Sugimori"), json!("Shigeru Miyamoto")]);
}

#[test]
fn test_find_all_without_pageable() {
    let repo = seeded_repository();
    let page = repo.find_all(None).unwrap();

    assert_eq!(page.entities().len(), 4);
    assert_eq!(page.total_elements(), 4);
    assert_eq!(page.page_number(), 1);
    assert_eq!(page.total_pages(), 1);
}

#[test]
fn test_find_all_with_pageable() {
    let repo = seeded_repository();
    let page = repo.find_all(Some(&Pageable::new(2, 2))).unwrap();

    assert_eq!(page.entities().len(), 2);
    assert_eq!(page.page_number(), 2);
    assert_eq!(page.total_pages(), 2);
    assert_eq!(page.total_elements(), 4);
    assert_eq!(names(page.entities()), vec!["Ken Sugimori", "Shigeru Miyamoto"]);
}

#[test]
fn test_find_all_pageable_echoes_query() {
    let repo = seeded_repository();
    let mut filter = Filter::new();
    filter.must().be_greater_than_or_equal("totalOrders", 3);
    let pageable = Pageable::new(1, 3)
        .with_filter(filter)
        .with_sort(Sort::new().desc("totalEarnings"));

    let page = repo.find_all(Some(&pageable)).unwrap();
    let ordered: Vec<&str> = page.entities().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(ordered, vec!["Shigeru Miyamoto", "Ken Sugimori", "Junichi Masuda"]);
    assert_eq!(page.total_elements(), 4);
    assert_eq!(page.total_pages(), 2);
    assert!(page.filter().is_some());
    assert!(page.sort().is_some());
}

#[test]
fn test_find_all_with_distinct() {
    let repo = seeded_repository();
    let pageable = Pageable::new(1, 2).with_distinct(Fields::new(["name"]));
    let page = repo.find_all(Some(&pageable)).unwrap();

    // Distinct values are not windowed
    assert_eq!(page.values().len(), 4);
    assert!(page.entities().is_empty());
    assert_eq!(page.total_elements(), 4);
    assert_eq!(page.total_pages(), 2);
}

#[test]
fn test_count() {
    let repo = seeded_repository();
    assert_eq!(repo.count(None).unwrap(), 4);

    let mut filter = Filter::new();
    filter.must().contain("name", "Ken");
    assert_eq!(repo.count(Some(&filter)).unwrap(), 1);
}

// =============================================================================
// Lookup Tests
// =============================================================================

#[test]
fn test_find_and_exists() {
    let repo = seeded_repository();

    let found = repo.find(&EntityId::from(4), None).unwrap().unwrap();
    assert_eq!(found, clients()[3]);

    assert!(repo.find(&EntityId::from(99999), None).unwrap().is_none());
    assert!(repo.exists(&EntityId::from(1)).unwrap());
    assert!(!repo.exists(&EntityId::from(99999)).unwrap());
}

#[test]
fn test_find_with_fields() {
    let repo = seeded_repository();
    let found = repo
        .find(&EntityId::from(1), Some(&Fields::new(["name", "totalOrders"])))
        .unwrap()
        .unwrap();
    assert_eq!(found.name, "John Doe");
    assert_eq!(found.total_orders, 3);
    assert_eq!(found.date, "");
}

#[test]
fn test_explain_compiles_without_engine() {
    let engine = TestEngine::new();
    let repo = empty_repository_on(engine.clone());
    let mut filter = Filter::new();
    filter.must().be_greater_than("totalOrders", 2);

    let explain = repo
        .explain(Some(&filter), Some(&Sort::new().asc("name")), Some(&Fields::new(["name"])))
        .unwrap();
    assert_eq!(explain.collection, "clients");
    assert_eq!(explain.filter.to_value(), json!({"total_orders": {"$gt": 2}}));
    assert!(explain.sort.is_some());
    assert!(explain.projection.is_some());
    assert_eq!(engine.calls(), 0);
}

// =============================================================================
// Write Tests
// =============================================================================

#[test]
fn test_add_inserts_new_client() {
    let repo = seeded_repository();
    let client = Client::new(5, "Satoshi Tajiri", "2010-12-01", 3, 1000.0);

    let stored = repo.add(&client).unwrap();
    assert_eq!(stored, Some(client));
    assert!(repo.find(&EntityId::from(5), None).unwrap().is_some());
    assert_eq!(repo.count(None).unwrap(), 5);
}

#[test]
fn test_add_updates_existing_client() {
    let repo = seeded_repository();
    let mut client = clients()[0].clone();
    client.name = "Homer Simpson".to_string();

    let stored = repo.add(&client).unwrap().unwrap();
    assert_eq!(stored.name, "Homer Simpson");
    assert_eq!(repo.count(None).unwrap(), 4);

    let found = repo.find(&EntityId::from(1), None).unwrap().unwrap();
    assert_eq!(found.name, "Homer Simpson");
}

#[test]
fn test_add_without_identity() {
    let repo = empty_repository_on(TestEngine::new());
    let client = Client {
        name: "Anonymous".to_string(),
        ..Client::default()
    };

    let stored = repo.add(&client).unwrap().unwrap();
    assert_eq!(stored.name, "Anonymous");
    assert_eq!(repo.count(None).unwrap(), 1);
}

#[test]
fn test_add_all_updates_and_inserts() {
    let repo = seeded_repository();
    let mut updated = clients()[0].clone();
    updated.name = "Homer Simpson".to_string();
    updated.total_orders = 10;
    updated.total_earnings = 99.5;
    let inserted = Client::new(6, "Satoru Iwata", "2012-01-01", 1, 1.5);

    let mut stored = repo.add_all(&[updated.clone(), inserted.clone()]).unwrap();
    stored.sort_by_key(|c| c.id);
    assert_eq!(stored, vec![updated.clone(), inserted.clone()]);

    let mut filter = Filter::new();
    filter.must().include_group("id", [1, 6]);
    let found = repo
        .find_by(Some(&filter), Some(&Sort::new().asc("id")), None)
        .unwrap();
    assert_eq!(found, vec![updated, inserted]);

    // Client 1 was updated in place, client 6 was added
    assert_eq!(repo.count(None).unwrap(), 5);
    let mut previous = Filter::new();
    previous.must().equal("name", "John Doe");
    assert_eq!(repo.count(Some(&previous)).unwrap(), 0);
    let untouched = repo.find(&EntityId::from(2), None).unwrap().unwrap();
    assert_eq!(untouched, clients()[1]);
    assert_eq!(repo.metrics().snapshot().bulk_retries, 0);
}

#[test]
fn test_add_all_inserts_when_upserts_are_skipped() {
    let repo = empty_repository_on(TestEngine::ignoring_upserts());

    let stored = repo.add_all(&clients()).unwrap();
    assert_eq!(stored.len(), 4);
    assert_eq!(repo.count(None).unwrap(), 4);
    assert_eq!(repo.metrics().snapshot().bulk_retries, 1);

    // Existing clients now match, so no retry is needed
    let stored = repo.add_all(&clients()).unwrap();
    assert_eq!(stored.len(), 4);
    assert_eq!(repo.count(None).unwrap(), 4);
    assert_eq!(repo.metrics().snapshot().bulk_retries, 1);
}

#[test]
fn test_add_all_empty_is_noop() {
    let engine = TestEngine::new();
    let repo = empty_repository_on(engine.clone());
    assert!(repo.add_all(&[]).unwrap().is_empty());
    assert_eq!(engine.calls(), 0);
}

#[test]
fn test_remove() {
    let repo = seeded_repository();
    let id = EntityId::from(1);

    repo.remove(&id).unwrap();
    assert!(!repo.exists(&id).unwrap());
    assert_eq!(repo.count(None).unwrap(), 3);

    // Removing a missing id is not an error
    repo.remove(&id).unwrap();
    assert_eq!(repo.metrics().snapshot().documents_removed, 1);
}

#[test]
fn test_remove_all() {
    let repo = seeded_repository();
    repo.remove_all(None).unwrap();
    assert!(!repo.exists(&EntityId::from(1)).unwrap());
    assert_eq!(repo.count(None).unwrap(), 0);
}

#[test]
fn test_remove_all_with_filter() {
    let repo = seeded_repository();
    let mut filter = Filter::new();
    filter.must().equal("name", "John Doe");

    repo.remove_all(Some(&filter)).unwrap();
    assert!(!repo.exists(&EntityId::from(1)).unwrap());
    assert_eq!(repo.count(None).unwrap(), 3);
}

#[test]
fn test_transactional() {
    let repo = seeded_repository();
    let added = repo
        .transactional(|repo| repo.add(&Client::new(5, "Satoshi Tajiri", "2010-12-01", 3, 1.0)))
        .unwrap();
    assert!(added.is_some());
    assert_eq!(repo.count(None).unwrap(), 5);
}

#[test]
fn test_transactional_returns_failure_unchanged() {
    let repo = seeded_repository();
    let err = repo
        .transactional(|repo| {
            repo.add(&Client::new(5, "Satoshi Tajiri", "2010-12-01", 3, 1.0))?;
            Err::<(), _>(RepositoryError::UnsupportedOperation("abort".into()))
        })
        .unwrap_err();
    assert!(err.is_unsupported());

    // Completed writes are not rolled back
    assert!(repo.exists(&EntityId::from(5)).unwrap());
}

// =============================================================================
// Generated Identity Tests
// =============================================================================

fn orders_with_ids(repo: &OrderRepository) -> Vec<String> {
    ["Ken", "Red", "Blue"]
        .iter()
        .map(|product| repo.add(&Order::new(product)).unwrap().unwrap().id.unwrap())
        .collect()
}

#[test]
fn test_generated_identity_filters_on_object_id() {
    let repo = order_repository();
    let ids = orders_with_ids(&repo);

    let mut filter = Filter::new();
    filter.must().equal("id", ids[1].as_str());
    let found = repo.find_by(Some(&filter), None, None).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].product, "Red");
    assert_eq!(found[0].id.as_deref(), Some(ids[1].as_str()));

    let explain = repo.explain(Some(&filter), None, None).unwrap();
    assert_eq!(explain.filter.to_value(), json!({"_id": {"$eq": ids[1]}}));

    let mut filter = Filter::new();
    filter.must_not().equal("id", ids[1].as_str());
    assert_eq!(repo.count(Some(&filter)).unwrap(), 2);

    let mut filter = Filter::new();
    filter.must().include_group("id", [ids[0].as_str(), ids[2].as_str()]);
    assert_eq!(repo.count(Some(&filter)).unwrap(), 2);
}

#[test]
fn test_generated_identity_sort_and_projection() {
    let repo = order_repository();
    let mut ids = orders_with_ids(&repo);
    ids.sort();

    let sorted: Vec<String> = repo
        .find_by(None, Some(&Sort::new().asc("id")), None)
        .unwrap()
        .into_iter()
        .filter_map(|order| order.id)
        .collect();
    assert_eq!(sorted, ids);

    let projected = repo.find_by(None, None, Some(&Fields::new(["id"]))).unwrap();
    assert_eq!(projected.len(), 3);
    assert!(projected.iter().all(|o| o.id.is_some() && o.product.is_empty()));
}

#[test]
fn test_generated_identity_lookup_and_update() {
    let repo = order_repository();
    let ids = orders_with_ids(&repo);

    let found = repo.find(&EntityId::from(ids[0].as_str()), None).unwrap().unwrap();
    assert_eq!(found.product, "Ken");

    let renamed = Order {
        id: Some(ids[0].clone()),
        product: "Green".to_string(),
    };
    let stored = repo.add(&renamed).unwrap();
    assert_eq!(stored, Some(renamed));
    assert_eq!(repo.count(None).unwrap(), 3);
}

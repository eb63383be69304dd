//! In-Memory Loader Integration Tests
//!
//! Descriptor chains realized against the in-process reference loader:
//! - Criteria assembled in one scope, realized in another
//! - Execution context carried to the loader for authorization
//! - Async realization on the blocking pool

use pundit::memory::{InMemoryLoader, MemoryError};
use pundit::query::{merge, Constraint, Credential, Criteria, ExecutionContext, Query, QueryError};
use serde_json::{json, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_loader() -> InMemoryLoader {
    let loader = InMemoryLoader::new().require_key("session_token", "r:valid");
    let docs = [
        json!({"name": "anvil", "color": "black", "size": "L", "price": 120}),
        json!({"name": "bolt", "color": "red", "size": "S", "price": 2}),
        json!({"name": "crate", "color": "red", "size": "L", "price": 35}),
        json!({"name": "drill", "color": "red", "size": "L", "price": 89, "tags": ["sale"]}),
    ];
    for doc in docs {
        loader.insert("Widget", doc).unwrap();
    }
    loader
}

fn session() -> ExecutionContext {
    ExecutionContext::map([("session_token", json!("r:valid"))])
}

fn names(results: &[Value]) -> Vec<&str> {
    results.iter().filter_map(|d| d["name"].as_str()).collect()
}

/// Criteria are assembled here; the caller decides when to realize.
fn red_large_widgets(loader: &InMemoryLoader) -> Query {
    Query::new("Widget", loader.clone(), session())
        .unwrap()
        .add_criteria(Criteria::eq("color", json!("red")), merge::shallow)
        .add_criteria(Criteria::eq("size", json!("L")), merge::shallow)
}

// =============================================================================
// Realization Tests
// =============================================================================

#[test]
fn test_chain_realized_outside_building_scope() {
    let loader = setup_loader();
    let query = red_large_widgets(&loader);

    let results = query.to_sequence().unwrap();
    assert_eq!(names(&results), vec!["crate", "drill"]);
}

#[test]
fn test_realization_sees_later_inserts() {
    let loader = setup_loader();
    let query = red_large_widgets(&loader);
    assert_eq!(query.to_sequence().unwrap().len(), 2);

    loader
        .insert("Widget", json!({"name": "easel", "color": "red", "size": "L"}))
        .unwrap();
    assert_eq!(query.to_sequence().unwrap().len(), 3);
}

#[test]
fn test_deep_merged_range() {
    let loader = setup_loader();
    let query = Query::new("Widget", loader, session())
        .unwrap()
        .add_criteria(Criteria::constraint("price", Constraint::Gt, json!(10)), merge::deep)
        .add_criteria(Criteria::constraint("price", Constraint::Lt, json!(100)), merge::deep);

    assert_eq!(
        query.criteria().to_value(),
        json!({"price": {"$gt": 10, "$lt": 100}})
    );
    assert_eq!(names(&query.to_sequence().unwrap()), vec!["crate", "drill"]);
}

#[test]
fn test_array_and_regex_constraints() {
    let loader = setup_loader();
    let base = Query::new("Widget", loader, session()).unwrap();

    let on_sale = base.add_criteria(Criteria::eq("tags", json!("sale")), merge::shallow);
    assert_eq!(names(&on_sale.to_sequence().unwrap()), vec!["drill"]);

    let b_names = base.add_criteria(
        Criteria::constraint("name", Constraint::Regex, json!("^b")),
        merge::shallow,
    );
    assert_eq!(names(&b_names.to_sequence().unwrap()), vec!["bolt"]);
}

#[test]
fn test_unknown_collection_is_empty() {
    let loader = setup_loader();
    let query = Query::new("Gadget", loader, session()).unwrap();
    assert!(query.to_sequence().unwrap().is_empty());
}

// =============================================================================
// Execution Context Tests
// =============================================================================

#[test]
fn test_missing_session_is_realization_failure() {
    let loader = setup_loader();
    let query = Query::new("Widget", loader, ExecutionContext::empty()).unwrap();

    let err = query.to_sequence().unwrap_err();
    assert!(matches!(err, QueryError::Realization(_)));
    let cause = err
        .capability_error()
        .and_then(|e| e.downcast_ref::<MemoryError>())
        .unwrap();
    assert_eq!(cause, &MemoryError::Unauthorized("session_token".to_string()));
}

#[test]
fn test_credential_sequence_context() {
    let loader = setup_loader();
    let context = ExecutionContext::credentials(vec![
        Credential::new("app_id", "demo"),
        Credential::new("session_token", "r:valid"),
    ]);
    let query = Query::new("Widget", loader, context).unwrap();

    assert_eq!(query.to_sequence().unwrap().len(), 4);
}

#[test]
fn test_invalid_constraint_is_realization_failure() {
    let loader = setup_loader();
    let query = Query::new("Widget", loader, session())
        .unwrap()
        .add_criteria(Criteria::eq("price", json!({"$within": [1, 2]})), merge::shallow);

    let err = query.to_sequence().unwrap_err();
    assert_eq!(err.code(), "REALIZATION_FAILED");
    assert!(err.to_string().contains("unknown operator $within"));
}

/// A malformed entry fails even when an earlier entry already excludes every document.
#[test]
fn test_malformed_entry_fails_on_populated_collection() {
    let loader = InMemoryLoader::new();
    loader.insert("Widget", json!({"a": 0, "b": 1})).unwrap();
    let query = Query::new("Widget", loader, ExecutionContext::empty())
        .unwrap()
        .add_criteria(Criteria::constraint("a", Constraint::Gt, json!(5)), merge::shallow)
        .add_criteria(Criteria::eq("b", json!({"$near": 1})), merge::shallow);

    let err = query.to_sequence().unwrap_err();
    let cause = err
        .capability_error()
        .and_then(|e| e.downcast_ref::<MemoryError>())
        .unwrap();
    assert!(matches!(cause, MemoryError::InvalidConstraint(_)));
}

#[test]
fn test_bad_regex_fails_on_unknown_collection() {
    let loader = InMemoryLoader::new();
    let query = Query::new("Gadget", loader, ExecutionContext::empty())
        .unwrap()
        .add_criteria(
            Criteria::constraint("b", Constraint::Regex, json!("(")),
            merge::shallow,
        );

    let err = query.to_sequence().unwrap_err();
    assert!(matches!(err, QueryError::Realization(_)));
    assert!(err.to_string().contains("bad $regex"));
}

#[test]
fn test_range_on_integers_beyond_f64_precision() {
    let loader = InMemoryLoader::new();
    loader
        .insert("Widget", json!({"id": 9_007_199_254_740_993u64}))
        .unwrap();
    let query = Query::new("Widget", loader, ExecutionContext::empty())
        .unwrap()
        .add_criteria(
            Criteria::constraint("id", Constraint::Gt, json!(9_007_199_254_740_992u64)),
            merge::shallow,
        );

    assert_eq!(query.to_sequence().unwrap().len(), 1);
}

// =============================================================================
// Async Tests
// =============================================================================

#[tokio::test]
async fn test_async_realization_matches_blocking() {
    let loader = setup_loader();
    let query = red_large_widgets(&loader);

    let blocking = query.to_sequence().unwrap();
    let async_results = query.to_sequence_async().await.unwrap();
    assert_eq!(blocking, async_results);
}

#[tokio::test]
async fn test_concurrent_async_branches() {
    let loader = setup_loader();
    let base = Query::new("Widget", loader, session()).unwrap();

    let mut handles = Vec::new();
    for size in ["S", "L"] {
        let branch = base.add_criteria(Criteria::eq("size", json!(size)), merge::shallow);
        handles.push(tokio::spawn(async move { branch.to_sequence_async().await }));
    }

    let mut counts = Vec::new();
    for handle in handles {
        counts.push(handle.await.unwrap().unwrap().len());
    }
    assert_eq!(counts, vec![1, 3]);
}

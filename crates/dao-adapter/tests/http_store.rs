//! HttpDocumentStore against a canned-response engine

mod common;

use common::MockEngine;
use dao_adapter::HttpDocumentStore;
use dao_domain::{Document, DocumentKey, DocumentStore, StoreError, WriteMode, WriteResult};
use serde_json::json;

fn key() -> DocumentKey {
    DocumentKey::new("employee", "1")
}

fn alice() -> Document {
    Document::new()
        .with_field("id", 1)
        .with_field("name", "Alice")
        .with_field("age", 30)
}

fn connect(engine: &MockEngine) -> HttpDocumentStore {
    HttpDocumentStore::connect(&engine.config()).unwrap()
}

#[test]
fn test_ping_then_close() {
    let engine = MockEngine::serve(vec![(
        200,
        r#"{"name":"node-1","cluster_name":"test-cluster","version":{"number":"8.13.0"}}"#,
    )]);
    let store = connect(&engine);

    let info = store.ping().unwrap();
    store.close();

    assert_eq!(info.cluster_name, "test-cluster");
    let requests = engine.requests();
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].target, "/");
}

#[test]
fn test_index_exists_on_404_is_false() {
    let engine = MockEngine::serve(vec![(404, "")]);
    let store = connect(&engine);

    assert!(!store.index_exists("index1").unwrap());
    assert_eq!(engine.requests()[0].method, "HEAD");
}

#[test]
fn test_create_index_maps_tag_as_keyword() {
    let engine = MockEngine::serve(vec![(
        200,
        r#"{"acknowledged":true,"shards_acknowledged":true,"index":"index1"}"#,
    )]);
    let store = connect(&engine);

    store.create_index("index1").unwrap();

    let requests = engine.requests();
    assert_eq!(requests[0].method, "PUT");
    assert_eq!(requests[0].target, "/index1");
    assert_eq!(
        requests[0].json()["mappings"]["properties"]["doc_type"]["type"],
        "keyword"
    );
}

#[test]
fn test_create_index_created_concurrently_is_ok() {
    let engine = MockEngine::serve(vec![(
        400,
        r#"{"error":{"type":"resource_already_exists_exception","reason":"index [index1] already exists"},"status":400}"#,
    )]);
    let store = connect(&engine);

    assert!(store.create_index("index1").is_ok());
    engine.requests();
}

#[test]
fn test_get_missing_document_is_none() {
    let engine = MockEngine::serve(vec![(
        404,
        r#"{"_index":"index1","_id":"employee:1","found":false}"#,
    )]);
    let store = connect(&engine);

    assert_eq!(store.get("index1", "Employee", &key()).unwrap(), None);

    let requests = engine.requests();
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].target, "/index1/_doc/employee:1");
}

#[test]
fn test_get_found_false_is_none() {
    let engine = MockEngine::serve(vec![(
        200,
        r#"{"_index":"index1","_id":"employee:1","found":false}"#,
    )]);
    let store = connect(&engine);

    assert_eq!(store.get("index1", "Employee", &key()).unwrap(), None);
    engine.requests();
}

#[test]
fn test_get_other_mapping_is_none() {
    let engine = MockEngine::serve(vec![(
        200,
        r#"{"_index":"index1","_id":"employee:1","found":true,"_source":{"id":"1","name":"Mallory","doc_type":"Manager"}}"#,
    )]);
    let store = connect(&engine);

    assert_eq!(store.get("index1", "Employee", &key()).unwrap(), None);
    engine.requests();
}

#[test]
fn test_get_strips_mapping_tag() {
    let engine = MockEngine::serve(vec![(
        200,
        r#"{"_index":"index1","_id":"employee:1","found":true,"_source":{"id":"1","name":"Alice","age":"30","doc_type":"Employee"}}"#,
    )]);
    let store = connect(&engine);

    assert_eq!(
        store.get("index1", "Employee", &key()).unwrap(),
        Some(alice())
    );
    engine.requests();
}

#[test]
fn test_get_on_missing_index_is_error() {
    let engine = MockEngine::serve(vec![(
        404,
        r#"{"error":{"type":"index_not_found_exception","reason":"no such index [index1]"},"status":404}"#,
    )]);
    let store = connect(&engine);

    let err = store.get("index1", "Employee", &key()).unwrap_err();
    assert_eq!(
        err,
        StoreError::IndexNotFound {
            index: "index1".to_string()
        }
    );
    engine.requests();
}

#[test]
fn test_create_only_put_conflict() {
    let engine = MockEngine::serve(vec![(
        409,
        r#"{"error":{"type":"version_conflict_engine_exception","reason":"[employee:1]: version conflict, document already exists"},"status":409}"#,
    )]);
    let store = connect(&engine);

    let err = store
        .put("index1", "Employee", &key(), &alice(), WriteMode::CreateOnly)
        .unwrap_err();
    assert_eq!(
        err,
        StoreError::Conflict {
            key: "employee:1".to_string()
        }
    );

    let requests = engine.requests();
    assert_eq!(requests[0].method, "PUT");
    assert_eq!(
        requests[0].target,
        "/index1/_create/employee:1?refresh=wait_for"
    );
    assert_eq!(
        requests[0].json(),
        json!({"id": "1", "name": "Alice", "age": "30", "doc_type": "Employee"})
    );
}

#[test]
fn test_upsert_put_reports_engine_result() {
    let engine = MockEngine::serve(vec![(
        200,
        r#"{"_index":"index1","_id":"employee:1","result":"updated"}"#,
    )]);
    let store = connect(&engine);

    let result = store
        .put("index1", "Employee", &key(), &alice(), WriteMode::Upsert)
        .unwrap();

    assert_eq!(result, WriteResult::Updated);
    assert_eq!(
        engine.requests()[0].target,
        "/index1/_doc/employee:1?refresh=wait_for"
    );
}

#[test]
fn test_update_missing_document_is_not_found() {
    let engine = MockEngine::serve(vec![(
        404,
        r#"{"error":{"type":"document_missing_exception","reason":"[employee:1]: document missing"},"status":404}"#,
    )]);
    let store = connect(&engine);

    let partial = Document::new().with_field("name", "Alicia");
    let result = store.update("index1", "Employee", &key(), &partial).unwrap();
    assert_eq!(result, WriteResult::NotFound);

    let requests = engine.requests();
    assert_eq!(requests[0].method, "POST");
    assert_eq!(
        requests[0].target,
        "/index1/_update/employee:1?refresh=wait_for"
    );
    assert_eq!(
        requests[0].json(),
        json!({"doc": {"name": "Alicia", "doc_type": "Employee"}, "detect_noop": false})
    );
}

#[test]
fn test_update_existing_document() {
    let engine = MockEngine::serve(vec![(
        200,
        r#"{"_index":"index1","_id":"employee:1","result":"updated"}"#,
    )]);
    let store = connect(&engine);

    let partial = Document::new().with_field("age", 31);
    assert_eq!(
        store.update("index1", "Employee", &key(), &partial).unwrap(),
        WriteResult::Updated
    );
    engine.requests();
}

#[test]
fn test_delete_missing_document_is_not_found() {
    let engine = MockEngine::serve(vec![(
        404,
        r#"{"_index":"index1","_id":"employee:1","result":"not_found"}"#,
    )]);
    let store = connect(&engine);

    let result = store.delete("index1", "Employee", &key()).unwrap();
    assert_eq!(result, WriteResult::NotFound);

    let requests = engine.requests();
    assert_eq!(requests[0].method, "DELETE");
    assert_eq!(
        requests[0].target,
        "/index1/_doc/employee:1?refresh=wait_for"
    );
}

#[test]
fn test_count_filters_on_mapping() {
    let engine = MockEngine::serve(vec![(
        200,
        r#"{"count":7,"_shards":{"total":1,"successful":1,"skipped":0,"failed":0}}"#,
    )]);
    let store = connect(&engine);

    assert_eq!(store.count("index1", "Employee").unwrap(), 7);

    let requests = engine.requests();
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].target, "/index1/_count");
    let should = &requests[0].json()["query"]["bool"]["should"];
    assert_eq!(should[0], json!({"term": {"doc_type": "Employee"}}));
    assert_eq!(should[1], json!({"term": {"doc_type.keyword": "Employee"}}));
}

#[test]
fn test_search_follows_scroll_until_total() {
    let engine = MockEngine::serve(vec![
        (
            200,
            r#"{"_scroll_id":"ctx-1","hits":{"total":{"value":3,"relation":"eq"},"hits":[
                {"_id":"employee:1","_source":{"id":"1","name":"Alice","doc_type":"Employee"}},
                {"_id":"employee:2","_source":{"id":"2","name":"Bob","doc_type":"Employee"}}]}}"#,
        ),
        (
            200,
            r#"{"_scroll_id":"ctx-1","hits":{"total":{"value":3,"relation":"eq"},"hits":[
                {"_id":"employee:3","_source":{"id":"3","name":"Carol","doc_type":"Employee"}}]}}"#,
        ),
        (200, r#"{"succeeded":true,"num_freed":1}"#),
    ]);
    let store = connect(&engine);

    let documents = store.search("index1", "Employee").unwrap();

    let names: Vec<&str> = documents.iter().filter_map(|d| d.get("name")).collect();
    assert_eq!(names, vec!["Alice", "Bob", "Carol"]);
    assert!(documents.iter().all(|d| d.get("doc_type").is_none()));

    let requests = engine.requests();
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].target, "/index1/_search?scroll=1m");
    assert_eq!(requests[0].json()["size"], 2);
    assert_eq!(requests[1].method, "POST");
    assert_eq!(requests[1].target, "/_search/scroll");
    assert_eq!(requests[1].json()["scroll_id"], "ctx-1");
    assert_eq!(requests[2].method, "DELETE");
    assert_eq!(requests[2].target, "/_search/scroll");
}

#[test]
fn test_search_fewer_hits_than_total_is_error() {
    let engine = MockEngine::serve(vec![
        (
            200,
            r#"{"_scroll_id":"ctx-1","hits":{"total":{"value":3,"relation":"eq"},"hits":[
                {"_id":"employee:1","_source":{"id":"1","name":"Alice","doc_type":"Employee"}}]}}"#,
        ),
        (
            200,
            r#"{"_scroll_id":"ctx-1","hits":{"total":{"value":3,"relation":"eq"},"hits":[]}}"#,
        ),
        (200, r#"{"succeeded":true,"num_freed":1}"#),
    ]);
    let store = connect(&engine);

    let err = store.search("index1", "Employee").unwrap_err();
    assert!(matches!(err, StoreError::InvalidResponse { .. }), "{:?}", err);

    // The search context is released on the error path too
    let requests = engine.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[2].method, "DELETE");
}

#[test]
fn test_search_empty_index() {
    let engine = MockEngine::serve(vec![
        (
            200,
            r#"{"_scroll_id":"ctx-1","hits":{"total":{"value":0,"relation":"eq"},"hits":[]}}"#,
        ),
        (200, r#"{"succeeded":true,"num_freed":1}"#),
    ]);
    let store = connect(&engine);

    assert!(store.search("index1", "Employee").unwrap().is_empty());
    assert_eq!(engine.requests().len(), 2);
}

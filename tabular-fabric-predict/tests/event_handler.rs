use object_store::memory::InMemory;
use object_store::ObjectStore;
use serde_json::{json, Value};
use std::sync::Arc;
use tabular_fabric_predict::archive::InputArchive;
use tabular_fabric_predict::config::{
    DEFAULT_EVENT_BODY_KEY, DEFAULT_INPUT_TABLE_KEY, DEFAULT_MODEL_KEY,
};
use tabular_fabric_predict::handlers::event::EventHandler;
use tabular_fabric_predict::loader::{CachePolicy, ModelLoader, ModelProvider};
use tabular_fabric_predict::storage::{fetch_object, put_object};
use tabular_fabric_predict::PredictError;

const WINE_MODEL: &str = r#"{
    "kind": "forest",
    "name": "wine-quality",
    "num_features": 2,
    "trees": [
        {"nodes": [
            {"split": {"feature": 1, "threshold": 10.0, "left": 1, "right": 2}},
            {"leaf": {"value": 5.0}},
            {"leaf": {"value": 7.0}}
        ]},
        {"nodes": [
            {"split": {"feature": 0, "threshold": 8.0, "left": 1, "right": 2}},
            {"leaf": {"value": 6.0}},
            {"leaf": {"value": 4.0}}
        ]}
    ]
}"#;

fn table_dict() -> Value {
    json!({
        "columns": ["fixed acidity", "alcohol"],
        "index": [0, 1],
        "data": [[7.4, 9.4], [11.2, 12.8]]
    })
}

/// `json.dumps(json.dumps(table_dict))`
fn event_for(table: &Value) -> Value {
    let once = serde_json::to_string(table).unwrap();
    json!({ "body": serde_json::to_string(&once).unwrap() })
}

async fn handler_for(store: Arc<dyn ObjectStore>, policy: CachePolicy) -> EventHandler {
    let provider = ModelProvider::new(ModelLoader::new(store.clone(), DEFAULT_MODEL_KEY), policy);
    let archive = InputArchive::new(store, DEFAULT_EVENT_BODY_KEY, DEFAULT_INPUT_TABLE_KEY);
    EventHandler::new(provider, archive)
}

async fn store_with_model() -> Arc<dyn ObjectStore> {
    let store: Arc<dyn ObjectStore> = Arc::new(InMemory::new());
    put_object(store.as_ref(), DEFAULT_MODEL_KEY, WINE_MODEL.to_string())
        .await
        .unwrap();
    store
}

#[test_log::test(tokio::test)]
async fn test_event_prediction_response() {
    let handler = handler_for(store_with_model().await, CachePolicy::PerInvocation).await;
    let response = handler.handle(event_for(&table_dict())).await.unwrap();

    assert_eq!(response["statusCode"], 200);
    let body = response["body"].as_str().unwrap();
    let inner: String = serde_json::from_str(body).unwrap();
    let out: Value = serde_json::from_str(&inner).unwrap();

    assert_eq!(out["columns"], json!(["fixed acidity", "alcohol", "_pred"]));
    assert_eq!(out["index"], json!([0, 1]));
    // row 0: (5 + 6) / 2, row 1: (7 + 4) / 2
    assert_eq!(out["data"], json!([[7.4, 9.4, 5.5], [11.2, 12.8, 5.5]]));
}

#[test_log::test(tokio::test)]
async fn test_event_archives_body_and_table() {
    let store = store_with_model().await;
    let handler = handler_for(store.clone(), CachePolicy::PerInvocation).await;
    let event = event_for(&table_dict());
    handler.handle(event.clone()).await.unwrap();

    let archived = fetch_object(store.as_ref(), DEFAULT_EVENT_BODY_KEY).await.unwrap();
    let raw_body: String = serde_json::from_slice(&archived).unwrap();
    assert_eq!(raw_body, event["body"].as_str().unwrap());

    let csv = fetch_object(store.as_ref(), DEFAULT_INPUT_TABLE_KEY).await.unwrap();
    assert_eq!(
        std::str::from_utf8(&csv).unwrap(),
        "fixed acidity,alcohol\n7.4,9.4\n11.2,12.8\n"
    );
}

#[test_log::test(tokio::test)]
async fn test_missing_model_prevents_prediction() {
    let store: Arc<dyn ObjectStore> = Arc::new(InMemory::new());
    let handler = handler_for(store.clone(), CachePolicy::PerInvocation).await;
    let err = handler.handle(event_for(&table_dict())).await.unwrap_err();
    assert!(matches!(err, PredictError::StorageError { .. }));

    // nothing was archived either
    assert!(fetch_object(store.as_ref(), DEFAULT_EVENT_BODY_KEY).await.is_err());
}

#[test_log::test(tokio::test)]
async fn test_corrupt_model_prevents_prediction() {
    let store: Arc<dyn ObjectStore> = Arc::new(InMemory::new());
    put_object(store.as_ref(), DEFAULT_MODEL_KEY, b"\x80\x04pickle".to_vec())
        .await
        .unwrap();
    let handler = handler_for(store, CachePolicy::Process).await;
    let err = handler.handle(event_for(&table_dict())).await.unwrap_err();
    assert!(matches!(err, PredictError::ModelDecodeError { .. }));
}

#[test_log::test(tokio::test)]
async fn test_singly_encoded_body_is_rejected_after_archiving() {
    let store = store_with_model().await;
    let handler = handler_for(store.clone(), CachePolicy::PerInvocation).await;
    let event = json!({ "body": serde_json::to_string(&table_dict()).unwrap() });
    let err = handler.handle(event).await.unwrap_err();
    assert!(matches!(err, PredictError::PayloadError { .. }));

    assert!(fetch_object(store.as_ref(), DEFAULT_EVENT_BODY_KEY).await.is_ok());
    assert!(fetch_object(store.as_ref(), DEFAULT_INPUT_TABLE_KEY).await.is_err());
}

#[test_log::test(tokio::test)]
async fn test_text_column_is_archived_before_prediction_fails() {
    let store = store_with_model().await;
    let handler = handler_for(store.clone(), CachePolicy::PerInvocation).await;
    let table = json!({
        "columns": ["fixed acidity", "colour"],
        "index": [0, 1],
        "data": [[7.4, "red"], [11.2, "white"]]
    });

    let err = handler.handle(event_for(&table)).await.unwrap_err();
    assert!(matches!(err, PredictError::NonNumericCell { .. }));

    let csv = fetch_object(store.as_ref(), DEFAULT_INPUT_TABLE_KEY)
        .await
        .unwrap();
    assert_eq!(
        std::str::from_utf8(&csv).unwrap(),
        "fixed acidity,colour\n7.4,red\n11.2,white\n"
    );
}

#[test_log::test(tokio::test)]
async fn test_event_without_body() {
    let handler = handler_for(store_with_model().await, CachePolicy::PerInvocation).await;
    assert!(handler.handle(json!({"headers": {}})).await.is_err());
    assert!(handler.handle(json!({"body": 42})).await.is_err());
}

#[test_log::test(tokio::test)]
async fn test_cached_handler_keeps_serving_after_model_removed() {
    let store = store_with_model().await;
    let handler = handler_for(store.clone(), CachePolicy::Process).await;
    handler.handle(event_for(&table_dict())).await.unwrap();

    store
        .delete(&object_store::path::Path::from(DEFAULT_MODEL_KEY))
        .await
        .unwrap();
    assert!(handler.handle(event_for(&table_dict())).await.is_ok());

    let uncached = handler_for(store, CachePolicy::PerInvocation).await;
    assert!(uncached.handle(event_for(&table_dict())).await.is_err());
}

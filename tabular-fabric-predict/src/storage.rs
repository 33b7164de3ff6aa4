use crate::config::StorageConfig;
use crate::errors::PredictError;
use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path;
use object_store::{ObjectStore, PutPayload, RetryConfig};
use std::sync::Arc;
use tracing::{debug, info};

/// Builds the S3 store for the configured bucket.
///
/// Static credentials are used only when both halves are configured; otherwise
/// the regular AWS environment and credential chain applies. Requests are made
/// once, without client-side retries.
pub fn build_object_store(config: &StorageConfig) -> Result<Arc<dyn ObjectStore>, PredictError> {
    let mut builder = AmazonS3Builder::from_env()
        .with_bucket_name(&config.bucket)
        .with_retry(RetryConfig {
            max_retries: 0,
            ..Default::default()
        });
    if let (Some(access_key_id), Some(secret_access_key)) =
        (&config.access_key_id, &config.secret_access_key)
    {
        builder = builder
            .with_access_key_id(access_key_id)
            .with_secret_access_key(secret_access_key);
    }
    if let Some(region) = &config.region {
        builder = builder.with_region(region);
    }
    if let Some(endpoint) = &config.endpoint {
        builder = builder.with_endpoint(endpoint).with_allow_http(true);
    }
    let store = builder.build()?;
    info!(bucket = %config.bucket, "object store ready");
    Ok(Arc::new(store))
}

pub async fn fetch_object(store: &dyn ObjectStore, key: &str) -> Result<Bytes, PredictError> {
    let location = Path::from(key);
    let bytes = store.get(&location).await?.bytes().await?;
    debug!(key = key, size = bytes.len(), "fetched object");
    Ok(bytes)
}

/// Overwrites whatever is stored under `key`.
pub async fn put_object(
    store: &dyn ObjectStore,
    key: &str,
    payload: impl Into<PutPayload>,
) -> Result<(), PredictError> {
    let location = Path::from(key);
    store.put(&location, payload.into()).await?;
    debug!(key = key, "stored object");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;

    #[tokio::test]
    async fn test_put_then_fetch_overwrites() {
        let store = InMemory::new();
        put_object(&store, "neptune/a.txt", "first".to_string())
            .await
            .unwrap();
        put_object(&store, "neptune/a.txt", "second".to_string())
            .await
            .unwrap();
        let bytes = fetch_object(&store, "neptune/a.txt").await.unwrap();
        assert_eq!(bytes.as_ref(), b"second");
    }

    #[tokio::test]
    async fn test_missing_object() {
        let store = InMemory::new();
        let err = fetch_object(&store, "neptune/missing.pkl").await.unwrap_err();
        assert!(matches!(
            err,
            PredictError::StorageError {
                source: object_store::Error::NotFound { .. }
            }
        ));
    }

    #[test]
    fn test_build_with_static_credentials() {
        let config = StorageConfig {
            bucket: "bucket".to_string(),
            model_key: "m".to_string(),
            event_body_key: "e".to_string(),
            input_table_key: "i".to_string(),
            region: Some("us-west-2".to_string()),
            endpoint: Some("http://localhost:9000".to_string()),
            access_key_id: Some("AKIA".to_string()),
            secret_access_key: Some("secret".to_string()),
        };
        assert!(build_object_store(&config).is_ok());
    }
}

use anyhow::Context;
use dotenvy::dotenv;
use envconfig::Envconfig;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::Value;
use std::sync::Arc;
use tabular_fabric_predict::archive::InputArchive;
use tabular_fabric_predict::config::LambdaConfig;
use tabular_fabric_predict::handlers::event::EventHandler;
use tabular_fabric_predict::loader::{ModelLoader, ModelProvider};
use tabular_fabric_predict::storage::build_object_store;
use tabular_fabric_predict::trace::init_tracing;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv().ok();
    let config = LambdaConfig::init_from_env().context("failed to load config from env")?;
    init_tracing("tabular-predict-lambda", &config.log);
    let store = build_object_store(&config.storage)?;
    let loader = ModelLoader::new(store.clone(), &config.storage.model_key);
    info!(
        bucket = %config.storage.bucket,
        model_key = %loader.key(),
        "starting predict function"
    );
    let provider = ModelProvider::new(loader, config.model_cache);
    info!(cache = ?provider.policy(), "model provider ready");

    let archive = InputArchive::new(
        store,
        &config.storage.event_body_key,
        &config.storage.input_table_key,
    );
    let handler = Arc::new(EventHandler::new(provider, archive));

    run(service_fn(|event: LambdaEvent<Value>| {
        let handler = handler.clone();
        async move {
            let response = handler.handle(event.payload).await?;
            Ok::<Value, Error>(response)
        }
    }))
    .await
}

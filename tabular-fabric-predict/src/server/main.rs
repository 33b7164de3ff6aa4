use anyhow::Context;
use dotenvy::dotenv;
use envconfig::Envconfig;
use tabular_fabric_predict::config::ServeConfig;
use tabular_fabric_predict::handlers::http::{build_app, PredictState};
use tabular_fabric_predict::loader::ModelLoader;
use tabular_fabric_predict::storage::build_object_store;
use tabular_fabric_predict::trace::init_tracing;
use tracing::info;

#[async_std::main]
async fn main() -> anyhow::Result<()> {
    let env_file = dotenv().ok();

    let config = ServeConfig::init_from_env().context("failed to load config from env")?;
    init_tracing("tabular-predict-server", &config.log);
    match env_file {
        Some(path) => info!("config loaded from env file: {}", path.display()),
        None => info!("config loaded from env"),
    }
    info!(
        bucket = %config.storage.bucket,
        model_key = %config.storage.model_key,
        listen = %config.listen_addr(),
        "starting predict server"
    );

    // The server never binds unless the model loaded.
    let store = build_object_store(&config.storage)?;
    let predictor = ModelLoader::new(store, &config.storage.model_key)
        .load()
        .await
        .context("failed to load model at startup")?;

    let app = build_app(PredictState { predictor });
    app.listen(config.listen_addr()).await?;
    Ok(())
}

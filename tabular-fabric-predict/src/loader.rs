use crate::base::Predictor;
use crate::errors::PredictError;
use crate::models::decode_artifact;
use crate::storage::fetch_object;
use object_store::ObjectStore;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OnceCell;
use tracing::{error, info};

/// Fetches the model artifact from storage and decodes it.
#[derive(Clone)]
pub struct ModelLoader {
    store: Arc<dyn ObjectStore>,
    key: String,
}

impl ModelLoader {
    pub fn new(store: Arc<dyn ObjectStore>, key: &str) -> Self {
        ModelLoader {
            store,
            key: key.to_string(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub async fn load(&self) -> Result<Arc<dyn Predictor>, PredictError> {
        let timer = Instant::now();
        let result = match fetch_object(self.store.as_ref(), &self.key).await {
            Ok(bytes) => decode_artifact(&bytes),
            Err(e) => Err(e),
        };
        match result {
            Ok(predictor) => {
                info!(
                    key = %self.key,
                    model = predictor.name(),
                    features = predictor.num_features(),
                    elapsed_ms = timer.elapsed().as_millis() as u64,
                    "model loaded"
                );
                Ok(predictor)
            }
            Err(e) => {
                error!(key = %self.key, error = %e, "failed to load model");
                Err(e)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// Reload the artifact on every request, picking up replaced models.
    #[default]
    PerInvocation,
    /// Keep the first successfully loaded model for the process lifetime.
    Process,
}

impl FromStr for CachePolicy {
    type Err = PredictError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "per-invocation" | "per_invocation" | "none" => Ok(CachePolicy::PerInvocation),
            "process" => Ok(CachePolicy::Process),
            _ => Err(PredictError::GenericError {
                msg: format!("unknown model cache policy: {}", s),
            }),
        }
    }
}

pub struct ModelProvider {
    loader: ModelLoader,
    policy: CachePolicy,
    cached: OnceCell<Arc<dyn Predictor>>,
}

impl ModelProvider {
    pub fn new(loader: ModelLoader, policy: CachePolicy) -> Self {
        ModelProvider {
            loader,
            policy,
            cached: OnceCell::new(),
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    pub async fn get(&self) -> Result<Arc<dyn Predictor>, PredictError> {
        match self.policy {
            CachePolicy::PerInvocation => self.loader.load().await,
            CachePolicy::Process => self
                .cached
                .get_or_try_init(|| self.loader.load())
                .await
                .cloned(),
        }
    }
}

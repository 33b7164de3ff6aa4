//! Serialized model artifacts.
//!
//! An artifact is a JSON document tagged by `kind`:
//!
//! ```text
//! {"kind": "linear", "coefficients": [0.1, ...], "intercept": 3.2}
//! {"kind": "forest", "num_features": 11, "trees": [{"nodes": [...]}]}
//! ```

pub mod forest;
pub mod linear;

use crate::base::Predictor;
use crate::errors::PredictError;
use serde::Deserialize;
use std::sync::Arc;

use forest::RegressionForest;
use linear::LinearRegressor;

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum ModelArtifact {
    Linear(LinearRegressor),
    Forest(RegressionForest),
}

pub fn decode_artifact(bytes: &[u8]) -> Result<Arc<dyn Predictor>, PredictError> {
    let artifact: ModelArtifact =
        serde_json::from_slice(bytes).map_err(|e| PredictError::ModelDecodeError {
            msg: e.to_string(),
        })?;
    let predictor: Arc<dyn Predictor> = match artifact {
        ModelArtifact::Linear(model) => {
            model.validate()?;
            Arc::new(model)
        }
        ModelArtifact::Forest(model) => {
            model.validate()?;
            Arc::new(model)
        }
    };
    Ok(predictor)
}

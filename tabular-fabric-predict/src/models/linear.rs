use crate::base::Predictor;
use crate::errors::PredictError;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct LinearRegressor {
    #[serde(default = "default_linear_name")]
    name: String,
    coefficients: Vec<f64>,
    #[serde(default)]
    intercept: f64,
}

fn default_linear_name() -> String {
    "linear".to_string()
}

impl LinearRegressor {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Result<Self, PredictError> {
        let model = LinearRegressor {
            name: default_linear_name(),
            coefficients,
            intercept,
        };
        model.validate()?;
        Ok(model)
    }

    pub(crate) fn validate(&self) -> Result<(), PredictError> {
        if self.coefficients.is_empty() {
            return Err(PredictError::ModelDecodeError {
                msg: "linear model has no coefficients".to_string(),
            });
        }
        Ok(())
    }
}

impl Predictor for LinearRegressor {
    fn name(&self) -> &str {
        &self.name
    }

    fn num_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<f64>, PredictError> {
        features
            .iter()
            .map(|row| {
                if row.len() != self.coefficients.len() {
                    return Err(PredictError::FeatureCountMismatch {
                        expected: self.coefficients.len(),
                        actual: row.len(),
                    });
                }
                Ok(self.intercept
                    + row
                        .iter()
                        .zip(self.coefficients.iter())
                        .map(|(x, w)| x * w)
                        .sum::<f64>())
            })
            .collect()
    }
}

use crate::errors::PredictError;
use crate::table::Table;
use serde_json::Value;
use tracing::debug;

pub const PRED_COLUMN_NAME: &str = "_pred";

/// A loaded regression model. Implementations are immutable after loading and
/// are shared across requests without locking.
pub trait Predictor: Send + Sync {
    fn name(&self) -> &str;

    fn num_features(&self) -> usize;

    fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<f64>, PredictError>;
}

/// Runs `predictor` over every column of `table` and returns the table with
/// the predictions appended as `_pred`, in row order.
pub fn predict_table(table: &Table, predictor: &dyn Predictor) -> Result<Table, PredictError> {
    if table.num_columns() != predictor.num_features() {
        return Err(PredictError::FeatureCountMismatch {
            expected: predictor.num_features(),
            actual: table.num_columns(),
        });
    }
    let features = table.feature_matrix()?;
    let predictions = predictor.predict(&features)?;
    if predictions.len() != table.num_rows() {
        return Err(PredictError::PredictionLengthMismatch {
            rows: table.num_rows(),
            predictions: predictions.len(),
        });
    }
    debug!(
        model = predictor.name(),
        rows = table.num_rows(),
        "predicted table"
    );
    let values = predictions.into_iter().map(prediction_value).collect();
    table.clone().with_column(PRED_COLUMN_NAME, values)
}

fn prediction_value(prediction: f64) -> Value {
    serde_json::Number::from_f64(prediction)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

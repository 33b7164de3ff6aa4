use arrow::error::ArrowError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PredictError {
    #[error("generic error: {msg}")]
    GenericError { msg: String },

    #[error("payload error: {msg}")]
    PayloadError { msg: String },

    #[error("table shape error: {msg}")]
    ShapeError { msg: String },

    #[error("non-numeric value in column {column} at row {row}: {value}")]
    NonNumericCell {
        column: String,
        row: usize,
        value: String,
    },

    #[error("feature count mismatch: model expects {expected}, table has {actual}")]
    FeatureCountMismatch { expected: usize, actual: usize },

    #[error("prediction length mismatch: {rows} rows, {predictions} predictions")]
    PredictionLengthMismatch { rows: usize, predictions: usize },

    #[error("model decode error: {msg}")]
    ModelDecodeError { msg: String },

    #[error("storage error: {source}")]
    StorageError { source: object_store::Error },

    #[error("json error: {source}")]
    JsonError { source: serde_json::Error },

    #[error("arrow error: {source}")]
    ArrowError { source: ArrowError },

    #[error("unspecified predict error: {msg}, {source}")]
    UnspecifiedError { msg: String, source: anyhow::Error },
}

impl PredictError {
    /// Errors caused by the caller's payload rather than by the model or storage.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PredictError::PayloadError { .. }
                | PredictError::ShapeError { .. }
                | PredictError::NonNumericCell { .. }
                | PredictError::JsonError { .. }
        )
    }
}

impl From<String> for PredictError {
    fn from(msg: String) -> Self {
        PredictError::GenericError { msg }
    }
}

impl From<anyhow::Error> for PredictError {
    fn from(err: anyhow::Error) -> Self {
        PredictError::UnspecifiedError {
            msg: err.to_string(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for PredictError {
    fn from(err: serde_json::Error) -> Self {
        PredictError::JsonError { source: err }
    }
}

impl From<object_store::Error> for PredictError {
    fn from(err: object_store::Error) -> Self {
        PredictError::StorageError { source: err }
    }
}

impl From<ArrowError> for PredictError {
    fn from(err: ArrowError) -> Self {
        PredictError::ArrowError { source: err }
    }
}

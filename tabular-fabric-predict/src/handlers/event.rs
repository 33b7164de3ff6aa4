use crate::archive::InputArchive;
use crate::base::predict_table;
use crate::codec::{decode_event_body, encode_event_body};
use crate::errors::PredictError;
use crate::loader::ModelProvider;
use serde_json::{json, Value};
use tracing::info;

/// Event-triggered prediction: archive the input, predict, answer with a
/// `{"statusCode", "body"}` envelope. Any failure aborts the invocation.
pub struct EventHandler {
    provider: ModelProvider,
    archive: InputArchive,
}

impl EventHandler {
    pub fn new(provider: ModelProvider, archive: InputArchive) -> Self {
        EventHandler { provider, archive }
    }

    pub async fn handle(&self, event: Value) -> Result<Value, PredictError> {
        let predictor = self.provider.get().await?;

        let raw_body = match event.get("body") {
            Some(Value::String(body)) => body.as_str(),
            Some(_) => {
                return Err(PredictError::PayloadError {
                    msg: "event body is not a string".to_string(),
                })
            }
            None => {
                return Err(PredictError::PayloadError {
                    msg: "event has no body".to_string(),
                })
            }
        };

        self.archive.archive_event_body(raw_body).await?;
        let table = decode_event_body(raw_body)?;
        self.archive.archive_input_table(&table).await?;

        let result = predict_table(&table, predictor.as_ref())?;
        info!(
            model = predictor.name(),
            rows = result.num_rows(),
            "event prediction done"
        );

        Ok(json!({
            "statusCode": 200,
            "body": encode_event_body(&result)?,
        }))
    }
}

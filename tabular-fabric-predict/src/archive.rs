//! Audit copies of what the event handler received.
//!
//! Both writes go to fixed keys and overwrite the previous copy.

use crate::errors::PredictError;
use crate::storage::put_object;
use crate::table::Table;
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::csv::WriterBuilder;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use object_store::ObjectStore;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

pub struct InputArchive {
    store: Arc<dyn ObjectStore>,
    event_body_key: String,
    input_table_key: String,
}

impl InputArchive {
    pub fn new(store: Arc<dyn ObjectStore>, event_body_key: &str, input_table_key: &str) -> Self {
        InputArchive {
            store,
            event_body_key: event_body_key.to_string(),
            input_table_key: input_table_key.to_string(),
        }
    }

    /// Stores the raw event body, serialized as a JSON string.
    pub async fn archive_event_body(&self, raw_body: &str) -> Result<(), PredictError> {
        let serialized = serde_json::to_vec(raw_body)?;
        put_object(self.store.as_ref(), &self.event_body_key, serialized).await?;
        info!(key = %self.event_body_key, "archived event body");
        Ok(())
    }

    /// Stores the decoded table as CSV with a header row and no index column.
    pub async fn archive_input_table(&self, table: &Table) -> Result<(), PredictError> {
        let csv = table_to_csv(table)?;
        put_object(self.store.as_ref(), &self.input_table_key, csv).await?;
        info!(
            key = %self.input_table_key,
            rows = table.num_rows(),
            "archived input table"
        );
        Ok(())
    }
}

pub fn table_to_csv(table: &Table) -> Result<Vec<u8>, PredictError> {
    if table.num_columns() == 0 {
        return Ok(Vec::new());
    }
    let batch = table_to_record_batch(table)?;
    let mut buf = Vec::new();
    {
        let mut writer = WriterBuilder::new().with_header(true).build(&mut buf);
        writer.write(&batch)?;
    }
    Ok(buf)
}

/// Column types follow the cells: all integers is `Int64`, numbers with nulls
/// is `Float64`, anything else is written as text. Nothing is rejected here;
/// only prediction requires numeric input.
fn table_to_record_batch(table: &Table) -> Result<RecordBatch, PredictError> {
    let mut fields = Vec::with_capacity(table.num_columns());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(table.num_columns());

    for (pos, name) in table.columns().iter().enumerate() {
        let cells: Vec<&Value> = table.rows().iter().map(|row| &row[pos]).collect();
        if cells.iter().all(|c| c.is_i64()) {
            let values: Int64Array = cells.iter().map(|c| c.as_i64()).collect();
            fields.push(Field::new(name, DataType::Int64, true));
            arrays.push(Arc::new(values));
        } else if cells.iter().all(|c| c.is_number() || c.is_null()) {
            let values: Float64Array = cells.iter().map(|c| c.as_f64()).collect();
            fields.push(Field::new(name, DataType::Float64, true));
            arrays.push(Arc::new(values));
        } else {
            let values: StringArray = cells.iter().map(|c| cell_text(c)).collect();
            fields.push(Field::new(name, DataType::Utf8, true));
            arrays.push(Arc::new(values));
        }
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
}

/// Booleans are spelled `True`/`False`, nulls stay empty.
fn cell_text(cell: &Value) -> Option<String> {
    match cell {
        Value::Null => None,
        Value::Bool(true) => Some("True".to_string()),
        Value::Bool(false) => Some("False".to_string()),
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

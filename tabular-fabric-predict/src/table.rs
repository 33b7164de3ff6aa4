//! Row-oriented tables in the column/index/data "split" layout.
//!
//! ```text
//! {"columns": ["a", "b"], "index": [0, 1], "data": [[1, 2], [3, 4]]}
//! ```
//!
//! Cells are held as JSON values so a table decoded from the wire encodes back
//! to the same values; numeric conversion only happens when a feature matrix
//! is requested.

use crate::errors::PredictError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct SplitTable {
    columns: Vec<String>,
    index: Vec<Value>,
    data: Vec<Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SplitTable")]
pub struct Table {
    columns: Vec<String>,
    index: Vec<Value>,
    data: Vec<Vec<Value>>,
}

impl TryFrom<SplitTable> for Table {
    type Error = PredictError;

    fn try_from(split: SplitTable) -> Result<Self, Self::Error> {
        Table::new(split.columns, split.index, split.data)
    }
}

impl Table {
    pub fn new(
        columns: Vec<String>,
        index: Vec<Value>,
        data: Vec<Vec<Value>>,
    ) -> Result<Self, PredictError> {
        if data.len() != index.len() {
            return Err(PredictError::ShapeError {
                msg: format!(
                    "{} data rows but {} index labels",
                    data.len(),
                    index.len()
                ),
            });
        }
        if let Some((row, cells)) = data
            .iter()
            .enumerate()
            .find(|(_, cells)| cells.len() != columns.len())
        {
            return Err(PredictError::ShapeError {
                msg: format!(
                    "row {} has {} values but there are {} columns",
                    row,
                    cells.len(),
                    columns.len()
                ),
            });
        }
        Ok(Table {
            columns,
            index,
            data,
        })
    }

    pub fn from_split_json(json: &str) -> Result<Self, PredictError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_split_value(value: Value) -> Result<Self, PredictError> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_split_json(&self) -> Result<String, PredictError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn index(&self) -> &[Value] {
        &self.index
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.data
    }

    pub fn num_rows(&self) -> usize {
        self.index.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column_values(&self, column_name: &str) -> Option<Vec<&Value>> {
        let pos = self.columns.iter().position(|c| c == column_name)?;
        Some(self.data.iter().map(|row| &row[pos]).collect())
    }

    /// Every column is treated as a feature, in column order.
    pub fn feature_matrix(&self) -> Result<Vec<Vec<f64>>, PredictError> {
        self.data
            .iter()
            .enumerate()
            .map(|(row, cells)| {
                cells
                    .iter()
                    .zip(self.columns.iter())
                    .map(|(cell, column)| {
                        numeric_cell(cell).ok_or_else(|| PredictError::NonNumericCell {
                            column: column.clone(),
                            row,
                            value: cell.to_string(),
                        })
                    })
                    .collect()
            })
            .collect()
    }

    /// Appends `name` as the last column, or overwrites it in place when the
    /// table already has a column with that name.
    pub fn with_column(mut self, name: &str, values: Vec<Value>) -> Result<Self, PredictError> {
        if values.len() != self.num_rows() {
            return Err(PredictError::ShapeError {
                msg: format!(
                    "column {} has {} values but the table has {} rows",
                    name,
                    values.len(),
                    self.num_rows()
                ),
            });
        }
        match self.columns.iter().position(|c| c == name) {
            Some(pos) => {
                for (row, value) in self.data.iter_mut().zip(values) {
                    row[pos] = value;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, value) in self.data.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(self)
    }
}

/// Nulls read as NaN and booleans as 0/1, the way a numeric frame would.
fn numeric_cell(cell: &Value) -> Option<f64> {
    match cell {
        Value::Number(n) => n.as_f64(),
        Value::Null => Some(f64::NAN),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

//! Serves a pre-trained tabular regression model loaded from object storage.
//!
//! Two entry points share this library: an HTTP server (`predict-server`) and
//! an event-triggered function (`predict-lambda`).

pub mod archive;
pub mod base;
pub mod codec;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod loader;
pub mod models;
pub mod storage;
pub mod table;
pub mod trace;

pub use base::{predict_table, Predictor, PRED_COLUMN_NAME};
pub use errors::PredictError;
pub use table::Table;

//! Environment-driven configuration.
//!
//! Every option has a default equal to the value the service has always used,
//! so an empty environment keeps the historical storage layout and bind
//! address.

use crate::loader::CachePolicy;
use envconfig::Envconfig;

pub const DEFAULT_BUCKET: &str = "gwilson253awsprojects";
pub const DEFAULT_MODEL_KEY: &str = "neptune/wine_model.pkl";
pub const DEFAULT_EVENT_BODY_KEY: &str = "neptune/event_body.pkl";
pub const DEFAULT_INPUT_TABLE_KEY: &str = "neptune/input_df.csv";

#[derive(Debug, Envconfig, Clone)]
pub struct StorageConfig {
    #[envconfig(from = "TABULAR_PREDICT_BUCKET", default = "gwilson253awsprojects")]
    pub bucket: String,

    #[envconfig(from = "TABULAR_PREDICT_MODEL_KEY", default = "neptune/wine_model.pkl")]
    pub model_key: String,

    #[envconfig(
        from = "TABULAR_PREDICT_EVENT_BODY_KEY",
        default = "neptune/event_body.pkl"
    )]
    pub event_body_key: String,

    #[envconfig(
        from = "TABULAR_PREDICT_INPUT_TABLE_KEY",
        default = "neptune/input_df.csv"
    )]
    pub input_table_key: String,

    #[envconfig(from = "AWS_REGION")]
    pub region: Option<String>,

    /// Custom S3-compatible endpoint, e.g. a local MinIO.
    #[envconfig(from = "TABULAR_PREDICT_STORAGE_ENDPOINT")]
    pub endpoint: Option<String>,

    #[envconfig(from = "AWS_ADMIN_ACCESS")]
    pub access_key_id: Option<String>,

    #[envconfig(from = "AWS_ADMIN_SECRET")]
    pub secret_access_key: Option<String>,
}

#[derive(Debug, Envconfig, Clone)]
pub struct LogConfig {
    #[envconfig(from = "TABULAR_LOG_FORMAT", default = "text")]
    pub log_format: String,

    #[envconfig(from = "TABULAR_LOG_LEVEL", default = "INFO")]
    pub log_level: String,

    #[envconfig(from = "TABULAR_PREDICT_TIMEZONE", default = "UTC")]
    pub timezone: String,
}

#[derive(Debug, Envconfig, Clone)]
pub struct ServeConfig {
    #[envconfig(from = "TABULAR_PREDICT_SERVER_HOST", default = "0.0.0.0")]
    pub serve_host: String,

    #[envconfig(from = "TABULAR_PREDICT_SERVER_PORT", default = "5000")]
    pub serve_port: u16,

    #[envconfig(nested = true)]
    pub log: LogConfig,

    #[envconfig(nested = true)]
    pub storage: StorageConfig,
}

impl ServeConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.serve_host, self.serve_port)
    }
}

#[derive(Debug, Envconfig, Clone)]
pub struct LambdaConfig {
    #[envconfig(from = "TABULAR_PREDICT_MODEL_CACHE", default = "per-invocation")]
    pub model_cache: CachePolicy,

    #[envconfig(nested = true)]
    pub log: LogConfig,

    #[envconfig(nested = true)]
    pub storage: StorageConfig,
}

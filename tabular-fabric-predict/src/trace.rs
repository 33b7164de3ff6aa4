use std::collections::BTreeMap;

use chrono::Utc;
use chrono_tz::Tz;
use itertools::Itertools;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use crate::config::LogConfig;

/// Writes one line per event to stdout, as text or as a flat JSON object.
pub struct ServeLayer {
    pub app: String,
    pub log_type: String,
    pub log_format: String,
    pub tz: Tz,
    pub level: LevelFilter,
}

impl ServeLayer {
    pub fn new(app: &str, config: &LogConfig) -> Self {
        ServeLayer {
            app: app.to_string(),
            log_type: "general".to_string(),
            log_format: config.log_format.to_lowercase(),
            tz: config.timezone.parse().unwrap_or(chrono_tz::UTC),
            level: parse_level(&config.log_level).unwrap_or(LevelFilter::INFO),
        }
    }

    fn render(
        &self,
        level: &str,
        caller: &str,
        mut fields: BTreeMap<String, serde_json::Value>,
    ) -> Option<String> {
        let ts = Utc::now()
            .with_timezone(&self.tz)
            .format("%Y-%m-%dT%H:%M:%S")
            .to_string();
        let msg = match fields.remove("message") {
            Some(serde_json::Value::String(msg)) => msg,
            Some(other) => other.to_string(),
            None => "".to_string(),
        };

        match self.log_format.as_str() {
            "json" => {
                let output = serde_json::json!({
                    "_TS_": ts,
                    "_MSM_": msg,
                    "_LEVEL_": level,
                    "_CALLER_": caller,
                    "_FIELDS_": fields,
                    "_APP_": self.app,
                    "_TYPE_": self.log_type,
                });
                Some(output.to_string())
            }
            "text" => {
                let extra = fields
                    .iter()
                    .map(|(name, value)| format!(" {}={}", name, value))
                    .join("");
                Some(format!("{} [{}] {}{} -- {}", ts, level, msg, extra, caller))
            }
            _ => None,
        }
    }
}

pub fn parse_level(level: &str) -> Option<LevelFilter> {
    match level.to_lowercase().as_str() {
        "trace" => Some(LevelFilter::TRACE),
        "debug" => Some(LevelFilter::DEBUG),
        "info" => Some(LevelFilter::INFO),
        "warn" => Some(LevelFilter::WARN),
        "error" => Some(LevelFilter::ERROR),
        _ => None,
    }
}

impl<S> Layer<S> for ServeLayer
where
    S: tracing::Subscriber,
{
    fn max_level_hint(&self) -> Option<LevelFilter> {
        Some(self.level)
    }

    fn enabled(
        &self,
        metadata: &tracing::Metadata<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) -> bool {
        *metadata.level() <= self.level
    }

    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut fields = BTreeMap::new();
        let mut visitor = JsonVisitor(&mut fields);
        event.record(&mut visitor);

        let metadata = event.metadata();
        if let Some(line) = self.render(metadata.level().as_str(), metadata.target(), fields) {
            println!("{}", line);
        }
    }
}

/// Installs [`ServeLayer`] as the global subscriber. `log` records (e.g. from
/// tide's request logger) are forwarded into it.
pub fn init_tracing(app: &str, config: &LogConfig) {
    tracing_subscriber::registry()
        .with(ServeLayer::new(app, config))
        .init();
}

struct JsonVisitor<'a>(&'a mut BTreeMap<String, serde_json::Value>);

impl<'a> tracing::field::Visit for JsonVisitor<'a> {
    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_error(
        &mut self,
        field: &tracing::field::Field,
        value: &(dyn std::error::Error + 'static),
    ) {
        self.0.insert(
            field.name().to_string(),
            serde_json::json!(value.to_string()),
        );
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.insert(
            field.name().to_string(),
            serde_json::json!(format!("{:?}", value)),
        );
    }
}

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::Utc;
use chrono_tz::Tz;
use tracing::level_filters::LevelFilter;
use tracing::Metadata;
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Text,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "text" => Ok(LogFormat::Text),
            other => Err(format!("unknown log format: {}", other)),
        }
    }
}

/// Unknown names map to `INFO`.
pub fn parse_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        "off" => LevelFilter::OFF,
        _ => LevelFilter::INFO,
    }
}

type Sink = Box<dyn Fn(&str) + Send + Sync>;

/// Renders every event as one line, text or JSON, stamped in a fixed zone.
pub struct LogLayer {
    app: String,
    log_type: String,
    format: LogFormat,
    tz: Tz,
    level: LevelFilter,
    sink: Sink,
}

impl LogLayer {
    /// An unparseable `timezone` falls back to UTC.
    pub fn new(app: &str, format: LogFormat, level: LevelFilter, timezone: &str) -> Self {
        LogLayer {
            app: app.to_string(),
            log_type: "general".to_string(),
            format,
            tz: timezone.parse().unwrap_or(Tz::UTC),
            level,
            sink: Box::new(|line| println!("{}", line)),
        }
    }

    pub fn with_sink(mut self, sink: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    fn render(
        &self,
        ts: &str,
        level: &str,
        target: &str,
        mut fields: BTreeMap<String, serde_json::Value>,
    ) -> String {
        let msg = match fields.remove("message") {
            Some(serde_json::Value::String(msg)) => msg,
            Some(other) => other.to_string(),
            None => "".to_string(),
        };

        match self.format {
            LogFormat::Json => serde_json::json!({
                "_TS_": ts,
                "_MSG_": msg,
                "_LEVEL_": level,
                "_TARGET_": target,
                "_FIELDS_": fields,
                "_APP_": self.app,
                "_TYPE_": self.log_type,
            })
            .to_string(),
            LogFormat::Text if fields.is_empty() => {
                format!("{} [{}] {} -- {}", ts, level, msg, target)
            }
            LogFormat::Text => {
                let fields = fields
                    .iter()
                    .map(|(k, v)| match v {
                        serde_json::Value::String(s) => format!("{}={}", k, s),
                        other => format!("{}={}", k, other),
                    })
                    .collect::<Vec<_>>()
                    .join(" ");
                format!("{} [{}] {} {} -- {}", ts, level, msg, fields, target)
            }
        }
    }
}

impl<S> Layer<S> for LogLayer
where
    S: tracing::Subscriber,
{
    fn enabled(&self, metadata: &Metadata<'_>, _ctx: Context<'_, S>) -> bool {
        *metadata.level() <= self.level
    }

    fn max_level_hint(&self) -> Option<LevelFilter> {
        Some(self.level)
    }

    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if *meta.level() > self.level {
            return;
        }

        let mut fields = BTreeMap::new();
        let mut visitor = JsonVisitor(&mut fields);
        event.record(&mut visitor);

        let ts = Utc::now()
            .with_timezone(&self.tz)
            .format("%Y-%m-%dT%H:%M:%S")
            .to_string();
        let line = self.render(&ts, meta.level().as_str(), meta.target(), fields);
        (self.sink)(&line);
    }
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

    // `message` arrives as fmt::Arguments, whose Debug output is unquoted.
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.insert(
            field.name().to_string(),
            serde_json::json!(format!("{:?}", value)),
        );
    }
}

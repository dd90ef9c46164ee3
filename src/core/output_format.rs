//! Output format configuration for log entries
//!
//! - Text: `[timestamp] [LEVEL] message key=value ...`
//! - Json: one JSON object per line, structured fields flattened in
//! - Logfmt: `key=value` pairs

use super::log_context::FieldValue;
use super::log_entry::LogEntry;
use super::timestamp::TimestampFormat;

/// Output format for log entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Logfmt,
}

impl OutputFormat {
    /// Format a log entry according to this output format
    pub fn format(&self, entry: &LogEntry, timestamp_format: &TimestampFormat) -> String {
        match self {
            OutputFormat::Text => format_text(entry, timestamp_format),
            OutputFormat::Json => format_json(entry, timestamp_format),
            OutputFormat::Logfmt => format_logfmt(entry, timestamp_format),
        }
    }
}

fn format_text(entry: &LogEntry, timestamp_format: &TimestampFormat) -> String {
    let mut output = format!(
        "[{}] [{:5}] {}",
        timestamp_format.format(&entry.timestamp),
        entry.level.to_str(),
        entry.message
    );

    if let Some(ref context) = entry.context {
        if !context.is_empty() {
            output.push(' ');
            output.push_str(&context.format_fields());
        }
    }

    output
}

/// Keys every JSON record carries itself
const RECORD_KEYS: [&str; 4] = ["timestamp", "level", "message", "thread"];

fn format_json(entry: &LogEntry, timestamp_format: &TimestampFormat) -> String {
    let mut json_obj = serde_json::Map::new();

    let timestamp = if timestamp_format.is_numeric() {
        serde_json::Value::Number(entry.timestamp.timestamp_millis().into())
    } else {
        serde_json::Value::String(timestamp_format.format(&entry.timestamp))
    };
    json_obj.insert("timestamp".to_string(), timestamp);
    json_obj.insert(
        "level".to_string(),
        serde_json::Value::String(entry.level.to_str().to_string()),
    );
    json_obj.insert(
        "message".to_string(),
        serde_json::Value::String(entry.message.clone()),
    );
    json_obj.insert(
        "thread".to_string(),
        serde_json::Value::String(
            entry
                .thread_name
                .clone()
                .unwrap_or_else(|| entry.thread_id.clone()),
        ),
    );

    // Fields that collide with the record's own keys move under `fields.`
    if let Some(ref context) = entry.context {
        for (key, value) in context.fields() {
            let key = if RECORD_KEYS.contains(&key.as_str()) {
                format!("fields.{}", key)
            } else {
                key.clone()
            };
            json_obj.insert(key, value.to_json_value());
        }
    }

    serde_json::to_string(&serde_json::Value::Object(json_obj)).unwrap_or_default()
}

fn format_logfmt(entry: &LogEntry, timestamp_format: &TimestampFormat) -> String {
    let mut parts = vec![
        format!(
            "timestamp={}",
            escape_logfmt_value(&timestamp_format.format(&entry.timestamp))
        ),
        format!("level={}", entry.level.to_str()),
        format!("message={}", quote_logfmt_value(&entry.message)),
    ];

    if let Some(ref context) = entry.context {
        for (key, value) in context.fields() {
            let formatted_value = match value {
                FieldValue::String(s) => escape_logfmt_value(s),
                other => other.to_string(),
            };
            parts.push(format!("{}={}", escape_logfmt_key(key), formatted_value));
        }
    }

    parts.join(" ")
}

fn escape_logfmt_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

fn escape_logfmt_value(value: &str) -> String {
    if value.is_empty() || value.contains([' ', '"', '=']) {
        quote_logfmt_value(value)
    } else {
        value.to_string()
    }
}

fn quote_logfmt_value(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

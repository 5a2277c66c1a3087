//! Value and error → human/json/raw string formatting.
//!
//! Three modes:
//! - **Human** (default): e.g. `"value"`, `(integer) 42`, `(nil)`, numbered lists
//! - **JSON** (`--json`): `serde_json::to_string_pretty`
//! - **Raw** (`--raw`): Bare values, no quotes, no type prefixes

use mgmt_core::Value;

use crate::error::Error;

/// Output formatting mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Typed, readable rendering
    #[default]
    Human,
    /// Pretty-printed JSON
    Json,
    /// Bare values
    Raw,
}

impl OutputMode {
    /// Parse a mode name as used in configuration files.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "human" => Some(OutputMode::Human),
            "json" => Some(OutputMode::Json),
            "raw" => Some(OutputMode::Raw),
            _ => None,
        }
    }
}

/// Format an operation result.
pub fn format_value(value: &Value, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => format_json(value),
        OutputMode::Raw => format_value_raw(value),
        OutputMode::Human => format_value_human(value),
    }
}

/// Format an error.
pub fn format_error(err: &Error, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => serde_json::to_string_pretty(&serde_json::json!({
            "error": err.to_string()
        }))
        .unwrap_or_else(|_| format!("{{\"error\": \"{}\"}}", err)),
        OutputMode::Raw | OutputMode::Human => err.to_string(),
    }
}

// =========================================================================
// JSON mode
// =========================================================================

fn format_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

// =========================================================================
// Raw mode
// =========================================================================

fn format_value_raw(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::String(s) => s.clone(),
        Value::List(items) => items
            .iter()
            .map(format_value_raw)
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Object(obj) => serde_json::to_string(obj).unwrap_or_default(),
    }
}

// =========================================================================
// Human mode
// =========================================================================

fn format_value_human(v: &Value) -> String {
    match v {
        Value::Null => "(nil)".to_string(),
        Value::Bool(b) => format!("(boolean) {}", b),
        Value::Int(i) => format!("(integer) {}", i),
        Value::Float(f) => format!("(float) {}", f),
        Value::String(s) => format!("\"{}\"", s),
        Value::List(items) => {
            if items.is_empty() {
                "(empty list)".to_string()
            } else {
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| nested_line(&format!("{}) ", i + 1), item))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        }
        Value::Object(obj) => {
            if obj.is_empty() {
                "(empty object)".to_string()
            } else {
                obj.iter()
                    .map(|(k, item)| nested_line(&format!("{}: ", k), item))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        }
    }
}

/// `label value` for scalars; `label` followed by an indented block for
/// non-empty containers.
fn nested_line(label: &str, item: &Value) -> String {
    let is_block = match item {
        Value::List(items) => !items.is_empty(),
        Value::Object(obj) => !obj.is_empty(),
        _ => false,
    };
    if !is_block {
        return format!("{}{}", label, format_value_human(item));
    }
    let block = format_value_human(item)
        .lines()
        .map(|line| format!("   {}", line))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{}\n{}", label.trim_end(), block)
}

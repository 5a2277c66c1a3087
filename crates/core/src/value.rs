//! Value types for operation parameters and results
//!
//! ## Value Model
//!
//! The Value enum has seven variants:
//! - Null, Bool, Int, Float, String, List, Object
//!
//! Values travel in both directions: user input is parsed into `Value` when an
//! operation expression carries parameters, and endpoint results come back as
//! `Value`. On the wire the enum is untagged, so it maps one to one onto JSON.
//!
//! ## Bare words
//!
//! Unquoted parameter text is auto-detected with these rules, in order:
//! 1. `undefined` → `Value::Null`
//! 2. `true` / `false` → `Value::Bool`
//! 3. Matches `^-?[0-9]+$` and fits i64 → `Value::Int`
//! 4. Matches float pattern → `Value::Float`
//! 5. Everything else → `Value::String`

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Characters that end a bare value word.
const VALUE_DELIMITERS: &[char] = &['"', ',', '(', ')', '[', ']', '{', '}', '='];

/// Characters that end a bare node type, node name, parameter name or key.
const NAME_DELIMITERS: &[char] = &['"', ',', '(', ')', '[', ']', '{', '}', '=', '/', ':'];

/// Structured value used for parameters and results.
///
/// Different variants are never equal: `Int(1) != Float(1.0)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Undefined value (`undefined` in expressions, `null` on the wire)
    Null,
    /// Boolean value
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Ordered list of values
    List(Vec<Value>),
    /// Nested structured value with string keys
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::List(_) => "List",
            Value::Object(_) => "Object",
        }
    }

    /// Check if this is a null value
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get as bool if this is a Bool value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as i64 if this is an Int value
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as &str if this is a String value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as a slice if this is a List value
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get as a map if this is an Object value
    pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a key if this is an Object value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Auto-detect the value of an unquoted word.
    pub fn from_bare_word(s: &str) -> Value {
        if s == "undefined" {
            return Value::Null;
        }
        if s == "true" {
            return Value::Bool(true);
        }
        if s == "false" {
            return Value::Bool(false);
        }
        if is_integer(s) {
            if let Ok(i) = s.parse::<i64>() {
                return Value::Int(i);
            }
        }
        if is_float(s) {
            if let Ok(f) = s.parse::<f64>() {
                return Value::Float(f);
            }
        }
        Value::String(s.to_string())
    }

    /// Collect a list of strings, ignoring non-string items.
    pub fn string_items(&self) -> Vec<String> {
        self.as_list()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

/// Canonical expression syntax, e.g. `{name=foo,ports=[1,2]}`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("undefined"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::String(s) => {
                if is_bare_value(s) {
                    f.write_str(s)
                } else {
                    write_quoted(f, s)
                }
            }
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Object(map) => {
                f.write_str("{")?;
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write_name(f, key)?;
                    write!(f, "={}", item)?;
                }
                f.write_str("}")
            }
        }
    }
}

/// Whether `c` terminates an unquoted value word.
pub(crate) fn is_value_delimiter(c: char) -> bool {
    c.is_whitespace() || VALUE_DELIMITERS.contains(&c)
}

/// Whether `c` terminates an unquoted name.
pub(crate) fn is_name_delimiter(c: char) -> bool {
    c.is_whitespace() || NAME_DELIMITERS.contains(&c)
}

/// Write a node type, node name, parameter name or key, quoting it when the
/// bare form would not parse back to the same text.
pub(crate) fn write_name(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    let navigation = matches!(name, "." | ".." | ".type");
    if name.is_empty() || navigation || name.chars().any(is_name_delimiter) {
        write_quoted(f, name)
    } else {
        f.write_str(name)
    }
}

fn is_bare_value(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('>')
        && !s.chars().any(is_value_delimiter)
        && matches!(Value::from_bare_word(s), Value::String(_))
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for c in s.chars() {
        if c == '"' || c == '\\' {
            f.write_str("\\")?;
        }
        write!(f, "{}", c)?;
    }
    f.write_str("\"")
}

fn is_integer(s: &str) -> bool {
    let s = s.strip_prefix('-').unwrap_or(s);
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn is_float(s: &str) -> bool {
    let s = s.strip_prefix('-').unwrap_or(s);
    if s.is_empty() {
        return false;
    }
    // Must contain a dot or exponent
    if !s.contains('.') && !s.contains('e') && !s.contains('E') {
        return false;
    }
    if !s.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return false;
    }
    s.bytes().all(|b| {
        b.is_ascii_digit() || b == b'.' || b == b'e' || b == b'E' || b == b'+' || b == b'-'
    })
}

//! Canonical JSON rendering for records.
//!
//! Records render through [`std::fmt::Display`]: `{}` produces compact
//! JSON, `{:#}` pretty-prints with 2-space indentation. Output is
//! deterministic (object keys are always sorted), so two equal records
//! always render to the same text.

use std::fmt;

use crate::value::Value;

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self, 0, f.alternate())
    }
}

/// Render a record to compact JSON text.
pub fn to_json(value: &Value) -> String {
    format!("{}", value)
}

/// Render a record to pretty-printed JSON text.
pub fn to_json_pretty(value: &Value) -> String {
    format!("{:#}", value)
}

fn write_value(f: &mut fmt::Formatter<'_>, value: &Value, indent: usize, pretty: bool) -> fmt::Result {
    match value {
        Value::Null => write!(f, "null"),
        Value::Boolean(b) => write!(f, "{}", b),
        Value::Integer(n) => write!(f, "{}", n),
        Value::Float(n) => write!(f, "{}", n),
        Value::String(s) => write_string(f, s),
        Value::Array(items) => write_array(f, items, indent, pretty),
        Value::Object(map) => write_object(f, map, indent, pretty),
    }
}

fn write_array(
    f: &mut fmt::Formatter<'_>,
    items: &[Value],
    indent: usize,
    pretty: bool,
) -> fmt::Result {
    if items.is_empty() {
        return write!(f, "[]");
    }
    write!(f, "[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ",")?;
        }
        if pretty {
            write!(f, "\n{}", "  ".repeat(indent + 1))?;
        }
        write_value(f, item, indent + 1, pretty)?;
    }
    if pretty {
        write!(f, "\n{}", "  ".repeat(indent))?;
    }
    write!(f, "]")
}

fn write_object(
    f: &mut fmt::Formatter<'_>,
    map: &std::collections::HashMap<String, Value>,
    indent: usize,
    pretty: bool,
) -> fmt::Result {
    if map.is_empty() {
        return write!(f, "{{}}");
    }

    // Sort keys for deterministic output
    let mut keys: Vec<_> = map.keys().collect();
    keys.sort();

    write!(f, "{{")?;
    for (i, key) in keys.into_iter().enumerate() {
        if i > 0 {
            write!(f, ",")?;
        }
        if pretty {
            write!(f, "\n{}", "  ".repeat(indent + 1))?;
        }
        write_string(f, key)?;
        write!(f, "{}", if pretty { ": " } else { ":" })?;
        if let Some(value) = map.get(key.as_str()) {
            write_value(f, value, indent + 1, pretty)?;
        }
    }
    if pretty {
        write!(f, "\n{}", "  ".repeat(indent))?;
    }
    write!(f, "}}")
}

fn write_string(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    write!(f, "\"")?;
    for ch in s.chars() {
        match ch {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\r' => write!(f, "\\r")?,
            '\t' => write!(f, "\\t")?,
            c if c.is_control() => write!(f, "\\u{:04x}", c as u32)?,
            c => write!(f, "{}", c)?,
        }
    }
    write!(f, "\"")
}

use std::collections::HashMap;

use crate::path::Step;

/// A JSON value flowing through a CloudLens pipeline as a record.
///
/// This type represents all valid JSON types with a distinction between
/// integers and floats (unlike standard JSON which only has "number").
///
/// # Type Preservation
///
/// The pipeline preserves the distinction between integers and floats:
/// - `Number` captures produce an `Integer` when the text parses as one
/// - `Date` captures always produce a `Float` (epoch seconds)
///
/// # Examples
///
/// ```
/// use cloudlens::Value;
///
/// // Scalar values
/// let null = Value::Null;
/// let boolean = Value::Boolean(true);
/// let integer = Value::Integer(42);
/// let float = Value::Float(3.14);
/// let string = Value::String("hello".to_string());
///
/// // A log record
/// let record = Value::message("error 42");
/// assert_eq!(record.get("message"), Some(&Value::String("error 42".into())));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// JSON null
    Null,

    /// JSON boolean (true/false)
    Boolean(bool),

    /// Floating-point number
    Float(f64),

    /// Integer number (preserved separately from floats)
    Integer(i64),

    /// UTF-8 string
    String(String),

    /// Array of values (homogeneous or heterogeneous)
    Array(Vec<Value>),

    /// Object with string keys
    Object(HashMap<String, Value>),
}

impl Value {
    /// Create an empty object.
    pub fn object() -> Self {
        Value::Object(HashMap::new())
    }

    /// Wrap a log line as a record: `{"message": text}`.
    pub fn message(text: impl Into<String>) -> Self {
        let mut record = Value::object();
        record.set("message", Value::String(text.into()));
        record
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get as string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            Value::Float(n) => Some(n.round() as i64),
            _ => None,
        }
    }

    /// Get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Look up a top-level field of an object record.
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(name),
            _ => None,
        }
    }

    /// Set a top-level field. A `Null` receiver becomes an object first, so
    /// the scratch record of a deferred stage can be populated directly;
    /// other non-object receivers are left untouched.
    pub fn set(&mut self, name: &str, value: Value) {
        if self.is_null() {
            *self = Value::object();
        }
        if let Value::Object(map) = self {
            map.insert(name.to_string(), value);
        }
    }

    /// Remove a top-level field, returning the previous value if any.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        match self {
            Value::Object(map) => map.remove(name),
            _ => None,
        }
    }

    /// Append to an array. A `Null` receiver becomes an empty array first;
    /// other non-array receivers are left untouched.
    pub fn push(&mut self, value: Value) {
        if self.is_null() {
            *self = Value::Array(Vec::new());
        }
        if let Value::Array(items) = self {
            items.push(value);
        }
    }

    /// Navigate a path of steps, returning the value at the end if every
    /// step resolves.
    pub fn get_path(&self, steps: &[Step]) -> Option<&Value> {
        let mut current = self;
        for step in steps {
            current = match (step, current) {
                (Step::Field(name), Value::Object(map)) => map.get(name)?,
                (Step::Index(i), Value::Array(items)) => items.get(*i)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Mutable variant of [`get_path`](Value::get_path).
    pub fn get_path_mut(&mut self, steps: &[Step]) -> Option<&mut Value> {
        let mut current = self;
        for step in steps {
            current = match (step, current) {
                (Step::Field(name), Value::Object(map)) => map.get_mut(name)?,
                (Step::Index(i), Value::Array(items)) => items.get_mut(*i)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// A path exists iff each prefix resolves and the final step is present.
    pub fn has_path(&self, steps: &[Step]) -> bool {
        self.get_path(steps).is_some()
    }

    /// Set the value at a path, creating missing intermediate objects for
    /// field steps. Index steps must resolve to existing array slots.
    ///
    /// Returns `false` when the path cannot be reached (a prefix step hits
    /// a scalar, or an index is out of bounds).
    pub fn set_path(&mut self, steps: &[Step], value: Value) -> bool {
        let Some((last, prefix)) = steps.split_last() else {
            *self = value;
            return true;
        };

        let mut current = self;
        for step in prefix {
            if matches!(step, Step::Field(_)) && current.is_null() {
                *current = Value::object();
            }
            current = match (step, current) {
                (Step::Field(name), Value::Object(map)) => {
                    map.entry(name.clone()).or_insert_with(Value::object)
                }
                (Step::Index(i), Value::Array(items)) => match items.get_mut(*i) {
                    Some(slot) => slot,
                    None => return false,
                },
                _ => return false,
            };
        }

        if matches!(last, Step::Field(_)) && current.is_null() {
            *current = Value::object();
        }
        match (last, current) {
            (Step::Field(name), Value::Object(map)) => {
                map.insert(name.clone(), value);
                true
            }
            (Step::Index(i), Value::Array(items)) => match items.get_mut(*i) {
                Some(slot) => {
                    *slot = value;
                    true
                }
                None => false,
            },
            _ => false,
        }
    }

    /// Remove the field addressed by a path. Only object fields can be
    /// removed; an index final step returns `None`.
    pub fn remove_path(&mut self, steps: &[Step]) -> Option<Value> {
        let (last, prefix) = steps.split_last()?;
        let parent = self.get_path_mut(prefix)?;
        match (last, parent) {
            (Step::Field(name), Value::Object(map)) => map.remove(name),
            _ => None,
        }
    }
}

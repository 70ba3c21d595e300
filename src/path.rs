use std::fmt;

/// The default key a pattern matches against when no key is given.
pub const MESSAGE: &str = "message";

/// A segment in a navigable path into a record.
///
/// # Examples
/// - `"error"` → `Field("error")`
/// - `"items.0"` → `[Field("items"), Index(0)]`
/// - `"user.profile.name"` → `[Field("user"), Field("profile"), Field("name")]`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Step {
    /// Object field access by name
    Field(String),

    /// Array element access by index
    ///
    /// # Note
    /// Only all-digit segments create Index steps when parsing dotted text.
    Index(usize),
}

/// A stage key: either a path into a record, or the end-of-stream sentinel.
///
/// A path key guards a stage: the stage fires only for records in which
/// the path exists. The sentinel registers a deferred stage that fires once
/// after the upstream source is exhausted, and is unequal to every real
/// path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    /// A sequence of steps addressing a location inside a record.
    Path(Vec<Step>),

    /// The end-of-stream sentinel.
    EndOfStream,
}

impl Key {
    /// Parse dotted text into a path key. Each segment becomes a field
    /// step, except all-digit segments which become index steps.
    pub fn parse(text: &str) -> Key {
        let steps = text
            .split('.')
            .map(|segment| match segment.parse::<usize>() {
                Ok(index) => Step::Index(index),
                Err(_) => Step::Field(segment.to_string()),
            })
            .collect();
        Key::Path(steps)
    }

    /// A single-step key addressing a top-level field.
    pub fn field(name: &str) -> Key {
        Key::Path(vec![Step::Field(name.to_string())])
    }

    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Key::EndOfStream)
    }
}

impl From<&str> for Key {
    fn from(text: &str) -> Key {
        Key::parse(text)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::EndOfStream => write!(f, "<end-of-stream>"),
            Key::Path(steps) => {
                for (i, step) in steps.iter().enumerate() {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    match step {
                        Step::Field(name) => write!(f, "{}", name)?,
                        Step::Index(index) => write!(f, "{}", index)?,
                    }
                }
                Ok(())
            }
        }
    }
}

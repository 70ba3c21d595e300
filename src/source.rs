//! Pull sources that feed records into a stream.
//!
//! A source is a single-pass producer: `next()` yields successive records
//! and returns `None` once exhausted, permanently. Closures of type
//! `FnMut() -> Option<Value>` are sources, so ad-hoc generators need no
//! wrapper type.

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use crate::json::json_to_value;
use crate::value::Value;

/// A single-pass pull producer of records.
pub trait Source {
    /// Produce the next record, or `None` on permanent exhaustion.
    fn next(&mut self) -> Option<Value>;
}

impl<F: FnMut() -> Option<Value>> Source for F {
    fn next(&mut self) -> Option<Value> {
        self()
    }
}

/// Errors raised while constructing a file-backed source.
#[derive(Debug)]
pub enum SourceError {
    /// The file could not be opened or read.
    Open(PathBuf, io::Error),

    /// The file is not valid JSON.
    Json(PathBuf, serde_json::Error),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Open(path, e) => {
                write!(f, "Cannot open {}: {}", path.display(), e)
            }
            SourceError::Json(path, e) => {
                write!(f, "Invalid JSON in {}: {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SourceError::Open(_, e) => Some(e),
            SourceError::Json(_, e) => Some(e),
        }
    }
}

/// Replays an in-memory sequence of records in order.
///
/// Used both for user-supplied values and as the replay source the runner
/// installs after a `run` with history.
pub struct ValueSource {
    values: std::vec::IntoIter<Value>,
}

impl ValueSource {
    pub fn new(values: Vec<Value>) -> Self {
        ValueSource {
            values: values.into_iter(),
        }
    }
}

impl Source for ValueSource {
    fn next(&mut self) -> Option<Value> {
        self.values.next()
    }
}

/// The always-exhausted source installed after a historyless run.
pub struct EmptySource;

impl Source for EmptySource {
    fn next(&mut self) -> Option<Value> {
        None
    }
}

/// A lazy line-oriented text file source.
///
/// The handle opens up front, so an unreadable path fails at construction,
/// but lines are read one per pull and each becomes a `{"message": line}`
/// record. The handle drops at EOF or on the first read error.
pub struct TextFileSource {
    lines: Option<Lines<BufReader<File>>>,
}

impl TextFileSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let file =
            File::open(path).map_err(|e| SourceError::Open(path.to_path_buf(), e))?;
        Ok(TextFileSource {
            lines: Some(BufReader::new(file).lines()),
        })
    }
}

impl Source for TextFileSource {
    fn next(&mut self) -> Option<Value> {
        let lines = self.lines.as_mut()?;
        match lines.next() {
            Some(Ok(line)) => Some(Value::message(line)),
            Some(Err(_)) | None => {
                self.lines = None;
                None
            }
        }
    }
}

/// Read a JSON file into a sequence of records: an array root streams its
/// elements, any other root streams a single record.
pub fn json_file_values(path: impl AsRef<Path>) -> Result<Vec<Value>, SourceError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|e| SourceError::Open(path.to_path_buf(), e))?;
    let root: serde_json::Value =
        serde_json::from_str(&text).map_err(|e| SourceError::Json(path.to_path_buf(), e))?;
    Ok(match json_to_value(root) {
        Value::Array(items) => items,
        other => vec![other],
    })
}

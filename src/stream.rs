//! The stream: a pull-based pipeline of stages over a lazy record source.
//!
//! A stream owns its current source. Registering a stage is pure
//! bookkeeping: the current source is wrapped in a new layer, and nothing
//! is pulled until [`Stream::run`] (or manual iteration) drives the
//! pipeline. Each record flows through every stage before the next record
//! is fetched from the root source.

use std::path::Path;

use crate::path::{Key, Step, MESSAGE};
use crate::pattern::{Pattern, PatternError};
use crate::source::{json_file_values, EmptySource, Source, SourceError, TextFileSource, ValueSource};
use crate::stage::{Action, EndLayer, StageLayer};
use crate::value::Value;

/// A pull-based pipeline of processing stages over a sequence of records.
///
/// # Examples
///
/// ```
/// use cloudlens::{Stream, Value};
///
/// let mut errors = 0;
/// let mut stream = Stream::from_messages(["error 42", "warning", "error 255"]);
/// stream
///     .process_match(r"^error (?<error:Number>\d+)", |_| {})
///     .unwrap();
/// stream.run(true);
///
/// // Augmented records replay from history.
/// for record in stream {
///     if record.get("error").is_some() {
///         errors += 1;
///     }
/// }
/// assert_eq!(errors, 2);
/// ```
pub struct Stream {
    source: Box<dyn Source>,
}

impl Stream {
    /// Build a stream over an arbitrary boxed source.
    pub fn from_source(source: Box<dyn Source>) -> Self {
        Stream { source }
    }

    /// Build a stream over an in-memory sequence of records.
    pub fn from_values(values: Vec<Value>) -> Self {
        Stream::from_source(Box::new(ValueSource::new(values)))
    }

    /// Build a stream of `{"message": text}` records from strings.
    pub fn from_messages<I, S>(messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Stream::from_values(messages.into_iter().map(Value::message).collect())
    }

    /// Build a stream over a line-oriented text file; each line becomes a
    /// `{"message": line}` record. The file opens now and is read lazily.
    pub fn from_text_file(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        Ok(Stream::from_source(Box::new(TextFileSource::open(path)?)))
    }

    /// Build a stream over a JSON file. An array root streams its
    /// elements; any other root streams a single record.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        Ok(Stream::from_values(json_file_values(path)?))
    }

    /// Build a stream over a generator function. The function is pulled
    /// once per record and returns `None` on exhaustion.
    pub fn from_fn<F>(generator: F) -> Self
    where
        F: FnMut() -> Option<Value> + 'static,
    {
        Stream::from_source(Box::new(generator))
    }

    /// Append an unconditional stage: the action fires for every record.
    pub fn process<F>(&mut self, action: F) -> &mut Self
    where
        F: FnMut(&mut Value) + 'static,
    {
        self.layer(None, Pattern::Empty, Some(Box::new(action)));
        self
    }

    /// Append a key-guarded stage: the action fires only for records in
    /// which the key's path exists. Passing [`Key::EndOfStream`] registers
    /// a deferred stage instead.
    pub fn process_when<F>(&mut self, key: impl Into<Key>, action: F) -> &mut Self
    where
        F: FnMut(&mut Value) + 'static,
    {
        match key.into() {
            Key::EndOfStream => self.at_end(action),
            Key::Path(steps) => {
                self.layer(Some(steps), Pattern::Empty, Some(Box::new(action)));
                self
            }
        }
    }

    /// Append a pattern stage against the default `message` key. Captures
    /// augment the record before the action runs. An empty pattern
    /// registers an unconditional stage.
    pub fn process_match<F>(&mut self, pattern: &str, action: F) -> Result<&mut Self, PatternError>
    where
        F: FnMut(&mut Value) + 'static,
    {
        if pattern.is_empty() {
            return Ok(self.process(action));
        }
        self.process_match_at(pattern, Key::field(MESSAGE), action)
    }

    /// Append a pattern stage against an explicit key. A
    /// [`Key::EndOfStream`] key registers a deferred stage; the pattern is
    /// still compiled (and its errors reported) but never consulted there.
    pub fn process_match_at<F>(
        &mut self,
        pattern: &str,
        key: impl Into<Key>,
        action: F,
    ) -> Result<&mut Self, PatternError>
    where
        F: FnMut(&mut Value) + 'static,
    {
        let pattern = Pattern::compile(pattern)?;
        match key.into() {
            Key::EndOfStream => Ok(self.at_end(action)),
            Key::Path(steps) => {
                self.layer(Some(steps), pattern, Some(Box::new(action)));
                Ok(self)
            }
        }
    }

    /// Append an action-less pattern stage against the default `message`
    /// key: matching records are augmented with the pattern's captures in
    /// place.
    pub fn capture(&mut self, pattern: &str) -> Result<&mut Self, PatternError> {
        self.capture_at(pattern, Key::field(MESSAGE))
    }

    /// Action-less pattern stage against an explicit key.
    pub fn capture_at(
        &mut self,
        pattern: &str,
        key: impl Into<Key>,
    ) -> Result<&mut Self, PatternError> {
        let pattern = Pattern::compile(pattern)?;
        match key.into() {
            Key::EndOfStream => Ok(self),
            Key::Path(steps) => {
                self.layer(Some(steps), pattern, None);
                Ok(self)
            }
        }
    }

    /// Append a deferred stage, fired exactly once per run after the
    /// upstream is exhausted. The action receives a scratch record
    /// initialized to `Null`; leaving it `Null` appends nothing, filling
    /// it appends one record, and assigning [`crate::emit`] appends
    /// several.
    pub fn at_end<F>(&mut self, action: F) -> &mut Self
    where
        F: FnMut(&mut Value) + 'static,
    {
        let upstream = self.take_source();
        self.source = Box::new(EndLayer::new(upstream, Box::new(action)));
        self
    }

    /// Drive the pipeline: drain the composed source to exhaustion.
    ///
    /// With `with_history` the drained records are buffered and replayed
    /// as the stream's new source, so a later `run` (and any stages
    /// registered in between) observes them again. Without history the
    /// records are discarded and the stream is left permanently exhausted.
    pub fn run(&mut self, with_history: bool) -> &mut Self {
        if with_history {
            let mut history = Vec::new();
            while let Some(record) = self.source.next() {
                history.push(record);
            }
            self.source = Box::new(ValueSource::new(history));
        } else {
            while self.source.next().is_some() {}
            self.source = Box::new(EmptySource);
        }
        self
    }

    fn layer(&mut self, key: Option<Vec<Step>>, pattern: Pattern, action: Option<Action>) {
        let upstream = self.take_source();
        self.source = Box::new(StageLayer::new(upstream, key, pattern, action));
    }

    fn take_source(&mut self) -> Box<dyn Source> {
        std::mem::replace(&mut self.source, Box::new(EmptySource))
    }
}

impl Iterator for Stream {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        self.source.next()
    }
}

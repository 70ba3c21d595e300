//! Stage layers: the pull protocol that composes stages into a source.
//!
//! Registering a stage wraps the stream's current source in a layer. Each
//! layer pulls from its upstream, runs the stage body when the guard and
//! pattern allow, and interprets the action's mutation of the record:
//! setting it to `Null` suppresses it, assigning the result of [`emit`]
//! expands it into successors. Expansion children are served from a
//! pending queue ahead of the next upstream pull and do not re-enter the
//! stage that produced them.

use std::collections::VecDeque;

use crate::path::Step;
use crate::pattern::Pattern;
use crate::source::Source;
use crate::value::Value;

/// A stage action, invoked with a mutable binding to the current record.
pub type Action = Box<dyn FnMut(&mut Value)>;

// Reserved marker key for expansion wrappers. Two invisible-separator code
// points, so real log data never collides with it.
const EXPAND_KEY: &str = "\u{2063}\u{2063}";

/// Wrap an ordered sequence of records for expansion.
///
/// Assigning the result to the record bound in a stage action replaces
/// that record with the members of `values`, in order, each flowing
/// downstream as an independent record.
///
/// # Examples
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use cloudlens::{emit, Stream, Value};
///
/// let seen = Rc::new(Cell::new(0));
/// let sink = Rc::clone(&seen);
///
/// let mut stream = Stream::from_values(vec![Value::Integer(1)]);
/// stream.process(|record| {
///     *record = emit(vec![record.clone(), record.clone()]);
/// });
/// stream.process(move |_| sink.set(sink.get() + 1));
/// stream.run(false);
/// assert_eq!(seen.get(), 2);
/// ```
pub fn emit(values: Vec<Value>) -> Value {
    let mut wrapper = Value::object();
    wrapper.set(EXPAND_KEY, Value::Array(values));
    wrapper
}

/// If the value is an expansion wrapper, take its children, leaving `Null`
/// behind.
fn take_expansion(value: &mut Value) -> Option<Vec<Value>> {
    let is_wrapper = matches!(
        value,
        Value::Object(map)
            if map.len() == 1 && matches!(map.get(EXPAND_KEY), Some(Value::Array(_)))
    );
    if !is_wrapper {
        return None;
    }
    if let Value::Object(map) = std::mem::replace(value, Value::Null) {
        for (_, child) in map {
            if let Value::Array(items) = child {
                return Some(items);
            }
        }
    }
    None
}

/// A per-record layer applying one registered stage on top of an upstream
/// source.
pub(crate) struct StageLayer {
    upstream: Box<dyn Source>,
    key: Option<Vec<Step>>,
    pattern: Pattern,
    action: Option<Action>,
    pending: VecDeque<Value>,
}

impl StageLayer {
    pub(crate) fn new(
        upstream: Box<dyn Source>,
        key: Option<Vec<Step>>,
        pattern: Pattern,
        action: Option<Action>,
    ) -> Self {
        StageLayer {
            upstream,
            key,
            pattern,
            action,
            pending: VecDeque::new(),
        }
    }

    /// Run the stage body on a record. Returns `false` when the key guard
    /// or pattern gate bypasses the stage, in which case the record is
    /// untouched.
    fn fire(&mut self, record: &mut Value) -> bool {
        if let Some(steps) = &self.key {
            let text = match record.get_path(steps) {
                None => return false,
                Some(at_key) => match &self.pattern {
                    Pattern::Empty => None,
                    _ => match at_key.as_str() {
                        Some(text) => Some(text.to_string()),
                        None => return false,
                    },
                },
            };
            if let Some(text) = text {
                if !self.pattern.apply(&text, record) {
                    return false;
                }
            }
        }
        if let Some(action) = &mut self.action {
            action(record);
        }
        true
    }
}

impl Source for StageLayer {
    fn next(&mut self) -> Option<Value> {
        loop {
            if let Some(child) = self.pending.pop_front() {
                return Some(child);
            }
            let mut record = self.upstream.next()?;
            if self.fire(&mut record) {
                if record.is_null() {
                    continue;
                }
                if let Some(children) = take_expansion(&mut record) {
                    self.pending.extend(children);
                    continue;
                }
            }
            return Some(record);
        }
    }
}

/// The deferred layer: passes records through verbatim, then fires its
/// action exactly once on a scratch record after the upstream is
/// exhausted. Whatever the action leaves in the scratch, a record or an
/// expansion into several, appears after exhaustion as ordinary records.
pub(crate) struct EndLayer {
    upstream: Box<dyn Source>,
    action: Action,
    drained: bool,
    pending: VecDeque<Value>,
}

impl EndLayer {
    pub(crate) fn new(upstream: Box<dyn Source>, action: Action) -> Self {
        EndLayer {
            upstream,
            action,
            drained: false,
            pending: VecDeque::new(),
        }
    }
}

impl Source for EndLayer {
    fn next(&mut self) -> Option<Value> {
        if !self.drained {
            if let Some(record) = self.upstream.next() {
                return Some(record);
            }
            self.drained = true;
            let mut scratch = Value::Null;
            (self.action)(&mut scratch);
            if !scratch.is_null() {
                match take_expansion(&mut scratch) {
                    Some(children) => self.pending.extend(children),
                    None => self.pending.push_back(scratch),
                }
            }
        }
        self.pending.pop_front()
    }
}

//! Stream log input through capture stages and print the results.

use std::cell::Cell;
use std::io::{self, Read};
use std::rc::Rc;

use super::CliError;
use crate::json::json_to_value;
use crate::{Stream, Value};

/// Options for the scan command
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Input file path; stdin when absent
    pub file: Option<String>,
    /// Parse the input as a JSON document instead of log lines
    pub json: bool,
    /// Capture patterns applied to each record, in order
    pub patterns: Vec<String>,
    /// Record key the patterns match against (defaults to "message")
    pub key: Option<String>,
    /// Pretty-print records
    pub pretty: bool,
    /// Print only the record count at end of stream
    pub quiet: bool,
}

/// Execute a scan: build the stream, register one capture stage per
/// pattern, attach the output stage, and run.
pub fn execute_scan(options: &ScanOptions) -> Result<(), CliError> {
    let mut stream = open_stream(options)?;

    for pattern in &options.patterns {
        match &options.key {
            Some(key) => stream.capture_at(pattern, key.as_str())?,
            None => stream.capture(pattern)?,
        };
    }

    if options.quiet {
        let count = Rc::new(Cell::new(0usize));
        let tally = Rc::clone(&count);
        stream.process(move |_| tally.set(tally.get() + 1));
        stream.at_end(move |_| println!("{} record(s)", count.get()));
    } else if options.pretty {
        stream.process(|record| println!("{:#}", record));
    } else {
        stream.process(|record| println!("{}", record));
    }

    stream.run(false);
    Ok(())
}

fn open_stream(options: &ScanOptions) -> Result<Stream, CliError> {
    match (&options.file, options.json) {
        (Some(path), false) => Ok(Stream::from_text_file(path)?),
        (Some(path), true) => Ok(Stream::from_json_file(path)?),
        (None, false) => {
            if atty::is(atty::Stream::Stdin) {
                return Err(CliError::NoInput);
            }
            let mut lines = io::stdin().lines();
            Ok(Stream::from_fn(move || {
                lines.next().and_then(|line| line.ok()).map(Value::message)
            }))
        }
        (None, true) => {
            if atty::is(atty::Stream::Stdin) {
                return Err(CliError::NoInput);
            }
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            let root: serde_json::Value = serde_json::from_str(&buffer)?;
            Ok(match json_to_value(root) {
                Value::Array(items) => Stream::from_values(items),
                other => Stream::from_values(vec![other]),
            })
        }
    }
}

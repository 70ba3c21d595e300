//! Pattern compilation and capture application.
//!
//! A user pattern compiles to one of three shapes:
//!
//! - **Empty**: an absent or empty pattern; never filters.
//! - **Simple**: no metacharacters; matching is "contains substring".
//! - **Regex**: a regular expression with named, typed capture
//!   declarations of the form `(?<NAME:TYPE[FORMAT]>BODY)`.
//!
//! Declarations are rewritten to anonymous groups before the pattern
//! reaches the regex engine, and the declared names bind positionally to
//! groups 1, 2, …, n of the first match. Anonymous groups written by the
//! user are rejected: after rewriting, the engine's capture-group count
//! must equal the number of declarations.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

use crate::value::Value;

const METACHARACTERS: &[char] = &[
    '*', '?', '+', '[', ']', '(', ')', '{', '}', '^', '$', '|', '\\', '.', '/',
];

/// The declared type of a capture group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureType {
    /// The captured substring as-is (the default).
    String,
    /// A decimal number, integer or floating point.
    Number,
    /// A timestamp, stored as Unix-epoch seconds. Requires a format.
    Date,
}

/// A capture descriptor extracted from a pattern declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Capture {
    /// Field name the captured text is stored under.
    pub name: String,
    /// Conversion applied to the captured text.
    pub ty: CaptureType,
    /// Date format, present iff `ty` is `Date`.
    pub format: Option<String>,
}

/// A compiled pattern.
#[derive(Debug)]
pub enum Pattern {
    /// No pattern: the stage fires for every record that passes its key
    /// guard.
    Empty,

    /// Substring containment.
    Simple(String),

    /// Regular expression with typed captures in declaration order.
    Regex {
        regex: Regex,
        captures: Vec<Capture>,
    },
}

/// Errors raised while compiling a pattern.
#[derive(Debug, Clone)]
pub enum PatternError {
    /// The regex engine rejected the rewritten pattern.
    InvalidPattern(String),

    /// The pattern contains capture groups without a declaration.
    UnnamedGroups(String),

    /// A declaration has a malformed name, an unknown type, or a `Date`
    /// type without a format.
    InvalidDeclaration(String),
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternError::InvalidPattern(src) => write!(f, "Invalid pattern: {}", src),
            PatternError::UnnamedGroups(src) => {
                write!(f, "Pattern contains unnamed capture groups: {}", src)
            }
            PatternError::InvalidDeclaration(src) => {
                write!(f, "Invalid capture declaration in pattern: {}", src)
            }
        }
    }
}

impl std::error::Error for PatternError {}

impl Pattern {
    /// Compile user pattern text.
    ///
    /// Empty text compiles to [`Pattern::Empty`]; text free of
    /// metacharacters to [`Pattern::Simple`]; anything else is scanned for
    /// capture declarations and handed to the regex engine.
    pub fn compile(source: &str) -> Result<Pattern, PatternError> {
        if source.is_empty() {
            return Ok(Pattern::Empty);
        }
        if !source.chars().any(|c| METACHARACTERS.contains(&c)) {
            return Ok(Pattern::Simple(source.to_string()));
        }

        let (rewritten, captures) = rewrite_declarations(source)?;
        let regex = Regex::new(&rewritten)
            .map_err(|_| PatternError::InvalidPattern(source.to_string()))?;
        if regex.captures_len() != captures.len() + 1 {
            return Err(PatternError::UnnamedGroups(source.to_string()));
        }
        Ok(Pattern::Regex { regex, captures })
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Pattern::Empty)
    }

    /// Test the pattern against the text found at a stage's key, and for
    /// regex patterns augment the record from the first match's captures.
    ///
    /// Returns whether the pattern matched.
    pub fn apply(&self, text: &str, record: &mut Value) -> bool {
        match self {
            Pattern::Empty => true,
            Pattern::Simple(needle) => text.contains(needle.as_str()),
            Pattern::Regex { regex, captures } => match regex.captures(text) {
                Some(found) => {
                    apply_captures(&found, captures, record);
                    true
                }
                None => false,
            },
        }
    }
}

/// Store each declared capture into the record.
///
/// Group `i + 1` of the match corresponds to declaration `i` (group 0 is
/// the overall match). A non-participating group removes the field; a
/// failed `Number` or `Date` parse writes nothing, leaving any previous
/// value in place.
fn apply_captures(found: &regex::Captures<'_>, declared: &[Capture], record: &mut Value) {
    for (i, capture) in declared.iter().enumerate() {
        match found.get(i + 1) {
            None => {
                record.remove(&capture.name);
            }
            Some(text) => match capture.ty {
                CaptureType::String => {
                    record.set(&capture.name, Value::String(text.as_str().to_string()));
                }
                CaptureType::Number => {
                    if let Some(number) = parse_number(text.as_str()) {
                        record.set(&capture.name, number);
                    }
                }
                CaptureType::Date => {
                    let format = capture.format.as_deref().unwrap_or_default();
                    if let Some(seconds) = parse_date(text.as_str(), format) {
                        record.set(&capture.name, Value::Float(seconds));
                    }
                }
            },
        }
    }
}

fn parse_number(text: &str) -> Option<Value> {
    if let Ok(integer) = text.parse::<i64>() {
        return Some(Value::Integer(integer));
    }
    text.parse::<f64>().ok().map(Value::Float)
}

/// Parse a timestamp with a `SimpleDateFormat`-style format, yielding
/// Unix-epoch seconds. Date-only formats resolve to midnight UTC.
fn parse_date(text: &str, format: &str) -> Option<f64> {
    let format = translate_date_format(format);
    if let Ok(datetime) = NaiveDateTime::parse_from_str(text, &format) {
        return Some(datetime.and_utc().timestamp_millis() as f64 / 1000.0);
    }
    NaiveDate::parse_from_str(text, &format)
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN).and_utc().timestamp() as f64)
}

/// Translate a `SimpleDateFormat`-style format (`yyyy-MM-dd' 'HH:mm:ss.SSS`)
/// into a chrono format string. Runs of a pattern letter form one token;
/// text between single quotes is literal, with `''` denoting a quote.
fn translate_date_format(format: &str) -> String {
    let mut scanner = Scanner::new(format);
    let mut out = String::new();
    while let Some(ch) = scanner.current_char() {
        match ch {
            '\'' => {
                scanner.advance();
                if scanner.current_char() == Some('\'') {
                    out.push('\'');
                    scanner.advance();
                    continue;
                }
                while let Some(literal) = scanner.current_char() {
                    if literal == '\'' {
                        // '' inside quoted text is an escaped quote
                        if scanner.peek_char(1) == Some('\'') {
                            out.push('\'');
                            scanner.advance();
                            scanner.advance();
                            continue;
                        }
                        break;
                    }
                    push_literal(&mut out, literal);
                    scanner.advance();
                }
                scanner.advance();
            }
            'y' | 'M' | 'd' | 'H' | 'h' | 'm' | 's' | 'S' | 'a' | 'E' | 'z' | 'Z' => {
                let mut run = 1;
                while scanner.peek_char(run) == Some(ch) {
                    run += 1;
                }
                out.push_str(date_token(ch, run));
                for _ in 0..run {
                    scanner.advance();
                }
            }
            other => {
                push_literal(&mut out, other);
                scanner.advance();
            }
        }
    }
    out
}

fn date_token(letter: char, run: usize) -> &'static str {
    match letter {
        'y' if run <= 2 => "%y",
        'y' => "%Y",
        'M' => "%m",
        'd' => "%d",
        'H' => "%H",
        'h' => "%I",
        'm' => "%M",
        's' => "%S",
        'S' => "%3f",
        'a' => "%p",
        'E' => "%a",
        'z' | 'Z' => "%z",
        _ => "",
    }
}

fn push_literal(out: &mut String, ch: char) {
    if ch == '%' {
        out.push_str("%%");
    } else {
        out.push(ch);
    }
}

/// Rewrite `(?<NAME:TYPE[FORMAT]>BODY)` declarations to anonymous groups
/// `(BODY)`, collecting a descriptor per declaration in source order.
fn rewrite_declarations(source: &str) -> Result<(String, Vec<Capture>), PatternError> {
    let mut scanner = Scanner::new(source);
    let mut rewritten = String::new();
    let mut captures = Vec::new();

    while let Some(ch) = scanner.current_char() {
        if ch == '\\' {
            rewritten.push(ch);
            scanner.advance();
            if let Some(escaped) = scanner.current_char() {
                rewritten.push(escaped);
                scanner.advance();
            }
            continue;
        }
        if ch == '('
            && scanner.peek_char(1) == Some('?')
            && scanner.peek_char(2) == Some('<')
            && !matches!(scanner.peek_char(3), Some('=') | Some('!'))
        {
            scanner.advance();
            scanner.advance();
            scanner.advance();
            captures.push(read_declaration(&mut scanner, source)?);
            rewritten.push('(');
            continue;
        }
        rewritten.push(ch);
        scanner.advance();
    }

    Ok((rewritten, captures))
}

/// Parse the `NAME[:TYPE[[FORMAT]]]>` head of a declaration. The scanner is
/// positioned just past `(?<` on entry and just past `>` on exit; the body
/// is copied by the caller's main loop.
fn read_declaration(scanner: &mut Scanner, source: &str) -> Result<Capture, PatternError> {
    let invalid = || PatternError::InvalidDeclaration(source.to_string());

    let name = scanner.read_identifier();
    let starts_alpha = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic());
    if !starts_alpha {
        return Err(invalid());
    }

    let mut ty = CaptureType::String;
    let mut format = None;
    if scanner.current_char() == Some(':') {
        scanner.advance();
        ty = match scanner.read_identifier().as_str() {
            "String" => CaptureType::String,
            "Number" => CaptureType::Number,
            "Date" => CaptureType::Date,
            _ => return Err(invalid()),
        };
        if scanner.current_char() == Some('[') {
            scanner.advance();
            let mut text = String::new();
            loop {
                match scanner.current_char() {
                    Some(']') => {
                        scanner.advance();
                        break;
                    }
                    Some('[') | None => return Err(invalid()),
                    Some(other) => {
                        text.push(other);
                        scanner.advance();
                    }
                }
            }
            format = Some(text);
        }
    }

    if ty == CaptureType::Date && format.is_none() {
        return Err(invalid());
    }
    if scanner.current_char() != Some('>') {
        return Err(invalid());
    }
    scanner.advance();

    Ok(Capture { name, ty, format })
}

struct Scanner {
    input: Vec<char>,
    position: usize,
}

impl Scanner {
    fn new(input: &str) -> Self {
        Scanner {
            input: input.chars().collect(),
            position: 0,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_alphanumeric() {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }
}

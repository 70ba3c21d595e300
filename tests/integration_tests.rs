use std::cell::{Cell, RefCell};
use std::fs;
use std::rc::Rc;

use cloudlens::{emit, to_json, Stream, Value};

fn error_log() -> Stream {
    Stream::from_messages(["error 42", "warning", "info ", "error 255"])
}

// ========================================================================
// Error detection and counting
// ========================================================================

#[test]
fn test_error_detection_interleaves_with_printing() {
    let printed = Rc::new(RefCell::new(Vec::new()));
    let print_all = Rc::clone(&printed);
    let print_errors = Rc::clone(&printed);

    let mut stream = error_log();
    stream.process(move |record| print_all.borrow_mut().push(to_json(record)));
    stream
        .process_match(r"^error (?<error:Number>\d+)", move |record| {
            let code = record.get("error").and_then(Value::as_int).unwrap_or(-1);
            print_errors.borrow_mut().push(format!("error {} detected", code));
        })
        .unwrap();
    stream.run(true);

    assert_eq!(
        *printed.borrow(),
        vec![
            r#"{"message":"error 42"}"#,
            "error 42 detected",
            r#"{"message":"warning"}"#,
            r#"{"message":"info "}"#,
            r#"{"message":"error 255"}"#,
            "error 255 detected",
        ]
    );
}

#[test]
fn test_count_by_key_after_history() {
    let errors = Rc::new(Cell::new(0));
    let tally = Rc::clone(&errors);

    let mut stream = error_log();
    stream
        .process_match(r"^error (?<error:Number>\d+)", |_| {})
        .unwrap();
    stream.run(true);

    // The replayed history carries the captured field, so a key-guarded
    // stage can count errors without re-matching.
    stream.process_when("error", move |_| tally.set(tally.get() + 1));
    stream.run(true);

    assert_eq!(errors.get(), 2);
}

#[test]
fn test_deferred_error_report() {
    let printed = Rc::new(RefCell::new(Vec::new()));
    let report = Rc::clone(&printed);
    let errors = Rc::new(Cell::new(0));
    let tally = Rc::clone(&errors);

    let mut stream = error_log();
    stream
        .process_match(r"^error (?<error:Number>\d+)", move |_| {
            tally.set(tally.get() + 1)
        })
        .unwrap();
    stream.at_end(move |_| {
        report.borrow_mut().push(format!("{} error(s)", errors.get()))
    });
    stream.run(false);

    assert_eq!(*printed.borrow(), vec!["2 error(s)"]);
}

// ========================================================================
// Suppression and expansion
// ========================================================================

#[test]
fn test_info_records_suppressed() {
    let printed = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&printed);

    let mut stream = Stream::from_messages(["info "]);
    stream
        .process_match("^info", |record| *record = Value::Null)
        .unwrap();
    stream.process(move |record| sink.borrow_mut().push(to_json(record)));
    stream.run(false);

    assert!(printed.borrow().is_empty());
}

#[test]
fn test_emit_duplicates_record() {
    let printed = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&printed);

    let mut seed = Value::object();
    seed.set("a", Value::Integer(1));

    let mut stream = Stream::from_values(vec![seed.clone()]);
    stream.process(move |record| {
        *record = emit(vec![record.clone(), record.clone()]);
    });
    stream.process(move |record| {
        if let Some(a) = record.get("a").and_then(Value::as_int) {
            sink.borrow_mut().push(a);
        }
    });
    stream.run(false);

    assert_eq!(*printed.borrow(), vec![1, 1]);
}

// ========================================================================
// Timestamp capture
// ========================================================================

#[test]
fn test_timestamp_capture_to_epoch_seconds() {
    let mut stream = Stream::from_messages([
        "Starting test suite-a at 2016-09-08 19:08:42.123",
    ]);
    stream
        .capture(r"Starting test .* at (?<t:Date[yyyy-MM-dd' 'HH:mm:ss.SSS]>.{23})")
        .unwrap();
    stream.run(true);

    let drained: Vec<Value> = stream.collect();
    assert_eq!(drained[0].get("t"), Some(&Value::Float(1473361722.123)));
}

// ========================================================================
// File-backed sources
// ========================================================================

#[test]
fn test_text_file_source_streams_lines() {
    let path = std::env::temp_dir().join("cloudlens_text_source_test.log");
    fs::write(&path, "error 42\nwarning\n").unwrap();

    let mut stream = Stream::from_text_file(&path).unwrap();
    stream.capture(r"^error (?<error:Number>\d+)").unwrap();
    stream.run(true);

    let drained: Vec<Value> = stream.collect();
    assert_eq!(drained.len(), 2);
    assert_eq!(drained[0].get("error"), Some(&Value::Integer(42)));
    assert_eq!(
        drained[1].get("message"),
        Some(&Value::String("warning".into()))
    );

    fs::remove_file(&path).ok();
}

#[test]
fn test_json_file_array_streams_elements() {
    let path = std::env::temp_dir().join("cloudlens_json_source_test.json");
    fs::write(&path, r#"[{"a":1},{"a":2}]"#).unwrap();

    let stream = Stream::from_json_file(&path).unwrap();
    let drained: Vec<Value> = stream.collect();
    assert_eq!(drained.len(), 2);
    assert_eq!(drained[1].get("a"), Some(&Value::Integer(2)));

    fs::remove_file(&path).ok();
}

#[test]
fn test_json_file_scalar_root_streams_single_record() {
    let path = std::env::temp_dir().join("cloudlens_json_root_test.json");
    fs::write(&path, r#"{"a":1}"#).unwrap();

    let stream = Stream::from_json_file(&path).unwrap();
    let drained: Vec<Value> = stream.collect();
    assert_eq!(drained.len(), 1);

    fs::remove_file(&path).ok();
}

#[test]
fn test_missing_file_fails_at_construction() {
    assert!(Stream::from_text_file("/nonexistent/cloudlens.log").is_err());
    assert!(Stream::from_json_file("/nonexistent/cloudlens.json").is_err());
}

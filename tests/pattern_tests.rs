use cloudlens::{CaptureType, Pattern, PatternError, Value};

fn compile(source: &str) -> Pattern {
    Pattern::compile(source).unwrap()
}

fn record() -> Value {
    Value::message("placeholder")
}

// ========================================================================
// Classification
// ========================================================================

#[test]
fn test_empty_pattern_compiles_to_empty() {
    assert!(matches!(compile(""), Pattern::Empty));
}

#[test]
fn test_plain_text_compiles_to_simple() {
    match compile("error 42") {
        Pattern::Simple(needle) => assert_eq!(needle, "error 42"),
        other => panic!("expected Simple, got {:?}", other),
    }
}

#[test]
fn test_metacharacters_compile_to_regex() {
    assert!(matches!(compile("^error"), Pattern::Regex { .. }));
    assert!(matches!(compile("warn|fail"), Pattern::Regex { .. }));
}

#[test]
fn test_empty_pattern_always_matches() {
    let mut r = record();
    assert!(compile("").apply("anything", &mut r));
}

#[test]
fn test_simple_match_is_containment() {
    let pattern = compile("error");
    let mut r = record();
    assert!(pattern.apply("an error occurred", &mut r));
    assert!(!pattern.apply("all fine", &mut r));
}

// ========================================================================
// Capture declarations
// ========================================================================

#[test]
fn test_declaration_with_type() {
    match compile(r"^error (?<error:Number>\d+)") {
        Pattern::Regex { captures, .. } => {
            assert_eq!(captures.len(), 1);
            assert_eq!(captures[0].name, "error");
            assert_eq!(captures[0].ty, CaptureType::Number);
            assert_eq!(captures[0].format, None);
        }
        other => panic!("expected Regex, got {:?}", other),
    }
}

#[test]
fn test_declaration_type_defaults_to_string() {
    match compile(r"(?<word>\w+)") {
        Pattern::Regex { captures, .. } => {
            assert_eq!(captures[0].name, "word");
            assert_eq!(captures[0].ty, CaptureType::String);
        }
        other => panic!("expected Regex, got {:?}", other),
    }
}

#[test]
fn test_date_declaration_keeps_format() {
    match compile(r"(?<t:Date[yyyy-MM-dd]>.+)") {
        Pattern::Regex { captures, .. } => {
            assert_eq!(captures[0].ty, CaptureType::Date);
            assert_eq!(captures[0].format.as_deref(), Some("yyyy-MM-dd"));
        }
        other => panic!("expected Regex, got {:?}", other),
    }
}

#[test]
fn test_declarations_in_source_order() {
    match compile(r"(?<level>\w+) (?<code:Number>\d+)") {
        Pattern::Regex { captures, .. } => {
            assert_eq!(captures[0].name, "level");
            assert_eq!(captures[1].name, "code");
        }
        other => panic!("expected Regex, got {:?}", other),
    }
}

#[test]
fn test_name_must_start_with_letter() {
    assert!(matches!(
        Pattern::compile(r"(?<1bad>\d+)"),
        Err(PatternError::InvalidDeclaration(_))
    ));
}

#[test]
fn test_unknown_type_rejected() {
    assert!(matches!(
        Pattern::compile(r"(?<x:Float>\d+)"),
        Err(PatternError::InvalidDeclaration(_))
    ));
}

#[test]
fn test_date_requires_format() {
    assert!(matches!(
        Pattern::compile(r"(?<t:Date>\d+)"),
        Err(PatternError::InvalidDeclaration(_))
    ));
}

#[test]
fn test_anonymous_groups_rejected() {
    assert!(matches!(
        Pattern::compile(r"^error (\d+)"),
        Err(PatternError::UnnamedGroups(_))
    ));
}

#[test]
fn test_bad_regex_rejected() {
    assert!(matches!(
        Pattern::compile(r"(?<a:String>[)"),
        Err(PatternError::InvalidPattern(_))
    ));
}

// ========================================================================
// Capture application
// ========================================================================

#[test]
fn test_string_capture_sets_field() {
    let pattern = compile(r"^(?<level>[a-z]+)");
    let mut r = record();
    assert!(pattern.apply("warning: disk full", &mut r));
    assert_eq!(r.get("level"), Some(&Value::String("warning".into())));
}

#[test]
fn test_number_capture_integer() {
    let pattern = compile(r"^error (?<error:Number>\d+)");
    let mut r = record();
    assert!(pattern.apply("error 42", &mut r));
    assert_eq!(r.get("error"), Some(&Value::Integer(42)));
}

#[test]
fn test_number_capture_float() {
    let pattern = compile(r"took (?<elapsed:Number>[0-9.]+)s");
    let mut r = record();
    assert!(pattern.apply("took 3.5s", &mut r));
    assert_eq!(r.get("elapsed"), Some(&Value::Float(3.5)));
}

#[test]
fn test_number_parse_failure_leaves_field_untouched() {
    let pattern = compile(r"^(?<n:Number>[a-z]+)");
    let mut r = record();
    r.set("n", Value::Integer(7));
    assert!(pattern.apply("abc", &mut r));
    assert_eq!(r.get("n"), Some(&Value::Integer(7)));
}

#[test]
fn test_nonparticipating_group_removes_field() {
    let pattern = compile(r"(?<a:String>alpha)|(?<b:String>beta)");
    let mut r = record();
    r.set("a", Value::String("stale".into()));
    assert!(pattern.apply("beta", &mut r));
    assert_eq!(r.get("a"), None);
    assert_eq!(r.get("b"), Some(&Value::String("beta".into())));
}

#[test]
fn test_first_match_only() {
    let pattern = compile(r"(?<n:Number>\d+)");
    let mut r = record();
    assert!(pattern.apply("error 1 then error 2", &mut r));
    assert_eq!(r.get("n"), Some(&Value::Integer(1)));
}

#[test]
fn test_no_match_leaves_record_untouched() {
    let pattern = compile(r"^error (?<error:Number>\d+)");
    let mut r = Value::message("warning");
    assert!(!pattern.apply("warning", &mut r));
    assert_eq!(r, Value::message("warning"));
}

// ========================================================================
// Date captures
// ========================================================================

#[test]
fn test_date_capture_epoch_seconds() {
    let pattern =
        compile(r"Starting test .* at (?<t:Date[yyyy-MM-dd' 'HH:mm:ss.SSS]>.{23})");
    let mut r = record();
    assert!(pattern.apply(
        "Starting test X at 2016-09-08 19:08:42.123",
        &mut r
    ));
    assert_eq!(r.get("t"), Some(&Value::Float(1473361722.123)));
}

#[test]
fn test_date_only_format_is_midnight_utc() {
    let pattern = compile(r"^(?<d:Date[yyyy-MM-dd]>.{10})");
    let mut r = record();
    assert!(pattern.apply("2016-09-08 and more", &mut r));
    assert_eq!(r.get("d"), Some(&Value::Float(1473292800.0)));
}

#[test]
fn test_date_parse_failure_leaves_field_untouched() {
    let pattern = compile(r"^(?<t:Date[yyyy-MM-dd]>.{10})");
    let mut r = record();
    r.set("t", Value::Float(1.0));
    assert!(pattern.apply("not-a-date", &mut r));
    assert_eq!(r.get("t"), Some(&Value::Float(1.0)));
}

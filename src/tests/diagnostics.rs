//! Disassembler output and error-report rendering.

use crate::{Context, Error, compile};

fn dump_with_defaults(argnames: &[&str], source: &str) -> String {
    let ctx = Context::with_defaults();
    let f = ctx.compile(argnames, source).unwrap();
    let mut out = Vec::new();
    f.dump(&mut out, Some(&ctx)).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn dump_header_and_resolved_call() {
    let text = dump_with_defaults(&["x"], "sin(x) + 1");
    assert!(text.starts_with("argc = 1, framesize = "), "got: {text}");
    assert!(text.contains("call sin, 0, "), "got: {text}");
    assert!(text.contains("val 1, "), "got: {text}");
    assert!(text.contains("add "), "got: {text}");
    assert!(text.trim_end().ends_with("ret 1"), "got: {text}");
}

#[test]
fn dump_without_context_prints_table_indices() {
    let f = compile(&["x"], "sin(x)").unwrap();
    let mut out = Vec::new();
    f.dump(&mut out, None).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("call [0], 0, 1"), "got: {text}");
}

#[test]
fn dump_shows_jumps_and_boolean_ops() {
    let text = dump_with_defaults(&["x"], "x > 0 && x < 1 ? x : 0 - x");
    assert!(text.contains("gt "), "got: {text}");
    assert!(text.contains("jmpf "), "got: {text}");
    assert!(text.contains("jmp "), "got: {text}");
}

#[test]
fn dump_membership_instruction() {
    let text = dump_with_defaults(&["x"], "x in 0..10");
    assert!(text.contains("in 0, "), "got: {text}");
    assert!(text.contains("excl"), "got: {text}");

    let text = dump_with_defaults(&["x"], "x in 0...10");
    assert!(text.contains("incl"), "got: {text}");
}

#[test]
fn parser_error_report_points_at_the_column() {
    let err = compile(&["x"], "x +\n  nope + 1").unwrap_err();
    let mut out = Vec::new();
    err.log(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(
        text,
        "2:3: parser error: undefined reference: 'nope'\n  nope + 1\n--^\n"
    );
}

#[test]
fn non_parser_errors_render_one_line() {
    let err = compile(&["x", "x"], "x").unwrap_err();
    let mut out = Vec::new();
    err.log(&mut out).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "error: duplicate argument: 'x'\n"
    );
}

#[test]
fn display_matches_kind() {
    let err = compile(&[], "sqrt(-1)").unwrap_err();
    assert_eq!(err.to_string(), "math domain error");
    assert!(matches!(err, Error::Math { .. }));
}

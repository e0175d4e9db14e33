// Copyright (c) 2019 Georg Brandl.  Licensed under the Apache License,
// Version 2.0 <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0>
// or the MIT license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at
// your option. This file may not be copied, modified, or distributed except
// according to those terms.

use rstest::rstest;
use serde_json::json;
use rs274::*;

fn blocks(input: &str) -> Vec<Block> {
    parse_program(input).collect::<Result<_, _>>().unwrap()
}

fn first_error(input: &str) -> Diagnostic {
    parse_program(input).find_map(Result::err).expect("a diagnostic")
}

#[test]
fn test_parse() {
    let src = r#"; Try to exercise as much of the syntax as possible.

; comments anywhere, line numbers, and case
(a)N1 g00 x1 (a)(b) Y2;rest
N2 G1 X -5.5 Y+.5	Z2.
GG01 X1e2
N30

G38.2 Z-10
X0 Y0 Z0
"#;

    let parsed = r#"N1 G0 X1 Y2
N2 G1 X-5.5 Y0.5 Z2
G1 X100
N30
G38.2 Z-10
X0 Y0 Z0
"#;

    let prog = parse("testfile", src);
    assert!(prog.diagnostics.is_empty(), "{:?}", prog.diagnostics);

    // make sure we count lines correctly
    assert_eq!(prog.blocks[0].position.line, 4);
    assert_eq!(prog.blocks[0].position.column, 4);

    assert_eq!(prog.to_string(), parsed);
}

#[rstest]
#[case("$", ErrorKind::UnterminatedBlock)]
#[case("GG", ErrorKind::MalformedNumeral)]
#[case("G 1", ErrorKind::MalformedNumeral)]
#[case("G1.25", ErrorKind::MalformedNumeral)]
#[case("N", ErrorKind::MalformedNumeral)]
#[case("N1.5", ErrorKind::MalformedNumeral)]
#[case("N99999999999", ErrorKind::MalformedNumeral)]
#[case("X", ErrorKind::MalformedNumeral)]
#[case("X-", ErrorKind::MalformedNumeral)]
#[case("X1.2.3", ErrorKind::MalformedNumeral)]
#[case("X1e", ErrorKind::MalformedNumeral)]
#[case("X1e+", ErrorKind::MalformedNumeral)]
#[case("X1-2", ErrorKind::MalformedNumeral)]
#[case("X1+Y2", ErrorKind::MalformedNumeral)]
#[case("N10-", ErrorKind::MalformedNumeral)]
#[case("G1.", ErrorKind::MalformedNumeral)]
#[case("X1e999", ErrorKind::MalformedNumeral)]
#[case("X-1e400", ErrorKind::MalformedNumeral)]
#[case("X1 X2", ErrorKind::DuplicateLetter)]
#[case("G0 N1", ErrorKind::UnterminatedBlock)]
#[case("G0 G1", ErrorKind::UnterminatedBlock)]
#[case("G1 A90", ErrorKind::UnterminatedBlock)]
#[case("X1 Q2", ErrorKind::UnterminatedBlock)]
#[case("(", ErrorKind::UnclosedComment)]
#[case("(\n)", ErrorKind::UnclosedComment)]
fn test_invalid(#[case] snippet: &str, #[case] kind: ErrorKind) {
    let diag = first_error(snippet);
    assert_eq!(diag.kind, kind, "{:?}", snippet);
    assert_eq!(diag.severity, Severity::Error);
}

#[rstest]
#[case("G0", CommandKind::Rapid)]
#[case("G00", CommandKind::Rapid)]
#[case("G000", CommandKind::Rapid)]
#[case("g0", CommandKind::Rapid)]
#[case("G1", CommandKind::Feed)]
#[case("G01", CommandKind::Feed)]
#[case("G2", CommandKind::Unknown)]
#[case("G02", CommandKind::Unknown)]
#[case("G10", CommandKind::Unknown)]
#[case("G38.2", CommandKind::Unknown)]
#[case("X1", CommandKind::None)]
#[case("N5", CommandKind::None)]
fn test_command_kind(#[case] input: &str, #[case] kind: CommandKind) {
    let parsed = blocks(input);
    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed[0].kind, kind);
    assert_eq!(parsed[0].code.is_none(), kind == CommandKind::None);
}

#[test]
fn test_single_block() {
    let parsed = blocks("N220 G0 X1.1 Y2.2 Z3.3\n");
    assert_eq!(parsed.len(), 1);
    let block = &parsed[0];
    assert_eq!(block.line_number, Some(220));
    assert_eq!(block.kind, CommandKind::Rapid);
    let args: Vec<_> = block.arguments.iter().map(|a| (a.letter, a.value)).collect();
    assert_eq!(args, [(Letter::X, 1.1), (Letter::Y, 2.2), (Letter::Z, 3.3)]);
}

#[test]
fn test_blanks_inside_words() {
    let parsed = blocks("N220 g0 X 1.1 Y 2.2 Z3.3   \n");
    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed[0].get(Letter::X), Some(1.1));
    assert_eq!(parsed[0].get(Letter::Z), Some(3.3));
}

#[test]
fn test_two_blocks() {
    let parsed = blocks("G1 X5\nN10 G0 X0 Y0\n");
    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed[0].line_number, None);
    assert_eq!(parsed[0].kind, CommandKind::Feed);
    assert_eq!(parsed[0].get(Letter::X), Some(5.0));
    assert_eq!(parsed[0].arguments.len(), 1);
    assert_eq!(parsed[1].line_number, Some(10));
    assert_eq!(parsed[1].kind, CommandKind::Rapid);
    assert_eq!(parsed[1].get(Letter::X), Some(0.0));
    assert_eq!(parsed[1].get(Letter::Y), Some(0.0));
    assert_eq!(parsed[1].position.line, 2);
}

#[test]
fn test_empty_input() {
    assert_eq!(parse_program("").count(), 0);
    assert_eq!(parse_program("  \n\t\n(only a comment)\n; and another").count(), 0);
    let prog = parse("empty", "");
    assert!(prog.blocks.is_empty() && prog.diagnostics.is_empty());
}

#[test]
fn test_crlf() {
    let parsed = blocks("G1 X1\r\nG0 Y2\r\n");
    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed[1].position.line, 2);
}

#[test]
fn test_zero_argument_is_present() {
    let parsed = blocks("G0 X0");
    assert!(parsed[0].arguments.contains(Letter::X));
    assert_eq!(parsed[0].get(Letter::X), Some(0.0));
    assert_eq!(parsed[0].get(Letter::Y), None);
}

#[test]
fn test_duplicate_letter() {
    let diag = first_error("N1 G0 X1.0 X2.0");
    assert_eq!(diag.kind, ErrorKind::DuplicateLetter);
    assert_eq!(diag.token, Token::Argument(Letter::X));
    assert_eq!((diag.position.line, diag.position.column), (1, 12));
    assert_eq!(parse_program("N1 G0 X1.0 X2.0").filter(Result::is_ok).count(), 0);
}

#[test]
fn test_duplicate_keep_first() {
    let parser = Parser::new(ParseOptions::default().with_duplicates(DuplicatePolicy::KeepFirst));
    let items: Vec<_> = parser.blocks("N1 G0 X1.0 X2.0\n").collect();
    assert_eq!(items.len(), 1);
    let block = items[0].as_ref().unwrap();
    assert_eq!(block.get(Letter::X), Some(1.0));
    assert_eq!(block.warnings.len(), 1);
    assert_eq!(block.warnings[0].kind, ErrorKind::DuplicateLetter);
    assert_eq!(block.warnings[0].severity, Severity::Warning);

    let prog = parser.parse("dup", "N1 G0 X1.0 X2.0\n");
    assert_eq!(prog.diagnostics.len(), 1);
    assert!(!prog.has_errors());
}

#[test]
fn test_malformed_numeral_recovery() {
    let items: Vec<_> = parse_program("N1 G0 X1.2.3\nN2 G1 X1\n").collect();
    assert_eq!(items.len(), 2);
    let diag = items[0].as_ref().unwrap_err();
    assert_eq!(diag.kind, ErrorKind::MalformedNumeral);
    assert_eq!(diag.token, Token::Argument(Letter::X));
    assert_eq!((diag.position.line, diag.position.column), (1, 8));
    assert!(diag.message.contains("1.2.3"), "{}", diag.message);
    let block = items[1].as_ref().unwrap();
    assert_eq!(block.line_number, Some(2));
    assert_eq!(block.kind, CommandKind::Feed);
}

#[test]
fn test_broken_numeral_position() {
    let diag = first_error("G1 X1e\n");
    assert_eq!(diag.kind, ErrorKind::MalformedNumeral);
    assert_eq!(diag.token, Token::Argument(Letter::X));
    assert_eq!(diag.position.column, 5);
    assert_eq!(diag.message, "malformed number '1e' after X");

    let diag = first_error("G1 X 1-2");
    assert_eq!(diag.position.column, 6);
    assert_eq!(diag.message, "malformed number '1-2' after X");
}

#[test]
fn test_numeral_overflow() {
    let diag = first_error("G1 X1e999\n");
    assert_eq!(diag.kind, ErrorKind::MalformedNumeral);
    assert_eq!(diag.position.column, 5);

    let huge = format!("G{}", "9".repeat(400));
    assert_eq!(first_error(&huge).kind, ErrorKind::MalformedNumeral);

    // the largest finite values still parse and survive output
    let parsed = blocks("X1.7e308 Y-1e-300");
    assert!(parsed[0].get(Letter::X).unwrap().is_finite());
    let value = serde_json::to_value(&parsed[0]).unwrap();
    assert!(value["arguments"]["X"].is_f64());
    assert_eq!(blocks(&parsed[0].to_string()), parsed);
}

#[test]
fn test_stop_at_first_error() {
    let parser = Parser::new(ParseOptions::default().with_recovery(Recovery::Stop));
    let items: Vec<_> = parser.blocks("G0 X1\nN1 G0 X1.2.3\nN2 G1 X1\n").collect();
    assert_eq!(items.len(), 2);
    assert!(items[0].is_ok());
    assert!(items[1].is_err());
}

#[test]
fn test_collects_all_errors() {
    let prog = parse("errs", "X1 X2\nG1 X1\nQ\nG0 Y1\nG9.99\n");
    assert_eq!(prog.blocks.len(), 2);
    let kinds: Vec<_> = prog.diagnostics.iter().map(|d| (d.position.line, d.kind)).collect();
    assert_eq!(kinds, [(1, ErrorKind::DuplicateLetter),
                       (3, ErrorKind::UnterminatedBlock),
                       (5, ErrorKind::MalformedNumeral)]);
    assert!(prog.has_errors());
}

#[test]
fn test_extra_letters() {
    let parser = Parser::new(ParseOptions::default().with_letters("XYZAF".parse().unwrap()));
    let prog = parser.parse("abc", "G1 A90 F200 X1\n");
    assert!(prog.diagnostics.is_empty());
    assert_eq!(prog.blocks[0].get(Letter::A), Some(90.));
    assert_eq!(prog.blocks[0].get(Letter::F), Some(200.));

    let diag = first_error("G1 A90");
    assert!(diag.message.contains("not enabled"), "{}", diag.message);
}

#[test]
fn test_lines() {
    let parser = Parser::default();
    let lines = vec!["G1 X5", "", "N10 G0 X0 Y0\n", "X1.2.3", "Y1"];
    let items: Vec<_> = parser.lines(lines.iter().copied()).collect();
    assert_eq!(items.len(), 4);
    assert_eq!(items[0].as_ref().unwrap().position.line, 1);
    assert_eq!(items[1].as_ref().unwrap().position.line, 3);
    assert_eq!(items[2].as_ref().unwrap_err().position.line, 4);
    assert_eq!(items[3].as_ref().unwrap().position.line, 5);

    let parser = Parser::new(ParseOptions::default().with_recovery(Recovery::Stop));
    assert_eq!(parser.lines(lines.iter().copied()).count(), 3);
}

#[test]
fn test_observer() {
    let parser = Parser::default();
    let mut seen = Vec::new();
    let parsed: Vec<_> = parser.blocks("N1 G0 X1\n")
                               .observe(|m| seen.push((m.production, m.text.to_string())))
                               .collect();
    assert_eq!(parsed.len(), 1);
    assert_eq!(seen, [
        (Production::LineNumber, "N1".to_string()),
        (Production::Command, "G0".to_string()),
        (Production::Argument, "X1".to_string()),
        (Production::EndOfBlock, "\n".to_string()),
    ]);
}

#[test]
fn test_idempotent() {
    let src = "N1 G0 X1\nX1 X2\nG1 Y-3.5 Z+2\n$\n";
    let first: Vec<_> = parse_program(src).collect();
    let second: Vec<_> = parse_program(src).collect();
    assert_eq!(first, second);

    let threads: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..4).map(|_| s.spawn(|| parse_program(src).collect::<Vec<_>>()))
                                    .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    for result in threads {
        assert_eq!(result, first);
    }
}

#[test]
fn test_render() {
    let input = "G0 X1\nG1 Q2\n";
    let prog = parse("t.ngc", input);
    assert_eq!(prog.blocks.len(), 1);
    let text = prog.diagnostics[0].render("t.ngc", input);
    assert!(text.contains("t.ngc:2:4"), "{}", text);
    assert!(text.contains("unexpected 'Q'"), "{}", text);
}

#[test]
fn test_render_single_line() {
    let lines = ["G0 X1", "", "(skip)", "G1 Q2"];
    let diag = Parser::default().lines(lines.iter().copied())
                                .find_map(Result::err).expect("a diagnostic");
    assert_eq!(diag.position.line, 4);
    let text = diag.render("t.ngc", lines[3]);
    assert!(text.contains("t.ngc:4:4"), "{}", text);
    assert!(text.contains("G1 Q2"), "{}", text);
}

#[test]
fn test_json() {
    let parsed = blocks("N220 G0 Z3.3 X1.1\n");
    let block = &parsed[0];
    let value = serde_json::to_value(block).unwrap();
    assert_eq!(value["line_number"], json!(220));
    assert_eq!(value["kind"], json!("Rapid"));
    assert_eq!(value["code"], json!(0));
    assert_eq!(value["arguments"], json!({"Z": 3.3, "X": 1.1}));
    assert!(value.get("warnings").is_none());
    assert_eq!(serde_json::to_string(&block.arguments).unwrap(), r#"{"Z":3.3,"X":1.1}"#);

    let parsed = blocks("X1");
    let none = &parsed[0];
    let value = serde_json::to_value(none).unwrap();
    assert_eq!(value["kind"], json!("None"));
    assert_eq!(value["line_number"], json!(null));
}

//! Integration tests for fprettier-lex
//!
//! These tests drive the public API the way the formatter does: pull
//! logical lines from an `InputStream` until end of input.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::io::{BufRead, BufReader, Cursor};

use fprettier_lex::parser::{parse_var_decl, ScanState};
use fprettier_lex::{CharFilter, Config, FortranLine, InputStream, LexError};

fn lex_all<R: BufRead>(mut stream: InputStream<R>) -> Vec<FortranLine> {
    let mut lines = Vec::new();
    while let Some(line) = stream.next_fortran_line().unwrap() {
        lines.push(line);
    }
    lines
}

fn lex_str(input: &str) -> Vec<FortranLine> {
    lex_all(InputStream::from_string(input))
}

fn reassemble(lines: &[FortranLine]) -> String {
    lines.iter().flat_map(|l| l.lines.iter().map(String::as_str)).collect()
}

const SAMPLE: &str = r#"#include "config.h"
module shapes
   use iso_fortran_env, only: dp => real64  ! kinds
   implicit none
   real(dp), parameter :: pi = 3.14159_dp; integer :: n = 0
   character(len=*), parameter :: msg = 'it''s ! not a comment; really'
#:if DEBUG > 0 &
    & .and. VERBOSE
   integer, parameter :: level = ${DEBUG}$
#:endif
contains
   subroutine area(r, a)
      real(dp), intent(in) :: r
      real(dp), intent(out) :: a
      !$omp parallel do &
      !$omp private(i)
      a = pi * &
          ! radius squared
          & r**2
!$    call omp_set_num_threads(4)
      print *, "done"; return
   end subroutine area
end module shapes
"#;

#[test]
fn test_plain_line_unchanged() {
    let lines = lex_str("call foo(a, b)\n");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].joined_line, "call foo(a, b)\n");
    assert_eq!(lines[0].comments, vec![""]);
    assert_eq!(lines[0].lines, vec!["call foo(a, b)\n"]);
}

#[test]
fn test_sample_round_trip() {
    let lines = lex_str(SAMPLE);
    assert_eq!(reassemble(&lines), SAMPLE);
}

#[test]
fn test_sample_logical_lines() {
    let lines = lex_str(SAMPLE);
    let joined: Vec<&str> = lines.iter().map(|l| l.joined_line.as_str()).collect();

    assert_eq!(joined[0], "");
    assert_eq!(lines[0].comments, vec!["#include \"config.h\""]);
    assert_eq!(joined[1], "module shapes\n");
    assert_eq!(joined[2], "use iso_fortran_env, only: dp => real64");
    assert_eq!(lines[2].comments, vec!["! kinds"]);
    assert_eq!(joined[4], "real(dp), parameter :: pi = 3.14159_dp\n");
    assert_eq!(joined[5], "integer :: n = 0\n");
    assert_eq!(
        joined[6],
        "character(len=*), parameter :: msg = 'it''s ! not a comment; really'\n"
    );

    // fypp directive spanning two physical lines
    assert_eq!(joined[7], "");
    assert_eq!(lines[7].lines.len(), 2);
    assert_eq!(lines[7].comments[0], "#:if DEBUG > 0 &");

    assert_eq!(joined[8], "integer, parameter :: level = ${DEBUG}$\n");

    let omp = lines
        .iter()
        .find(|l| l.joined_line.starts_with("!$omp"))
        .unwrap();
    assert_eq!(omp.joined_line, "!$omp parallel do private(i)\n");
    assert_eq!(omp.lines.len(), 2);

    let assign = lines
        .iter()
        .find(|l| l.joined_line.starts_with("a = pi"))
        .unwrap();
    assert_eq!(assign.joined_line, "a = pi *  r**2\n");
    assert_eq!(assign.comments, vec!["", "! radius squared", ""]);

    let conditional = lines
        .iter()
        .find(|l| l.joined_line.starts_with("!$ "))
        .unwrap();
    assert_eq!(conditional.joined_line, "!$    call omp_set_num_threads(4)\n");

    assert!(joined.contains(&"print *, \"done\"\n"));
    assert!(joined.contains(&"return\n"));
    assert_eq!(*joined.last().unwrap(), "end module shapes\n");
}

#[test]
fn test_line_numbers_follow_physical_lines() {
    let lines = lex_str(SAMPLE);
    assert_eq!(lines[0].line_number, 1);
    // both statements of line 5 report line 5
    assert_eq!(lines[4].line_number, 5);
    assert_eq!(lines[5].line_number, 5);
    assert_eq!(lines[7].line_number, 7);
    assert_eq!(lines[8].line_number, 9);
    assert!(lines.windows(2).all(|w| w[0].line_number <= w[1].line_number));
}

#[test]
fn test_semicolon_split() {
    let lines = lex_str("a=1;b=2\n");
    let joined: Vec<&str> = lines.iter().map(|l| l.joined_line.as_str()).collect();
    assert_eq!(joined, vec!["a=1\n", "b=2\n"]);
}

#[test]
fn test_continuation_join() {
    let lines = lex_str("x = 1 &\n + 2\n");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].joined_line, "x = 1 + 2\n");
    assert_eq!(lines[0].comments, vec!["", ""]);
    assert_eq!(lines[0].lines, vec!["x = 1 &\n", " + 2\n"]);
}

#[test]
fn test_omp_sentinel_is_code() {
    let lines = lex_str("!$omp parallel\n");
    assert_eq!(lines[0].joined_line, "!$omp parallel\n");
    assert_eq!(lines[0].comments, vec![""]);
}

#[test]
fn test_filter_strings_removes_quoted_text() {
    let mut kept = CharFilter::new("y = 'a b' // \"c\"", false, false);
    assert_eq!(kept.filter_all(), "y = 'a b' // \"c\"");

    let mut filtered = CharFilter::new("y = 'a b' // \"c\"", false, true);
    assert_eq!(filtered.filter_all(), "y =  // ");
}

#[test]
fn test_comment_halts_at_marker() {
    let mut filter = CharFilter::new("call x() ! done", true, false);
    assert_eq!(filter.filter_all(), "call x() ");
    assert_eq!(filter.halted_at(), Some(9));
    assert_eq!(filter.state(), ScanState::InComment);
}

#[test]
fn test_interpolation_is_never_a_comment() {
    for input in ["v = #{x}# + 1", "v = ${x}$ + 1", "v = @{x}@ + 1"] {
        let mut kept = CharFilter::new(input, true, false);
        assert_eq!(kept.filter_all(), input);
        assert_eq!(kept.halted_at(), None);

        let mut removed = CharFilter::new(input, true, true);
        assert_eq!(removed.filter_all(), "v =  + 1");
    }
}

#[test]
fn test_declaration_grammar() {
    let decl = parse_var_decl("real, dimension(3) :: x, y\n").unwrap();
    assert_eq!(decl.type_spec, "real");
    assert_eq!(decl.parameters, None);
    assert_eq!(decl.attributes, Some(", dimension(3)"));
    assert!(decl.has_double_colon);
    assert_eq!(decl.vars, " x, y");
}

#[test]
fn test_declaration_on_joined_line() {
    let lines = lex_str("integer, &\n   intent(in) :: n\n");
    let decl = parse_var_decl(&lines[0].joined_line).unwrap();
    assert_eq!(decl.type_spec, "integer");
    assert_eq!(decl.attributes, Some(", intent(in)"));
    assert_eq!(decl.vars, " n");
}

#[test]
fn test_windows_line_endings_round_trip() {
    let input = "x = 1 &\r\n + 2\r\ny = 3\r\n";
    let lines = lex_str(input);
    assert_eq!(reassemble(&lines), input);
    assert_eq!(lines.len(), 2);
}

#[test]
fn test_config_tab_width() {
    let config = Config::from_toml_str("tab_width = 3\n").unwrap();
    let stream = InputStream::with_config(Cursor::new("\tx = 1\n"), "tab.f90", &config);
    let lines = lex_all(stream);
    assert_eq!(lines[0].lines, vec!["   x = 1\n"]);
    assert_eq!(lines[0].joined_line, "x = 1\n");
}

#[test]
fn test_continuation_limit_is_parse_error() {
    let config = Config {
        max_continuation_lines: 3,
        ..Config::default()
    };
    let input = "x = &\n".repeat(10);
    let mut stream = InputStream::with_config(BufReader::new(input.as_bytes()), "deep.f90", &config);
    let err = stream.next_fortran_line().unwrap_err();
    let lex = err.downcast_ref::<LexError>().unwrap();
    assert_eq!(
        lex.to_string(),
        "deep.f90:4: parse error: logical line starting at line 1 exceeds maximum continuation lines (3)"
    );
}

#[test]
fn test_truncated_at_eof_reported() {
    let mut stream = InputStream::from_string("a = 1\nb = &\n");
    assert!(stream.next_fortran_line().unwrap().is_some());
    assert!(!stream.truncated_at_eof());

    let open = stream.next_fortran_line().unwrap().unwrap();
    assert_eq!(open.lines, vec!["b = &\n"]);
    assert!(stream.truncated_at_eof());

    assert!(stream.next_fortran_line().unwrap().is_none());
}

#[test]
fn test_iterator_collects_results() {
    let stream = InputStream::from_string("a\n\nb\n");
    let lines: Vec<FortranLine> = stream.collect::<Result<_, _>>().unwrap();
    let joined: Vec<&str> = lines.iter().map(|l| l.joined_line.as_str()).collect();
    assert_eq!(joined, vec!["a\n", "\n", "b\n"]);
}

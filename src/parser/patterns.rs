/// Regex patterns shared by the classifier and the line assembler
///
/// All patterns are compiled once on first use via `LazyLock`.
///
/// All regexes use case-insensitive + unicode flags
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

/// Build a case-insensitive regex from a compile-time constant pattern.
///
/// # Panics
///
/// Panics if the pattern is invalid. All patterns in this module are
/// compile-time constants covered by the tests below, so the panic can only
/// fire at first access of a `LazyLock` static during development.
fn build_re(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .unicode(true)
        .build()
        .unwrap_or_else(|_| panic!("Invalid regex pattern: {pattern}"))
}

// ===== NOT-FORTRAN MARKERS =====

// fypp line directives: #! (comment), #: (control), $: (eval), @: (direct call)
const FYPP_LINE_STR: &str = r"^(#!|#:|\$:|@:)";
// C preprocessor: bare # not followed by a fypp character
const CPP_STR: &str = r"^#[^!:{}]";
const COMMENT_LINE_STR: &str = r"^!";
const FYPP_OPEN_STR: &str = r"(#\{|\$\{|@\{)";
const FYPP_CLOSE_STR: &str = r"(\}#|\}\$|\}@)";

/// Start of anything that is not Fortran code: `!` comment, fypp line
/// directive, or C preprocessor line.
pub static NOTFORTRAN_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    build_re(&format!(
        r"({FYPP_LINE_STR}|{CPP_STR}|{COMMENT_LINE_STR})"
    ))
});

pub static FYPP_LINE_RE: LazyLock<Regex> = LazyLock::new(|| build_re(FYPP_LINE_STR));
pub static FYPP_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| build_re(FYPP_OPEN_STR));
pub static FYPP_CLOSE_RE: LazyLock<Regex> = LazyLock::new(|| build_re(FYPP_CLOSE_STR));
pub static CPP_RE: LazyLock<Regex> = LazyLock::new(|| build_re(CPP_STR));

/// Anything that opens a non-code region inside a line
pub static STR_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(&format!(r#"({FYPP_OPEN_STR}|'|"|!)"#)));

// ===== OMP (OpenMP) SENTINELS =====

// OMP directive: "!$OMP"
pub static OMP_DIR_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"^\s*(!\$omp)"));

// OMP conditional compilation: "!$"
pub static OMP_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"^\s*(!\$)"));

// Sentinel stripped before scanning: either of the above, group 1 is the marker.
// Blanks after the marker stay with the sentinel so that the joined line keeps
// its "!$omp parallel" spelling.
pub static OMP_SUBS_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"^\s*(!\$(?:omp)?) *"));

// ===== DECLARATIONS =====

// Variable declarations; capture groups: type, parameters, attributes, dpnt, vars
pub static VAR_DECL_RE: LazyLock<Regex> = LazyLock::new(|| {
    build_re(
        r"^ *(?P<type>integer(?: *\* *[0-9]+)?|logical|character(?: *\* *[0-9]+)?|real(?: *\* *[0-9]+)?|complex(?: *\* *[0-9]+)?|type) *(?P<parameters>\((?:[^()]+|\((?:[^()]+|\([^()]*\))*\))*\))? *(?P<attributes>(?: *, *[a-zA-Z_0-9]+(?: *\((?:[^()]+|\((?:[^()]+|\([^()]*\))*\))*\))?)+)? *(?P<dpnt>::)?(?P<vars>[^\n]+)\n?",
    )
});

// ===== LOOKAHEAD HELPERS =====

/// Up to two chars of `text` starting at byte offset `pos`
#[must_use]
pub fn lookahead(text: &str, pos: usize) -> &str {
    let rest = &text[pos..];
    let end = rest.char_indices().nth(2).map_or(rest.len(), |(i, _)| i);
    &rest[..end]
}

/// Does a lookahead window (up to 2 chars) start a comment, fypp line
/// directive or preprocessor line?
#[must_use]
pub fn is_not_fortran(window: &str) -> bool {
    NOTFORTRAN_LINE_RE.is_match(window)
}

/// Does a lookahead window start a fypp line directive (`#:`, `$:`, `@:`, `#!`)?
#[must_use]
pub fn is_fypp_line(window: &str) -> bool {
    FYPP_LINE_RE.is_match(window)
}

/// Sigil of the fypp inline opener (`#{`, `${`, `@{`) at the start of `window`
#[must_use]
pub fn fypp_open_sigil(window: &str) -> Option<char> {
    FYPP_OPEN_RE
        .find(window)
        .filter(|m| m.start() == 0)
        .and_then(|m| m.as_str().chars().next())
}

/// Is `window` the closer matching an inline span opened with `sigil`?
#[must_use]
pub fn is_fypp_closer(window: &str, sigil: char) -> bool {
    let mut chars = window.chars();
    FYPP_CLOSE_RE.is_match(window) && chars.next() == Some('}') && chars.next() == Some(sigil)
}

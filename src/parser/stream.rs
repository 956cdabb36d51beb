/// `InputStream` - Converts physical lines to logical Fortran lines
///
/// This module handles:
/// - Joining line continuations (lines ending with &)
/// - Splitting semicolon-separated statements
/// - Separating comments, preprocessor and fypp directive text from code
/// - fypp directive continuations (`#:if a &` / `& b`)
/// - OMP conditional sentinels (`!$`, `!$omp`)
///
/// Every physical line is kept verbatim in [`FortranLine::lines`], so
/// concatenating them over the whole stream gives back the input.
use std::collections::VecDeque;
use std::io::{BufRead, BufReader};

use super::char_filter::{CharFilter, ScanState};
use super::patterns::{is_fypp_line, is_not_fortran, lookahead, OMP_SUBS_RE};
use crate::config::Config;
use crate::error::{LexError, Result};

/// A logical Fortran line with associated metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FortranLine {
    /// Code of all contributing physical lines, continuation markers removed
    pub joined_line: String,
    /// Comment / directive text of each physical line ("" if none)
    pub comments: Vec<String>,
    /// The original physical lines (sentinel included)
    pub lines: Vec<String>,
    /// Physical line number the logical line starts on
    pub line_number: usize,
}

/// Conditional-compilation prefix removed from a physical line before scanning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentinel {
    prefix: String,
}

impl Sentinel {
    /// Split a sentinel (`!$`, `!$omp`, any case) off the start of `line`
    #[must_use]
    pub fn split_off(line: &str) -> (Option<Sentinel>, &str) {
        match OMP_SUBS_RE.find(line) {
            Some(m) => (
                Some(Sentinel {
                    prefix: m.as_str().to_string(),
                }),
                &line[m.end()..],
            ),
            None => (None, line),
        }
    }

    /// Exact text removed from the physical line
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Marker and the blanks after it, as written in front of the joined line
    #[must_use]
    pub fn marker(&self) -> &str {
        self.prefix.trim_start()
    }
}

/// Part of a physical line up to a statement boundary
#[derive(Debug, Clone)]
struct Segment {
    text: String,
    /// Byte offset in `text` where code ends and comment text may start
    code_end: usize,
    sentinel: Option<Sentinel>,
    line_nr: usize,
    /// The physical line ended with a newline
    newline: bool,
    /// Segment ends with the `;` that separated it from the next statement
    at_semicolon: bool,
}

/// `InputStream` reads logical Fortran lines from a reader
///
/// Handles line continuations and semicolon splitting
pub struct InputStream<R: BufRead> {
    reader: R,
    filename: String,
    segments: VecDeque<Segment>,
    line_number: usize,
    tab: String,
    max_continuation_lines: usize,
    truncated: bool,
}

impl<R: BufRead> InputStream<R> {
    /// Create a new `InputStream` with default settings
    pub fn new(reader: R) -> Self {
        Self::with_filename(reader, "<input>")
    }

    /// Create a new `InputStream` whose errors name `filename`
    pub fn with_filename(reader: R, filename: &str) -> Self {
        Self::with_config(reader, filename, &Config::default())
    }

    /// Create a new `InputStream`
    ///
    /// # Arguments
    /// * `reader` - The underlying reader
    /// * `filename` - Name used in error messages
    /// * `config` - Tab width and continuation limit
    pub fn with_config(reader: R, filename: &str, config: &Config) -> Self {
        Self {
            reader,
            filename: filename.to_string(),
            segments: VecDeque::new(),
            line_number: 0,
            tab: " ".repeat(config.tab_width),
            max_continuation_lines: config.max_continuation_lines,
            truncated: false,
        }
    }

    /// Number of physical lines read so far
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Whether the last logical line hit end of input while a continuation
    /// was still open
    #[must_use]
    pub fn truncated_at_eof(&self) -> bool {
        self.truncated
    }

    /// Parse error at the current physical line
    #[must_use]
    pub fn parse_error(&self, message: impl Into<String>) -> LexError {
        LexError::parse(message, self.filename.as_str(), self.line_number)
    }

    /// Internal error at the current physical line
    #[must_use]
    pub fn internal_error(&self, message: impl Into<String>) -> LexError {
        LexError::internal(message, self.filename.as_str(), self.line_number)
    }

    /// Read the next logical Fortran line
    ///
    /// Returns None at EOF
    pub fn next_fortran_line(&mut self) -> Result<Option<FortranLine>> {
        let mut joined_line = String::new();
        let mut comments = Vec::new();
        let mut lines = Vec::new();
        let mut line_number = self.line_number + 1;
        let mut continuation = false;
        let mut fypp_cont = false;
        // Open string / inline span carried from the previous physical line
        let mut scan_state = ScanState::Code;

        self.truncated = false;

        loop {
            if self.segments.is_empty() {
                let Some(line) = self.read_physical_line()? else {
                    if lines.is_empty() {
                        return Ok(None);
                    }
                    self.truncated = true;
                    break;
                };
                self.split_line(&line, fypp_cont, &mut scan_state);
            }

            let Some(segment) = self.segments.pop_front() else {
                return Err(self
                    .internal_error("physical line produced no segment")
                    .into());
            };

            if lines.is_empty() {
                line_number = segment.line_nr;
            }

            let text = segment.text.as_str();
            let code_end = segment.code_end.min(text.len());
            let trailing = &text[code_end..];
            let is_comment =
                !trailing.is_empty() && (fypp_cont || is_not_fortran(lookahead(trailing, 0)));

            let (mut code, comment) = if is_comment {
                (&text[..code_end], trailing)
            } else {
                (text, "")
            };
            if segment.at_semicolon {
                code = code.strip_suffix(';').unwrap_or(code);
            }

            let core = code.trim();
            // Blank and comment-only lines inside a continuation keep it open
            if !core.is_empty() {
                continuation = core.ends_with('&');
            }
            if !comment.is_empty() {
                fypp_cont = (fypp_cont || is_fypp_line(lookahead(comment, 0)))
                    && comment.trim().ends_with('&');
            }
            let core = core.trim_matches('&');

            if joined_line.trim().is_empty() {
                joined_line.clear();
                if let Some(sentinel) = &segment.sentinel {
                    joined_line.push_str(sentinel.marker());
                }
            } else {
                let kept = joined_line.trim_end_matches('\n').len();
                joined_line.truncate(kept);
            }
            joined_line.push_str(core);
            if segment.newline && !is_comment {
                joined_line.push('\n');
            }

            let prefix = segment.sentinel.as_ref().map_or("", Sentinel::prefix);
            lines.push(format!("{prefix}{text}"));
            comments.push(comment.trim_end_matches('\n').to_string());

            // Guard against memory exhaustion from pathological inputs
            if lines.len() > self.max_continuation_lines {
                return Err(self
                    .parse_error(format!(
                        "logical line starting at line {line_number} exceeds maximum continuation lines ({})",
                        self.max_continuation_lines
                    ))
                    .into());
            }

            if !(continuation || fypp_cont) {
                break;
            }
        }

        Ok(Some(FortranLine {
            joined_line,
            comments,
            lines,
            line_number,
        }))
    }

    /// Read one physical line with tabs expanded, None at EOF
    fn read_physical_line(&mut self) -> Result<Option<String>> {
        let mut raw_line = String::new();
        if self.reader.read_line(&mut raw_line)? == 0 {
            return Ok(None);
        }
        self.line_number += 1;
        if raw_line.contains('\t') {
            raw_line = raw_line.replace('\t', &self.tab);
        }
        Ok(Some(raw_line))
    }

    /// Queue the segments of one physical line
    ///
    /// A sentinel is attached to the first segment only.
    fn split_line(&mut self, line: &str, fypp_cont: bool, scan_state: &mut ScanState) {
        let line_nr = self.line_number;
        let newline = line.ends_with('\n');
        let (mut sentinel, rest) = Sentinel::split_off(line);
        let len = rest.len();

        let push = |segments: &mut VecDeque<Segment>,
                        text: &str,
                        code_end: usize,
                        sentinel: Option<Sentinel>,
                        at_semicolon: bool| {
            segments.push_back(Segment {
                text: text.to_string(),
                code_end,
                sentinel,
                line_nr,
                newline,
                at_semicolon,
            });
        };

        // Continuation of a fypp directive: the whole line is directive text
        if fypp_cont {
            push(&mut self.segments, rest, 0, sentinel, false);
            return;
        }

        let mut produced = false;
        let mut line_start = 0;
        let mut scan_end = 0;

        let mut filter = CharFilter::with_state(rest, true, true, *scan_state);
        for (pos, c) in filter.by_ref() {
            let next = pos + c.len_utf8();
            scan_end = next;
            let at_semicolon = c == ';';
            if at_semicolon || next == len {
                let text = &rest[line_start..next];
                push(&mut self.segments, text, text.len(), sentinel.take(), at_semicolon);
                produced = true;
                line_start = next;
            }
        }
        *scan_state = filter.carried_state();

        // Stopped before the end: comment / directive marker or an open string
        if scan_end < len {
            if let Some(marker) = find_not_fortran(rest, scan_end) {
                push(
                    &mut self.segments,
                    &rest[line_start..],
                    marker - line_start,
                    sentinel.take(),
                    false,
                );
                produced = true;
                line_start = len;
            }
        }

        if line_start < len || !produced {
            let text = &rest[line_start..];
            push(&mut self.segments, text, text.len(), sentinel.take(), false);
        }
    }
}

/// Byte offset of the first comment / directive marker at or after `from`,
/// skipping strings and fypp inline spans
fn find_not_fortran(line: &str, from: usize) -> Option<usize> {
    CharFilter::new(&line[from..], false, true)
        .map(|(pos, _)| from + pos)
        .find(|&pos| is_not_fortran(lookahead(line, pos)))
}

impl<R: BufRead> Iterator for InputStream<R> {
    type Item = Result<FortranLine>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_fortran_line().transpose()
    }
}

/// Helper to create `InputStream` from a string (for testing)
impl<'a> InputStream<BufReader<&'a [u8]>> {
    #[must_use]
    pub fn from_string(s: &'a str) -> Self {
        let reader = BufReader::new(s.as_bytes());
        Self::new(reader)
    }
}

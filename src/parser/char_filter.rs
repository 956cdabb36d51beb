/// `CharFilter` - Iterator that classifies and filters one line of Fortran
///
/// Wraps the character stream of a line and tracks whether each position is
/// code, inside a string literal, inside a fypp inline span (`#{..}#`,
/// `${..}$`, `@{..}@`) or inside a comment / preprocessor line. Optionally
/// hides strings and inline spans and stops at the first comment, so callers
/// can look at Fortran code only.
use std::str::CharIndices;

use super::patterns::{fypp_open_sigil, is_fypp_closer, is_not_fortran, lookahead};

/// Where the scanner currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanState {
    #[default]
    Code,
    /// Inside a `'...'` or `"..."` literal; holds the delimiter
    InString(char),
    /// Inside a fypp inline span; holds the sigil of the opener (`#`, `$`, `@`)
    InInterpolation(char),
    /// From a `!`, fypp line directive or preprocessor marker to end of line
    InComment,
}

impl ScanState {
    /// String or inline span: content that `filter_strings` hides
    #[must_use]
    pub fn is_quoted(self) -> bool {
        matches!(self, ScanState::InString(_) | ScanState::InInterpolation(_))
    }

    /// State that survives into the next physical line. Comments end with
    /// their line, open strings and inline spans do not.
    #[must_use]
    pub fn carried(self) -> Self {
        match self {
            ScanState::InComment => ScanState::Code,
            other => other,
        }
    }
}

/// Iterator adapter over `(byte_pos, char)` of a single line
///
/// Yields only the positions that are not filtered out. With
/// `filter_comments` set, iteration ends at the first comment marker;
/// [`CharFilter::halted_at`] then reports where.
pub struct CharFilter<'a> {
    content: &'a str,
    chars: CharIndices<'a>,
    state: ScanState,
    filter_comments: bool,
    filter_strings: bool,
    /// Next char is the second half of an inline-span closer
    closer_tail: bool,
    halted_at: Option<usize>,
}

impl<'a> CharFilter<'a> {
    /// Create a new `CharFilter` starting in code
    ///
    /// # Arguments
    /// * `content` - The line to iterate over
    /// * `filter_comments` - Stop at the first comment / directive marker
    /// * `filter_strings` - Hide string literals and fypp inline spans
    #[must_use]
    pub fn new(content: &'a str, filter_comments: bool, filter_strings: bool) -> Self {
        Self::with_state(content, filter_comments, filter_strings, ScanState::Code)
    }

    /// Create a `CharFilter` that resumes in a state carried over from a
    /// previous line (an unterminated string or inline span)
    #[must_use]
    pub fn with_state(
        content: &'a str,
        filter_comments: bool,
        filter_strings: bool,
        state: ScanState,
    ) -> Self {
        Self {
            content,
            chars: content.char_indices(),
            state: state.carried(),
            filter_comments,
            filter_strings,
            closer_tail: false,
            halted_at: None,
        }
    }

    /// Rebind to a new line, keeping an open string or inline span
    pub fn reset_to(&mut self, content: &'a str, filter_comments: bool, filter_strings: bool) {
        self.content = content;
        self.chars = content.char_indices();
        self.state = self.state.carried();
        self.filter_comments = filter_comments;
        self.filter_strings = filter_strings;
        self.closer_tail = false;
        self.halted_at = None;
    }

    #[must_use]
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// State to resume the next physical line with
    #[must_use]
    pub fn carried_state(&self) -> ScanState {
        self.state.carried()
    }

    /// Check if we're currently inside a string or inline span
    #[must_use]
    pub fn instring(&self) -> bool {
        self.state.is_quoted()
    }

    /// Byte offset of the comment marker that ended the scan, if any
    #[must_use]
    pub fn halted_at(&self) -> Option<usize> {
        self.halted_at
    }

    /// Get the filtered content as a string
    pub fn filter_all(&mut self) -> String {
        let mut result = String::with_capacity(self.content.len());
        for (_, c) in self.by_ref() {
            result.push(c);
        }
        result
    }
}

impl Iterator for CharFilter<'_> {
    type Item = (usize, char);

    fn next(&mut self) -> Option<Self::Item> {
        if self.halted_at.is_some() {
            return None;
        }

        loop {
            let (pos, c) = self.chars.next()?;

            // Second char of "}#" / "}$" / "}@" belongs to the span, never reclassify it
            if self.closer_tail {
                self.closer_tail = false;
                return Some((pos, c));
            }

            let window = lookahead(self.content, pos);
            match self.state {
                ScanState::Code => {
                    if let Some(sigil) = fypp_open_sigil(window) {
                        self.state = ScanState::InInterpolation(sigil);
                    } else if is_not_fortran(window) {
                        self.state = ScanState::InComment;
                    } else if c == '\'' || c == '"' {
                        self.state = ScanState::InString(c);
                    }
                }
                ScanState::InInterpolation(sigil) => {
                    if is_fypp_closer(window, sigil) {
                        self.state = ScanState::Code;
                        if self.filter_strings {
                            self.chars.next();
                            continue;
                        }
                        self.closer_tail = true;
                        return Some((pos, c));
                    }
                }
                ScanState::InString(delim) => {
                    if c == delim {
                        self.state = ScanState::Code;
                        if self.filter_strings {
                            continue;
                        }
                    }
                }
                ScanState::InComment => {}
            }

            if self.filter_comments && self.state == ScanState::InComment {
                self.halted_at = Some(pos);
                return None;
            }

            if self.filter_strings && self.state.is_quoted() {
                continue;
            }

            return Some((pos, c));
        }
    }
}

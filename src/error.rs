//! Error types and result aliases for fprettier-lex.
//!
//! This module defines the error handling infrastructure:
//! - [`Result<T>`]: Type alias for `anyhow::Result<T>` used throughout the crate
//! - [`LexError`]: Located errors for input the lexer cannot handle, built by
//!   callers from the filename and line number an
//!   [`InputStream`](crate::parser::InputStream) reports

use anyhow::Result as AnyhowResult;
use thiserror::Error;

pub type Result<T> = AnyhowResult<T>;

/// An error tied to a physical line of a source file
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    /// Malformed input: the source file's fault
    #[error("{filename}:{line_nr}: parse error: {message}")]
    Parse {
        message: String,
        filename: String,
        line_nr: usize,
    },
    /// Input the scanner grammar does not anticipate
    #[error("{filename}:{line_nr}: internal error: {message}")]
    Internal {
        message: String,
        filename: String,
        line_nr: usize,
    },
}

impl LexError {
    #[must_use]
    pub fn parse(message: impl Into<String>, filename: impl Into<String>, line_nr: usize) -> Self {
        LexError::Parse {
            message: message.into(),
            filename: filename.into(),
            line_nr,
        }
    }

    #[must_use]
    pub fn internal(
        message: impl Into<String>,
        filename: impl Into<String>,
        line_nr: usize,
    ) -> Self {
        LexError::Internal {
            message: message.into(),
            filename: filename.into(),
            line_nr,
        }
    }

    #[must_use]
    pub fn filename(&self) -> &str {
        match self {
            LexError::Parse { filename, .. } | LexError::Internal { filename, .. } => filename,
        }
    }

    /// 1-based physical line number
    #[must_use]
    pub fn line_nr(&self) -> usize {
        match self {
            LexError::Parse { line_nr, .. } | LexError::Internal { line_nr, .. } => *line_nr,
        }
    }

    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(self, LexError::Internal { .. })
    }
}

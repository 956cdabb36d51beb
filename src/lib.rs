//! fprettier-lex - Logical-line lexer for Fortran source code
//!
//! Turns physical lines into logical lines (continuations joined, statements
//! split at semicolons, comments and fypp / preprocessor text separated) for
//! the fprettier formatter.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::struct_excessive_bools)]

pub mod cli;
pub mod config;
pub mod error;
pub mod parser;

// Re-export commonly used types
pub use cli::{build_cli, parse_args, parse_args_from, CliArgs};
pub use config::Config;
pub use error::{LexError, Result};
pub use parser::{CharFilter, FortranLine, InputStream};

//! Fortran source line lexing.
//!
//! This module provides the infrastructure for reading and classifying Fortran source:
//! - [`CharFilter`]: Iterator adapter that identifies strings, fypp inline spans,
//!   comments and code regions within one line
//! - [`InputStream`]: Joins continuation lines (`&`), splits semicolon-separated
//!   statements and separates comments into logical lines
//! - [`patterns`]: Precompiled regex patterns shared by both, plus the
//!   variable-declaration grammar
//! - [`decl`]: Typed access to the declaration grammar captures
//!
//! Each logical line keeps its original physical lines so the input can be
//! reproduced exactly.

pub mod char_filter;
pub mod decl;
pub mod patterns;
pub mod stream;

pub use char_filter::{CharFilter, ScanState};
pub use decl::{parse_var_decl, VarDecl};
pub use stream::{FortranLine, InputStream, Sentinel};

//! Typed view of the variable-declaration grammar ([`VAR_DECL_RE`]).
//!
//! Declaration formatting downstream needs the pieces of a declaration
//! statement as written, so every field borrows from the matched line.

use super::patterns::VAR_DECL_RE;

/// Pieces of a declaration such as `real(dp), intent(in) :: x, y`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarDecl<'a> {
    /// Type keyword, possibly with an old-style `*N` length (`integer*8`)
    pub type_spec: &'a str,
    /// Parenthesized kind / length selector right after the type
    pub parameters: Option<&'a str>,
    /// Attribute list including its leading comma (`, dimension(3)`)
    pub attributes: Option<&'a str>,
    /// A `::` separator is present
    pub has_double_colon: bool,
    /// Everything after the separator: the entity list
    pub vars: &'a str,
}

/// Match a declaration statement at the start of `line`
#[must_use]
pub fn parse_var_decl(line: &str) -> Option<VarDecl<'_>> {
    let caps = VAR_DECL_RE.captures(line)?;
    Some(VarDecl {
        type_spec: caps.name("type")?.as_str(),
        parameters: caps.name("parameters").map(|m| m.as_str()),
        attributes: caps.name("attributes").map(|m| m.as_str()),
        has_double_colon: caps.name("dpnt").is_some(),
        vars: caps.name("vars")?.as_str(),
    })
}

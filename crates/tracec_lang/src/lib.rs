//! Lexer, parser, AST, scope resolution, and observation inference for the
//! Trace language (spec §3–§4).
//!
//! This crate owns the front end only. It turns source text into a resolved,
//! observation-annotated AST; [`tracec_compile`] (a separate crate) turns
//! that into LIR text and links it against `tracec_runtime`.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod scope;
pub mod semantics;
pub mod token;

use tracec_base::{Arena, Interner};

/// Lexes, parses, and analyzes one Trace source file, allocating its AST out
/// of `arenas`. Returns the top-level statements alongside the combined
/// front-end diagnostics and the finished [`semantics::Analysis`].
///
/// Errors from every stage are returned rather than short-circuited: a
/// caller printing diagnostics (spec §7) wants to see as many as the bounded
/// error budget collected, not just the first lexer error.
pub fn analyze<'a>(
    source: &str,
    interner: &mut Interner,
    arenas: &'a ast::AstArenas<'a>,
) -> FrontendResult<'a> {
    let (tokens, lex_errors) = lexer::lex(source);
    let (statements, parse_errors) = parser::parse(tokens, interner, arenas);
    let analysis = semantics::analyze(&statements, interner);

    FrontendResult { statements, lex_errors, parse_errors, analysis }
}

/// Everything produced by one front-end run: the parsed program plus
/// diagnostics and semantic analysis from every stage.
pub struct FrontendResult<'a> {
    pub statements: Vec<&'a ast::Stmt<'a>>,
    pub lex_errors: Vec<error::LexError>,
    pub parse_errors: Vec<error::ParseError>,
    pub analysis: semantics::Analysis<'a>,
}

impl<'a> FrontendResult<'a> {
    /// `true` if lexing, parsing, and semantic analysis all completed
    /// without error.
    pub fn is_ok(&self) -> bool {
        self.lex_errors.is_empty() && self.parse_errors.is_empty() && self.analysis.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_reports_no_errors_on_valid_source() {
        let expr_arena = Arena::new();
        let stmt_arena = Arena::new();
        let arenas = ast::AstArenas::new(&expr_arena, &stmt_arena);
        let mut interner = Interner::new();
        let result = analyze("x is 0\nloop while x < 3:\n  x is x + 1\n", &mut interner, &arenas);
        assert!(result.is_ok());
        assert_eq!(result.statements.len(), 2);
    }

    #[test]
    fn analyze_surfaces_lex_and_parse_errors_together() {
        let expr_arena = Arena::new();
        let stmt_arena = Arena::new();
        let arenas = ast::AstArenas::new(&expr_arena, &stmt_arena);
        let mut interner = Interner::new();
        let result = analyze("x is @\n", &mut interner, &arenas);
        assert!(!result.is_ok());
        assert!(!result.lex_errors.is_empty());
    }
}

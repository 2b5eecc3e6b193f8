//! Error taxonomy for the front end (spec §7: `LexError`, `ParseError`,
//! `SemanticError`).
//!
//! Hand-rolled `Display` impls rather than a derive macro, matching how the
//! rest of the toolchain formats diagnostics (`tracec_base::SpannedError`).

use std::fmt;
use tracec_base::Span;

/// Errors raised while turning source bytes into tokens (spec §4.2).
#[derive(Debug, Clone, PartialEq)]
pub enum LexError {
    InvalidCharacter { ch: char, span: Span },
    UnterminatedString { span: Span },
    InvalidEscape { ch: char, span: Span },
    InconsistentIndent { span: Span },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::InvalidCharacter { span, .. }
            | LexError::UnterminatedString { span, .. }
            | LexError::InvalidEscape { span, .. }
            | LexError::InconsistentIndent { span, .. } => *span,
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::InvalidCharacter { ch, span } => write!(f, "invalid character {ch:?} at {span}"),
            LexError::UnterminatedString { span } => write!(f, "unterminated string literal starting at {span}"),
            LexError::InvalidEscape { ch, span } => write!(f, "invalid escape sequence '\\{ch}' at {span}"),
            LexError::InconsistentIndent { span } => {
                write!(f, "indentation uses an inconsistent mix of tabs and spaces at {span}")
            }
        }
    }
}

impl std::error::Error for LexError {}

/// Errors raised while building the AST (spec §4.3 "Failure modes").
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    UnexpectedToken { found: String, expected: String, span: Span },
    UnclosedConstruct { construct: String, span: Span },
    IndentMismatch { span: Span },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::UnexpectedToken { span, .. }
            | ParseError::UnclosedConstruct { span, .. }
            | ParseError::IndentMismatch { span, .. } => *span,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnexpectedToken { found, expected, span } => {
                write!(f, "unexpected token {found} at {span}, expected {expected}")
            }
            ParseError::UnclosedConstruct { construct, span } => {
                write!(f, "unclosed {construct} starting at {span}")
            }
            ParseError::IndentMismatch { span } => {
                write!(f, "indentation mismatch at {span}: expected a multiple of the enclosing block's indent")
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Errors raised during scope resolution and observation inference (spec
/// §4.4, §7).
#[derive(Debug, Clone, PartialEq)]
pub enum SemanticError {
    UnboundName { name: String, span: Span },
    DuplicateDefinition { name: String, first_span: Span, span: Span },
    CyclicImport { module: String, span: Span },
    IllegalAssignmentTarget { description: String, span: Span },
}

impl SemanticError {
    pub fn span(&self) -> Span {
        match self {
            SemanticError::UnboundName { span, .. }
            | SemanticError::DuplicateDefinition { span, .. }
            | SemanticError::CyclicImport { span, .. }
            | SemanticError::IllegalAssignmentTarget { span, .. } => *span,
        }
    }
}

impl fmt::Display for SemanticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticError::UnboundName { name, span } => write!(f, "unbound name '{name}' at {span}"),
            SemanticError::DuplicateDefinition { name, first_span, span } => write!(
                f,
                "'{name}' is defined more than once in the same scope (first at {first_span}, again at {span})"
            ),
            SemanticError::CyclicImport { module, span } => {
                write!(f, "cyclic import detected involving '{module}' at {span}")
            }
            SemanticError::IllegalAssignmentTarget { description, span } => {
                write!(f, "'{description}' is not a valid assignment target at {span}")
            }
        }
    }
}

impl std::error::Error for SemanticError {}

/// The maximum number of accumulated errors before a pass gives up early
/// (spec §7).
pub const MAX_ERRORS: usize = 20;

//! Error taxonomy for code generation and linkage (spec §7: `CodegenError`).
//!
//! Hand-rolled `Display` impls, matching `tracec_lang::error`'s convention
//! (itself grounded in the teacher's hand-rolled `ParseError`).

use std::fmt;
use tracec_base::Span;

/// Errors raised while lowering a resolved AST to LIR text (spec §4.5).
#[derive(Debug, Clone, PartialEq)]
pub enum CodegenError {
    /// A builtin or language construct this generator does not lower —
    /// spec §7 anticipates this kind explicitly ("unsupported construct").
    UnsupportedConstruct { what: String, span: Span },
    /// A call site referencing a name that isn't callable (not a function,
    /// not a callable builtin).
    NotCallable { name: String, span: Span },
    /// Invariant violated by an upstream pass — surfaced here rather than
    /// panicking, matching the toolchain's "no panics across a pass
    /// boundary" discipline.
    Internal { message: String, span: Span },
}

impl CodegenError {
    pub fn span(&self) -> Span {
        match self {
            CodegenError::UnsupportedConstruct { span, .. }
            | CodegenError::NotCallable { span, .. }
            | CodegenError::Internal { span, .. } => *span,
        }
    }
}

impl fmt::Display for CodegenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodegenError::UnsupportedConstruct { what, span } => {
                write!(f, "unsupported construct '{what}' at {span}")
            }
            CodegenError::NotCallable { name, span } => {
                write!(f, "'{name}' is not callable at {span}")
            }
            CodegenError::Internal { message, span } => {
                write!(f, "internal error: {message} at {span}")
            }
        }
    }
}

impl std::error::Error for CodegenError {}

/// Errors raised while ordering and linking compilation units (spec §4.6).
#[derive(Debug, Clone, PartialEq)]
pub enum LinkError {
    CyclicImport { units: Vec<String> },
    UnknownImport { unit: String, imported: String },
    MissingEntry { entry: String },
    ToolchainUnavailable { tool: String, reason: String },
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkError::CyclicImport { units } => {
                write!(f, "cyclic import detected among units: {}", units.join(" -> "))
            }
            LinkError::UnknownImport { unit, imported } => {
                write!(f, "unit '{unit}' imports unknown unit '{imported}'")
            }
            LinkError::MissingEntry { entry } => {
                write!(f, "entry unit '{entry}' not found among the compiled units")
            }
            LinkError::ToolchainUnavailable { tool, reason } => {
                write!(f, "external toolchain '{tool}' unavailable: {reason}")
            }
        }
    }
}

impl std::error::Error for LinkError {}

/// Everything that can go wrong across a full `compile_sources` call,
/// aggregating every pass's error kind behind one type the driver can sort
/// and print uniformly (spec §7 "the driver aggregates these into a sorted
/// diagnostic list").
#[derive(Debug, Clone, PartialEq)]
pub enum CompileError {
    Lex(tracec_lang::error::LexError),
    Parse(tracec_lang::error::ParseError),
    Semantic(tracec_lang::error::SemanticError),
    Codegen(CodegenError),
    Link(LinkError),
}

impl CompileError {
    pub fn span(&self) -> Span {
        match self {
            CompileError::Lex(e) => e.span(),
            CompileError::Parse(e) => e.span(),
            CompileError::Semantic(e) => e.span(),
            CompileError::Codegen(e) => e.span(),
            CompileError::Link(_) => Span::default(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CompileError::Lex(_) => "LexError",
            CompileError::Parse(_) => "ParseError",
            CompileError::Semantic(_) => "SemanticError",
            CompileError::Codegen(_) => "CodegenError",
            CompileError::Link(_) => "LinkError",
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Lex(e) => write!(f, "{e}"),
            CompileError::Parse(e) => write!(f, "{e}"),
            CompileError::Semantic(e) => write!(f, "{e}"),
            CompileError::Codegen(e) => write!(f, "{e}"),
            CompileError::Link(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CompileError {}

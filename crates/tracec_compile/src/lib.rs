//! Code generation, linkage, and the compile-driver facade for the Trace
//! language (spec §4.5–§4.7).
//!
//! Turns the resolved, observation-annotated AST `tracec_lang` produces
//! into LIR text, links multiple compilation units together, and exposes
//! the `compile`/`assemble` facade a CLI or playground calls.

pub mod artifact;
pub mod codegen;
pub mod compile;
pub mod error;
pub mod linkage;

pub use artifact::{Artifact, CompileOptions, Mode, OptLevel, Target};
pub use compile::{assemble, compile_sources};
pub use error::CompileError;

#![cfg_attr(docsrs, feature(doc_cfg))]

//! # tracec-base
//!
//! Pure structural atoms for the Trace toolchain.
//!
//! This crate provides the foundational types used throughout every
//! compiler pass:
//!
//! - [`Arena`] — bump allocation for stable AST references
//! - [`Interner`]/[`Symbol`] — string interning for O(1) equality
//! - [`Span`] — source location tracking
//! - [`SpannedError`]/[`Result`] — errors with source positions
//!
//! # Design Principles
//!
//! This crate has **no knowledge of Trace syntax or semantics**. It provides
//! only generic, reusable infrastructure that higher-level crates build upon.
//!
//! # Example
//!
//! ```
//! use tracec_base::{Arena, Interner, Span};
//!
//! let arena: Arena<&str> = Arena::new();
//! let mut interner = Interner::new();
//!
//! let hello = interner.intern("hello");
//! let span = Span::new(0, 5);
//!
//! let allocated = arena.alloc("hello");
//! assert_eq!(*allocated, "hello");
//! ```

pub mod arena;
pub mod error;
pub mod intern;
pub mod span;

pub use arena::Arena;
pub use error::{Result, SpannedError};
pub use intern::{Interner, Symbol, SymbolEq};
pub use span::Span;

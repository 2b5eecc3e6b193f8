//! `tracec`: the command-line driver for the Trace compiler (spec §6.4).
//!
//! A thin façade over [`tracec_compile::compile`]: parses flags, resolves
//! an optional `trace.toml` manifest, reads source files, and maps the
//! driver's outcome onto the exit codes spec §6.4 defines. All compiler
//! logic lives in `tracec_lang`/`tracec_compile`; this crate only adapts
//! that logic to a process boundary, matching how the teacher keeps
//! `logicaffeine_cli` a thin wrapper around `logicaffeine_compile`.

pub mod cli;
pub mod manifest;

pub use cli::run_cli;

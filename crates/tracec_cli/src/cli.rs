//! `tracec` command-line argument parsing and dispatch (spec §6.4).
//!
//! Built on [`clap`]'s derive API, grounded in the teacher's
//! `logicaffeine_cli::cli::Cli`/`Commands` (a `Parser` struct delegating to
//! a `Subcommand` enum, one handler function per variant). Trace's surface
//! is a single `compile` command rather than the teacher's full project/
//! registry command set (spec §1 scopes the CLI itself out of core, but
//! §6.4 still names its exact flag surface, so that surface is what's
//! implemented here).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use tracec_compile::artifact::{CompileOptions, Mode, OptLevel, Target};
use tracec_compile::compile::{assemble, compile_sources};
use tracec_compile::error::CompileError;

use crate::manifest;

#[derive(Parser)]
#[command(name = "tracec")]
#[command(about = "The Trace language compiler", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile a Trace source file (or project directory) to linked LIR text.
    Compile {
        /// Entry source file, or a directory containing `trace.toml`.
        input: PathBuf,

        /// Output path for the linked LIR (or bundle, for `--target wasm32`).
        /// Defaults to the input's file stem with a `.ll` extension.
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,

        /// Compilation target: host, wasm32, aarch64, arm, x86_64.
        #[arg(long = "target")]
        target: Option<String>,

        /// Emit library mode (suppresses the `main` wrapper, spec §4.5.7).
        #[arg(long = "lib")]
        lib: bool,

        /// Optimization level 0-3 (spec §6.4 `-O<n>`); recorded in the
        /// artifact but does not change LIR shape (no optimizer in this
        /// version of the pipeline).
        #[arg(short = 'O', value_name = "N")]
        opt: Option<u8>,

        /// Print one diagnostic line per pass boundary to stderr (spec §4.8).
        #[arg(short = 'v', long = "verbose")]
        verbose: bool,
    },
}

/// Parses `std::env::args`, dispatches, and returns the process exit code
/// per spec §6.4: `0` success, `1` source error, `2` internal error, `3`
/// toolchain error.
pub fn run_cli() -> ExitCode {
    let cli = Cli::parse();
    match cli.command {
        Commands::Compile { input, output, target, lib, opt, verbose } => {
            run_compile(&input, output.as_deref(), target.as_deref(), lib, opt, verbose)
        }
    }
}

fn parse_target(name: &str) -> Option<Target> {
    match name {
        "host" => Some(Target::Host),
        "wasm32" => Some(Target::Wasm32),
        "aarch64" => Some(Target::Aarch64),
        "arm" => Some(Target::Arm),
        "x86_64" => Some(Target::X86_64),
        _ => None,
    }
}

fn run_compile(
    input: &Path,
    output: Option<&Path>,
    target_flag: Option<&str>,
    lib_flag: bool,
    opt_flag: Option<u8>,
    verbose: bool,
) -> ExitCode {
    let (project_dir, entry, manifest) = match resolve_entry(input) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("tracec: {e}");
            return ExitCode::from(2);
        }
    };

    let target = target_flag
        .or(manifest.as_ref().and_then(|m| m.package.target.as_deref()))
        .map(parse_target)
        .unwrap_or(Some(Target::Host));
    let target = match target {
        Some(t) => t,
        None => {
            eprintln!("tracec: unknown target '{}'", target_flag.unwrap_or(""));
            return ExitCode::from(2);
        }
    };
    let mode = if lib_flag || manifest.as_ref().map(|m| m.package.library).unwrap_or(false) {
        Mode::Library
    } else {
        Mode::Program
    };
    let optimization = opt_flag.or(manifest.as_ref().and_then(|m| m.package.optimization)).unwrap_or(0);

    let options = CompileOptions { target, mode, optimization: OptLevel(optimization), verbose };

    let sources = match collect_sources(&project_dir, &entry) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("tracec: {e}");
            return ExitCode::from(2);
        }
    };

    match compile_sources(&sources, &entry, &options) {
        Ok(artifact) => {
            let bytes = assemble(&artifact, target);
            let out_path = output.map(Path::to_path_buf).unwrap_or_else(|| default_output_path(&entry));
            if let Err(e) = fs::write(&out_path, &bytes) {
                eprintln!("tracec: writing {}: {e}", out_path.display());
                return ExitCode::from(3);
            }
            if verbose {
                eprintln!("tracec: wrote {} bytes to {}", bytes.len(), out_path.display());
            }
            ExitCode::SUCCESS
        }
        Err(errors) => {
            print_diagnostics(&entry, &errors);
            ExitCode::from(1)
        }
    }
}

/// Resolves `input` (a file or a project directory) into the directory
/// sources are read relative to, the entry source path, and an optional
/// loaded manifest (spec §4.9).
fn resolve_entry(input: &Path) -> Result<(PathBuf, PathBuf, Option<manifest::Manifest>), String> {
    if input.is_dir() {
        let m = manifest::load(input).map_err(|e| format!("loading trace.toml: {e}"))?;
        let manifest = m.unwrap_or_default();
        let entry = manifest::entry_path(input, &manifest);
        Ok((input.to_path_buf(), entry, Some(manifest)))
    } else {
        let dir = input.parent().map(Path::to_path_buf).unwrap_or_default();
        let manifest = manifest::load(&dir).map_err(|e| format!("loading trace.toml: {e}"))?;
        Ok((dir, input.to_path_buf(), manifest))
    }
}

/// Reads the entry unit and every `.trace` file alongside it in the same
/// directory tree, matching spec §4.7's `unit_sources: map<path, bytes>`
/// multi-file contract. A single-file compile (no sibling `.trace` files)
/// is the common case and reads just the entry.
fn collect_sources(dir: &Path, entry: &Path) -> Result<BTreeMap<PathBuf, String>, String> {
    let mut sources = BTreeMap::new();
    if dir.is_dir() {
        for entry_result in walk_trace_files(dir) {
            let path = entry_result?;
            let text = fs::read_to_string(&path).map_err(|e| format!("reading {}: {e}", path.display()))?;
            sources.insert(path, text);
        }
    }
    if !sources.contains_key(entry) {
        let text = fs::read_to_string(entry).map_err(|e| format!("reading {}: {e}", entry.display()))?;
        sources.insert(entry.to_path_buf(), text);
    }
    Ok(sources)
}

fn walk_trace_files(dir: &Path) -> Vec<Result<PathBuf, String>> {
    let mut out = Vec::new();
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return out,
    };
    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                out.push(Err(e.to_string()));
                continue;
            }
        };
        let path = entry.path();
        if path.is_dir() {
            out.extend(walk_trace_files(&path));
        } else if path.extension().and_then(|e| e.to_str()) == Some("trace") {
            out.push(Ok(path));
        }
    }
    out
}

fn default_output_path(entry: &Path) -> PathBuf {
    entry.with_extension("ll")
}

/// Prints the accumulated diagnostic list sorted by source position, in the
/// "file:line:col: kind: message" format spec §7 mandates. Every diagnostic
/// collected here originates from a single `compile_sources` call keyed to
/// one entry file; cross-unit diagnostics don't yet carry their own unit
/// name (spec's `CompileError` variants carry only a `Span`), so `entry` is
/// used as the reported file for all of them.
fn print_diagnostics(entry: &Path, errors: &[CompileError]) {
    let mut sorted: Vec<&CompileError> = errors.iter().collect();
    sorted.sort_by_key(|e| (e.span().line, e.span().col));
    for error in sorted {
        let span = error.span();
        println!("{}:{}:{}: {}: {error}", entry.display(), span.line, span.col, error.kind());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_path_swaps_extension() {
        let p = default_output_path(Path::new("demo/main.trace"));
        assert_eq!(p, PathBuf::from("demo/main.ll"));
    }

    #[test]
    fn parse_target_recognizes_all_five() {
        for name in ["host", "wasm32", "aarch64", "arm", "x86_64"] {
            assert!(parse_target(name).is_some(), "{name} should parse");
        }
        assert!(parse_target("bogus").is_none());
    }
}

//! The driver facade exposed to a CLI or a playground (spec §4.7): lex,
//! parse, and analyze every source unit; generate and link their LIR; hand
//! the linked text to [`assemble`] for packaging.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracec_base::{Arena, Interner};
use tracec_lang::ast::AstArenas;

use crate::artifact::{Artifact, CompileOptions, Mode, Target};
use crate::codegen::{self, UnitOutput};
use crate::error::{CompileError, LinkError};
use crate::linkage::{self, UnitManifest};

/// Derives a unit's name from its source path: the file stem, so
/// `project/geometry.trace` and `geometry.trace` both name the unit
/// `geometry` (matching the cross-module import syntax `from geometry
/// import ...`, which names units by that same bare identifier).
fn unit_name_for(path: &Path) -> String {
    path.file_stem().and_then(|s| s.to_str()).unwrap_or("unit").to_string()
}

/// Runs the front end and code generator over one unit's source text.
/// Every diagnostic and the codegen'd text are fully owned by the time this
/// returns — the arena and interner backing the AST are scoped to this
/// function and dropped at its end.
fn compile_one_unit(name: &str, source: &str, is_entry: bool, options: &CompileOptions) -> (Vec<CompileError>, Option<UnitOutput>) {
    let mut interner = Interner::new();
    let expr_arena = Arena::new();
    let stmt_arena = Arena::new();
    let arenas = AstArenas::new(&expr_arena, &stmt_arena);

    let result = tracec_lang::analyze(source, &mut interner, &arenas);

    let mut errors: Vec<CompileError> = Vec::new();
    errors.extend(result.lex_errors.iter().cloned().map(CompileError::Lex));
    errors.extend(result.parse_errors.iter().cloned().map(CompileError::Parse));
    errors.extend(result.analysis.errors.iter().cloned().map(CompileError::Semantic));

    if !result.is_ok() {
        return (errors, None);
    }

    if options.verbose {
        eprintln!("tracec: unit `{name}` passed semantic analysis ({} slots)", result.analysis.slot_count);
    }

    match codegen::generate_unit(name, &result.statements, &result.analysis, &interner, options.mode, is_entry) {
        Ok(output) => {
            if options.verbose {
                eprintln!("tracec: unit `{name}` generated ({} bytes of LIR)", output.lir.len());
            }
            (errors, Some(output))
        }
        Err(codegen_errors) => {
            errors.extend(codegen_errors.into_iter().map(CompileError::Codegen));
            (errors, None)
        }
    }
}

/// Compiles every unit in `unit_sources`, links them, and returns the
/// finished [`Artifact`] — or the full sorted set of diagnostics collected
/// across every failing unit (spec §4.7).
pub fn compile_sources(
    unit_sources: &BTreeMap<PathBuf, String>,
    entry: &Path,
    options: &CompileOptions,
) -> Result<Artifact, Vec<CompileError>> {
    let mut all_errors = Vec::new();
    let mut outputs = Vec::new();

    if !unit_sources.contains_key(entry) {
        all_errors.push(CompileError::Link(LinkError::MissingEntry { entry: entry.display().to_string() }));
    }

    for (path, source) in unit_sources {
        let name = unit_name_for(path);
        let is_entry = path == entry;
        if options.verbose {
            eprintln!("tracec: compiling unit `{name}` from {}", path.display());
        }
        let (errors, output) = compile_one_unit(&name, source, is_entry, options);
        all_errors.extend(errors);
        if let Some(o) = output {
            outputs.push(o);
        }
    }

    if !all_errors.is_empty() {
        return Err(all_errors);
    }

    if options.verbose {
        eprintln!("tracec: linking {} unit(s)", outputs.len());
    }

    let manifests: Vec<UnitManifest> =
        outputs.iter().map(|o| UnitManifest { name: o.name.clone(), imports: o.imports.clone() }).collect();
    let unit_order = match linkage::order_units(&manifests) {
        Ok(order) => order,
        Err(e) => return Err(vec![CompileError::Link(e)]),
    };

    let by_name: BTreeMap<String, &UnitOutput> = outputs.iter().map(|o| (o.name.clone(), o)).collect();

    let mut lir_text = String::new();
    let mut exports = BTreeMap::new();
    let mut imports = BTreeMap::new();
    for name in &unit_order {
        let unit = by_name[name];
        lir_text.push_str(&unit.lir);
        lir_text.push('\n');
        exports.insert(name.clone(), unit.exports.clone());
        imports.insert(name.clone(), unit.imports.clone());
    }

    Ok(Artifact { lir_text, exports, imports, unit_order, object: None })
}

/// Packages a linked [`Artifact`] for handoff to an external toolchain
/// (spec §4.6 "the final artifact is either (a) a textual assembly file...
/// or (b) a portable bytecode module for a sandboxed target"). For a
/// sandboxed target the embedded C runtime (`tracec_runtime::emit`) is
/// bundled alongside the LIR text, since a wasm toolchain has no prebuilt
/// native staticlib to link against; for every other target the caller is
/// expected to link the produced object against `tracec_runtime` directly.
pub fn assemble(artifact: &Artifact, target: Target) -> Vec<u8> {
    match target {
        Target::Wasm32 => {
            let mut bundle = String::with_capacity(tracec_runtime::emit::C_RUNTIME.len() + artifact.lir_text.len() + 32);
            bundle.push_str(tracec_runtime::emit::C_RUNTIME);
            bundle.push_str("\n/* ---- linked LIR module ---- */\n");
            bundle.push_str(&artifact.lir_text);
            bundle.into_bytes()
        }
        Target::Host | Target::Aarch64 | Target::Arm | Target::X86_64 => artifact.lir_text.clone().into_bytes(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> CompileOptions {
        CompileOptions { target: Target::Host, mode: Mode::Program, optimization: crate::artifact::OptLevel(0), verbose: false }
    }

    #[test]
    fn compiles_a_single_unit_program() {
        let mut sources = BTreeMap::new();
        let entry = PathBuf::from("main.trace");
        sources.insert(entry.clone(), "x is 42\nprint of x\n".to_string());
        let artifact = compile_sources(&sources, &entry, &options()).expect("should compile");
        assert!(artifact.lir_text.contains("define i32 @main()"));
        assert!(artifact.lir_text.contains("call void @print_f64"));
        assert_eq!(artifact.unit_order, vec!["main".to_string()]);
    }

    #[test]
    fn library_mode_suppresses_main() {
        let mut sources = BTreeMap::new();
        let entry = PathBuf::from("lib.trace");
        sources.insert(entry.clone(), "x is 42\n".to_string());
        let mut opts = options();
        opts.mode = Mode::Library;
        let artifact = compile_sources(&sources, &entry, &opts).expect("should compile");
        assert!(!artifact.lir_text.contains("@main"));
    }

    #[test]
    fn missing_entry_is_reported() {
        let sources = BTreeMap::new();
        let entry = PathBuf::from("ghost.trace");
        let errors = compile_sources(&sources, &entry, &options()).unwrap_err();
        assert!(errors.iter().any(|e| matches!(e, CompileError::Link(LinkError::MissingEntry { .. }))));
    }

    #[test]
    fn lex_errors_surface_without_generating_code() {
        let mut sources = BTreeMap::new();
        let entry = PathBuf::from("bad.trace");
        sources.insert(entry.clone(), "x is @\n".to_string());
        let errors = compile_sources(&sources, &entry, &options()).unwrap_err();
        assert!(errors.iter().any(|e| matches!(e, CompileError::Lex(_))));
    }

    #[test]
    fn assemble_bundles_the_runtime_for_wasm() {
        let mut sources = BTreeMap::new();
        let entry = PathBuf::from("main.trace");
        sources.insert(entry.clone(), "print of 1\n".to_string());
        let artifact = compile_sources(&sources, &entry, &options()).unwrap();
        let bytes = assemble(&artifact, Target::Wasm32);
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("trace_cell_push_history") || text.contains("cell_create"));
    }

    #[test]
    fn assemble_for_host_is_just_the_lir_text() {
        let mut sources = BTreeMap::new();
        let entry = PathBuf::from("main.trace");
        sources.insert(entry.clone(), "print of 1\n".to_string());
        let artifact = compile_sources(&sources, &entry, &options()).unwrap();
        let bytes = assemble(&artifact, Target::Host);
        assert_eq!(String::from_utf8(bytes).unwrap(), artifact.lir_text);
    }
}

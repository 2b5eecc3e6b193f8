//! The compiled output of a `compile_sources`/`compile_project` call (spec
//! §4.7, §6.5).

use std::collections::BTreeMap;

/// Compilation target, mirroring spec §4.7's `options.target` enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Host,
    Wasm32,
    Aarch64,
    Arm,
    X86_64,
}

impl Target {
    pub fn as_str(self) -> &'static str {
        match self {
            Target::Host => "host",
            Target::Wasm32 => "wasm32",
            Target::Aarch64 => "aarch64",
            Target::Arm => "arm",
            Target::X86_64 => "x86_64",
        }
    }
}

/// Library vs program mode (spec §4.5.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Program,
    Library,
}

/// Optimization level, `-O0`..`-O3` (spec §6.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptLevel(pub u8);

/// Options threaded through `compile_sources`/`compile_project` (spec §4.7).
#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub target: Target,
    pub mode: Mode,
    pub optimization: OptLevel,
    /// Prints one line per pass boundary to stderr when set (§4.8 — the
    /// ambient logging convention this workspace uses instead of a tracing
    /// crate).
    pub verbose: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions { target: Target::Host, mode: Mode::Program, optimization: OptLevel(0), verbose: false }
    }
}

/// The linked, ready-to-assemble output of a compilation (spec §4.7
/// "Artifact contains the LIR text, optionally an assembled object, and a
/// manifest of imports/exports").
#[derive(Debug, Clone)]
pub struct Artifact {
    /// The final, linked LIR text (all units plus the `main`/library
    /// wrapper).
    pub lir_text: String,
    /// Per-unit export lists (cross-module-linkable global/function names),
    /// keyed by unit name, sorted for deterministic output.
    pub exports: BTreeMap<String, Vec<String>>,
    /// Per-unit import lists.
    pub imports: BTreeMap<String, Vec<String>>,
    /// The unit initialization order computed by linkage (spec §4.6
    /// topological sort).
    pub unit_order: Vec<String>,
    /// Populated by `assemble` once a native object has been produced;
    /// `None` for a `compile`-only artifact.
    pub object: Option<Vec<u8>>,
}

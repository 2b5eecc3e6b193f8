//! End-to-end scenarios from spec §8's concrete table, driven through the
//! full `tracec_lang::analyze` → `tracec_compile::codegen::generate_unit`
//! pipeline. Grounded in the teacher's `tests/integration_tests.rs` /
//! `tests/e2e_*.rs` convention: one file of black-box tests per pipeline,
//! separate from the per-module `#[cfg(test)]` unit tests.
//!
//! There is no assembler or native linker in this workspace (spec §4.6
//! hands the final artifact to an *external* toolchain), so "expected
//! standard output" is checked structurally: each scenario's LIR is
//! inspected for the call sequence that would produce that output when
//! linked against `tracec-runtime` and assembled.

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracec_compile::artifact::{CompileOptions, Mode, OptLevel, Target};
use tracec_compile::compile::compile_sources;

fn compile(source: &str) -> String {
    let mut sources = BTreeMap::new();
    let entry = PathBuf::from("main.trace");
    sources.insert(entry.clone(), source.to_string());
    let options = CompileOptions { target: Target::Host, mode: Mode::Program, optimization: OptLevel(0), verbose: false };
    compile_sources(&sources, &entry, &options).expect("scenario should compile").lir_text
}

/// Scenario 1: `x is 42\nprint of x` → `42.0`. `x` is never compared or
/// interrogated, so it stays a plain double — `print` reads it straight
/// from its alloca rather than through a Cell.
#[test]
fn scenario_1_print_of_plain_literal() {
    let lir = compile("x is 42\nprint of x\n");
    assert!(lir.contains("call void @print_f64"));
    assert!(!lir.contains("call void @cell_init"), "x is never observed, so no Cell should be allocated for it");
}

/// Scenario 2: `define f as:\n  return arg + 1\nprint of (f of 41)` → `42.0`.
#[test]
fn scenario_2_function_call_and_print() {
    let lir = compile("define f as:\n  return arg + 1\nprint of (f of 41)\n");
    assert!(lir.contains("define double @"), "f should lower to a double-returning function");
    assert!(lir.contains("call double @"), "the call site should invoke the generated function");
    assert!(lir.contains("call void @print_f64"));
}

/// Scenario 3: recursive factorial → `120.0`. Exercises self-recursion
/// through the same `call double @<name>` path as any other function call.
#[test]
fn scenario_3_recursive_factorial() {
    let lir = compile(
        "define fact as:\n  if arg = 0:\n    return 1\n  return arg * (fact of (arg - 1))\nprint of (fact of 5)\n",
    );
    assert!(lir.contains("define double @"));
    // The recursive call and the outer `fact of 5` call both lower to the
    // same instruction shape; at least two call sites into the function.
    let call_count = lir.matches("call double @").count();
    assert!(call_count >= 2, "expected at least the recursive call plus the entry call, got {call_count}");
    assert!(lir.contains("call void @print_f64"));
}

/// Scenario 4: `nums is [10, 20, 30]\nprint of nums[1]` → `20.0`.
#[test]
fn scenario_4_list_literal_and_index() {
    let lir = compile("nums is [10, 20, 30]\nprint of nums[1]\n");
    assert!(lir.contains("call ptr @list_create(i64 3)"));
    assert!(lir.contains("call void @list_set(ptr"));
    assert!(lir.contains("call double @list_get(ptr"));
    assert!(lir.contains("call void @print_f64"));
}

/// Scenario 5: `x is 0\nloop while not converged:\n  x is x + (1 - x) *
/// 0.5\nprint of x` converges toward `1.0`. `x` is interrogated by
/// `converged`, so it must be lifted to an observed Cell.
#[test]
fn scenario_5_converged_predicate_lifts_observed_cell() {
    let lir = compile("x is 0\nloop while not converged:\n  x is x + (1 - x) * 0.5\nprint of x\n");
    assert!(lir.contains("call void @cell_init"), "x is interrogated by `converged`, so it must be observed");
    assert!(lir.contains("call i1 @converged") || lir.contains("call i1 @converged("));
    assert!(lir.contains("call void @cell_update"), "each loop body assignment to x should update its Cell");
    assert!(lir.contains("call void @print_f64"));
}

/// Scenario 6: `a is 0\nloop while a < 3:\n  a is a + 1\nprint of a` → `3.0`.
/// `a` is compared (`<`), which alone is enough to make it observed (spec
/// §3.7(b)), even though no predicate or interrogative ever names it.
#[test]
fn scenario_6_comparison_alone_lifts_observed_cell() {
    let lir = compile("a is 0\nloop while a < 3:\n  a is a + 1\nprint of a\n");
    assert!(lir.contains("call void @cell_init"), "a is compared, so it must be observed per spec §3.7(b)");
    assert!(lir.contains("call double @cell_value"), "reading a in a comparison or print goes through cell_value");
    assert!(lir.contains("call void @print_f64"));
}

/// Library mode suppresses `main` even for a source program that would
/// otherwise run top-level statements (spec §4.5.7).
#[test]
fn library_mode_has_no_main_wrapper() {
    let mut sources = BTreeMap::new();
    let entry = PathBuf::from("lib.trace");
    sources.insert(entry.clone(), "x is 1\nprint of x\n".to_string());
    let options = CompileOptions { target: Target::Host, mode: Mode::Library, optimization: OptLevel(0), verbose: false };
    let artifact = compile_sources(&sources, &entry, &options).unwrap();
    assert!(!artifact.lir_text.contains("@main"));
    assert!(artifact.lir_text.contains("__init_unit_"));
}

/// A non-entry unit's top-level statements still execute (via its own
/// `__init_unit_*`, called in import order) even though `main` lives in the
/// entry unit (spec §4.5.6).
#[test]
fn multi_unit_program_orders_initializers_by_import() {
    let mut sources = BTreeMap::new();
    let geometry = PathBuf::from("geometry.trace");
    let main = PathBuf::from("main.trace");
    sources.insert(geometry.clone(), "shared is 2\n".to_string());
    sources.insert(main.clone(), "from geometry import shared\nprint of shared\n".to_string());
    let options = CompileOptions { target: Target::Host, mode: Mode::Program, optimization: OptLevel(0), verbose: false };
    let artifact = compile_sources(&sources, &main, &options).expect("multi-unit program should compile and link");
    assert_eq!(artifact.unit_order, vec!["geometry".to_string(), "main".to_string()]);
    assert!(artifact.lir_text.contains("__init_unit_geometry"));
    assert!(artifact.lir_text.contains("__init_unit_main"));
}

/// An import cycle is rejected rather than silently accepted (spec §4.6,
/// §8 property 7).
#[test]
fn cyclic_import_is_rejected() {
    let mut sources = BTreeMap::new();
    let a = PathBuf::from("a.trace");
    let b = PathBuf::from("b.trace");
    sources.insert(a.clone(), "from b import thing\n".to_string());
    sources.insert(b.clone(), "from a import other\n".to_string());
    let options = CompileOptions::default();
    let errors = compile_sources(&sources, &a, &options).unwrap_err();
    assert!(errors.iter().any(|e| matches!(e, tracec_compile::error::CompileError::Link(
        tracec_compile::error::LinkError::CyclicImport { .. }
    ))));
}

//! Lowers one resolved, observation-annotated compilation unit to LIR text
//! (spec §4.5).
//!
//! Shaped after the teacher's `codegen_c::CContext` — a struct threading a
//! symbol-keyed table and an output string buffer through a recursive
//! statement/expression walk (`logicaffeine_compile::codegen_c`) —
//! generalized from emitting C source text to emitting `%`-prefixed SSA
//! register LIR text, and from the teacher's declared-*type* table to a
//! declared-*representation* table (stack double vs `Cell*`, spec §4.5.1).
//! `infer_value_shape` below plays the same role the teacher's
//! `infer_expr_type` does: a structural, one-pass guess from the shape of an
//! expression, good enough because nothing downstream re-checks it against
//! a real type system.

use std::collections::HashMap;
use std::fmt::Write as _;

use tracec_base::{Span, Symbol};
use tracec_lang::ast::{BinOp, Expr, Interrogative, Literal, Stmt, UnOp};
use tracec_lang::scope::{Binding, Builtin, SlotId};
use tracec_lang::semantics::Analysis;

use crate::artifact::Mode;
use crate::error::CodegenError;

/// Every runtime ABI symbol a generated module may call (spec §6.2),
/// mirrored from `tracec_runtime::emit`'s embedded-runtime symbol list so
/// the two stay honest about what the runtime actually exports.
pub const RUNTIME_SYMBOLS: &[&str] = &[
    "cell_create",
    "cell_init",
    "cell_update",
    "cell_value",
    "cell_gradient",
    "cell_stability",
    "cell_iteration",
    "converged",
    "diverging",
    "oscillating",
    "stable",
    "improving",
    "list_create",
    "list_get",
    "list_set",
    "list_append",
    "list_length",
    "list_destroy",
    "string_create",
    "string_destroy",
    "string_length",
    "string_char_at",
    "string_substring",
    "string_concat",
    "string_append_char",
    "string_compare",
    "string_equals",
    "string_find",
    "number_to_string",
    "string_to_number",
    "char_to_string",
    "print_f64",
];

/// A small set of libm intrinsics the math builtins (`abs`, `sqrt`, `pow`,
/// `floor`, `ceil`) lower directly to, since spec §6.2's runtime ABI table
/// doesn't cover them — they're plain doubles-in-doubles-out, no Cell/List
/// involvement, so there's no reason to route them through `tracec_runtime`.
const LIBM_SYMBOLS: &[&str] = &["fabs", "sqrt", "pow", "floor", "ceil"];

/// Name prefixes that mark a top-level assignment target as shared across
/// units (spec §4.5.6). `shared_` is this implementation's reading of the
/// spec's otherwise syntax-free "any explicit `shared` declaration" — the
/// source language has no `shared` keyword, so a name prefix is the only
/// surface a pure assignment statement can carry that intent on (see
/// DESIGN.md).
const SHARED_PREFIXES: &[&str] = &["lex_", "ast_", "parser_token_", "shared_"];

fn is_shared_global(name: &str) -> bool {
    SHARED_PREFIXES.iter().any(|p| name.starts_with(p))
}

/// Replaces any byte outside `[A-Za-z0-9_]` with `_`. Trace identifiers are
/// already restricted to that alphabet (spec §6.1), so this only guards
/// against the unlikely case of an interner string slipping in from
/// somewhere unexpected.
fn mangle(raw: &str) -> String {
    raw.chars().map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' }).collect()
}

fn stmt_addr(stmt: &Stmt<'_>) -> usize {
    stmt as *const Stmt<'_> as usize
}

fn expr_addr(expr: &Expr<'_>) -> usize {
    expr as *const Expr<'_> as usize
}

/// Formats an `f64` as an unambiguous LIR double literal — always carrying
/// a decimal point, since `3` and `3.0` are the same bit pattern but only
/// one of them reads as a float literal in most textual IRs.
fn double_literal(n: f64) -> String {
    if n.is_nan() {
        "0x7FF8000000000000".to_string()
    } else if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        format!("{n:.1}")
    } else {
        format!("{n:e}")
    }
}

/// Where a slot's current value lives at the LIR level (spec §4.5.1, widened
/// to cover the two reference shapes lists and strings need).
#[derive(Clone)]
enum Storage {
    /// Pointer to a heap-or-stack `Cell`; reads go through `cell_value`,
    /// writes through `cell_update`.
    Cell(String),
    /// Pointer to a stack `double`; plain load/store.
    Plain(String),
    /// Pointer to a stack pointer-to-`List`/`TraceString`; the slot holds a
    /// reference, never a Cell (spec §9: list elements are never observed,
    /// and by the same reasoning a whole list/string value isn't either).
    Ptr(String),
}

/// A structural guess at whether an expression denotes a scalar, a list
/// reference, or a string reference — this implementation's generalization
/// of the teacher's `infer_expr_type` from a real type system to "is this a
/// number, a list, or a string" (good enough since nothing downstream
/// checks it against a declared type; spec's surface is untyped).
#[derive(Clone, Copy, PartialEq, Eq)]
enum Shape {
    Scalar,
    ListRef,
    StringRef,
}

/// The lowered result of an expression: a scalar SSA double register, or a
/// pointer SSA register for a list/string reference.
enum Val {
    Double(String),
    Ptr(String),
}

/// Accumulates one compilation unit's LIR text plus its cross-module
/// manifest (spec §4.6's "each compilation unit... declares imports and
/// exports").
pub struct UnitOutput {
    pub name: String,
    pub lir: String,
    pub exports: Vec<String>,
    pub imports: Vec<String>,
}

struct StringPoolEntry {
    label: String,
    bytes: Vec<u8>,
}

/// Threads the output buffer, SSA counters, and slot-storage table through
/// one unit's lowering — the direct generalization of the teacher's
/// `CContext<'a>` (`vars`/`funcs` tables plus an `interner`) to LIR text.
pub struct CodegenContext<'a> {
    unit_name: String,
    analysis: &'a Analysis<'a>,
    interner: &'a tracec_base::Interner,
    mode: Mode,
    functions_out: String,
    init_out: String,
    next_value: u32,
    next_block: u32,
    slot_storage: HashMap<SlotId, Storage>,
    slot_shape: HashMap<SlotId, Shape>,
    /// Tracks every slot (global or local) that has already seen its
    /// one-time `cell_init`, for the lifetime of the whole unit — a local
    /// slot's body is only ever walked once here, so this doubles as "has
    /// this function's Cell been initialized yet in this body" too (spec
    /// §4.5.1 "call `cell_init` ... exactly once").
    cell_initialized: std::collections::HashSet<SlotId>,
    string_pool: Vec<StringPoolEntry>,
    /// (continue target, break target) for the innermost enclosing loop.
    loop_stack: Vec<(String, String)>,
    block_terminated: bool,
    errors: Vec<CodegenError>,
}

impl<'a> CodegenContext<'a> {
    fn fresh_value(&mut self) -> String {
        let v = format!("%v{}", self.next_value);
        self.next_value += 1;
        v
    }

    fn fresh_label(&mut self, prefix: &str) -> String {
        let l = format!("{prefix}{}", self.next_block);
        self.next_block += 1;
        l
    }

    fn out(&mut self) -> &mut String {
        &mut self.functions_out
    }

    fn emit(&mut self, line: std::fmt::Arguments<'_>) {
        if self.block_terminated {
            return;
        }
        writeln!(self.out(), "  {line}").expect("writing to a String never fails");
    }

    fn emit_label(&mut self, label: &str) {
        writeln!(self.out(), "{label}:").expect("writing to a String never fails");
        self.block_terminated = false;
    }

    fn name_of(&self, sym: Symbol) -> String {
        self.interner.resolve(sym).to_string()
    }

    fn intern_string_literal(&mut self, bytes: &[u8]) -> String {
        if let Some(existing) = self.string_pool.iter().find(|e| e.bytes == bytes) {
            return existing.label.clone();
        }
        let label = format!("@.str.{}", self.string_pool.len());
        self.string_pool.push(StringPoolEntry { label: label.clone(), bytes: bytes.to_vec() });
        label
    }

    fn global_symbol(&self, name: &str) -> String {
        if is_shared_global(name) {
            format!("@__unit_global_{}", mangle(name))
        } else {
            format!("@__unit_local_{}_{}", mangle(&self.unit_name), mangle(name))
        }
    }

    // -- expression lowering -------------------------------------------------

    fn infer_value_shape(&self, expr: &'a Expr<'a>) -> Shape {
        match expr {
            Expr::Literal { value: Literal::Str(_), .. } => Shape::StringRef,
            Expr::List { .. } | Expr::ListComprehension { .. } => Shape::ListRef,
            Expr::Identifier { .. } => self
                .analysis
                .resolutions
                .get(expr)
                .and_then(slot_of)
                .and_then(|s| self.slot_shape.get(&s).copied())
                .unwrap_or(Shape::Scalar),
            Expr::Call { .. } => match flatten_calls(expr).0 {
                base => match self.analysis.resolutions.get(base) {
                    Some(Binding::BuiltinRef(Builtin::ListCtor)) => Shape::ListRef,
                    Some(Binding::BuiltinRef(Builtin::StringCtor)) => Shape::StringRef,
                    _ => Shape::Scalar,
                },
            },
            _ => Shape::Scalar,
        }
    }

    fn lower_expr(&mut self, expr: &'a Expr<'a>) -> Result<Val, CodegenError> {
        // A bare or applied predicate/metric reference is annotated on the
        // call (or identifier, for the bare `not converged` form) by the
        // analyzer regardless of its surface shape — check that first.
        if let Some(subject) = self.analysis.predicate_subject.get(expr).copied() {
            if let Some(builtin) = self.predicate_builtin_of(expr) {
                return self.lower_predicate(builtin, subject, expr.span());
            }
        }

        match expr {
            Expr::Literal { value, .. } => self.lower_literal(value),
            Expr::Identifier { .. } => self.lower_identifier(expr),
            Expr::List { elements, .. } => self.lower_list_literal(elements),
            Expr::Index { target, index, .. } => self.lower_index(target, index),
            Expr::Call { .. } => self.lower_call(expr),
            Expr::BinaryOp { op, lhs, rhs, .. } => self.lower_binop(*op, lhs, rhs),
            Expr::UnaryOp { op, operand, .. } => self.lower_unop(*op, operand),
            Expr::Interrogative { which, .. } => self.lower_interrogative(*which, expr),
            Expr::ListComprehension { expr: body, var, iterable, filter, .. } => {
                self.lower_comprehension(expr, body, *var, iterable, *filter)
            }
        }
    }

    fn predicate_builtin_of(&self, expr: &'a Expr<'a>) -> Option<Builtin> {
        let base = match expr {
            Expr::Call { .. } => flatten_calls(expr).0,
            other => other,
        };
        match self.analysis.resolutions.get(base) {
            Some(Binding::BuiltinRef(b)) if b.is_predicate() || b.is_metric() => Some(*b),
            _ => None,
        }
    }

    fn lower_literal(&mut self, value: &Literal) -> Result<Val, CodegenError> {
        Ok(match value {
            Literal::Num(n) => Val::Double(double_literal(*n)),
            Literal::Bool(b) => Val::Double(if *b { "1.0".to_string() } else { "0.0".to_string() }),
            Literal::Null => Val::Double("0.0".to_string()),
            Literal::Str(bytes) => {
                let pool_label = self.intern_string_literal(bytes);
                let r = self.fresh_value();
                self.emit(format_args!("{r} = call ptr @string_create(ptr {pool_label})"));
                Val::Ptr(r)
            }
        })
    }

    fn lower_identifier(&mut self, expr: &'a Expr<'a>) -> Result<Val, CodegenError> {
        let binding = self
            .analysis
            .resolutions
            .get(expr)
            .cloned()
            .ok_or_else(|| CodegenError::Internal { message: "unresolved identifier reached codegen".into(), span: expr.span() })?;
        match binding {
            Binding::LocalSlot(slot) | Binding::Parameter(slot) | Binding::GlobalSlot(slot) => self.read_slot(slot, expr.span()),
            Binding::ImportedName { original, .. } => {
                let sym = self.global_symbol(&self.name_of(original));
                let r = self.fresh_value();
                self.emit(format_args!("{r} = load double, ptr {sym}"));
                Ok(Val::Double(r))
            }
            Binding::FunctionRef(_) | Binding::BuiltinRef(_) => {
                Err(CodegenError::UnsupportedConstruct { what: "function or builtin referenced outside call position".into(), span: expr.span() })
            }
        }
    }

    fn read_slot(&mut self, slot: SlotId, span: Span) -> Result<Val, CodegenError> {
        let storage = self
            .slot_storage
            .get(&slot)
            .cloned()
            .ok_or_else(|| CodegenError::Internal { message: format!("slot {} read before assignment", slot.0), span })?;
        Ok(match storage {
            Storage::Cell(addr) => {
                let r = self.fresh_value();
                self.emit(format_args!("{r} = call double @cell_value(ptr {addr})"));
                Val::Double(r)
            }
            Storage::Plain(addr) => {
                let r = self.fresh_value();
                self.emit(format_args!("{r} = load double, ptr {addr}"));
                Val::Double(r)
            }
            Storage::Ptr(addr) => {
                let r = self.fresh_value();
                self.emit(format_args!("{r} = load ptr, ptr {addr}"));
                Val::Ptr(r)
            }
        })
    }

    fn lower_list_literal(&mut self, elements: &[&'a Expr<'a>]) -> Result<Val, CodegenError> {
        let list = self.fresh_value();
        self.emit(format_args!("{list} = call ptr @list_create(i64 {})", elements.len()));
        for (i, e) in elements.iter().enumerate() {
            let v = self.coerce_double(self.lower_expr(e)?, e.span())?;
            self.emit(format_args!("call void @list_set(ptr {list}, i64 {i}, double {v})"));
        }
        Ok(Val::Ptr(list))
    }

    fn lower_index(&mut self, target: &'a Expr<'a>, index: &'a Expr<'a>) -> Result<Val, CodegenError> {
        let list = self.coerce_ptr(self.lower_expr(target)?, target.span())?;
        let idx_d = self.coerce_double(self.lower_expr(index)?, index.span())?;
        let idx_i = self.fresh_value();
        self.emit(format_args!("{idx_i} = fptosi double {idx_d} to i64"));
        let r = self.fresh_value();
        self.emit(format_args!("{r} = call double @list_get(ptr {list}, i64 {idx_i})"));
        Ok(Val::Double(r))
    }

    fn coerce_double(&mut self, v: Val, span: Span) -> Result<String, CodegenError> {
        match v {
            Val::Double(r) => Ok(r),
            Val::Ptr(_) => Err(CodegenError::UnsupportedConstruct { what: "pointer value used where a number was expected".into(), span }),
        }
    }

    fn coerce_ptr(&mut self, v: Val, span: Span) -> Result<String, CodegenError> {
        match v {
            Val::Ptr(r) => Ok(r),
            Val::Double(_) => Err(CodegenError::UnsupportedConstruct { what: "number used where a list or string was expected".into(), span }),
        }
    }

    /// Lowers a condition expression to an `i1` by comparing a double
    /// against zero, or a pointer against null.
    fn lower_condition(&mut self, expr: &'a Expr<'a>) -> Result<String, CodegenError> {
        let v = self.lower_expr(expr)?;
        let r = self.fresh_value();
        match v {
            Val::Double(d) => self.emit(format_args!("{r} = fcmp one double {d}, 0.0")),
            Val::Ptr(p) => self.emit(format_args!("{r} = icmp ne ptr {p}, null")),
        }
        Ok(r)
    }

    fn lower_binop(&mut self, op: BinOp, lhs: &'a Expr<'a>, rhs: &'a Expr<'a>) -> Result<Val, CodegenError> {
        match op {
            BinOp::And | BinOp::Or => self.lower_short_circuit(op, lhs, rhs),
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => {
                let l = self.coerce_double(self.lower_expr(lhs)?, lhs.span())?;
                let r = self.coerce_double(self.lower_expr(rhs)?, rhs.span())?;
                let pred = match op {
                    BinOp::Eq => "oeq",
                    BinOp::Ne => "one",
                    BinOp::Lt => "olt",
                    BinOp::Gt => "ogt",
                    BinOp::Le => "ole",
                    BinOp::Ge => "oge",
                    _ => unreachable!(),
                };
                let c = self.fresh_value();
                self.emit(format_args!("{c} = fcmp {pred} double {l}, {r}"));
                let out = self.fresh_value();
                self.emit(format_args!("{out} = select i1 {c}, double 1.0, double 0.0"));
                Ok(Val::Double(out))
            }
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => {
                let l = self.coerce_double(self.lower_expr(lhs)?, lhs.span())?;
                let r = self.coerce_double(self.lower_expr(rhs)?, rhs.span())?;
                let instr = match op {
                    BinOp::Add => "fadd",
                    BinOp::Sub => "fsub",
                    BinOp::Mul => "fmul",
                    BinOp::Div => "fdiv",
                    BinOp::Mod => "frem",
                    _ => unreachable!(),
                };
                let out = self.fresh_value();
                self.emit(format_args!("{out} = {instr} double {l}, {r}"));
                Ok(Val::Double(out))
            }
        }
    }

    /// `and`/`or` short-circuit: the right operand is only evaluated when it
    /// can affect the result, mirroring ordinary source-level short-circuit
    /// semantics rather than the cheaper always-evaluate-both lowering.
    fn lower_short_circuit(&mut self, op: BinOp, lhs: &'a Expr<'a>, rhs: &'a Expr<'a>) -> Result<Val, CodegenError> {
        let result_slot = self.fresh_value();
        self.emit(format_args!("{result_slot} = alloca double"));
        let lc = self.lower_condition(lhs)?;
        let rhs_label = self.fresh_label("scrhs");
        let skip_label = self.fresh_label("scskip");
        let join_label = self.fresh_label("scjoin");
        let (short_circuit_value, branch_true, branch_false) = match op {
            BinOp::And => ("0.0", rhs_label.clone(), skip_label.clone()),
            BinOp::Or => ("1.0", skip_label.clone(), rhs_label.clone()),
            _ => unreachable!("only called for And/Or"),
        };
        self.emit(format_args!("br i1 {lc}, label %{branch_true}, label %{branch_false}"));

        self.emit_label(&rhs_label);
        let rc = self.lower_condition(rhs)?;
        let rv = self.fresh_value();
        self.emit(format_args!("{rv} = select i1 {rc}, double 1.0, double 0.0"));
        self.emit(format_args!("store double {rv}, ptr {result_slot}"));
        self.emit(format_args!("br label %{join_label}"));

        self.emit_label(&skip_label);
        self.emit(format_args!("store double {short_circuit_value}, ptr {result_slot}"));
        self.emit(format_args!("br label %{join_label}"));

        self.emit_label(&join_label);
        let out = self.fresh_value();
        self.emit(format_args!("{out} = load double, ptr {result_slot}"));
        Ok(Val::Double(out))
    }

    fn lower_unop(&mut self, op: UnOp, operand: &'a Expr<'a>) -> Result<Val, CodegenError> {
        let v = self.coerce_double(self.lower_expr(operand)?, operand.span())?;
        let out = self.fresh_value();
        match op {
            UnOp::Neg => self.emit(format_args!("{out} = fsub double 0.0, {v}")),
            UnOp::Not => {
                let c = self.fresh_value();
                self.emit(format_args!("{c} = fcmp oeq double {v}, 0.0"));
                self.emit(format_args!("{out} = select i1 {c}, double 1.0, double 0.0"));
            }
        }
        Ok(Val::Double(out))
    }

    /// `WHO`/`WHAT`/`WHEN`/`WHERE`/`WHY`/`HOW` (spec §4.5.5).
    fn lower_interrogative(&mut self, which: Interrogative, expr: &'a Expr<'a>) -> Result<Val, CodegenError> {
        use tracec_lang::semantics::InterrogativeContext as Ctx;
        let ctx = self.analysis.interrogatives.get(expr).copied().unwrap_or(Ctx::Empty);
        match ctx {
            Ctx::Who { function } => {
                let name = function.map(|f| self.name_of(f)).unwrap_or_else(|| self.unit_name.clone());
                let pool_label = self.intern_string_literal(name.as_bytes());
                let r = self.fresh_value();
                self.emit(format_args!("{r} = call ptr @string_create(ptr {pool_label})"));
                Ok(Val::Ptr(r))
            }
            Ctx::What { slot: Some(slot) } => self.read_slot(slot, expr.span()),
            Ctx::What { slot: None } => Ok(Val::Double("0.0".to_string())),
            Ctx::When { slot: Some(slot) } => {
                let addr = self.cell_address_of(slot, expr.span())?;
                let iter = self.fresh_value();
                self.emit(format_args!("{iter} = call i64 @cell_iteration(ptr {addr})"));
                let r = self.fresh_value();
                self.emit(format_args!("{r} = sitofp i64 {iter} to double"));
                Ok(Val::Double(r))
            }
            Ctx::When { slot: None } => Ok(Val::Double("0.0".to_string())),
            Ctx::Empty => {
                let _ = which;
                let pool_label = self.intern_string_literal(b"");
                let r = self.fresh_value();
                self.emit(format_args!("{r} = call ptr @string_create(ptr {pool_label})"));
                Ok(Val::Ptr(r))
            }
        }
    }

    fn cell_address_of(&mut self, slot: SlotId, span: Span) -> Result<String, CodegenError> {
        match self.slot_storage.get(&slot) {
            Some(Storage::Cell(addr)) => Ok(addr.clone()),
            _ => Err(CodegenError::Internal { message: format!("slot {} has no observed Cell storage", slot.0), span }),
        }
    }

    /// `converged`/`stable`/`oscillating`/`diverging`/`improving`/
    /// `framework_strength`, applied to `subject` (or silently `false`/`0.0`
    /// when the analyzer found no observed subject — spec §9 Open Question).
    fn lower_predicate(&mut self, builtin: Builtin, subject: Option<SlotId>, span: Span) -> Result<Val, CodegenError> {
        let Some(slot) = subject else {
            return Ok(Val::Double("0.0".to_string()));
        };
        let addr = match self.cell_address_of(slot, span) {
            Ok(addr) => addr,
            Err(_) => return Ok(Val::Double("0.0".to_string())),
        };
        if builtin.is_metric() {
            let r = self.fresh_value();
            self.emit(format_args!("{r} = call double @cell_stability(ptr {addr})"));
            return Ok(Val::Double(r));
        }
        let fn_name = match builtin {
            Builtin::Converged => "converged",
            Builtin::Stable => "stable",
            Builtin::Oscillating => "oscillating",
            Builtin::Diverging => "diverging",
            Builtin::Improving => "improving",
            _ => unreachable!("caller guarantees a predicate or metric builtin"),
        };
        let b = self.fresh_value();
        self.emit(format_args!("{b} = call i1 @{fn_name}(ptr {addr})"));
        let out = self.fresh_value();
        self.emit(format_args!("{out} = select i1 {b}, double 1.0, double 0.0"));
        Ok(Val::Double(out))
    }

    fn lower_call(&mut self, expr: &'a Expr<'a>) -> Result<Val, CodegenError> {
        let (base, args) = flatten_calls(expr);
        let binding = self
            .analysis
            .resolutions
            .get(base)
            .cloned()
            .ok_or_else(|| CodegenError::NotCallable { name: "<unresolved>".into(), span: expr.span() })?;
        match binding {
            Binding::FunctionRef(f) => {
                if args.len() != 1 {
                    return Err(CodegenError::UnsupportedConstruct {
                        what: "user-defined functions take exactly one argument".into(),
                        span: expr.span(),
                    });
                }
                let arg = self.coerce_double(self.lower_expr(args[0])?, args[0].span())?;
                let r = self.fresh_value();
                self.emit(format_args!("{r} = call double @{}(double {arg})", self.name_of(f)));
                Ok(Val::Double(r))
            }
            Binding::BuiltinRef(b) => self.lower_builtin_call(b, &args, expr.span()),
            _ => Err(CodegenError::NotCallable { name: self.describe_base(base), span: expr.span() }),
        }
    }

    fn describe_base(&self, base: &'a Expr<'a>) -> String {
        match base {
            Expr::Identifier { name, .. } => self.name_of(*name),
            _ => "<expression>".to_string(),
        }
    }

    fn lower_builtin_call(&mut self, builtin: Builtin, args: &[&'a Expr<'a>], span: Span) -> Result<Val, CodegenError> {
        let arity_error = |what: &str| CodegenError::UnsupportedConstruct { what: format!("'{what}' called with the wrong number of arguments"), span };
        match builtin {
            Builtin::Print => {
                if args.len() != 1 {
                    return Err(arity_error("print"));
                }
                let v = self.coerce_double(self.lower_expr(args[0])?, args[0].span())?;
                self.emit(format_args!("call void @print_f64(double {v})"));
                Ok(Val::Double("0.0".to_string()))
            }
            Builtin::Len => {
                if args.len() != 1 {
                    return Err(arity_error("len"));
                }
                let l = self.coerce_ptr(self.lower_expr(args[0])?, args[0].span())?;
                let n = self.fresh_value();
                self.emit(format_args!("{n} = call i64 @list_length(ptr {l})"));
                let r = self.fresh_value();
                self.emit(format_args!("{r} = sitofp i64 {n} to double"));
                Ok(Val::Double(r))
            }
            Builtin::Append => {
                if args.len() != 2 {
                    return Err(arity_error("append"));
                }
                let l = self.coerce_ptr(self.lower_expr(args[0])?, args[0].span())?;
                let v = self.coerce_double(self.lower_expr(args[1])?, args[1].span())?;
                self.emit(format_args!("call void @list_append(ptr {l}, double {v})"));
                Ok(Val::Ptr(l))
            }
            Builtin::Abs | Builtin::Sqrt | Builtin::Floor | Builtin::Ceil => {
                if args.len() != 1 {
                    return Err(arity_error("math builtin"));
                }
                let v = self.coerce_double(self.lower_expr(args[0])?, args[0].span())?;
                let libm = match builtin {
                    Builtin::Abs => "fabs",
                    Builtin::Sqrt => "sqrt",
                    Builtin::Floor => "floor",
                    Builtin::Ceil => "ceil",
                    _ => unreachable!(),
                };
                let r = self.fresh_value();
                self.emit(format_args!("{r} = call double @{libm}(double {v})"));
                Ok(Val::Double(r))
            }
            Builtin::Pow => {
                if args.len() != 2 {
                    return Err(arity_error("pow"));
                }
                let base = self.coerce_double(self.lower_expr(args[0])?, args[0].span())?;
                let exp = self.coerce_double(self.lower_expr(args[1])?, args[1].span())?;
                let r = self.fresh_value();
                self.emit(format_args!("{r} = call double @pow(double {base}, double {exp})"));
                Ok(Val::Double(r))
            }
            Builtin::ListCtor => {
                if args.len() != 1 {
                    return Err(arity_error("list"));
                }
                let n = self.coerce_double(self.lower_expr(args[0])?, args[0].span())?;
                let ni = self.fresh_value();
                self.emit(format_args!("{ni} = fptosi double {n} to i64"));
                let r = self.fresh_value();
                self.emit(format_args!("{r} = call ptr @list_create(i64 {ni})"));
                Ok(Val::Ptr(r))
            }
            Builtin::StringCtor => {
                if args.len() != 1 {
                    return Err(arity_error("string"));
                }
                let v = self.coerce_double(self.lower_expr(args[0])?, args[0].span())?;
                let r = self.fresh_value();
                self.emit(format_args!("{r} = call ptr @number_to_string(double {v})"));
                Ok(Val::Ptr(r))
            }
            Builtin::Map | Builtin::Filter | Builtin::Reduce | Builtin::Zip | Builtin::Sort => {
                // Higher-order builtins need a first-class function value,
                // which this LIR has no representation for. Reported rather
                // than silently miscompiled (spec §7 anticipates exactly
                // this "unsupported construct" kind).
                let name = Builtin::ALL.iter().find(|(_, b)| *b == builtin).map(|(n, _)| *n).unwrap_or("<builtin>");
                Err(CodegenError::UnsupportedConstruct { what: format!("higher-order builtin '{name}'"), span })
            }
            Builtin::Converged | Builtin::Stable | Builtin::Oscillating | Builtin::Diverging | Builtin::Improving | Builtin::FrameworkStrength => {
                // Reached only when the analyzer recorded no predicate_subject
                // annotation for this call site (shouldn't happen, since
                // `note_call` always inserts one for predicate/metric
                // builtins) — fall back to the subject-less reading.
                self.lower_predicate(builtin, None, span)
            }
        }
    }

    fn lower_comprehension(
        &mut self,
        expr: &'a Expr<'a>,
        body: &'a Expr<'a>,
        var: Symbol,
        iterable: &'a Expr<'a>,
        filter: Option<&'a Expr<'a>>,
    ) -> Result<Val, CodegenError> {
        let _ = var;
        let source = self.coerce_ptr(self.lower_expr(iterable)?, iterable.span())?;
        let result = self.fresh_value();
        self.emit(format_args!("{result} = call ptr @list_create(i64 0)"));

        let var_slot = self
            .analysis
            .comprehension_vars
            .get(expr)
            .copied()
            .ok_or_else(|| CodegenError::Internal { message: "list comprehension missing its loop-variable slot".into(), span: expr.span() })?;
        let var_addr = self.fresh_value();
        self.emit(format_args!("{var_addr} = alloca double"));
        self.slot_storage.insert(var_slot, Storage::Plain(var_addr.clone()));
        self.slot_shape.insert(var_slot, Shape::Scalar);

        let idx_addr = self.fresh_value();
        self.emit(format_args!("{idx_addr} = alloca i64"));
        self.emit(format_args!("store i64 0, ptr {idx_addr}"));

        let len = self.fresh_value();
        self.emit(format_args!("{len} = call i64 @list_length(ptr {source})"));

        let header = self.fresh_label("compr_head");
        let body_label = self.fresh_label("compr_body");
        let exit = self.fresh_label("compr_exit");

        self.emit(format_args!("br label %{header}"));
        self.emit_label(&header);
        let idx = self.fresh_value();
        self.emit(format_args!("{idx} = load i64, ptr {idx_addr}"));
        let cont = self.fresh_value();
        self.emit(format_args!("{cont} = icmp slt i64 {idx}, {len}"));
        self.emit(format_args!("br i1 {cont}, label %{body_label}, label %{exit}"));

        self.emit_label(&body_label);
        let elem = self.fresh_value();
        self.emit(format_args!("{elem} = call double @list_get(ptr {source}, i64 {idx})"));
        self.emit(format_args!("store double {elem}, ptr {var_addr}"));

        let mut keep = true;
        if let Some(f) = filter {
            let fv = self.lower_condition(f)?;
            keep = false;
            let keep_label = self.fresh_label("compr_keep");
            let next_label = self.fresh_label("compr_next");
            self.emit(format_args!("br i1 {fv}, label %{keep_label}, label %{next_label}"));
            self.emit_label(&keep_label);
            let bv = self.coerce_double(self.lower_expr(body)?, body.span())?;
            self.emit(format_args!("call void @list_append(ptr {result}, double {bv})"));
            self.emit(format_args!("br label %{next_label}"));
            self.emit_label(&next_label);
        }
        if keep {
            let bv = self.coerce_double(self.lower_expr(body)?, body.span())?;
            self.emit(format_args!("call void @list_append(ptr {result}, double {bv})"));
        }

        let idx_next = self.fresh_value();
        self.emit(format_args!("{idx_next} = add i64 {idx}, 1"));
        self.emit(format_args!("store i64 {idx_next}, ptr {idx_addr}"));
        self.emit(format_args!("br label %{header}"));

        self.emit_label(&exit);
        Ok(Val::Ptr(result))
    }

    // -- statement lowering ---------------------------------------------------

    fn lower_block(&mut self, stmts: &[&'a Stmt<'a>]) {
        for stmt in stmts {
            if self.block_terminated {
                break;
            }
            self.lower_stmt(stmt);
        }
    }

    fn lower_stmt(&mut self, stmt: &'a Stmt<'a>) {
        match stmt {
            Stmt::Assignment { expr, .. } => self.lower_assignment(stmt, expr),
            Stmt::FunctionDef { span, .. } => self.errors.push(CodegenError::UnsupportedConstruct {
                what: "nested function definition".into(),
                span: *span,
            }),
            Stmt::Return { expr, span } => self.lower_return(expr.as_deref(), *span),
            Stmt::If { cond, then_body, else_body, .. } => self.lower_if(cond, then_body, else_body),
            Stmt::Loop { cond, body, .. } => self.lower_loop(cond, body),
            Stmt::Break { span } => self.lower_break(*span),
            Stmt::Continue { span } => self.lower_continue(*span),
            Stmt::ExpressionStmt { expr, .. } => {
                if let Err(e) = self.lower_expr(expr) {
                    self.errors.push(e);
                }
            }
            Stmt::Import { .. } => {}
        }
    }

    fn lower_assignment(&mut self, stmt: &'a Stmt<'a>, expr: &'a Expr<'a>) {
        let Some(slot) = self.analysis.assignment_slots.get(&stmt_addr(stmt)).copied() else {
            self.errors.push(CodegenError::Internal { message: "assignment missing its resolved slot".into(), span: stmt.span() });
            return;
        };

        // Global slots are pre-registered (with a fixed `@symbol` address)
        // by `plan_globals` before any statement is lowered; a local slot
        // gets its storage lazily, right here, the first time it's written
        // (spec §4.5.1 "initializing an observed local on entry").
        if !self.slot_storage.contains_key(&slot) {
            let shape = self.infer_value_shape(expr);
            self.slot_shape.insert(slot, shape);
            let observed = shape == Shape::Scalar && self.analysis.observed.contains(&slot);
            let storage = match shape {
                Shape::Scalar if observed => {
                    let addr = self.fresh_value();
                    self.emit(format_args!("{addr} = alloca %Cell"));
                    Storage::Cell(addr)
                }
                Shape::Scalar => {
                    let addr = self.fresh_value();
                    self.emit(format_args!("{addr} = alloca double"));
                    Storage::Plain(addr)
                }
                Shape::ListRef | Shape::StringRef => {
                    let addr = self.fresh_value();
                    self.emit(format_args!("{addr} = alloca ptr"));
                    Storage::Ptr(addr)
                }
            };
            self.slot_storage.insert(slot, storage);
        }

        let value = match self.lower_expr(expr) {
            Ok(v) => v,
            Err(e) => {
                self.errors.push(e);
                return;
            }
        };

        self.store_into_slot(slot, value, stmt.span());
    }

    fn store_into_slot(&mut self, slot: SlotId, value: Val, span: Span) {
        let storage = self.slot_storage.get(&slot).cloned();
        let Some(storage) = storage else {
            self.errors.push(CodegenError::Internal { message: format!("slot {} has no storage", slot.0), span });
            return;
        };
        match storage {
            Storage::Cell(addr) => {
                let d = match self.coerce_double(value, span) {
                    Ok(d) => d,
                    Err(e) => return self.errors.push(e),
                };
                if self.cell_initialized.insert(slot) {
                    self.emit(format_args!("call void @cell_init(ptr {addr}, double {d})"));
                } else {
                    self.emit(format_args!("call void @cell_update(ptr {addr}, double {d})"));
                }
            }
            Storage::Plain(addr) => {
                let d = match self.coerce_double(value, span) {
                    Ok(d) => d,
                    Err(e) => return self.errors.push(e),
                };
                self.emit(format_args!("store double {d}, ptr {addr}"));
            }
            Storage::Ptr(addr) => {
                let p = match self.coerce_ptr(value, span) {
                    Ok(p) => p,
                    Err(e) => return self.errors.push(e),
                };
                self.emit(format_args!("store ptr {p}, ptr {addr}"));
            }
        }
    }

    fn lower_return(&mut self, expr: Option<&'a Expr<'a>>, span: Span) {
        let d = match expr {
            Some(e) => match self.lower_expr(e).and_then(|v| self.coerce_double(v, e.span())) {
                Ok(d) => d,
                Err(e) => return self.errors.push(e),
            },
            None => "0.0".to_string(),
        };
        self.emit(format_args!("ret double {d}"));
        let _ = span;
        self.block_terminated = true;
    }

    fn lower_if(&mut self, cond: &'a Expr<'a>, then_body: &[&'a Stmt<'a>], else_body: &[&'a Stmt<'a>]) {
        let c = match self.lower_condition(cond) {
            Ok(c) => c,
            Err(e) => return self.errors.push(e),
        };
        let then_label = self.fresh_label("then");
        let else_label = self.fresh_label("else");
        let endif_label = self.fresh_label("endif");
        self.emit(format_args!("br i1 {c}, label %{then_label}, label %{else_label}"));

        self.emit_label(&then_label);
        self.lower_block(then_body);
        if !self.block_terminated {
            self.emit(format_args!("br label %{endif_label}"));
        }

        self.emit_label(&else_label);
        self.lower_block(else_body);
        if !self.block_terminated {
            self.emit(format_args!("br label %{endif_label}"));
        }

        self.emit_label(&endif_label);
    }

    fn lower_loop(&mut self, cond: &'a Expr<'a>, body: &[&'a Stmt<'a>]) {
        let header = self.fresh_label("loophead");
        let body_label = self.fresh_label("loopbody");
        let exit = self.fresh_label("loopexit");

        self.emit(format_args!("br label %{header}"));
        self.emit_label(&header);
        let c = match self.lower_condition(cond) {
            Ok(c) => c,
            Err(e) => {
                self.errors.push(e);
                return;
            }
        };
        self.emit(format_args!("br i1 {c}, label %{body_label}, label %{exit}"));

        self.emit_label(&body_label);
        self.loop_stack.push((header.clone(), exit.clone()));
        self.lower_block(body);
        self.loop_stack.pop();
        if !self.block_terminated {
            self.emit(format_args!("br label %{header}"));
        }

        self.emit_label(&exit);
    }

    fn lower_break(&mut self, span: Span) {
        match self.loop_stack.last().cloned() {
            Some((_, brk)) => {
                self.emit(format_args!("br label %{brk}"));
                self.block_terminated = true;
            }
            None => self.errors.push(CodegenError::UnsupportedConstruct { what: "'break' outside a loop".into(), span }),
        }
    }

    fn lower_continue(&mut self, span: Span) {
        match self.loop_stack.last().cloned() {
            Some((cont, _)) => {
                self.emit(format_args!("br label %{cont}"));
                self.block_terminated = true;
            }
            None => self.errors.push(CodegenError::UnsupportedConstruct { what: "'continue' outside a loop".into(), span }),
        }
    }
}

fn slot_of(binding: &Binding) -> Option<SlotId> {
    match binding {
        Binding::LocalSlot(s) | Binding::Parameter(s) | Binding::GlobalSlot(s) => Some(*s),
        _ => None,
    }
}

/// Walks the `callee` spine of a nested `Call` chain (`a of b of c` parses
/// as `Call{Call{a, b}, c}`) and returns the ultimate base expression plus
/// the arguments in application order. Only follows `callee`, never `arg` —
/// a call nested inside an argument position is a separate sub-expression,
/// lowered on its own (spec §4.3 "`of` is left-associative").
fn flatten_calls<'a>(expr: &'a Expr<'a>) -> (&'a Expr<'a>, Vec<&'a Expr<'a>>) {
    let mut args = Vec::new();
    let mut cur = expr;
    while let Expr::Call { callee, arg, .. } = cur {
        args.push(*arg);
        cur = callee;
    }
    args.reverse();
    (cur, args)
}

/// Scans a unit's top-level statements for every assignment target,
/// registering each as a module-scope global before any statement is
/// lowered — globals must have a fixed `@symbol` address available the
/// first time any statement (including one earlier in iteration order than
/// its own declaration, for mutual top-level references) reads it.
struct GlobalPlan {
    /// Emitted verbatim into the module's globals section.
    declarations: String,
    storage: HashMap<SlotId, Storage>,
    shape: HashMap<SlotId, Shape>,
    exported_names: Vec<String>,
}

fn plan_globals<'a>(unit_name: &str, program: &[&'a Stmt<'a>], analysis: &Analysis<'a>, interner: &tracec_base::Interner) -> GlobalPlan {
    let mut declarations = String::new();
    let mut storage = HashMap::new();
    let mut shape = HashMap::new();
    let mut exported_names = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for stmt in program {
        let Stmt::Assignment { name, expr, .. } = stmt else { continue };
        let Some(slot) = analysis.assignment_slots.get(&stmt_addr(stmt)).copied() else { continue };
        if !seen.insert(slot) {
            continue;
        }
        let name_str = interner.resolve(*name);
        let global_shape = infer_shape_for_global(expr, analysis);
        let is_scalar = global_shape == Shape::Scalar;
        let observed = is_scalar && analysis.observed.contains(&slot);
        let shared = is_shared_global(name_str);
        let sym = if shared {
            format!("@__unit_global_{}", mangle(name_str))
        } else {
            format!("@__unit_local_{}_{}", mangle(unit_name), mangle(name_str))
        };
        let linkage = if shared { "" } else { "internal " };
        // An observed global is the `%Cell` storage itself, not a pointer
        // to one — `cell_init`/`cell_update`/`cell_value` all take its
        // address directly (`Storage::Cell(sym)`), matching how a local
        // observed slot allocates `alloca %Cell` rather than `alloca ptr`
        // (see `lower_assignment`). Declaring this as a bare `ptr` would
        // give `cell_init` an 8-byte global to write a ~900-byte struct
        // into.
        let ty = match global_shape {
            Shape::Scalar if observed => "%Cell",
            Shape::Scalar => "double",
            Shape::ListRef | Shape::StringRef => "ptr",
        };
        let init = match global_shape {
            Shape::Scalar if observed => "zeroinitializer",
            Shape::Scalar => "0.0",
            Shape::ListRef | Shape::StringRef => "null",
        };
        writeln!(declarations, "{sym} = {linkage}global {ty} {init}").expect("writing to a String never fails");
        if shared {
            exported_names.push(name_str.to_string());
        }
        shape.insert(slot, global_shape);
        storage.insert(
            slot,
            match global_shape {
                Shape::Scalar if observed => Storage::Cell(sym),
                Shape::Scalar => Storage::Plain(sym),
                Shape::ListRef | Shape::StringRef => Storage::Ptr(sym),
            },
        );
    }

    GlobalPlan { declarations, storage, shape, exported_names }
}

/// A version of [`CodegenContext::infer_value_shape`] usable before a
/// `CodegenContext` exists yet (the global plan runs first and seeds the
/// context's tables).
fn infer_shape_for_global<'a>(expr: &'a Expr<'a>, analysis: &Analysis<'a>) -> Shape {
    match expr {
        Expr::Literal { value: Literal::Str(_), .. } => Shape::StringRef,
        Expr::List { .. } | Expr::ListComprehension { .. } => Shape::ListRef,
        Expr::Call { .. } => match flatten_calls(expr).0 {
            base => match analysis.resolutions.get(base) {
                Some(Binding::BuiltinRef(Builtin::ListCtor)) => Shape::ListRef,
                Some(Binding::BuiltinRef(Builtin::StringCtor)) => Shape::StringRef,
                _ => Shape::Scalar,
            },
        },
        _ => Shape::Scalar,
    }
}

fn emit_runtime_externs(out: &mut String) {
    // The named aggregate backing every `alloca %Cell` / `global %Cell`
    // site (locals in `lower_assignment`, globals in `plan_globals`) —
    // field order must track `tracec_runtime::cell::Cell` exactly, since
    // `cell_init`/`cell_update`/the accessors all read this layout by
    // offset on the runtime side.
    writeln!(out, "%Cell = type {{ double, double, double, i64, double, double, [100 x double], i32, i32 }}").unwrap();
    writeln!(out, "; runtime ABI (spec \u{a7}6.2)").unwrap();
    let decls: &[(&str, &str)] = &[
        ("cell_create", "declare ptr @cell_create(double)"),
        ("cell_init", "declare void @cell_init(ptr, double)"),
        ("cell_update", "declare void @cell_update(ptr, double)"),
        ("cell_value", "declare double @cell_value(ptr)"),
        ("cell_gradient", "declare double @cell_gradient(ptr)"),
        ("cell_stability", "declare double @cell_stability(ptr)"),
        ("cell_iteration", "declare i64 @cell_iteration(ptr)"),
        ("converged", "declare i1 @converged(ptr)"),
        ("diverging", "declare i1 @diverging(ptr)"),
        ("oscillating", "declare i1 @oscillating(ptr)"),
        ("stable", "declare i1 @stable(ptr)"),
        ("improving", "declare i1 @improving(ptr)"),
        ("list_create", "declare ptr @list_create(i64)"),
        ("list_get", "declare double @list_get(ptr, i64)"),
        ("list_set", "declare void @list_set(ptr, i64, double)"),
        ("list_append", "declare void @list_append(ptr, double)"),
        ("list_length", "declare i64 @list_length(ptr)"),
        ("list_destroy", "declare void @list_destroy(ptr)"),
        ("string_create", "declare ptr @string_create(ptr)"),
        ("string_destroy", "declare void @string_destroy(ptr)"),
        ("string_length", "declare i64 @string_length(ptr)"),
        ("string_char_at", "declare i8 @string_char_at(ptr, i64)"),
        ("string_substring", "declare ptr @string_substring(ptr, i64, i64)"),
        ("string_concat", "declare ptr @string_concat(ptr, ptr)"),
        ("string_append_char", "declare ptr @string_append_char(ptr, i8)"),
        ("string_compare", "declare i64 @string_compare(ptr, ptr)"),
        ("string_equals", "declare i1 @string_equals(ptr, ptr)"),
        ("string_find", "declare i64 @string_find(ptr, ptr, i64)"),
        ("number_to_string", "declare ptr @number_to_string(double)"),
        ("string_to_number", "declare double @string_to_number(ptr)"),
        ("char_to_string", "declare ptr @char_to_string(i8)"),
        ("print_f64", "declare void @print_f64(double)"),
    ];
    debug_assert_eq!(decls.len(), RUNTIME_SYMBOLS.len());
    for (_, line) in decls {
        writeln!(out, "{line}").unwrap();
    }
    writeln!(out, "; libm").unwrap();
    for sym in LIBM_SYMBOLS {
        writeln!(out, "declare double @{sym}(double{})", if *sym == "pow" { ", double" } else { "" }).unwrap();
    }
}

/// Lowers one compilation unit's resolved program to LIR text (spec §4.5).
pub fn generate_unit<'a>(
    unit_name: &str,
    program: &[&'a Stmt<'a>],
    analysis: &'a Analysis<'a>,
    interner: &'a tracec_base::Interner,
    mode: Mode,
    is_entry: bool,
) -> Result<UnitOutput, Vec<CodegenError>> {
    let plan = plan_globals(unit_name, program, analysis, interner);

    let mut imports = Vec::new();
    for stmt in program {
        if let Stmt::Import { module, .. } = stmt {
            imports.push(interner.resolve(*module).to_string());
        }
    }

    let mut ctx = CodegenContext {
        unit_name: unit_name.to_string(),
        analysis,
        interner,
        mode,
        functions_out: String::new(),
        init_out: String::new(),
        next_value: 0,
        next_block: 0,
        slot_storage: plan.storage.clone(),
        slot_shape: plan.shape.clone(),
        cell_initialized: std::collections::HashSet::new(),
        string_pool: Vec::new(),
        loop_stack: Vec::new(),
        block_terminated: false,
        errors: Vec::new(),
    };

    let mut function_names = Vec::new();
    for stmt in program {
        if let Stmt::FunctionDef { name, param, body, span } = stmt {
            function_names.push(ctx.name_of(*name));
            ctx.generate_function(*name, *param, body, *span);
        }
    }

    let executable: Vec<&Stmt<'_>> = program
        .iter()
        .filter(|s| !matches!(s, Stmt::FunctionDef { .. } | Stmt::Import { .. }))
        .copied()
        .collect();
    ctx.generate_init_unit(&executable);

    if !ctx.errors.is_empty() {
        return Err(ctx.errors);
    }

    let mut lir = String::new();
    writeln!(lir, "; compilation unit: {unit_name}").unwrap();
    emit_runtime_externs(&mut lir);
    writeln!(lir, "; globals (spec \u{a7}4.5.6)").unwrap();
    lir.push_str(&plan.declarations);
    if !ctx.string_pool.is_empty() {
        writeln!(lir, "; string constant pool (spec \u{a7}4.5.3)").unwrap();
        for entry in &ctx.string_pool {
            let escaped = escape_bytes(&entry.bytes);
            writeln!(lir, "{} = internal constant [{} x i8] c\"{escaped}\\00\"", entry.label, entry.bytes.len() + 1).unwrap();
        }
    }
    lir.push_str(&ctx.functions_out);
    lir.push_str(&ctx.init_out);

    if mode == Mode::Program && is_entry {
        writeln!(lir, "define i32 @main() {{").unwrap();
        writeln!(lir, "entry:").unwrap();
        writeln!(lir, "  call void @__init_unit_{}()", mangle(unit_name)).unwrap();
        writeln!(lir, "  ret i32 0").unwrap();
        writeln!(lir, "}}").unwrap();
    }

    let mut exports = plan.exported_names;
    exports.extend(function_names);
    exports.sort();
    exports.dedup();

    Ok(UnitOutput { name: unit_name.to_string(), lir, exports, imports })
}

fn escape_bytes(bytes: &[u8]) -> String {
    let mut s = String::new();
    for b in bytes {
        match b {
            b'"' | b'\\' => {
                s.push('\\');
                s.push(*b as char);
            }
            0x20..=0x7e => s.push(*b as char),
            _ => s.push_str(&format!("\\{b:02x}")),
        }
    }
    s
}

impl<'a> CodegenContext<'a> {
    /// Emits one user-defined function as `define double @name(double %arg)`
    /// (spec §4.5.1's translation rules for parameters and returns).
    fn generate_function(&mut self, name: Symbol, _param: Symbol, body: &[&'a Stmt<'a>], span: Span) {
        let fname = self.name_of(name);
        // `cell_initialized` is deliberately *not* cleared here: a function's
        // own local slots are only ever walked once across the whole unit
        // (so their first write still gets `cell_init`), and a global this
        // function assigns still needs its one-time `cell_init` tracked
        // across every site that writes it, function or `__init_unit` alike.
        self.block_terminated = false;
        writeln!(self.functions_out, "define double @{fname}(double %arg) {{").unwrap();
        writeln!(self.functions_out, "entry:").unwrap();

        let param_slot = match self.analysis.functions.get(&name) {
            Some(info) => info.param_slot,
            None => {
                self.errors.push(CodegenError::Internal { message: format!("function '{fname}' missing its parameter slot"), span });
                writeln!(self.functions_out, "  ret double 0.0").unwrap();
                writeln!(self.functions_out, "}}").unwrap();
                return;
            }
        };
        let observed = self.analysis.observed.contains(&param_slot);
        self.slot_shape.insert(param_slot, Shape::Scalar);
        if observed {
            let addr = self.fresh_value();
            self.emit(format_args!("{addr} = alloca %Cell"));
            self.emit(format_args!("call void @cell_init(ptr {addr}, double %arg)"));
            self.slot_storage.insert(param_slot, Storage::Cell(addr));
            self.cell_initialized.insert(param_slot);
        } else {
            let addr = self.fresh_value();
            self.emit(format_args!("{addr} = alloca double"));
            self.emit(format_args!("store double %arg, ptr {addr}"));
            self.slot_storage.insert(param_slot, Storage::Plain(addr));
        }

        self.lower_block(body);
        if !self.block_terminated {
            self.emit(format_args!("ret double 0.0"));
        }
        writeln!(self.functions_out, "}}").unwrap();
    }

    /// Emits `__init_unit_<name>`, which runs every executable (non-function,
    /// non-import) top-level statement in source order — including the
    /// entry unit's own program body, which `main` reaches simply by calling
    /// this function last (spec §4.5.6, §4.5.7).
    fn generate_init_unit(&mut self, executable: &[&'a Stmt<'a>]) {
        self.block_terminated = false;
        let name = format!("__init_unit_{}", mangle(&self.unit_name));
        writeln!(self.init_out, "define void @{name}() {{").unwrap();
        writeln!(self.init_out, "entry:").unwrap();
        std::mem::swap(&mut self.functions_out, &mut self.init_out);
        self.lower_block(executable);
        if !self.block_terminated {
            self.emit(format_args!("ret void"));
        }
        std::mem::swap(&mut self.functions_out, &mut self.init_out);
        writeln!(self.init_out, "}}").unwrap();
    }
}

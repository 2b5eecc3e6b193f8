//! Scope resolution and observation inference (spec §4.4).
//!
//! Structured as the teacher's analyzer threads a single struct through a
//! declaration-then-resolution walk (`logicaffeine_language`'s ownership
//! analysis in `analysis::ownership`), generalized here to three concerns:
//! scope resolution, a per-function/per-comprehension declare-then-resolve
//! walk (a block-local version of spec's two linear passes — see the note
//! on `process_block` below), and the observation-inference fixpoint.

use crate::ast::{BinOp, Expr, Stmt};
use crate::error::SemanticError;
use crate::scope::{Binding, ScopeStack, SlotId};
use std::collections::{HashMap, HashSet};
use tracec_base::Symbol;

/// A side table keyed by AST node identity (its arena address), since arena
/// nodes are immutable once allocated (spec §9's "parent/child links are
/// indices" recommendation, applied here as "side tables are pointer-keyed"
/// rather than introducing a `NodeId` indirection layer for a tree this
/// shallow).
pub struct ExprMap<'a, V> {
    map: HashMap<usize, V>,
    _marker: std::marker::PhantomData<&'a ()>,
}

impl<'a, V> ExprMap<'a, V> {
    fn new() -> Self {
        ExprMap { map: HashMap::new(), _marker: std::marker::PhantomData }
    }

    fn insert(&mut self, expr: &'a Expr<'a>, value: V) {
        self.map.insert(expr as *const Expr<'a> as usize, value);
    }

    pub fn get(&self, expr: &'a Expr<'a>) -> Option<&V> {
        self.map.get(&(expr as *const Expr<'a> as usize))
    }
}

/// Per-`Stmt::Loop` annotation: which slot the loop's condition is
/// evaluated against when a predicate inside it names no explicit subject
/// (spec §4.5.5 "the slot bound by the loop's governing expression").
pub type LoopMap<'a> = ExprMap<'a, Option<SlotId>>;

/// What a bare or explicitly-applied predicate/interrogative resolves
/// against at codegen time.
#[derive(Debug, Clone, Copy)]
pub enum InterrogativeContext {
    Who { function: Option<Symbol> },
    What { slot: Option<SlotId> },
    When { slot: Option<SlotId> },
    /// WHERE/WHY/HOW: spec §4.5.5 "evaluate to an empty string unless a
    /// specialized handler is registered" — none is, here.
    Empty,
}

#[derive(Debug, Clone, Copy)]
pub struct FunctionInfo {
    pub param_symbol: Symbol,
    pub param_slot: SlotId,
}

/// Everything the code generator needs from the front end beyond the bare
/// AST: resolved references, the observation set, per-loop governing slots,
/// interrogative context, and accumulated errors.
pub struct Analysis<'a> {
    pub resolutions: ExprMap<'a, Binding>,
    pub observed: HashSet<SlotId>,
    pub functions: HashMap<Symbol, FunctionInfo>,
    pub loop_governing: LoopMap<'a>,
    pub interrogatives: ExprMap<'a, InterrogativeContext>,
    pub predicate_subject: ExprMap<'a, Option<SlotId>>,
    /// The slot bound to a list comprehension's loop variable, keyed by the
    /// `Expr::ListComprehension` node itself — the code generator needs this
    /// to lower the comprehension into a loop over the same slot the
    /// resolution pass bound `var` to (spec §4.3 "List comprehension").
    pub comprehension_vars: ExprMap<'a, SlotId>,
    /// The slot each top-level (module-scope) `Stmt::Assignment` targets,
    /// keyed by the statement's arena address — the code generator uses this
    /// to decide which slots are globals versus function-locals, mirroring
    /// the same structural walk `declare_stmt`/`resolve_stmt` used here.
    pub assignment_slots: HashMap<usize, SlotId>,
    pub slot_count: u32,
    pub errors: Vec<SemanticError>,
}

/// Runs the declaration, resolution, and observation-inference passes over
/// `program` and returns the combined [`Analysis`].
pub fn analyze<'a>(program: &[&'a Stmt<'a>], interner: &mut tracec_base::Interner) -> Analysis<'a> {
    let scopes = ScopeStack::with_builtins(interner);
    let interner_ref: &tracec_base::Interner = interner;
    let mut analyzer = Analyzer {
        scopes,
        interner: interner_ref,
        next_slot: 0,
        resolutions: ExprMap::new(),
        functions: HashMap::new(),
        loop_governing: ExprMap::new(),
        interrogatives: ExprMap::new(),
        predicate_subject: ExprMap::new(),
        comprehension_vars: ExprMap::new(),
        assignment_slots: HashMap::new(),
        errors: Vec::new(),
        last_assigned: None,
        current_function: None,
        assignments: Vec::new(),
        calls: Vec::new(),
        comparisons: Vec::new(),
        predicate_seeds: Vec::new(),
    };
    analyzer.scopes.push_scope(); // module scope
    analyzer.process_block(program, true);

    let observed = analyzer.run_observation_fixpoint();

    Analysis {
        resolutions: analyzer.resolutions,
        observed,
        functions: analyzer.functions,
        loop_governing: analyzer.loop_governing,
        interrogatives: analyzer.interrogatives,
        predicate_subject: analyzer.predicate_subject,
        comprehension_vars: analyzer.comprehension_vars,
        assignment_slots: analyzer.assignment_slots,
        slot_count: analyzer.next_slot,
        errors: analyzer.errors,
    }
}

/// Pointer-identity key for a `Stmt` arena node, mirroring [`ExprMap`]'s
/// pointer-keying strategy for expressions.
fn stmt_key(stmt: &Stmt<'_>) -> usize {
    stmt as *const Stmt<'_> as usize
}

struct Analyzer<'a, 'i> {
    scopes: ScopeStack,
    interner: &'i tracec_base::Interner,
    next_slot: u32,
    resolutions: ExprMap<'a, Binding>,
    functions: HashMap<Symbol, FunctionInfo>,
    loop_governing: LoopMap<'a>,
    interrogatives: ExprMap<'a, InterrogativeContext>,
    predicate_subject: ExprMap<'a, Option<SlotId>>,
    comprehension_vars: ExprMap<'a, SlotId>,
    assignment_slots: HashMap<usize, SlotId>,
    errors: Vec<SemanticError>,
    /// The slot most recently assigned in the current block — used to
    /// infer `WHAT` and a loop's governing slot when nothing more specific
    /// is available (spec §4.5.5).
    last_assigned: Option<SlotId>,
    current_function: Option<Symbol>,
    // Raw facts gathered while walking, consumed by the fixpoint afterward.
    assignments: Vec<(SlotId, &'a Expr<'a>)>,
    calls: Vec<(Symbol, &'a Expr<'a>)>,
    comparisons: Vec<(&'a Expr<'a>, &'a Expr<'a>)>,
    predicate_seeds: Vec<&'a Expr<'a>>,
}

/// Destructures a binary-operator node without repeating the match-ergonomics
/// reference gymnastics at every call site.
fn as_binop<'a>(e: &'a Expr<'a>) -> Option<(BinOp, &'a Expr<'a>, &'a Expr<'a>)> {
    match e {
        Expr::BinaryOp { op, lhs, rhs, .. } => Some((*op, *lhs, *rhs)),
        _ => None,
    }
}

impl<'a, 'i> Analyzer<'a, 'i> {
    fn new_slot(&mut self) -> SlotId {
        let id = SlotId(self.next_slot);
        self.next_slot += 1;
        id
    }

    fn name(&self, sym: Symbol) -> String {
        self.interner.resolve(sym).to_string()
    }

    /// Processes one list of statements sharing a scope: pre-declares
    /// assignment targets, function names, and imports (spec §4.4
    /// "declaration pass"), then resolves and recurses into nested scopes
    /// in source order (spec §4.4 "resolution pass"). Doing this per block
    /// rather than as two whole-program walks lets forward references to
    /// sibling function definitions and mutual recursion resolve, while
    /// still guaranteeing every name in a block is declared before any
    /// reference in that same block is resolved.
    fn process_block(&mut self, stmts: &[&'a Stmt<'a>], module_level: bool) {
        for stmt in stmts {
            self.declare_stmt(*stmt, module_level);
        }
        for stmt in stmts {
            self.resolve_stmt(*stmt, module_level);
        }
    }

    fn declare_stmt(&mut self, stmt: &'a Stmt<'a>, module_level: bool) {
        match stmt {
            Stmt::Assignment { name, .. } => {
                if module_level {
                    if !self.scopes.current_scope().contains_key(name) {
                        let slot = self.new_slot();
                        self.scopes.bind(*name, Binding::GlobalSlot(slot));
                    }
                } else if !self.scopes.resolves_to_global_in_enclosing_scope(*name)
                    && !self.scopes.current_scope().contains_key(name)
                {
                    let slot = self.new_slot();
                    self.scopes.bind(*name, Binding::LocalSlot(slot));
                }
            }
            Stmt::FunctionDef { name, span, .. } => {
                if let Some(Binding::FunctionRef(_)) = self.scopes.current_scope().get(name) {
                    self.errors.push(SemanticError::DuplicateDefinition {
                        name: self.name(*name),
                        first_span: *span,
                        span: *span,
                    });
                }
                self.scopes.bind(*name, Binding::FunctionRef(*name));
            }
            Stmt::Import { module, names, .. } => {
                for n in names {
                    self.scopes.bind(*n, Binding::ImportedName { module: *module, original: *n });
                }
            }
            Stmt::Return { .. }
            | Stmt::If { .. }
            | Stmt::Loop { .. }
            | Stmt::Break { .. }
            | Stmt::Continue { .. }
            | Stmt::ExpressionStmt { .. } => {}
        }
    }

    fn resolve_stmt(&mut self, stmt: &'a Stmt<'a>, module_level: bool) {
        match stmt {
            Stmt::Assignment { name, expr, .. } => {
                self.resolve_expr(*expr);
                let binding = self.scopes.lookup(*name).cloned();
                match binding {
                    Some(Binding::LocalSlot(slot)) | Some(Binding::GlobalSlot(slot)) => {
                        self.assignments.push((slot, *expr));
                        self.assignment_slots.insert(stmt_key(stmt), slot);
                        self.last_assigned = Some(slot);
                    }
                    Some(_) => {}
                    None => self.errors.push(SemanticError::UnboundName {
                        name: self.name(*name),
                        span: stmt.span(),
                    }),
                }
            }
            Stmt::FunctionDef { name, param, body, .. } => {
                let saved_function = self.current_function.replace(*name);
                let saved_last_assigned = self.last_assigned.take();
                self.scopes.push_scope();
                let param_slot = self.new_slot();
                self.scopes.bind(*param, Binding::Parameter(param_slot));
                self.functions.insert(*name, FunctionInfo { param_symbol: *param, param_slot });
                self.process_block(body, false);
                self.scopes.pop_scope();
                self.current_function = saved_function;
                self.last_assigned = saved_last_assigned;
            }
            Stmt::Return { expr, .. } => {
                if let Some(e) = expr {
                    self.resolve_expr(*e);
                }
            }
            Stmt::If { cond, then_body, else_body, .. } => {
                self.resolve_expr(*cond);
                self.process_block(then_body, module_level);
                self.process_block(else_body, module_level);
            }
            Stmt::Loop { cond, body, .. } => {
                self.resolve_expr(*cond);
                self.process_block(body, module_level);
                let governing = self.infer_governing_slot(*cond, body);
                self.loop_governing.insert(*cond, governing);
                self.note_predicate_subjects(*cond, governing);
            }
            Stmt::Break { .. } | Stmt::Continue { .. } => {}
            Stmt::ExpressionStmt { expr, .. } => self.resolve_expr(*expr),
            Stmt::Import { .. } => {}
        }
    }

    fn resolve_expr(&mut self, expr: &'a Expr<'a>) {
        match expr {
            Expr::Literal { .. } => {}
            Expr::Identifier { name, span } => match self.scopes.lookup(*name) {
                Some(binding) => self.resolutions.insert(expr, binding.clone()),
                None => self.errors.push(SemanticError::UnboundName {
                    name: self.name(*name),
                    span: *span,
                }),
            },
            Expr::List { elements, .. } => {
                for e in elements {
                    self.resolve_expr(*e);
                }
            }
            Expr::Index { target, index, .. } => {
                self.resolve_expr(*target);
                self.resolve_expr(*index);
            }
            Expr::Call { callee, arg, .. } => {
                self.resolve_expr(*callee);
                self.resolve_expr(*arg);
                self.note_call(*callee, *arg, expr);
            }
            Expr::BinaryOp { .. } => {
                let (op, lhs, rhs) = as_binop(expr).expect("matched BinaryOp");
                self.resolve_expr(lhs);
                self.resolve_expr(rhs);
                if is_comparison(op) {
                    self.comparisons.push((lhs, rhs));
                }
            }
            Expr::UnaryOp { operand, .. } => {
                self.resolve_expr(*operand);
                // `not converged` etc: a bare predicate can sit directly
                // under a unary `not` rather than a loop condition.
                self.note_bare_predicate(*operand);
            }
            Expr::Interrogative { which, .. } => {
                let ctx = self.interrogative_context(*which);
                self.interrogatives.insert(expr, ctx);
            }
            Expr::ListComprehension { expr: inner, var, iterable, filter, .. } => {
                self.resolve_expr(*iterable);
                self.scopes.push_scope();
                let slot = self.new_slot();
                self.scopes.bind(*var, Binding::LocalSlot(slot));
                self.comprehension_vars.insert(expr, slot);
                self.resolve_expr(*inner);
                if let Some(f) = filter {
                    self.resolve_expr(*f);
                    if let Some((op, lhs, rhs)) = as_binop(f) {
                        if is_comparison(op) {
                            self.comparisons.push((lhs, rhs));
                        }
                    }
                }
                self.scopes.pop_scope();
            }
        }
        self.note_bare_predicate(expr);
    }

    /// Records a function call so the observation fixpoint can propagate
    /// "observed argument passed to parameter `p`" (spec §4.4 step 3), and
    /// records the predicate subject when `expr` is `predicate of subject`.
    fn note_call(&mut self, callee: &'a Expr<'a>, arg: &'a Expr<'a>, call_expr: &'a Expr<'a>) {
        if let Expr::Identifier { name, .. } = callee {
            let binding = self.scopes.lookup(*name).cloned();
            match binding {
                Some(Binding::FunctionRef(f)) => self.calls.push((f, arg)),
                Some(Binding::BuiltinRef(b)) if b.is_predicate() || b.is_metric() => {
                    self.predicate_seeds.push(arg);
                    let subject = self.subject_slot_of(arg);
                    self.predicate_subject.insert(call_expr, subject);
                }
                _ => {}
            }
        }
    }

    /// Handles a predicate builtin referenced bare (no `of` application),
    /// e.g. `loop while not converged:` or `x is converged`.
    fn note_bare_predicate(&mut self, expr: &'a Expr<'a>) {
        if let Expr::Identifier { name, .. } = expr {
            if let Some(Binding::BuiltinRef(b)) = self.scopes.lookup(*name) {
                if b.is_predicate() || b.is_metric() {
                    let subject = self.last_assigned;
                    self.predicate_subject.insert(expr, subject);
                }
            }
        }
    }

    /// Marks predicate subjects referenced inside a loop's governing
    /// condition once the loop's governing slot is known, covering the
    /// `loop while not converged:` form where the predicate carries no
    /// explicit argument at all.
    fn note_predicate_subjects(&mut self, cond: &'a Expr<'a>, governing: Option<SlotId>) {
        match cond {
            Expr::Identifier { .. } => {
                if self.predicate_subject.get(cond).is_some() {
                    self.predicate_subject.insert(cond, governing);
                }
            }
            Expr::UnaryOp { operand, .. } => self.note_predicate_subjects(*operand, governing),
            Expr::BinaryOp { .. } => {
                if let Some((_, lhs, rhs)) = as_binop(cond) {
                    self.note_predicate_subjects(lhs, governing);
                    self.note_predicate_subjects(rhs, governing);
                }
            }
            _ => {}
        }
    }

    /// The slot a predicate/metric call's argument names, preferring a
    /// direct identifier reference and falling back to the most recently
    /// assigned slot (spec §4.5.5 "the most recently referenced observed
    /// slot in scope").
    fn subject_slot_of(&self, arg: &'a Expr<'a>) -> Option<SlotId> {
        match arg {
            Expr::Identifier { .. } => self.resolutions.get(arg).and_then(slot_of),
            _ => self.last_assigned,
        }
    }

    /// A loop's governing slot (spec GLOSSARY): the identifier the
    /// condition names directly if there is one; otherwise the slot
    /// assigned by the first assignment in the loop body, since that's
    /// the value whose trajectory a subject-less predicate like
    /// `not converged` is evaluated against; otherwise the most recently
    /// assigned slot before the loop.
    fn infer_governing_slot(&self, cond: &'a Expr<'a>, body: &[&'a Stmt<'a>]) -> Option<SlotId> {
        if let Some(slot) = self.first_identifier_slot(cond) {
            return Some(slot);
        }
        for stmt in body {
            if let Stmt::Assignment { name, .. } = stmt {
                if let Some(binding) = self.scopes.lookup(*name) {
                    if let Some(slot) = slot_of(binding) {
                        return Some(slot);
                    }
                }
            }
        }
        self.last_assigned
    }

    fn first_identifier_slot(&self, expr: &'a Expr<'a>) -> Option<SlotId> {
        match expr {
            Expr::Identifier { .. } => self.resolutions.get(expr).and_then(slot_of),
            Expr::UnaryOp { operand, .. } => self.first_identifier_slot(*operand),
            Expr::BinaryOp { .. } => as_binop(expr).and_then(|(_, lhs, rhs)| {
                self.first_identifier_slot(lhs).or_else(|| self.first_identifier_slot(rhs))
            }),
            Expr::Call { arg, .. } => self.first_identifier_slot(*arg),
            Expr::Index { target, .. } => self.first_identifier_slot(*target),
            _ => None,
        }
    }

    fn interrogative_context(&self, which: crate::token::Interrogative) -> InterrogativeContext {
        use crate::token::Interrogative as I;
        match which {
            I::Who => InterrogativeContext::Who { function: self.current_function },
            I::What => InterrogativeContext::What { slot: self.last_assigned },
            I::When => InterrogativeContext::When { slot: self.last_assigned },
            I::Where | I::Why | I::How => InterrogativeContext::Empty,
        }
    }

    /// Observation-inference fixpoint (spec §4.4 step 3 / §3.7).
    fn run_observation_fixpoint(&mut self) -> HashSet<SlotId> {
        let mut observed = HashSet::new();

        for (lhs, rhs) in self.comparisons.clone() {
            self.seed_slots_from(lhs, &mut observed);
            self.seed_slots_from(rhs, &mut observed);
        }
        for arg in self.predicate_seeds.clone() {
            self.seed_slots_from(arg, &mut observed);
        }
        for governing in self.loop_governing.map.values() {
            if let Some(slot) = governing {
                observed.insert(*slot);
            }
        }

        loop {
            let mut changed = false;

            for (target, rhs) in self.assignments.clone() {
                if !observed.contains(&target) && self.expr_references_observed(rhs, &observed) {
                    observed.insert(target);
                    changed = true;
                }
            }

            for (callee, arg) in self.calls.clone() {
                if let Some(info) = self.functions.get(&callee) {
                    let param_slot = info.param_slot;
                    if !observed.contains(&param_slot) && self.expr_references_observed(arg, &observed) {
                        observed.insert(param_slot);
                        changed = true;
                    }
                }
            }

            if !changed {
                break;
            }
        }

        observed
    }

    fn seed_slots_from(&self, expr: &'a Expr<'a>, observed: &mut HashSet<SlotId>) {
        for slot in self.identifier_slots(expr) {
            observed.insert(slot);
        }
    }

    fn identifier_slots(&self, expr: &'a Expr<'a>) -> Vec<SlotId> {
        let mut out = Vec::new();
        self.collect_identifier_slots(expr, &mut out);
        out
    }

    fn collect_identifier_slots(&self, expr: &'a Expr<'a>, out: &mut Vec<SlotId>) {
        match expr {
            Expr::Identifier { .. } => {
                if let Some(slot) = self.resolutions.get(expr).and_then(slot_of) {
                    out.push(slot);
                }
            }
            Expr::List { elements, .. } => {
                for e in elements {
                    self.collect_identifier_slots(*e, out);
                }
            }
            Expr::Index { target, index, .. } => {
                self.collect_identifier_slots(*target, out);
                self.collect_identifier_slots(*index, out);
            }
            Expr::Call { arg, .. } => self.collect_identifier_slots(*arg, out),
            Expr::BinaryOp { .. } => {
                if let Some((_, lhs, rhs)) = as_binop(expr) {
                    self.collect_identifier_slots(lhs, out);
                    self.collect_identifier_slots(rhs, out);
                }
            }
            Expr::UnaryOp { operand, .. } => self.collect_identifier_slots(*operand, out),
            Expr::ListComprehension { expr: inner, iterable, filter, .. } => {
                self.collect_identifier_slots(*inner, out);
                self.collect_identifier_slots(*iterable, out);
                if let Some(f) = filter {
                    self.collect_identifier_slots(*f, out);
                }
            }
            Expr::Literal { .. } | Expr::Interrogative { .. } => {}
        }
    }

    fn expr_references_observed(&self, expr: &'a Expr<'a>, observed: &HashSet<SlotId>) -> bool {
        self.identifier_slots(expr).iter().any(|s| observed.contains(s))
    }
}

fn slot_of(binding: &Binding) -> Option<SlotId> {
    match binding {
        Binding::LocalSlot(s) | Binding::Parameter(s) | Binding::GlobalSlot(s) => Some(*s),
        _ => None,
    }
}

fn is_comparison(op: BinOp) -> bool {
    matches!(op, BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::AstArenas;
    use crate::lexer::lex;
    use crate::parser::parse;
    use tracec_base::{Arena, Interner};

    fn analyze_src<'a>(
        src: &str,
        interner: &mut Interner,
        arenas: &'a AstArenas<'a>,
    ) -> (Vec<&'a Stmt<'a>>, Analysis<'a>) {
        let (tokens, lex_errors) = lex(src);
        assert!(lex_errors.is_empty(), "{lex_errors:?}");
        let (stmts, parse_errors) = parse(tokens, interner, arenas);
        assert!(parse_errors.is_empty(), "{parse_errors:?}");
        let analysis = analyze(&stmts, interner);
        (stmts, analysis)
    }

    #[test]
    fn comparison_operands_are_observed() {
        let expr_arena = Arena::new();
        let stmt_arena = Arena::new();
        let arenas = AstArenas::new(&expr_arena, &stmt_arena);
        let mut interner = Interner::new();
        let (_, analysis) = analyze_src("a is 0\nloop while a < 3:\n  a is a + 1\n", &mut interner, &arenas);
        assert!(analysis.errors.is_empty());
        assert_eq!(analysis.observed.len(), 1);
    }

    #[test]
    fn contagion_propagates_through_assignment() {
        let expr_arena = Arena::new();
        let stmt_arena = Arena::new();
        let arenas = AstArenas::new(&expr_arena, &stmt_arena);
        let mut interner = Interner::new();
        let (_, analysis) =
            analyze_src("x is 0\nloop while x < 3:\n  x is x + 1\ny is x\n", &mut interner, &arenas);
        assert!(analysis.errors.is_empty());
        // x (loop-governed, observed) propagates to y via `y is x`.
        assert_eq!(analysis.observed.len(), 2);
    }

    #[test]
    fn observation_fixpoint_is_stable_across_runs() {
        let src = "x is 0\nloop while x < 3:\n  x is x + 1\ny is x\nz is y\n";

        let expr_arena = Arena::new();
        let stmt_arena = Arena::new();
        let arenas = AstArenas::new(&expr_arena, &stmt_arena);
        let mut interner = Interner::new();
        let (stmts, analysis) = analyze_src(src, &mut interner, &arenas);

        let mut interner2 = Interner::new();
        let (tokens, _) = lex(src);
        let expr_arena2 = Arena::new();
        let stmt_arena2 = Arena::new();
        let arenas2 = AstArenas::new(&expr_arena2, &stmt_arena2);
        let (stmts2, _) = parse(tokens, &mut interner2, &arenas2);
        let analysis2 = analyze(&stmts2, &mut interner2);

        assert_eq!(analysis.observed.len(), analysis2.observed.len());
        assert_eq!(stmts.len(), stmts2.len());
    }

    #[test]
    fn unbound_name_is_reported() {
        let expr_arena = Arena::new();
        let stmt_arena = Arena::new();
        let arenas = AstArenas::new(&expr_arena, &stmt_arena);
        let mut interner = Interner::new();
        let (_, analysis) = analyze_src("print of nonexistent\n", &mut interner, &arenas);
        assert!(!analysis.errors.is_empty());
    }

    #[test]
    fn function_parameter_becomes_observed_when_called_with_observed_arg() {
        let expr_arena = Arena::new();
        let stmt_arena = Arena::new();
        let arenas = AstArenas::new(&expr_arena, &stmt_arena);
        let mut interner = Interner::new();
        let src = "define f as:\n  return arg + 1\nx is 0\nloop while x < 3:\n  x is f of x\n";
        let (_, analysis) = analyze_src(src, &mut interner, &arenas);
        assert!(analysis.errors.is_empty());
        let f_sym = interner.intern("f");
        let info = analysis.functions.get(&f_sym).expect("f should be declared");
        assert!(analysis.observed.contains(&info.param_slot));
    }

    #[test]
    fn recursive_function_resolves_its_own_name() {
        let expr_arena = Arena::new();
        let stmt_arena = Arena::new();
        let arenas = AstArenas::new(&expr_arena, &stmt_arena);
        let mut interner = Interner::new();
        let src = "define fact as:\n  if arg = 0:\n    return 1\n  return arg * (fact of (arg - 1))\n";
        let (_, analysis) = analyze_src(src, &mut interner, &arenas);
        assert!(analysis.errors.is_empty());
    }
}

//! The symbol table: a stack of scopes mapping names to resolved kinds
//! (spec §3.3).
//!
//! Shaped directly after the teacher's `ScopeStack`
//! (`logicaffeine_language::scope`) — a `Vec` of `HashMap`s searched
//! innermost-first — generalized from tracking ownership state to tracking
//! the richer set of symbol kinds Trace's analyzer needs (locals, params,
//! functions, globals, builtins, imports).

use std::collections::HashMap;
use tracec_base::Symbol;

/// A unique handle for one declared local, parameter, or global slot.
///
/// Two bindings of the same `Symbol` in different (e.g. shadowed) scopes get
/// distinct `SlotId`s — this is what lets the observation set (spec §3.7)
/// and the code generator (spec §4.5.1) track each slot independently
/// rather than conflating same-named variables from different scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub u32);

/// What a name resolves to (spec §3.3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    LocalSlot(SlotId),
    Parameter(SlotId),
    FunctionRef(Symbol),
    GlobalSlot(SlotId),
    BuiltinRef(Builtin),
    ImportedName { module: Symbol, original: Symbol },
}

/// The builtins pre-populating the root scope (spec §3.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Print,
    Len,
    Append,
    Map,
    Filter,
    Reduce,
    Zip,
    Sort,
    Abs,
    Sqrt,
    Pow,
    Floor,
    Ceil,
    ListCtor,
    StringCtor,
    Converged,
    Stable,
    Oscillating,
    Diverging,
    Improving,
    FrameworkStrength,
}

impl Builtin {
    pub const ALL: &'static [(&'static str, Builtin)] = &[
        ("print", Builtin::Print),
        ("len", Builtin::Len),
        ("append", Builtin::Append),
        ("map", Builtin::Map),
        ("filter", Builtin::Filter),
        ("reduce", Builtin::Reduce),
        ("zip", Builtin::Zip),
        ("sort", Builtin::Sort),
        ("abs", Builtin::Abs),
        ("sqrt", Builtin::Sqrt),
        ("pow", Builtin::Pow),
        ("floor", Builtin::Floor),
        ("ceil", Builtin::Ceil),
        ("list", Builtin::ListCtor),
        ("string", Builtin::StringCtor),
        ("converged", Builtin::Converged),
        ("stable", Builtin::Stable),
        ("oscillating", Builtin::Oscillating),
        ("diverging", Builtin::Diverging),
        ("improving", Builtin::Improving),
        ("framework_strength", Builtin::FrameworkStrength),
    ];

    /// Whether this builtin is one of the five geometric predicates (spec
    /// §4.1), as opposed to a list/string/print/math intrinsic.
    pub fn is_predicate(self) -> bool {
        matches!(
            self,
            Builtin::Converged | Builtin::Stable | Builtin::Oscillating | Builtin::Diverging | Builtin::Improving
        )
    }

    pub fn is_metric(self) -> bool {
        matches!(self, Builtin::FrameworkStrength)
    }
}

/// A stack of lexical scopes, searched innermost-first (spec §3.3).
#[derive(Debug, Default)]
pub struct ScopeStack {
    scopes: Vec<HashMap<Symbol, Binding>>,
}

impl ScopeStack {
    /// A fresh stack with the root scope pre-populated with builtins (spec
    /// §3.3 "The root scope is pre-populated with the builtin tags").
    pub fn with_builtins(interner: &mut tracec_base::Interner) -> Self {
        let mut root = HashMap::new();
        for (name, builtin) in Builtin::ALL {
            root.insert(interner.intern(name), Binding::BuiltinRef(*builtin));
        }
        ScopeStack { scopes: vec![root] }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Binds `name` in the current (innermost) scope, shadowing any
    /// enclosing binding. Builtins are never redefinable at the root scope,
    /// but shadowing one in an inner scope is permitted (spec §4.4) — since
    /// this always writes to the *current* scope, it never overwrites the
    /// root builtin table itself.
    pub fn bind(&mut self, name: Symbol, binding: Binding) {
        self.scopes.last_mut().expect("at least one scope always present").insert(name, binding);
    }

    pub fn lookup(&self, name: Symbol) -> Option<&Binding> {
        self.scopes.iter().rev().find_map(|scope| scope.get(&name))
    }

    /// `true` if `name` already resolves in an *enclosing* (non-current)
    /// scope as a `GlobalSlot` — used by the declaration pass to decide
    /// whether an assignment target is a fresh local or an update to an
    /// existing global (spec §4.4 declaration pass).
    pub fn resolves_to_global_in_enclosing_scope(&self, name: Symbol) -> bool {
        self.scopes[..self.scopes.len().saturating_sub(1)]
            .iter()
            .rev()
            .find_map(|scope| scope.get(&name))
            .map(|b| matches!(b, Binding::GlobalSlot(_)))
            .unwrap_or(false)
    }

    /// Bindings present only in the current (innermost) scope.
    pub fn current_scope(&self) -> &HashMap<Symbol, Binding> {
        self.scopes.last().expect("at least one scope always present")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracec_base::Interner;

    #[test]
    fn builtins_resolve_at_root_scope() {
        let mut interner = Interner::new();
        let stack = ScopeStack::with_builtins(&mut interner);
        let print_sym = interner.intern("print");
        assert_eq!(stack.lookup(print_sym), Some(&Binding::BuiltinRef(Builtin::Print)));
    }

    #[test]
    fn inner_scope_shadows_outer() {
        let mut interner = Interner::new();
        let mut stack = ScopeStack::with_builtins(&mut interner);
        let x = interner.intern("x");
        stack.bind(x, Binding::GlobalSlot(SlotId(0)));
        stack.push_scope();
        stack.bind(x, Binding::LocalSlot(SlotId(1)));
        assert_eq!(stack.lookup(x), Some(&Binding::LocalSlot(SlotId(1))));
        stack.pop_scope();
        assert_eq!(stack.lookup(x), Some(&Binding::GlobalSlot(SlotId(0))));
    }

    #[test]
    fn builtin_can_be_shadowed_in_inner_scope() {
        let mut interner = Interner::new();
        let mut stack = ScopeStack::with_builtins(&mut interner);
        let print_sym = interner.intern("print");
        stack.push_scope();
        stack.bind(print_sym, Binding::LocalSlot(SlotId(0)));
        assert_eq!(stack.lookup(print_sym), Some(&Binding::LocalSlot(SlotId(0))));
    }

    #[test]
    fn unbound_name_resolves_to_none() {
        let mut interner = Interner::new();
        let stack = ScopeStack::with_builtins(&mut interner);
        let unknown = interner.intern("nonexistent");
        assert_eq!(stack.lookup(unknown), None);
    }
}

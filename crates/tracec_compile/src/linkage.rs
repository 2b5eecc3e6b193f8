//! Orders compilation units for initialization and rejects import cycles
//! (spec §4.6, §8 property 7 "the linker rejects any import cycle and
//! accepts every acyclic DAG").
//!
//! The graph-walking shape here (adjacency built as `HashMap<String,
//! HashSet<String>>`, an explicit worklist rather than recursion) follows
//! the teacher's `analysis::callgraph::CallGraph` — generalized from a
//! call graph's reachability/SCC questions to a unit-import graph's
//! topological-sort question, and from Kosaraju's algorithm to Kahn's
//! (the natural fit once the only question left is "is there a cycle, and
//! if not, what's a valid order").

use std::collections::{HashMap, HashSet, VecDeque};

use crate::error::LinkError;

/// One compilation unit's cross-module manifest, as produced by
/// [`crate::codegen::generate_unit`].
pub struct UnitManifest {
    pub name: String,
    pub imports: Vec<String>,
}

/// Topologically sorts `units` by their import edges (spec §4.6 "the
/// driver performs the topological sort; cycles are rejected with
/// `CyclicImport`"). The returned order lists dependencies before
/// dependents; within a tie, units are ordered by name, for determinism.
pub fn order_units(units: &[UnitManifest]) -> Result<Vec<String>, LinkError> {
    let known: HashSet<&str> = units.iter().map(|u| u.name.as_str()).collect();

    let mut in_degree: HashMap<&str, usize> = units.iter().map(|u| (u.name.as_str(), 0)).collect();
    let mut dependents: HashMap<&str, Vec<&str>> = units.iter().map(|u| (u.name.as_str(), Vec::new())).collect();

    for unit in units {
        for imported in &unit.imports {
            if !known.contains(imported.as_str()) {
                return Err(LinkError::UnknownImport { unit: unit.name.clone(), imported: imported.clone() });
            }
            // An edge `imported -> unit`: `imported` must initialize first.
            dependents.get_mut(imported.as_str()).expect("imported is known").push(unit.name.as_str());
            *in_degree.get_mut(unit.name.as_str()).expect("unit is known") += 1;
        }
    }

    let mut ready: Vec<&str> = in_degree.iter().filter(|(_, &deg)| deg == 0).map(|(&name, _)| name).collect();
    ready.sort_unstable();
    let mut queue: VecDeque<&str> = ready.into();

    let mut order = Vec::with_capacity(units.len());
    while let Some(name) = queue.pop_front() {
        order.push(name.to_string());
        let mut newly_ready = Vec::new();
        for &dependent in &dependents[name] {
            let deg = in_degree.get_mut(dependent).expect("dependent is known");
            *deg -= 1;
            if *deg == 0 {
                newly_ready.push(dependent);
            }
        }
        newly_ready.sort_unstable();
        for n in newly_ready {
            queue.push_back(n);
        }
    }

    if order.len() != units.len() {
        let mut remaining: Vec<String> = units.iter().map(|u| u.name.clone()).filter(|n| !order.contains(n)).collect();
        remaining.sort();
        return Err(LinkError::CyclicImport { units: remaining });
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(name: &str, imports: &[&str]) -> UnitManifest {
        UnitManifest { name: name.to_string(), imports: imports.iter().map(|s| s.to_string()).collect() }
    }

    #[test]
    fn orders_a_simple_chain() {
        let units = vec![manifest("c", &["b"]), manifest("a", &[]), manifest("b", &["a"])];
        let order = order_units(&units).unwrap();
        assert_eq!(order, vec!["a".to_string(), "b".to_string(), "c".to_string()]);
    }

    #[test]
    fn independent_units_sort_by_name() {
        let units = vec![manifest("z", &[]), manifest("a", &[]), manifest("m", &[])];
        let order = order_units(&units).unwrap();
        assert_eq!(order, vec!["a".to_string(), "m".to_string(), "z".to_string()]);
    }

    #[test]
    fn rejects_a_direct_cycle() {
        let units = vec![manifest("a", &["b"]), manifest("b", &["a"])];
        let err = order_units(&units).unwrap_err();
        assert!(matches!(err, LinkError::CyclicImport { .. }));
    }

    #[test]
    fn rejects_a_longer_cycle() {
        let units = vec![manifest("a", &["b"]), manifest("b", &["c"]), manifest("c", &["a"])];
        let err = order_units(&units).unwrap_err();
        assert!(matches!(err, LinkError::CyclicImport { .. }));
    }

    #[test]
    fn rejects_unknown_imports() {
        let units = vec![manifest("a", &["ghost"])];
        let err = order_units(&units).unwrap_err();
        assert!(matches!(err, LinkError::UnknownImport { .. }));
    }

    #[test]
    fn a_diamond_import_graph_is_acyclic() {
        let units = vec![manifest("a", &[]), manifest("b", &["a"]), manifest("c", &["a"]), manifest("d", &["b", "c"])];
        let order = order_units(&units).unwrap();
        assert_eq!(order.first().unwrap(), "a");
        assert_eq!(order.last().unwrap(), "d");
    }
}

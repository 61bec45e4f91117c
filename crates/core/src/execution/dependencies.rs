//! Module ordering
//!
//! Kahn's algorithm over the intra-workspace dependency graph. Ties are broken
//! root module first, then by relative path, so the order is reproducible. A
//! cycle anywhere in the graph discards the partial result and the whole set
//! falls back to root-first alphabetical order.

use std::collections::{BTreeSet, HashMap};

use tracing::warn;

use crate::workspace::{sort_modules, DependencyGraph, Module};

/// How an [`OrderedModules`] list was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStrategy {
    /// No dependency edges; root first, then alphabetical.
    Alphabetical,
    /// Dependencies before dependents.
    Topological,
    /// A cycle was found; root first, then alphabetical.
    CycleFallback,
}

impl std::fmt::Display for OrderStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            OrderStrategy::Alphabetical => "alphabetical",
            OrderStrategy::Topological => "dependency order",
            OrderStrategy::CycleFallback => "alphabetical (cycle fallback)",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone)]
pub struct OrderedModules {
    pub modules: Vec<Module>,
    pub strategy: OrderStrategy,
}

/// Order modules so each one comes after everything it depends on.
pub fn order_modules(modules: &[Module], graph: &DependencyGraph) -> OrderedModules {
    if graph.is_empty() {
        return OrderedModules {
            modules: fallback_order(modules),
            strategy: OrderStrategy::Alphabetical,
        };
    }

    // Duplicate identifiers resolve to the first module carrying them.
    let mut index_of: HashMap<&str, usize> = HashMap::new();
    for (index, module) in modules.iter().enumerate() {
        index_of.entry(module.identifier.as_str()).or_insert(index);
    }

    let mut in_degree = vec![0usize; modules.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); modules.len()];
    for (index, module) in modules.iter().enumerate() {
        let resolved: BTreeSet<usize> = graph
            .dependencies_of(&module.identifier)
            .iter()
            .filter_map(|dep| index_of.get(dep.as_str()).copied())
            .collect();
        in_degree[index] = resolved.len();
        for dep in resolved {
            dependents[dep].push(index);
        }
    }

    let ready_key = |index: usize| (!modules[index].is_root(), modules[index].relative_path.as_str(), index);
    let mut ready: BTreeSet<(bool, &str, usize)> = (0..modules.len())
        .filter(|&index| in_degree[index] == 0)
        .map(ready_key)
        .collect();

    let mut sorted = Vec::with_capacity(modules.len());
    while let Some((_, _, current)) = ready.pop_first() {
        sorted.push(modules[current].clone());
        for &dependent in &dependents[current] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.insert(ready_key(dependent));
            }
        }
    }

    if sorted.len() < modules.len() {
        warn!("Circular dependencies detected, falling back to root-first ordering");
        return OrderedModules {
            modules: fallback_order(modules),
            strategy: OrderStrategy::CycleFallback,
        };
    }

    OrderedModules {
        modules: sorted,
        strategy: OrderStrategy::Topological,
    }
}

fn fallback_order(modules: &[Module]) -> Vec<Module> {
    let mut ordered = modules.to_vec();
    sort_modules(&mut ordered);
    ordered
}

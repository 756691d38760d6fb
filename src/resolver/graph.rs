//! The build graph: nodes are projects, edges are `dependson`. Ordered by Kahn's
//! algorithm with declaration-order tie-breaks for deterministic builds (§3, §4.2).

use std::collections::{HashMap, VecDeque};

use petgraph::graphmap::DiGraphMap;

use crate::core::Workspace;
use crate::resolver::error::ResolveError;

/// Computes the build order of `workspace.projects` by topological sort, transitively
/// following `dependson` edges. Ties (multiple projects with zero remaining in-degree)
/// are broken by workspace-declaration order, not arbitrary iteration order.
pub fn build_order(workspace: &Workspace) -> Result<Vec<String>, ResolveError> {
    let declared: Vec<&str> = workspace.projects.iter().map(|p| p.name.as_str()).collect();
    let index_of: HashMap<&str, usize> =
        declared.iter().enumerate().map(|(i, name)| (*name, i)).collect();

    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
    for name in &declared {
        graph.add_node(name);
    }
    for project in &workspace.projects {
        for dep in &project.depends_on {
            graph.add_edge(dep.as_str(), project.name.as_str(), ());
        }
    }

    let mut in_degree: HashMap<&str, usize> = declared
        .iter()
        .map(|name| (*name, graph.neighbors_directed(name, petgraph::Direction::Incoming).count()))
        .collect();

    // Kahn's algorithm: a priority queue ordered by declaration index would also work;
    // a VecDeque refilled and re-sorted each round keeps the tie-break rule explicit.
    let mut ready: Vec<&str> =
        declared.iter().copied().filter(|n| in_degree[n] == 0).collect();
    ready.sort_by_key(|n| index_of[n]);
    let mut queue: VecDeque<&str> = ready.into();

    let mut order = Vec::with_capacity(declared.len());
    while let Some(node) = queue.pop_front() {
        order.push(node.to_string());
        let mut newly_ready = Vec::new();
        for succ in graph.neighbors_directed(node, petgraph::Direction::Outgoing) {
            let entry = in_degree.get_mut(succ).expect("node present");
            *entry -= 1;
            if *entry == 0 {
                newly_ready.push(succ);
            }
        }
        newly_ready.sort_by_key(|n| index_of[n]);
        for n in newly_ready {
            // Insert keeping overall queue roughly declaration-ordered: since newly_ready
            // nodes become ready only after `node` is dequeued, appending preserves the
            // Kahn's-algorithm guarantee that ties at any round are declaration-ordered.
            queue.push_back(n);
        }
    }

    if order.len() != declared.len() {
        let residual: Vec<String> = declared
            .iter()
            .filter(|n| in_degree[*n] > 0)
            .map(|n| n.to_string())
            .collect();
        return Err(ResolveError::Cycle { projects: residual });
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::project::{Dialect, Language, ProjectKind};
    use crate::core::Project;

    fn project(name: &str, deps: &[&str]) -> Project {
        Project::new(name, ProjectKind::ConsoleApp, Language::Cxx, Dialect::new("C++17"))
            .with_depends_on(deps.iter().map(|s| s.to_string()))
    }

    #[test]
    fn linear_chain_orders_dependencies_first() {
        let ws = Workspace::new("W", ".")
            .with_project(project("App", &["Lib"]))
            .with_project(project("Lib", &[]));
        let order = build_order(&ws).unwrap();
        assert_eq!(order, vec!["Lib".to_string(), "App".to_string()]);
    }

    #[test]
    fn declaration_order_tiebreak() {
        let ws = Workspace::new("W", ".")
            .with_project(project("B", &[]))
            .with_project(project("A", &[]))
            .with_project(project("C", &["A", "B"]));
        let order = build_order(&ws).unwrap();
        assert_eq!(order, vec!["B".to_string(), "A".to_string(), "C".to_string()]);
    }

    #[test]
    fn cycle_names_every_participant() {
        let ws = Workspace::new("W", ".")
            .with_project(project("A", &["B"]))
            .with_project(project("B", &["A"]));
        let err = build_order(&ws).unwrap_err();
        match err {
            ResolveError::Cycle { projects } => {
                assert!(projects.contains(&"A".to_string()));
                assert!(projects.contains(&"B".to_string()));
            }
            other => panic!("expected cycle error, got {other:?}"),
        }
    }
}

// src/core/call_graph/numbering.rs
use std::collections::HashMap;

use super::{CallGraph, MethodDescriptor};

/// Sequence numbers shown in the diagram and used to order report sections
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallNumbering {
    numbers: HashMap<MethodDescriptor, usize>,
}

impl CallNumbering {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number edge targets in discovery order, starting at 1.
    ///
    /// The entry never gets a number here, even when something calls it back.
    pub fn from_graph(graph: &CallGraph, entry: &MethodDescriptor) -> Self {
        let mut numbering = Self::new();
        let mut next = 1;
        for edge in graph.edges() {
            if &edge.to == entry || numbering.numbers.contains_key(&edge.to) {
                continue;
            }
            numbering.numbers.insert(edge.to.clone(), next);
            next += 1;
        }
        numbering
    }

    pub fn get(&self, method: &MethodDescriptor) -> Option<usize> {
        self.numbers.get(method).copied()
    }

    pub fn insert(&mut self, method: MethodDescriptor, number: usize) {
        self.numbers.insert(method, number);
    }

    /// Give `method` the next free number (`max + 1`) unless it has one
    pub fn assign_fallback(&mut self, method: &MethodDescriptor) -> usize {
        if let Some(existing) = self.get(method) {
            return existing;
        }
        let next = self.numbers.values().max().copied().unwrap_or(0) + 1;
        self.numbers.insert(method.clone(), next);
        next
    }

    /// Entries ordered by number
    pub fn sorted(&self) -> Vec<(&MethodDescriptor, usize)> {
        let mut entries: Vec<(&MethodDescriptor, usize)> =
            self.numbers.iter().map(|(m, n)| (m, *n)).collect();
        entries.sort_by_key(|(_, n)| *n);
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::call_graph::CallEdge;

    fn m(class_name: &str, name: &str) -> MethodDescriptor {
        MethodDescriptor::new(class_name, name, "()")
    }

    #[test]
    fn test_numbers_follow_target_discovery() {
        let entry = m("a.Service", "handle");
        let load = m("a.Repo", "load");
        let save = m("a.Repo", "save");
        let mut graph = CallGraph::new();
        graph.add_edge(CallEdge::new(entry.clone(), load.clone(), "load()"));
        graph.add_edge(CallEdge::new(load.clone(), save.clone(), "save()"));
        graph.add_edge(CallEdge::new(entry.clone(), load.clone(), "load()"));
        graph.add_edge(CallEdge::new(save.clone(), entry.clone(), "handle()"));

        let numbering = CallNumbering::from_graph(&graph, &entry);
        assert_eq!(numbering.get(&load), Some(1));
        assert_eq!(numbering.get(&save), Some(2));
        assert_eq!(numbering.get(&entry), None);
        assert_eq!(numbering.sorted().len(), 2);
    }

    #[test]
    fn test_fallback_takes_next_free_number() {
        let entry = m("a.Service", "handle");
        let mut numbering = CallNumbering::new();
        assert_eq!(numbering.assign_fallback(&entry), 1);
        assert_eq!(numbering.assign_fallback(&entry), 1);

        numbering.insert(m("a.Repo", "load"), 7);
        assert_eq!(numbering.assign_fallback(&m("a.Repo", "save")), 8);

        let order: Vec<usize> = numbering.sorted().into_iter().map(|(_, n)| n).collect();
        assert_eq!(order, vec![1, 7, 8]);
    }
}

// src/core/call_graph/builder.rs
use std::collections::HashSet;
use tracing::{debug, info};

use super::{CallEdge, CallGraph, CallGraphResult, MethodDescriptor, MethodRef};
use crate::core::source::SourceModel;

/// Placeholder for an argument whose source text is unavailable
const UNKNOWN_ARGUMENT: &str = "?";

/// Builds the call graph reachable from one entry method
pub struct CallGraphBuilder {
    /// Deepest level whose body is still scanned (entry is depth 0)
    max_depth: usize,
}

/// Mutable state for a single build
struct Traversal {
    graph: CallGraph,
    index: Vec<MethodDescriptor>,
    indexed: HashSet<MethodDescriptor>,
    visited: HashSet<MethodDescriptor>,
}

impl Traversal {
    fn register(&mut self, method: &MethodDescriptor) {
        if self.indexed.insert(method.clone()) {
            self.index.push(method.clone());
        }
    }
}

impl CallGraphBuilder {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Build the call graph starting from `entry`.
    ///
    /// An unresolvable entry yields an empty graph and an empty index.
    pub fn build<M: SourceModel>(&self, model: &M, entry: &MethodRef) -> CallGraphResult {
        let Some(entry) = model.resolve(entry) else {
            debug!("Entry {} did not resolve, returning empty graph", entry);
            return CallGraphResult::default();
        };

        let mut traversal = Traversal {
            graph: CallGraph::new(),
            index: Vec::new(),
            indexed: HashSet::new(),
            visited: HashSet::new(),
        };
        self.traverse(model, &entry, 0, &mut traversal);

        let stats = traversal.graph.get_statistics();
        info!(
            "Built call graph from {}: {} methods, {} calls, widest fan-out {} (max depth {})",
            entry.display_label(),
            stats.total_methods,
            stats.total_calls,
            stats.max_out_degree,
            self.max_depth
        );

        CallGraphResult {
            graph: traversal.graph,
            index: traversal.index,
        }
    }

    fn traverse<M: SourceModel>(
        &self,
        model: &M,
        method: &MethodDescriptor,
        depth: usize,
        traversal: &mut Traversal,
    ) {
        if depth > self.max_depth {
            return;
        }
        traversal.register(method);
        if !traversal.visited.insert(method.clone()) {
            return;
        }

        for call in model.call_sites(method) {
            let Some(target) = model.resolve_call_target(&call) else {
                debug!("Skipping unresolved call in {}", method.display_label());
                continue;
            };
            if !model.is_analyzable_content(&target) {
                debug!("Skipping call to non-project method {}", target.display_label());
                continue;
            }

            traversal.register(&target);
            let call_text = describe_call(&target, &model.call_arguments(&call));
            traversal
                .graph
                .add_edge(CallEdge::new(method.clone(), target.clone(), call_text));

            if depth + 1 > self.max_depth {
                continue;
            }
            self.traverse(model, &target, depth + 1, traversal);
        }
    }
}

/// `name(arg1, arg2)` with `?` for unknown argument text
fn describe_call(target: &MethodDescriptor, arguments: &[Option<String>]) -> String {
    let args: Vec<&str> = arguments
        .iter()
        .map(|arg| arg.as_deref().unwrap_or(UNKNOWN_ARGUMENT))
        .collect();
    format!("{}({})", target.method_name, args.join(", "))
}

impl Default for CallGraphBuilder {
    fn default() -> Self {
        Self::new(5)
    }
}

// src/core/render/mermaid.rs
use std::collections::{HashMap, HashSet};
use std::fmt::Write;

use regex::Regex;

use crate::core::call_graph::{simple_name, CallEdge, CallGraph, CallNumbering, MethodDescriptor};

const FALLBACK_ALIAS: &str = "Participant";

/// Renders a call graph as a Mermaid sequence diagram
pub struct MermaidRenderer {
    /// Matches characters Mermaid does not accept in participant ids
    invalid_alias_chars: Regex,
}

/// Participant alias per declaring type, in first-use order
struct Participants {
    by_class: HashMap<String, String>,
    uses: HashMap<String, usize>,
    order: Vec<String>,
}

impl Participants {
    fn new() -> Self {
        Self {
            by_class: HashMap::new(),
            uses: HashMap::new(),
            order: Vec::new(),
        }
    }

    fn alias(&self, class_name: &str) -> &str {
        self.by_class
            .get(class_name)
            .map(String::as_str)
            .unwrap_or(FALLBACK_ALIAS)
    }
}

impl MermaidRenderer {
    pub fn new() -> Self {
        Self {
            invalid_alias_chars: Regex::new(r"[^A-Za-z0-9_]").expect("Invalid alias regex"),
        }
    }

    pub fn render(&self, graph: &CallGraph, entry: &MethodDescriptor, numbering: &CallNumbering) -> String {
        let participants = self.build_participants(graph, entry);
        let mut out = String::from("sequenceDiagram\n");

        let mut declared = HashSet::new();
        for alias in &participants.order {
            if declared.insert(alias.as_str()) {
                let _ = writeln!(out, "    participant {}", alias);
            }
        }

        for edge in graph.edges() {
            self.append_edge(&mut out, edge, &participants, numbering);
        }

        out
    }

    fn build_participants(&self, graph: &CallGraph, entry: &MethodDescriptor) -> Participants {
        let mut participants = Participants::new();
        self.register(&mut participants, &entry.class_name);

        let mut rest: Vec<&MethodDescriptor> = graph.methods().iter().filter(|m| *m != entry).collect();
        rest.sort_by(|a, b| {
            a.class_name
                .cmp(&b.class_name)
                .then_with(|| a.method_name.cmp(&b.method_name))
        });
        for method in rest {
            self.register(&mut participants, &method.class_name);
        }
        participants
    }

    /// First type to claim a base name keeps it; later ones get `_2`, `_3`, ...
    fn register(&self, participants: &mut Participants, class_name: &str) {
        if participants.by_class.contains_key(class_name) {
            return;
        }
        let simple = simple_name(class_name);
        let base = if simple.trim().is_empty() {
            class_name.replace('.', "_")
        } else {
            simple.to_string()
        };
        let sanitized = self.sanitize(&base);

        let count = participants.uses.entry(sanitized.clone()).or_insert(0);
        *count += 1;
        let alias = if *count == 1 {
            sanitized
        } else {
            format!("{}_{}", sanitized, count)
        };

        participants.by_class.insert(class_name.to_string(), alias.clone());
        participants.order.push(alias);
    }

    fn sanitize(&self, raw: &str) -> String {
        let sanitized = self.invalid_alias_chars.replace_all(raw, "_").into_owned();
        if sanitized.trim().is_empty() {
            FALLBACK_ALIAS.to_string()
        } else {
            sanitized
        }
    }

    fn append_edge(&self, out: &mut String, edge: &CallEdge, participants: &Participants, numbering: &CallNumbering) {
        // `#35;` is Mermaid's entity for '#', which it otherwise treats as markup
        let marker = numbering
            .get(&edge.to)
            .map(|n| format!("#35;{} ", n))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "    {}->>{}: {}{}",
            participants.alias(&edge.from.class_name),
            participants.alias(&edge.to.class_name),
            marker,
            edge.call_text
        );
    }
}

impl Default for MermaidRenderer {
    fn default() -> Self {
        Self::new()
    }
}

// src/core/call_graph/call_graph.rs - Call graph data model
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::MethodInsightError;

/// Unique identifier for a method in the codebase.
///
/// Equality and hashing cover all three fields, so two overloads never
/// collapse into one node even if their labels happen to look alike.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MethodDescriptor {
    /// Declaring type, fully qualified when known
    pub class_name: String,
    /// Method name
    pub method_name: String,
    /// Parameter types rendered as `(A, B)`
    pub signature: String,
}

impl MethodDescriptor {
    pub fn new(
        class_name: impl Into<String>,
        method_name: impl Into<String>,
        signature: impl Into<String>,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            method_name: method_name.into(),
            signature: signature.into(),
        }
    }

    /// `<type>.<method><signature>`, used for presentation only
    pub fn display_label(&self) -> String {
        format!("{}.{}{}", self.class_name, self.method_name, self.signature)
    }

    /// Declaring type without its package
    pub fn simple_class_name(&self) -> &str {
        simple_name(&self.class_name)
    }

    /// Same as the label but with the unqualified type name
    pub fn simple_display(&self) -> String {
        format!("{}.{}{}", self.simple_class_name(), self.method_name, self.signature)
    }

    /// Type name minus its trailing simple segment
    pub fn package_name(&self) -> &str {
        match self.class_name.rfind('.') {
            Some(idx) => &self.class_name[..idx],
            None => &self.class_name,
        }
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}{}", self.class_name, self.method_name, self.signature)
    }
}

/// Segment after the last `.`
pub fn simple_name(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}

/// Normalizes one parameter type: whitespace dropped, package stripped from
/// non-generic types.
pub fn normalize_type(raw: &str) -> String {
    let compact: String = raw.split_whitespace().collect();
    if compact.contains('<') {
        return compact;
    }
    match compact.strip_suffix("...") {
        Some(base) => format!("{}...", simple_name(base)),
        None => simple_name(&compact).to_string(),
    }
}

/// `(A, B)` from parameter type texts
pub fn render_signature<I, S>(params: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let parts: Vec<String> = params
        .into_iter()
        .map(|p| normalize_type(p.as_ref()))
        .filter(|p| !p.is_empty())
        .collect();
    format!("({})", parts.join(", "))
}

/// Splits on commas that are not nested inside `<...>`
fn split_top_level(params: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (idx, ch) in params.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&params[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&params[start..]);
    parts
}

/// What a host hands to the builder before resolution.
///
/// Accepts `Type#method`, `pkg.Type.method` and `pkg.Type.method(A, B)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodRef {
    pub class_name: String,
    pub method_name: String,
    /// Normalized `(A, B)` form when the caller pinned an overload
    pub signature: Option<String>,
}

impl MethodRef {
    pub fn new(class_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            method_name: method_name.into(),
            signature: None,
        }
    }

    pub fn with_signature(mut self, params: &[&str]) -> Self {
        self.signature = Some(render_signature(params));
        self
    }
}

impl From<&MethodDescriptor> for MethodRef {
    fn from(descriptor: &MethodDescriptor) -> Self {
        Self {
            class_name: descriptor.class_name.clone(),
            method_name: descriptor.method_name.clone(),
            signature: Some(descriptor.signature.clone()),
        }
    }
}

fn method_ref_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^\s*(?P<class>[A-Za-z_$][\w$]*(?:\.[A-Za-z_$][\w$]*)*)(?:#|\.)(?P<method>[A-Za-z_$][\w$]*)\s*(?:\((?P<params>[^()]*)\))?\s*$",
        )
        .expect("Invalid method reference regex")
    })
}

impl FromStr for MethodRef {
    type Err = MethodInsightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = method_ref_pattern()
            .captures(s)
            .ok_or_else(|| MethodInsightError::InvalidMethodRef(s.to_string()))?;

        let signature = caps
            .name("params")
            .map(|params| render_signature(split_top_level(params.as_str())));

        Ok(Self {
            class_name: caps["class"].to_string(),
            method_name: caps["method"].to_string(),
            signature,
        })
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.class_name, self.method_name)?;
        if let Some(signature) = &self.signature {
            write!(f, "{}", signature)?;
        }
        Ok(())
    }
}

/// Edge in the call graph representing one call site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallEdge {
    /// Method making the call
    pub from: MethodDescriptor,
    /// Method being called
    pub to: MethodDescriptor,
    /// Rendered call, e.g. `load(key)`
    pub call_text: String,
}

impl CallEdge {
    pub fn new(from: MethodDescriptor, to: MethodDescriptor, call_text: impl Into<String>) -> Self {
        Self {
            from,
            to,
            call_text: call_text.into(),
        }
    }
}

/// Append-only call graph for a single report.
///
/// Methods are only added through edges, in the order they are first seen.
#[derive(Debug, Clone, Default)]
pub struct CallGraph {
    edges: Vec<CallEdge>,
    methods: Vec<MethodDescriptor>,
    known: HashSet<MethodDescriptor>,
}

impl CallGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a call edge and register both endpoints
    pub fn add_edge(&mut self, edge: CallEdge) {
        self.register(&edge.from);
        self.register(&edge.to);
        self.edges.push(edge);
    }

    fn register(&mut self, method: &MethodDescriptor) {
        if self.known.insert(method.clone()) {
            self.methods.push(method.clone());
        }
    }

    /// All edges in discovery order
    pub fn edges(&self) -> &[CallEdge] {
        &self.edges
    }

    /// All methods in first-seen order
    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    pub fn contains(&self, method: &MethodDescriptor) -> bool {
        self.known.contains(method)
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Get methods that this method calls (outgoing edges, duplicates kept)
    pub fn get_callees(&self, method: &MethodDescriptor) -> Vec<&MethodDescriptor> {
        self.edges
            .iter()
            .filter(|edge| &edge.from == method)
            .map(|edge| &edge.to)
            .collect()
    }

    /// Get statistics about the call graph
    pub fn get_statistics(&self) -> CallGraphStats {
        CallGraphStats {
            total_methods: self.methods.len(),
            total_calls: self.edges.len(),
            max_out_degree: self
                .methods
                .iter()
                .map(|m| self.get_callees(m).len())
                .max()
                .unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallGraphStats {
    pub total_methods: usize,
    pub total_calls: usize,
    pub max_out_degree: usize,
}

/// The graph plus every identity registered while building it
#[derive(Debug, Clone, Default)]
pub struct CallGraphResult {
    pub graph: CallGraph,
    /// Entry first, then call targets in discovery order
    pub index: Vec<MethodDescriptor>,
}

impl CallGraphResult {
    pub fn is_indexed(&self, method: &MethodDescriptor) -> bool {
        self.index.contains(method)
    }
}

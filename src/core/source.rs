// src/core/source.rs
//! Query contracts the analysis runs against.
//!
//! The call graph builder and the test matcher never look at syntax trees
//! directly. Anything that can answer these questions (the bundled Java index,
//! a language server, a batch indexer) can drive a report.

use serde::{Deserialize, Serialize};

use super::call_graph::{MethodDescriptor, MethodRef};

/// An annotation attached to a method, with its raw attribute texts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Qualified name when it could be resolved, otherwise as written
    pub name: String,
    /// `(attribute, source text)`; a bare argument is stored as `value`
    pub attributes: Vec<(String, String)>,
}

impl Annotation {
    pub fn marker(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Resolution side: method bodies and call targets
pub trait SourceModel {
    type CallSite;

    /// Resolve a host-supplied reference to a method identity
    fn resolve(&self, method: &MethodRef) -> Option<MethodDescriptor>;

    /// Call sites inside the method's body, in source order
    fn call_sites(&self, method: &MethodDescriptor) -> Vec<Self::CallSite>;

    /// The method a call site invokes, if it is known at all
    fn resolve_call_target(&self, call: &Self::CallSite) -> Option<MethodDescriptor>;

    /// Source text of each argument; `None` where it is unavailable
    fn call_arguments(&self, call: &Self::CallSite) -> Vec<Option<String>>;

    /// Whether the method is declared in project content (not a library)
    fn is_analyzable_content(&self, method: &MethodDescriptor) -> bool;
}

/// Search side: who references a method, and what those referrers look like
pub trait ReferenceIndex {
    type Location;

    fn references_to(&self, method: &MethodDescriptor) -> Vec<Self::Location>;

    fn enclosing_method(&self, location: &Self::Location) -> Option<MethodDescriptor>;

    fn is_test_source(&self, method: &MethodDescriptor) -> bool;

    fn annotations_of(&self, method: &MethodDescriptor) -> Vec<Annotation>;

    fn source_text_of(&self, method: &MethodDescriptor) -> Option<String>;

    fn language_tag_of(&self, method: &MethodDescriptor) -> Option<String>;
}

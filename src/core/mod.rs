// src/core/mod.rs
mod engine;
mod source;

// Call graph construction and numbering
mod call_graph;

// Test discovery over the call graph
mod coverage;

// Diagram, report and export rendering
mod render;

// Language-specific parsers and the project index
mod languages;

pub use call_graph::{
    normalize_type, render_signature, simple_name, CallEdge, CallGraph, CallGraphBuilder, CallGraphResult,
    CallGraphStats, CallNumbering, MethodDescriptor, MethodRef,
};
pub use coverage::{FrameworkDetector, MatchType, TestFinder, TestReference, TestReport};
pub use languages::{
    Import, JavaCallSite, JavaParser, LanguageParser, ParsedCall, ParsedFile, ParsedMethod, ParsedType, ProjectIndex,
    Receiver, ReferenceLocation, RootKind, SourceFile,
};
pub use render::{MarkdownReportRenderer, MermaidRenderer, TestReportFormatter};
pub use source::{Annotation, ReferenceIndex, SourceModel};

// Export the main engine
pub use engine::{ReportEngine, SequenceReport};

// src/core/call_graph/mod.rs
//! Call graph construction for a single entry method
//!
//! The builder walks outwards from the entry through resolved call sites,
//! bounded by depth and memoized by method identity, so recursive chains
//! always terminate. Numbering then fixes the order in which callees are
//! presented in the diagram and the report.

mod builder;
mod call_graph;
mod numbering;

pub use builder::CallGraphBuilder;
pub use call_graph::{
    normalize_type, render_signature, simple_name, CallEdge, CallGraph, CallGraphResult,
    CallGraphStats, MethodDescriptor, MethodRef,
};
pub use numbering::CallNumbering;

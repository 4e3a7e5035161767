// src/core/render/mod.rs
//! Text output for a sequence report
//!
//! Everything here is deterministic: the same graph, numbering and findings
//! always produce byte-identical text.

mod export;
mod markdown;
mod mermaid;

pub use export::TestReportFormatter;
pub use markdown::MarkdownReportRenderer;
pub use mermaid::MermaidRenderer;

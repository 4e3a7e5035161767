// src/core/engine.rs
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::call_graph::{CallGraphBuilder, CallGraphStats, CallNumbering, MethodDescriptor, MethodRef};
use super::coverage::{FrameworkDetector, MatchType, TestFinder, TestReport};
use super::render::{MarkdownReportRenderer, MermaidRenderer, TestReportFormatter};
use super::source::{ReferenceIndex, SourceModel};
use crate::config::{Config, OutputConfig};
use crate::error::{MethodInsightError, Result};

/// Runs the whole pipeline for one entry method
pub struct ReportEngine {
    config: Config,
    builder: CallGraphBuilder,
    finder: TestFinder,
    mermaid: MermaidRenderer,
    markdown: MarkdownReportRenderer,
    formatter: TestReportFormatter,
}

/// Everything produced for one entry method
#[derive(Debug, Clone)]
pub struct SequenceReport {
    pub entry: MethodDescriptor,
    pub diagram: String,
    pub markdown: String,
    /// JSON export of the test findings
    pub export: String,
    /// Final numbering, fallback numbers included
    pub numbering: CallNumbering,
    pub stats: CallGraphStats,
    pub tests: TestReport,
}

impl ReportEngine {
    pub fn new(config: Config) -> Self {
        let builder = CallGraphBuilder::new(config.analysis.max_depth);
        let finder = TestFinder::new(FrameworkDetector::new(&config.frameworks));
        Self {
            config,
            builder,
            finder,
            mermaid: MermaidRenderer::new(),
            markdown: MarkdownReportRenderer::new(),
            formatter: TestReportFormatter::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build the graph, find tests and render every output.
    ///
    /// Fails only when the entry reference does not resolve.
    pub fn generate<M>(&self, model: &M, entry: &MethodRef) -> Result<SequenceReport>
    where
        M: SourceModel + ReferenceIndex,
    {
        let descriptor = model
            .resolve(entry)
            .ok_or_else(|| MethodInsightError::EntryNotFound(entry.to_string()))?;

        info!("🔍 Building call graph for {}", descriptor.display_label());
        let result = self.builder.build(model, &MethodRef::from(&descriptor));
        let stats = result.graph.get_statistics();

        let mut numbering = CallNumbering::from_graph(&result.graph, &descriptor);
        let diagram = self.mermaid.render(&result.graph, &descriptor, &numbering);

        info!("🧪 Searching tests across {} indexed methods", result.index.len());
        let tests = self.finder.find_tests(model, &descriptor, &result);

        let markdown = self.markdown.render(&descriptor, &diagram, &tests, &mut numbering);
        let export = self.formatter.to_json(&tests);

        info!(
            "📝 Report ready: {} calls, {} tests ({} direct)",
            stats.total_calls,
            tests.findings.len(),
            tests.count_by_type(MatchType::Direct)
        );

        Ok(SequenceReport {
            entry: descriptor,
            diagram,
            markdown,
            export,
            numbering,
            stats,
            tests,
        })
    }
}

impl SequenceReport {
    /// `<method>.<suffix>.<extension>`
    pub fn file_name(&self, suffix: &str, extension: &str) -> String {
        let mut name = self.entry.method_name.clone();
        for part in [suffix, extension] {
            let part = part.trim().trim_matches('.');
            if !part.is_empty() {
                name.push('.');
                name.push_str(part);
            }
        }
        name
    }

    /// Write the Markdown report, plus the diagram and JSON export when
    /// enabled. Returns the written paths in that order.
    pub fn write_to(&self, dir: &Path, output: &OutputConfig) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir)?;
        let mut written = Vec::new();

        let markdown_path = dir.join(self.file_name(&output.markdown_suffix, &output.markdown_extension));
        fs::write(&markdown_path, &self.markdown)?;
        written.push(markdown_path);

        if output.write_mermaid {
            let path = dir.join(self.file_name(&output.mermaid_suffix, &output.mermaid_extension));
            fs::write(&path, &self.diagram)?;
            written.push(path);
        }

        if output.write_test_report {
            let path = dir.join(self.file_name("", &output.test_report_extension));
            fs::write(&path, &self.export)?;
            written.push(path);
        }

        for path in &written {
            debug!("Wrote {}", path.display());
        }
        Ok(written)
    }
}

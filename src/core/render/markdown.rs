// src/core/render/markdown.rs
use std::collections::HashMap;
use std::fmt::Write;

use crate::core::call_graph::{CallNumbering, MethodDescriptor};
use crate::core::coverage::{TestReference, TestReport};

const NO_TESTS: &str = "No matching tests were found.";

/// Assembles the final Markdown report: overview, diagram and tests
pub struct MarkdownReportRenderer;

/// Tests grouped by the graph method they were found through
struct Group<'a> {
    method: &'a MethodDescriptor,
    tests: Vec<&'a TestReference>,
}

impl MarkdownReportRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render the report.
    ///
    /// Matched methods without a number (typically the entry) are given the
    /// next free number, so `numbering` may grow.
    pub fn render(
        &self,
        entry: &MethodDescriptor,
        mermaid: &str,
        report: &TestReport,
        numbering: &mut CallNumbering,
    ) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# Sequence Report: {}", entry.display_label());
        out.push('\n');

        self.append_overview(&mut out, entry, report);

        out.push_str("## Sequence Diagram\n");
        out.push_str("---\n");
        out.push_str("```mermaid\n");
        out.push_str(mermaid.trim());
        out.push_str("\n```\n\n");

        out.push_str("## Tests\n");
        out.push_str("---\n");
        if !self.append_sections(&mut out, &report.findings, numbering) {
            out.push_str(NO_TESTS);
            out.push('\n');
        }

        out
    }

    fn append_overview(&self, out: &mut String, entry: &MethodDescriptor, report: &TestReport) {
        let frameworks = report.frameworks();
        let frameworks_text = if frameworks.is_empty() {
            "-".to_string()
        } else {
            frameworks.join(", ")
        };

        out.push_str("## Overview\n");
        let _ = writeln!(out, "- Package: {}", entry.package_name());
        let _ = writeln!(out, "- Entry method: {}", entry.display_label());
        let _ = writeln!(out, "- Frameworks: {}", frameworks_text);
        let _ = writeln!(out, "- Tests: total {}", report.findings.len());
        out.push('\n');
    }

    /// Returns whether at least one section was written
    fn append_sections(&self, out: &mut String, findings: &[TestReference], numbering: &mut CallNumbering) -> bool {
        let mut groups: Vec<Group> = Vec::new();
        let mut positions: HashMap<&MethodDescriptor, usize> = HashMap::new();

        let seeded: Vec<MethodDescriptor> = numbering.sorted().into_iter().map(|(m, _)| m.clone()).collect();
        let matched: Vec<&MethodDescriptor> = findings.iter().filter_map(|f| f.matched_method.as_ref()).collect();

        // Numbered methods that were matched keep their slot; the rest of the
        // seed never receives tests and would be skipped anyway.
        for method in &seeded {
            if let Some(found) = matched.iter().find(|m| **m == method) {
                positions.insert(*found, groups.len());
                groups.push(Group { method: *found, tests: Vec::new() });
            }
        }
        for method in &matched {
            if !positions.contains_key(*method) {
                numbering.assign_fallback(method);
                positions.insert(*method, groups.len());
                groups.push(Group { method: *method, tests: Vec::new() });
            }
        }

        let mut unassigned: Vec<&TestReference> = Vec::new();
        for reference in findings {
            match reference.matched_method.as_ref().and_then(|m| positions.get(m)) {
                Some(&pos) => groups[pos].tests.push(reference),
                None => unassigned.push(reference),
            }
        }

        groups.sort_by_key(|g| numbering.get(g.method).unwrap_or(usize::MAX));

        let mut appended = false;
        for group in &groups {
            let with_source: Vec<&TestReference> =
                group.tests.iter().copied().filter(|t| t.source_code.is_some()).collect();
            if !with_source.is_empty() {
                self.append_section(out, Some(group.method), numbering, &with_source);
                appended = true;
            }
        }

        let leftover: Vec<&TestReference> =
            unassigned.into_iter().filter(|t| t.source_code.is_some()).collect();
        if !leftover.is_empty() {
            self.append_section(out, None, numbering, &leftover);
            appended = true;
        }

        appended
    }

    fn append_section(
        &self,
        out: &mut String,
        method: Option<&MethodDescriptor>,
        numbering: &CallNumbering,
        tests: &[&TestReference],
    ) {
        match method {
            Some(m) => {
                match numbering.get(m) {
                    Some(number) => {
                        let _ = writeln!(out, "## #{} {}", number, m.simple_display());
                    }
                    None => {
                        let _ = writeln!(out, "## Call {}", m.simple_display());
                    }
                }
                let _ = writeln!(out, "- Declared in: {}", m.class_name);
            }
            None => out.push_str("## Call (unresolved method)\n"),
        }
        out.push('\n');

        for (i, test) in tests.iter().enumerate() {
            let _ = writeln!(out, "#### {}. {}.{}", i + 1, test.simple_class_name(), test.method_name);
            out.push('\n');
            let _ = writeln!(out, "- Display name: {}", test.display_name.as_deref().unwrap_or("-"));
            out.push('\n');

            let Some(code) = &test.source_code else {
                continue;
            };
            let language = test
                .language_id
                .as_deref()
                .filter(|l| !l.trim().is_empty())
                .unwrap_or("text");
            out.push_str("<details>\n");
            out.push_str("<summary>Show source</summary>\n\n");
            let _ = writeln!(out, "```{}", language);
            out.push_str(code.trim());
            out.push_str("\n```\n\n");
            out.push_str("</details>\n\n");
        }
    }
}

impl Default for MarkdownReportRenderer {
    fn default() -> Self {
        Self::new()
    }
}

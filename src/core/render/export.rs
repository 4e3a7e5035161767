// src/core/render/export.rs
use crate::core::coverage::{TestReference, TestReport};

/// Fixed-schema JSON writer for test reports.
///
/// Only backslash, double quote, LF, CR and TAB are escaped. Other control
/// characters pass through verbatim, so the output is not guaranteed to be
/// strict JSON for arbitrary input.
pub struct TestReportFormatter;

impl TestReportFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn to_json(&self, report: &TestReport) -> String {
        let mut out = String::with_capacity(256);
        out.push_str("{\"entryPoint\":");
        push_string(&mut out, &report.entry_point.display_label());
        out.push_str(",\"findings\":[");
        for (i, finding) in report.findings.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            push_finding(&mut out, finding);
        }
        out.push_str("]}");
        out
    }
}

fn push_finding(out: &mut String, finding: &TestReference) {
    out.push_str("{\"className\":");
    push_string(out, &finding.class_name);
    out.push_str(",\"methodName\":");
    push_string(out, &finding.method_name);
    out.push_str(",\"framework\":");
    push_string(out, &finding.framework);
    out.push_str(",\"displayName\":");
    push_optional(out, finding.display_name.as_deref());
    out.push_str(",\"matchType\":");
    push_string(out, finding.match_type.name());
    out.push_str(",\"sourceCode\":");
    push_optional(out, finding.source_code.as_deref());
    out.push_str(",\"languageId\":");
    push_optional(out, finding.language_id.as_deref());
    out.push_str(",\"matchedMethod\":");
    let matched = finding.matched_method.as_ref().map(|m| m.display_label());
    push_optional(out, matched.as_deref());
    out.push('}');
}

fn push_optional(out: &mut String, value: Option<&str>) {
    match value {
        Some(v) => push_string(out, v),
        None => out.push_str("null"),
    }
}

fn push_string(out: &mut String, value: &str) {
    out.push('"');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out.push('"');
}

impl Default for TestReportFormatter {
    fn default() -> Self {
        Self::new()
    }
}

// src/core/coverage/test_reference.rs
use serde::{Deserialize, Serialize};

use crate::core::call_graph::MethodDescriptor;

/// How a test reaches the entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchType {
    /// The test calls the entry method itself
    Direct,
    /// The test calls one of the entry's reachable callees
    Closure,
}

impl MatchType {
    pub fn name(&self) -> &'static str {
        match self {
            MatchType::Direct => "DIRECT",
            MatchType::Closure => "CLOSURE",
        }
    }
}

/// A single test method that exercises part of the call graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestReference {
    pub class_name: String,
    pub method_name: String,
    pub framework: String,
    pub display_name: Option<String>,
    pub match_type: MatchType,
    pub source_code: Option<String>,
    pub language_id: Option<String>,
    /// The graph method this test was found through
    pub matched_method: Option<MethodDescriptor>,
}

impl TestReference {
    /// `<TestType>#<testMethod>`, the deduplication key
    pub fn key(&self) -> String {
        format!("{}#{}", self.class_name, self.method_name)
    }

    pub fn simple_class_name(&self) -> &str {
        crate::core::call_graph::simple_name(&self.class_name)
    }
}

/// All tests found for one entry method, first-seen order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestReport {
    pub entry_point: MethodDescriptor,
    pub findings: Vec<TestReference>,
}

impl TestReport {
    pub fn empty(entry_point: MethodDescriptor) -> Self {
        Self {
            entry_point,
            findings: Vec::new(),
        }
    }

    /// Sorted, de-duplicated, non-blank framework labels
    pub fn frameworks(&self) -> Vec<&str> {
        let mut frameworks: Vec<&str> = self
            .findings
            .iter()
            .map(|f| f.framework.as_str())
            .filter(|f| !f.trim().is_empty())
            .collect();
        frameworks.sort_unstable();
        frameworks.dedup();
        frameworks
    }

    pub fn count_by_type(&self, match_type: MatchType) -> usize {
        self.findings.iter().filter(|f| f.match_type == match_type).count()
    }
}

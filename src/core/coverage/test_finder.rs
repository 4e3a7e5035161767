// src/core/coverage/test_finder.rs
use std::collections::HashMap;
use tracing::{debug, info};

use super::{FrameworkDetector, MatchType, TestReference, TestReport};
use crate::core::call_graph::{CallGraphResult, MethodDescriptor};
use crate::core::source::ReferenceIndex;

/// Maps tests back onto a call graph
pub struct TestFinder {
    detector: FrameworkDetector,
}

/// Insertion-ordered findings keyed by `<TestType>#<testMethod>`
#[derive(Default)]
struct Findings {
    positions: HashMap<String, usize>,
    ordered: Vec<TestReference>,
}

impl Findings {
    /// DIRECT replaces CLOSURE in place; nothing else overwrites
    fn offer(&mut self, reference: TestReference) {
        let key = reference.key();
        match self.positions.get(&key) {
            Some(&pos) => {
                let existing = &mut self.ordered[pos];
                if existing.match_type == MatchType::Closure && reference.match_type == MatchType::Direct {
                    debug!("Upgrading {} to a direct match", key);
                    *existing = reference;
                }
            }
            None => {
                self.positions.insert(key, self.ordered.len());
                self.ordered.push(reference);
            }
        }
    }
}

impl TestFinder {
    pub fn new(detector: FrameworkDetector) -> Self {
        Self { detector }
    }

    /// Find tests referencing the entry (DIRECT) or any indexed callee (CLOSURE)
    pub fn find_tests<R: ReferenceIndex>(
        &self,
        index: &R,
        entry: &MethodDescriptor,
        result: &CallGraphResult,
    ) -> TestReport {
        if !result.is_indexed(entry) {
            debug!("Entry {} is not indexed, no tests to search", entry.display_label());
            return TestReport::empty(entry.clone());
        }

        let mut findings = Findings::default();
        self.search_references(index, entry, MatchType::Direct, &mut findings);
        for method in result.index.iter().filter(|m| *m != entry) {
            self.search_references(index, method, MatchType::Closure, &mut findings);
        }

        let report = TestReport {
            entry_point: entry.clone(),
            findings: findings.ordered,
        };
        info!(
            "Found {} tests for {} ({} direct, {} via callees)",
            report.findings.len(),
            entry.display_label(),
            report.count_by_type(MatchType::Direct),
            report.count_by_type(MatchType::Closure)
        );
        report
    }

    fn search_references<R: ReferenceIndex>(
        &self,
        index: &R,
        target: &MethodDescriptor,
        match_type: MatchType,
        findings: &mut Findings,
    ) {
        for location in index.references_to(target) {
            let Some(container) = index.enclosing_method(&location) else {
                continue;
            };
            if !index.is_test_source(&container) {
                continue;
            }
            let annotations = index.annotations_of(&container);
            let Some(framework) = self.detector.detect(&annotations) else {
                continue;
            };

            findings.offer(TestReference {
                class_name: container.class_name.clone(),
                method_name: container.method_name.clone(),
                framework: framework.to_string(),
                display_name: self.detector.display_name(&annotations),
                match_type,
                source_code: index.source_text_of(&container),
                language_id: index.language_tag_of(&container),
                matched_method: Some(target.clone()),
            });
        }
    }
}

impl Default for TestFinder {
    fn default() -> Self {
        Self::new(FrameworkDetector::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::call_graph::{CallGraphBuilder, MethodRef};
    use crate::core::source::fixtures::{method, FakeProject};
    use crate::core::source::Annotation;

    fn junit5() -> Vec<Annotation> {
        vec![Annotation::marker("org.junit.jupiter.api.Test")]
    }

    fn run(project: &FakeProject, entry: &MethodDescriptor) -> TestReport {
        let result = CallGraphBuilder::default().build(project, &MethodRef::from(entry));
        TestFinder::default().find_tests(project, entry, &result)
    }

    #[test]
    fn test_direct_and_closure_matches() {
        let entry = method("com.example.Service", "handle", "(Request)");
        let load = method("com.example.Repository", "load", "(String)");
        let direct = method("com.example.ServiceTest", "handlesRequest", "()");
        let closure = method("com.example.RepositoryTest", "loadsKey", "()");
        let mut project = FakeProject::new();
        project
            .call(&entry, &load, &["key"])
            .test(&direct, junit5())
            .test(&closure, vec![Annotation::marker("org.junit.Test")])
            .call(&direct, &entry, &["request"])
            .call(&closure, &load, &["\"k\""]);

        let report = run(&project, &entry);
        assert_eq!(report.findings.len(), 2);

        let first = &report.findings[0];
        assert_eq!(first.key(), "com.example.ServiceTest#handlesRequest");
        assert_eq!(first.match_type, MatchType::Direct);
        assert_eq!(first.framework, "JUnit 5");
        assert_eq!(first.matched_method.as_ref(), Some(&entry));
        assert_eq!(first.language_id.as_deref(), Some("java"));

        let second = &report.findings[1];
        assert_eq!(second.match_type, MatchType::Closure);
        assert_eq!(second.framework, "JUnit 4");
        assert_eq!(second.matched_method.as_ref(), Some(&load));
    }

    #[test]
    fn test_direct_wins_over_closure_for_same_test() {
        let entry = method("a.Service", "handle", "()");
        let helper = method("a.Helper", "help", "()");
        let test = method("a.ServiceTest", "coversBoth", "()");
        let mut project = FakeProject::new();
        project
            .call(&entry, &helper, &[])
            .test(&test, junit5())
            .call(&test, &helper, &[])
            .call(&test, &entry, &[]);

        let report = run(&project, &entry);
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].match_type, MatchType::Direct);
        assert_eq!(report.findings[0].matched_method.as_ref(), Some(&entry));
    }

    #[test]
    fn test_closure_upgrade_keeps_position() {
        let mut findings = Findings::default();
        let make = |name: &str, match_type| TestReference {
            class_name: "a.T".to_string(),
            method_name: name.to_string(),
            framework: "JUnit 5".to_string(),
            display_name: None,
            match_type,
            source_code: None,
            language_id: None,
            matched_method: None,
        };
        findings.offer(make("first", MatchType::Closure));
        findings.offer(make("second", MatchType::Direct));
        findings.offer(make("first", MatchType::Direct));
        findings.offer(make("second", MatchType::Closure));

        let order: Vec<(&str, MatchType)> = findings
            .ordered
            .iter()
            .map(|f| (f.method_name.as_str(), f.match_type))
            .collect();
        assert_eq!(
            order,
            vec![("first", MatchType::Direct), ("second", MatchType::Direct)]
        );
    }

    #[test]
    fn test_non_tests_are_ignored() {
        let entry = method("a.Service", "handle", "()");
        let prod_caller = method("a.Controller", "get", "()");
        let helper_in_tests = method("a.TestSupport", "fixture", "()");
        let mut project = FakeProject::new();
        project
            .declare(&entry)
            .call(&prod_caller, &entry, &[])
            .test(&helper_in_tests, vec![Annotation::marker("org.junit.jupiter.api.BeforeEach")])
            .call(&helper_in_tests, &entry, &[])
            .dangling_reference(&entry);

        let report = run(&project, &entry);
        assert!(report.findings.is_empty());
    }

    #[test]
    fn test_unindexed_entry_yields_empty_report() {
        let entry = method("a.Missing", "run", "()");
        let report = TestFinder::default().find_tests(&FakeProject::new(), &entry, &CallGraphResult::default());
        assert_eq!(report.entry_point, entry);
        assert!(report.findings.is_empty());
    }

    #[test]
    fn test_leaf_beyond_depth_is_still_searched() {
        let entry = method("a.A", "m0", "()");
        let m1 = method("a.A", "m1", "()");
        let m2 = method("a.A", "m2", "()");
        let test = method("a.ATest", "coversLeaf", "()");
        let mut project = FakeProject::new();
        project
            .call(&entry, &m1, &[])
            .call(&m1, &m2, &[])
            .test(&test, junit5())
            .call(&test, &m2, &[]);

        let result = CallGraphBuilder::new(0).build(&project, &MethodRef::from(&entry));
        let report = TestFinder::default().find_tests(&project, &entry, &result);
        // m1 is the depth-1 leaf; m2 is never reached
        assert!(report.findings.is_empty());

        let result = CallGraphBuilder::new(1).build(&project, &MethodRef::from(&entry));
        let report = TestFinder::default().find_tests(&project, &entry, &result);
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].matched_method.as_ref(), Some(&m2));
    }

    #[test]
    fn test_display_name_is_captured() {
        let entry = method("a.Service", "handle", "()");
        let test = method("a.ServiceTest", "named", "()");
        let mut project = FakeProject::new();
        project
            .declare(&entry)
            .test(
                &test,
                vec![
                    Annotation::marker("org.junit.jupiter.api.Test"),
                    Annotation::marker("org.junit.jupiter.api.DisplayName")
                        .with_attribute("value", "\"handles requests\""),
                ],
            )
            .call(&test, &entry, &[]);

        let report = run(&project, &entry);
        assert_eq!(report.findings[0].display_name.as_deref(), Some("handles requests"));
    }
}

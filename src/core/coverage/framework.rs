// src/core/coverage/framework.rs
use crate::config::{DisplayNameRule, FrameworkConfig, FrameworkRule};
use crate::core::source::Annotation;

/// Decides whether a method is a test, and under which framework.
///
/// Rules are ranked: the first rule with any annotation present wins,
/// regardless of the order annotations appear on the method.
pub struct FrameworkDetector {
    rules: Vec<FrameworkRule>,
    display_names: Vec<DisplayNameRule>,
}

impl FrameworkDetector {
    pub fn new(config: &FrameworkConfig) -> Self {
        Self {
            rules: config.rules.clone(),
            display_names: config.display_names.clone(),
        }
    }

    /// Framework label for a method, `None` if it is not a recognized test
    pub fn detect(&self, annotations: &[Annotation]) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| {
                annotations
                    .iter()
                    .any(|a| rule.annotations.iter().any(|name| name == &a.name))
            })
            .map(|rule| rule.label.as_str())
    }

    /// Human readable name from the first display-name annotation present
    pub fn display_name(&self, annotations: &[Annotation]) -> Option<String> {
        self.display_names.iter().find_map(|rule| {
            annotations
                .iter()
                .find(|a| a.name == rule.annotation)
                .and_then(|a| a.attribute(&rule.attribute))
                .map(strip_quotes)
        })
    }
}

fn strip_quotes(raw: &str) -> String {
    raw.trim().trim_matches('"').to_string()
}

impl Default for FrameworkDetector {
    fn default() -> Self {
        Self::new(&FrameworkConfig::default())
    }
}

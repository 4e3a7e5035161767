use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{MethodInsightError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project layout: where sources and tests live
    pub project: ProjectConfig,

    /// Call graph traversal settings
    pub analysis: AnalysisConfig,

    /// Generated artifact naming
    pub output: OutputConfig,

    /// Test framework detection rules
    pub frameworks: FrameworkConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Project name
    pub name: String,

    /// Production source roots (analyzable content)
    pub source_dirs: Vec<PathBuf>,

    /// Test source roots (analyzable content, searched for tests)
    pub test_dirs: Vec<PathBuf>,

    /// Library roots, indexed for resolution only
    pub library_dirs: Vec<PathBuf>,

    /// Additional gitignore-style patterns to skip
    pub ignore_patterns: Vec<String>,

    /// Maximum file size to parse (in bytes)
    pub max_file_size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Maximum depth at which a method's body is still scanned for calls
    pub max_depth: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output directory; defaults to the current directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    /// Suffix appended to the Markdown report file name
    pub markdown_suffix: String,

    /// File extension used for the Markdown report
    pub markdown_extension: String,

    /// Also write the Mermaid diagram as a separate file
    pub write_mermaid: bool,

    /// Suffix appended to the Mermaid file name
    pub mermaid_suffix: String,

    /// File extension used for the Mermaid diagram
    pub mermaid_extension: String,

    /// Also write the JSON test export
    pub write_test_report: bool,

    /// File extension used for the JSON test export
    pub test_report_extension: String,
}

/// A ranked test-framework rule: the first rule with a matching annotation wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameworkRule {
    /// Framework label shown in reports
    pub label: String,

    /// Qualified annotation names marking a test method
    pub annotations: Vec<String>,
}

/// Where to read a human readable test name from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayNameRule {
    pub annotation: String,

    #[serde(default = "default_display_attribute")]
    pub attribute: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameworkConfig {
    /// Ranked test marker rules
    pub rules: Vec<FrameworkRule>,

    /// Display name annotations, checked in order
    pub display_names: Vec<DisplayNameRule>,
}

fn default_display_attribute() -> String {
    "value".to_string()
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "Unnamed Project".to_string(),
            source_dirs: vec![PathBuf::from("src/main/java")],
            test_dirs: vec![PathBuf::from("src/test/java")],
            library_dirs: Vec::new(),
            ignore_patterns: vec![
                "target/".to_string(),
                "build/".to_string(),
                ".git/".to_string(),
            ],
            max_file_size: 1024 * 1024, // 1MB
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self { max_depth: 5 }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            markdown_suffix: "sequence-report".to_string(),
            markdown_extension: "md".to_string(),
            write_mermaid: false,
            mermaid_suffix: "sequence".to_string(),
            mermaid_extension: "mmd".to_string(),
            write_test_report: false,
            test_report_extension: "tests.json".to_string(),
        }
    }
}

impl Default for FrameworkConfig {
    fn default() -> Self {
        Self {
            rules: vec![
                FrameworkRule {
                    label: "TestNG".to_string(),
                    annotations: vec!["org.testng.annotations.Test".to_string()],
                },
                FrameworkRule {
                    label: "JUnit 5".to_string(),
                    annotations: vec![
                        "org.junit.jupiter.api.Test".to_string(),
                        "org.junit.jupiter.params.ParameterizedTest".to_string(),
                    ],
                },
                FrameworkRule {
                    label: "JUnit 4".to_string(),
                    annotations: vec!["org.junit.Test".to_string()],
                },
            ],
            display_names: vec![DisplayNameRule {
                annotation: "org.junit.jupiter.api.DisplayName".to_string(),
                attribute: default_display_attribute(),
            }],
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| MethodInsightError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| MethodInsightError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration with fallback to default
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => {
                if p.as_ref().exists() {
                    Self::load(p)
                } else {
                    Ok(Self::default())
                }
            }
            None => {
                // Try common config file locations
                for candidate in Self::CANDIDATES {
                    if Path::new(candidate).exists() {
                        return Self::load(candidate);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub const CANDIDATES: [&'static str; 3] = [
        "MethodInsight.toml",
        "methodinsight.toml",
        ".methodinsight.toml",
    ];

    fn validate(&self) -> Result<()> {
        if self.output.markdown_extension.trim().is_empty() {
            return Err(MethodInsightError::Config(
                "output.markdown_extension must not be empty".to_string(),
            ));
        }
        if let Some(rule) = self.frameworks.rules.iter().find(|r| r.annotations.is_empty()) {
            return Err(MethodInsightError::Config(format!(
                "framework rule '{}' lists no annotations",
                rule.label
            )));
        }
        Ok(())
    }
}

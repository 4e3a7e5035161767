use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

use methodinsight::config::Config;
use methodinsight::core::{MatchType, MethodRef, ProjectIndex, ReportEngine};

fn java_project() -> TempDir {
    let temp = TempDir::new().unwrap();

    temp.child("src/main/java/com/example/Service.java")
        .write_str(
            r#"package com.example;

import com.example.data.Repository;

public class Service {
    private final Repository repository = new Repository();

    public String handle(Request request) {
        String key = request.getKey();
        return repository.load(key);
    }
}
"#,
        )
        .unwrap();

    temp.child("src/main/java/com/example/Request.java")
        .write_str(
            r#"package com.example;

public class Request {
    public String getKey() {
        return "key";
    }
}
"#,
        )
        .unwrap();

    temp.child("src/main/java/com/example/data/Repository.java")
        .write_str(
            r#"package com.example.data;

public class Repository {
    public String load(String key) {
        return normalize(key);
    }

    private String normalize(String key) {
        return key.trim();
    }
}
"#,
        )
        .unwrap();

    temp.child("src/test/java/com/example/ServiceTest.java")
        .write_str(
            r#"package com.example;

import org.junit.jupiter.api.DisplayName;
import org.junit.jupiter.api.Test;

class ServiceTest {
    private final Service service = new Service();

    @Test
    @DisplayName("handles a plain request")
    void handlesRequest() {
        service.handle(new Request());
    }

    void notATest() {
        service.handle(new Request());
    }
}
"#,
        )
        .unwrap();

    temp.child("src/test/java/com/example/data/RepositoryTest.java")
        .write_str(
            r#"package com.example.data;

import org.junit.Test;

public class RepositoryTest {
    @Test
    public void loadsKey() {
        new Repository().load("k");
    }
}
"#,
        )
        .unwrap();

    temp
}

fn generate(temp: &TempDir) -> methodinsight::core::SequenceReport {
    let config = Config::default();
    let index = ProjectIndex::load(temp.path(), &config.project).unwrap();
    let entry: MethodRef = "com.example.Service#handle".parse().unwrap();
    ReportEngine::new(config).generate(&index, &entry).unwrap()
}

#[test]
fn test_diagram_follows_the_call_chain() {
    let temp = java_project();
    let report = generate(&temp);

    assert_eq!(
        report.diagram,
        concat!(
            "sequenceDiagram\n",
            "    participant Service\n",
            "    participant Request\n",
            "    participant Repository\n",
            "    Service->>Request: #35;1 getKey()\n",
            "    Service->>Repository: #35;2 load(key)\n",
            "    Repository->>Repository: #35;3 normalize(key)\n",
        )
    );
    assert_eq!(report.stats.total_calls, 3);
}

#[test]
fn test_tests_are_grouped_under_their_matched_method() {
    let temp = java_project();
    let report = generate(&temp);

    assert_eq!(report.tests.findings.len(), 2);
    assert_eq!(report.tests.count_by_type(MatchType::Direct), 1);
    assert_eq!(report.tests.count_by_type(MatchType::Closure), 1);

    let markdown = &report.markdown;
    assert!(markdown.contains("- Frameworks: JUnit 4, JUnit 5\n"));

    let load_section = markdown.find("## #2 Repository.load(String)").unwrap();
    let loads_key = markdown.find("#### 1. RepositoryTest.loadsKey").unwrap();
    let entry_section = markdown.find("## #4 Service.handle(Request)").unwrap();
    let handles = markdown.find("#### 1. ServiceTest.handlesRequest").unwrap();
    assert!(load_section < loads_key);
    assert!(loads_key < entry_section);
    assert!(entry_section < handles);

    assert!(markdown.contains("- Display name: handles a plain request"));
    assert!(!markdown.contains("notATest"));
}

#[test]
fn test_report_files_are_written() {
    let temp = java_project();
    let report = generate(&temp);

    let mut output = Config::default().output;
    output.write_mermaid = true;
    output.write_test_report = true;
    let out_dir = temp.child("reports");
    report.write_to(out_dir.path(), &output).unwrap();

    out_dir
        .child("handle.sequence-report.md")
        .assert(predicate::str::starts_with("# Sequence Report: com.example.Service.handle(Request)"));
    out_dir
        .child("handle.sequence.mmd")
        .assert(predicate::str::contains("#35;2 load(key)"));
    out_dir
        .child("handle.tests.json")
        .assert(predicate::str::contains("\"matchType\":\"CLOSURE\""));

    temp.close().unwrap();
}

#[test]
fn test_unknown_entry_fails() {
    let temp = java_project();
    let config = Config::default();
    let index = ProjectIndex::load(temp.path(), &config.project).unwrap();
    let entry: MethodRef = "com.example.Service#missing".parse().unwrap();

    let result = ReportEngine::new(config).generate(&index, &entry);
    assert!(result.is_err());
}

// src/core/languages/project_index.rs
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use ignore::WalkBuilder;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::{Import, JavaParser, LanguageParser, ParsedCall, ParsedFile, Receiver, RootKind, SourceFile};
use crate::config::ProjectConfig;
use crate::core::call_graph::{render_signature, simple_name, MethodDescriptor, MethodRef};
use crate::core::source::{Annotation, ReferenceIndex, SourceModel};
use crate::error::{MethodInsightError, Result};

/// A call inside a method body, resolved at index time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaCallSite {
    /// `None` when the callee lives outside every indexed root
    pub target: Option<MethodDescriptor>,
    pub arguments: Vec<String>,
}

/// The method a reference was found in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceLocation {
    pub caller: MethodDescriptor,
}

struct FileScope {
    path: PathBuf,
    kind: RootKind,
    package: Option<String>,
    imports: Vec<Import>,
}

struct TypeEntry {
    name: String,
    qualified_name: String,
    file: usize,
    outer: Option<usize>,
    superclass: Option<String>,
    fields: Vec<(String, String)>,
    methods: Vec<usize>,
}

struct MethodEntry {
    descriptor: MethodDescriptor,
    owner: usize,
    parameter_count: usize,
    varargs: bool,
    line: usize,
    source: String,
    annotations: Vec<Annotation>,
    locals: Vec<(String, String)>,
    calls: Vec<ParsedCall>,
    call_sites: Vec<JavaCallSite>,
}

impl MethodEntry {
    fn accepts(&self, arity: usize) -> bool {
        if self.varargs {
            arity + 1 >= self.parameter_count
        } else {
            arity == self.parameter_count
        }
    }
}

/// Whole-project view over parsed Java sources.
///
/// Calls are resolved once, when the index is built: through locals,
/// parameters and fields to their declared type, through the enclosing
/// and inherited types for unqualified calls, and by a unique
/// name-and-arity match when the receiver type cannot be determined.
pub struct ProjectIndex {
    language: String,
    files: Vec<FileScope>,
    types: Vec<TypeEntry>,
    types_by_name: HashMap<String, usize>,
    methods: Vec<MethodEntry>,
    methods_by_descriptor: HashMap<MethodDescriptor, usize>,
    references: HashMap<MethodDescriptor, Vec<ReferenceLocation>>,
}

impl ProjectIndex {
    /// Walk the configured roots under `root` and index every Java file.
    ///
    /// Test roots are read first, so a file reachable from both a test and
    /// a main root counts as test code.
    pub fn load(root: &Path, config: &ProjectConfig) -> Result<Self> {
        let roots = config
            .test_dirs
            .iter()
            .map(|d| (d, RootKind::Test))
            .chain(config.source_dirs.iter().map(|d| (d, RootKind::Main)))
            .chain(config.library_dirs.iter().map(|d| (d, RootKind::Library)));

        let mut files = Vec::new();
        let mut seen = HashSet::new();
        for (dir, kind) in roots {
            let dir = root.join(dir);
            if !dir.is_dir() {
                debug!("Skipping missing {:?} root {}", kind, dir.display());
                continue;
            }

            for path in collect_java_files(&dir, kind, &config.ignore_patterns)? {
                if !seen.insert(path.clone()) {
                    continue;
                }
                let size = fs::metadata(&path)?.len();
                if size > config.max_file_size {
                    warn!("⚠️ Skipping {} ({} bytes exceeds the size limit)", path.display(), size);
                    continue;
                }
                match fs::read_to_string(&path) {
                    Ok(content) => files.push(SourceFile::new(path, kind, content)),
                    Err(e) => warn!("⚠️ Could not read {}: {}", path.display(), e),
                }
            }
        }

        info!("📂 Loaded {} Java files from {}", files.len(), root.display());
        Self::from_files(files)
    }

    /// Index sources that are already in memory
    pub fn from_files(files: Vec<SourceFile>) -> Result<Self> {
        let mut parser = JavaParser::new()?;
        let mut index = Self {
            language: parser.language_name().to_string(),
            files: Vec::new(),
            types: Vec::new(),
            types_by_name: HashMap::new(),
            methods: Vec::new(),
            methods_by_descriptor: HashMap::new(),
            references: HashMap::new(),
        };

        for file in files {
            match parser.parse(&file.content, &file.path) {
                Ok(parsed) => index.add_file(file.kind, parsed),
                Err(e) => warn!("⚠️ Skipping {}: {}", file.path.display(), e),
            }
        }

        index.qualify_annotations();
        index.resolve_calls();

        info!(
            "🔗 Indexed {} types, {} methods, {} referenced methods",
            index.type_count(),
            index.method_count(),
            index.references.len()
        );
        Ok(index)
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn method_count(&self) -> usize {
        self.methods.len()
    }

    fn add_file(&mut self, kind: RootKind, parsed: ParsedFile) {
        let file = self.files.len();
        self.files.push(FileScope {
            path: parsed.path,
            kind,
            package: parsed.package,
            imports: parsed.imports,
        });

        let base = self.types.len();
        for parsed_type in parsed.types {
            let type_idx = self.types.len();
            if self.types_by_name.contains_key(&parsed_type.qualified_name) {
                debug!("Duplicate type {}, keeping the first declaration", parsed_type.qualified_name);
            } else {
                self.types_by_name.insert(parsed_type.qualified_name.clone(), type_idx);
            }

            let mut method_ids = Vec::new();
            for method in parsed_type.methods {
                let descriptor = MethodDescriptor::new(
                    &parsed_type.qualified_name,
                    &method.name,
                    render_signature(&method.parameter_types),
                );
                if self.methods_by_descriptor.contains_key(&descriptor) {
                    continue;
                }
                let id = self.methods.len();
                self.methods_by_descriptor.insert(descriptor.clone(), id);
                self.methods.push(MethodEntry {
                    descriptor,
                    owner: type_idx,
                    parameter_count: method.parameter_types.len(),
                    varargs: method.varargs,
                    line: method.line,
                    source: method.source,
                    annotations: method.annotations,
                    locals: method.locals,
                    calls: method.calls,
                    call_sites: Vec::new(),
                });
                method_ids.push(id);
            }

            self.types.push(TypeEntry {
                name: parsed_type.name,
                qualified_name: parsed_type.qualified_name,
                file,
                outer: parsed_type.outer.map(|o| base + o),
                superclass: parsed_type.superclass,
                fields: parsed_type.fields,
                methods: method_ids,
            });
        }
    }

    fn qualify_annotations(&mut self) {
        for id in 0..self.methods.len() {
            let file = self.types[self.methods[id].owner].file;
            let names: Vec<String> = self.methods[id]
                .annotations
                .iter()
                .map(|a| self.qualify_annotation(file, &a.name))
                .collect();
            for (annotation, name) in self.methods[id].annotations.iter_mut().zip(names) {
                annotation.name = name;
            }
        }
    }

    /// Single-type imports first, then project types, then the only
    /// non-`java.*` on-demand import. Anything else stays as written.
    fn qualify_annotation(&self, file: usize, name: &str) -> String {
        if name.contains('.') {
            return name.to_string();
        }
        let scope = &self.files[file];
        if let Some(import) = scope.imports.iter().find(|i| !i.on_demand && simple_name(&i.path) == name) {
            return import.path.clone();
        }
        let local = qualify(scope.package.as_deref(), name);
        if self.types_by_name.contains_key(&local) {
            return local;
        }
        let candidates: Vec<&Import> = scope
            .imports
            .iter()
            .filter(|i| i.on_demand && !i.path.starts_with("java."))
            .collect();
        match candidates.as_slice() {
            [only] => format!("{}.{}", only.path, name),
            _ => name.to_string(),
        }
    }

    fn resolve_calls(&mut self) {
        for id in 0..self.methods.len() {
            let sites: Vec<JavaCallSite> = self.methods[id]
                .calls
                .iter()
                .map(|call| {
                    let target = self.resolve_call(id, call);
                    if target.is_none() {
                        let method = &self.methods[id];
                        debug!(
                            "Unresolved call {}() in {} ({}:{})",
                            call.name,
                            method.descriptor.display_label(),
                            self.files[self.types[method.owner].file].path.display(),
                            method.line
                        );
                    }
                    JavaCallSite {
                        target,
                        arguments: call.arguments.clone(),
                    }
                })
                .collect();

            let location = ReferenceLocation {
                caller: self.methods[id].descriptor.clone(),
            };
            for target in sites.iter().filter_map(|s| s.target.as_ref()) {
                self.references.entry(target.clone()).or_default().push(location.clone());
            }
            self.methods[id].call_sites = sites;
        }
    }

    fn resolve_call(&self, caller: usize, call: &ParsedCall) -> Option<MethodDescriptor> {
        let method = &self.methods[caller];
        let owner = method.owner;
        let arity = call.arguments.len();

        match &call.receiver {
            Receiver::Implicit => self.find_in_scope(owner, &call.name, arity),
            Receiver::This => self.find_in_hierarchy(owner, &call.name, arity),
            Receiver::Super => self
                .superclass_of(owner)
                .and_then(|parent| self.find_in_hierarchy(parent, &call.name, arity)),
            Receiver::Name(name) => {
                let declared = method
                    .locals
                    .iter()
                    .rev()
                    .find(|(n, _)| n == name)
                    .map(|(_, ty)| (owner, ty.as_str()))
                    .or_else(|| self.field_type(owner, name));
                if let Some((context, ty)) = declared {
                    return self.resolve_type(context, ty)
                        .and_then(|t| self.find_in_hierarchy(t, &call.name, arity));
                }
                match self.resolve_type(owner, name) {
                    Some(t) => self.find_in_hierarchy(t, &call.name, arity),
                    None => self.find_unique(&call.name, arity),
                }
            }
            Receiver::Field(field) => self
                .field_type(owner, field)
                .and_then(|(context, ty)| self.resolve_type(context, ty))
                .and_then(|t| self.find_in_hierarchy(t, &call.name, arity)),
            Receiver::Path(path) => match self.resolve_type(owner, path) {
                Some(t) => self.find_in_hierarchy(t, &call.name, arity),
                None => self.find_unique(&call.name, arity),
            },
            Receiver::Expression => self.find_unique(&call.name, arity),
            // constructors are not inherited
            Receiver::Constructor(ty) => self
                .resolve_type(owner, ty)
                .and_then(|t| self.select_overload(t, &self.types[t].name, arity)),
        }
    }

    /// Enclosing type and its supertypes, then each outer type in turn
    fn find_in_scope(&self, from: usize, name: &str, arity: usize) -> Option<MethodDescriptor> {
        let mut scope = Some(from);
        while let Some(t) = scope {
            if let Some(found) = self.find_in_hierarchy(t, name, arity) {
                return Some(found);
            }
            scope = self.types[t].outer;
        }
        None
    }

    fn find_in_hierarchy(&self, from: usize, name: &str, arity: usize) -> Option<MethodDescriptor> {
        let mut visited = HashSet::new();
        let mut current = Some(from);
        while let Some(t) = current {
            if !visited.insert(t) {
                break;
            }
            if let Some(found) = self.select_overload(t, name, arity) {
                return Some(found);
            }
            current = self.superclass_of(t);
        }
        None
    }

    /// Exact arity beats varargs; otherwise declaration order
    fn select_overload(&self, t: usize, name: &str, arity: usize) -> Option<MethodDescriptor> {
        let candidates: Vec<&MethodEntry> = self.types[t]
            .methods
            .iter()
            .map(|&id| &self.methods[id])
            .filter(|m| m.descriptor.method_name == name && m.accepts(arity))
            .collect();
        candidates
            .iter()
            .find(|m| !m.varargs && m.parameter_count == arity)
            .or_else(|| candidates.first())
            .map(|m| m.descriptor.clone())
    }

    fn find_unique(&self, name: &str, arity: usize) -> Option<MethodDescriptor> {
        let mut matches = self
            .methods
            .iter()
            .filter(|m| m.descriptor.method_name == name && m.accepts(arity));
        match (matches.next(), matches.next()) {
            (Some(only), None) => Some(only.descriptor.clone()),
            (Some(_), Some(_)) => {
                debug!("Call to {} is ambiguous, leaving it unresolved", name);
                None
            }
            _ => None,
        }
    }

    fn superclass_of(&self, t: usize) -> Option<usize> {
        self.types[t]
            .superclass
            .as_deref()
            .and_then(|s| self.resolve_type(t, s))
    }

    /// Declared type of a field visible from `from`, with the type it is declared in
    fn field_type(&self, from: usize, name: &str) -> Option<(usize, &str)> {
        let mut scope = Some(from);
        while let Some(t) = scope {
            let mut visited = HashSet::new();
            let mut current = Some(t);
            while let Some(c) = current {
                if !visited.insert(c) {
                    break;
                }
                if let Some((_, ty)) = self.types[c].fields.iter().find(|(n, _)| n == name) {
                    return Some((c, ty.as_str()));
                }
                current = self.superclass_of(c);
            }
            scope = self.types[t].outer;
        }
        None
    }

    /// Resolve a type as written inside type `from` to an indexed type
    fn resolve_type(&self, from: usize, raw: &str) -> Option<usize> {
        let compact: String = raw.split_whitespace().collect();
        let base = compact
            .split('<')
            .next()
            .unwrap_or("")
            .trim_end_matches("...")
            .trim_end_matches("[]");
        if base.is_empty() {
            return None;
        }

        if let Some((head, rest)) = base.split_once('.') {
            if let Some(&t) = self.types_by_name.get(base) {
                return Some(t);
            }
            return self.resolve_simple(from, head).and_then(|t| {
                let nested = format!("{}.{}", self.types[t].qualified_name, rest);
                self.types_by_name.get(&nested).copied()
            });
        }
        self.resolve_simple(from, base)
    }

    fn resolve_simple(&self, from: usize, name: &str) -> Option<usize> {
        let mut scope = Some(from);
        while let Some(t) = scope {
            if self.types[t].name == name {
                return Some(t);
            }
            let nested = format!("{}.{}", self.types[t].qualified_name, name);
            if let Some(&found) = self.types_by_name.get(&nested) {
                return Some(found);
            }
            scope = self.types[t].outer;
        }

        let file = &self.files[self.types[from].file];
        if let Some(import) = file.imports.iter().find(|i| !i.on_demand && simple_name(&i.path) == name) {
            return self.types_by_name.get(&import.path).copied();
        }
        if let Some(&t) = self.types_by_name.get(&qualify(file.package.as_deref(), name)) {
            return Some(t);
        }
        file.imports
            .iter()
            .filter(|i| i.on_demand)
            .find_map(|i| self.types_by_name.get(&format!("{}.{}", i.path, name)).copied())
    }

    fn find_type(&self, class_name: &str) -> Option<usize> {
        let wanted = class_name.replace('$', ".");
        if let Some(&t) = self.types_by_name.get(&wanted) {
            return Some(t);
        }
        let suffix = format!(".{}", wanted);
        let mut matches: Vec<(&String, usize)> = self
            .types_by_name
            .iter()
            .filter(|(q, _)| q.ends_with(&suffix))
            .map(|(q, &t)| (q, t))
            .collect();
        matches.sort();
        match matches.as_slice() {
            [(_, t)] => Some(*t),
            [] => None,
            many => {
                let names: Vec<&str> = many.iter().map(|(q, _)| q.as_str()).collect();
                warn!("⚠️ {} is ambiguous: {}", class_name, names.join(", "));
                None
            }
        }
    }

    fn entry(&self, method: &MethodDescriptor) -> Option<&MethodEntry> {
        self.methods_by_descriptor.get(method).map(|&id| &self.methods[id])
    }

    fn kind_of(&self, method: &MethodDescriptor) -> Option<RootKind> {
        self.entry(method)
            .map(|m| self.files[self.types[m.owner].file].kind)
    }
}

impl SourceModel for ProjectIndex {
    type CallSite = JavaCallSite;

    fn resolve(&self, method: &MethodRef) -> Option<MethodDescriptor> {
        let t = self.find_type(&method.class_name)?;
        self.types[t]
            .methods
            .iter()
            .map(|&id| &self.methods[id].descriptor)
            .find(|d| {
                d.method_name == method.method_name
                    && method.signature.as_ref().map_or(true, |s| s == &d.signature)
            })
            .cloned()
    }

    fn call_sites(&self, method: &MethodDescriptor) -> Vec<JavaCallSite> {
        self.entry(method).map(|m| m.call_sites.clone()).unwrap_or_default()
    }

    fn resolve_call_target(&self, call: &JavaCallSite) -> Option<MethodDescriptor> {
        call.target.clone()
    }

    fn call_arguments(&self, call: &JavaCallSite) -> Vec<Option<String>> {
        call.arguments.iter().map(|a| Some(a.clone())).collect()
    }

    fn is_analyzable_content(&self, method: &MethodDescriptor) -> bool {
        self.kind_of(method).map_or(false, |k| k.is_analyzable())
    }
}

impl ReferenceIndex for ProjectIndex {
    type Location = ReferenceLocation;

    fn references_to(&self, method: &MethodDescriptor) -> Vec<ReferenceLocation> {
        self.references.get(method).cloned().unwrap_or_default()
    }

    fn enclosing_method(&self, location: &ReferenceLocation) -> Option<MethodDescriptor> {
        Some(location.caller.clone())
    }

    fn is_test_source(&self, method: &MethodDescriptor) -> bool {
        self.kind_of(method) == Some(RootKind::Test)
    }

    fn annotations_of(&self, method: &MethodDescriptor) -> Vec<Annotation> {
        self.entry(method).map(|m| m.annotations.clone()).unwrap_or_default()
    }

    fn source_text_of(&self, method: &MethodDescriptor) -> Option<String> {
        self.entry(method)
            .map(|m| m.source.clone())
            .filter(|s| !s.trim().is_empty())
    }

    fn language_tag_of(&self, method: &MethodDescriptor) -> Option<String> {
        self.entry(method).map(|_| self.language.clone())
    }
}

fn qualify(package: Option<&str>, name: &str) -> String {
    match package {
        Some(p) if !p.is_empty() => format!("{}.{}", p, name),
        _ => name.to_string(),
    }
}

fn is_java_file(path: &Path) -> bool {
    path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("java")
}

/// Matcher for the configured gitignore-style patterns, rooted at `dir`
fn build_ignore_matcher(dir: &Path, patterns: &[String]) -> Result<Gitignore> {
    let mut builder = GitignoreBuilder::new(dir);
    for pattern in patterns {
        builder
            .add_line(None, pattern)
            .map_err(|e| MethodInsightError::Config(format!("Invalid ignore pattern '{}': {}", pattern, e)))?;
    }
    builder
        .build()
        .map_err(|e| MethodInsightError::Config(format!("Invalid ignore patterns: {}", e)))
}

/// Ignored directories are pruned by the walkers, so parents need no check
fn is_ignored(path: &Path, is_dir: bool, root: &Path, matcher: &Gitignore) -> bool {
    match path.strip_prefix(root) {
        Ok(relative) if relative.as_os_str().is_empty() => false,
        Ok(relative) => matcher.matched(relative, is_dir).is_ignore(),
        Err(_) => false,
    }
}

/// Library roots are walked as-is; project roots honour `.gitignore`
fn collect_java_files(dir: &Path, kind: RootKind, ignore_patterns: &[String]) -> Result<Vec<PathBuf>> {
    let matcher = build_ignore_matcher(dir, ignore_patterns)?;
    let mut paths = Vec::new();

    if kind == RootKind::Library {
        let walker = WalkDir::new(dir)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| !is_ignored(e.path(), e.file_type().is_dir(), dir, &matcher));
        for entry in walker {
            let entry = entry.map_err(|e| MethodInsightError::FileSystem(e.to_string()))?;
            if is_java_file(entry.path()) {
                paths.push(entry.into_path());
            }
        }
    } else {
        let root = dir.to_path_buf();
        let walker = WalkBuilder::new(dir)
            .hidden(false)
            .git_ignore(true)
            .filter_entry(move |e| {
                let is_dir = e.file_type().map_or(false, |t| t.is_dir());
                !is_ignored(e.path(), is_dir, &root, &matcher)
            })
            .build();
        for entry in walker {
            let entry = entry.map_err(|e| MethodInsightError::FileSystem(e.to_string()))?;
            if is_java_file(entry.path()) {
                paths.push(entry.into_path());
            }
        }
    }

    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVICE: &str = r#"
package com.example;

import com.example.data.Repository;

public class Service extends BaseService {
    private final Repository repository;

    public String handle(Request request) {
        String key = request.key();
        audit(key);
        Formatter.format(key);
        return repository.load(key);
    }

    private void log(String message) { }
    private void log(String message, Object... args) { }

    void report() {
        log("a");
        log("a", 1, 2);
        key.trim();
    }
}
"#;

    const BASE: &str = r#"
package com.example;

public abstract class BaseService {
    protected void audit(String key) { }
}
"#;

    const REQUEST: &str = r#"
package com.example;

public class Request {
    public String key() { return "k"; }
}
"#;

    const FORMATTER: &str = r#"
package com.example;

public final class Formatter {
    static String format(String value) { return value.trim(); }
}
"#;

    const REPOSITORY: &str = r#"
package com.example.data;

import com.acme.cache.Cache;

public class Repository {
    private Cache cache;

    public String load(String key) {
        return cache.get(key);
    }
}
"#;

    const CACHE: &str = r#"
package com.acme.cache;

public class Cache {
    public String get(String key) { return null; }
}
"#;

    const SERVICE_TEST: &str = r#"
package com.example;

import org.junit.jupiter.api.DisplayName;
import org.junit.jupiter.api.Test;

class ServiceTest {
    @Test
    @DisplayName("handles a request")
    void handlesRequest() {
        new Service().handle(new Request());
    }
}
"#;

    fn index() -> ProjectIndex {
        ProjectIndex::from_files(vec![
            SourceFile::new("test/com/example/ServiceTest.java", RootKind::Test, SERVICE_TEST),
            SourceFile::new("main/com/example/Service.java", RootKind::Main, SERVICE),
            SourceFile::new("main/com/example/BaseService.java", RootKind::Main, BASE),
            SourceFile::new("main/com/example/Request.java", RootKind::Main, REQUEST),
            SourceFile::new("main/com/example/Formatter.java", RootKind::Main, FORMATTER),
            SourceFile::new("main/com/example/data/Repository.java", RootKind::Main, REPOSITORY),
            SourceFile::new("lib/com/acme/cache/Cache.java", RootKind::Library, CACHE),
        ])
        .unwrap()
    }

    fn handle() -> MethodDescriptor {
        MethodDescriptor::new("com.example.Service", "handle", "(Request)")
    }

    fn targets(index: &ProjectIndex, method: &MethodDescriptor) -> Vec<Option<String>> {
        index
            .call_sites(method)
            .iter()
            .map(|c| index.resolve_call_target(c).map(|t| t.display_label()))
            .collect()
    }

    #[test]
    fn test_resolves_method_refs() {
        let index = index();
        assert_eq!(index.type_count(), 7);
        assert_eq!(index.resolve(&MethodRef::new("com.example.Service", "handle")), Some(handle()));
        assert_eq!(index.resolve(&MethodRef::new("Service", "handle")), Some(handle()));
        assert_eq!(
            index.resolve(&MethodRef::new("example.Service", "handle").with_signature(&["Request"])),
            Some(handle())
        );
        assert_eq!(index.resolve(&MethodRef::new("com.example.Service", "missing")), None);
        assert_eq!(
            index.resolve(&MethodRef::new("Service", "handle").with_signature(&["String"])),
            None
        );
    }

    #[test]
    fn test_call_resolution() {
        let index = index();
        assert_eq!(
            targets(&index, &handle()),
            vec![
                Some("com.example.Request.key()".to_string()),
                Some("com.example.BaseService.audit(String)".to_string()),
                Some("com.example.Formatter.format(String)".to_string()),
                Some("com.example.data.Repository.load(String)".to_string()),
            ]
        );

        let sites = index.call_sites(&handle());
        assert_eq!(index.call_arguments(&sites[3]), vec![Some("key".to_string())]);
    }

    #[test]
    fn test_overloads_and_unknown_receivers() {
        let index = index();
        let report = MethodDescriptor::new("com.example.Service", "report", "()");
        assert_eq!(
            targets(&index, &report),
            vec![
                Some("com.example.Service.log(String)".to_string()),
                Some("com.example.Service.log(String, Object...)".to_string()),
                None,
            ]
        );
    }

    #[test]
    fn test_library_calls_resolve_but_are_not_analyzable() {
        let index = index();
        let load = MethodDescriptor::new("com.example.data.Repository", "load", "(String)");
        let get = MethodDescriptor::new("com.acme.cache.Cache", "get", "(String)");
        assert_eq!(targets(&index, &load), vec![Some(get.display_label())]);
        assert!(index.is_analyzable_content(&load));
        assert!(!index.is_analyzable_content(&get));
    }

    #[test]
    fn test_references_and_test_metadata() {
        let index = index();
        let test = MethodDescriptor::new("com.example.ServiceTest", "handlesRequest", "()");

        let references = index.references_to(&handle());
        assert_eq!(references.len(), 1);
        assert_eq!(index.enclosing_method(&references[0]), Some(test.clone()));

        assert!(index.is_test_source(&test));
        assert!(!index.is_test_source(&handle()));

        let annotations = index.annotations_of(&test);
        assert_eq!(annotations[0].name, "org.junit.jupiter.api.Test");
        assert_eq!(annotations[1].name, "org.junit.jupiter.api.DisplayName");
        assert_eq!(index.language_tag_of(&test).as_deref(), Some("java"));
        assert!(index.source_text_of(&test).unwrap().contains("new Service().handle(new Request());"));
    }

    #[test]
    fn test_on_demand_annotation_imports() {
        let index = ProjectIndex::from_files(vec![SourceFile::new(
            "WildcardTest.java",
            RootKind::Test,
            "import java.util.*;\nimport org.testng.annotations.*;\nclass WildcardTest { @Test void run() { } }",
        )])
        .unwrap();
        let run = MethodDescriptor::new("WildcardTest", "run", "()");
        assert_eq!(index.annotations_of(&run)[0].name, "org.testng.annotations.Test");
    }

    #[test]
    fn test_nested_types_and_outer_calls() {
        let index = ProjectIndex::from_files(vec![SourceFile::new(
            "Outer.java",
            RootKind::Main,
            r#"
package p;
class Outer {
    void shared() { }
    static class Inner {
        void run() { shared(); Helper.help(); }
    }
    static class Helper {
        static void help() { }
    }
}
"#,
        )])
        .unwrap();
        let run = MethodDescriptor::new("p.Outer.Inner", "run", "()");
        assert_eq!(
            targets(&index, &run),
            vec![Some("p.Outer.shared()".to_string()), Some("p.Outer.Helper.help()".to_string())]
        );
        assert_eq!(index.resolve(&MethodRef::new("p.Outer$Inner", "run")), Some(run));
    }

    #[test]
    fn test_signature_pins_the_overload() {
        let index = ProjectIndex::from_files(vec![SourceFile::new(
            "Repo.java",
            RootKind::Main,
            "package p;\nclass Repo { void find(long id) { } void find(String name) { } }",
        )])
        .unwrap();
        let by_name: MethodRef = "p.Repo.find(String)".parse().unwrap();
        assert_eq!(
            index.resolve(&by_name),
            Some(MethodDescriptor::new("p.Repo", "find", "(String)"))
        );
        let by_id: MethodRef = "p.Repo#find(long)".parse().unwrap();
        assert_eq!(index.resolve(&by_id), Some(MethodDescriptor::new("p.Repo", "find", "(long)")));
    }

    const WORKER: &str = r#"
package p;

public class Worker {
    public Worker(int n) {
        run(n);
    }

    void run(int n) { }
}
"#;

    const WORKER_SERVICE: &str = r#"
package p;

public class Service {
    void handle() {
        new Worker(1);
        new StringBuilder("x");
    }
}
"#;

    const WORKER_TEST: &str = r#"
package p;

import org.junit.jupiter.api.Test;

class WorkerTest {
    @Test
    void starts() {
        new Worker(2);
    }
}
"#;

    #[test]
    fn test_object_creation_resolves_to_constructor() {
        let index = ProjectIndex::from_files(vec![
            SourceFile::new("main/p/Worker.java", RootKind::Main, WORKER),
            SourceFile::new("main/p/Service.java", RootKind::Main, WORKER_SERVICE),
            SourceFile::new("test/p/WorkerTest.java", RootKind::Test, WORKER_TEST),
        ])
        .unwrap();
        let handle = MethodDescriptor::new("p.Service", "handle", "()");
        let constructor = MethodDescriptor::new("p.Worker", "Worker", "(int)");

        assert_eq!(targets(&index, &handle), vec![Some(constructor.display_label()), None]);
        assert_eq!(
            targets(&index, &constructor),
            vec![Some("p.Worker.run(int)".to_string())]
        );

        let engine = crate::core::ReportEngine::new(crate::config::Config::default());
        let report = engine.generate(&index, &MethodRef::new("p.Service", "handle")).unwrap();
        assert_eq!(report.stats.total_calls, 2);
        assert!(report.diagram.contains("Service->>Worker: #35;1 Worker(1)"));
        assert_eq!(report.tests.findings.len(), 1);
        assert_eq!(report.tests.findings[0].match_type, crate::core::MatchType::Closure);
        assert_eq!(report.tests.findings[0].matched_method, Some(constructor));
    }

    #[test]
    fn test_load_walks_roots_and_skips_ignored_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let write = |rel: &str, content: &str| {
            let path = root.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        };
        write("src/main/java/com/example/Service.java", SERVICE);
        write("src/main/java/com/example/Request.java", REQUEST);
        write("src/main/java/build/Generated.java", "class Generated { void gen() { } }");
        write("src/test/java/com/example/ServiceTest.java", SERVICE_TEST);
        write("src/main/java/com/example/notes.txt", "not java");
        write("src/main/java/com/example/FooGenerated.java", "package com.example; class FooGenerated { }");

        let mut config = ProjectConfig::default();
        config.ignore_patterns.push("*Generated.java".to_string());
        let index = ProjectIndex::load(root, &config).unwrap();

        assert_eq!(index.type_count(), 3);
        let test = MethodDescriptor::new("com.example.ServiceTest", "handlesRequest", "()");
        assert!(index.is_test_source(&test));
        assert!(index.resolve(&MethodRef::new("Generated", "gen")).is_none());
    }

    #[test]
    fn test_invalid_ignore_pattern_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src/main/java")).unwrap();
        let mut config = ProjectConfig::default();
        config.ignore_patterns.push("gen/[".to_string());

        let result = ProjectIndex::load(dir.path(), &config);
        assert!(matches!(result, Err(MethodInsightError::Config(_))));
    }
}

//! Source backends for the analysis
//!
//! A language parser turns one file into a flat declaration model; the
//! project index stitches files together, resolves calls and answers the
//! `SourceModel` / `ReferenceIndex` queries.

mod java;
mod project_index;

pub use java::JavaParser;
pub use project_index::{JavaCallSite, ProjectIndex, ReferenceLocation};

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::source::Annotation;
use crate::error::Result;

/// Trait that all language parsers must implement
pub trait LanguageParser {
    /// Parse source code into declarations
    fn parse(&mut self, content: &str, file_path: &Path) -> Result<ParsedFile>;

    /// Get the file extensions this parser handles
    fn file_extensions(&self) -> &[&str];

    /// Get the language name, also used as the code fence tag
    fn language_name(&self) -> &str;
}

/// What a content root holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RootKind {
    /// Production code
    Main,
    /// Test code; searched for tests
    Test,
    /// Dependencies, indexed only so calls into them can be recognized
    Library,
}

impl RootKind {
    pub fn is_analyzable(&self) -> bool {
        !matches!(self, RootKind::Library)
    }
}

/// A file read from disk (or handed in directly) together with its root kind
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub kind: RootKind,
    pub content: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, kind: RootKind, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            content: content.into(),
        }
    }
}

/// Declarations extracted from one source file
#[derive(Debug, Clone, Default)]
pub struct ParsedFile {
    pub path: PathBuf,
    pub package: Option<String>,
    pub imports: Vec<Import>,
    /// Every type in the file, nested ones included, outer before inner
    pub types: Vec<ParsedType>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// `java.util.List`, or `org.junit` for `org.junit.*`
    pub path: String,
    pub on_demand: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedType {
    pub name: String,
    /// Package plus enclosing types, dot separated
    pub qualified_name: String,
    /// Index of the enclosing type within the same file
    pub outer: Option<usize>,
    /// Superclass as written
    pub superclass: Option<String>,
    /// `(name, declared type)`
    pub fields: Vec<(String, String)>,
    pub methods: Vec<ParsedMethod>,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedMethod {
    pub name: String,
    pub parameter_types: Vec<String>,
    pub varargs: bool,
    /// Names as written; the index qualifies them through imports
    pub annotations: Vec<Annotation>,
    pub source: String,
    /// Parameters and locals, `(name, declared type)`
    pub locals: Vec<(String, String)>,
    pub calls: Vec<ParsedCall>,
    /// 1-based line of the declaration
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCall {
    pub name: String,
    pub receiver: Receiver,
    pub arguments: Vec<String>,
}

/// The expression a method is invoked on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Receiver {
    /// `foo()`
    Implicit,
    /// `this.foo()`
    This,
    /// `super.foo()`
    Super,
    /// `name.foo()`: a variable or a type
    Name(String),
    /// `this.field.foo()`
    Field(String),
    /// `a.b.foo()`: possibly a qualified type
    Path(String),
    /// Anything else, e.g. a chained call
    Expression,
    /// `new T(..)`, holding the constructed type as written
    Constructor(String),
}

// src/core/languages/java.rs - Declaration and call-site extraction for Java
use std::path::Path;
use tree_sitter::{Node, Parser};

use super::{Import, LanguageParser, ParsedCall, ParsedFile, ParsedMethod, ParsedType, Receiver};
use crate::core::source::Annotation;
use crate::error::{MethodInsightError, Result};

const TYPE_DECLARATIONS: &[&str] = &[
    "class_declaration",
    "interface_declaration",
    "enum_declaration",
    "record_declaration",
    "annotation_type_declaration",
];

/// Java-specific parser using Tree-sitter
pub struct JavaParser {
    parser: Parser,
}

impl JavaParser {
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        let java_language = tree_sitter_java::language();
        parser
            .set_language(&java_language)
            .map_err(|e| MethodInsightError::Parser(format!("Failed to set Java language: {}", e)))?;

        Ok(Self { parser })
    }
}

impl LanguageParser for JavaParser {
    fn parse(&mut self, content: &str, file_path: &Path) -> Result<ParsedFile> {
        let tree = self
            .parser
            .parse(content, None)
            .ok_or_else(|| MethodInsightError::Parser(format!("Failed to parse {}", file_path.display())))?;

        let root = tree.root_node();
        let mut file = ParsedFile {
            path: file_path.to_path_buf(),
            ..Default::default()
        };

        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "package_declaration" => {
                    file.package = first_named_child(child, &["scoped_identifier", "identifier"])
                        .map(|n| node_text(n, content));
                }
                "import_declaration" => {
                    if let Some(import) = parse_import(child, content) {
                        file.imports.push(import);
                    }
                }
                kind if TYPE_DECLARATIONS.contains(&kind) => {
                    let prefix = file.package.clone();
                    collect_type(child, content, &mut file, None, prefix.as_deref());
                }
                _ => {}
            }
        }

        Ok(file)
    }

    fn file_extensions(&self) -> &[&str] {
        &["java"]
    }

    fn language_name(&self) -> &str {
        "java"
    }
}

fn node_text(node: Node, source: &str) -> String {
    node.utf8_text(source.as_bytes()).unwrap_or("").to_string()
}

fn first_named_child<'a>(node: Node<'a>, kinds: &[&str]) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    let found = node.named_children(&mut cursor).find(|c| kinds.contains(&c.kind()));
    found
}

fn is_comment(node: Node) -> bool {
    matches!(node.kind(), "line_comment" | "block_comment" | "comment")
}

/// `import static` declarations only bring members into scope, not types
fn parse_import(node: Node, source: &str) -> Option<Import> {
    let text = node_text(node, source);
    let body = text
        .trim()
        .trim_start_matches("import")
        .trim()
        .trim_end_matches(';')
        .trim();
    if body.starts_with("static ") {
        return None;
    }
    let path: String = body.split_whitespace().collect();
    match path.strip_suffix(".*") {
        Some(package) => Some(Import {
            path: package.to_string(),
            on_demand: true,
        }),
        None => Some(Import { path, on_demand: false }),
    }
}

fn collect_type(node: Node, source: &str, file: &mut ParsedFile, outer: Option<usize>, prefix: Option<&str>) {
    let Some(name) = node.child_by_field_name("name").map(|n| node_text(n, source)) else {
        return;
    };
    let qualified_name = match prefix {
        Some(p) if !p.is_empty() => format!("{}.{}", p, name),
        _ => name.clone(),
    };
    let superclass = node
        .child_by_field_name("superclass")
        .and_then(|s| s.named_child(0))
        .map(|t| node_text(t, source));

    let idx = file.types.len();
    file.types.push(ParsedType {
        name,
        qualified_name: qualified_name.clone(),
        outer,
        superclass,
        ..Default::default()
    });

    let Some(body) = node.child_by_field_name("body") else {
        return;
    };
    let mut members = Vec::new();
    let mut cursor = body.walk();
    for member in body.named_children(&mut cursor) {
        if member.kind() == "enum_body_declarations" {
            let mut inner = member.walk();
            members.extend(member.named_children(&mut inner));
        } else {
            members.push(member);
        }
    }

    for member in members {
        match member.kind() {
            "method_declaration" | "constructor_declaration" => {
                if let Some(method) = parse_method(member, source) {
                    file.types[idx].methods.push(method);
                }
            }
            "field_declaration" => {
                let fields = declared_variables(member, source);
                file.types[idx].fields.extend(fields);
            }
            kind if TYPE_DECLARATIONS.contains(&kind) => {
                collect_type(member, source, file, Some(idx), Some(&qualified_name));
            }
            _ => {}
        }
    }
}

fn parse_method(node: Node, source: &str) -> Option<ParsedMethod> {
    let name = node_text(node.child_by_field_name("name")?, source);
    let mut method = ParsedMethod {
        name,
        source: node_text(node, source),
        line: node.start_position().row + 1,
        ..Default::default()
    };

    if let Some(params) = node.child_by_field_name("parameters") {
        let mut cursor = params.walk();
        for param in params.named_children(&mut cursor) {
            match param.kind() {
                "formal_parameter" => {
                    let ty = param.child_by_field_name("type").map(|t| node_text(t, source));
                    let pname = param.child_by_field_name("name").map(|n| node_text(n, source));
                    if let Some(ty) = ty {
                        if let Some(pname) = pname {
                            method.locals.push((pname, ty.clone()));
                        }
                        method.parameter_types.push(ty);
                    }
                }
                "spread_parameter" => {
                    let mut inner = param.walk();
                    let children: Vec<Node> = param.named_children(&mut inner).collect();
                    let ty = children
                        .iter()
                        .find(|c| !matches!(c.kind(), "modifiers" | "variable_declarator") && !is_comment(**c))
                        .map(|t| node_text(*t, source));
                    if let Some(ty) = ty {
                        let pname = children
                            .iter()
                            .find(|c| c.kind() == "variable_declarator")
                            .and_then(|d| d.child_by_field_name("name"))
                            .map(|n| node_text(n, source));
                        if let Some(pname) = pname {
                            // inside the body a varargs parameter is an array
                            method.locals.push((pname, format!("{}[]", ty)));
                        }
                        method.parameter_types.push(format!("{}...", ty));
                        method.varargs = true;
                    }
                }
                _ => {}
            }
        }
    }

    if let Some(modifiers) = first_named_child(node, &["modifiers"]) {
        let mut cursor = modifiers.walk();
        for child in modifiers.named_children(&mut cursor) {
            if matches!(child.kind(), "marker_annotation" | "annotation") {
                if let Some(annotation) = parse_annotation(child, source) {
                    method.annotations.push(annotation);
                }
            }
        }
    }

    if let Some(body) = node.child_by_field_name("body") {
        walk_body(body, source, &mut method);
    }

    Some(method)
}

fn parse_annotation(node: Node, source: &str) -> Option<Annotation> {
    let name = node_text(node.child_by_field_name("name")?, source);
    let mut annotation = Annotation::marker(name);

    if let Some(arguments) = node.child_by_field_name("arguments") {
        let mut cursor = arguments.walk();
        for arg in arguments.named_children(&mut cursor) {
            if is_comment(arg) {
                continue;
            }
            if arg.kind() == "element_value_pair" {
                let key = arg.child_by_field_name("key").map(|k| node_text(k, source));
                let value = arg.child_by_field_name("value").map(|v| node_text(v, source));
                if let (Some(key), Some(value)) = (key, value) {
                    annotation.attributes.push((key, value));
                }
            } else {
                annotation.attributes.push(("value".to_string(), node_text(arg, source)));
            }
        }
    }

    Some(annotation)
}

/// `(name, type)` for every declarator of a field or local declaration.
///
/// `var` is replaced by the constructed type when the initializer is a
/// `new` expression and dropped otherwise.
fn declared_variables(node: Node, source: &str) -> Vec<(String, String)> {
    let Some(ty) = node.child_by_field_name("type").map(|t| node_text(t, source)) else {
        return Vec::new();
    };
    let mut variables = Vec::new();
    let mut cursor = node.walk();
    for declarator in node.named_children(&mut cursor) {
        if declarator.kind() != "variable_declarator" {
            continue;
        }
        let Some(name) = declarator.child_by_field_name("name").map(|n| node_text(n, source)) else {
            continue;
        };
        if ty == "var" {
            let constructed = declarator
                .child_by_field_name("value")
                .filter(|v| v.kind() == "object_creation_expression")
                .and_then(|v| v.child_by_field_name("type"))
                .map(|t| node_text(t, source));
            if let Some(constructed) = constructed {
                variables.push((name, constructed));
            }
        } else {
            variables.push((name, ty.clone()));
        }
    }
    variables
}

/// Collect calls and local declarations, pre-order.
///
/// Anonymous class bodies are skipped; lambdas belong to the enclosing method.
fn walk_body(node: Node, source: &str, method: &mut ParsedMethod) {
    match node.kind() {
        "class_body" => return,
        "method_invocation" => {
            if let Some(call) = parse_call(node, source) {
                method.calls.push(call);
            }
        }
        "object_creation_expression" => {
            if let Some(call) = parse_creation(node, source) {
                method.calls.push(call);
            }
        }
        "local_variable_declaration" => {
            let locals = declared_variables(node, source);
            method.locals.extend(locals);
        }
        "enhanced_for_statement" => {
            let ty = node.child_by_field_name("type").map(|t| node_text(t, source));
            let name = node.child_by_field_name("name").map(|n| node_text(n, source));
            if let (Some(ty), Some(name)) = (ty, name) {
                if ty != "var" {
                    method.locals.push((name, ty));
                }
            }
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        walk_body(child, source, method);
    }
}

fn parse_call(node: Node, source: &str) -> Option<ParsedCall> {
    let name = node_text(node.child_by_field_name("name")?, source);
    let receiver = match node.child_by_field_name("object") {
        None => Receiver::Implicit,
        Some(object) => classify_receiver(object, source),
    };

    Some(ParsedCall {
        name,
        receiver,
        arguments: call_arguments(node, source),
    })
}

/// `new T(..)` as a call to the constructor named after the simple type
fn parse_creation(node: Node, source: &str) -> Option<ParsedCall> {
    let ty: String = node_text(node.child_by_field_name("type")?, source)
        .split_whitespace()
        .collect();
    let base = ty.split('<').next().unwrap_or("");
    let name = base.rsplit('.').next().unwrap_or(base).to_string();
    if name.is_empty() {
        return None;
    }

    Some(ParsedCall {
        name,
        receiver: Receiver::Constructor(ty),
        arguments: call_arguments(node, source),
    })
}

fn call_arguments(node: Node, source: &str) -> Vec<String> {
    let mut arguments = Vec::new();
    if let Some(list) = node.child_by_field_name("arguments") {
        let mut cursor = list.walk();
        for arg in list.named_children(&mut cursor) {
            if !is_comment(arg) {
                arguments.push(node_text(arg, source));
            }
        }
    }
    arguments
}

fn classify_receiver(object: Node, source: &str) -> Receiver {
    match object.kind() {
        "this" => Receiver::This,
        "super" => Receiver::Super,
        "identifier" => Receiver::Name(node_text(object, source)),
        "field_access" => {
            let target = object.child_by_field_name("object");
            let field = object.child_by_field_name("field").map(|f| node_text(f, source));
            match (target.map(|t| t.kind()), field) {
                (Some("this"), Some(field)) => Receiver::Field(field),
                _ => {
                    let text: String = node_text(object, source).split_whitespace().collect();
                    if text.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$' || c == '.') {
                        Receiver::Path(text)
                    } else {
                        Receiver::Expression
                    }
                }
            }
        }
        _ => Receiver::Expression,
    }
}

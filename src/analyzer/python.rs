//! Structured Python analysis via tree-sitter
//!
//! The one language with full grammar support. Function and class names
//! come from tree queries; decision points (if/for/while/try/with) are
//! counted per function subtree, so nested function bodies contribute to
//! both the inner and the enclosing function. Imports and bare except
//! clauses are collected with a manual tree walk.

use streaming_iterator::StreamingIterator;
use tree_sitter::{Node, Parser, Query, QueryCursor};

use crate::error::{Error, Result};

const FUNCTION_QUERY: &str = r#"
(function_definition name: (identifier) @name) @func
"#;

const CLASS_QUERY: &str = r#"
(class_definition name: (identifier) @name)
"#;

/// Decision-point constructs: conditionals, loops, exception handling,
/// and resource scopes.
const DECISION_QUERY: &str = r#"
(if_statement) @decision
(for_statement) @decision
(while_statement) @decision
(try_statement) @decision
(with_statement) @decision
"#;

#[derive(Debug, Default)]
pub struct PythonAnalysis {
    pub functions: Vec<String>,
    pub classes: Vec<String>,
    pub imports: Vec<String>,
    pub decision_points: usize,
    pub bare_excepts: usize,
}

/// Parse `source` and extract structural facts. Fails with a parse error
/// when the source is not syntactically valid; callers degrade that to a
/// line-count-only result rather than aborting a batch.
pub fn analyze(source: &str) -> Result<PythonAnalysis> {
    let language: tree_sitter::Language = tree_sitter_python::LANGUAGE.into();

    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .map_err(|e| Error::Parse(e.to_string()))?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| Error::Parse("parser produced no tree".to_string()))?;
    let root = tree.root_node();

    if root.has_error() {
        return Err(Error::Parse(format!(
            "invalid syntax near line {}",
            first_error_line(root)
        )));
    }

    let bytes = source.as_bytes();
    let mut analysis = PythonAnalysis::default();

    // Functions with per-subtree decision counts
    let func_query = Query::new(&language, FUNCTION_QUERY).map_err(|e| Error::Parse(e.to_string()))?;
    let decision_query =
        Query::new(&language, DECISION_QUERY).map_err(|e| Error::Parse(e.to_string()))?;

    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(&func_query, root, bytes);
    while let Some(m) = matches.next() {
        let mut name = None;
        let mut node = None;
        for capture in m.captures {
            match func_query.capture_names()[capture.index as usize] {
                "name" => name = capture.node.utf8_text(bytes).ok(),
                "func" => node = Some(capture.node),
                _ => {}
            }
        }
        if let (Some(name), Some(node)) = (name, node) {
            analysis.functions.push(name.to_string());
            analysis.decision_points += count_decisions(&decision_query, node, bytes);
        }
    }

    // Classes
    let class_query = Query::new(&language, CLASS_QUERY).map_err(|e| Error::Parse(e.to_string()))?;
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(&class_query, root, bytes);
    while let Some(m) = matches.next() {
        for capture in m.captures {
            if let Ok(name) = capture.node.utf8_text(bytes) {
                analysis.classes.push(name.to_string());
            }
        }
    }

    collect_imports(root, bytes, &mut analysis.imports);
    analysis.bare_excepts = count_bare_excepts(root);

    Ok(analysis)
}

fn count_decisions(query: &Query, node: Node, source: &[u8]) -> usize {
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, node, source);
    let mut count = 0;
    while matches.next().is_some() {
        count += 1;
    }
    count
}

fn first_error_line(node: Node) -> usize {
    if node.is_error() || node.is_missing() {
        return node.start_position().row + 1;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() {
            return first_error_line(child);
        }
    }
    node.start_position().row + 1
}

fn node_text(node: Node, source: &[u8]) -> Option<String> {
    node.utf8_text(source).ok().map(|t| t.to_string())
}

/// Collect `import a.b` targets and `from m import x` as `m.x`
/// (`m.*` for wildcard imports), anywhere in the tree.
fn collect_imports(node: Node, source: &[u8], out: &mut Vec<String>) {
    match node.kind() {
        "import_statement" => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                match child.kind() {
                    "dotted_name" => {
                        if let Some(name) = node_text(child, source) {
                            out.push(name);
                        }
                    }
                    "aliased_import" => {
                        if let Some(name) = child
                            .child_by_field_name("name")
                            .and_then(|n| node_text(n, source))
                        {
                            out.push(name);
                        }
                    }
                    _ => {}
                }
            }
        }
        "import_from_statement" => {
            let module = node
                .child_by_field_name("module_name")
                .and_then(|n| node_text(n, source))
                .unwrap_or_default();

            let mut cursor = node.walk();
            let mut found = false;
            for child in node.children_by_field_name("name", &mut cursor) {
                let name = match child.kind() {
                    "aliased_import" => child
                        .child_by_field_name("name")
                        .and_then(|n| node_text(n, source)),
                    _ => node_text(child, source),
                };
                if let Some(name) = name {
                    out.push(format!("{}.{}", module, name));
                    found = true;
                }
            }
            if !found {
                let mut cursor = node.walk();
                let wildcard = node
                    .named_children(&mut cursor)
                    .any(|c| c.kind() == "wildcard_import");
                if wildcard {
                    out.push(format!("{}.*", module));
                }
            }
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_imports(child, source, out);
    }
}

/// An except clause with no exception type has only its body as a named
/// child.
fn count_bare_excepts(node: Node) -> usize {
    let mut count = 0;
    if node.kind() == "except_clause" {
        let mut cursor = node.walk();
        let has_type = node
            .named_children(&mut cursor)
            .any(|c| c.kind() != "block" && c.kind() != "comment");
        if !has_type {
            count += 1;
        }
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        count += count_bare_excepts(child);
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_functions_and_classes() {
        let source = r#"
def hello():
    pass

class Widget:
    def render(self):
        pass

class Gadget:
    pass
"#;
        let analysis = analyze(source).unwrap();
        assert_eq!(analysis.functions, vec!["hello", "render"]);
        assert_eq!(analysis.classes, vec!["Widget", "Gadget"]);
    }

    #[test]
    fn test_decision_points_sum_over_functions() {
        // Function a: three ifs; function b: one loop
        let source = r#"
def a(x):
    if x > 0:
        pass
    if x > 1:
        pass
    if x > 2:
        pass

def b(items):
    for item in items:
        pass
"#;
        let analysis = analyze(source).unwrap();
        assert_eq!(analysis.functions.len(), 2);
        assert_eq!(analysis.decision_points, 4);
    }

    #[test]
    fn test_nested_function_bodies_count_twice() {
        let source = r#"
def outer():
    def inner(x):
        if x:
            pass
    return inner
"#;
        let analysis = analyze(source).unwrap();
        assert_eq!(analysis.functions, vec!["outer", "inner"]);
        // The if counts once for inner and once inside outer's subtree
        assert_eq!(analysis.decision_points, 2);
    }

    #[test]
    fn test_try_and_with_are_decision_points() {
        let source = r#"
def guarded(path):
    try:
        with open(path) as f:
            return f.read()
    except IOError:
        return None
"#;
        let analysis = analyze(source).unwrap();
        assert_eq!(analysis.decision_points, 2);
    }

    #[test]
    fn test_import_forms() {
        let source = r#"
import os
import os.path
import numpy as np
from pathlib import Path
from collections import OrderedDict as OD
from os import *
"#;
        let analysis = analyze(source).unwrap();
        assert_eq!(
            analysis.imports,
            vec![
                "os",
                "os.path",
                "numpy",
                "pathlib.Path",
                "collections.OrderedDict",
                "os.*",
            ]
        );
    }

    #[test]
    fn test_bare_except_detection() {
        let source = r#"
def risky():
    try:
        work()
    except:
        pass
    try:
        work()
    except ValueError:
        pass
"#;
        let analysis = analyze(source).unwrap();
        assert_eq!(analysis.bare_excepts, 1);
    }

    #[test]
    fn test_syntax_error_reports_parse_failure() {
        let source = "def broken(:\n    pass\n";
        let err = analyze(source).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }
}

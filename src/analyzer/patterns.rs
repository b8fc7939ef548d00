//! Regex-based name extraction for pattern-path languages
//!
//! Languages without structured-parse support get a best-effort
//! approximation of function names, class names, and import targets from
//! an ordered list of regular expressions. Each pattern's first capture
//! group is the extracted name; results keep pattern order, then match
//! order, with no deduplication.

use once_cell::sync::Lazy;
use regex::Regex;

use super::language::Language;

pub struct NamePatterns {
    pub functions: Vec<Regex>,
    pub classes: Vec<Regex>,
    pub imports: Vec<Regex>,
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("invalid name pattern"))
        .collect()
}

fn build(functions: &[&str], classes: &[&str], imports: &[&str]) -> NamePatterns {
    NamePatterns {
        functions: compile(functions),
        classes: compile(classes),
        imports: compile(imports),
    }
}

static JAVASCRIPT: Lazy<NamePatterns> = Lazy::new(|| {
    build(
        &[
            r"function\s+(\w+)",
            r"(\w+)\s*:\s*function",
            r"const\s+(\w+)\s*=\s*\(.*?\)\s*=>",
        ],
        &[r"class\s+(\w+)"],
        &[r#"import.*from\s+['"]([^'"]+)['"]"#],
    )
});

static PHP: Lazy<NamePatterns> = Lazy::new(|| {
    build(
        &[r"function\s+(\w+)"],
        &[r"class\s+(\w+)"],
        &[r"(?m)^\s*use\s+([\w\\]+)"],
    )
});

static GO: Lazy<NamePatterns> = Lazy::new(|| {
    build(
        &[r"func\s+(?:\([^)]*\)\s*)?(\w+)\s*\("],
        &[r"type\s+(\w+)\s+(?:struct|interface)\b"],
        &[r#"import\s+(?:\w+\s+)?"([^"]+)""#, r#"(?m)^\s*(?:\w+\s+)?"([^"]+)"\s*$"#],
    )
});

static RUST: Lazy<NamePatterns> = Lazy::new(|| {
    build(
        &[r"fn\s+(\w+)"],
        &[r"(?:struct|enum|trait)\s+(\w+)"],
        &[r"(?m)^\s*use\s+([\w:]+)"],
    )
});

static RUBY: Lazy<NamePatterns> = Lazy::new(|| {
    build(
        &[r"(?m)^\s*def\s+(\w+[?!]?)"],
        &[r"(?m)^\s*(?:class|module)\s+(\w+)"],
        &[r#"(?m)require(?:_relative)?\s+['"]([^'"]+)['"]"#],
    )
});

static JAVA: Lazy<NamePatterns> = Lazy::new(|| {
    build(
        &[r"(?m)(?:public|protected|private|static|final|synchronized)[\w<>\[\], ]*\s(\w+)\s*\("],
        &[r"(?:class|interface|enum)\s+(\w+)"],
        &[r"import\s+(?:static\s+)?([\w.]+)\s*;"],
    )
});

static C_FAMILY: Lazy<NamePatterns> = Lazy::new(|| {
    build(
        &[],
        &[r"(?:class|struct)\s+(\w+)"],
        &[r#"#include\s*[<"]([^>"]+)[>"]"#],
    )
});

static BASH: Lazy<NamePatterns> = Lazy::new(|| {
    build(
        &[r"(?m)^\s*(?:function\s+)?(\w+)\s*\(\)"],
        &[],
        &[r"(?m)^\s*(?:source|\.)\s+(\S+)"],
    )
});

static SQL: Lazy<NamePatterns> = Lazy::new(|| {
    build(
        &[r"(?i)create\s+(?:or\s+replace\s+)?(?:function|procedure)\s+(\w+)"],
        &[],
        &[],
    )
});

/// Pattern table for a language, if it takes the pattern path. Python is
/// the structured path; unknown files get the line-count fallback.
pub fn for_language(language: Language) -> Option<&'static NamePatterns> {
    match language {
        Language::Javascript | Language::Typescript => Some(&JAVASCRIPT),
        Language::Php => Some(&PHP),
        Language::Go => Some(&GO),
        Language::Rust => Some(&RUST),
        Language::Ruby => Some(&RUBY),
        Language::Java => Some(&JAVA),
        Language::C | Language::Cpp => Some(&C_FAMILY),
        Language::Bash => Some(&BASH),
        Language::Sql => Some(&SQL),
        Language::Python | Language::Unknown => None,
    }
}

/// Run an ordered pattern list over `content`, collecting first capture
/// groups.
pub fn extract(patterns: &[Regex], content: &str) -> Vec<String> {
    let mut names = Vec::new();
    for re in patterns {
        for caps in re.captures_iter(content) {
            if let Some(m) = caps.get(1) {
                names.push(m.as_str().to_string());
            }
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_javascript_function_forms() {
        let content = r#"
function plain() {}
const arrow = (a, b) => a + b;
var obj = { method: function() {} };
class Widget {}
import { x } from "lib/util";
"#;
        let table = for_language(Language::Javascript).unwrap();
        let functions = extract(&table.functions, content);
        assert!(functions.contains(&"plain".to_string()));
        assert!(functions.contains(&"arrow".to_string()));
        assert!(functions.contains(&"method".to_string()));
        assert_eq!(extract(&table.classes, content), vec!["Widget"]);
        assert_eq!(extract(&table.imports, content), vec!["lib/util"]);
    }

    #[test]
    fn test_php_names() {
        let content = "<?php\nuse App\\Service;\nclass Order {\n  function total() {}\n}\n";
        let table = for_language(Language::Php).unwrap();
        assert_eq!(extract(&table.functions, content), vec!["total"]);
        assert_eq!(extract(&table.classes, content), vec!["Order"]);
        assert_eq!(extract(&table.imports, content), vec!["App\\Service"]);
    }

    #[test]
    fn test_rust_names() {
        let content = "use std::fmt;\nstruct Point;\ntrait Draw {}\nfn render() {}\n";
        let table = for_language(Language::Rust).unwrap();
        assert_eq!(extract(&table.functions, content), vec!["render"]);
        assert_eq!(extract(&table.classes, content), vec!["Point", "Draw"]);
        assert_eq!(extract(&table.imports, content), vec!["std::fmt"]);
    }

    #[test]
    fn test_go_methods_and_imports() {
        let content = "import \"fmt\"\n\nfunc (s *Server) Handle() {}\nfunc main() {}\ntype Server struct {}\n";
        let table = for_language(Language::Go).unwrap();
        let functions = extract(&table.functions, content);
        assert!(functions.contains(&"Handle".to_string()));
        assert!(functions.contains(&"main".to_string()));
        assert_eq!(extract(&table.classes, content), vec!["Server"]);
        assert!(extract(&table.imports, content).contains(&"fmt".to_string()));
    }

    #[test]
    fn test_structured_and_unknown_have_no_table() {
        assert!(for_language(Language::Python).is_none());
        assert!(for_language(Language::Unknown).is_none());
    }
}

//! Heuristic security scanning
//!
//! Fixed, language-specific pattern tables flagging risky constructs.
//! Presence test only: a pattern contributes one warning no matter how
//! often it matches. The tables are data; growing them never touches the
//! scan loop.

use once_cell::sync::Lazy;
use regex::Regex;

use super::language::Language;

struct SecurityPattern {
    regex: Regex,
    warning: &'static str,
}

fn table(entries: &[(&str, &'static str)]) -> Vec<SecurityPattern> {
    entries
        .iter()
        .map(|(pattern, warning)| SecurityPattern {
            regex: Regex::new(pattern).expect("invalid security pattern"),
            warning,
        })
        .collect()
}

static PYTHON: Lazy<Vec<SecurityPattern>> = Lazy::new(|| {
    table(&[
        (r"(?i)eval\s*\(", "Use of eval() - potential code injection"),
        (r"(?i)exec\s*\(", "Use of exec() - potential code execution"),
        (r"(?i)__import__\s*\(", "Dynamic imports - review for security"),
        (r"(?i)shell=True", "Shell injection risk in subprocess"),
        (r"(?i)sql.*%.*%", "Potential SQL injection"),
        (r"(?i)pickle\.loads?\(", "Pickle usage - ensure trusted data only"),
    ])
});

static JAVASCRIPT: Lazy<Vec<SecurityPattern>> = Lazy::new(|| {
    table(&[
        (r"(?i)eval\s*\(", "Use of eval() - code injection risk"),
        (r"(?i)innerHTML\s*=", "innerHTML usage - XSS risk"),
        (r"(?i)document\.write\s*\(", "document.write - XSS vulnerability"),
        (r"(?i)\.html\s*\(.*\$", "Potential XSS in jQuery html()"),
    ])
});

static PHP: Lazy<Vec<SecurityPattern>> = Lazy::new(|| {
    table(&[
        (r"(?i)\$_GET\[", "Direct $_GET usage - validate input"),
        (r"(?i)\$_POST\[", "Direct $_POST usage - validate input"),
        (r"(?i)eval\s*\(", "Use of eval() - code injection"),
        (r"(?i)exec\s*\(", "Use of exec() - command injection"),
        (r"(?i)mysql_query\s*\(", "Deprecated mysql_query - use PDO"),
        (r"(?i)md5\s*\(.*password", "MD5 for passwords - use stronger hashing"),
    ])
});

/// Scan `content` against the pattern table for `language`. Languages
/// without a table produce no warnings.
pub fn scan(content: &str, language: Language) -> Vec<String> {
    let patterns: &[SecurityPattern] = match language {
        Language::Python => &PYTHON,
        Language::Javascript | Language::Typescript => &JAVASCRIPT,
        Language::Php => &PHP,
        _ => return Vec::new(),
    };

    patterns
        .iter()
        .filter(|p| p.regex.is_match(content))
        .map(|p| p.warning.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_pattern_warns_once() {
        let content = "eval(a)\neval(b)\neval(c)\n";
        let warnings = scan(content, Language::Python);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("eval()"));
    }

    #[test]
    fn test_python_shell_injection() {
        let content = "subprocess.run(cmd, shell=True)";
        let warnings = scan(content, Language::Python);
        assert_eq!(warnings, vec!["Shell injection risk in subprocess"]);
    }

    #[test]
    fn test_javascript_and_typescript_share_table() {
        let content = "el.innerHTML = payload;";
        assert_eq!(scan(content, Language::Javascript).len(), 1);
        assert_eq!(scan(content, Language::Typescript).len(), 1);
    }

    #[test]
    fn test_php_superglobals() {
        let content = "<?php $id = $_GET['id']; $q = mysql_query($id);";
        let warnings = scan(content, Language::Php);
        assert!(warnings.iter().any(|w| w.contains("$_GET")));
        assert!(warnings.iter().any(|w| w.contains("mysql_query")));
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_unsupported_language_is_clean() {
        assert!(scan("eval(x)", Language::Go).is_empty());
        assert!(scan("eval(x)", Language::Unknown).is_empty());
    }

    #[test]
    fn test_warnings_follow_table_order() {
        let content = "exec(x)\neval(y)\n";
        let warnings = scan(content, Language::Python);
        assert_eq!(warnings[0], "Use of eval() - potential code injection");
        assert_eq!(warnings[1], "Use of exec() - potential code execution");
    }
}

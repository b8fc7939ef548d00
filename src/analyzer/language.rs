//! Language classification by file extension.
//!
//! Closed set of supported languages; anything else routes to the
//! line-count-only fallback.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Javascript,
    Typescript,
    Php,
    Java,
    Cpp,
    C,
    Go,
    Rust,
    Ruby,
    Bash,
    Sql,
    Unknown,
}

impl Language {
    /// Classify a path by its extension (case-insensitive).
    pub fn classify(path: &Path) -> Language {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "py" => Language::Python,
            "js" | "jsx" => Language::Javascript,
            "ts" | "tsx" => Language::Typescript,
            "php" => Language::Php,
            "java" => Language::Java,
            "cpp" => Language::Cpp,
            "c" => Language::C,
            "go" => Language::Go,
            "rs" => Language::Rust,
            "rb" => Language::Ruby,
            "sh" => Language::Bash,
            "sql" => Language::Sql,
            _ => Language::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Javascript => "javascript",
            Language::Typescript => "typescript",
            Language::Php => "php",
            Language::Java => "java",
            Language::Cpp => "cpp",
            Language::C => "c",
            Language::Go => "go",
            Language::Rust => "rust",
            Language::Ruby => "ruby",
            Language::Bash => "bash",
            Language::Sql => "sql",
            Language::Unknown => "unknown",
        }
    }

    /// Whether a path maps to a supported language at all.
    pub fn is_supported(path: &Path) -> bool {
        Language::classify(path) != Language::Unknown
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_extensions() {
        assert_eq!(Language::classify(Path::new("a.py")), Language::Python);
        assert_eq!(Language::classify(Path::new("a.jsx")), Language::Javascript);
        assert_eq!(Language::classify(Path::new("a.tsx")), Language::Typescript);
        assert_eq!(Language::classify(Path::new("a.rs")), Language::Rust);
        assert_eq!(Language::classify(Path::new("a.sh")), Language::Bash);
        assert_eq!(Language::classify(Path::new("dir/b.sql")), Language::Sql);
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(Language::classify(Path::new("A.PY")), Language::Python);
        assert_eq!(Language::classify(Path::new("a.Go")), Language::Go);
    }

    #[test]
    fn test_classify_unknown() {
        assert_eq!(Language::classify(Path::new("a.txt")), Language::Unknown);
        assert_eq!(Language::classify(Path::new("Makefile")), Language::Unknown);
        assert!(!Language::is_supported(Path::new("a.md")));
    }
}

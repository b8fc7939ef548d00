//! Code analysis with content-addressed caching
//!
//! A single analysis request reads the file once, digests its bytes,
//! consults the cache, and only recomputes on a miss. Python takes the
//! structured tree-sitter path; other supported languages take the
//! regex pattern path; everything else gets a line count. File-level
//! failures degrade to an issue on the result and never abort a batch.

pub mod language;
pub mod patterns;
pub mod python;
pub mod security;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use walkdir::WalkDir;

use crate::achievements::{self, ActionType, Unlock};
use crate::error::{Error, Result};
use crate::store::MemoryStore;

pub use language::Language;

// Quality-issue thresholds
const MAX_FUNCTIONS: usize = 25;
const MAX_CLASSES: usize = 10;
const MAX_COMPLEXITY: f64 = 8.0;
const LARGE_FILE_STRUCTURED: usize = 1000;
const LARGE_FILE_PATTERN: usize = 500;

/// Result of analyzing one file. Immutable once produced; this is the
/// shape serialized into the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeAnalysis {
    pub file_path: String,
    pub language: Language,
    pub lines_of_code: usize,
    pub complexity_score: f64,
    pub functions: Vec<String>,
    pub classes: Vec<String>,
    pub imports: Vec<String>,
    pub issues: Vec<String>,
    pub security_issues: Vec<String>,
}

impl CodeAnalysis {
    fn empty(path: &str, language: Language) -> Self {
        Self {
            file_path: path.to_string(),
            language,
            lines_of_code: 0,
            complexity_score: 0.0,
            functions: Vec::new(),
            classes: Vec::new(),
            imports: Vec::new(),
            issues: Vec::new(),
            security_issues: Vec::new(),
        }
    }
}

/// One analyzed file plus what happened along the way.
#[derive(Debug)]
pub struct FileReport {
    pub analysis: CodeAnalysis,
    pub cached: bool,
    pub unlocks: Vec<Unlock>,
}

/// Aggregate over a directory batch.
#[derive(Debug, Default)]
pub struct DirectorySummary {
    pub analyses: Vec<CodeAnalysis>,
    pub files_analyzed: usize,
    pub cache_hits: usize,
    pub total_lines: usize,
    pub issue_count: usize,
    pub security_issue_count: usize,
    pub languages: BTreeMap<&'static str, usize>,
    pub unlocks: Vec<Unlock>,
    pub cancelled: bool,
}

impl DirectorySummary {
    fn push(&mut self, report: FileReport) {
        self.files_analyzed += 1;
        if report.cached {
            self.cache_hits += 1;
        }
        self.total_lines += report.analysis.lines_of_code;
        self.issue_count += report.analysis.issues.len();
        self.security_issue_count += report.analysis.security_issues.len();
        *self
            .languages
            .entry(report.analysis.language.as_str())
            .or_insert(0) += 1;
        self.unlocks.extend(report.unlocks);
        self.analyses.push(report.analysis);
    }
}

/// Stable digest of a file's raw bytes, used as the cache validation key.
pub fn content_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

pub struct CodeAnalyzer<'a> {
    store: &'a mut MemoryStore,
    achievements_enabled: bool,
}

impl<'a> CodeAnalyzer<'a> {
    pub fn new(store: &'a mut MemoryStore) -> Self {
        Self {
            store,
            achievements_enabled: true,
        }
    }

    pub fn with_achievements(mut self, enabled: bool) -> Self {
        self.achievements_enabled = enabled;
        self
    }

    /// Analyze one file, cache-first. Unreadable files yield a degraded
    /// result with the error recorded as an issue; cache read failures
    /// degrade to a miss and cache write failures are reported on stderr
    /// but never withhold the result.
    pub fn analyze_file(&mut self, path: &Path) -> Result<FileReport> {
        let language = Language::classify(path);
        let path_str = path.to_string_lossy().to_string();

        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                let mut analysis = CodeAnalysis::empty(&path_str, language);
                analysis.issues.push(format!("File read error: {}", e));
                return Ok(FileReport {
                    analysis,
                    cached: false,
                    unlocks: Vec::new(),
                });
            }
        };
        let digest = content_digest(&bytes);

        match self.store.cached_analysis(&path_str, &digest) {
            Ok(Some(analysis)) => {
                let unlocks = self.record_analysis_action()?;
                return Ok(FileReport {
                    analysis,
                    cached: true,
                    unlocks,
                });
            }
            Ok(None) => {}
            Err(e) => eprintln!("warning: cache read failed for {}: {}", path_str, e),
        }

        // Best-effort text decode; binary-looking content never fails hard
        let content = String::from_utf8_lossy(&bytes);
        let analysis = analyze_content(&path_str, language, &content);

        if let Err(e) = self.store.store_analysis(&path_str, &digest, &analysis) {
            eprintln!("warning: failed to cache analysis for {}: {}", path_str, e);
        }

        let unlocks = self.record_analysis_action()?;
        Ok(FileReport {
            analysis,
            cached: false,
            unlocks,
        })
    }

    /// Recursively analyze every supported file under `dir`. Each file is
    /// committed to the cache as it completes, so cancelling between
    /// files (via `cancel`) loses nothing already done.
    pub fn analyze_directory(&mut self, dir: &Path, cancel: &AtomicBool) -> Result<DirectorySummary> {
        let mut summary = DirectorySummary::default();

        let walker = WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_hidden(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                // Unreadable subtree: skip it, the batch continues
                Err(_) => continue,
            };
            if !entry.file_type().is_file() || !Language::is_supported(entry.path()) {
                continue;
            }
            if cancel.load(Ordering::Relaxed) {
                summary.cancelled = true;
                break;
            }

            let report = self.analyze_file(entry.path())?;
            summary.push(report);
        }

        Ok(summary)
    }

    fn record_analysis_action(&mut self) -> Result<Vec<Unlock>> {
        if !self.achievements_enabled {
            return Ok(Vec::new());
        }
        achievements::record_action(self.store, ActionType::CodeAnalysis)
    }
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
}

/// Dispatch on language and apply the uniform quality-issue policy.
pub fn analyze_content(path: &str, language: Language, content: &str) -> CodeAnalysis {
    match language {
        Language::Python => analyze_python(path, content),
        Language::Unknown => {
            let mut analysis = CodeAnalysis::empty(path, language);
            analysis.lines_of_code = non_blank_lines(content);
            analysis
                .issues
                .push("Unsupported file type - line count only".to_string());
            analysis
        }
        _ => analyze_with_patterns(path, language, content),
    }
}

fn analyze_python(path: &str, content: &str) -> CodeAnalysis {
    let parsed = match python::analyze(content) {
        Ok(parsed) => parsed,
        Err(e) => {
            let msg = match e {
                Error::Parse(msg) => msg,
                other => other.to_string(),
            };
            let mut analysis = CodeAnalysis::empty(path, Language::Python);
            analysis.lines_of_code = content.lines().count();
            analysis.issues.push(format!("Syntax error: {}", msg));
            return analysis;
        }
    };

    // Non-blank, non-comment lines
    let lines_of_code = content
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .count();

    let complexity_score =
        parsed.decision_points as f64 / std::cmp::max(parsed.functions.len(), 1) as f64;

    let issues = quality_issues(
        &parsed.functions,
        &parsed.classes,
        lines_of_code,
        complexity_score,
        content,
        Some(parsed.bare_excepts),
    );

    CodeAnalysis {
        file_path: path.to_string(),
        language: Language::Python,
        lines_of_code,
        complexity_score,
        functions: parsed.functions,
        classes: parsed.classes,
        imports: parsed.imports,
        issues,
        security_issues: security::scan(content, Language::Python),
    }
}

fn analyze_with_patterns(path: &str, language: Language, content: &str) -> CodeAnalysis {
    let lines_of_code = non_blank_lines(content);

    let (functions, classes, imports) = match patterns::for_language(language) {
        Some(table) => (
            patterns::extract(&table.functions, content),
            patterns::extract(&table.classes, content),
            patterns::extract(&table.imports, content),
        ),
        None => (Vec::new(), Vec::new(), Vec::new()),
    };

    // No decision-point counting on the pattern path
    let issues = quality_issues(&functions, &classes, lines_of_code, 0.0, content, None);

    CodeAnalysis {
        file_path: path.to_string(),
        language,
        lines_of_code,
        complexity_score: 0.0,
        functions,
        classes,
        imports,
        issues,
        security_issues: security::scan(content, language),
    }
}

fn non_blank_lines(content: &str) -> usize {
    content.lines().filter(|line| !line.trim().is_empty()).count()
}

/// Uniform quality policy. Conditions are independent; all applicable
/// issues are emitted together in check order. `bare_excepts` is `Some`
/// only on the structured path, which also carries the larger size
/// threshold and the print-statement lint.
fn quality_issues(
    functions: &[String],
    classes: &[String],
    lines_of_code: usize,
    complexity_score: f64,
    content: &str,
    bare_excepts: Option<usize>,
) -> Vec<String> {
    let mut issues = Vec::new();
    let structured = bare_excepts.is_some();

    if functions.len() > MAX_FUNCTIONS {
        issues.push("High function count - consider splitting into modules".to_string());
    }

    let large_file = if structured {
        LARGE_FILE_STRUCTURED
    } else {
        LARGE_FILE_PATTERN
    };
    if lines_of_code > large_file {
        issues.push("Large file - consider refactoring".to_string());
    }

    if complexity_score > MAX_COMPLEXITY {
        issues.push("High complexity - simplify conditional logic".to_string());
    }

    if classes.len() > MAX_CLASSES {
        issues.push("Many classes - consider design patterns".to_string());
    }

    let lower = content.to_lowercase();
    if lower.contains("todo") || lower.contains("fixme") {
        issues.push("Contains TODO/FIXME comments".to_string());
    }

    if let Some(bare) = bare_excepts {
        if bare > 0 {
            issues.push("Bare except clauses - specify exception types".to_string());
        }
        if content.contains("print(") && !lower.contains("debug") {
            issues.push("Print statements found - consider using logging".to_string());
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_file(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_complexity_formula() {
        // Function a: three ifs, function b: one loop -> (3 + 1) / 2
        let content = r#"
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
        let analysis = analyze_content("sample.py", Language::Python, content);
        assert_eq!(analysis.complexity_score, 2.0);
    }

    #[test]
    fn test_complexity_zero_without_functions() {
        let analysis = analyze_content("sample.py", Language::Python, "x = 1\n");
        assert_eq!(analysis.complexity_score, 0.0);
    }

    #[test]
    fn test_degraded_analysis_on_syntax_error() {
        let content = "def broken(:\n    pass\n";
        let analysis = analyze_content("broken.py", Language::Python, content);
        assert!(analysis.functions.is_empty());
        assert!(analysis.classes.is_empty());
        assert_eq!(analysis.lines_of_code, 2);
        assert_eq!(analysis.issues.len(), 1);
        assert!(analysis.issues[0].contains("Syntax error"));
    }

    #[test]
    fn test_unknown_language_line_count_only() {
        let analysis = analyze_content("notes.txt", Language::Unknown, "one\n\ntwo\n");
        assert_eq!(analysis.lines_of_code, 2);
        assert!(analysis.functions.is_empty());
        assert_eq!(analysis.issues.len(), 1);
    }

    #[test]
    fn test_pattern_path_has_zero_complexity() {
        let content = "function render() { if (x) { y(); } }\n";
        let analysis = analyze_content("app.js", Language::Javascript, content);
        assert_eq!(analysis.functions, vec!["render"]);
        assert_eq!(analysis.complexity_score, 0.0);
    }

    #[test]
    fn test_quality_issue_todo_and_bare_except() {
        let content = r#"
# TODO: tidy this up
def f():
    try:
        g()
    except:
        pass
"#;
        let analysis = analyze_content("messy.py", Language::Python, content);
        assert!(analysis
            .issues
            .contains(&"Contains TODO/FIXME comments".to_string()));
        assert!(analysis
            .issues
            .contains(&"Bare except clauses - specify exception types".to_string()));
    }

    #[test]
    fn test_quality_issue_high_complexity() {
        let mut content = String::from("def f(x):\n");
        for i in 0..9 {
            content.push_str(&format!("    if x > {}:\n        pass\n", i));
        }
        let analysis = analyze_content("hot.py", Language::Python, &content);
        assert_eq!(analysis.complexity_score, 9.0);
        assert!(analysis
            .issues
            .contains(&"High complexity - simplify conditional logic".to_string()));
    }

    #[test]
    fn test_quality_issue_large_pattern_file() {
        let content = "var x = 1;\n".repeat(501);
        let analysis = analyze_content("big.js", Language::Javascript, &content);
        assert!(analysis
            .issues
            .contains(&"Large file - consider refactoring".to_string()));
    }

    #[test]
    fn test_security_issues_attached() {
        let analysis = analyze_content("risky.py", Language::Python, "eval(data)\n");
        assert_eq!(analysis.security_issues.len(), 1);
    }

    #[test]
    fn test_cache_hit_until_content_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "a.py", "def f():\n    pass\n");
        let mut store = MemoryStore::open_in_memory().unwrap();
        let mut analyzer = CodeAnalyzer::new(&mut store);

        let first = analyzer.analyze_file(&path).unwrap();
        assert!(!first.cached);

        let second = analyzer.analyze_file(&path).unwrap();
        assert!(second.cached);
        assert_eq!(first.analysis, second.analysis);

        // One changed byte forces recomputation even with the same path
        std::fs::write(&path, "def g():\n    pass\n").unwrap();
        let third = analyzer.analyze_file(&path).unwrap();
        assert!(!third.cached);
        assert_eq!(third.analysis.functions, vec!["g"]);
    }

    #[test]
    fn test_unreadable_file_degrades() {
        let mut store = MemoryStore::open_in_memory().unwrap();
        let mut analyzer = CodeAnalyzer::new(&mut store);
        let report = analyzer
            .analyze_file(Path::new("/no/such/file.py"))
            .unwrap();
        assert!(!report.cached);
        assert_eq!(report.analysis.lines_of_code, 0);
        assert!(report.analysis.issues[0].contains("File read error"));
    }

    #[test]
    fn test_analysis_records_achievement_progress() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "a.py", "x = 1\n");
        let mut store = MemoryStore::open_in_memory().unwrap();

        CodeAnalyzer::new(&mut store).analyze_file(&path).unwrap();

        let rows = store.list_achievements().unwrap();
        assert!(rows
            .iter()
            .any(|a| a.name == "code_analyzer" && a.progress == 1));
    }

    #[test]
    fn test_directory_walk_skips_unsupported_and_hidden() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "a.py", "x = 1\n");
        write_file(dir.path(), "b.js", "var x = 1;\n");
        write_file(dir.path(), "notes.txt", "skip me\n");
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        write_file(&dir.path().join(".git"), "c.py", "x = 1\n");

        let mut store = MemoryStore::open_in_memory().unwrap();
        let mut analyzer = CodeAnalyzer::new(&mut store);
        let summary = analyzer
            .analyze_directory(dir.path(), &AtomicBool::new(false))
            .unwrap();

        assert_eq!(summary.files_analyzed, 2);
        assert_eq!(summary.languages.get("python"), Some(&1));
        assert_eq!(summary.languages.get("javascript"), Some(&1));
        assert!(!summary.cancelled);
    }

    #[test]
    fn test_directory_walk_honors_cancellation() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "a.py", "x = 1\n");

        let mut store = MemoryStore::open_in_memory().unwrap();
        let mut analyzer = CodeAnalyzer::new(&mut store);
        let summary = analyzer
            .analyze_directory(dir.path(), &AtomicBool::new(true))
            .unwrap();

        assert!(summary.cancelled);
        assert_eq!(summary.files_analyzed, 0);
    }
}

//! Analyze command implementation

use anyhow::Result;
use std::path::Path;
use std::sync::atomic::AtomicBool;

use crate::analyzer::{CodeAnalysis, CodeAnalyzer, DirectorySummary};
use crate::config::Config;
use crate::store::MemoryStore;

use super::print_unlocks;

pub fn run(store: &mut MemoryStore, config: &Config, target: &str) -> Result<()> {
    let path = Path::new(target);
    let mut analyzer =
        CodeAnalyzer::new(store).with_achievements(config.analysis.achievements_enabled);

    if path.is_file() {
        let report = analyzer.analyze_file(path)?;
        print_analysis(&report.analysis, report.cached);
        print_unlocks(&report.unlocks);
    } else if path.is_dir() {
        println!("🔍 Analyzing directory: {}\n", target);
        let summary = analyzer.analyze_directory(path, &AtomicBool::new(false))?;
        print_summary(&summary);
        print_unlocks(&summary.unlocks);
    } else {
        anyhow::bail!("Path not found: {}", target);
    }

    Ok(())
}

fn print_analysis(analysis: &CodeAnalysis, cached: bool) {
    println!(
        "📄 {} ({}){}",
        analysis.file_path,
        analysis.language,
        if cached { " [cached]" } else { "" }
    );
    println!("   Lines of code: {}", analysis.lines_of_code);
    println!("   Complexity:    {:.2}", analysis.complexity_score);

    if !analysis.functions.is_empty() {
        println!(
            "   Functions ({}): {}",
            analysis.functions.len(),
            preview(&analysis.functions, 8)
        );
    }
    if !analysis.classes.is_empty() {
        println!(
            "   Classes ({}):   {}",
            analysis.classes.len(),
            preview(&analysis.classes, 8)
        );
    }
    if !analysis.imports.is_empty() {
        println!("   Imports:       {}", analysis.imports.len());
    }

    for issue in &analysis.issues {
        println!("   ⚠️  {}", issue);
    }
    for issue in &analysis.security_issues {
        println!("   🔴 {}", issue);
    }
}

fn print_summary(summary: &DirectorySummary) {
    if summary.files_analyzed == 0 {
        println!("No supported code files found.");
        return;
    }

    for analysis in &summary.analyses {
        let flags = analysis.issues.len() + analysis.security_issues.len();
        println!(
            "{:<50} {:<12} {:>6} lines {:>3} flags",
            truncate(&analysis.file_path, 50),
            analysis.language.as_str(),
            analysis.lines_of_code,
            flags,
        );
    }

    println!();
    println!(
        "✅ {} files, {} lines ({} cache hits)",
        summary.files_analyzed, summary.total_lines, summary.cache_hits
    );

    let languages: Vec<String> = summary
        .languages
        .iter()
        .map(|(language, count)| format!("{} ({})", language, count))
        .collect();
    println!("   Languages: {}", languages.join(", "));
    println!(
        "   Issues: {} quality, {} security",
        summary.issue_count, summary.security_issue_count
    );

    if summary.cancelled {
        println!("   (batch interrupted; completed files are cached)");
    }
}

fn preview(names: &[String], limit: usize) -> String {
    let shown: Vec<&str> = names.iter().take(limit).map(String::as_str).collect();
    if names.len() > limit {
        format!("{}...", shown.join(", "))
    } else {
        shown.join(", ")
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.len() > width {
        format!("...{}", &text[text.len() - (width - 3)..])
    } else {
        text.to_string()
    }
}

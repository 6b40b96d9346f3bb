//! Stylish (colored terminal) output formatter.

use colored::Colorize;

use crate::lint::LintResult;
use crate::types::Severity;

fn severity_label(severity: Severity) -> String {
    match severity {
        Severity::Error => "error".red().to_string(),
        Severity::Warning => "warning".yellow().to_string(),
        Severity::Info => "info".blue().to_string(),
        Severity::Style => "style".dimmed().to_string(),
    }
}

fn plural(count: usize, word: &str) -> String {
    format!("{} {}{}", count, word, if count == 1 { "" } else { "s" })
}

/// Format lint results in stylish format (colored terminal output).
pub fn format(results: &[LintResult]) -> String {
    let mut output = String::new();
    let mut total_errors = 0;
    let mut total_warnings = 0;

    for result in results {
        if result.failures.is_empty() && !result.has_problems() {
            continue;
        }

        output.push_str(&format!("\n{}\n", result.file_path.underline()));

        for err in &result.parse_errors {
            output.push_str(&format!("  {}  {}\n", severity_label(Severity::Error), err));
            total_errors += 1;
        }

        for err in &result.stack_errors {
            output.push_str(&format!(
                "  {}  {}  {}\n",
                severity_label(Severity::Error),
                err,
                err.kind().dimmed()
            ));
            total_errors += 1;
        }

        for failure in &result.failures {
            output.push_str(&format!(
                "  {}  {}  {}  {}\n",
                format!("{}:{}", failure.line, failure.column).dimmed(),
                severity_label(failure.severity),
                failure.message,
                failure.code.as_str().dimmed()
            ));

            match failure.severity {
                Severity::Error => total_errors += 1,
                Severity::Warning => total_warnings += 1,
                _ => {}
            }
        }
    }

    if total_errors > 0 || total_warnings > 0 {
        output.push('\n');

        let mut parts = Vec::new();
        if total_errors > 0 {
            parts.push(plural(total_errors, "error"));
        }
        if total_warnings > 0 {
            parts.push(plural(total_warnings, "warning"));
        }

        let summary = format!(
            "  {} ({})",
            plural(total_errors + total_warnings, "problem"),
            parts.join(", ")
        );
        let summary = if total_errors > 0 {
            summary.red().bold()
        } else {
            summary.yellow().bold()
        };
        output.push_str(&format!("{}\n", summary));
    }

    output
}

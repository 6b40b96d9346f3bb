//! Output formatters for lint results.
//!
//! - JSON - Machine-readable JSON output
//! - Stylish - Colored terminal output (default)
//! - Compact - Single line per issue
//! - GitHub - GitHub Actions annotations
//! - SARIF - Static analysis interchange format
//! - JUnit - JUnit XML format

pub mod github;
pub mod json;
pub mod sarif;
pub mod stylish;

use crate::lint::LintResult;

/// Output format for lint results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// JSON format for machine processing
    Json,
    /// Stylish colored terminal output (default)
    #[default]
    Stylish,
    /// Single line per issue
    Compact,
    /// GitHub Actions annotations
    GitHub,
    /// SARIF 2.1.0 log
    Sarif,
    /// JUnit XML format
    JUnit,
}

/// Format lint results according to the specified format.
pub fn format_results(results: &[LintResult], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => json::format(results),
        OutputFormat::Stylish => stylish::format(results),
        OutputFormat::Compact => format_compact(results),
        OutputFormat::GitHub => github::format(results),
        OutputFormat::Sarif => sarif::format(results),
        OutputFormat::JUnit => format_junit(results),
    }
}

/// Format a single result.
pub fn format_result(result: &LintResult, format: OutputFormat) -> String {
    format_results(std::slice::from_ref(result), format)
}

/// Compact format (one line per issue).
fn format_compact(results: &[LintResult]) -> String {
    let mut output = String::new();

    for result in results {
        for err in &result.parse_errors {
            output.push_str(&format!("{}:1:1: error [parse] {}\n", result.file_path, err));
        }
        for err in &result.stack_errors {
            output.push_str(&format!("{}:1:1: error [stack] {}\n", result.file_path, err));
        }
        for failure in &result.failures {
            output.push_str(&format!(
                "{}:{}:{}: {} [{}] {}\n",
                result.file_path,
                failure.line,
                failure.column,
                failure.severity,
                failure.code,
                failure.message
            ));
        }
    }

    output
}

/// JUnit XML format.
fn format_junit(results: &[LintResult]) -> String {
    let mut output = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    output.push('\n');

    let problems = |r: &LintResult| r.failures.len() + r.parse_errors.len() + r.stack_errors.len();
    let total_tests: usize = results.iter().map(|r| problems(r).max(1)).sum();
    let total_failures: usize = results.iter().map(problems).sum();

    output.push_str(&format!(
        r#"<testsuite name="cfn-rules" tests="{}" failures="{}">"#,
        total_tests, total_failures
    ));
    output.push('\n');

    for result in results {
        let file = escape_xml(&result.file_path);
        if problems(result) == 0 {
            output.push_str(&format!(r#"  <testcase name="{}" classname="cfn-rules"/>"#, file));
            output.push('\n');
            continue;
        }

        let errors = result
            .parse_errors
            .iter()
            .map(|e| ("parse", e.clone()))
            .chain(result.stack_errors.iter().map(|e| ("stack", e.to_string())));
        for (kind, message) in errors {
            output.push_str(&format!(
                r#"  <testcase name="{}" classname="cfn-rules.{}">"#,
                file, kind
            ));
            output.push('\n');
            output.push_str(&format!(
                r#"    <failure message="{}" type="error"/>"#,
                escape_xml(&message)
            ));
            output.push('\n');
            output.push_str("  </testcase>\n");
        }

        for failure in &result.failures {
            output.push_str(&format!(
                r#"  <testcase name="{}:{}" classname="cfn-rules.{}">"#,
                file, failure.line, failure.code
            ));
            output.push('\n');
            output.push_str(&format!(
                r#"    <failure message="{}" type="{}"/>"#,
                escape_xml(&failure.message),
                failure.severity
            ));
            output.push('\n');
            output.push_str("  </testcase>\n");
        }
    }

    output.push_str("</testsuite>\n");
    output
}

/// Escape XML special characters.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

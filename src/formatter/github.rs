//! GitHub Actions output formatter.
//!
//! Produces output in GitHub Actions workflow command format:
//! ::error file={name},line={line},col={col}::{message}

use crate::lint::LintResult;
use crate::types::Severity;

/// Format lint results for GitHub Actions.
pub fn format(results: &[LintResult]) -> String {
    let mut output = String::new();

    for result in results {
        for err in &result.parse_errors {
            output.push_str(&format!(
                "::error file={}::Parse error: {}\n",
                result.file_path,
                escape_github(err)
            ));
        }

        for err in &result.stack_errors {
            output.push_str(&format!(
                "::error file={},title=nested stack {}::{}\n",
                result.file_path,
                err.resource(),
                escape_github(&err.to_string())
            ));
        }

        for failure in &result.failures {
            let level = match failure.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
                Severity::Info | Severity::Style => "notice",
            };

            output.push_str(&format!(
                "::{} file={},line={},col={},title={}::{}\n",
                level,
                result.file_path,
                failure.line,
                failure.column,
                failure.code,
                escape_github(&failure.message)
            ));
        }
    }

    output
}

/// Escape special characters for GitHub Actions.
fn escape_github(s: &str) -> String {
    s.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::test_support::{make_result, make_result_with_stack_error};

    #[test]
    fn test_github_format() {
        let output = format(&[make_result()]);
        assert!(output.contains("::error file=templates/main.yaml,line=5,col=9,title=E9904::"));
        assert!(output.contains("::warning file=templates/main.yaml,line=7,col=7,title=W9901::"));
    }

    #[test]
    fn test_github_stack_error() {
        let output = format(&[make_result_with_stack_error()]);
        assert!(output.starts_with("::error file=templates/main.yaml,title=nested stack App::"));
    }

    #[test]
    fn test_escape_github() {
        assert_eq!(escape_github("hello\nworld"), "hello%0Aworld");
        assert_eq!(escape_github("100%"), "100%25");
    }
}

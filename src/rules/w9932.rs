//! W9932: lambda-runtime-eol
//!
//! Lambda functions should not use a runtime that reaches end of life within
//! the next year. Inside the last 90 days the finding becomes an error.

use chrono::Duration;

use crate::rules::runtimes;
use crate::rules::{LintContext, Rule, SimpleRule, make_failure};
use crate::types::{CheckFailure, DocPath, RuleCategory, Severity};

const CODE: &str = "W9932";
const NAME: &str = "lambda-runtime-eol";
const DESCRIPTION: &str =
    "Check if an end of life Lambda Runtime is specified and give a warning if used.";
const URL: &str = "https://github.com/aws-ia/cfn-ia-rules/blob/main/cfn_ia_rules/rules/security/lambda_runtime_eol.py";

const FUNCTION_TYPES: [&str; 2] = ["AWS::Lambda::Function", "AWS::Serverless::Function"];

const ERROR_WINDOW_DAYS: i64 = 90;
const WARNING_WINDOW_DAYS: i64 = 365;

pub fn rule() -> impl Rule {
    SimpleRule::new(
        CODE,
        NAME,
        Severity::Warning,
        RuleCategory::Security,
        DESCRIPTION,
        URL,
        check,
    )
}

fn check(ctx: &LintContext) -> Vec<CheckFailure> {
    let mut failures = Vec::new();

    for (name, resource) in ctx.template.resources_of_type(&FUNCTION_TYPES) {
        let Some(runtime_value) = resource
            .get("Properties")
            .and_then(|p| p.get("Runtime"))
            .and_then(|r| r.as_str())
        else {
            continue;
        };
        let Some(runtime) = runtimes::lookup(runtime_value) else {
            continue;
        };
        let Some(eol) = runtime.eol() else {
            continue;
        };

        if eol < ctx.today {
            continue;
        }
        let severity = if ctx.today > eol - Duration::days(ERROR_WINDOW_DAYS) {
            Severity::Error
        } else if ctx.today > eol - Duration::days(WARNING_WINDOW_DAYS) {
            Severity::Warning
        } else {
            continue;
        };

        let message = format!(
            "Runtime ({}) will be EOL on {}. Please consider updating to {}",
            runtime_value,
            eol.format("%Y-%m-%d"),
            runtime.successor
        );
        let path = DocPath::from_segments(["Resources", name, "Properties", "Runtime"]);
        failures.push(
            make_failure(CODE, NAME, severity, RuleCategory::Security, message, path)
                .with_data("runtime", runtime_value)
                .with_data("eol", eol.format("%Y-%m-%d").to_string())
                .with_data("successor", runtime.successor),
        );
    }

    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{date, run_check};
    use chrono::NaiveDate;

    fn function(kind: &str, runtime: &str) -> String {
        format!(
            r#"
Resources:
  Handler:
    Type: {kind}
    Properties:
      Runtime: {runtime}
      Handler: index.handler
"#
        )
    }

    fn check_at(yaml: &str, today: NaiveDate) -> Vec<CheckFailure> {
        run_check(check, yaml, today)
    }

    // python3.8 reaches end of life on 2024-10-14.

    #[test]
    fn test_warning_within_a_year() {
        let failures = check_at(&function("AWS::Lambda::Function", "python3.8"), date(2024, 3, 1));
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].severity, Severity::Warning);
        assert_eq!(
            failures[0].message,
            "Runtime (python3.8) will be EOL on 2024-10-14. Please consider updating to python3.12"
        );
        assert_eq!(failures[0].path.to_string(), "Resources/Handler/Properties/Runtime");
    }

    #[test]
    fn test_error_within_ninety_days() {
        let failures = check_at(&function("AWS::Lambda::Function", "python3.8"), date(2024, 9, 1));
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].severity, Severity::Error);
        assert_eq!(failures[0].code.as_str(), CODE);
    }

    #[test]
    fn test_on_eol_day_is_error() {
        let failures = check_at(&function("AWS::Lambda::Function", "python3.8"), date(2024, 10, 14));
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].severity, Severity::Error);
    }

    #[test]
    fn test_nothing_after_eol() {
        assert!(check_at(&function("AWS::Lambda::Function", "python3.8"), date(2024, 10, 15)).is_empty());
    }

    #[test]
    fn test_nothing_more_than_a_year_out() {
        assert!(check_at(&function("AWS::Lambda::Function", "python3.8"), date(2023, 10, 1)).is_empty());
    }

    #[test]
    fn test_serverless_function() {
        let failures = check_at(&function("AWS::Serverless::Function", "nodejs16.x"), date(2024, 1, 1));
        assert_eq!(failures.len(), 1);
        assert!(failures[0].message.contains("nodejs20.x"));
    }

    #[test]
    fn test_ignores_current_and_unknown_runtimes() {
        assert!(check_at(&function("AWS::Lambda::Function", "python3.12"), date(2024, 1, 1)).is_empty());
        assert!(check_at(&function("AWS::Lambda::Function", "custom"), date(2024, 1, 1)).is_empty());
    }

    #[test]
    fn test_ignores_non_literal_runtime_and_other_types() {
        let yaml = r#"
Resources:
  Handler:
    Type: AWS::Lambda::Function
    Properties:
      Runtime: !Ref Runtime
  Layer:
    Type: AWS::Lambda::LayerVersion
    Properties:
      Runtime: python3.8
"#;
        assert!(check_at(yaml, date(2024, 9, 1)).is_empty());
    }
}

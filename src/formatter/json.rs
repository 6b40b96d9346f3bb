//! JSON output formatter.

use serde_json::json;

use crate::lint::LintResult;
use crate::types::Severity;

/// Format lint results as JSON.
pub fn format(results: &[LintResult]) -> String {
    let output: Vec<serde_json::Value> = results
        .iter()
        .map(|result| {
            let messages: Vec<serde_json::Value> = result
                .failures
                .iter()
                .map(|f| {
                    json!({
                        "ruleId": f.code.as_str(),
                        "ruleName": f.rule_name,
                        "severity": match f.severity {
                            Severity::Error => 2,
                            Severity::Warning => 1,
                            Severity::Info | Severity::Style => 0,
                        },
                        "severityName": f.severity.as_str(),
                        "category": f.category.as_str(),
                        "message": f.message,
                        "path": f.path,
                        "line": f.line,
                        "column": f.column,
                        "data": f.data
                    })
                })
                .collect();

            let stack_errors: Vec<serde_json::Value> = result
                .stack_errors
                .iter()
                .map(|e| {
                    json!({
                        "resource": e.resource(),
                        "kind": e.kind(),
                        "message": e.to_string()
                    })
                })
                .collect();

            json!({
                "filePath": result.file_path,
                "messages": messages,
                "errorCount": result.error_count,
                "warningCount": result.warning_count,
                "parseErrors": result.parse_errors,
                "stackErrors": stack_errors
            })
        })
        .collect();

    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::test_support::{make_result, make_result_with_stack_error};

    #[test]
    fn test_json_format() {
        let output = format(&[make_result()]);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        let arr = parsed.as_array().unwrap();
        assert_eq!(arr.len(), 1);

        let file_result = &arr[0];
        assert_eq!(file_result["filePath"], "templates/main.yaml");
        assert_eq!(file_result["errorCount"], 1);
        assert_eq!(file_result["warningCount"], 1);

        let messages = file_result["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["ruleId"], "E9904");
        assert_eq!(messages[0]["severity"], 2);
        assert_eq!(messages[0]["line"], 5);
        assert_eq!(
            messages[0]["path"],
            serde_json::json!(["Resources", "App", "Properties", "Parameters", "Foo"])
        );
        assert_eq!(messages[0]["data"]["parameter"], "Foo");
    }

    #[test]
    fn test_json_stack_errors() {
        let output = format(&[make_result_with_stack_error()]);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        let errors = parsed[0]["stackErrors"].as_array().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0]["resource"], "App");
        assert_eq!(errors[0]["kind"], "not-found");
    }

    #[test]
    fn test_json_format_empty() {
        let output = format(&[LintResult::new("main.yaml")]);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert!(parsed[0]["messages"].as_array().unwrap().is_empty());
    }
}

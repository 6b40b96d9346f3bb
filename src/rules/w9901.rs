//! W9901: nested-stack-default-parameter
//!
//! A nested stack should pass every child parameter that has a default, so
//! the value in use is visible in the parent template.

use crate::rules::{LintContext, Rule, SimpleRule, make_failure};
use crate::stack::compare::missing_overrides;
use crate::types::{CheckFailure, DocPath, RuleCategory, Severity};

const CODE: &str = "W9901";
const NAME: &str = "nested-stack-default-parameter";
const DESCRIPTION: &str = "Nested stack parameters with a default should be passed explicitly.";
const URL: &str = "https://github.com/aws-ia/cfn-ia-rules/blob/main/cfn_ia_rules/rules/stack/default_parameter.py";

pub fn rule() -> impl Rule {
    SimpleRule::new(
        CODE,
        NAME,
        Severity::Warning,
        RuleCategory::BestPractice,
        DESCRIPTION,
        URL,
        check,
    )
}

fn check(ctx: &LintContext) -> Vec<CheckFailure> {
    let mut failures = Vec::new();

    for stack in ctx.nested_stacks {
        let path = DocPath::from_segments(["Resources", stack.resource.as_str(), "Properties", "Parameters"]);
        for name in missing_overrides(&stack.child, &stack.passed) {
            let message = format!(
                "Nested stack {} does not pass parameter {}, which has a default value in the child template. \
                 Pass the default value explicitly.",
                stack.resource, name
            );
            failures.push(
                make_failure(
                    CODE,
                    NAME,
                    Severity::Warning,
                    RuleCategory::BestPractice,
                    message,
                    path.clone(),
                )
                .with_data("resource", stack.resource.as_str())
                .with_data("parameter", name),
            );
        }
    }

    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::run_nested_check;

    const CHILD: &str = r#"
Parameters:
  VpcCidr:
    Type: String
    Default: 10.0.0.0/16
  Env:
    Type: String
    Default: dev
  KeyName:
    Type: String
Resources: {}
"#;

    fn check_yaml(parent: &str) -> Vec<CheckFailure> {
        run_nested_check(check, parent, &[("Network", CHILD)])
    }

    #[test]
    fn test_no_violation_all_defaults_passed() {
        let parent = r#"
Resources:
  Network:
    Type: AWS::CloudFormation::Stack
    Properties:
      TemplateURL: templates/network.yaml
      Parameters:
        VpcCidr: 10.1.0.0/16
        Env: prod
"#;
        assert!(check_yaml(parent).is_empty());
    }

    #[test]
    fn test_violation_per_missing_parameter() {
        let parent = r#"
Resources:
  Network:
    Type: AWS::CloudFormation::Stack
    Properties:
      TemplateURL: templates/network.yaml
      Parameters:
        KeyName: my-key
"#;
        let failures = check_yaml(parent);
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].data["parameter"], "VpcCidr");
        assert_eq!(failures[1].data["parameter"], "Env");
        assert!(failures[0].message.contains("Network"));
        assert!(failures[0].message.contains("VpcCidr"));
        assert_eq!(
            failures[0].path.to_string(),
            "Resources/Network/Properties/Parameters"
        );
        assert_eq!(failures[0].severity, Severity::Warning);
    }

    #[test]
    fn test_violation_without_parameters_block() {
        let parent = r#"
Resources:
  Network:
    Type: AWS::CloudFormation::Stack
    Properties:
      TemplateURL: templates/network.yaml
"#;
        assert_eq!(check_yaml(parent).len(), 2);
    }

    #[test]
    fn test_no_nested_stacks() {
        let parent = "Resources:\n  Bucket:\n    Type: AWS::S3::Bucket\n";
        assert!(run_nested_check(check, parent, &[]).is_empty());
    }
}

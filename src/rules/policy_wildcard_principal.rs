//! EPolicyWildcardPrincipal: policy-wildcard-principal
//!
//! Policy statements must not grant access to the `*` principal.

use serde_json::Value as JsonValue;

use crate::rules::{LintContext, Rule, SimpleRule, make_failure};
use crate::types::{CheckFailure, DocPath, RuleCategory, Severity};

const CODE: &str = "EPolicyWildcardPrincipal";
const NAME: &str = "policy-wildcard-principal";
const DESCRIPTION: &str = "Wildcards should not be used for Principals in IAM policies.";
const URL: &str = "https://github.com/aws-ia/cfn-ia-rules/blob/main/cfn_ia_rules/rules/security/principal_wildcard.py";

const MESSAGE: &str = "Policy should not allow * Principal";

/// cfn_nag rules covering the same problem; suppressing them exempts a resource.
const CFN_NAG_RULES: [&str; 4] = ["F16", "F18", "F20", "F21"];

pub fn rule() -> impl Rule {
    SimpleRule::new(
        CODE,
        NAME,
        Severity::Error,
        RuleCategory::Security,
        DESCRIPTION,
        URL,
        check,
    )
}

fn is_wildcard(value: &JsonValue) -> bool {
    match value {
        JsonValue::String(s) => s == "*",
        JsonValue::Array(items) => matches!(items.as_slice(), [JsonValue::String(s)] if s == "*"),
        _ => false,
    }
}

fn is_wildcard_principal(principal: &JsonValue) -> bool {
    is_wildcard(principal) || principal.get("AWS").is_some_and(is_wildcard)
}

/// Whether the resource's metadata suppresses one of the equivalent cfn_nag rules.
fn suppressed_by_cfn_nag(ctx: &LintContext, resource: &str) -> bool {
    ctx.template
        .resources()
        .and_then(|r| r.get(resource))
        .and_then(|r| r.pointer("/Metadata/cfn_nag/rules_to_suppress"))
        .and_then(|s| s.as_array())
        .is_some_and(|rules| {
            rules
                .iter()
                .filter_map(|r| r.get("id").and_then(|id| id.as_str()))
                .any(|id| CFN_NAG_RULES.contains(&id))
        })
}

fn check(ctx: &LintContext) -> Vec<CheckFailure> {
    let mut failures = Vec::new();

    for (path, principal) in ctx.template.search_deep_keys("Principal") {
        if !is_wildcard_principal(principal) {
            continue;
        }

        let statement_path: DocPath = path.parent();
        let denies = ctx
            .template
            .get_path(&statement_path)
            .and_then(|s| s.get("Effect"))
            .and_then(|e| e.as_str())
            == Some("Deny");
        if denies {
            continue;
        }

        if ctx.metadata_suppressions
            && let Some(resource) = path.resource_name()
            && suppressed_by_cfn_nag(ctx, resource)
        {
            continue;
        }

        failures.push(make_failure(
            CODE,
            NAME,
            Severity::Error,
            RuleCategory::Security,
            MESSAGE,
            path,
        ));
    }

    failures
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{date, run_check};

    fn check_yaml(yaml: &str) -> Vec<CheckFailure> {
        run_check(check, yaml, date(2024, 1, 1))
    }

    fn bucket_policy(principal: &str, effect: &str) -> String {
        format!(
            r#"
Resources:
  Policy:
    Type: AWS::S3::BucketPolicy
    Properties:
      Bucket: !Ref Bucket
      PolicyDocument:
        Statement:
          - Effect: {effect}
            Principal: {principal}
            Action: s3:GetObject
            Resource: "*"
"#
        )
    }

    #[test]
    fn test_violation_star_principal() {
        let failures = check_yaml(&bucket_policy("\"*\"", "Allow"));
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].message, MESSAGE);
        assert_eq!(
            failures[0].path.to_string(),
            "Resources/Policy/Properties/PolicyDocument/Statement/0/Principal"
        );
    }

    #[test]
    fn test_violation_star_list_and_aws_key() {
        assert_eq!(check_yaml(&bucket_policy("[\"*\"]", "Allow")).len(), 1);
        assert_eq!(check_yaml(&bucket_policy("{AWS: \"*\"}", "Allow")).len(), 1);
        assert_eq!(check_yaml(&bucket_policy("{AWS: [\"*\"]}", "Allow")).len(), 1);
    }

    #[test]
    fn test_no_violation_deny() {
        assert!(check_yaml(&bucket_policy("\"*\"", "Deny")).is_empty());
    }

    #[test]
    fn test_no_violation_specific_principal() {
        assert!(check_yaml(&bucket_policy("{Service: lambda.amazonaws.com}", "Allow")).is_empty());
        assert!(check_yaml(&bucket_policy("{AWS: [\"*\", \"arn:aws:iam::123456789012:root\"]}", "Allow")).is_empty());
    }

    #[test]
    fn test_missing_effect_is_treated_as_allow() {
        let yaml = r#"
Resources:
  Topic:
    Type: AWS::SNS::TopicPolicy
    Properties:
      PolicyDocument:
        Statement:
          - Principal: "*"
            Action: sns:Publish
"#;
        assert_eq!(check_yaml(yaml).len(), 1);
    }

    #[test]
    fn test_cfn_nag_suppression() {
        let yaml = r#"
Resources:
  Policy:
    Type: AWS::S3::BucketPolicy
    Metadata:
      cfn_nag:
        rules_to_suppress:
          - id: F16
            reason: public website
    Properties:
      PolicyDocument:
        Statement:
          - Effect: Allow
            Principal: "*"
  Other:
    Type: AWS::S3::BucketPolicy
    Metadata:
      cfn_nag:
        rules_to_suppress:
          - id: W35
    Properties:
      PolicyDocument:
        Statement:
          - Effect: Allow
            Principal: "*"
"#;
        let failures = check_yaml(yaml);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].path.resource_name(), Some("Other"));
    }

    #[test]
    fn test_cfn_nag_suppression_off_when_metadata_ignored() {
        let yaml = r#"
Resources:
  Policy:
    Type: AWS::S3::BucketPolicy
    Metadata:
      cfn_nag:
        rules_to_suppress:
          - id: F16
    Properties:
      PolicyDocument:
        Statement:
          - Effect: Allow
            Principal: "*"
"#;
        let template = crate::template::parse_template(yaml).unwrap();
        let ctx = LintContext::new(&template, &[], date(2024, 1, 1)).with_metadata_suppressions(false);
        assert_eq!(check(&ctx).len(), 1);
    }
}

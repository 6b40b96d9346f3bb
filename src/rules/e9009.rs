//! E9009: params-in-metadata-exist
//!
//! Parameters referenced in the `AWS::CloudFormation::Interface` metadata
//! must be declared in the template.

use crate::rules::{LintContext, Rule, SimpleRule, make_failure};
use crate::types::{CheckFailure, DocPath, RuleCategory, Severity};

const CODE: &str = "E9009";
const NAME: &str = "params-in-metadata-exist";
const DESCRIPTION: &str = "Parameters referenced in metadata must exist in the template.";
const URL: &str = "https://github.com/aws-ia/cfn-ia-rules/blob/main/cfn_ia_rules/rules/mandatory/params_in_metadata_exist.py";

const INTERFACE: &str = "AWS::CloudFormation::Interface";

pub fn rule() -> impl Rule {
    SimpleRule::new(
        CODE,
        NAME,
        Severity::Error,
        RuleCategory::BestPractice,
        DESCRIPTION,
        URL,
        check,
    )
}

fn failure(path: DocPath, parameter: &str) -> CheckFailure {
    make_failure(
        CODE,
        NAME,
        Severity::Error,
        RuleCategory::BestPractice,
        DESCRIPTION,
        path,
    )
    .with_data("parameter", parameter)
}

fn check(ctx: &LintContext) -> Vec<CheckFailure> {
    let Some(interface) = ctx
        .template
        .metadata()
        .and_then(|m| m.get(INTERFACE))
        .and_then(|i| i.as_object())
    else {
        return Vec::new();
    };

    let declared = ctx.template.parameters();
    let exists = |name: &str| declared.is_some_and(|p| p.contains_key(name));
    let base = DocPath::from_segments(["Metadata", INTERFACE]);
    let mut failures = Vec::new();

    if let Some(groups) = interface.get("ParameterGroups").and_then(|g| g.as_array()) {
        for (group_index, group) in groups.iter().enumerate() {
            let Some(names) = group.get("Parameters").and_then(|p| p.as_array()) else {
                continue;
            };
            for (index, name) in names.iter().enumerate() {
                let Some(name) = name.as_str() else {
                    continue;
                };
                if !exists(name) {
                    let path = base
                        .child("ParameterGroups")
                        .child(group_index)
                        .child("Parameters")
                        .child(index);
                    failures.push(failure(path, name));
                }
            }
        }
    }

    if let Some(labels) = interface.get("ParameterLabels").and_then(|l| l.as_object()) {
        for name in labels.keys() {
            if !exists(name) {
                failures.push(failure(base.child("ParameterLabels").child(name), name));
            }
        }
    }

    failures
}

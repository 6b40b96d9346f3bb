//! E9902: nested-stack-parameter-not-forwarded
//!
//! A parameter the parent and child both declare is expected to be wired
//! through. Flags names that are not passed, or passed a value that never
//! mentions the parameter.

use crate::rules::{LintContext, Rule, SimpleRule, make_failure};
use crate::stack::compare::shadowed_unforwarded;
use crate::types::{CheckFailure, DocPath, RuleCategory, Severity};

const CODE: &str = "E9902";
const NAME: &str = "nested-stack-parameter-not-forwarded";
const DESCRIPTION: &str =
    "Parameters shared by a parent and its nested stack should be passed through to the child.";
const URL: &str = "https://github.com/aws-ia/cfn-ia-rules/blob/main/cfn_ia_rules/rules/stack/matching_parameter_not_passed.py";

pub fn rule() -> impl Rule {
    SimpleRule::new(
        CODE,
        NAME,
        Severity::Error,
        RuleCategory::Correctness,
        DESCRIPTION,
        URL,
        check,
    )
}

fn check(ctx: &LintContext) -> Vec<CheckFailure> {
    let mut failures = Vec::new();

    for stack in ctx.nested_stacks {
        let parameters =
            DocPath::from_segments(["Resources", stack.resource.as_str(), "Properties", "Parameters"]);

        for unforwarded in shadowed_unforwarded(ctx.template, &stack.child, &stack.passed) {
            let path = match unforwarded.passed_value {
                Some(_) => parameters.child(unforwarded.name.as_str()),
                None => parameters.clone(),
            };
            let message = format!(
                "Parameter defined in Parent with same name as child, however this value is never passed to child. {} {} ({})",
                stack.resource,
                unforwarded.name,
                unforwarded.display_value()
            );
            failures.push(
                make_failure(
                    CODE,
                    NAME,
                    Severity::Error,
                    RuleCategory::Correctness,
                    message,
                    path,
                )
                .with_data("resource", stack.resource.as_str())
                .with_data("parameter", unforwarded.name.as_str())
                .with_data("value", unforwarded.display_value()),
            );
        }
    }

    failures
}

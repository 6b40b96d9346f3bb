//! E9904: nested-stack-parameter-not-in-child
//!
//! Every parameter passed to a nested stack must be declared by the child
//! template, or the stack fails to deploy.

use crate::rules::{LintContext, Rule, SimpleRule, make_failure};
use crate::stack::compare::undeclared_in_child;
use crate::types::{CheckFailure, DocPath, RuleCategory, Severity};

const CODE: &str = "E9904";
const NAME: &str = "nested-stack-parameter-not-in-child";
const DESCRIPTION: &str = "Parameters passed to a nested stack must exist in the child template.";
const URL: &str = "https://github.com/aws-ia/cfn-ia-rules/blob/main/cfn_ia_rules/rules/stack/parameter_not_in_child.py";

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
        for name in undeclared_in_child(&stack.child, &stack.passed) {
            let path = DocPath::from_segments([
                "Resources",
                stack.resource.as_str(),
                "Properties",
                "Parameters",
                name,
            ]);
            let message = format!(
                "Parameter {} not present in child template {}",
                name, stack.resource
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
                .with_data("parameter", name),
            );
        }
    }

    failures
}

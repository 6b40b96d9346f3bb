//! Rule framework and catalog.
//!
//! Every rule is a `SimpleRule` built from a code, a name, metadata and a
//! stateless check function over a `LintContext`.

use chrono::NaiveDate;
use serde::Serialize;

use crate::stack::NestedStack;
use crate::template::Template;
use crate::types::{CheckFailure, DocPath, RuleCategory, RuleCode, RuleMeta, Severity};

pub mod e9009;
pub mod e9902;
pub mod e9904;
pub mod policy_wildcard_principal;
pub mod runtimes;
pub mod w9901;
pub mod w9932;

/// Context for linting one template.
#[derive(Debug, Clone)]
pub struct LintContext<'a> {
    /// The parsed template.
    pub template: &'a Template,
    /// Nested stacks whose child template was resolved.
    pub nested_stacks: &'a [NestedStack],
    /// The date date-dependent rules compare against.
    pub today: NaiveDate,
    /// Whether suppressions in resource metadata (e.g. `cfn_nag`) apply.
    pub metadata_suppressions: bool,
}

impl<'a> LintContext<'a> {
    pub fn new(template: &'a Template, nested_stacks: &'a [NestedStack], today: NaiveDate) -> Self {
        Self {
            template,
            nested_stacks,
            today,
            metadata_suppressions: true,
        }
    }

    pub fn with_metadata_suppressions(mut self, enabled: bool) -> Self {
        self.metadata_suppressions = enabled;
        self
    }
}

/// A rule that can check CloudFormation templates.
pub trait Rule: Send + Sync {
    /// Get the rule code (e.g., "W9901").
    fn code(&self) -> &RuleCode;

    /// Get the human-readable rule name (e.g., "nested-stack-default-parameter").
    fn name(&self) -> &str;

    /// Get the default severity.
    fn severity(&self) -> Severity;

    /// Get the rule category.
    fn category(&self) -> RuleCategory;

    /// Get the rule metadata (description, URL).
    fn meta(&self) -> &RuleMeta;

    /// Check the template and return any failures.
    fn check(&self, context: &LintContext) -> Vec<CheckFailure>;
}

/// A stateless rule backed by a check function.
pub struct SimpleRule<F>
where
    F: Fn(&LintContext) -> Vec<CheckFailure> + Send + Sync,
{
    code: RuleCode,
    name: String,
    severity: Severity,
    category: RuleCategory,
    meta: RuleMeta,
    check_fn: F,
}

impl<F> SimpleRule<F>
where
    F: Fn(&LintContext) -> Vec<CheckFailure> + Send + Sync,
{
    pub fn new(
        code: impl Into<RuleCode>,
        name: impl Into<String>,
        severity: Severity,
        category: RuleCategory,
        description: impl Into<String>,
        url: impl Into<String>,
        check_fn: F,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            severity,
            category,
            meta: RuleMeta::new(description, url),
            check_fn,
        }
    }
}

impl<F> Rule for SimpleRule<F>
where
    F: Fn(&LintContext) -> Vec<CheckFailure> + Send + Sync,
{
    fn code(&self) -> &RuleCode {
        &self.code
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn severity(&self) -> Severity {
        self.severity
    }

    fn category(&self) -> RuleCategory {
        self.category
    }

    fn meta(&self) -> &RuleMeta {
        &self.meta
    }

    fn check(&self, context: &LintContext) -> Vec<CheckFailure> {
        (self.check_fn)(context)
    }
}

/// Helper to create a check failure for a rule.
pub fn make_failure(
    code: &str,
    name: &str,
    severity: Severity,
    category: RuleCategory,
    message: impl Into<String>,
    path: DocPath,
) -> CheckFailure {
    CheckFailure::new(code, name, severity, category, message, path)
}

/// Get all rules.
pub fn all_rules() -> Vec<Box<dyn Rule>> {
    let mut rules: Vec<Box<dyn Rule>> = vec![
        Box::new(e9009::rule()),
        Box::new(policy_wildcard_principal::rule()),
        Box::new(w9932::rule()),
    ];
    rules.extend(nested_stack_rules());
    rules
}

/// Rules that compare a parent template with the child templates of its
/// nested stacks. Children are only resolved for these.
pub fn nested_stack_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(w9901::rule()),
        Box::new(e9902::rule()),
        Box::new(e9904::rule()),
    ]
}

/// Get rule definitions for documentation.
pub fn rule_definitions() -> Vec<RuleDefinition> {
    all_rules()
        .iter()
        .map(|r| RuleDefinition {
            code: r.code().to_string(),
            name: r.name().to_string(),
            severity: r.severity().as_str(),
            category: r.category().as_str(),
            description: r.meta().description.clone(),
            url: r.meta().url.clone(),
        })
        .collect()
}

/// Rule definition for documentation/introspection.
#[derive(Debug, Clone, Serialize)]
pub struct RuleDefinition {
    pub code: String,
    pub name: String,
    pub severity: &'static str,
    pub category: &'static str,
    pub description: String,
    pub url: String,
}

//! Rule suppressions declared in template metadata.
//!
//! - `Metadata.cfn-lint.config.ignore_checks` disables codes for the whole template
//! - `Resources/<r>/Metadata.cfn-lint.config.ignore_checks` disables codes for
//!   findings inside that resource

use std::collections::{HashMap, HashSet};

use serde_json::Value as JsonValue;

use crate::template::Template;
use crate::types::{DocPath, RuleCode};

/// Codes suppressed for the whole template and per resource.
#[derive(Debug, Clone, Default)]
pub struct SuppressionState {
    /// Codes disabled for the entire template.
    pub global_disabled: HashSet<String>,
    /// Codes disabled for findings within a resource.
    pub resource_disabled: HashMap<String, HashSet<String>>,
}

impl SuppressionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a finding with `code` at `path` is suppressed.
    pub fn is_ignored(&self, code: &RuleCode, path: &DocPath) -> bool {
        if self.global_disabled.contains(code.as_str()) {
            return true;
        }

        path.resource_name()
            .and_then(|resource| self.resource_disabled.get(resource))
            .is_some_and(|codes| codes.contains(code.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.global_disabled.is_empty() && self.resource_disabled.is_empty()
    }
}

/// Codes listed under `cfn-lint.config.ignore_checks` of a metadata block.
fn ignore_checks(metadata: Option<&JsonValue>) -> HashSet<String> {
    metadata
        .and_then(|m| m.pointer("/cfn-lint/config/ignore_checks"))
        .and_then(|checks| checks.as_array())
        .map(|checks| {
            checks
                .iter()
                .filter_map(|c| c.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

/// Extract suppressions from template and resource metadata.
pub fn extract_suppressions(template: &Template) -> SuppressionState {
    let mut state = SuppressionState::new();

    state.global_disabled = ignore_checks(template.root().get("Metadata"));

    if let Some(resources) = template.resources() {
        for (name, resource) in resources {
            let codes = ignore_checks(resource.get("Metadata"));
            if !codes.is_empty() {
                state.resource_disabled.insert(name.clone(), codes);
            }
        }
    }

    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::parse_template;

    #[test]
    fn test_template_level_suppression() {
        let template = parse_template(
            r#"
Metadata:
  cfn-lint:
    config:
      ignore_checks:
        - W9901
        - E9902
Resources: {}
"#,
        )
        .unwrap();
        let state = extract_suppressions(&template);
        let anywhere = DocPath::from_segments(["Resources", "A"]);
        assert!(state.is_ignored(&RuleCode::new("W9901"), &anywhere));
        assert!(state.is_ignored(&RuleCode::new("E9902"), &DocPath::new()));
        assert!(!state.is_ignored(&RuleCode::new("E9904"), &anywhere));
    }

    #[test]
    fn test_resource_level_suppression() {
        let template = parse_template(
            r#"
Resources:
  Quiet:
    Type: AWS::CloudFormation::Stack
    Metadata:
      cfn-lint:
        config:
          ignore_checks: [W9901]
    Properties:
      TemplateURL: child.yaml
  Loud:
    Type: AWS::CloudFormation::Stack
    Properties:
      TemplateURL: child.yaml
"#,
        )
        .unwrap();
        let state = extract_suppressions(&template);
        let code = RuleCode::new("W9901");
        assert!(state.is_ignored(
            &code,
            &DocPath::from_segments(["Resources", "Quiet", "Properties", "Parameters"])
        ));
        assert!(!state.is_ignored(
            &code,
            &DocPath::from_segments(["Resources", "Loud", "Properties", "Parameters"])
        ));
        assert!(!state.is_ignored(&code, &DocPath::from_segments(["Parameters", "Quiet"])));
    }

    #[test]
    fn test_no_metadata() {
        let template = parse_template("Resources:\n  A:\n    Type: AWS::S3::Bucket\n").unwrap();
        assert!(extract_suppressions(&template).is_empty());
    }
}

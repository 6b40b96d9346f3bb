//! Parameter-set comparison between a parent stack resource and its child template.

use serde_json::{Map, Value as JsonValue};

use crate::template::Template;

/// A parent parameter that the child also declares but never receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unforwarded {
    /// Parameter name shared by parent and child.
    pub name: String,
    /// Textual form of the value passed to the child, `None` when unset.
    pub passed_value: Option<String>,
}

impl Unforwarded {
    /// The passed value as shown in messages.
    pub fn display_value(&self) -> &str {
        self.passed_value.as_deref().unwrap_or("unset")
    }
}

/// Textual representation used for substring matching of passed values.
///
/// Plain strings keep their text; everything else is rendered as compact JSON,
/// so `{"Ref": "VpcId"}` still contains `VpcId`.
pub fn textual_value(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Child parameters with a `Default` that the stack resource does not pass.
pub fn missing_overrides<'a>(child: &'a Template, passed: &Map<String, JsonValue>) -> Vec<&'a str> {
    let Some(declared) = child.parameters() else {
        return Vec::new();
    };

    declared
        .iter()
        .filter(|(name, declaration)| {
            let has_default = declaration
                .as_object()
                .is_some_and(|d| d.contains_key("Default"));
            has_default && !passed.contains_key(name.as_str())
        })
        .map(|(name, _)| name.as_str())
        .collect()
}

/// Parameters declared by both parent and child whose value is not wired
/// through: either not passed at all, or passed a value that never mentions
/// the parameter's name.
pub fn shadowed_unforwarded(
    parent: &Template,
    child: &Template,
    passed: &Map<String, JsonValue>,
) -> Vec<Unforwarded> {
    let (Some(parent_params), Some(child_params)) = (parent.parameters(), child.parameters()) else {
        return Vec::new();
    };

    child_params
        .keys()
        .filter(|name| parent_params.contains_key(name.as_str()))
        .filter_map(|name| match passed.get(name) {
            None => Some(Unforwarded {
                name: name.clone(),
                passed_value: None,
            }),
            Some(value) => {
                let text = textual_value(value);
                (!text.contains(name.as_str())).then(|| Unforwarded {
                    name: name.clone(),
                    passed_value: Some(text),
                })
            }
        })
        .collect()
}

/// Parameters passed to the stack resource that the child does not declare.
pub fn undeclared_in_child<'a>(child: &Template, passed: &'a Map<String, JsonValue>) -> Vec<&'a str> {
    passed
        .keys()
        .filter(|name| {
            child
                .parameters()
                .is_none_or(|declared| !declared.contains_key(name.as_str()))
        })
        .map(String::as_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::parse_template;
    use serde_json::json;

    const PARENT: &str = r#"
Parameters:
  VpcId:
    Type: String
  Env:
    Type: String
  KeyName:
    Type: String
Resources: {}
"#;

    const CHILD: &str = r#"
Parameters:
  VpcId:
    Type: String
  Env:
    Type: String
    Default: dev
  InstanceType:
    Type: String
    Default: t3.micro
  KeyName:
    Type: String
Resources: {}
"#;

    fn passed(value: serde_json::Value) -> Map<String, JsonValue> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_missing_overrides_once_per_defaulted_parameter() {
        let child = parse_template(CHILD).unwrap();
        let missing = missing_overrides(&child, &passed(json!({"VpcId": {"Ref": "VpcId"}})));
        assert_eq!(missing, vec!["Env", "InstanceType"]);
    }

    #[test]
    fn test_missing_overrides_all_passed() {
        let child = parse_template(CHILD).unwrap();
        let all = passed(json!({"Env": "prod", "InstanceType": "m5.large"}));
        assert!(missing_overrides(&child, &all).is_empty());
    }

    #[test]
    fn test_missing_overrides_without_parameters_section() {
        let child = parse_template("Resources: {}\n").unwrap();
        assert!(missing_overrides(&child, &Map::new()).is_empty());
    }

    #[test]
    fn test_shadowed_value_without_name() {
        let parent = parse_template(PARENT).unwrap();
        let child = parse_template(CHILD).unwrap();
        let block = passed(json!({
            "VpcId": {"Ref": "VpcId"},
            "Env": {"Ref": "Stage"},
            "KeyName": "my-key"
        }));

        let found = shadowed_unforwarded(&parent, &child, &block);
        let names: Vec<&str> = found.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["Env", "KeyName"]);
        assert_eq!(found[0].passed_value.as_deref(), Some(r#"{"Ref":"Stage"}"#));
        assert_eq!(found[1].display_value(), "my-key");
    }

    #[test]
    fn test_shadowed_not_passed_at_all() {
        let parent = parse_template(PARENT).unwrap();
        let child = parse_template(CHILD).unwrap();
        let block = passed(json!({"VpcId": {"Ref": "VpcId"}, "KeyName": {"Ref": "KeyName"}}));

        let found = shadowed_unforwarded(&parent, &child, &block);
        assert_eq!(
            found,
            vec![Unforwarded {
                name: "Env".to_string(),
                passed_value: None
            }]
        );
        assert_eq!(found[0].display_value(), "unset");
    }

    #[test]
    fn test_shadowed_accepts_sub_and_join_values() {
        let parent = parse_template(PARENT).unwrap();
        let child = parse_template(CHILD).unwrap();
        let block = passed(json!({
            "VpcId": {"Fn::Sub": "${VpcId}"},
            "Env": {"Fn::Join": ["-", [{"Ref": "Env"}, "x"]]},
            "KeyName": {"Ref": "KeyName"}
        }));
        assert!(shadowed_unforwarded(&parent, &child, &block).is_empty());
    }

    #[test]
    fn test_undeclared_in_child() {
        let child = parse_template(CHILD).unwrap();
        let block = passed(json!({"VpcId": "vpc-1", "SubnetId": "subnet-1", "Typo": "x"}));
        assert_eq!(undeclared_in_child(&child, &block), vec!["SubnetId", "Typo"]);
    }

    #[test]
    fn test_undeclared_when_child_has_no_parameters() {
        let child = parse_template("Resources: {}\n").unwrap();
        let block = passed(json!({"VpcId": "vpc-1"}));
        assert_eq!(undeclared_in_child(&child, &block), vec!["VpcId"]);
    }

    #[test]
    fn test_textual_value() {
        assert_eq!(textual_value(&json!("plain")), "plain");
        assert_eq!(textual_value(&json!({"Ref": "VpcId"})), r#"{"Ref":"VpcId"}"#);
        assert_eq!(textual_value(&json!(3)), "3");
    }
}

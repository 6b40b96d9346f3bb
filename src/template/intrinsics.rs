//! Normalisation of YAML templates into the long-form JSON document model.
//!
//! CloudFormation YAML allows short-form intrinsic tags (`!Ref`, `!Sub`,
//! `!GetAtt`, ...). Rules only ever see the long form, so both YAML and JSON
//! templates look the same once parsed.

use serde_json::{Map, Value as JsonValue};
use serde_yaml::Value as YamlValue;

use crate::template::ParseError;

/// Convert a YAML value into the JSON document model, expanding short-form tags.
pub fn normalize(value: YamlValue) -> Result<JsonValue, ParseError> {
    match value {
        YamlValue::Null => Ok(JsonValue::Null),
        YamlValue::Bool(b) => Ok(JsonValue::Bool(b)),
        YamlValue::Number(n) => Ok(convert_number(&n)),
        YamlValue::String(s) => Ok(JsonValue::String(s)),
        YamlValue::Sequence(items) => items
            .into_iter()
            .map(normalize)
            .collect::<Result<Vec<_>, _>>()
            .map(JsonValue::Array),
        YamlValue::Mapping(mapping) => {
            let mut object = Map::new();
            for (key, value) in mapping {
                object.insert(mapping_key(&key)?, normalize(value)?);
            }
            Ok(JsonValue::Object(object))
        }
        YamlValue::Tagged(tagged) => {
            let tag = tagged.tag.to_string();
            let name = tag.trim_start_matches('!').to_string();
            let inner = normalize(tagged.value)?;
            Ok(expand_tag(&name, inner))
        }
    }
}

/// Long-form key for a short-form tag name.
pub fn long_form_key(name: &str) -> String {
    match name {
        "Ref" | "Condition" => name.to_string(),
        other => format!("Fn::{}", other),
    }
}

fn expand_tag(name: &str, inner: JsonValue) -> JsonValue {
    let inner = match (name, inner) {
        ("GetAtt", JsonValue::String(s)) => match s.split_once('.') {
            Some((resource, attribute)) => JsonValue::Array(vec![
                JsonValue::String(resource.to_string()),
                JsonValue::String(attribute.to_string()),
            ]),
            None => JsonValue::Array(vec![JsonValue::String(s)]),
        },
        (_, other) => other,
    };

    let mut object = Map::new();
    object.insert(long_form_key(name), inner);
    JsonValue::Object(object)
}

fn convert_number(n: &serde_yaml::Number) -> JsonValue {
    if let Some(i) = n.as_i64() {
        JsonValue::from(i)
    } else if let Some(u) = n.as_u64() {
        JsonValue::from(u)
    } else {
        n.as_f64()
            .and_then(serde_json::Number::from_f64)
            .map(JsonValue::Number)
            // NaN and infinities have no JSON number form
            .unwrap_or_else(|| JsonValue::String(n.to_string()))
    }
}

fn mapping_key(key: &YamlValue) -> Result<String, ParseError> {
    match key {
        YamlValue::String(s) => Ok(s.clone()),
        YamlValue::Number(n) => Ok(n.to_string()),
        YamlValue::Bool(b) => Ok(b.to_string()),
        YamlValue::Null => Ok("null".to_string()),
        other => Err(ParseError::InvalidStructure(format!(
            "unsupported mapping key: {:?}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalize_str(yaml: &str) -> JsonValue {
        let value: YamlValue = serde_yaml::from_str(yaml).unwrap();
        normalize(value).unwrap()
    }

    #[test]
    fn test_ref_and_condition() {
        let value = normalize_str("a: !Ref VpcId\nb: !Condition IsProd\n");
        assert_eq!(value, json!({"a": {"Ref": "VpcId"}, "b": {"Condition": "IsProd"}}));
    }

    #[test]
    fn test_get_att_dotted_string() {
        let value = normalize_str("arn: !GetAtt Role.Arn\n");
        assert_eq!(value, json!({"arn": {"Fn::GetAtt": ["Role", "Arn"]}}));
    }

    #[test]
    fn test_get_att_sequence_form() {
        let value = normalize_str("arn: !GetAtt [Role, Arn]\n");
        assert_eq!(value, json!({"arn": {"Fn::GetAtt": ["Role", "Arn"]}}));
    }

    #[test]
    fn test_nested_tags() {
        let yaml = "url: !Sub\n  - 'https://${Bucket}/${Key}'\n  - Key: !FindInMap [Map, !Ref 'AWS::Region', Path]\n";
        let value = normalize_str(yaml);
        assert_eq!(
            value,
            json!({"url": {"Fn::Sub": [
                "https://${Bucket}/${Key}",
                {"Key": {"Fn::FindInMap": ["Map", {"Ref": "AWS::Region"}, "Path"]}}
            ]}})
        );
    }

    #[test]
    fn test_non_string_keys_are_stringified() {
        let value = normalize_str("1: one\ntrue: yes\n");
        assert_eq!(value, json!({"1": "one", "true": "yes"}));
    }

    #[test]
    fn test_key_order_preserved() {
        let value = normalize_str("z: 1\na: 2\nm: 3\n");
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }
}

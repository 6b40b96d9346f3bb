//! Parsed CloudFormation template and its section accessors.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value as JsonValue};

use crate::types::{DocPath, PathSegment};

/// A parsed CloudFormation template.
#[derive(Debug, Clone)]
pub struct Template {
    /// Root mapping of the document, intrinsics in long form.
    root: Map<String, JsonValue>,
    /// Raw source content for position lookups.
    source: String,
    /// Where the template was read from, if anywhere.
    path: Option<PathBuf>,
}

impl Template {
    pub(crate) fn new(root: Map<String, JsonValue>, source: impl Into<String>) -> Self {
        Self {
            root,
            source: source.into(),
            path: None,
        }
    }

    /// Attach the filesystem path the template was read from.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> &Map<String, JsonValue> {
        &self.root
    }

    fn section(&self, name: &str) -> Option<&Map<String, JsonValue>> {
        self.root.get(name).and_then(|v| v.as_object())
    }

    /// The `Parameters` section.
    pub fn parameters(&self) -> Option<&Map<String, JsonValue>> {
        self.section("Parameters")
    }

    /// Names of all declared parameters, in declaration order.
    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters()
            .map(|p| p.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// The `Mappings` section.
    pub fn mappings(&self) -> Option<&Map<String, JsonValue>> {
        self.section("Mappings")
    }

    /// The template-level `Metadata` section.
    pub fn metadata(&self) -> Option<&Map<String, JsonValue>> {
        self.section("Metadata")
    }

    /// The `Resources` section.
    pub fn resources(&self) -> Option<&Map<String, JsonValue>> {
        self.section("Resources")
    }

    /// Resources whose `Type` is one of `types`, in document order.
    pub fn resources_of_type<'a>(
        &'a self,
        types: &[&str],
    ) -> Vec<(&'a str, &'a Map<String, JsonValue>)> {
        let Some(resources) = self.resources() else {
            return Vec::new();
        };

        resources
            .iter()
            .filter_map(|(name, value)| {
                let resource = value.as_object()?;
                let kind = resource.get("Type")?.as_str()?;
                types
                    .contains(&kind)
                    .then_some((name.as_str(), resource))
            })
            .collect()
    }

    /// Look up the value at `path`.
    pub fn get_path(&self, path: &DocPath) -> Option<&JsonValue> {
        let mut segments = path.segments().iter();
        let first = match segments.next()? {
            PathSegment::Key(key) => self.root.get(key)?,
            PathSegment::Index(_) => return None,
        };

        segments.try_fold(first, |value, segment| match segment {
            PathSegment::Key(key) => value.as_object()?.get(key),
            PathSegment::Index(idx) => value.as_array()?.get(*idx),
        })
    }

    /// Every path in the document whose last segment is the mapping key `key`,
    /// paired with the value stored under it.
    pub fn search_deep_keys(&self, key: &str) -> Vec<(DocPath, &JsonValue)> {
        let mut found = Vec::new();
        for (name, value) in &self.root {
            let path = DocPath::from_segments([name.as_str()]);
            if name == key {
                found.push((path.clone(), value));
            }
            collect_deep_keys(value, key, &path, &mut found);
        }
        found
    }
}

fn collect_deep_keys<'a>(
    value: &'a JsonValue,
    key: &str,
    path: &DocPath,
    found: &mut Vec<(DocPath, &'a JsonValue)>,
) {
    match value {
        JsonValue::Object(map) => {
            for (name, child) in map {
                let child_path = path.child(name);
                if name == key {
                    found.push((child_path.clone(), child));
                }
                collect_deep_keys(child, key, &child_path, found);
            }
        }
        JsonValue::Array(items) => {
            for (idx, child) in items.iter().enumerate() {
                collect_deep_keys(child, key, &path.child(idx), found);
            }
        }
        _ => {}
    }
}

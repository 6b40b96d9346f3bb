//! Nested stack support: locating child templates and comparing parameters.
//!
//! Every `AWS::CloudFormation::Stack` resource is resolved once per lint run.
//! Failures are returned alongside the resolved stacks so the caller reports
//! them instead of silently skipping the resource.

pub mod compare;
pub mod resolver;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, warn};
use serde_json::{Map, Value as JsonValue};

use crate::config::CfnRulesConfig;
use crate::template::{ParseError, Template, parse_template_file};
use resolver::{TemplateReference, resolve_single};

pub const STACK_RESOURCE_TYPE: &str = "AWS::CloudFormation::Stack";

/// Why a nested stack's child template could not be checked.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StackError {
    #[error("{resource}: template has no file path to resolve the child template against")]
    NoBasePath { resource: String },
    #[error("{resource}: nested stack has no TemplateURL property")]
    MissingTemplateUrl { resource: String },
    #[error("{resource}: cannot interpret TemplateURL: {reason}")]
    InvalidTemplateUrl { resource: String, reason: String },
    #[error("{resource}: child template not found for {}", urls.join(", "))]
    TemplateNotFound { resource: String, urls: Vec<String> },
    #[error("{resource}: TemplateURL resolves to more than one template: {}", display_paths(candidates))]
    AmbiguousTemplate {
        resource: String,
        candidates: Vec<PathBuf>,
    },
    #[error("{resource}: failed to read child template {}: {message}", path.display())]
    ChildUnreadable {
        resource: String,
        path: PathBuf,
        message: String,
    },
    #[error("{resource}: failed to parse child template {}: {message}", path.display())]
    ChildParse {
        resource: String,
        path: PathBuf,
        message: String,
    },
}

impl StackError {
    /// Name of the nested stack resource the error belongs to.
    pub fn resource(&self) -> &str {
        match self {
            Self::NoBasePath { resource }
            | Self::MissingTemplateUrl { resource }
            | Self::InvalidTemplateUrl { resource, .. }
            | Self::TemplateNotFound { resource, .. }
            | Self::AmbiguousTemplate { resource, .. }
            | Self::ChildUnreadable { resource, .. }
            | Self::ChildParse { resource, .. } => resource,
        }
    }

    /// Short machine-readable kind, used by formatters.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoBasePath { .. } => "no-base-path",
            Self::MissingTemplateUrl { .. } => "missing-template-url",
            Self::InvalidTemplateUrl { .. } => "invalid-template-url",
            Self::TemplateNotFound { .. } => "not-found",
            Self::AmbiguousTemplate { .. } => "ambiguous",
            Self::ChildUnreadable { .. } => "unreadable",
            Self::ChildParse { .. } => "parse-error",
        }
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A nested stack resource together with its parsed child template.
#[derive(Debug, Clone)]
pub struct NestedStack {
    /// Resource name in the parent template.
    pub resource: String,
    /// The resource's `Parameters` block (empty when absent).
    pub passed: Map<String, JsonValue>,
    /// Where the child template was found.
    pub child_path: PathBuf,
    /// The parsed child template.
    pub child: Arc<Template>,
}

/// Resolve and parse the child template of every nested stack in `template`.
pub fn load_nested_stacks(
    template: &Template,
    config: &CfnRulesConfig,
) -> (Vec<NestedStack>, Vec<StackError>) {
    let mut stacks = Vec::new();
    let mut errors = Vec::new();
    let mut cache: HashMap<PathBuf, Arc<Template>> = HashMap::new();

    for (name, resource) in template.resources_of_type(&[STACK_RESOURCE_TYPE]) {
        match load_one(template, name, resource, config, &mut cache) {
            Ok(stack) => stacks.push(stack),
            Err(err) => {
                warn!("{}", err);
                errors.push(err);
            }
        }
    }

    (stacks, errors)
}

fn load_one(
    template: &Template,
    name: &str,
    resource: &Map<String, JsonValue>,
    config: &CfnRulesConfig,
    cache: &mut HashMap<PathBuf, Arc<Template>>,
) -> Result<NestedStack, StackError> {
    let parent_path = template.path().ok_or_else(|| StackError::NoBasePath {
        resource: name.to_string(),
    })?;

    let properties = resource.get("Properties").and_then(|p| p.as_object());
    let template_url = properties
        .and_then(|p| p.get("TemplateURL"))
        .ok_or_else(|| StackError::MissingTemplateUrl {
            resource: name.to_string(),
        })?;

    let passed = match properties.and_then(|p| p.get("Parameters")) {
        Some(JsonValue::Object(params)) => params.clone(),
        Some(JsonValue::Null) | None => Map::new(),
        Some(other) => {
            warn!(
                "{}: Parameters is not a mapping ({}), treating it as empty",
                name, other
            );
            Map::new()
        }
    };

    let reference = TemplateReference {
        resource: name,
        parent_path,
        template_url,
        mappings: template.mappings(),
    };
    let child_path = resolve_single(&reference, &config.template_path_mappings)?;
    debug!("{}: child template {}", name, child_path.display());

    let child = match cache.get(&child_path) {
        Some(child) => Arc::clone(child),
        None => {
            let parsed = parse_template_file(&child_path).map_err(|err| match err {
                ParseError::Io { message, .. } => StackError::ChildUnreadable {
                    resource: name.to_string(),
                    path: child_path.clone(),
                    message,
                },
                other => StackError::ChildParse {
                    resource: name.to_string(),
                    path: child_path.clone(),
                    message: other.to_string(),
                },
            })?;
            let parsed = Arc::new(parsed);
            cache.insert(child_path.clone(), Arc::clone(&parsed));
            parsed
        }
    };

    Ok(NestedStack {
        resource: name.to_string(),
        passed,
        child_path,
        child,
    })
}

//! Resolution of a nested stack's `TemplateURL` to a local child template.
//!
//! Templates reference children by S3 URL, usually built with `Fn::Sub`,
//! `Fn::Join` or a `Fn::FindInMap` lookup. The bucket and key prefix parts
//! are only known at deploy time, so resolution keeps the literal tail of the
//! URL and searches for it next to the parent template.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use log::debug;
use regex::Regex;
use serde_json::{Map, Value as JsonValue};

use crate::stack::StackError;

static SUB_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}!][^}]*)\}").expect("valid placeholder regex"));

/// A nested stack resource's reference to its child template.
#[derive(Debug, Clone, Copy)]
pub struct TemplateReference<'a> {
    /// Name of the `AWS::CloudFormation::Stack` resource.
    pub resource: &'a str,
    /// Path of the parent template on disk.
    pub parent_path: &'a Path,
    /// The `TemplateURL` property value.
    pub template_url: &'a JsonValue,
    /// The parent template's `Mappings` section.
    pub mappings: Option<&'a Map<String, JsonValue>>,
}

/// Expand a `TemplateURL` expression into the URL strings it may evaluate to.
pub fn url_candidates(
    template_url: &JsonValue,
    mappings: Option<&Map<String, JsonValue>>,
) -> Result<Vec<String>, String> {
    match template_url {
        JsonValue::String(url) => Ok(vec![url.clone()]),
        JsonValue::Object(function) if function.len() == 1 => {
            let Some((name, args)) = function.iter().next() else {
                return Err("empty intrinsic function".to_string());
            };
            match name.as_str() {
                "Fn::Sub" => sub_url(args).map(|url| vec![url]),
                "Fn::Join" => join_url(args).map(|url| vec![url]),
                "Fn::FindInMap" => find_in_map_urls(args, mappings),
                "Fn::If" => if_urls(args, mappings),
                other => Err(format!("unsupported intrinsic function {}", other)),
            }
        }
        other => Err(format!(
            "expected a string or intrinsic function, found {}",
            other
        )),
    }
}

fn sub_url(args: &JsonValue) -> Result<String, String> {
    let (text, vars) = match args {
        JsonValue::String(text) => (text.as_str(), None),
        JsonValue::Array(items) => {
            let text = items
                .first()
                .and_then(|v| v.as_str())
                .ok_or("Fn::Sub needs a string as its first argument")?;
            (text, items.get(1).and_then(|v| v.as_object()))
        }
        _ => return Err("Fn::Sub needs a string or a [string, variables] list".to_string()),
    };

    let substituted = SUB_PLACEHOLDER.replace_all(text, |caps: &regex::Captures| {
        let name = &caps[1];
        match vars.and_then(|v| v.get(name)).and_then(|v| v.as_str()) {
            Some(literal) => literal.to_string(),
            None => caps[0].to_string(),
        }
    });

    Ok(literal_tail(&substituted).to_string())
}

/// Text after the last unresolved `${...}` placeholder.
fn literal_tail(text: &str) -> &str {
    let Some(pos) = text.rfind('}') else {
        return text;
    };
    let tail = &text[pos + 1..];

    // Placeholder inside the host name, e.g. "https://${Bucket}.s3.amazonaws.com/key"
    if let Some(scheme_end) = text.find("://")
        && scheme_end + 3 <= pos
        && !text[scheme_end + 3..pos].contains('/')
    {
        return tail.split_once('/').map(|(_, key)| key).unwrap_or("");
    }
    tail
}

fn join_url(args: &JsonValue) -> Result<String, String> {
    let (delimiter, parts) = match args.as_array().map(Vec::as_slice) {
        Some([JsonValue::String(delimiter), JsonValue::Array(parts)]) => (delimiter, parts),
        _ => return Err("Fn::Join needs a [delimiter, [parts]] list".to_string()),
    };

    let mut tail: Vec<&str> = Vec::new();
    for part in parts {
        match part.as_str() {
            Some(literal) => tail.push(literal),
            None => tail.clear(),
        }
    }
    Ok(tail.join(delimiter))
}

fn find_in_map_urls(
    args: &JsonValue,
    mappings: Option<&Map<String, JsonValue>>,
) -> Result<Vec<String>, String> {
    let items = args
        .as_array()
        .filter(|items| items.len() >= 3)
        .ok_or("Fn::FindInMap needs [map, top-level key, second-level key]")?;

    let map_name = items[0]
        .as_str()
        .ok_or("Fn::FindInMap map name must be a literal string")?;
    let mapping = mappings
        .and_then(|m| m.get(map_name))
        .and_then(|m| m.as_object())
        .ok_or_else(|| format!("mapping {} not found", map_name))?;

    let mut urls = Vec::new();
    for top in select_entries(mapping, &items[1]) {
        let Some(second_level) = top.as_object() else {
            continue;
        };
        for value in select_entries(second_level, &items[2]) {
            urls.extend(url_candidates(value, mappings)?);
        }
    }

    if urls.is_empty() {
        return Err(format!("no entry of mapping {} matches the lookup keys", map_name));
    }
    Ok(urls)
}

/// Literal keys select one entry; anything else (`Ref`, `Fn::Select`, ...) fans out.
fn select_entries<'a>(map: &'a Map<String, JsonValue>, key: &JsonValue) -> Vec<&'a JsonValue> {
    match key.as_str() {
        Some(literal) => map.get(literal).into_iter().collect(),
        None => map.values().collect(),
    }
}

fn if_urls(
    args: &JsonValue,
    mappings: Option<&Map<String, JsonValue>>,
) -> Result<Vec<String>, String> {
    let branches = match args.as_array().map(Vec::as_slice) {
        Some([_, when_true, when_false]) => [when_true, when_false],
        _ => return Err("Fn::If needs [condition, value if true, value if false]".to_string()),
    };

    let mut urls = Vec::new();
    for branch in branches {
        if is_no_value(branch) {
            continue;
        }
        urls.extend(url_candidates(branch, mappings)?);
    }
    Ok(urls)
}

fn is_no_value(value: &JsonValue) -> bool {
    value.get("Ref").and_then(|v| v.as_str()) == Some("AWS::NoValue")
}

/// Strip scheme, host and query string, leaving the object key segments.
pub fn url_key_segments(url: &str) -> Vec<&str> {
    let without_host = match url.split_once("://") {
        Some((_, rest)) => rest.split_once('/').map(|(_, key)| key).unwrap_or(""),
        None => url,
    };
    let key = without_host.split(['?', '#']).next().unwrap_or("");

    key.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect()
}

/// Apply the first matching URL-prefix mapping.
fn apply_path_mappings(url: &str, base_dir: &Path, path_mappings: &[(String, PathBuf)]) -> Option<PathBuf> {
    path_mappings.iter().find_map(|(prefix, dir)| {
        let rest = url.strip_prefix(prefix.as_str())?;
        let candidate = base_dir.join(dir).join(rest.trim_start_matches('/'));
        debug!("Template path mapping {} -> {}", prefix, candidate.display());
        candidate.is_file().then_some(candidate)
    })
}

/// Marker of a repository root; the search never climbs above it.
const REPOSITORY_MARKER: &str = ".git";

/// The parent's directory and its ancestors, up to the enclosing repository root.
fn search_dirs(base_dir: &Path) -> Vec<&Path> {
    let mut dirs = Vec::new();
    for dir in base_dir.ancestors() {
        dirs.push(dir);
        if dir.join(REPOSITORY_MARKER).exists() {
            break;
        }
    }
    dirs
}

/// Search for the URL key, longest suffix first. Each suffix is tried in
/// every search directory before a shorter one. A bare file name only
/// matches next to the parent template.
fn search_for_key(segments: &[&str], base_dir: &Path) -> Option<PathBuf> {
    let dirs = search_dirs(base_dir);

    for start in 0..segments.len() {
        let key = segments[start..].join("/");
        let dirs = if start + 1 == segments.len() {
            &dirs[..1]
        } else {
            &dirs[..]
        };
        for dir in dirs {
            let candidate = dir.join(&key);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

fn locate(url: &str, base_dir: &Path, path_mappings: &[(String, PathBuf)]) -> Option<PathBuf> {
    if let Some(mapped) = apply_path_mappings(url, base_dir, path_mappings) {
        return Some(mapped);
    }
    let segments = url_key_segments(url);
    if segments.is_empty() {
        return None;
    }
    search_for_key(&segments, base_dir)
}

/// Resolve every child template file the reference may point at.
pub fn resolve_template_url(
    reference: &TemplateReference<'_>,
    path_mappings: &[(String, PathBuf)],
) -> Result<Vec<PathBuf>, StackError> {
    let urls = url_candidates(reference.template_url, reference.mappings).map_err(|reason| {
        StackError::InvalidTemplateUrl {
            resource: reference.resource.to_string(),
            reason,
        }
    })?;

    let parent = std::path::absolute(reference.parent_path)
        .unwrap_or_else(|_| reference.parent_path.to_path_buf());
    let base_dir = parent.parent().unwrap_or_else(|| Path::new("."));

    let mut seen = HashSet::new();
    let mut found = Vec::new();
    for url in &urls {
        let Some(path) = locate(url, base_dir, path_mappings) else {
            debug!("No local template for {} (resource {})", url, reference.resource);
            continue;
        };
        let canonical = std::fs::canonicalize(&path).unwrap_or(path);
        if seen.insert(canonical.clone()) {
            found.push(canonical);
        }
    }

    if found.is_empty() {
        return Err(StackError::TemplateNotFound {
            resource: reference.resource.to_string(),
            urls,
        });
    }
    Ok(found)
}

/// Resolve the reference to exactly one child template.
pub fn resolve_single(
    reference: &TemplateReference<'_>,
    path_mappings: &[(String, PathBuf)],
) -> Result<PathBuf, StackError> {
    let mut found = resolve_template_url(reference, path_mappings)?;
    if found.len() > 1 {
        return Err(StackError::AmbiguousTemplate {
            resource: reference.resource.to_string(),
            candidates: found,
        });
    }
    found.pop().ok_or_else(|| StackError::TemplateNotFound {
        resource: reference.resource.to_string(),
        urls: Vec::new(),
    })
}

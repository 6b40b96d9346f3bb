//! Template parsing with best-effort position tracking.
//!
//! YAML and JSON templates are parsed into one document model. Short-form
//! intrinsic tags are expanded (see [`intrinsics`]), so rules only deal with
//! `{"Ref": ...}` / `{"Fn::Sub": ...}` shapes.

pub mod document;
pub mod intrinsics;

pub use document::Template;

use std::path::Path;

use serde_json::Value as JsonValue;

use crate::types::{DocPath, PathSegment};

/// Error type for template parsing.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ParseError {
    #[error("YAML parse error: {0}")]
    YamlError(String),
    #[error("JSON parse error: {0}")]
    JsonError(String),
    #[error("Empty document")]
    EmptyDocument,
    #[error("Invalid structure: {0}")]
    InvalidStructure(String),
    #[error("Failed to read {path}: {message}")]
    Io { path: String, message: String },
}

/// Parse a template from a string. JSON is detected by a leading `{`.
pub fn parse_template(content: &str) -> Result<Template, ParseError> {
    if content.lines().all(is_skippable) {
        return Err(ParseError::EmptyDocument);
    }
    let trimmed = content.trim_start();

    let root = if trimmed.starts_with('{') {
        serde_json::from_str::<JsonValue>(content).map_err(|e| ParseError::JsonError(e.to_string()))?
    } else {
        let value: serde_yaml::Value =
            serde_yaml::from_str(content).map_err(|e| ParseError::YamlError(e.to_string()))?;
        intrinsics::normalize(value)?
    };

    match root {
        JsonValue::Object(map) => Ok(Template::new(map, content)),
        JsonValue::Null => Err(ParseError::EmptyDocument),
        other => Err(ParseError::InvalidStructure(format!(
            "template root must be a mapping, found {}",
            json_kind(&other)
        ))),
    }
}

/// Read and parse a template file.
pub fn parse_template_file(path: &Path) -> Result<Template, ParseError> {
    let content = std::fs::read_to_string(path).map_err(|e| ParseError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    parse_template(&content).map(|t| t.with_path(path))
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "a sequence",
        JsonValue::Object(_) => "a mapping",
    }
}

/// Find the 1-indexed line and column of `path` in the source text.
///
/// Walks block-style YAML and pretty-printed JSON by indentation. When a
/// segment cannot be found (flow style, single-line JSON) the position of the
/// deepest matched ancestor is returned.
pub fn find_position_for_path(source: &str, path: &DocPath) -> (u32, u32) {
    let lines: Vec<&str> = source.lines().collect();
    let mut best = (1u32, 1u32);
    let mut start = 0usize;
    let mut parent_indent: Option<usize> = None;
    // Set after an index step: the first key of the item sits on the dash line.
    let mut inline_item = false;

    for segment in path.segments() {
        let found = match segment {
            PathSegment::Key(key) => find_key(&lines, start, parent_indent, key, inline_item),
            PathSegment::Index(idx) => find_item(&lines, start, parent_indent, *idx),
        };

        let Some((line_idx, indent)) = found else {
            break;
        };

        best = ((line_idx + 1) as u32, (indent + 1) as u32);
        match segment {
            PathSegment::Key(_) => {
                start = line_idx + 1;
                parent_indent = Some(indent);
                inline_item = false;
            }
            PathSegment::Index(_) => {
                start = line_idx;
                parent_indent = Some(indent);
                inline_item = true;
            }
        }
    }

    best
}

/// Find the line number for a path, ignoring the column.
pub fn find_line_for_path(source: &str, path: &DocPath) -> u32 {
    find_position_for_path(source, path).0
}

fn is_skippable(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#') || trimmed == "---"
}

fn raw_indent(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// Whether `line` closes the block opened at `parent_indent`.
fn leaves_block(line: &str, parent_indent: Option<usize>) -> bool {
    match parent_indent {
        Some(parent) => raw_indent(line) <= parent,
        None => false,
    }
}

fn find_key(
    lines: &[&str],
    start: usize,
    parent_indent: Option<usize>,
    key: &str,
    inline_item: bool,
) -> Option<(usize, usize)> {
    for (idx, line) in lines.iter().enumerate().skip(start) {
        if is_skippable(line) {
            continue;
        }
        let first_item_line = inline_item && idx == start;
        if !first_item_line && leaves_block(line, parent_indent) {
            return None;
        }
        if let Some((indent, line_key)) = split_key(line)
            && line_key == key
        {
            return Some((idx, indent));
        }
    }
    None
}

fn find_item(
    lines: &[&str],
    start: usize,
    parent_indent: Option<usize>,
    target: usize,
) -> Option<(usize, usize)> {
    let mut seq_indent: Option<usize> = None;
    let mut count = 0usize;

    for (idx, line) in lines.iter().enumerate().skip(start) {
        if is_skippable(line) {
            continue;
        }
        let indent = raw_indent(line);
        let trimmed = line.trim_start();
        let is_dash = trimmed == "-" || trimmed.starts_with("- ");
        // Pretty-printed JSON elements open on their own line.
        let is_json_item = trimmed.starts_with('{')
            || trimmed.starts_with('[')
            || (trimmed.starts_with('"') && split_key(line).is_none());
        let is_item = is_dash || is_json_item;

        if let Some(parent) = parent_indent {
            // Sequences may sit at the same indent as their parent key.
            if indent < parent || (indent == parent && !is_dash) {
                return None;
            }
        }

        match seq_indent {
            None if is_item => seq_indent = Some(indent),
            None => return None,
            Some(seq) if indent < seq => return None,
            Some(_) => {}
        }

        if is_item && Some(indent) == seq_indent {
            if count == target {
                return Some((idx, indent));
            }
            count += 1;
        }
    }
    None
}

/// Split a block-mapping line into its key column and key text.
fn split_key(line: &str) -> Option<(usize, &str)> {
    let mut indent = raw_indent(line);
    let mut rest = line.trim_start();
    while let Some(stripped) = rest.strip_prefix("- ") {
        let trimmed = stripped.trim_start();
        indent += rest.len() - trimmed.len();
        rest = trimmed;
    }

    for quote in ['"', '\''] {
        if let Some(quoted) = rest.strip_prefix(quote) {
            let end = quoted.find(quote)?;
            let after = quoted[end + 1..].trim_start();
            return after.starts_with(':').then(|| (indent, &quoted[..end]));
        }
    }

    let colon = rest
        .match_indices(':')
        .map(|(pos, _)| pos)
        .find(|&pos| {
            rest[pos + 1..]
                .chars()
                .next()
                .is_none_or(char::is_whitespace)
        })?;
    Some((indent, rest[..colon].trim_end()))
}

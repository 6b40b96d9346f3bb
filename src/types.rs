//! Core types shared by every rule.
//!
//! - `Severity` - Rule violation severity levels
//! - `RuleCode` - Rule identifiers (e.g., "W9901")
//! - `DocPath` - Location of a finding inside the template document
//! - `CheckFailure` - A single rule violation
//! - `RuleCategory` - Category of the rule (security, correctness, etc.)

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Severity levels for rule violations.
///
/// Ordered from most severe to least severe:
/// `Error > Warning > Info > Style`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Severity {
    /// Issues that break or endanger a deployment
    Error,
    /// Issues that should usually be fixed
    #[default]
    Warning,
    /// Informational suggestions for improvement
    Info,
    /// Style recommendations
    Style,
}

impl Severity {
    /// Parse a severity from a string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "error" | "critical" | "major" => Some(Self::Error),
            "warning" | "warn" | "minor" => Some(Self::Warning),
            "info" | "informational" => Some(Self::Info),
            "style" => Some(Self::Style),
            _ => None,
        }
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Style => "style",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Error => 3,
            Self::Warning => 2,
            Self::Info => 1,
            Self::Style => 0,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Ord for Severity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for Severity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Category of a lint rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleCategory {
    /// Security-related issues
    Security,
    /// Templates that will misbehave when deployed
    Correctness,
    /// Best practice recommendations
    BestPractice,
}

impl RuleCategory {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Security => "security",
            Self::Correctness => "correctness",
            Self::BestPractice => "best-practice",
        }
    }
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A rule code identifier (e.g., "E9904").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleCode(pub String);

impl RuleCode {
    /// Create a new rule code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Get the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Default severity implied by the code prefix (`E` or `W`).
    pub fn implied_severity(&self) -> Option<Severity> {
        match self.0.chars().next() {
            Some('E') => Some(Severity::Error),
            Some('W') => Some(Severity::Warning),
            Some('I') => Some(Severity::Info),
            _ => None,
        }
    }
}

impl fmt::Display for RuleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RuleCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RuleCode {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One step into the template document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// A mapping key.
    Key(String),
    /// A sequence index.
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => write!(f, "{}", key),
            Self::Index(idx) => write!(f, "{}", idx),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(s: &str) -> Self {
        Self::Key(s.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(s: String) -> Self {
        Self::Key(s)
    }
}

impl From<&String> for PathSegment {
    fn from(s: &String) -> Self {
        Self::Key(s.clone())
    }
}

impl From<usize> for PathSegment {
    fn from(idx: usize) -> Self {
        Self::Index(idx)
    }
}

/// A sequence of document keys locating an element in a template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct DocPath(pub Vec<PathSegment>);

impl DocPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a path from anything convertible into segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<PathSegment>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Return a new path with `segment` appended.
    pub fn child(&self, segment: impl Into<PathSegment>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    /// Return the path without its last segment.
    pub fn parent(&self) -> Self {
        let mut segments = self.0.clone();
        segments.pop();
        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The resource name when this path points inside `Resources`.
    pub fn resource_name(&self) -> Option<&str> {
        match self.0.as_slice() {
            [PathSegment::Key(section), PathSegment::Key(name), ..] if section == "Resources" => {
                Some(name.as_str())
            }
            _ => None,
        }
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.0.iter().map(|s| s.to_string()).collect();
        write!(f, "{}", rendered.join("/"))
    }
}

/// A check failure (rule violation) found during linting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckFailure {
    /// The rule code that was violated.
    pub code: RuleCode,
    /// The human-readable rule name (e.g., "nested-stack-default-parameter").
    pub rule_name: String,
    /// The severity of the violation.
    pub severity: Severity,
    /// The category of the rule.
    pub category: RuleCategory,
    /// A human-readable message describing the violation.
    pub message: String,
    /// Where in the document the violation was found.
    pub path: DocPath,
    /// The line number where the violation occurred (1-indexed).
    pub line: u32,
    /// The column number where the violation starts (1-indexed).
    pub column: u32,
    /// Additional context data for the violation.
    pub data: BTreeMap<String, String>,
}

impl CheckFailure {
    /// Create a new check failure. Line and column are filled in by the linter.
    pub fn new(
        code: impl Into<RuleCode>,
        rule_name: impl Into<String>,
        severity: Severity,
        category: RuleCategory,
        message: impl Into<String>,
        path: DocPath,
    ) -> Self {
        Self {
            code: code.into(),
            rule_name: rule_name.into(),
            severity,
            category,
            message: message.into(),
            path,
            line: 1,
            column: 1,
            data: BTreeMap::new(),
        }
    }

    /// Set the source position.
    pub fn with_position(mut self, line: u32, column: u32) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    /// Add context data.
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

impl Ord for CheckFailure {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then(self.column.cmp(&other.column))
            .then_with(|| self.code.cmp(&other.code))
    }
}

impl PartialOrd for CheckFailure {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Rule metadata for documentation and display.
#[derive(Debug, Clone)]
pub struct RuleMeta {
    /// Short description of the rule.
    pub description: String,
    /// URL to detailed documentation.
    pub url: String,
}

impl RuleMeta {
    pub fn new(description: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            url: url.into(),
        }
    }
}

/// Configuration level for a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigLevel {
    /// Rule is disabled
    Off = 0,
    /// Rule produces warnings
    Warn = 1,
    /// Rule produces errors
    #[default]
    Error = 2,
}

impl ConfigLevel {
    /// Convert from numeric value.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Off),
            1 => Some(Self::Warn),
            2 => Some(Self::Error),
            _ => None,
        }
    }

    /// Parse `off`, `warn`, `warning` or `error`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "off" | "false" => Some(Self::Off),
            "warn" | "warning" => Some(Self::Warn),
            "error" | "on" | "true" => Some(Self::Error),
            _ => None,
        }
    }

    /// Convert to severity (for non-off levels).
    pub fn to_severity(&self) -> Option<Severity> {
        match self {
            Self::Off => None,
            Self::Warn => Some(Severity::Warning),
            Self::Error => Some(Severity::Error),
        }
    }
}

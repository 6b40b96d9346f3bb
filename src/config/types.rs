//! Configuration types for cfn-rules.
//!
//! - Rule-level configuration (off/warn/error, keyed by code or rule name)
//! - Reporting and failure thresholds
//! - Exclude patterns
//! - Template path mappings for nested stack resolution

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::types::{ConfigLevel, RuleCode, Severity};

/// Error type for configuration loading.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    IoError(String),
    #[error("Failed to parse config: {0}")]
    ParseError(String),
}

/// Configuration for a single rule.
#[derive(Debug, Clone, Default)]
pub struct RuleConfig {
    /// The configuration level (off, warn, error).
    pub level: ConfigLevel,
}

impl RuleConfig {
    /// Create a new rule config with the given level.
    pub fn with_level(level: ConfigLevel) -> Self {
        Self { level }
    }

    pub fn off() -> Self {
        Self::with_level(ConfigLevel::Off)
    }

    pub fn warn() -> Self {
        Self::with_level(ConfigLevel::Warn)
    }

    pub fn error() -> Self {
        Self::with_level(ConfigLevel::Error)
    }
}

/// Main configuration for cfn-rules.
#[derive(Debug, Clone)]
pub struct CfnRulesConfig {
    /// Per-rule configuration, keyed by rule code or rule name.
    pub rules: HashMap<String, RuleConfig>,
    /// File patterns to exclude from linting.
    pub exclude: Vec<String>,
    /// Minimum severity to report.
    pub threshold: Severity,
    /// Minimum severity that makes a run fail.
    pub failure_threshold: Severity,
    /// Never fail because of findings.
    pub no_fail: bool,
    /// Ignore `cfn-lint` / `cfn_nag` suppressions in template metadata.
    pub ignore_metadata: bool,
    /// URL prefix to local directory rewrites, tried in order.
    pub template_path_mappings: Vec<(String, PathBuf)>,
    /// Fixed "today" for date-dependent rules.
    pub reference_date: Option<NaiveDate>,
}

impl Default for CfnRulesConfig {
    fn default() -> Self {
        Self {
            rules: HashMap::new(),
            exclude: Vec::new(),
            threshold: Severity::Style,
            failure_threshold: Severity::Warning,
            no_fail: false,
            ignore_metadata: false,
            template_path_mappings: Vec::new(),
            reference_date: None,
        }
    }
}

impl CfnRulesConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an exclude pattern.
    pub fn with_exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude.push(pattern.into());
        self
    }

    /// Set the reporting threshold.
    pub fn with_threshold(mut self, threshold: Severity) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the failure threshold.
    pub fn with_failure_threshold(mut self, threshold: Severity) -> Self {
        self.failure_threshold = threshold;
        self
    }

    /// Configure a specific rule.
    pub fn with_rule(mut self, rule: impl Into<String>, config: RuleConfig) -> Self {
        self.rules.insert(rule.into(), config);
        self
    }

    /// Disable a rule.
    pub fn ignore(self, rule: impl Into<String>) -> Self {
        self.with_rule(rule, RuleConfig::off())
    }

    /// Set a rule to warn level.
    pub fn warn(self, rule: impl Into<String>) -> Self {
        self.with_rule(rule, RuleConfig::warn())
    }

    /// Set a rule to error level.
    pub fn error(self, rule: impl Into<String>) -> Self {
        self.with_rule(rule, RuleConfig::error())
    }

    /// Add a template path mapping.
    pub fn with_mapping(mut self, prefix: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        self.template_path_mappings.push((prefix.into(), dir.into()));
        self
    }

    /// Pin "today" for date-dependent rules.
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn with_ignore_metadata(mut self, ignore: bool) -> Self {
        self.ignore_metadata = ignore;
        self
    }

    pub fn with_no_fail(mut self, no_fail: bool) -> Self {
        self.no_fail = no_fail;
        self
    }

    /// Configuration for a rule, looked up by code first, then by name.
    pub fn get_rule_config(&self, code: &RuleCode, name: &str) -> Option<&RuleConfig> {
        self.rules
            .get(code.as_str())
            .or_else(|| self.rules.get(name))
    }

    /// Check if a rule is disabled.
    pub fn is_rule_ignored(&self, code: &RuleCode, name: &str) -> bool {
        self.get_rule_config(code, name)
            .map(|c| c.level == ConfigLevel::Off)
            .unwrap_or(false)
    }

    /// Get the effective severity for a rule, applying any overrides.
    pub fn effective_severity(&self, code: &RuleCode, name: &str, default: Severity) -> Severity {
        self.get_rule_config(code, name)
            .and_then(|c| c.level.to_severity())
            .unwrap_or(default)
    }

    /// Check if an issue should be reported based on threshold.
    pub fn should_report(&self, severity: Severity) -> bool {
        severity >= self.threshold
    }

    /// Check if a file path should be excluded.
    pub fn is_excluded(&self, path: &str) -> bool {
        self.exclude.iter().any(|pattern| {
            if let Ok(glob) = glob::Pattern::new(pattern)
                && glob.matches(path)
            {
                return true;
            }
            !pattern.contains('*') && path.contains(pattern.as_str())
        })
    }
}

/// Builder for creating `CfnRulesConfig` from JSON-shaped values.
///
/// Config files are YAML, but they deserialize into the same value tree,
/// so one reader serves both.
pub struct CfnRulesConfigBuilder {
    config: CfnRulesConfig,
}

impl CfnRulesConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: CfnRulesConfig::default(),
        }
    }

    /// Apply settings from a JSON value.
    pub fn from_json(mut self, json: &serde_json::Value) -> Result<Self, ConfigError> {
        if let Some(rules) = json.get("rules").and_then(|v| v.as_object()) {
            for (name, value) in rules {
                let rule_config = parse_rule_config(name, value)?;
                self.config.rules.insert(name.clone(), rule_config);
            }
        }

        if let Some(ignored) = get_any(json, &["ignored", "ignore_checks"]).and_then(|v| v.as_array()) {
            for code in ignored.iter().filter_map(|v| v.as_str()) {
                self.config.rules.insert(code.to_string(), RuleConfig::off());
            }
        }

        if let Some(threshold) = get_any(json, &["threshold"]).and_then(|v| v.as_str()) {
            self.config.threshold = parse_severity(threshold)?;
        }

        if let Some(threshold) =
            get_any(json, &["failure-threshold", "failure_threshold"]).and_then(|v| v.as_str())
        {
            self.config.failure_threshold = parse_severity(threshold)?;
        }

        if let Some(exclude) = json.get("exclude").and_then(|v| v.as_array()) {
            self.config.exclude = exclude
                .iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect();
        }

        if let Some(mappings) = get_any(json, &["template-path-mappings", "template_path_mappings"])
            .and_then(|v| v.as_object())
        {
            for (prefix, dir) in mappings {
                let dir = dir.as_str().ok_or_else(|| {
                    ConfigError::ParseError(format!("mapping for {} must be a string", prefix))
                })?;
                self.config
                    .template_path_mappings
                    .push((prefix.clone(), PathBuf::from(dir)));
            }
        }

        if let Some(date) = get_any(json, &["reference-date", "reference_date"]).and_then(|v| v.as_str()) {
            let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map_err(|e| ConfigError::ParseError(format!("reference-date {}: {}", date, e)))?;
            self.config.reference_date = Some(parsed);
        }

        if let Some(ignore) = get_any(json, &["ignore-metadata", "ignore_metadata"]).and_then(|v| v.as_bool()) {
            self.config.ignore_metadata = ignore;
        }

        if let Some(no_fail) = get_any(json, &["no-fail", "no_fail"]).and_then(|v| v.as_bool()) {
            self.config.no_fail = no_fail;
        }

        Ok(self)
    }

    /// Apply settings from a YAML string.
    pub fn from_yaml_str(self, yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(self);
        }
        let value: serde_json::Value =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        if value.is_null() {
            return Ok(self);
        }
        self.from_json(&value)
    }

    /// Build the final configuration.
    pub fn build(self) -> CfnRulesConfig {
        self.config
    }
}

impl Default for CfnRulesConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn get_any<'a>(json: &'a serde_json::Value, keys: &[&str]) -> Option<&'a serde_json::Value> {
    keys.iter().find_map(|key| json.get(*key))
}

fn parse_severity(s: &str) -> Result<Severity, ConfigError> {
    Severity::parse(s).ok_or_else(|| ConfigError::ParseError(format!("unknown severity: {}", s)))
}

fn parse_level(rule: &str, value: &serde_json::Value) -> Result<ConfigLevel, ConfigError> {
    let level = match value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .and_then(|n| u8::try_from(n).ok())
            .and_then(ConfigLevel::from_u8),
        serde_json::Value::String(s) => ConfigLevel::parse(s),
        serde_json::Value::Bool(true) => Some(ConfigLevel::Error),
        serde_json::Value::Bool(false) => Some(ConfigLevel::Off),
        _ => None,
    };
    level.ok_or_else(|| ConfigError::ParseError(format!("invalid level for rule {}: {}", rule, value)))
}

fn parse_rule_config(rule: &str, value: &serde_json::Value) -> Result<RuleConfig, ConfigError> {
    parse_level(rule, value).map(RuleConfig::with_level)
}

//! Main linting orchestration.
//!
//! Ties together parsing, nested stack resolution, rules and metadata
//! suppressions to provide the linting API.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use log::{debug, info, warn};

use crate::config::CfnRulesConfig;
use crate::rules::{LintContext, Rule, all_rules, nested_stack_rules};
use crate::stack::{StackError, load_nested_stacks};
use crate::suppress::{SuppressionState, extract_suppressions};
use crate::template::{Template, find_position_for_path, parse_template};
use crate::types::{CheckFailure, DocPath, Severity};

/// Display name used for content that did not come from a file.
pub const INLINE_PATH: &str = "<inline>";

/// Extensions picked up when linting a directory.
const TEMPLATE_EXTENSIONS: [&str; 4] = ["yaml", "yml", "json", "template"];

/// Result of linting a CloudFormation template.
#[derive(Debug, Clone)]
pub struct LintResult {
    /// The file path that was linted.
    pub file_path: String,
    /// Rule violations found.
    pub failures: Vec<CheckFailure>,
    /// Read or parse errors (if any).
    pub parse_errors: Vec<String>,
    /// Nested stacks whose child template could not be checked.
    pub stack_errors: Vec<StackError>,
    /// Number of errors.
    pub error_count: usize,
    /// Number of warnings.
    pub warning_count: usize,
}

impl LintResult {
    /// Create a new empty result.
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            failures: Vec::new(),
            parse_errors: Vec::new(),
            stack_errors: Vec::new(),
            error_count: 0,
            warning_count: 0,
        }
    }

    /// Update counts based on failures.
    fn update_counts(&mut self) {
        self.error_count = self
            .failures
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .count();
        self.warning_count = self
            .failures
            .iter()
            .filter(|f| f.severity == Severity::Warning)
            .count();
    }

    /// Check if there are any errors (failure with Error severity).
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Whether the file could not be fully checked.
    pub fn has_problems(&self) -> bool {
        !self.parse_errors.is_empty() || !self.stack_errors.is_empty()
    }

    /// Get the maximum severity in the results.
    pub fn max_severity(&self) -> Option<Severity> {
        self.failures.iter().map(|f| f.severity).max()
    }

    /// Check if the findings reach the failure threshold.
    pub fn should_fail(&self, threshold: Severity) -> bool {
        self.max_severity().is_some_and(|max| max >= threshold)
    }

    /// Sort failures by position.
    pub fn sort(&mut self) {
        self.failures.sort();
    }
}

/// Lint template content that has no location on disk.
///
/// Nested stacks cannot be resolved without a directory to search, so each
/// one is reported as a [`StackError::NoBasePath`].
pub fn lint(content: &str, config: &CfnRulesConfig) -> LintResult {
    lint_template(content, INLINE_PATH, None, config)
}

/// Lint template content that was read from `path`.
pub fn lint_with_path(content: &str, path: &str, config: &CfnRulesConfig) -> LintResult {
    lint_template(content, path, Some(Path::new(path)), config)
}

/// Lint a template file.
pub fn lint_file(path: &Path, config: &CfnRulesConfig) -> LintResult {
    let path_str = path.display().to_string();

    if config.is_excluded(&path_str) {
        debug!("Skipping excluded file {}", path_str);
        return LintResult::new(path_str);
    }

    match std::fs::read_to_string(path) {
        Ok(content) => lint_with_path(&content, &path_str, config),
        Err(err) => {
            let mut result = LintResult::new(path_str);
            result
                .parse_errors
                .push(format!("Failed to read file: {}", err));
            result
        }
    }
}

/// Lint files and directories. Directories are searched recursively for
/// template files.
pub fn lint_paths(paths: &[PathBuf], config: &CfnRulesConfig) -> Vec<LintResult> {
    collect_template_files(paths, config)
        .iter()
        .map(|path| lint_file(path, config))
        .collect()
}

/// Expand directories into the template files they contain, in a stable order.
pub fn collect_template_files(paths: &[PathBuf], config: &CfnRulesConfig) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }

        let mut found: Vec<PathBuf> = walkdir::WalkDir::new(path)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|ext| TEMPLATE_EXTENSIONS.contains(&ext))
            })
            .filter(|p| !config.is_excluded(&p.display().to_string()))
            .collect();
        found.sort();

        if found.is_empty() {
            warn!("No templates found in {}", path.display());
        }
        files.extend(found);
    }

    files
}

fn today(config: &CfnRulesConfig) -> NaiveDate {
    config
        .reference_date
        .unwrap_or_else(|| Local::now().date_naive())
}

fn lint_template(
    content: &str,
    display_path: &str,
    fs_path: Option<&Path>,
    config: &CfnRulesConfig,
) -> LintResult {
    info!("Linting {}", display_path);
    let mut result = LintResult::new(display_path);

    let template = match parse_template(content) {
        Ok(t) => match fs_path {
            Some(p) => t.with_path(p),
            None => t,
        },
        Err(err) => {
            result.parse_errors.push(err.to_string());
            return result;
        }
    };

    let suppressions = if config.ignore_metadata {
        SuppressionState::new()
    } else {
        extract_suppressions(&template)
    };

    let nested_rules: Vec<Box<dyn Rule>> = nested_stack_rules()
        .into_iter()
        .filter(|r| !config.is_rule_ignored(r.code(), r.name()))
        .collect();
    let (nested_stacks, stack_errors) = if nested_rules.is_empty() {
        debug!("Nested stack rules disabled, child templates not resolved");
        (Vec::new(), Vec::new())
    } else {
        load_nested_stacks(&template, config)
    };
    result.stack_errors = stack_errors
        .into_iter()
        .filter(|err| !nested_rules_suppressed(&suppressions, &nested_rules, err.resource()))
        .collect();

    let ctx = LintContext::new(&template, &nested_stacks, today(config))
        .with_metadata_suppressions(!config.ignore_metadata);
    let failures = run_rules(&ctx, config);

    result.failures = failures
        .into_iter()
        .filter(|f| !suppressions.is_ignored(&f.code, &f.path))
        .map(|mut f| {
            f.severity = config.effective_severity(&f.code, &f.rule_name, f.severity);
            f
        })
        .filter(|f| config.should_report(f.severity))
        .map(|f| locate(&template, f))
        .collect();

    result.sort();
    result.update_counts();

    result
}

/// Whether resource metadata suppresses every enabled nested stack rule.
fn nested_rules_suppressed(
    suppressions: &SuppressionState,
    rules: &[Box<dyn Rule>],
    resource: &str,
) -> bool {
    let path = DocPath::from_segments(["Resources", resource]);
    rules.iter().all(|r| suppressions.is_ignored(r.code(), &path))
}

/// Fill in the source position of a failure.
fn locate(template: &Template, failure: CheckFailure) -> CheckFailure {
    let (line, column) = find_position_for_path(template.source(), &failure.path);
    failure.with_position(line, column)
}

/// Run all enabled rules on the template.
fn run_rules(ctx: &LintContext, config: &CfnRulesConfig) -> Vec<CheckFailure> {
    let mut all_failures = Vec::new();

    for rule in all_rules() {
        if config.is_rule_ignored(rule.code(), rule.name()) {
            debug!("Rule {} disabled", rule.code());
            continue;
        }

        let failures = rule.check(ctx);
        debug!("Rule {} produced {} finding(s)", rule.code(), failures.len());
        all_failures.extend(failures);
    }

    all_failures
}

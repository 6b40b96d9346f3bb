use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::debug;

use crate::cli::{OutputFormat, SeverityThreshold};
use crate::config::{self, CfnRulesConfig};
use crate::error::CfnRulesError;
use crate::formatter::{self, format_results};
use crate::lint::{LintResult, lint_paths};
use crate::types::Severity;

/// Options for the `lint` command.
#[derive(Debug, Clone, Default)]
pub struct LintOptions {
    pub paths: Vec<PathBuf>,
    pub format: Option<OutputFormat>,
    pub ignore: Vec<String>,
    pub threshold: Option<SeverityThreshold>,
    pub mappings: Vec<String>,
    pub reference_date: Option<String>,
    pub no_fail: bool,
    pub ignore_metadata: bool,
}

impl From<OutputFormat> for formatter::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Stylish => Self::Stylish,
            OutputFormat::Json => Self::Json,
            OutputFormat::Compact => Self::Compact,
            OutputFormat::Github => Self::GitHub,
            OutputFormat::Sarif => Self::Sarif,
            OutputFormat::Junit => Self::JUnit,
        }
    }
}

impl From<SeverityThreshold> for Severity {
    fn from(threshold: SeverityThreshold) -> Self {
        match threshold {
            SeverityThreshold::Error => Self::Error,
            SeverityThreshold::Warning => Self::Warning,
            SeverityThreshold::Info => Self::Info,
            SeverityThreshold::Style => Self::Style,
        }
    }
}

/// Parse a `PREFIX=DIR` template path mapping.
pub fn parse_mapping(raw: &str) -> crate::Result<(String, PathBuf)> {
    match raw.rsplit_once('=') {
        Some((prefix, dir)) if !prefix.is_empty() && !dir.is_empty() => {
            Ok((prefix.to_string(), PathBuf::from(dir)))
        }
        _ => Err(CfnRulesError::InvalidArgument(format!(
            "mapping must look like PREFIX=DIR, got {}",
            raw
        ))),
    }
}

/// Layer command-line flags over the loaded configuration.
pub fn apply_options(mut config: CfnRulesConfig, options: &LintOptions) -> crate::Result<CfnRulesConfig> {
    for rule in &options.ignore {
        config = config.ignore(rule.trim());
    }

    if let Some(threshold) = options.threshold {
        config = config.with_failure_threshold(threshold.into());
    }

    // Command-line mappings take precedence over configured ones.
    let mut mappings = options
        .mappings
        .iter()
        .map(|raw| parse_mapping(raw))
        .collect::<crate::Result<Vec<_>>>()?;
    mappings.append(&mut config.template_path_mappings);
    config.template_path_mappings = mappings;

    if let Some(date) = &options.reference_date {
        let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|e| {
            CfnRulesError::InvalidArgument(format!("reference date {}: {}", date, e))
        })?;
        config = config.with_reference_date(parsed);
    }

    if options.no_fail {
        config = config.with_no_fail(true);
    }
    if options.ignore_metadata {
        config = config.with_ignore_metadata(true);
    }

    Ok(config)
}

/// Whether the results should make the command exit non-zero.
pub fn should_fail(results: &[LintResult], config: &CfnRulesConfig) -> bool {
    if results.iter().any(LintResult::has_problems) {
        return true;
    }
    !config.no_fail && results.iter().any(|r| r.should_fail(config.failure_threshold))
}

/// Lint the given paths and print the report.
///
/// Returns whether the run failed.
pub fn handle_lint(options: LintOptions, config_path: Option<&Path>) -> crate::Result<bool> {
    let project_dir = std::env::current_dir()?;
    let config = config::load_config(config_path, &project_dir)?;
    let config = apply_options(config, &options)?;
    debug!("Effective configuration: {:?}", config);

    let results = lint_paths(&options.paths, &config);
    let format = options.format.unwrap_or(OutputFormat::Stylish);
    print!("{}", format_results(&results, format.into()));

    Ok(should_fail(&results, &config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::StackError;
    use crate::types::{CheckFailure, DocPath, RuleCategory};

    #[test]
    fn test_parse_mapping() {
        assert_eq!(
            parse_mapping("https://bucket.s3.amazonaws.com/prefix/=./templates").unwrap(),
            (
                "https://bucket.s3.amazonaws.com/prefix/".to_string(),
                PathBuf::from("./templates")
            )
        );
        assert!(parse_mapping("no-separator").is_err());
        assert!(parse_mapping("=dir").is_err());
    }

    #[test]
    fn test_apply_options() {
        let base = CfnRulesConfig::default().with_mapping("https://configured/", "configured");
        let options = LintOptions {
            ignore: vec!["W9901".to_string(), " E9902".to_string()],
            threshold: Some(SeverityThreshold::Error),
            mappings: vec!["https://cli/=cli".to_string()],
            reference_date: Some("2024-06-01".to_string()),
            no_fail: true,
            ..Default::default()
        };

        let config = apply_options(base, &options).unwrap();
        assert!(config.rules.contains_key("W9901"));
        assert!(config.rules.contains_key("E9902"));
        assert_eq!(config.failure_threshold, Severity::Error);
        assert_eq!(config.template_path_mappings[0].0, "https://cli/");
        assert_eq!(config.template_path_mappings[1].0, "https://configured/");
        assert_eq!(config.reference_date, NaiveDate::from_ymd_opt(2024, 6, 1));
        assert!(config.no_fail);
    }

    #[test]
    fn test_apply_options_bad_date() {
        let options = LintOptions {
            reference_date: Some("01/06/2024".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            apply_options(CfnRulesConfig::default(), &options),
            Err(CfnRulesError::InvalidArgument(_))
        ));
    }

    fn warning_result() -> LintResult {
        let mut result = LintResult::new("main.yaml");
        result.failures.push(CheckFailure::new(
            "W9901",
            "nested-stack-default-parameter",
            Severity::Warning,
            RuleCategory::BestPractice,
            "msg",
            DocPath::new(),
        ));
        result
    }

    #[test]
    fn test_should_fail() {
        let config = CfnRulesConfig::default();
        assert!(should_fail(&[warning_result()], &config));
        assert!(!should_fail(&[LintResult::new("ok.yaml")], &config));

        let error_only = CfnRulesConfig::default().with_failure_threshold(Severity::Error);
        assert!(!should_fail(&[warning_result()], &error_only));

        let no_fail = CfnRulesConfig::default().with_no_fail(true);
        assert!(!should_fail(&[warning_result()], &no_fail));
    }

    #[test]
    fn test_stack_errors_fail_even_with_no_fail() {
        let mut result = LintResult::new("main.yaml");
        result.stack_errors.push(StackError::MissingTemplateUrl {
            resource: "App".to_string(),
        });
        let no_fail = CfnRulesConfig::default().with_no_fail(true);
        assert!(should_fail(&[result], &no_fail));
    }
}

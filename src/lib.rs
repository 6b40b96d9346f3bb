//! # cfn-rules
//!
//! A catalog of lint rules for AWS CloudFormation templates.
//!
//! ## Features
//!
//! - **Interface metadata**: parameters named in `AWS::CloudFormation::Interface` must exist
//! - **Wildcard principals**: policy statements must not allow the `*` principal
//! - **Lambda runtimes**: runtimes approaching end of life are reported
//! - **Nested stacks**: parameters passed to child templates are checked against
//!   the child's declarations, resolving `TemplateURL` to a local file
//!
//! ## Example
//!
//! ```rust,no_run
//! use cfn_rules::{CfnRulesConfig, lint_file};
//! use std::path::Path;
//!
//! let config = CfnRulesConfig::default().ignore("W9932");
//! let result = lint_file(Path::new("templates/main.yaml"), &config);
//! for failure in &result.failures {
//!     println!("{}:{} {} {}", failure.line, failure.column, failure.code, failure.message);
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod formatter;
pub mod handlers;
pub mod lint;
pub mod rules;
pub mod stack;
pub mod suppress;
pub mod template;
pub mod types;

// Re-export commonly used types and functions
pub use config::{CfnRulesConfig, CfnRulesConfigBuilder, ConfigError, RuleConfig};
pub use error::{CfnRulesError, Result};
pub use formatter::{OutputFormat, format_result, format_results};
pub use lint::{LintResult, lint, lint_file, lint_paths, lint_with_path};
pub use rules::{Rule, RuleDefinition, all_rules, rule_definitions};
pub use stack::{NestedStack, StackError};
pub use template::{ParseError, Template, parse_template, parse_template_file};
pub use types::{CheckFailure, DocPath, PathSegment, RuleCategory, RuleCode, Severity};

/// The current version of the CLI tool
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

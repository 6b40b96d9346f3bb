//! SARIF (Static Analysis Results Interchange Format) formatter.
//!
//! SARIF is a standard format for static analysis tool output,
//! supported by GitHub code scanning, VS Code, and other tools.

use serde::Serialize;

use crate::lint::LintResult;
use crate::rules::rule_definitions;
use crate::types::Severity;

const SCHEMA: &str =
    "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";

const INFORMATION_URI: &str = "https://github.com/aws-ia/cfn-ia-rules";

/// Rule id used for files that could not be parsed or whose nested stacks
/// could not be resolved.
const PROBLEM_RULE_ID: &str = "cfn-rules-error";

/// Format lint results as a SARIF log.
pub fn format(results: &[LintResult]) -> String {
    let output = SarifOutput::from(results);
    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
}

#[derive(Serialize)]
struct SarifOutput {
    #[serde(rename = "$schema")]
    schema: String,
    version: String,
    runs: Vec<SarifRun>,
}

#[derive(Serialize)]
struct SarifRun {
    tool: SarifTool,
    results: Vec<SarifResult>,
}

#[derive(Serialize)]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifDriver {
    name: String,
    version: String,
    information_uri: String,
    rules: Vec<SarifRule>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRule {
    id: String,
    name: String,
    short_description: SarifMessage,
    help_uri: String,
    default_configuration: SarifConfiguration,
}

#[derive(Serialize)]
struct SarifConfiguration {
    level: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifResult {
    rule_id: String,
    level: String,
    message: SarifMessage,
    locations: Vec<SarifLocation>,
}

#[derive(Serialize)]
struct SarifMessage {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifLocation {
    physical_location: SarifPhysicalLocation,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifPhysicalLocation {
    artifact_location: SarifArtifactLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    region: Option<SarifRegion>,
}

#[derive(Serialize)]
struct SarifArtifactLocation {
    uri: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SarifRegion {
    start_line: u32,
    start_column: u32,
}

fn severity_to_sarif_level(severity: Severity) -> String {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info | Severity::Style => "note",
    }
    .to_string()
}

fn location(file: &str, region: Option<SarifRegion>) -> Vec<SarifLocation> {
    vec![SarifLocation {
        physical_location: SarifPhysicalLocation {
            artifact_location: SarifArtifactLocation {
                uri: file.to_string(),
            },
            region,
        },
    }]
}

impl From<&[LintResult]> for SarifOutput {
    fn from(results: &[LintResult]) -> Self {
        let mut rules: Vec<SarifRule> = rule_definitions()
            .into_iter()
            .map(|def| SarifRule {
                id: def.code.clone(),
                name: def.name,
                short_description: SarifMessage {
                    text: def.description,
                },
                help_uri: def.url,
                default_configuration: SarifConfiguration {
                    level: severity_to_sarif_level(
                        Severity::parse(def.severity).unwrap_or_default(),
                    ),
                },
            })
            .collect();
        rules.push(SarifRule {
            id: PROBLEM_RULE_ID.to_string(),
            name: "template-not-checked".to_string(),
            short_description: SarifMessage {
                text: "The template or one of its nested stacks could not be checked.".to_string(),
            },
            help_uri: INFORMATION_URI.to_string(),
            default_configuration: SarifConfiguration {
                level: "error".to_string(),
            },
        });

        let mut sarif_results = Vec::new();
        for result in results {
            let problems = result
                .parse_errors
                .iter()
                .cloned()
                .chain(result.stack_errors.iter().map(|e| e.to_string()));
            for text in problems {
                sarif_results.push(SarifResult {
                    rule_id: PROBLEM_RULE_ID.to_string(),
                    level: "error".to_string(),
                    message: SarifMessage { text },
                    locations: location(&result.file_path, None),
                });
            }

            for f in &result.failures {
                sarif_results.push(SarifResult {
                    rule_id: f.code.to_string(),
                    level: severity_to_sarif_level(f.severity),
                    message: SarifMessage {
                        text: format!("{} ({}): {}", f.code, f.path, f.message),
                    },
                    locations: location(
                        &result.file_path,
                        Some(SarifRegion {
                            start_line: f.line,
                            start_column: f.column,
                        }),
                    ),
                });
            }
        }

        Self {
            schema: SCHEMA.to_string(),
            version: "2.1.0".to_string(),
            runs: vec![SarifRun {
                tool: SarifTool {
                    driver: SarifDriver {
                        name: env!("CARGO_PKG_NAME").to_string(),
                        version: env!("CARGO_PKG_VERSION").to_string(),
                        information_uri: INFORMATION_URI.to_string(),
                        rules,
                    },
                },
                results: sarif_results,
            }],
        }
    }
}

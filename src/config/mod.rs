pub mod types;

pub use types::{CfnRulesConfig, CfnRulesConfigBuilder, ConfigError, RuleConfig};

use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAMES: [&str; 2] = [".cfn-rules.yaml", ".cfn-rules.yml"];

/// Get the global config file path (~/.cfn-rules.yaml)
pub fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(CONFIG_FILE_NAMES[0]))
}

/// Get the XDG-style config file path (<config_dir>/cfn-rules.yaml)
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cfn-rules.yaml"))
}

/// Load configuration from a YAML file.
pub fn load_config_file(path: &Path) -> Result<CfnRulesConfig, ConfigError> {
    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;
    debug!("Loading config from {}", path.display());
    Ok(CfnRulesConfigBuilder::new().from_yaml_str(&content)?.build())
}

/// Find the config file to use, if any.
///
/// Search order:
/// 1. .cfn-rules.yaml / .cfn-rules.yml in `project_dir`
/// 2. <config_dir>/cfn-rules.yaml
/// 3. ~/.cfn-rules.yaml
pub fn find_config_file(project_dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| project_dir.join(name))
        .chain(user_config_path())
        .chain(global_config_path())
        .find(|path| path.is_file())
}

/// Load configuration from an explicit file, or search the standard locations.
/// Missing files fall back to defaults; unreadable or invalid ones are errors.
pub fn load_config(explicit: Option<&Path>, project_dir: &Path) -> Result<CfnRulesConfig, ConfigError> {
    if let Some(path) = explicit {
        return load_config_file(path);
    }

    match find_config_file(project_dir) {
        Some(path) => load_config_file(&path),
        None => Ok(CfnRulesConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_local_config() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".cfn-rules.yaml"), "ignored: [W9901]\n").unwrap();

        let config = load_config(None, dir.path()).unwrap();
        assert!(config.rules.contains_key("W9901"));
    }

    #[test]
    fn test_load_explicit_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.yaml");
        fs::write(&path, "failure-threshold: error\n").unwrap();

        let config = load_config(Some(&path), dir.path()).unwrap();
        assert_eq!(config.failure_threshold, crate::types::Severity::Error);
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let dir = TempDir::new().unwrap();
        let result = load_config(Some(&dir.path().join("missing.yaml")), dir.path());
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }

    #[test]
    fn test_invalid_config_is_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".cfn-rules.yml"), "rules: [unclosed\n").unwrap();
        assert!(matches!(
            load_config(None, dir.path()),
            Err(ConfigError::ParseError(_))
        ));
    }
}

//! Crate-level error type.

use thiserror::Error;

use crate::config::ConfigError;
use crate::stack::StackError;
use crate::template::ParseError;

/// Errors surfaced by the library API and the command-line tool.
#[derive(Debug, Error)]
pub enum CfnRulesError {
    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A template could not be parsed
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A nested stack's child template could not be resolved
    #[error(transparent)]
    Stack(#[from] StackError),

    /// Invalid command-line input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for cfn-rules operations
pub type Result<T> = std::result::Result<T, CfnRulesError>;

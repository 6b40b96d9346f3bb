// Handler modules
pub mod lint;
pub mod rules;

// Re-export all handler functions
pub use lint::{LintOptions, handle_lint};
pub use rules::handle_rules;

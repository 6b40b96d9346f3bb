use clap::Parser;
use cfn_rules::cli::{Cli, Commands};
use cfn_rules::handlers::{LintOptions, handle_lint, handle_rules};
use std::process;

fn main() {
    match run() {
        Ok(true) => process::exit(1),
        Ok(false) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    }
}

/// Run the selected command. Returns whether the run should exit non-zero.
fn run() -> cfn_rules::Result<bool> {
    let cli = Cli::parse();

    // Initialize logging
    cli.init_logging();

    match cli.command {
        Commands::Lint {
            paths,
            format,
            ignore,
            threshold,
            mappings,
            reference_date,
            no_fail,
            ignore_metadata,
        } => {
            let options = LintOptions {
                paths,
                format: Some(format),
                ignore,
                threshold,
                mappings,
                reference_date,
                no_fail,
                ignore_metadata,
            };
            handle_lint(options, cli.config.as_deref())
        }
        Commands::Rules { json } => handle_rules(json).map(|_| false),
    }
}

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cfn-rules")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Lint CloudFormation templates against a catalog of best-practice rules")]
#[command(long_about = "Checks CloudFormation templates for undefined parameters in interface metadata, wildcard IAM principals, Lambda runtimes close to end of life, and parameter mismatches between parent templates and their nested stacks.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Lint CloudFormation templates
    Lint {
        /// Template files or directories to lint
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "stylish")]
        format: OutputFormat,

        /// Rule codes or names to disable
        #[arg(long, value_delimiter = ',', value_name = "RULE")]
        ignore: Vec<String>,

        /// Minimum severity that makes the run fail
        #[arg(long, value_enum)]
        threshold: Option<SeverityThreshold>,

        /// Map a TemplateURL prefix to a local directory (PREFIX=DIR)
        #[arg(long = "mapping", value_name = "PREFIX=DIR")]
        mappings: Vec<String>,

        /// Date to evaluate runtime end-of-life against (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        reference_date: Option<String>,

        /// Always exit successfully when findings are reported
        #[arg(long)]
        no_fail: bool,

        /// Ignore rule suppressions declared in template metadata
        #[arg(long)]
        ignore_metadata: bool,
    },

    /// List the available rules
    Rules {
        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Stylish,
    Json,
    Compact,
    Github,
    Sarif,
    Junit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SeverityThreshold {
    Error,
    Warning,
    Info,
    Style,
}

impl Cli {
    /// Initialize logging based on verbosity level
    pub fn init_logging(&self) {
        if self.quiet {
            return;
        }

        let level = match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };

        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();
    }
}

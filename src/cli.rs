use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pycomply")]
#[command(about = "Compliance checks for Python source files", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check Python files and report rule violations
    Check {
        /// Files or directories to check
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Configuration file (defaults to the nearest .pycomply.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// LCOV coverage file for the coverage rule
        #[arg(long = "coverage-file", visible_alias = "lcov")]
        coverage_file: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: OutputFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of worker threads (0 = all cores)
        #[arg(short = 'j', long)]
        jobs: Option<usize>,

        /// Override the maximum cyclomatic complexity
        #[arg(long = "max-complexity", allow_negative_numbers = true)]
        max_complexity: Option<i64>,

        /// Override the minimum coverage ratio (0.0 - 1.0)
        #[arg(long = "min-coverage")]
        min_coverage: Option<f64>,

        /// Glob patterns of files to skip
        #[arg(long, value_delimiter = ',')]
        exclude: Vec<String>,

        /// Rule ids or families to disable, in addition to the config file
        #[arg(long, value_delimiter = ',')]
        disable: Vec<String>,
    },

    /// Write a default .pycomply.toml in the current directory
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Terminal,
    Json,
}

impl From<OutputFormat> for crate::io::output::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Terminal => crate::io::output::OutputFormat::Terminal,
            OutputFormat::Json => crate::io::output::OutputFormat::Json,
        }
    }
}

// Export modules for library usage
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod coverage;
pub mod io;
pub mod parser;
pub mod pipeline;
pub mod report;
pub mod rules;

// Re-export commonly used types
pub use crate::core::{
    ConfigError, Declaration, DeclarationId, DeclarationKind, Error, Finding, ParseError,
    RuleFamily, RuleId, Severity, SourceModel, SourcePosition, Span,
};

pub use crate::config::{load_config, ComplianceConfig};

pub use crate::parser::build_source_model;

pub use crate::rules::{CoverageMap, Rule, RuleContext, RuleOutcome, RuleRegistry};

pub use crate::report::{BatchReport, ExitSignal, Report, RuleStatus, Verdict};

pub use crate::pipeline::{
    check_batch, check_source, CancellationToken, CoverageLookup, NoCoverage, SourceInput,
};

pub use crate::coverage::{parse_lcov_file, LcovData};

pub use crate::io::output::{OutputFormat, OutputWriter};

//! Report model: the terminal, serializable artifact of a check.

pub mod aggregator;

use crate::core::{Finding, ParseError, RuleFamily};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub use aggregator::aggregate;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => f.write_str("pass"),
            Verdict::Fail => f.write_str("fail"),
        }
    }
}

/// Outcome of one rule family for one file.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RuleStatus {
    Passed,
    Failed,
    NotEvaluated,
}

impl fmt::Display for RuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleStatus::Passed => f.write_str("passed"),
            RuleStatus::Failed => f.write_str("failed"),
            RuleStatus::NotEvaluated => f.write_str("not evaluated"),
        }
    }
}

/// Compliance report for a single file.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Report {
    pub file: String,
    /// Sorted by line, column, rule id and message.
    pub findings: Vec<Finding>,
    pub verdict: Verdict,
    pub summary: BTreeMap<RuleFamily, RuleStatus>,
}

impl Report {
    /// Report for a file that could not be modeled: one `parse-error`
    /// finding, every analyzer not evaluated.
    pub fn from_parse_error(err: &ParseError) -> Self {
        let mut summary: BTreeMap<RuleFamily, RuleStatus> = RuleFamily::ANALYZERS
            .iter()
            .map(|family| (*family, RuleStatus::NotEvaluated))
            .collect();
        summary.insert(RuleFamily::Parse, RuleStatus::Failed);

        Self {
            file: err.file.clone(),
            findings: vec![Finding::from(err)],
            verdict: Verdict::Fail,
            summary,
        }
    }

    pub fn status(&self, family: RuleFamily) -> RuleStatus {
        self.summary
            .get(&family)
            .copied()
            .unwrap_or(RuleStatus::NotEvaluated)
    }

    pub fn error_count(&self) -> usize {
        self.findings.iter().filter(|f| f.is_error()).count()
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExitSignal {
    Success,
    Failure,
}

impl ExitSignal {
    pub fn code(&self) -> i32 {
        match self {
            ExitSignal::Success => 0,
            ExitSignal::Failure => 1,
        }
    }
}

/// Reports of a batch, in input order.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BatchReport {
    pub reports: Vec<Report>,
    /// The batch was stopped before every file was checked.
    pub cancelled: bool,
    pub exit: ExitSignal,
}

impl BatchReport {
    pub fn new(reports: Vec<Report>, cancelled: bool) -> Self {
        let all_pass = reports.iter().all(|r| r.verdict.is_pass());
        let exit = if all_pass && !cancelled {
            ExitSignal::Success
        } else {
            ExitSignal::Failure
        };
        Self {
            reports,
            cancelled,
            exit,
        }
    }

    pub fn failed_files(&self) -> usize {
        self.reports.iter().filter(|r| !r.verdict.is_pass()).count()
    }
}

use super::{Report, RuleStatus, Verdict};
use crate::config::RuleSelection;
use crate::core::{Finding, RuleFamily};
use crate::rules::RuleOutcome;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// Merge analyzer outcomes for one file into its report.
///
/// Outcomes may arrive in any order; the result depends only on their
/// content.
pub fn aggregate(
    file: &str,
    outcomes: Vec<(RuleFamily, RuleOutcome)>,
    disabled: &BTreeSet<RuleFamily>,
    selection: &RuleSelection,
) -> Report {
    let mut summary: BTreeMap<RuleFamily, RuleStatus> = RuleFamily::ANALYZERS
        .iter()
        .map(|family| (*family, RuleStatus::NotEvaluated))
        .collect();
    summary.insert(RuleFamily::Parse, RuleStatus::Passed);

    let mut findings = Vec::new();
    for (family, outcome) in outcomes {
        if disabled.contains(&family) {
            continue;
        }
        let status = match outcome {
            RuleOutcome::NotEvaluated => RuleStatus::NotEvaluated,
            RuleOutcome::Evaluated(found) if found.is_empty() => RuleStatus::Passed,
            RuleOutcome::Evaluated(found) => {
                findings.extend(found);
                RuleStatus::Failed
            }
        };
        summary.insert(family, status);
    }

    let findings = normalize(findings, selection);
    let verdict = if findings.iter().any(Finding::is_error) {
        Verdict::Fail
    } else {
        Verdict::Pass
    };

    Report {
        file: file.to_string(),
        findings,
        verdict,
        summary,
    }
}

/// Apply severity overrides, then sort and drop exact duplicates.
pub fn normalize(findings: Vec<Finding>, selection: &RuleSelection) -> Vec<Finding> {
    let mut findings: Vec<Finding> = findings
        .into_iter()
        .map(|mut finding| {
            if let Some(severity) = selection.severity_for(finding.rule.family()) {
                finding.severity = severity;
            }
            finding
        })
        .collect();
    findings.sort_by(compare_findings);
    findings.dedup();
    findings
}

/// Report order: line, column, rule id, message. The remaining fields only
/// break ties so that equal findings end up adjacent.
pub fn compare_findings(a: &Finding, b: &Finding) -> Ordering {
    a.location
        .line
        .cmp(&b.location.line)
        .then(a.location.column.cmp(&b.location.column))
        .then_with(|| a.rule.as_str().cmp(b.rule.as_str()))
        .then_with(|| a.message.cmp(&b.message))
        .then_with(|| a.severity.cmp(&b.severity))
        .then_with(|| a.declaration.cmp(&b.declaration))
        .then_with(|| a.location.file.cmp(&b.location.file))
}

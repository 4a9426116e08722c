//! Per-file check pipeline and batch execution.
//!
//! Each file goes through build → analyze → aggregate independently of
//! every other file. Batches run on a dedicated rayon pool; results are
//! collected by input index, so report order never depends on scheduling.

use crate::config::ComplianceConfig;
use crate::core::{ConfigError, RuleFamily};
use crate::parser::build_source_model;
use crate::report::{aggregate, BatchReport, Report};
use crate::rules::{CoverageMap, Rule, RuleContext, RuleOutcome, RuleRegistry};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// One file to check: its identity and full text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceInput {
    pub file: String,
    pub text: String,
}

impl SourceInput {
    pub fn new(file: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            text: text.into(),
        }
    }
}

/// Where per-file coverage maps come from.
pub trait CoverageLookup: Sync {
    fn coverage_for(&self, file: &str) -> Option<&CoverageMap>;
}

/// No coverage data at all; the coverage family is never evaluated.
pub struct NoCoverage;

impl CoverageLookup for NoCoverage {
    fn coverage_for(&self, _file: &str) -> Option<&CoverageMap> {
        None
    }
}

impl CoverageLookup for HashMap<String, CoverageMap> {
    fn coverage_for(&self, file: &str) -> Option<&CoverageMap> {
        self.get(file)
    }
}

impl CoverageLookup for BTreeMap<String, CoverageMap> {
    fn coverage_for(&self, file: &str) -> Option<&CoverageMap> {
        self.get(file)
    }
}

/// Cooperative cancellation shared between a caller and a running batch.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Check a single file on the calling thread's rayon context.
pub fn check_source(
    input: &SourceInput,
    coverage: Option<&CoverageMap>,
    config: &ComplianceConfig,
) -> Result<Report, ConfigError> {
    let registry = RuleRegistry::from_config(config)?;
    let report = match build_source_model(&input.file, &input.text) {
        Ok(model) => {
            let ctx = RuleContext::new(&model, coverage);
            let outcomes = registry
                .rules()
                .par_iter()
                .map(|rule| run_rule(rule.as_ref(), &ctx, &registry))
                .collect();
            finish(&input.file, outcomes, &registry)
        }
        Err(err) => Report::from_parse_error(&err),
    };
    Ok(report)
}

/// Check a batch of files.
///
/// Configuration is validated before any file is touched. Once `cancel`
/// fires, files not yet finished are dropped and the returned batch is
/// marked cancelled.
pub fn check_batch(
    inputs: &[SourceInput],
    coverage: &dyn CoverageLookup,
    config: &ComplianceConfig,
    cancel: &CancellationToken,
) -> Result<BatchReport, ConfigError> {
    let registry = RuleRegistry::from_config(config)?;
    let workers = config.parallel.effective_concurrency();
    let start = Instant::now();
    tracing::debug!("Checking {} files with {} workers", inputs.len(), workers);

    let run = || -> Vec<Option<Report>> {
        inputs
            .par_iter()
            .map(|input| check_file(input, coverage.coverage_for(&input.file), &registry, cancel))
            .collect()
    };

    let results = match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
        Ok(pool) => pool.install(run),
        Err(e) => {
            tracing::warn!("Failed to build thread pool, using the global one: {}", e);
            run()
        }
    };

    let cancelled = results.iter().any(Option::is_none);
    let reports: Vec<Report> = results.into_iter().flatten().collect();
    let batch = BatchReport::new(reports, cancelled);

    tracing::info!(
        "Checked {} of {} files in {:?}: {} failed{}",
        batch.reports.len(),
        inputs.len(),
        start.elapsed(),
        batch.failed_files(),
        if cancelled { " (cancelled)" } else { "" }
    );
    Ok(batch)
}

/// Run the whole pipeline for one file; `None` when cancelled midway.
fn check_file(
    input: &SourceInput,
    coverage: Option<&CoverageMap>,
    registry: &RuleRegistry,
    cancel: &CancellationToken,
) -> Option<Report> {
    if cancel.is_cancelled() {
        return None;
    }

    let model = match build_source_model(&input.file, &input.text) {
        Ok(model) => model,
        Err(err) => {
            tracing::warn!("{}", err);
            return Some(Report::from_parse_error(&err));
        }
    };
    tracing::debug!(
        "Built model for {} ({} declarations)",
        input.file,
        model.declarations().count()
    );

    let ctx = RuleContext::new(&model, coverage);
    let outcomes: Option<Vec<(RuleFamily, RuleOutcome)>> = registry
        .rules()
        .par_iter()
        .map(|rule| (!cancel.is_cancelled()).then(|| run_rule(rule.as_ref(), &ctx, registry)))
        .collect();

    let report = finish(&input.file, outcomes?, registry);
    tracing::debug!("{}: {} ({} findings)", report.file, report.verdict, report.findings.len());
    Some(report)
}

fn run_rule(
    rule: &dyn Rule,
    ctx: &RuleContext<'_>,
    registry: &RuleRegistry,
) -> (RuleFamily, RuleOutcome) {
    (rule.family(), registry.retain_enabled(rule.check(ctx)))
}

fn finish(file: &str, outcomes: Vec<(RuleFamily, RuleOutcome)>, registry: &RuleRegistry) -> Report {
    aggregate(
        file,
        outcomes,
        &registry.disabled_families(),
        &registry.config().rules,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParallelConfig;
    use crate::core::RuleId;
    use crate::report::{ExitSignal, RuleStatus, Verdict};
    use pretty_assertions::assert_eq;

    fn inputs() -> Vec<SourceInput> {
        vec![
            SourceInput::new("a.py", "def f():\n    \"\"\"Return one always.\"\"\"\n    return 1\n"),
            SourceInput::new("b.py", "def broken(:\n    pass\n"),
            SourceInput::new("c.py", "def g():\n    return 2\n"),
        ]
    }

    #[test]
    fn test_batch_keeps_input_order_and_survives_parse_errors() {
        let batch = check_batch(
            &inputs(),
            &NoCoverage,
            &ComplianceConfig::default(),
            &CancellationToken::new(),
        )
        .unwrap();

        let files: Vec<&str> = batch.reports.iter().map(|r| r.file.as_str()).collect();
        assert_eq!(files, vec!["a.py", "b.py", "c.py"]);
        assert_eq!(batch.reports[0].verdict, Verdict::Pass);
        assert_eq!(batch.reports[1].findings[0].rule, RuleId::ParseError);
        assert_eq!(batch.reports[2].findings[0].rule, RuleId::DocMissing);
        assert!(!batch.cancelled);
        assert_eq!(batch.exit, ExitSignal::Failure);
    }

    #[test]
    fn test_config_error_aborts_before_any_file() {
        let mut config = ComplianceConfig::default();
        config.complexity.max = 0;
        let err = check_batch(&inputs(), &NoCoverage, &config, &CancellationToken::new())
            .unwrap_err();
        assert_eq!(err.field, "complexity.max");
    }

    #[test]
    fn test_cancelled_batch_returns_no_partial_reports() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let batch =
            check_batch(&inputs(), &NoCoverage, &ComplianceConfig::default(), &cancel).unwrap();
        assert!(batch.cancelled);
        assert!(batch.reports.is_empty());
        assert_eq!(batch.exit, ExitSignal::Failure);
    }

    /// Cancels the batch once a given file is reached.
    struct CancelAt {
        file: &'static str,
        cancel: CancellationToken,
    }

    impl CoverageLookup for CancelAt {
        fn coverage_for(&self, file: &str) -> Option<&CoverageMap> {
            if file == self.file {
                self.cancel.cancel();
            }
            None
        }
    }

    #[test]
    fn test_cancelled_midway_keeps_finished_reports() {
        let cancel = CancellationToken::new();
        let lookup = CancelAt {
            file: "b.py",
            cancel: cancel.clone(),
        };
        let config = ComplianceConfig {
            parallel: ParallelConfig::sequential(),
            ..Default::default()
        };

        let batch = check_batch(&inputs(), &lookup, &config, &cancel).unwrap();

        let first = check_source(&inputs()[0], None, &config).unwrap();
        assert_eq!(batch.reports, vec![first]);
        assert!(batch.cancelled);
        assert_eq!(batch.exit, ExitSignal::Failure);
    }

    #[test]
    fn test_coverage_lookup_by_file() {
        let mut coverage = HashMap::new();
        coverage.insert("c.py".to_string(), CoverageMap::from([(1, true), (2, false)]));
        let batch = check_batch(
            &inputs(),
            &coverage,
            &ComplianceConfig::default(),
            &CancellationToken::new(),
        )
        .unwrap();
        assert_eq!(batch.reports[0].status(RuleFamily::Coverage), RuleStatus::NotEvaluated);
        assert_eq!(batch.reports[2].status(RuleFamily::Coverage), RuleStatus::Failed);
    }

    #[test]
    fn test_check_source_is_idempotent() {
        let input = SourceInput::new("c.py", "import os\ndef g():\n    return 2\n");
        let config = ComplianceConfig::default();
        let first = check_source(&input, None, &config).unwrap();
        let second = check_source(&input, None, &config).unwrap();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}

use super::{Rule, RuleContext, RuleOutcome};
use crate::config::CoverageThresholds;
use crate::core::{
    ConfigError, DeclarationId, DeclarationKind, Finding, RuleFamily, RuleId, SourceModel,
};
use std::collections::BTreeMap;

/// Executed state per 1-based line number.
pub type CoverageMap = BTreeMap<usize, bool>;

/// Executed share of a declaration's own code lines, in `[0, 1]`.
///
/// Lines missing from the map count as not executed. A declaration without
/// own code lines is fully covered.
pub fn coverage_ratio(model: &SourceModel, id: DeclarationId, coverage: &CoverageMap) -> f64 {
    let lines = model.own_code_lines(id);
    if lines.is_empty() {
        return 1.0;
    }
    let executed = lines
        .iter()
        .filter(|line| coverage.get(line).copied().unwrap_or(false))
        .count();
    executed as f64 / lines.len() as f64
}

pub struct CoverageRule {
    min_ratio: f64,
}

impl CoverageRule {
    pub fn new(thresholds: &CoverageThresholds) -> Result<Self, ConfigError> {
        thresholds.validate()?;
        Ok(Self {
            min_ratio: thresholds.min_ratio,
        })
    }
}

impl Rule for CoverageRule {
    fn family(&self) -> RuleFamily {
        RuleFamily::Coverage
    }

    fn check(&self, ctx: &RuleContext<'_>) -> RuleOutcome {
        let Some(coverage) = ctx.coverage.filter(|map| !map.is_empty()) else {
            return RuleOutcome::NotEvaluated;
        };

        let model = ctx.model;
        let findings = model
            .declarations()
            .filter_map(|(id, decl)| {
                let ratio = coverage_ratio(model, id, coverage);
                if ratio >= self.min_ratio {
                    return None;
                }
                let label = match decl.kind {
                    DeclarationKind::Module => "module body",
                    _ => decl.name.as_str(),
                };
                Some(
                    Finding::new(
                        RuleId::Coverage,
                        format!(
                            "`{}` has {:.0}% line coverage, minimum is {:.0}%",
                            label,
                            ratio * 100.0,
                            self.min_ratio * 100.0
                        ),
                        decl.span.start.clone(),
                    )
                    .with_declaration(&decl.qualified_name),
                )
            })
            .collect();
        RuleOutcome::Evaluated(findings)
    }
}

//! Rule analyzers.
//!
//! Every analyzer is a stateless strategy behind the [`Rule`] trait: it
//! reads a [`SourceModel`] (and coverage data where relevant) and returns
//! findings. Analyzers share nothing mutable, so the registry can run them
//! concurrently over the same model.

pub mod complexity;
pub mod coverage;
pub mod design;
pub mod doc;
pub mod style;

use crate::config::ComplianceConfig;
use crate::core::{ConfigError, Finding, RuleFamily, SourceModel};
use std::collections::BTreeSet;

pub use complexity::{ComplexityRule, ComplexityRank};
pub use coverage::{CoverageMap, CoverageRule};
pub use design::DesignRule;
pub use doc::DocRule;
pub use style::StyleRule;

/// Read-only inputs handed to each analyzer for one file.
#[derive(Clone, Copy, Debug)]
pub struct RuleContext<'a> {
    pub model: &'a SourceModel,
    pub coverage: Option<&'a CoverageMap>,
}

impl<'a> RuleContext<'a> {
    pub fn new(model: &'a SourceModel, coverage: Option<&'a CoverageMap>) -> Self {
        Self { model, coverage }
    }
}

/// Result of running one analyzer over one file.
#[derive(Clone, Debug, PartialEq)]
pub enum RuleOutcome {
    Evaluated(Vec<Finding>),
    /// The analyzer lacked the input it needs.
    NotEvaluated,
}

pub trait Rule: Send + Sync {
    fn family(&self) -> RuleFamily;
    fn check(&self, ctx: &RuleContext<'_>) -> RuleOutcome;
}

/// Enabled analyzers, built and validated from a configuration.
pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
    config: ComplianceConfig,
}

impl RuleRegistry {
    /// Build every analyzer whose family is not disabled.
    ///
    /// Thresholds are validated here, so an invalid value surfaces before
    /// any file is looked at.
    pub fn from_config(config: &ComplianceConfig) -> Result<Self, ConfigError> {
        config.rules.validate()?;

        let mut rules: Vec<Box<dyn Rule>> = Vec::new();
        for family in RuleFamily::ANALYZERS {
            if config.rules.is_family_disabled(family) {
                continue;
            }
            let rule: Box<dyn Rule> = match family {
                RuleFamily::Doc => Box::new(DocRule::new(&config.doc)),
                RuleFamily::Style => Box::new(StyleRule::new(&config.style)?),
                RuleFamily::Complexity => Box::new(ComplexityRule::new(&config.complexity)?),
                RuleFamily::Coverage => Box::new(CoverageRule::new(&config.coverage)?),
                RuleFamily::Design => Box::new(DesignRule::new(&config.design)),
                RuleFamily::Parse => continue,
            };
            rules.push(rule);
        }

        Ok(Self {
            rules,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &ComplianceConfig {
        &self.config
    }

    pub fn families(&self) -> impl Iterator<Item = RuleFamily> + '_ {
        self.rules.iter().map(|rule| rule.family())
    }

    pub fn rules(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }

    /// Families that never ran because they are disabled.
    pub fn disabled_families(&self) -> BTreeSet<RuleFamily> {
        RuleFamily::ANALYZERS
            .iter()
            .copied()
            .filter(|family| self.config.rules.is_family_disabled(*family))
            .collect()
    }

    /// Drop findings of individually disabled rules.
    pub fn retain_enabled(&self, outcome: RuleOutcome) -> RuleOutcome {
        match outcome {
            RuleOutcome::Evaluated(findings) => RuleOutcome::Evaluated(
                findings
                    .into_iter()
                    .filter(|finding| !self.config.rules.is_rule_disabled(finding.rule))
                    .collect(),
            ),
            RuleOutcome::NotEvaluated => RuleOutcome::NotEvaluated,
        }
    }
}

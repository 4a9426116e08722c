use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::parallel::ParallelConfig;
use super::thresholds::{
    ComplexityThresholds, CoverageThresholds, DesignThresholds, DocThresholds, StyleThresholds,
};
use crate::core::{ConfigError, RuleFamily, RuleId, Severity};

/// Root configuration structure for pycomply
///
/// Every section is optional in `.pycomply.toml`; a missing section or key
/// falls back to the documented default, so an empty file is a valid
/// configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ComplianceConfig {
    #[serde(default)]
    pub doc: DocThresholds,

    #[serde(default)]
    pub style: StyleThresholds,

    #[serde(default)]
    pub complexity: ComplexityThresholds,

    #[serde(default)]
    pub coverage: CoverageThresholds,

    #[serde(default)]
    pub design: DesignThresholds,

    /// Rule selection and severity overrides
    #[serde(default)]
    pub rules: RuleSelection,

    #[serde(default)]
    pub parallel: ParallelConfig,
}

/// Which rules run and at what severity they report.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RuleSelection {
    /// Rule ids (`unused-import`) or family names (`coverage`) to skip
    #[serde(default)]
    pub disabled: Vec<String>,

    /// Severity per family name, e.g. `coverage = "error"`
    #[serde(default)]
    pub severity: BTreeMap<String, Severity>,
}

impl RuleSelection {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(unknown) = self
            .disabled
            .iter()
            .find(|name| parse_family(name).is_none() && parse_rule(name).is_none())
        {
            return Err(ConfigError::new(
                "rules.disabled",
                format!("unknown rule or family `{}`", unknown),
            ));
        }
        if let Some(unknown) = self.severity.keys().find(|name| parse_family(name).is_none()) {
            return Err(ConfigError::new(
                "rules.severity",
                format!("unknown rule family `{}`", unknown),
            ));
        }
        Ok(())
    }

    pub fn is_family_disabled(&self, family: RuleFamily) -> bool {
        self.disabled.iter().any(|name| name == family.as_str())
    }

    pub fn is_rule_disabled(&self, rule: RuleId) -> bool {
        self.is_family_disabled(rule.family()) || self.disabled.iter().any(|name| name == rule.as_str())
    }

    pub fn severity_for(&self, family: RuleFamily) -> Option<Severity> {
        self.severity.get(family.as_str()).copied()
    }
}

fn parse_rule(name: &str) -> Option<RuleId> {
    RuleId::from_name(name).filter(|rule| rule.family() != RuleFamily::Parse)
}

fn parse_family(name: &str) -> Option<RuleFamily> {
    RuleFamily::ANALYZERS
        .iter()
        .copied()
        .find(|family| family.as_str() == name)
}

use super::{Rule, RuleContext, RuleOutcome};
use crate::config::ComplexityThresholds;
use crate::core::{ConfigError, Declaration, Finding, RuleFamily, RuleId};
use serde::Serialize;
use std::fmt;

/// Letter grade for a cyclomatic complexity score, as popularized by radon.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum ComplexityRank {
    A,
    B,
    C,
    D,
    E,
    F,
}

impl ComplexityRank {
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=5 => ComplexityRank::A,
            6..=10 => ComplexityRank::B,
            11..=20 => ComplexityRank::C,
            21..=30 => ComplexityRank::D,
            31..=40 => ComplexityRank::E,
            _ => ComplexityRank::F,
        }
    }
}

impl fmt::Display for ComplexityRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Cyclomatic complexity: one path plus one per decision point.
pub fn cyclomatic_score(decl: &Declaration) -> u32 {
    1 + decl.branch_count + decl.boolean_operator_count
}

pub struct ComplexityRule {
    max: u32,
}

impl ComplexityRule {
    pub fn new(thresholds: &ComplexityThresholds) -> Result<Self, ConfigError> {
        thresholds.validate()?;
        let max = u32::try_from(thresholds.max).unwrap_or(u32::MAX);
        Ok(Self { max })
    }
}

impl Rule for ComplexityRule {
    fn family(&self) -> RuleFamily {
        RuleFamily::Complexity
    }

    fn check(&self, ctx: &RuleContext<'_>) -> RuleOutcome {
        let findings = ctx
            .model
            .declarations()
            .filter(|(_, decl)| decl.kind.is_callable())
            .filter_map(|(_, decl)| {
                let score = cyclomatic_score(decl);
                (score > self.max).then(|| {
                    Finding::new(
                        RuleId::Complexity,
                        format!(
                            "`{}` has cyclomatic complexity {} (rank {}), maximum is {}",
                            decl.name,
                            score,
                            ComplexityRank::from_score(score),
                            self.max
                        ),
                        decl.span.start.clone(),
                    )
                    .with_declaration(&decl.qualified_name)
                })
            })
            .collect();
        RuleOutcome::Evaluated(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::build_source_model;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn flagged(max: i64, source: &str) -> Vec<String> {
        let model = build_source_model("cc.py", source).unwrap();
        let rule = ComplexityRule::new(&ComplexityThresholds { max }).unwrap();
        match rule.check(&RuleContext::new(&model, None)) {
            RuleOutcome::Evaluated(findings) => findings
                .into_iter()
                .map(|f| f.declaration.unwrap_or_default())
                .collect(),
            RuleOutcome::NotEvaluated => unreachable!(),
        }
    }

    #[test]
    fn test_straight_line_code_never_flagged() {
        assert!(flagged(1, "def f():\n    return 1\n").is_empty());
    }

    #[test]
    fn test_score_counts_branches_and_boolean_operators() {
        let source = indoc! {"
            def classify(n):
                if n < 0 and n != -1:
                    return 'neg'
                elif n == 0:
                    return 'zero'
                for _ in range(n):
                    pass
                return 'pos'
        "};
        let model = build_source_model("cc.py", source).unwrap();
        assert_eq!(cyclomatic_score(model.find("classify").unwrap()), 5);
        assert_eq!(flagged(4, source), vec!["classify"]);
        assert!(flagged(5, source).is_empty());
    }

    #[test]
    fn test_nested_functions_scored_separately() {
        let source = indoc! {"
            def outer(xs):
                def inner(x):
                    if x:
                        return 1
                    if not x:
                        return 2
                    return 3
                return [inner(x) for x in xs]
        "};
        assert_eq!(flagged(2, source), vec!["outer.inner"]);
    }

    #[test]
    fn test_non_positive_max_rejected() {
        assert!(ComplexityRule::new(&ComplexityThresholds { max: 0 }).is_err());
        assert!(ComplexityRule::new(&ComplexityThresholds { max: -5 }).is_err());
    }

    #[test]
    fn test_rank_boundaries() {
        assert_eq!(ComplexityRank::from_score(1), ComplexityRank::A);
        assert_eq!(ComplexityRank::from_score(5), ComplexityRank::A);
        assert_eq!(ComplexityRank::from_score(6), ComplexityRank::B);
        assert_eq!(ComplexityRank::from_score(20), ComplexityRank::C);
        assert_eq!(ComplexityRank::from_score(21), ComplexityRank::D);
        assert_eq!(ComplexityRank::from_score(40), ComplexityRank::E);
        assert_eq!(ComplexityRank::from_score(41), ComplexityRank::F);
    }
}

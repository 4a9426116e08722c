use super::{Rule, RuleContext, RuleOutcome};
use crate::config::DesignThresholds;
use crate::core::{Finding, RuleFamily, RuleId, SourceModel};

/// Debugging leftovers: debugger imports and hooks, stray prints.
pub struct DesignRule {
    forbid_print: bool,
    debug_modules: Vec<String>,
}

impl DesignRule {
    pub fn new(thresholds: &DesignThresholds) -> Self {
        Self {
            forbid_print: thresholds.forbid_print,
            debug_modules: thresholds.debug_modules.clone(),
        }
    }

    fn is_debug_module(&self, module: &str) -> bool {
        let root = module.split('.').next().unwrap_or(module);
        self.debug_modules.iter().any(|m| m == root)
    }

    fn check_imports(&self, model: &SourceModel, findings: &mut Vec<Finding>) {
        for import in model.imports() {
            if self.is_debug_module(&import.module) {
                findings.push(Finding::new(
                    RuleId::Debugger,
                    format!("debugger module `{}` imported", import.module),
                    import.position.clone(),
                ));
            }
        }
    }

    fn check_calls(&self, model: &SourceModel, findings: &mut Vec<Finding>) {
        for call in model.calls() {
            let callee = call.callee.as_str();
            let is_debugger_hook = callee == "breakpoint"
                || callee
                    .strip_suffix(".set_trace")
                    .is_some_and(|module| self.is_debug_module(module));

            if is_debugger_hook {
                findings.push(Finding::new(
                    RuleId::Debugger,
                    format!("debugger call `{}()` left in code", callee),
                    call.position.clone(),
                ));
            } else if self.forbid_print && callee == "print" {
                findings.push(Finding::new(
                    RuleId::PrintCall,
                    "`print` call left in code",
                    call.position.clone(),
                ));
            }
        }
    }
}

impl Rule for DesignRule {
    fn family(&self) -> RuleFamily {
        RuleFamily::Design
    }

    fn check(&self, ctx: &RuleContext<'_>) -> RuleOutcome {
        let mut findings = Vec::new();
        self.check_imports(ctx.model, &mut findings);
        self.check_calls(ctx.model, &mut findings);
        RuleOutcome::Evaluated(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::build_source_model;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn check(thresholds: &DesignThresholds, source: &str) -> Vec<(RuleId, usize)> {
        let model = build_source_model("design.py", source).unwrap();
        match DesignRule::new(thresholds).check(&RuleContext::new(&model, None)) {
            RuleOutcome::Evaluated(findings) => {
                findings.into_iter().map(|f| (f.rule, f.location.line)).collect()
            }
            RuleOutcome::NotEvaluated => unreachable!(),
        }
    }

    #[test]
    fn test_debugger_hooks() {
        let source = indoc! {"
            import pdb

            def run():
                pdb.set_trace()
                breakpoint()
                obj.set_trace()
        "};
        assert_eq!(
            check(&DesignThresholds::default(), source),
            vec![(RuleId::Debugger, 1), (RuleId::Debugger, 4), (RuleId::Debugger, 5)]
        );
    }

    #[test]
    fn test_print_calls() {
        let source = "def run():\n    print('hi')\n    logger.print('ok')\n";
        assert_eq!(
            check(&DesignThresholds::default(), source),
            vec![(RuleId::PrintCall, 2)]
        );
        let allowed = DesignThresholds {
            forbid_print: false,
            ..Default::default()
        };
        assert_eq!(check(&allowed, source), vec![]);
    }
}

//! End-to-end checks of single files through the public API.

use indoc::indoc;
use pretty_assertions::assert_eq;
use pycomply::config::ComplianceConfig;
use pycomply::rules::coverage::coverage_ratio;
use pycomply::{
    build_source_model, check_source, CoverageMap, RuleFamily, RuleId, RuleStatus, Severity,
    SourceInput, Verdict,
};

fn rules_of(report: &pycomply::Report) -> Vec<RuleId> {
    report.findings.iter().map(|f| f.rule).collect()
}

#[test]
fn undocumented_nested_ifs_fail_complexity_and_doc() {
    let source = indoc! {"
        def check(a, b, c):
            if a:
                if b:
                    if c:
                        return 1
            return 0
    "};
    let mut config = ComplianceConfig::default();
    config.complexity.max = 3;

    let report = check_source(&SourceInput::new("a.py", source), None, &config).unwrap();

    // Both sit on the `def` line; rule ids break the tie.
    assert_eq!(rules_of(&report), vec![RuleId::Complexity, RuleId::DocMissing]);
    assert!(report.findings.iter().all(|f| f.severity == Severity::Error));
    assert!(report.findings[0].message.contains("complexity 4"));
    assert_eq!(report.verdict, Verdict::Fail);
    assert_eq!(report.status(RuleFamily::Complexity), RuleStatus::Failed);
    assert_eq!(report.status(RuleFamily::Doc), RuleStatus::Failed);
}

#[test]
fn documented_module_without_coverage_passes() {
    let source = indoc! {r#"
        """Shopping cart helpers."""


        def total(items):
            """Sum the quantities of all items."""
            return sum(item.quantity for item in items)


        class Cart:
            """A shopping cart of items."""

            def add(self, item):
                """Add an item to the cart."""
                self.items.append(item)
    "#};

    let report = check_source(
        &SourceInput::new("cart.py", source),
        None,
        &ComplianceConfig::default(),
    )
    .unwrap();

    assert_eq!(report.findings, vec![]);
    assert_eq!(report.verdict, Verdict::Pass);
    assert_eq!(report.status(RuleFamily::Coverage), RuleStatus::NotEvaluated);
    assert_eq!(report.status(RuleFamily::Doc), RuleStatus::Passed);
}

#[test]
fn invalid_syntax_yields_single_parse_error() {
    let source = "x = 1\ny = 2\nvalue = = 3\n";

    let report = check_source(
        &SourceInput::new("broken.py", source),
        None,
        &ComplianceConfig::default(),
    )
    .unwrap();

    assert_eq!(rules_of(&report), vec![RuleId::ParseError]);
    assert_eq!(report.findings[0].location.file, "broken.py");
    assert_eq!(report.findings[0].location.line, 3);
    assert_eq!(report.verdict, Verdict::Fail);
}

#[test]
fn parent_ratio_ignores_child_lines() {
    let source = indoc! {r#"
        """Scenario module."""
        # Lines up to nine carry no code.







        def parent(items):
            total = 0
            for item in items:
                total += item
            if total > 10:
                total = 10
            def child():
                a = 1
                b = 2
                c = a + b
                return c
    "#};
    let model = build_source_model("d.py", source).unwrap();
    let parent = model.declarations().find(|(_, d)| d.name == "parent").unwrap();
    let child = model.declarations().find(|(_, d)| d.name == "child").unwrap();
    assert_eq!(parent.1.span.start.line, 10);
    assert_eq!(parent.1.span.end.line, 20);
    assert_eq!(child.1.span.start.line, 16);

    let coverage: CoverageMap = (10..=20).map(|line| (line, line <= 15)).collect();
    assert_eq!(coverage_ratio(&model, parent.0, &coverage), 1.0);
    assert_eq!(coverage_ratio(&model, child.0, &coverage), 0.0);

    let mut full = coverage.clone();
    full.extend((16..=20).map(|line| (line, true)));
    let mut config = ComplianceConfig::default();
    config.rules.disabled = vec!["doc".to_string()];
    let report = check_source(&SourceInput::new("d.py", source), Some(&full), &config).unwrap();
    assert_eq!(report.findings, vec![]);
    assert_eq!(report.status(RuleFamily::Coverage), RuleStatus::Passed);
}

#[test]
fn disabled_rule_is_silenced_but_family_still_runs() {
    let source = "import os\n\n\ndef Main():\n    \"\"\"Entry point of the tool.\"\"\"\n";
    let mut config = ComplianceConfig::default();
    config.rules.disabled = vec!["unused-import".to_string()];

    let report = check_source(&SourceInput::new("m.py", source), None, &config).unwrap();

    assert_eq!(rules_of(&report), vec![RuleId::Naming]);
    assert_eq!(report.status(RuleFamily::Style), RuleStatus::Failed);
}

#[test]
fn design_leftovers_are_reported() {
    let source = indoc! {r#"
        import pdb


        def run(job):
            """Run one job and report."""
            pdb.set_trace()
            print(job)
    "#};
    let report = check_source(
        &SourceInput::new("job.py", source),
        None,
        &ComplianceConfig::default(),
    )
    .unwrap();

    assert_eq!(
        rules_of(&report),
        vec![RuleId::Debugger, RuleId::Debugger, RuleId::PrintCall]
    );
}

use super::{Rule, RuleContext, RuleOutcome};
use crate::config::StyleThresholds;
use crate::core::{
    ConfigError, DeclarationKind, Finding, ImportStmt, RuleFamily, RuleId, SourceModel,
    SourcePosition,
};
use regex::Regex;
use std::collections::HashSet;

/// Line hygiene, naming conventions and import discipline.
pub struct StyleRule {
    max_line_length: usize,
    function_pattern: Regex,
    class_pattern: Regex,
    variable_pattern: Regex,
    check_imports: bool,
}

impl StyleRule {
    pub fn new(thresholds: &StyleThresholds) -> Result<Self, ConfigError> {
        thresholds.validate()?;
        Ok(Self {
            max_line_length: thresholds.max_line_length,
            function_pattern: compile("style.function_pattern", &thresholds.function_pattern)?,
            class_pattern: compile("style.class_pattern", &thresholds.class_pattern)?,
            variable_pattern: compile("style.variable_pattern", &thresholds.variable_pattern)?,
            check_imports: thresholds.check_imports,
        })
    }

    fn check_lines(&self, model: &SourceModel, findings: &mut Vec<Finding>) {
        for (index, line) in model.lines().iter().enumerate() {
            let line_number = index + 1;
            let length = line.chars().count();
            if length > self.max_line_length {
                findings.push(Finding::new(
                    RuleId::LineTooLong,
                    format!(
                        "line is {} characters long, maximum is {}",
                        length, self.max_line_length
                    ),
                    SourcePosition::new(model.file(), line_number, self.max_line_length + 1),
                ));
            }

            let trimmed = line.trim_end().chars().count();
            if trimmed < length {
                findings.push(Finding::new(
                    RuleId::TrailingWhitespace,
                    "trailing whitespace",
                    SourcePosition::new(model.file(), line_number, trimmed + 1),
                ));
            }
        }
    }

    fn check_naming(&self, model: &SourceModel, findings: &mut Vec<Finding>) {
        for (_, decl) in model.declarations() {
            let (pattern, label) = match decl.kind {
                DeclarationKind::Module => continue,
                DeclarationKind::Class => (&self.class_pattern, "class"),
                DeclarationKind::Function => (&self.function_pattern, "function"),
                DeclarationKind::Method => (&self.function_pattern, "method"),
            };
            if !pattern.is_match(&decl.name) {
                findings.push(
                    Finding::new(
                        RuleId::Naming,
                        naming_message(label, &decl.name, pattern),
                        decl.span.start.clone(),
                    )
                    .with_declaration(&decl.qualified_name),
                );
            }
        }

        let mut seen = HashSet::new();
        for binding in model.bindings() {
            if !seen.insert((binding.scope, binding.name.as_str())) {
                continue;
            }
            if !self.variable_pattern.is_match(&binding.name) {
                findings.push(Finding::new(
                    RuleId::Naming,
                    naming_message("variable", &binding.name, &self.variable_pattern),
                    binding.position.clone(),
                ));
            }
        }
    }

    fn check_imports(&self, model: &SourceModel, findings: &mut Vec<Finding>) {
        for import in model.imports() {
            if import.top_level && import.follows_code && !import.is_future() {
                findings.push(Finding::new(
                    RuleId::ImportPosition,
                    format!("import of `{}` is not at the top of the file", import.module),
                    import.position.clone(),
                ));
            }
        }

        let top_level: Vec<&ImportStmt> = model.imports().iter().filter(|i| i.top_level).collect();
        for pair in top_level.windows(2) {
            let (previous, current) = (pair[0], pair[1]);
            if starts_new_block(model, previous, current) {
                continue;
            }
            if sort_key(&current.module) < sort_key(&previous.module) {
                findings.push(Finding::new(
                    RuleId::ImportOrder,
                    format!(
                        "import of `{}` should come before `{}`",
                        current.module, previous.module
                    ),
                    current.position.clone(),
                ));
            }
        }

        for import in model.imports() {
            if import.is_future() || import.is_star {
                continue;
            }
            for binding in &import.bindings {
                let used = model.references().contains(&binding.name)
                    || model.exports().iter().any(|name| name == &binding.name);
                if !used {
                    findings.push(Finding::new(
                        RuleId::UnusedImport,
                        format!("`{}` is imported but never used", binding.name),
                        binding.position.clone(),
                    ));
                }
            }
        }
    }
}

impl Rule for StyleRule {
    fn family(&self) -> RuleFamily {
        RuleFamily::Style
    }

    fn check(&self, ctx: &RuleContext<'_>) -> RuleOutcome {
        let mut findings = Vec::new();
        self.check_lines(ctx.model, &mut findings);
        self.check_naming(ctx.model, &mut findings);
        if self.check_imports {
            self.check_imports(ctx.model, &mut findings);
        }
        RuleOutcome::Evaluated(findings)
    }
}

fn compile(field: &str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|e| ConfigError::new(field, format!("invalid pattern: {}", e)))
}

fn naming_message(label: &str, name: &str, pattern: &Regex) -> String {
    format!(
        "{} name `{}` does not match `{}`",
        label,
        name,
        pattern.as_str()
    )
}

/// Relative imports go after absolute ones; names compare case-insensitively.
fn sort_key(module: &str) -> (bool, String) {
    (module.starts_with('.'), module.to_lowercase())
}

/// Imports separated by a blank line, or by other code, are ordered
/// independently.
fn starts_new_block(model: &SourceModel, previous: &ImportStmt, current: &ImportStmt) -> bool {
    if previous.follows_code != current.follows_code {
        return true;
    }
    let lines = model.lines();
    (previous.position.line..current.position.line.saturating_sub(1))
        .filter_map(|line| lines.get(line))
        .any(|text| text.trim().is_empty())
}

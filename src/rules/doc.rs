use super::{Rule, RuleContext, RuleOutcome};
use crate::config::DocThresholds;
use crate::core::{Declaration, DeclarationKind, Finding, RuleFamily, RuleId};
use std::collections::HashSet;

/// Docstring presence, length and parameter coverage on the public surface.
pub struct DocRule {
    min_length: usize,
    require_params: bool,
    require_module: bool,
}

impl DocRule {
    pub fn new(thresholds: &DocThresholds) -> Self {
        Self {
            min_length: thresholds.min_length,
            require_params: thresholds.require_params,
            require_module: thresholds.require_module,
        }
    }

    fn check_declaration(&self, decl: &Declaration) -> Option<Finding> {
        let location = decl.span.start.clone();
        let docstring = decl.docstring.as_deref().map(str::trim).unwrap_or("");

        if docstring.is_empty() {
            return Some(
                Finding::new(
                    RuleId::DocMissing,
                    format!("{} `{}` has no docstring", kind_label(decl.kind), decl.name),
                    location,
                )
                .with_declaration(&decl.qualified_name),
            );
        }

        let length = docstring.chars().count();
        if length < self.min_length {
            return Some(
                Finding::new(
                    RuleId::DocTooShort,
                    format!(
                        "docstring of `{}` is {} characters, minimum is {}",
                        decl.name, length, self.min_length
                    ),
                    location,
                )
                .with_declaration(&decl.qualified_name),
            );
        }

        if self.require_params && decl.kind.is_callable() {
            let missing = undocumented_parameters(docstring, &decl.parameters);
            if !missing.is_empty() {
                return Some(
                    Finding::new(
                        RuleId::DocParams,
                        format!(
                            "docstring of `{}` does not mention: {}",
                            decl.name,
                            missing.join(", ")
                        ),
                        location,
                    )
                    .with_declaration(&decl.qualified_name),
                );
            }
        }

        None
    }
}

impl Rule for DocRule {
    fn family(&self) -> RuleFamily {
        RuleFamily::Doc
    }

    fn check(&self, ctx: &RuleContext<'_>) -> RuleOutcome {
        let model = ctx.model;
        let findings = model
            .declarations()
            .filter(|(id, decl)| {
                if decl.kind == DeclarationKind::Module {
                    self.require_module
                } else {
                    model.is_public(*id)
                }
            })
            .filter_map(|(_, decl)| self.check_declaration(decl))
            .collect();
        RuleOutcome::Evaluated(findings)
    }
}

fn kind_label(kind: DeclarationKind) -> &'static str {
    match kind {
        DeclarationKind::Module => "module",
        DeclarationKind::Class => "class",
        DeclarationKind::Function => "function",
        DeclarationKind::Method => "method",
    }
}

/// Parameters whose names never appear as a word of the docstring.
fn undocumented_parameters(docstring: &str, parameters: &[String]) -> Vec<String> {
    let words: HashSet<&str> = docstring
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|word| !word.is_empty())
        .collect();
    parameters
        .iter()
        .filter(|param| !words.contains(param.as_str()))
        .cloned()
        .collect()
}

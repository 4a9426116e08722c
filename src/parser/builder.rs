use super::char_column;
use super::docstrings::{preceding_comment_block, strip_string_literal};
use crate::core::{
    Binding, CallSite, Declaration, DeclarationId, DeclarationKind, ImportBinding, ImportStmt,
    SourceModel, SourcePosition, Span,
};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;
use tree_sitter::{Node, Point};

/// Node kinds that open one extra path through a declaration.
const BRANCH_KINDS: &[&str] = &[
    "if_statement",
    "elif_clause",
    "for_statement",
    "while_statement",
    "except_clause",
    "except_group_clause",
    "conditional_expression",
    "for_in_clause",
    "if_clause",
    "case_clause",
];

const IMPORT_KINDS: &[&str] = &[
    "import_statement",
    "import_from_statement",
    "future_import_statement",
];

/// Single-pass, top-down builder of a [`SourceModel`].
pub(crate) struct ModelBuilder<'a> {
    file: &'a str,
    source: &'a str,
    lines: Vec<String>,
    declarations: Vec<Declaration>,
    qualified_names: HashSet<String>,
    imports: Vec<ImportStmt>,
    references: Vec<(String, DeclarationId)>,
    calls: Vec<CallSite>,
    bindings: Vec<Binding>,
    exports: Vec<String>,
    non_code_lines: BTreeSet<usize>,
}

impl<'a> ModelBuilder<'a> {
    pub(crate) fn new(file: &'a str, source: &'a str) -> Self {
        let lines: Vec<String> = source.lines().map(str::to_string).collect();
        let non_code_lines = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| {
                let trimmed = line.trim();
                trimmed.is_empty() || trimmed.starts_with('#')
            })
            .map(|(index, _)| index + 1)
            .collect();

        Self {
            file,
            source,
            lines,
            declarations: Vec::new(),
            qualified_names: HashSet::new(),
            imports: Vec::new(),
            references: Vec::new(),
            calls: Vec::new(),
            bindings: Vec::new(),
            exports: Vec::new(),
            non_code_lines,
        }
    }

    pub(crate) fn build(mut self, root: Node<'_>) -> SourceModel {
        let root_id = self.push_module(root);

        let mut cursor = root.walk();
        let mut seen_code = false;
        let mut first_statement = true;
        for child in root.named_children(&mut cursor) {
            if child.kind() == "comment" {
                continue;
            }
            if IMPORT_KINDS.contains(&child.kind()) {
                self.record_import(child, true, seen_code);
            } else if !(first_statement && is_docstring_statement(child)) {
                seen_code = true;
                self.visit(child, root_id);
            }
            first_statement = false;
        }

        let references = self.module_references();
        SourceModel {
            file: self.file.to_string(),
            lines: self.lines,
            declarations: self.declarations,
            imports: self.imports,
            references,
            calls: self.calls,
            bindings: self.bindings,
            exports: self.exports,
            non_code_lines: self.non_code_lines,
        }
    }

    fn visit(&mut self, node: Node<'_>, scope: DeclarationId) {
        let kind = node.kind();
        match kind {
            "function_definition" => return self.visit_function(node, scope),
            "class_definition" => return self.visit_class(node, scope),
            _ if IMPORT_KINDS.contains(&kind) => return self.record_import(node, false, false),
            // Only the object side of `a.b` names a binding.
            "attribute" => {
                if let Some(object) = node.child_by_field_name("object") {
                    self.visit(object, scope);
                }
                return;
            }
            "keyword_argument" => {
                if let Some(value) = node.child_by_field_name("value") {
                    self.visit(value, scope);
                }
                return;
            }
            "identifier" => {
                let name = self.text(node);
                self.references.push((name.to_string(), scope));
                return;
            }
            "boolean_operator" => self.declarations[scope.0].boolean_operator_count += 1,
            "call" => self.record_call(node),
            "print_statement" => {
                let position = self.position(node.start_position());
                self.calls.push(CallSite {
                    callee: "print".to_string(),
                    position,
                });
            }
            "assignment" => return self.visit_assignment(node, scope),
            _ if BRANCH_KINDS.contains(&kind) => self.declarations[scope.0].branch_count += 1,
            _ => {}
        }

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.visit(child, scope);
        }
    }

    fn visit_function(&mut self, node: Node<'_>, scope: DeclarationId) {
        let kind = if self.declarations[scope.0].kind == DeclarationKind::Class {
            DeclarationKind::Method
        } else {
            DeclarationKind::Function
        };

        let mut parameters = node
            .child_by_field_name("parameters")
            .map(|params| self.parameter_names(params))
            .unwrap_or_default();
        if kind == DeclarationKind::Method
            && parameters
                .first()
                .is_some_and(|first| first == "self" || first == "cls")
        {
            parameters.remove(0);
        }

        let id = self.push_definition(kind, node, scope, parameters);
        // Defaults and annotations are evaluated where the `def` runs.
        if let Some(params) = node.child_by_field_name("parameters") {
            self.visit_parameters(params, scope);
        }
        for field in ["return_type", "body"] {
            if let Some(child) = node.child_by_field_name(field) {
                self.visit(child, id);
            }
        }
    }

    /// Parameter names bind rather than reference; only annotations and
    /// default values are visited.
    fn visit_parameters(&mut self, params: Node<'_>, scope: DeclarationId) {
        let mut cursor = params.walk();
        for param in params.named_children(&mut cursor) {
            for field in ["type", "value"] {
                if let Some(child) = param.child_by_field_name(field) {
                    self.visit(child, scope);
                }
            }
        }
    }

    fn visit_assignment(&mut self, node: Node<'_>, scope: DeclarationId) {
        self.record_assignment(node, scope);
        if let Some(left) = node.child_by_field_name("left") {
            if left.kind() != "identifier" {
                self.visit(left, scope);
            }
        }
        for field in ["type", "right"] {
            if let Some(child) = node.child_by_field_name(field) {
                self.visit(child, scope);
            }
        }
    }

    fn visit_class(&mut self, node: Node<'_>, scope: DeclarationId) {
        if let Some(superclasses) = node.child_by_field_name("superclasses") {
            self.visit(superclasses, scope);
        }
        let id = self.push_definition(DeclarationKind::Class, node, scope, Vec::new());
        if let Some(body) = node.child_by_field_name("body") {
            self.visit(body, id);
        }
    }

    fn push_module(&mut self, root: Node<'_>) -> DeclarationId {
        let name = module_name(self.file);
        let last_line = self.lines.len().max(1);
        let last_column = self
            .lines
            .last()
            .map(|line| line.chars().count() + 1)
            .unwrap_or(1);
        let docstring = first_statement(root).and_then(|stmt| self.statement_docstring(stmt));

        self.qualified_names.insert(name.clone());
        self.declarations.push(Declaration {
            kind: DeclarationKind::Module,
            qualified_name: name.clone(),
            name,
            span: Span {
                start: SourcePosition::new(self.file, 1, 1),
                end: SourcePosition::new(self.file, last_line, last_column),
            },
            docstring,
            parent: None,
            children: Vec::new(),
            branch_count: 0,
            boolean_operator_count: 0,
            parameters: Vec::new(),
        });
        DeclarationId(0)
    }

    fn push_definition(
        &mut self,
        kind: DeclarationKind,
        node: Node<'_>,
        parent: DeclarationId,
        parameters: Vec<String>,
    ) -> DeclarationId {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_else(|| "<anonymous>".to_string());

        let docstring = node
            .child_by_field_name("body")
            .and_then(first_statement)
            .and_then(|stmt| self.statement_docstring(stmt))
            .or_else(|| preceding_comment_block(&self.lines, anchor_row(node)));

        let span = Span {
            start: self.position(node.start_position()),
            end: self.end_position(node),
        };
        let qualified_name = self.unique_qualified_name(parent, &name, span.start.line);

        let id = DeclarationId(self.declarations.len());
        self.declarations.push(Declaration {
            kind,
            name,
            qualified_name,
            span,
            docstring,
            parent: Some(parent),
            children: Vec::new(),
            branch_count: 0,
            boolean_operator_count: 0,
            parameters,
        });
        self.declarations[parent.0].children.push(id);
        id
    }

    fn unique_qualified_name(&mut self, parent: DeclarationId, name: &str, line: usize) -> String {
        let parent_decl = &self.declarations[parent.0];
        let base = if parent_decl.kind == DeclarationKind::Module {
            name.to_string()
        } else {
            format!("{}.{}", parent_decl.qualified_name, name)
        };
        let qualified = if self.qualified_names.contains(&base) {
            format!("{}@{}", base, line)
        } else {
            base
        };
        self.qualified_names.insert(qualified.clone());
        qualified
    }

    /// Docstring of a leading string statement; marks its lines as non-code.
    fn statement_docstring(&mut self, stmt: Node<'_>) -> Option<String> {
        if !is_docstring_statement(stmt) {
            return None;
        }
        let first = stmt.start_position().row + 1;
        let last = stmt.end_position().row + 1;
        self.non_code_lines.extend(first..=last);

        let literal = stmt.named_child(0)?;
        let literal = if literal.kind() == "concatenated_string" {
            literal.named_child(0)?
        } else {
            literal
        };
        Some(strip_string_literal(self.text(literal)))
    }

    fn parameter_names(&self, params: Node<'_>) -> Vec<String> {
        let mut cursor = params.walk();
        params
            .named_children(&mut cursor)
            .filter_map(|param| match param.kind() {
                "identifier" => Some(param),
                "default_parameter" | "typed_default_parameter" => {
                    param.child_by_field_name("name")
                }
                "typed_parameter" | "list_splat_pattern" | "dictionary_splat_pattern" => {
                    let mut inner = param.walk();
                    let found = param
                        .named_children(&mut inner)
                        .find(|child| child.kind() == "identifier");
                    found.or_else(|| {
                        let mut nested = param.walk();
                        let splat = param.named_children(&mut nested).next();
                        splat.and_then(|s| s.named_child(0))
                    })
                }
                _ => None,
            })
            .filter(|name| name.kind() == "identifier")
            .map(|name| self.text(name).to_string())
            .collect()
    }

    fn record_import(&mut self, node: Node<'_>, top_level: bool, follows_code: bool) {
        let mut bindings = Vec::new();
        let mut module = node
            .child_by_field_name("module_name")
            .map(|m| self.text(m).to_string())
            .unwrap_or_default();
        let is_from = node.kind() != "import_statement";
        if node.kind() == "future_import_statement" {
            module = "__future__".to_string();
        }

        let mut cursor = node.walk();
        for name_node in node.children_by_field_name("name", &mut cursor) {
            let (dotted, alias) = if name_node.kind() == "aliased_import" {
                (
                    name_node.child_by_field_name("name").unwrap_or(name_node),
                    name_node.child_by_field_name("alias"),
                )
            } else {
                (name_node, None)
            };
            let dotted_text = self.text(dotted);
            if !is_from && module.is_empty() {
                module = dotted_text.to_string();
            }
            let bound = match alias {
                Some(alias) => self.text(alias),
                None if is_from => dotted_text,
                None => dotted_text.split('.').next().unwrap_or(dotted_text),
            };
            bindings.push(ImportBinding {
                name: bound.to_string(),
                position: self.position(name_node.start_position()),
            });
        }

        let mut star_cursor = node.walk();
        let is_star = node
            .children(&mut star_cursor)
            .any(|child| child.kind() == "wildcard_import");

        let position = self.position(node.start_position());
        self.imports.push(ImportStmt {
            position,
            module,
            bindings,
            top_level,
            follows_code,
            is_from,
            is_star,
        });
    }

    fn record_call(&mut self, node: Node<'_>) {
        let Some(function) = node.child_by_field_name("function") else {
            return;
        };
        if matches!(function.kind(), "identifier" | "attribute") {
            let callee: String = self
                .text(function)
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            let position = self.position(node.start_position());
            self.calls.push(CallSite { callee, position });
        }
    }

    fn record_assignment(&mut self, node: Node<'_>, scope: DeclarationId) {
        let Some(left) = node.child_by_field_name("left") else {
            return;
        };
        if left.kind() != "identifier" {
            return;
        }
        let name = self.text(left).to_string();

        if name == "__all__" && scope.0 == 0 {
            if let Some(right) = node.child_by_field_name("right") {
                let mut cursor = right.walk();
                let exported: Vec<String> = right
                    .named_children(&mut cursor)
                    .filter(|item| item.kind() == "string")
                    .map(|item| strip_string_literal(self.text(item)))
                    .collect();
                self.exports.extend(exported);
            }
        }

        let position = self.position(left.start_position());
        self.bindings.push(Binding {
            name,
            position,
            scope,
        });
    }

    /// Names read somewhere that resolve to the module scope. A name bound
    /// inside an enclosing function (parameter, assignment target or nested
    /// definition) is local to it. Class bodies never shadow: their reads
    /// fall back to the module.
    fn module_references(&self) -> BTreeSet<String> {
        let mut locals: HashMap<usize, HashSet<&str>> = HashMap::new();
        for (index, decl) in self.declarations.iter().enumerate() {
            let names = locals.entry(index).or_default();
            names.extend(decl.parameters.iter().map(String::as_str));
            names.extend(
                decl.children
                    .iter()
                    .map(|child| self.declarations[child.0].name.as_str()),
            );
        }
        for binding in &self.bindings {
            locals
                .entry(binding.scope.0)
                .or_default()
                .insert(binding.name.as_str());
        }

        let is_local = |name: &str, scope: DeclarationId| {
            let mut current = Some(scope);
            while let Some(id) = current {
                let decl = &self.declarations[id.0];
                if decl.kind.is_callable()
                    && locals.get(&id.0).is_some_and(|names| names.contains(name))
                {
                    return true;
                }
                current = decl.parent;
            }
            false
        };

        self.references
            .iter()
            .filter(|(name, scope)| !is_local(name, *scope))
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn text(&self, node: Node<'_>) -> &'a str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    fn position(&self, point: Point) -> SourcePosition {
        SourcePosition::new(self.file, point.row + 1, char_column(&self.lines, point))
    }

    /// Inclusive end of a node, pulled back onto its last line when the
    /// node ends with a line break.
    fn end_position(&self, node: Node<'_>) -> SourcePosition {
        let end = node.end_position();
        if end.column == 0 && end.row > node.start_position().row {
            let last_line = end.row;
            let column = self
                .lines
                .get(last_line - 1)
                .map(|line| line.chars().count() + 1)
                .unwrap_or(1);
            return SourcePosition::new(self.file, last_line, column);
        }
        self.position(end)
    }
}

fn first_statement(body: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = body.walk();
    let first = body
        .named_children(&mut cursor)
        .find(|child| child.kind() != "comment");
    first
}

fn is_docstring_statement(stmt: Node<'_>) -> bool {
    stmt.kind() == "expression_statement"
        && stmt
            .named_child(0)
            .is_some_and(|expr| matches!(expr.kind(), "string" | "concatenated_string"))
}

/// Row the definition visually starts on: its first decorator if any.
fn anchor_row(node: Node<'_>) -> usize {
    node.parent()
        .filter(|parent| parent.kind() == "decorated_definition")
        .unwrap_or(node)
        .start_position()
        .row
}

/// Module name derived from the file identity; packages use their
/// directory name.
fn module_name(file: &str) -> String {
    let path = Path::new(file);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    if stem == "__init__" {
        if let Some(dir) = path.parent().and_then(|p| p.file_name()) {
            return dir.to_string_lossy().to_string();
        }
    }
    if stem.is_empty() {
        "<module>".to_string()
    } else {
        stem
    }
}

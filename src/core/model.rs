//! Structural model of one parsed source file.
//!
//! Declarations live in an arena owned by the [`SourceModel`] and are stored
//! in pre-order, so iterating the arena is the same as a top-down traversal
//! of the tree. Parent links are plain [`DeclarationId`] indices: they are
//! used for lookups only and never own anything.

use super::{SourcePosition, Span};
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclarationId(pub(crate) usize);

impl DeclarationId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    Module,
    Class,
    Function,
    Method,
}

impl DeclarationKind {
    pub fn is_callable(&self) -> bool {
        matches!(self, DeclarationKind::Function | DeclarationKind::Method)
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Declaration {
    pub kind: DeclarationKind,
    pub name: String,
    pub qualified_name: String,
    pub span: Span,
    pub docstring: Option<String>,
    pub parent: Option<DeclarationId>,
    pub children: Vec<DeclarationId>,
    pub branch_count: u32,
    pub boolean_operator_count: u32,
    /// Parameter names, without a leading `self`/`cls` on methods.
    pub parameters: Vec<String>,
}

impl Declaration {
    pub fn has_private_name(&self) -> bool {
        self.name.starts_with('_')
    }
}

/// A name bound by an import statement.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ImportBinding {
    pub name: String,
    pub position: SourcePosition,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ImportStmt {
    pub position: SourcePosition,
    /// Dotted module path, e.g. `os.path` or `.sibling`.
    pub module: String,
    pub bindings: Vec<ImportBinding>,
    /// Direct child of the module rather than nested in a block.
    pub top_level: bool,
    /// A module-level statement other than an import or the module
    /// docstring appears before this import.
    pub follows_code: bool,
    pub is_from: bool,
    pub is_star: bool,
}

impl ImportStmt {
    pub fn is_future(&self) -> bool {
        self.module == "__future__"
    }
}

/// A call expression, named by the dotted text of its callee.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct CallSite {
    pub callee: String,
    pub position: SourcePosition,
}

/// A simple `name = ...` assignment target.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    pub position: SourcePosition,
    pub scope: DeclarationId,
}

#[derive(Debug, Serialize)]
pub struct SourceModel {
    pub(crate) file: String,
    pub(crate) lines: Vec<String>,
    pub(crate) declarations: Vec<Declaration>,
    pub(crate) imports: Vec<ImportStmt>,
    pub(crate) references: BTreeSet<String>,
    pub(crate) calls: Vec<CallSite>,
    pub(crate) bindings: Vec<Binding>,
    pub(crate) exports: Vec<String>,
    pub(crate) non_code_lines: BTreeSet<usize>,
}

impl SourceModel {
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Raw source lines without line terminators.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn root(&self) -> DeclarationId {
        DeclarationId(0)
    }

    pub fn declaration(&self, id: DeclarationId) -> &Declaration {
        &self.declarations[id.0]
    }

    /// All declarations in traversal order, module first.
    pub fn declarations(&self) -> impl Iterator<Item = (DeclarationId, &Declaration)> + '_ {
        self.declarations
            .iter()
            .enumerate()
            .map(|(index, decl)| (DeclarationId(index), decl))
    }

    pub fn find(&self, qualified_name: &str) -> Option<&Declaration> {
        self.declarations
            .iter()
            .find(|decl| decl.qualified_name == qualified_name)
    }

    pub fn parent(&self, id: DeclarationId) -> Option<&Declaration> {
        self.declaration(id).parent.map(|parent| self.declaration(parent))
    }

    pub fn imports(&self) -> &[ImportStmt] {
        &self.imports
    }

    /// Names read outside import statements that resolve to module scope.
    /// Reads of a function's own parameters or locals are not included.
    pub fn references(&self) -> &BTreeSet<String> {
        &self.references
    }

    pub fn calls(&self) -> &[CallSite] {
        &self.calls
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// String entries of a module-level `__all__`.
    pub fn exports(&self) -> &[String] {
        &self.exports
    }

    /// Blank, comment-only and docstring lines.
    pub fn is_non_code_line(&self, line: usize) -> bool {
        self.non_code_lines.contains(&line)
    }

    /// Whether a declaration is part of the file's public surface.
    ///
    /// A declaration is public when neither it nor any enclosing class has a
    /// `_`-prefixed name and it is not nested inside a function body.
    pub fn is_public(&self, id: DeclarationId) -> bool {
        let mut current = Some(id);
        while let Some(decl_id) = current {
            let decl = self.declaration(decl_id);
            if decl.kind == DeclarationKind::Module {
                return true;
            }
            if decl.has_private_name() {
                return false;
            }
            let parent = decl.parent;
            if let Some(parent_id) = parent {
                if self.declaration(parent_id).kind.is_callable() {
                    return false;
                }
            }
            current = parent;
        }
        true
    }

    /// Code lines that belong to a declaration itself rather than to one of
    /// its children.
    pub fn own_code_lines(&self, id: DeclarationId) -> Vec<usize> {
        let decl = self.declaration(id);
        let last_line = decl.span.end.line.min(self.lines.len().max(1));
        (decl.span.start.line..=last_line)
            .filter(|line| !self.is_non_code_line(*line))
            .filter(|line| {
                !decl
                    .children
                    .iter()
                    .any(|child| self.declaration(*child).span.contains_line(*line))
            })
            .collect()
    }
}

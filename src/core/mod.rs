pub mod errors;
pub mod model;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use errors::{ConfigError, Error, ParseError, Result};
pub use model::{
    Binding, CallSite, Declaration, DeclarationId, DeclarationKind, ImportBinding, ImportStmt,
    SourceModel,
};

/// A point in an analyzed file. Lines and columns are 1-based.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SourcePosition {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl SourcePosition {
    pub fn new(file: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Inclusive source range of a declaration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Span {
    pub start: SourcePosition,
    pub end: SourcePosition,
}

impl Span {
    pub fn contains_line(&self, line: usize) -> bool {
        self.start.line <= line && line <= self.end.line
    }

    pub fn contains(&self, other: &Span) -> bool {
        let start = (self.start.line, self.start.column);
        let end = (self.end.line, self.end.column);
        start <= (other.start.line, other.start.column) && (other.end.line, other.end.column) <= end
    }

    /// Lines covered by this span, first to last.
    pub fn lines(&self) -> std::ops::RangeInclusive<usize> {
        self.start.line..=self.end.line
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        f.write_str(label)
    }
}

/// The analyzer a rule belongs to. Report summaries are kept per family.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum RuleFamily {
    Parse,
    Doc,
    Style,
    Complexity,
    Coverage,
    Design,
}

impl RuleFamily {
    pub const ANALYZERS: [RuleFamily; 5] = [
        RuleFamily::Doc,
        RuleFamily::Style,
        RuleFamily::Complexity,
        RuleFamily::Coverage,
        RuleFamily::Design,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleFamily::Parse => "parse",
            RuleFamily::Doc => "doc",
            RuleFamily::Style => "style",
            RuleFamily::Complexity => "complexity",
            RuleFamily::Coverage => "coverage",
            RuleFamily::Design => "design",
        }
    }

    /// Severity a family reports at unless overridden in configuration.
    pub fn default_severity(&self) -> Severity {
        match self {
            RuleFamily::Coverage => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for RuleFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum RuleId {
    ParseError,
    DocMissing,
    DocTooShort,
    DocParams,
    LineTooLong,
    TrailingWhitespace,
    Naming,
    ImportOrder,
    ImportPosition,
    UnusedImport,
    Complexity,
    Coverage,
    Debugger,
    PrintCall,
}

impl RuleId {
    pub const ALL: [RuleId; 14] = [
        RuleId::ParseError,
        RuleId::DocMissing,
        RuleId::DocTooShort,
        RuleId::DocParams,
        RuleId::LineTooLong,
        RuleId::TrailingWhitespace,
        RuleId::Naming,
        RuleId::ImportOrder,
        RuleId::ImportPosition,
        RuleId::UnusedImport,
        RuleId::Complexity,
        RuleId::Coverage,
        RuleId::Debugger,
        RuleId::PrintCall,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::ParseError => "parse-error",
            RuleId::DocMissing => "doc-missing",
            RuleId::DocTooShort => "doc-too-short",
            RuleId::DocParams => "doc-params",
            RuleId::LineTooLong => "line-too-long",
            RuleId::TrailingWhitespace => "trailing-whitespace",
            RuleId::Naming => "naming",
            RuleId::ImportOrder => "import-order",
            RuleId::ImportPosition => "import-position",
            RuleId::UnusedImport => "unused-import",
            RuleId::Complexity => "complexity",
            RuleId::Coverage => "coverage",
            RuleId::Debugger => "debugger",
            RuleId::PrintCall => "print-call",
        }
    }

    pub fn family(&self) -> RuleFamily {
        match self {
            RuleId::ParseError => RuleFamily::Parse,
            RuleId::DocMissing | RuleId::DocTooShort | RuleId::DocParams => RuleFamily::Doc,
            RuleId::LineTooLong
            | RuleId::TrailingWhitespace
            | RuleId::Naming
            | RuleId::ImportOrder
            | RuleId::ImportPosition
            | RuleId::UnusedImport => RuleFamily::Style,
            RuleId::Complexity => RuleFamily::Complexity,
            RuleId::Coverage => RuleFamily::Coverage,
            RuleId::Debugger | RuleId::PrintCall => RuleFamily::Design,
        }
    }

    pub fn from_name(name: &str) -> Option<RuleId> {
        Self::ALL.iter().copied().find(|id| id.as_str() == name)
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reported rule violation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Finding {
    pub rule: RuleId,
    pub severity: Severity,
    pub message: String,
    pub location: SourcePosition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declaration: Option<String>,
}

impl Finding {
    /// A finding at the family's default severity.
    pub fn new(rule: RuleId, message: impl Into<String>, location: SourcePosition) -> Self {
        Self {
            rule,
            severity: rule.family().default_severity(),
            message: message.into(),
            location,
            declaration: None,
        }
    }

    pub fn with_declaration(mut self, qualified_name: impl Into<String>) -> Self {
        self.declaration = Some(qualified_name.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl From<&ParseError> for Finding {
    fn from(err: &ParseError) -> Self {
        Finding::new(
            RuleId::ParseError,
            err.message.clone(),
            SourcePosition::new(err.file.clone(), err.line, err.column),
        )
    }
}

//! Structured diagnostics emitted during parsing.
//!
//! No diagnostic ever aborts a parse: the contract is "parse always produces
//! a tree plus a diagnostic list" (see the error-handling taxonomy).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A stable identifier for a diagnostic's message template, independent of
/// the literal text (the literal wording of messages is out of scope).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticCode {
    UnterminatedBlock,
    DanglingAttributeBag,
    UnresolvedCrossReference,
    CircularInclude,
    IncludeNotFound,
    IncludePathEscapesBase,
    DisallowedLinkScheme,
    UnrecognizedEscape,
    MaxNestingDepthExceeded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl Diagnostic {
    pub fn new(severity: Severity, code: DiagnosticCode, message: impl Into<String>, line: usize, column: usize) -> Self {
        Self { severity, code, message: message.into(), line, column }
    }

    pub fn warning(code: DiagnosticCode, message: impl Into<String>, line: usize) -> Self {
        Self::new(Severity::Warning, code, message, line, 1)
    }

    pub fn error(code: DiagnosticCode, message: impl Into<String>, line: usize) -> Self {
        Self::new(Severity::Error, code, message, line, 1)
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} at {}:{}: {}", self.severity, self.line, self.column, self.message)
    }
}

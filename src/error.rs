//! Errors surfaced at the API boundary: argument errors and IO failures.
//! Parsing itself never returns an error — see [`crate::parser::Diagnostic`]
//! for the "always produces a tree plus diagnostics" contract this type sits
//! outside of.

use std::fmt;
use std::path::PathBuf;

use crate::parser::Diagnostic;

#[derive(Debug)]
pub enum ProcessError {
    /// A required argument was missing or empty (e.g. an empty path).
    InvalidArgument(String),
    /// The input file could not be read.
    Io { path: PathBuf, source: std::io::Error },
    /// File content was not valid UTF-8.
    InvalidEncoding(PathBuf),
    /// At least one diagnostic at `Severity::Error` was recorded during a
    /// parse that otherwise completed.
    WithDiagnostics(Vec<Diagnostic>),
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            ProcessError::Io { path, source } => write!(f, "failed to read {}: {source}", path.display()),
            ProcessError::InvalidEncoding(path) => write!(f, "{} is not valid UTF-8", path.display()),
            ProcessError::WithDiagnostics(diagnostics) => {
                write!(f, "parse completed with {} error diagnostic(s)", diagnostics.len())
            }
        }
    }
}

impl std::error::Error for ProcessError {}

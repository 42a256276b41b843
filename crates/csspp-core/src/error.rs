use std::fmt;
use std::path::PathBuf;

use crate::diagnostic::Diagnostic;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    pub const fn dummy() -> Self {
        Self { line: 0, column: 0 }
    }

    /// Position of a byte offset within `source`.
    pub fn locate(source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let before = &source[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() + 1;
        Self { line, column }
    }

    pub fn is_dummy(&self) -> bool {
        self.line == 0 && self.column == 0
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dummy() {
            write!(f, "<unknown>")
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

/// Errors raised by the CSS++ pipeline and the build adapter.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed block structure (unclosed `{`, stray `}`, broken `@theme`).
    #[error("syntax error at {span}: {message}")]
    Syntax { message: String, span: Span },

    /// Every validation error recorded for a sheet.
    #[error("{} validation error(s):\n{}", .diagnostics.len(), join_lines(.diagnostics))]
    Validation { diagnostics: Vec<Diagnostic> },

    /// A CSS++ property that has no lowering rule reached the transformer.
    #[error("no lowering rule for CSS++ property '{property}' in '{selector}'")]
    ClassifierInvariant { selector: String, property: String },

    #[error("failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("invalid config '{path}': {message}")]
    Config { path: PathBuf, message: String },
}

impl Error {
    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        Self::Syntax {
            message: message.into(),
            span,
        }
    }

    pub fn classifier_invariant(selector: impl Into<String>, property: impl Into<String>) -> Self {
        Self::ClassifierInvariant {
            selector: selector.into(),
            property: property.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }
}

fn join_lines(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| format!("  {}", d))
        .collect::<Vec<_>>()
        .join("\n")
}

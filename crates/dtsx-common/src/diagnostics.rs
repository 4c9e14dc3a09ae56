//! Diagnostic and error types.
//!
//! Matches the taxonomy in spec §7: `ParseError` is the one fatal,
//! locatable error the core can return; everything else (unsupported
//! constructs, inference fallbacks) is recorded as a non-fatal warning
//! alongside a successful result.

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticCategory {
    Warning,
    Error,
}

/// A single parse or extraction failure, localized to a position.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ParseError {
    pub line: u32,
    pub column: u32,
    pub message: String,
    pub suggestion: Option<String>,
}

impl ParseError {
    pub fn new(line: u32, column: u32, message: impl Into<String>) -> Self {
        Self { line, column, message: message.into(), suggestion: None }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)?;
        if let Some(s) = &self.suggestion {
            write!(f, " (help: {s})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// A non-fatal diagnostic collected alongside a successful transform:
/// `UnsupportedConstruct` or an internal-invariant bug report. Plain
/// `InferenceFallback`s are not collected here — they resolve silently to
/// `unknown`/`any` per spec §7.
#[derive(Clone, Debug, Serialize)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub line: u32,
    pub column: u32,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(line: u32, column: u32, message: impl Into<String>) -> Self {
        Self { category: DiagnosticCategory::Warning, line, column, message: message.into() }
    }

    pub fn error(line: u32, column: u32, message: impl Into<String>) -> Self {
        Self { category: DiagnosticCategory::Error, line, column, message: message.into() }
    }
}

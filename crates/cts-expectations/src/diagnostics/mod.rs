//! Messages raised while updating or validating an expectation document.
//!
//! Diagnostics point at a 1-based line of the document. Line 0 means the
//! diagnostic has no location, e.g. when it is raised for a generated
//! expectation.

mod printer;

#[cfg(test)]
mod tests;

use std::fmt;

use rowan::TextRange;

pub use printer::DiagnosticsPrinter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub line: usize,
    pub message: String,
    /// Byte range in the document. When absent the whole line is used.
    pub range: Option<TextRange>,
}

impl Diagnostic {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.line, self.severity, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    messages: Vec<Diagnostic>,
}

#[must_use = "diagnostic not emitted, call .emit()"]
pub struct DiagnosticBuilder<'a> {
    diagnostics: &'a mut Diagnostics,
    message: Diagnostic,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Create a diagnostic with the given severity at `line`.
    ///
    /// The message is empty until `.message()` is called on the builder.
    pub fn report(&mut self, severity: Severity, line: usize) -> DiagnosticBuilder<'_> {
        DiagnosticBuilder {
            diagnostics: self,
            message: Diagnostic {
                severity,
                line,
                message: String::new(),
                range: None,
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(|d| d.is_error())
    }

    pub fn error_count(&self) -> usize {
        self.messages.iter().filter(|d| d.is_error()).count()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.messages.iter()
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.messages.extend(other.messages);
    }

    /// Stable-sorts the diagnostics by line.
    pub fn sort_by_line(&mut self) {
        self.messages.sort_by_key(|d| d.line);
    }

    pub fn printer(&self) -> DiagnosticsPrinter<'_, '_> {
        DiagnosticsPrinter::new(self)
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for d in &self.messages {
            writeln!(f, "{d}")?;
        }
        Ok(())
    }
}

impl From<&crate::Error> for Diagnostics {
    /// A syntax error becomes a located error diagnostic; anything else stays unlocated.
    fn from(err: &crate::Error) -> Self {
        let mut diagnostics = Diagnostics::new();
        match err {
            crate::Error::Syntax {
                line,
                span,
                message,
            } => diagnostics
                .report(Severity::Error, *line)
                .range(*span)
                .message(message.clone())
                .emit(),
            other => diagnostics
                .report(Severity::Error, 0)
                .message(other.to_string())
                .emit(),
        }
        diagnostics
    }
}

impl<'a> DiagnosticBuilder<'a> {
    pub fn message(mut self, msg: impl Into<String>) -> Self {
        self.message.message = msg.into();
        self
    }

    /// Narrow the diagnostic to a byte range of the document.
    pub fn range(mut self, range: TextRange) -> Self {
        self.message.range = Some(range);
        self
    }

    pub fn emit(self) {
        self.diagnostics.messages.push(self.message);
    }
}

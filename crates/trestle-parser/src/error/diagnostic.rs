//! The core diagnostic type.

use std::fmt;

use crate::{
    error::{ErrorCode, Label},
    span::Span,
};

/// A single error found in the grammar source.
///
/// Rendered on one line as `error[E101]: incomplete input`; the CLI adds the
/// labeled source snippet and the help text underneath.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    code: Option<ErrorCode>,
    message: String,
    labels: Vec<Label>,
    help: Option<String>,
}

impl Diagnostic {
    /// Creates a diagnostic with no code, labels or help.
    ///
    /// ```
    /// # use trestle_parser::error::{Diagnostic, ErrorCode};
    /// # use trestle_parser::Span;
    /// let diag = Diagnostic::error("unexpected character `#`")
    ///     .with_code(ErrorCode::E100)
    ///     .with_label(Span::new(7..8), "not part of the notation");
    /// assert_eq!(diag.labels().len(), 1);
    /// ```
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            labels: Vec::new(),
            help: None,
        }
    }

    /// The stable code identifying the kind of problem, if one was set.
    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    /// The one-line description of the problem.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Source spans in the order they were added; the first is primary.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// A suggestion for fixing the grammar, if any.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Sets the error code.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Adds a primary label.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    /// Adds a secondary label.
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    /// Sets the help text, replacing any earlier one.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error")?;
        if let Some(code) = self.code {
            write!(f, "[{code}]")?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_builder_chain() {
        let diag = Diagnostic::error("group is never closed")
            .with_code(ErrorCode::E101)
            .with_label(Span::new(40..40), "input ends here")
            .with_secondary_label(Span::new(10..11), "group opened here")
            .with_help("add `)`");

        assert_eq!(diag.code(), Some(ErrorCode::E101));
        assert_eq!(diag.message(), "group is never closed");
        assert_eq!(diag.labels().len(), 2);
        assert!(diag.labels()[0].is_primary());
        assert!(!diag.labels()[1].is_primary());
        assert_eq!(diag.help(), Some("add `)`"));
    }

    #[test]
    fn test_diagnostic_display_without_code() {
        let diag = Diagnostic::error("production body is missing");
        assert_eq!(diag.to_string(), "error: production body is missing");
    }

    #[test]
    fn test_later_help_replaces_earlier() {
        let diag = Diagnostic::error("incomplete input")
            .with_help("add `.`")
            .with_help("end the production with `.` or `;`");
        assert_eq!(diag.help(), Some("end the production with `.` or `;`"));
    }
}

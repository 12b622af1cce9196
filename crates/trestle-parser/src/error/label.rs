//! Labeled source spans for diagnostic messages.

use crate::span::Span;

/// A message attached to a span of the grammar source.
///
/// A diagnostic usually has one primary label marking where the problem is
/// and optional secondary labels giving context, such as where an unclosed
/// group was opened.
#[derive(Debug, Clone)]
pub struct Label {
    span: Span,
    message: String,
    is_primary: bool,
}

impl Label {
    /// A label marking where the problem is.
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    /// A label giving context for the primary one.
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: false,
        }
    }

    /// The byte range of the source this label points at.
    pub fn span(&self) -> Span {
        self.span
    }

    /// Text printed next to the underlined span.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether this label marks the problem itself.
    pub fn is_primary(&self) -> bool {
        self.is_primary
    }
}

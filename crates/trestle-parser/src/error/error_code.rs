//! Error codes for parser diagnostics.
//!
//! - `E0xx`: malformed tokens (literals, comments, names)
//! - `E1xx`: malformed structure

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// A quoted literal is not closed before the end of its line.
    E001,
    /// A `(*` comment is never closed.
    E002,
    /// An angle-bracketed name is not closed.
    E003,
    /// A character that cannot start or continue the current construct.
    E100,
    /// The input ended in the middle of a production.
    E101,
}

impl ErrorCode {
    /// Returns the code as a string, e.g. `"E001"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
        }
    }

    /// One line description of the error class.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unterminated string literal",
            ErrorCode::E002 => "unterminated comment",
            ErrorCode::E003 => "unterminated angle-bracketed name",
            ErrorCode::E100 => "unexpected character",
            ErrorCode::E101 => "incomplete input",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

//! Error and diagnostic types for the grammar parser.
//!
//! # Overview
//!
//! A [`Diagnostic`] is a single error with an optional [`ErrorCode`],
//! labeled source spans and help text. [`ParseError`] carries
//! the diagnostics of a failed parse back to the caller.
//!
//! # Example
//!
//! ```
//! # use trestle_parser::error::{Diagnostic, ErrorCode};
//! # use trestle_parser::Span;
//! let diag = Diagnostic::error("unterminated string literal")
//!     .with_code(ErrorCode::E001)
//!     .with_label(Span::new(12..13), "string starts here")
//!     .with_help("close the literal with a matching quote");
//!
//! assert_eq!(diag.to_string(), "error[E001]: unterminated string literal");
//! ```

mod diagnostic;
mod error_code;
mod label;
mod parse_error;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;

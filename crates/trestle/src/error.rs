//! Error types for Trestle operations.
//!
//! This module provides the main error type [`TrestleError`] which wraps
//! the failures of every stage: parsing, graph building, symbol lookup,
//! layout and export.

use std::io;

use thiserror::Error;

use trestle_parser::error::ParseError;

use crate::{builder::BuildError, layout::GeometryError};

/// The main error type for Trestle operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant keeps the source text next to the structured parse
/// error so callers can report labeled spans.
#[derive(Debug, Error)]
pub enum TrestleError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    #[error("Symbol '{0}' not found")]
    Lookup(String),

    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error>),
}

impl TrestleError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_message_names_symbol() {
        let err = TrestleError::Lookup("expr".to_string());
        assert_eq!(err.to_string(), "Symbol 'expr' not found");
    }

    #[test]
    fn test_io_error_converts() {
        let err: TrestleError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        assert!(matches!(err, TrestleError::Io(_)));
        assert!(err.to_string().starts_with("I/O error"));
    }
}

//! Trestle grammar notation parser.
//!
//! Parses Wirth-style EBNF (with a few BNF conveniences) into the expression
//! trees consumed by the `trestle` graph builder.
//!
//! ```
//! let productions = trestle_parser::parse(r#"
//!     expr   = term { ("+" | "-") term } .
//!     term   = factor { ("*" | "/") factor } .
//!     factor = number | "(" expr ")" .
//! "#).unwrap();
//!
//! assert_eq!(productions.len(), 3);
//! assert_eq!(productions[0].name(), "expr");
//! ```
//!
//! # Notation
//!
//! ```text
//! grammar    = { production } .
//! production = name ( "=" | "::=" ) expression ( "." | ";" ) .
//! expression = term { "|" term } .
//! term       = { factor } .
//! factor     = name | literal | "(" expression ")" | "[" expression "]"
//!            | "{" expression "}" [ "+" ] .
//! ```
//!
//! Names are letters, digits, `_` and `-` (starting with a letter or `_`), or
//! any text in angle brackets. Literals are single or double quoted; an empty
//! literal stands for the empty word. `(* ... *)` and `// ...` are comments.

pub mod error;
mod parser;
pub mod span;

use log::debug;

use trestle_core::expr::Production;

pub use error::ParseError;
pub use span::Span;

/// Parses grammar source text into its productions, in source order.
///
/// # Errors
///
/// Returns a [`ParseError`] with a diagnostic pointing at the first offending
/// location.
pub fn parse(source: &str) -> Result<Vec<Production>, ParseError> {
    let productions = parser::parse_grammar(source).map_err(ParseError::from)?;
    debug!(productions = productions.len(); "Parsed grammar");
    Ok(productions)
}

//! Grammar expression trees.
//!
//! # Overview
//!
//! An [`Expr`] is the abstract syntax of one production's right-hand side, as
//! produced by a grammar notation parser. The graph builder compiles each
//! [`Production`] into a diagram graph.
//!
//! ```
//! use trestle_core::expr::{Expr, Production};
//!
//! // S = "a" { "b" } .
//! let production = Production::new(
//!     "S",
//!     Expr::sequence(vec![Expr::literal("a"), Expr::repeat(Expr::literal("b"))]),
//! );
//! assert_eq!(production.to_string(), r#"S = "a" { "b" } ."#);
//! ```

use std::fmt;

use crate::style::NodeStyle;

/// A named leaf of the expression tree: a terminal literal or a nonterminal reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    name: String,
    style: NodeStyle,
}

impl Leaf {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            style: NodeStyle::default(),
        }
    }

    /// Attaches per-node style overrides to this leaf.
    pub fn with_style(mut self, style: NodeStyle) -> Self {
        self.style = style;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn style(&self) -> &NodeStyle {
        &self.style
    }
}

/// Right-hand side of a production.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A quoted terminal
    Literal(Leaf),
    /// A reference to another production
    Identifier(Leaf),
    /// The empty word
    Empty,
    Sequence(Vec<Expr>),
    Alternation(Vec<Expr>),
    /// `[ x ]`
    Optional(Box<Expr>),
    /// `{ x }`, zero or more
    Repeat(Box<Expr>),
    /// `{ x }+`, one or more
    RepeatOne(Box<Expr>),
}

impl Expr {
    pub fn literal(name: impl Into<String>) -> Self {
        Self::Literal(Leaf::new(name))
    }

    pub fn identifier(name: impl Into<String>) -> Self {
        Self::Identifier(Leaf::new(name))
    }

    pub fn sequence(items: Vec<Expr>) -> Self {
        Self::Sequence(items)
    }

    pub fn alternation(items: Vec<Expr>) -> Self {
        Self::Alternation(items)
    }

    pub fn optional(inner: Expr) -> Self {
        Self::Optional(Box::new(inner))
    }

    pub fn repeat(inner: Expr) -> Self {
        Self::Repeat(Box::new(inner))
    }

    pub fn repeat_one(inner: Expr) -> Self {
        Self::RepeatOne(Box::new(inner))
    }

    /// Returns the items of a sequence, or the expression itself as a single item.
    pub fn as_items(&self) -> Vec<&Expr> {
        match self {
            Self::Sequence(items) => items.iter().collect(),
            other => vec![other],
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(leaf) => write!(f, "{:?}", leaf.name()),
            Self::Identifier(leaf) => write!(f, "{}", leaf.name()),
            Self::Empty => write!(f, "()"),
            Self::Sequence(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    match item {
                        Self::Alternation(_) => write!(f, "( {item} )")?,
                        _ => write!(f, "{item}")?,
                    }
                }
                Ok(())
            }
            Self::Alternation(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Self::Optional(inner) => write!(f, "[ {inner} ]"),
            Self::Repeat(inner) => write!(f, "{{ {inner} }}"),
            Self::RepeatOne(inner) => write!(f, "{{ {inner} }}+"),
        }
    }
}

/// A named production `name = expr .`
#[derive(Debug, Clone, PartialEq)]
pub struct Production {
    name: String,
    expr: Expr,
}

impl Production {
    pub fn new(name: impl Into<String>, expr: Expr) -> Self {
        Self {
            name: name.into(),
            expr,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {} .", self.name, self.expr)
    }
}

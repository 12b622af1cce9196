//! Trestle Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Trestle railroad
//! diagram crates. It includes:
//!
//! - **Colors**: Color handling with CSS color support ([`color::Color`])
//! - **Geometry**: Basic geometric types ([`geometry`] module)
//! - **Expressions**: The grammar expression tree handed to the graph builder ([`expr`] module)
//! - **Styles**: Fonts and per-node style overrides ([`style`] module)
//! - **Draw**: Drawing primitives, surfaces, text metrics and SVG layering ([`draw`] module)

pub mod color;
pub mod draw;
pub mod expr;
pub mod geometry;
pub mod style;

//! Fonts and per-node style overrides.
//!
//! A [`NodeStyle`] travels with a grammar leaf from the expression tree into
//! the diagram graph. Unset fields fall back to the chart-wide style at
//! render time.

use serde::Deserialize;

use crate::color::Color;

/// A font reference: family name and size in points.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(default)]
pub struct FontSpec {
    family: String,
    size: u16,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, size: u16) -> Self {
        Self {
            family: family.into(),
            size,
        }
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    /// Font size in points
    pub fn size(&self) -> u16 {
        self.size
    }
}

impl Default for FontSpec {
    fn default() -> Self {
        Self::new("sans-serif", 12)
    }
}

/// Optional visual overrides for a single diagram node.
///
/// # Examples
///
/// ```
/// use trestle_core::{color::Color, style::NodeStyle};
///
/// let style = NodeStyle::default().with_line_color(Color::new("red").unwrap());
/// assert!(style.line_color().is_some());
/// assert!(style.font().is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeStyle {
    line_color: Option<Color>,
    node_color: Option<Color>,
    font: Option<FontSpec>,
}

impl NodeStyle {
    /// Color of the connecting lines and box outline drawn for the node
    pub fn line_color(&self) -> Option<Color> {
        self.line_color
    }

    /// Color of the node's label text
    pub fn node_color(&self) -> Option<Color> {
        self.node_color
    }

    pub fn font(&self) -> Option<&FontSpec> {
        self.font.as_ref()
    }

    pub fn with_line_color(mut self, color: Color) -> Self {
        self.line_color = Some(color);
        self
    }

    pub fn with_node_color(mut self, color: Color) -> Self {
        self.node_color = Some(color);
        self
    }

    pub fn with_font(mut self, font: FontSpec) -> Self {
        self.font = Some(font);
        self
    }

    /// Returns true when no field overrides the chart style
    pub fn is_empty(&self) -> bool {
        self.line_color.is_none() && self.node_color.is_none() && self.font.is_none()
    }
}

//! Stroke definitions for tracks, box outlines and debug frames.
//!
//! Use the [`apply_stroke!`](crate::apply_stroke!) macro to apply all stroke
//! attributes to an SVG element at once:
//!
//! ```
//! use trestle_core::draw::StrokeDefinition;
//! use trestle_core::color::Color;
//! use svg::node::element as svg_element;
//!
//! let stroke = StrokeDefinition::solid(Color::new("black").unwrap(), 2.0);
//! let line = svg_element::Line::new().set("x1", 0).set("x2", 10);
//! let line = trestle_core::apply_stroke!(line, &stroke);
//! ```

use std::str::FromStr;

use crate::color::Color;

/// Dash pattern of a stroke.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum StrokeStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

impl StrokeStyle {
    /// Returns the `stroke-dasharray` value, or `None` for solid lines.
    pub fn to_svg_value(&self) -> Option<&'static str> {
        match self {
            Self::Solid => None,
            Self::Dashed => Some("5,5"),
            Self::Dotted => Some("2,3"),
        }
    }
}

impl FromStr for StrokeStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solid" => Ok(Self::Solid),
            "dashed" => Ok(Self::Dashed),
            "dotted" => Ok(Self::Dotted),
            _ => Err(format!(
                "invalid stroke style `{s}`, valid values: solid, dashed, dotted"
            )),
        }
    }
}

/// Color, width and dash pattern of a line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeDefinition {
    color: Color,
    width: f32,
    style: StrokeStyle,
}

impl StrokeDefinition {
    pub fn new(color: Color, width: f32, style: StrokeStyle) -> Self {
        Self {
            color,
            width,
            style,
        }
    }

    pub fn solid(color: Color, width: f32) -> Self {
        Self::new(color, width, StrokeStyle::Solid)
    }

    pub fn dashed(color: Color, width: f32) -> Self {
        Self::new(color, width, StrokeStyle::Dashed)
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn style(&self) -> StrokeStyle {
        self.style
    }

    /// Returns a copy of this stroke with another color.
    pub fn with_color(self, color: Color) -> Self {
        Self { color, ..self }
    }

    /// Returns a copy of this stroke with another width.
    pub fn with_width(self, width: f32) -> Self {
        Self { width, ..self }
    }
}

impl Default for StrokeDefinition {
    fn default() -> Self {
        Self::solid(Color::default(), 1.0)
    }
}

/// Applies color, opacity, width and dash pattern of a [`StrokeDefinition`]
/// to an SVG element builder.
#[macro_export]
macro_rules! apply_stroke {
    ($element:expr, $stroke:expr) => {{
        let mut elem = $element
            .set("stroke", $stroke.color().to_string())
            .set("stroke-opacity", $stroke.color().alpha())
            .set("stroke-width", $stroke.width());

        if let Some(dasharray) = $stroke.style().to_svg_value() {
            elem = elem.set("stroke-dasharray", dasharray);
        }

        elem
    }};
}

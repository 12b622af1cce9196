//! Configuration types for Trestle diagram rendering.
//!
//! This module provides configuration structures that control how grammars
//! are compiled, laid out and styled. All types implement
//! [`serde::Deserialize`] for loading from external sources.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining build, layout and style settings.
//! - [`BuildConfig`] - Controls graph construction.
//! - [`LayoutConfig`] - Fonts, gap constants, page width and margins.
//! - [`StyleConfig`] - Colors, line width and the debug border switch.
//!
//! # Example
//!
//! ```
//! # use trestle::config::AppConfig;
//! let config = AppConfig::default();
//! assert!(config.style().background_color().is_ok());
//! assert!(config.layout().page_width().is_none());
//! ```

use serde::Deserialize;

use trestle_core::{
    color::Color,
    draw::{FixedMetrics, FontMetrics, TextMeasure},
    geometry::{Insets, Size},
    style::FontSpec,
};

/// Top-level configuration.
///
/// Every section falls back to its defaults when absent, so an empty TOML
/// document is a valid configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    build: BuildConfig,

    #[serde(default)]
    layout: LayoutConfig,

    #[serde(default)]
    style: StyleConfig,
}

impl AppConfig {
    pub fn new(build: BuildConfig, layout: LayoutConfig, style: StyleConfig) -> Self {
        Self {
            build,
            layout,
            style,
        }
    }

    pub fn build(&self) -> &BuildConfig {
        &self.build
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    pub fn with_build(self, build: BuildConfig) -> Self {
        Self { build, ..self }
    }

    pub fn with_layout(self, layout: LayoutConfig) -> Self {
        Self { layout, ..self }
    }

    pub fn with_style(self, style: StyleConfig) -> Self {
        Self { style, ..self }
    }
}

/// Graph construction settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Collapse `a {a}` and `a {b a}` into a single rerun loop.
    collapse_repetitions: bool,
}

impl BuildConfig {
    pub fn new(collapse_repetitions: bool) -> Self {
        Self {
            collapse_repetitions,
        }
    }

    pub fn collapse_repetitions(&self) -> bool {
        self.collapse_repetitions
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self::new(true)
    }
}

/// How label sizes are measured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextMetrics {
    /// Shape text with the system fonts.
    #[default]
    Font,
    /// Approximate every glyph with the same advance. Reproducible across
    /// machines.
    Fixed,
}

impl TextMeasure for TextMetrics {
    fn text_size(&self, text: &str, font: &FontSpec) -> Size {
        match self {
            Self::Font => FontMetrics.text_size(text, font),
            Self::Fixed => FixedMetrics::default().text_size(text, font),
        }
    }
}

/// Layout constants.
///
/// Gap names follow the track vocabulary: the *symbol* gaps pad a label
/// inside its box, the *component* gaps separate neighbouring constructs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    font: FontSpec,
    symbol_gap_width: f32,
    symbol_gap_height: f32,
    component_gap_width: f32,
    component_gap_height: f32,
    arc_size: f32,
    arrow_size: f32,
    page_width: Option<f32>,
    margin: Insets,
    text_metrics: TextMetrics,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            font: FontSpec::default(),
            symbol_gap_width: 8.0,
            symbol_gap_height: 4.0,
            component_gap_width: 32.0,
            component_gap_height: 10.0,
            arc_size: 12.0,
            arrow_size: 5.0,
            page_width: None,
            margin: Insets::new(10.0, 10.0, 10.0, 24.0),
            text_metrics: TextMetrics::default(),
        }
    }
}

impl LayoutConfig {
    pub fn font(&self) -> &FontSpec {
        &self.font
    }

    pub fn symbol_gap_width(&self) -> f32 {
        self.symbol_gap_width
    }

    pub fn symbol_gap_height(&self) -> f32 {
        self.symbol_gap_height
    }

    pub fn component_gap_width(&self) -> f32 {
        self.component_gap_width
    }

    pub fn component_gap_height(&self) -> f32 {
        self.component_gap_height
    }

    pub fn arc_size(&self) -> f32 {
        self.arc_size
    }

    pub fn arrow_size(&self) -> f32 {
        self.arrow_size
    }

    /// Maximum width of a row before the top level wraps, if any.
    pub fn page_width(&self) -> Option<f32> {
        self.page_width
    }

    pub fn margin(&self) -> Insets {
        self.margin
    }

    pub fn text_metrics(&self) -> TextMetrics {
        self.text_metrics
    }

    pub fn with_font(self, font: FontSpec) -> Self {
        Self { font, ..self }
    }

    pub fn with_page_width(self, page_width: Option<f32>) -> Self {
        Self { page_width, ..self }
    }

    pub fn with_margin(self, margin: Insets) -> Self {
        Self { margin, ..self }
    }

    pub fn with_text_metrics(self, text_metrics: TextMetrics) -> Self {
        Self {
            text_metrics,
            ..self
        }
    }

    /// Checks that every constant is usable for layout.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first offending setting.
    pub fn validate(&self) -> Result<(), String> {
        let constants = [
            ("symbol_gap_width", self.symbol_gap_width),
            ("symbol_gap_height", self.symbol_gap_height),
            ("component_gap_width", self.component_gap_width),
            ("component_gap_height", self.component_gap_height),
            ("arc_size", self.arc_size),
            ("arrow_size", self.arrow_size),
            ("margin.top", self.margin.top()),
            ("margin.right", self.margin.right()),
            ("margin.bottom", self.margin.bottom()),
            ("margin.left", self.margin.left()),
        ];
        if let Some((name, value)) = constants
            .iter()
            .find(|(_, value)| !value.is_finite() || *value < 0.0)
        {
            return Err(format!("Invalid layout setting `{name}`: {value}"));
        }
        if self.font.size() == 0 {
            return Err("Invalid layout setting `font.size`: 0".to_string());
        }
        match self.page_width {
            Some(width) if !width.is_finite() || width <= 0.0 => {
                Err(format!("Invalid layout setting `page_width`: {width}"))
            }
            _ => Ok(()),
        }
    }
}

/// Visual styling of the whole chart.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    line_color: Option<String>,
    text_color: Option<String>,
    fill_color: Option<String>,
    background_color: Option<String>,
    line_width: f32,
    show_borders: bool,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            line_color: None,
            text_color: None,
            fill_color: None,
            background_color: None,
            line_width: 1.0,
            show_borders: false,
        }
    }
}

fn parse_color(value: Option<&String>, setting: &str) -> Result<Option<Color>, String> {
    value
        .map(|color| Color::new(color))
        .transpose()
        .map_err(|err| format!("Invalid {setting} in config: {err}"))
}

impl StyleConfig {
    /// Color of every track, arc and box outline.
    pub fn line_color(&self) -> Result<Option<Color>, String> {
        parse_color(self.line_color.as_ref(), "line color")
    }

    /// Color of symbol labels.
    pub fn text_color(&self) -> Result<Option<Color>, String> {
        parse_color(self.text_color.as_ref(), "text color")
    }

    /// Fill of terminal and nonterminal boxes.
    pub fn fill_color(&self) -> Result<Option<Color>, String> {
        parse_color(self.fill_color.as_ref(), "fill color")
    }

    pub fn background_color(&self) -> Result<Option<Color>, String> {
        parse_color(self.background_color.as_ref(), "background color")
    }

    pub fn line_width(&self) -> f32 {
        self.line_width
    }

    /// Draw the allocated box of every node, for debugging layouts.
    pub fn show_borders(&self) -> bool {
        self.show_borders
    }

    pub fn with_line_color(self, color: impl Into<String>) -> Self {
        Self {
            line_color: Some(color.into()),
            ..self
        }
    }

    pub fn with_show_borders(self, show_borders: bool) -> Self {
        Self {
            show_borders,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_layout_defaults() {
        let layout = LayoutConfig::default();
        assert_approx_eq!(f32, layout.symbol_gap_width(), 8.0);
        assert_approx_eq!(f32, layout.symbol_gap_height(), 4.0);
        assert_approx_eq!(f32, layout.component_gap_width(), 32.0);
        assert_approx_eq!(f32, layout.component_gap_height(), 10.0);
        assert_approx_eq!(f32, layout.arc_size(), 12.0);
        assert_approx_eq!(f32, layout.margin().left(), 24.0);
        assert_eq!(layout.text_metrics(), TextMetrics::Font);
        assert!(layout.validate().is_ok());
    }

    #[test]
    fn test_build_defaults_collapse() {
        assert!(AppConfig::default().build().collapse_repetitions());
    }

    #[test]
    fn test_validate_rejects_negative_gap() {
        let layout = LayoutConfig {
            arc_size: -1.0,
            ..LayoutConfig::default()
        };
        let err = layout.validate().unwrap_err();
        assert!(err.contains("arc_size"));
    }

    #[test]
    fn test_validate_rejects_zero_page_width() {
        let layout = LayoutConfig::default().with_page_width(Some(0.0));
        assert!(layout.validate().is_err());
    }

    #[test]
    fn test_style_colors() {
        let style = StyleConfig {
            line_color: Some("red".to_string()),
            fill_color: Some("not a color".to_string()),
            ..StyleConfig::default()
        };
        assert!(style.line_color().unwrap().is_some());
        assert!(style.text_color().unwrap().is_none());
        assert!(style.fill_color().is_err());
    }

    #[test]
    fn test_fixed_metrics_are_deterministic() {
        let font = FontSpec::default();
        let a = TextMetrics::Fixed.text_size("expr", &font);
        let b = TextMetrics::Fixed.text_size("expr", &font);
        assert_eq!(a, b);
        assert!(a.width() > 0.0);
    }
}

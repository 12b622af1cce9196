//! Text measurement for node labels.
//!
//! # Overview
//!
//! Layout only needs two numbers from text: the size of a label and the
//! height of a line in the chart font. [`TextMeasure`] abstracts over where
//! those numbers come from:
//!
//! - [`FontMetrics`] shapes the text with cosmic-text against the system fonts
//! - [`FixedMetrics`] uses a fixed per-character advance, which is stable
//!   across machines and therefore what tests use
//!
//! ```
//! use trestle_core::{draw::{FixedMetrics, TextMeasure}, style::FontSpec};
//!
//! let metrics = FixedMetrics::default();
//! let font = FontSpec::default();
//! let one = metrics.text_size("a", &font);
//! let two = metrics.text_size("ab", &font);
//! assert!(two.width() > one.width());
//! assert_eq!(one.height(), metrics.font_height(&font));
//! ```

use std::sync::{Mutex, OnceLock};

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping};
use log::info;

use crate::{geometry::Size, style::FontSpec};

/// Points to pixels at standard DPI.
const POINTS_TO_PIXELS: f32 = 1.33;
/// Line height relative to the pixel font size.
const LINE_HEIGHT_FACTOR: f32 = 1.15;
/// Average glyph advance relative to the pixel font size.
const AVERAGE_ADVANCE_FACTOR: f32 = 0.55;

/// Source of text metrics for layout.
pub trait TextMeasure {
    /// Size of `text` rendered with `font`. Multi-line text stacks lines.
    fn text_size(&self, text: &str, font: &FontSpec) -> Size;

    /// Height of a single line of text in `font`.
    fn font_height(&self, font: &FontSpec) -> f32 {
        line_height_px(font)
    }
}

fn font_size_px(font: &FontSpec) -> f32 {
    font.size() as f32 * POINTS_TO_PIXELS
}

fn line_height_px(font: &FontSpec) -> f32 {
    font_size_px(font) * LINE_HEIGHT_FACTOR
}

/// Deterministic metrics: every character advances by the same amount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedMetrics {
    advance_factor: f32,
}

impl FixedMetrics {
    /// Creates metrics where each character is `advance_factor` times the
    /// pixel font size wide.
    pub fn new(advance_factor: f32) -> Self {
        Self { advance_factor }
    }
}

impl Default for FixedMetrics {
    fn default() -> Self {
        Self::new(AVERAGE_ADVANCE_FACTOR)
    }
}

impl TextMeasure for FixedMetrics {
    fn text_size(&self, text: &str, font: &FontSpec) -> Size {
        if text.is_empty() {
            return Size::default();
        }
        let widest = text.lines().map(|line| line.chars().count()).max().unwrap_or(0);
        let lines = text.lines().count().max(1);
        Size::new(
            widest as f32 * font_size_px(font) * self.advance_factor,
            lines as f32 * line_height_px(font),
        )
    }
}

/// Metrics from real font shaping, shared through a process-wide font system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FontMetrics;

impl TextMeasure for FontMetrics {
    fn text_size(&self, text: &str, font: &FontSpec) -> Size {
        TEXT_MANAGER
            .get_or_init(TextManager::new)
            .calculate_text_size(text, font)
    }
}

/// TextManager handles text measurement and font operations
/// It maintains a reusable FontSystem instance to avoid expensive recreation
struct TextManager {
    font_system: Mutex<FontSystem>,
}

impl TextManager {
    fn new() -> Self {
        info!("Initializing FontSystem");
        Self {
            font_system: Mutex::new(FontSystem::new()),
        }
    }

    /// Calculate the size of text in pixels using cosmic-text shaping.
    ///
    /// Falls back to the average glyph advance when shaping yields no runs.
    fn calculate_text_size(&self, text: &str, font: &FontSpec) -> Size {
        if text.is_empty() {
            return Size::default();
        }

        let mut font_system = self
            .font_system
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let font_size_px = font_size_px(font);
        let metrics = Metrics::new(font_size_px, line_height_px(font));

        let mut buffer = Buffer::new(&mut font_system, metrics);
        let mut buffer = buffer.borrow_with(&mut font_system);

        let attrs = Attrs::new().family(Family::Name(font.family()));
        buffer.set_size(None, None);
        buffer.set_text(text, &attrs, Shaping::Advanced, None);
        buffer.shape_until_scroll(true);

        let mut max_width: f32 = 0.0;
        let mut total_height: f32 = 0.0;

        let layout_runs: Vec<_> = buffer.layout_runs().collect();
        if !layout_runs.is_empty() {
            for last in layout_runs.iter().map(|run| run.glyphs.last()) {
                if let Some(last) = last {
                    max_width = max_width.max(last.x + last.w);
                }
                total_height += metrics.line_height;
            }
        } else {
            max_width = text.chars().count() as f32 * font_size_px * AVERAGE_ADVANCE_FACTOR;
            total_height = metrics.line_height;
        }

        Size::new(max_width, total_height)
    }
}

static TEXT_MANAGER: OnceLock<TextManager> = OnceLock::new();

//! Drawing vocabulary shared by the renderer and the exporters.
//!
//! # Overview
//!
//! - [`Primitive`] and [`Surface`]: what the renderer emits, and where to
//! - [`StrokeDefinition`]: line color, width and dash pattern
//! - [`TextMeasure`]: text metrics, backed by real fonts or a fixed approximation
//! - [`RenderLayer`] and [`LayeredOutput`]: z-ordered SVG node collection

mod layer;
mod primitive;
mod stroke;
mod text;

pub use layer::{LayeredOutput, RenderLayer, SvgNode};
pub use primitive::{Direction, Primitive, Surface};
pub use stroke::{StrokeDefinition, StrokeStyle};
pub use text::{FixedMetrics, FontMetrics, TextMeasure};

//! SVG output.
//!
//! [`SvgExporter`] is a drawing [`Surface`]: every primitive it receives is
//! converted to an SVG element and filed under its render layer, so tracks
//! end up below boxes and boxes below labels regardless of drawing order.

use log::debug;
use svg::{Document, node::element::Rectangle};

use trestle_core::{
    color::Color,
    draw::{LayeredOutput, Primitive, RenderLayer, Surface},
    geometry::Size,
};

/// Collects primitives and assembles them into an SVG document.
#[derive(Debug)]
pub struct SvgExporter {
    output: LayeredOutput,
    background: Color,
    primitives: usize,
}

impl SvgExporter {
    pub fn new(background: Color) -> Self {
        Self {
            output: LayeredOutput::new(),
            background,
            primitives: 0,
        }
    }

    /// Builds the document for a drawing of the given dimensions.
    pub fn finish(mut self, size: Size) -> Document {
        let background = Rectangle::new()
            .set("x", 0)
            .set("y", 0)
            .set("width", size.width())
            .set("height", size.height())
            .set("fill", &self.background);
        self.output
            .add_to_layer(RenderLayer::Background, Box::new(background));

        let mut doc = Document::new()
            .set("viewBox", (0.0, 0.0, size.width(), size.height()))
            .set("width", size.width())
            .set("height", size.height());
        for node in self.output.render() {
            doc = doc.add(node);
        }

        debug!(
            primitives = self.primitives,
            width = size.width(),
            height = size.height();
            "SVG document assembled"
        );
        doc
    }
}

impl Surface for SvgExporter {
    fn draw(&mut self, primitive: Primitive) {
        let (layer, node) = primitive.to_svg();
        self.output.add_to_layer(layer, node);
        self.primitives += 1;
    }
}

#[cfg(test)]
mod tests {
    use trestle_core::{
        draw::StrokeDefinition,
        geometry::Point,
    };

    use super::*;

    #[test]
    fn test_document_has_background_and_layers() {
        let mut exporter = SvgExporter::new(Color::new("white").unwrap());
        exporter.draw(Primitive::Line {
            from: Point::new(0.0, 5.0),
            to: Point::new(10.0, 5.0),
            stroke: StrokeDefinition::default(),
        });
        let svg = exporter.finish(Size::new(20.0, 10.0)).to_string();

        assert!(svg.contains("<svg"));
        assert!(svg.contains("data-layer=\"background\""));
        assert!(svg.contains("data-layer=\"track\""));
        assert!(svg.find("background").unwrap() < svg.find("track").unwrap());
    }

    #[test]
    fn test_empty_drawing_still_has_background() {
        let exporter = SvgExporter::new(Color::default());
        let svg = exporter.finish(Size::new(5.0, 5.0)).to_string();
        assert!(svg.contains("<rect"));
    }
}

//! Drawing primitives and the abstract surface they are drawn onto.
//!
//! The renderer never talks to an output format directly: it emits
//! [`Primitive`] values into a [`Surface`]. A `Vec<Primitive>` is itself a
//! surface, which records everything for inspection; exporters implement
//! the trait to translate primitives as they arrive.
//!
//! ```
//! use trestle_core::{
//!     color::Color,
//!     draw::{Primitive, StrokeDefinition, Surface},
//!     geometry::Point,
//! };
//!
//! let mut recording: Vec<Primitive> = Vec::new();
//! recording.draw(Primitive::Line {
//!     from: Point::new(0.0, 10.0),
//!     to: Point::new(20.0, 10.0),
//!     stroke: StrokeDefinition::solid(Color::default(), 1.0),
//! });
//! assert_eq!(recording.len(), 1);
//! ```

use svg::node::{
    Text as SvgText,
    element::{self as svg_element, path::Data},
};

use crate::{
    apply_stroke,
    color::Color,
    draw::{RenderLayer, StrokeDefinition, SvgNode},
    geometry::{Point, Size},
    style::FontSpec,
};

/// Horizontal travel direction of a traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Left to right
    Forward,
    /// Right to left, used for loop-back segments
    Reverse,
}

impl Direction {
    /// The opposite direction.
    pub fn flip(self) -> Self {
        match self {
            Self::Forward => Self::Reverse,
            Self::Reverse => Self::Forward,
        }
    }

    /// `1.0` when travelling forward, `-1.0` otherwise.
    pub fn sign(self) -> f32 {
        match self {
            Self::Forward => 1.0,
            Self::Reverse => -1.0,
        }
    }
}

/// A single drawing instruction in diagram coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// A straight track segment
    Line {
        from: Point,
        to: Point,
        stroke: StrokeDefinition,
    },
    /// A quarter circle inscribed in the square at `origin` with side
    /// `diameter`. `start_angle` is in degrees, measured clockwise on screen
    /// from three o'clock; the arc sweeps 90 degrees clockwise.
    Arc {
        origin: Point,
        diameter: f32,
        start_angle: u16,
        stroke: StrokeDefinition,
    },
    /// A symbol box, rounded when `corner_radius` is positive
    Rect {
        origin: Point,
        size: Size,
        corner_radius: f32,
        stroke: StrokeDefinition,
        fill: Option<Color>,
    },
    /// A debug outline of a node's allocated box
    Frame {
        origin: Point,
        size: Size,
        stroke: StrokeDefinition,
    },
    /// An arrow head whose tip touches `tip`, pointing along `direction`
    Arrow {
        tip: Point,
        direction: Direction,
        size: f32,
        color: Color,
    },
    /// A single line label centered on `center`
    Text {
        content: String,
        center: Point,
        font: FontSpec,
        color: Color,
    },
}

impl Primitive {
    /// Returns the primitive moved by the given offsets.
    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        let mut moved = self.clone();
        match &mut moved {
            Self::Line { from, to, .. } => {
                *from = from.translate(dx, dy);
                *to = to.translate(dx, dy);
            }
            Self::Arc { origin, .. } | Self::Rect { origin, .. } | Self::Frame { origin, .. } => {
                *origin = origin.translate(dx, dy);
            }
            Self::Arrow { tip, .. } => *tip = tip.translate(dx, dy),
            Self::Text { center, .. } => *center = center.translate(dx, dy),
        }
        moved
    }

    /// Converts the primitive to an SVG element and the layer it belongs to.
    pub fn to_svg(&self) -> (RenderLayer, SvgNode) {
        match self {
            Self::Line { from, to, stroke } => {
                let line = svg_element::Line::new()
                    .set("x1", from.x())
                    .set("y1", from.y())
                    .set("x2", to.x())
                    .set("y2", to.y());
                (RenderLayer::Track, Box::new(apply_stroke!(line, stroke)))
            }
            Self::Arc {
                origin,
                diameter,
                start_angle,
                stroke,
            } => {
                let radius = diameter / 2.0;
                let center = origin.translate(radius, radius);
                let start = arc_point(center, radius, *start_angle);
                let end = arc_point(center, radius, start_angle.wrapping_add(90));
                let data = Data::new()
                    .move_to((start.x(), start.y()))
                    .elliptical_arc_to((radius, radius, 0, 0, 1, end.x(), end.y()));
                let path = svg_element::Path::new().set("d", data).set("fill", "none");
                (RenderLayer::Track, Box::new(apply_stroke!(path, stroke)))
            }
            Self::Rect {
                origin,
                size,
                corner_radius,
                stroke,
                fill,
            } => {
                let mut rect = svg_element::Rectangle::new()
                    .set("x", origin.x())
                    .set("y", origin.y())
                    .set("width", size.width())
                    .set("height", size.height());
                if *corner_radius > 0.0 {
                    rect = rect.set("rx", *corner_radius).set("ry", *corner_radius);
                }
                rect = match fill {
                    Some(color) => rect
                        .set("fill", color.to_string())
                        .set("fill-opacity", color.alpha()),
                    None => rect.set("fill", "none"),
                };
                (RenderLayer::Shape, Box::new(apply_stroke!(rect, stroke)))
            }
            Self::Frame {
                origin,
                size,
                stroke,
            } => {
                let rect = svg_element::Rectangle::new()
                    .set("x", origin.x())
                    .set("y", origin.y())
                    .set("width", size.width())
                    .set("height", size.height())
                    .set("fill", "none");
                (RenderLayer::Frame, Box::new(apply_stroke!(rect, stroke)))
            }
            Self::Arrow {
                tip,
                direction,
                size,
                color,
            } => {
                let base_x = tip.x() - direction.sign() * size;
                let half = size / 2.0;
                let points = format!(
                    "{},{} {},{} {},{}",
                    tip.x(),
                    tip.y(),
                    base_x,
                    tip.y() - half,
                    base_x,
                    tip.y() + half
                );
                let polygon = svg_element::Polygon::new()
                    .set("points", points)
                    .set("fill", color.to_string())
                    .set("fill-opacity", color.alpha());
                (RenderLayer::Arrow, Box::new(polygon))
            }
            Self::Text {
                content,
                center,
                font,
                color,
            } => {
                let text = svg_element::Text::new("")
                    .set("x", center.x())
                    .set("y", center.y())
                    .set("text-anchor", "middle")
                    .set("dominant-baseline", "central")
                    .set("font-family", font.family())
                    .set("font-size", font.size())
                    .set("fill", color.to_string())
                    .set("fill-opacity", color.alpha())
                    .add(SvgText::new(content.as_str()));
                (RenderLayer::Text, Box::new(text))
            }
        }
    }
}

/// Point on a circle at a screen-space angle in degrees.
fn arc_point(center: Point, radius: f32, angle: u16) -> Point {
    let (cos, sin) = match angle % 360 {
        0 => (1.0, 0.0),
        90 => (0.0, 1.0),
        180 => (-1.0, 0.0),
        270 => (0.0, -1.0),
        other => {
            let radians = (other as f32).to_radians();
            (radians.cos(), radians.sin())
        }
    };
    center.translate(radius * cos, radius * sin)
}

/// Anything primitives can be drawn onto.
pub trait Surface {
    fn draw(&mut self, primitive: Primitive);
}

impl Surface for Vec<Primitive> {
    fn draw(&mut self, primitive: Primitive) {
        self.push(primitive);
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_direction_flip_and_sign() {
        assert_eq!(Direction::Forward.flip(), Direction::Reverse);
        assert_eq!(Direction::Reverse.flip(), Direction::Forward);
        assert_approx_eq!(f32, Direction::Reverse.sign(), -1.0);
    }

    #[test]
    fn test_arc_point_quadrants() {
        let center = Point::new(10.0, 10.0);
        let right = arc_point(center, 5.0, 0);
        assert_approx_eq!(f32, right.x(), 15.0);
        assert_approx_eq!(f32, right.y(), 10.0);

        let below = arc_point(center, 5.0, 90);
        assert_approx_eq!(f32, below.x(), 10.0);
        assert_approx_eq!(f32, below.y(), 15.0);

        let above = arc_point(center, 5.0, 270);
        assert_approx_eq!(f32, above.y(), 5.0);

        let wrapped = arc_point(center, 5.0, 360);
        assert_approx_eq!(f32, wrapped.x(), 15.0);
    }

    #[test]
    fn test_translate_moves_every_anchor() {
        let text = Primitive::Text {
            content: "a".to_string(),
            center: Point::new(1.0, 2.0),
            font: FontSpec::default(),
            color: Color::default(),
        };
        match text.translate(0.0, 10.0) {
            Primitive::Text { center, .. } => assert_approx_eq!(f32, center.y(), 12.0),
            other => panic!("unexpected primitive {other:?}"),
        }
    }

    #[test]
    fn test_primitive_layers() {
        let stroke = StrokeDefinition::default();
        let line = Primitive::Line {
            from: Point::default(),
            to: Point::new(1.0, 0.0),
            stroke,
        };
        assert_eq!(line.to_svg().0, RenderLayer::Track);

        let arrow = Primitive::Arrow {
            tip: Point::default(),
            direction: Direction::Forward,
            size: 4.0,
            color: Color::default(),
        };
        assert_eq!(arrow.to_svg().0, RenderLayer::Arrow);
    }

    #[test]
    fn test_arc_svg_path_uses_clockwise_sweep() {
        let arc = Primitive::Arc {
            origin: Point::new(0.0, 0.0),
            diameter: 10.0,
            start_angle: 180,
            stroke: StrokeDefinition::default(),
        };
        let (_, node) = arc.to_svg();
        let rendered = node.to_string();
        assert!(rendered.contains("M0,5"));
        assert!(rendered.contains("A5,5,0,0,1,5,0"));
    }

    proptest! {
        #[test]
        fn prop_translate_back_restores_line(
            x in -500.0f32..500.0,
            y in -500.0f32..500.0,
            dx in -500.0f32..500.0,
            dy in -500.0f32..500.0,
        ) {
            let line = Primitive::Line {
                from: Point::new(x, y),
                to: Point::new(x + 20.0, y),
                stroke: StrokeDefinition::default(),
            };
            let back = line.translate(dx, dy).translate(-dx, -dy);
            let Primitive::Line { from, to, .. } = back else {
                panic!("translate changed the primitive kind");
            };
            prop_assert!((from.x() - x).abs() < 1e-3);
            prop_assert!((from.y() - y).abs() < 1e-3);
            prop_assert!((to.x() - from.x() - 20.0).abs() < 1e-3);
            prop_assert!((to.y() - from.y()).abs() < 1e-3);
        }
    }
}

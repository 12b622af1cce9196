//! Draws a laid-out diagram graph onto a [`Surface`].
//!
//! Drawing walks each level once, moving a horizontal cursor along the
//! track. Loop-back bodies are walked with the flipped direction, so the
//! same code draws both the forward and the returning track.

use log::{debug, trace};

use trestle_core::{
    color::Color,
    draw::{Direction, Primitive, StrokeDefinition, StrokeStyle, Surface},
    geometry::{Point, Size},
    style::FontSpec,
};

use crate::{
    config::{LayoutConfig, StyleConfig},
    grammar::SymbolTable,
    graph::{DiagramGraph, Node, NodeId, NodeKind},
};

/// Chart-wide colors and stroke, resolved from [`StyleConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    line: Color,
    text: Color,
    fill: Color,
    background: Color,
    line_width: f32,
    show_borders: bool,
}

impl ChartStyle {
    /// Resolves the configured colors, falling back to black tracks on
    /// white.
    ///
    /// # Errors
    ///
    /// Returns a message when a configured color is not a valid CSS color.
    pub fn from_config(style: &StyleConfig) -> Result<Self, String> {
        let white = || Color::new("white");
        Ok(Self {
            line: style.line_color()?.unwrap_or_default(),
            text: style.text_color()?.unwrap_or_default(),
            fill: style.fill_color()?.map_or_else(white, Ok)?,
            background: style.background_color()?.map_or_else(white, Ok)?,
            line_width: style.line_width(),
            show_borders: style.show_borders(),
        })
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn line(&self) -> Color {
        self.line
    }
}

/// Style in effect while a node is drawn.
#[derive(Debug, Clone)]
struct ActiveStyle {
    stroke: StrokeDefinition,
    text: Color,
    font: FontSpec,
}

/// Emits the primitives of one diagram.
pub struct Renderer<'a, S: Surface> {
    graph: &'a DiagramGraph,
    symbols: &'a SymbolTable,
    config: &'a LayoutConfig,
    chart: &'a ChartStyle,
    surface: &'a mut S,
    active: ActiveStyle,
}

impl<'a, S: Surface> Renderer<'a, S> {
    pub fn new(
        graph: &'a DiagramGraph,
        symbols: &'a SymbolTable,
        config: &'a LayoutConfig,
        chart: &'a ChartStyle,
        surface: &'a mut S,
    ) -> Self {
        let active = ActiveStyle {
            stroke: StrokeDefinition::solid(chart.line, chart.line_width),
            text: chart.text,
            font: config.font().clone(),
        };
        Self {
            graph,
            symbols,
            config,
            chart,
            surface,
            active,
        }
    }

    /// Draws the whole diagram starting at the left margin.
    pub fn draw(&mut self) {
        let entry = self.graph.entry();
        let origin = self.config.margin().left();
        let line = self.graph.node(entry).geometry().pos_line().y();
        let lead_in = self.config.component_gap_width() / 4.0;

        self.line(origin - lead_in, line, origin, line);
        let end = self.draw_level(entry, Direction::Forward, origin);
        debug!(end; "Diagram drawn");
    }

    /// Draws the level starting at `entry` with the cursor at `cursor` and
    /// returns the cursor after the last node.
    pub fn draw_level(&mut self, entry: NodeId, direction: Direction, cursor: f32) -> f32 {
        let mut cursor = cursor;
        for id in self.graph.level(entry) {
            cursor = self.draw_node(id, direction, cursor);
        }
        cursor
    }

    fn draw_node(&mut self, id: NodeId, direction: Direction, cursor: f32) -> f32 {
        let graph = self.graph;
        let node = graph.node(id);
        let extent = node.extent();
        let left = match direction {
            Direction::Forward => cursor,
            Direction::Reverse => cursor - extent.width(),
        };
        trace!(serial = node.serial(), kind:% = node.kind(), left; "Drawing node");

        let saved = self.enter(node);
        if self.chart.show_borders {
            self.frame(node, left);
        }

        let mut next_cursor = match direction {
            Direction::Forward => left + extent.width(),
            Direction::Reverse => left,
        };
        match node.kind() {
            NodeKind::Terminal | NodeKind::Nonterminal => self.draw_symbol(node, left, direction),
            NodeKind::Epsilon => {
                let line = node.geometry().pos_line().y();
                self.line(left, line, left + extent.width(), line);
            }
            NodeKind::Optional => self.draw_option(node, left, direction),
            NodeKind::Iteration => self.draw_iteration(node, left, direction),
            NodeKind::Rerun => self.draw_rerun(node, left, direction),
            NodeKind::Alternative => self.draw_alternation(id, left, direction),
            NodeKind::Wrap => {
                let active = node.geometry().breaks_row();
                if direction == Direction::Forward && active {
                    if let Some(next) = node.next() {
                        next_cursor = self.draw_wrap(node, next, cursor);
                    }
                }
            }
        }

        let line = node.geometry().pos_line().y();
        if graph.has_connector(id) {
            let to = next_cursor + direction.sign() * self.config.component_gap_width() / 2.0;
            self.line(next_cursor, line, to, line);
            next_cursor = to;
        }
        self.active = saved;

        if node.next().is_none() && node.geometry().is_first_level() {
            let tip = next_cursor + self.config.component_gap_width() / 4.0;
            self.line(next_cursor, line, tip, line);
            self.arrow(tip + self.config.arrow_size(), line, Direction::Forward);
        }
        next_cursor
    }

    /// Swaps in the node's style override and returns the style to restore.
    fn enter(&mut self, node: &Node) -> ActiveStyle {
        let saved = self.active.clone();
        let style = node.style();
        if let Some(color) = style.line_color() {
            self.active.stroke = self.active.stroke.with_color(color);
        }
        if let Some(color) = style.node_color() {
            self.active.text = color;
        }
        if let Some(font) = style.font() {
            self.active.font = font.clone();
        }
        saved
    }

    fn draw_symbol(&mut self, node: &Node, left: f32, direction: Direction) {
        let size = node.geometry().size();
        let line = node.geometry().pos_line().y();
        let box_height = size.height() - self.config.component_gap_height();
        let top = line - box_height / 2.0;

        let (corner_radius, stroke) = match node.kind() {
            NodeKind::Terminal => (box_height / 4.0, self.active.stroke),
            _ => (
                0.0,
                self.active
                    .stroke
                    .with_width(self.active.stroke.width() * 1.5),
            ),
        };
        self.surface.draw(Primitive::Rect {
            origin: Point::new(left, top),
            size: Size::new(size.width(), box_height),
            corner_radius,
            stroke,
            fill: Some(self.chart.fill),
        });

        let name = node
            .symbol()
            .and_then(|symbol| self.symbols.name(symbol))
            .unwrap_or_default();
        self.surface.draw(Primitive::Text {
            content: name.to_string(),
            center: Point::new(left + size.width() / 2.0, line),
            font: self.active.font.clone(),
            color: self.active.text,
        });

        let tip = match direction {
            Direction::Forward => left,
            Direction::Reverse => left + size.width(),
        };
        self.arrow(tip, line, direction);
    }

    fn draw_option(&mut self, node: &Node, x: f32, direction: Direction) {
        let cgw = self.config.component_gap_width();
        let arc = self.config.arc_size();
        let width = node.geometry().size().width();
        let line = node.geometry().pos_line().y();
        let skip = node.geometry().pos_begin().y() + self.config.component_gap_height() / 2.0;

        self.line(x, line, x + cgw, line);
        self.line(x + width - cgw, line, x + width, line);

        // Skip path above the track.
        let xa = x + cgw / 4.0;
        let xv = xa + arc / 2.0;
        let xb = x + width - cgw / 4.0;
        let xw = xb - arc / 2.0;
        self.arc(xa - arc / 2.0, line - arc, 0);
        self.line(xv, line - arc / 2.0, xv, skip + arc / 2.0);
        self.arc(xv, skip, 180);
        self.line(xv + arc / 2.0, skip, xw - arc / 2.0, skip);
        self.arc(xw - arc, skip, 270);
        self.line(xw, skip + arc / 2.0, xw, line - arc / 2.0);
        self.arc(xw, line - arc, 90);

        if let Some(sub) = node.sub() {
            let start = match direction {
                Direction::Forward => x + cgw,
                Direction::Reverse => x + width - cgw,
            };
            self.draw_level(sub, direction, start);
        }
    }

    fn draw_iteration(&mut self, node: &Node, x: f32, direction: Direction) {
        let cgw = self.config.component_gap_width();
        let width = node.geometry().size().width();
        let line = node.geometry().pos_line().y();

        self.line(x, line, x + width, line);
        let Some(sub) = node.sub() else {
            return;
        };
        let body_line = self.graph.node(sub).geometry().pos_line().y();
        self.loop_rails(x, width, line, body_line);
        let rail = cgw / 4.0 + self.config.arc_size();
        self.line(x + rail, body_line, x + cgw, body_line);
        self.line(x + width - cgw, body_line, x + width - rail, body_line);

        let reverse = direction.flip();
        let start = match reverse {
            Direction::Forward => x + cgw,
            Direction::Reverse => x + width - cgw,
        };
        self.draw_level(sub, reverse, start);
    }

    fn draw_rerun(&mut self, node: &Node, x: f32, direction: Direction) {
        let cgw = self.config.component_gap_width();
        let geometry = *node.geometry();
        let width = geometry.size().width();
        let line = geometry.pos_line().y();
        let repeated = geometry.alt_size();

        // Repeated part on the track, centered.
        let repeated_left = x + (width - repeated.width()) / 2.0;
        let repeated_right = repeated_left + repeated.width();
        self.line(x, line, repeated_left, line);
        self.line(repeated_right, line, x + width, line);
        if let Some(sub) = node.sub() {
            let start = match direction {
                Direction::Forward => repeated_left,
                Direction::Reverse => repeated_right,
            };
            self.draw_level(sub, direction, start);
        }

        match node.loop_body() {
            Some(between) => {
                let body_line = self.graph.node(between).geometry().pos_line().y();
                let body = geometry.iter_size();
                let body_left = x + (width - body.width()) / 2.0;
                let body_right = body_left + body.width();
                self.loop_rails(x, width, line, body_line);
                self.line(x + cgw / 4.0 + self.config.arc_size(), body_line, body_left, body_line);
                self.line(
                    body_right,
                    body_line,
                    x + width - cgw / 4.0 - self.config.arc_size(),
                    body_line,
                );

                let reverse = direction.flip();
                let start = match reverse {
                    Direction::Forward => body_left,
                    Direction::Reverse => body_right,
                };
                self.draw_level(between, reverse, start);
            }
            None => {
                let loop_line = geometry.pos_end().y() - self.config.component_gap_height() / 2.0;
                self.loop_rails(x, width, line, loop_line);
                self.line(
                    x + cgw / 4.0 + self.config.arc_size(),
                    loop_line,
                    x + width - cgw / 4.0 - self.config.arc_size(),
                    loop_line,
                );
            }
        }
    }

    /// Turns from the track at `line` down to `lower` and back on both
    /// sides of a loop.
    fn loop_rails(&mut self, x: f32, width: f32, line: f32, lower: f32) {
        let cgw = self.config.component_gap_width();
        let arc = self.config.arc_size();
        let x0 = x + cgw / 4.0 + arc / 2.0;
        let x1 = x + width - cgw / 4.0 - arc / 2.0;

        self.arc(x0, line, 180);
        self.line(x0, line + arc / 2.0, x0, lower - arc / 2.0);
        self.arc(x0, lower - arc, 90);

        self.arc(x1 - arc, line, 270);
        self.line(x1, line + arc / 2.0, x1, lower - arc / 2.0);
        self.arc(x1 - arc, lower - arc, 0);
    }

    fn draw_alternation(&mut self, head: NodeId, x: f32, direction: Direction) {
        let graph = self.graph;
        let arc = self.config.arc_size();
        let group = graph.node(head).extent();
        let width = group.width();
        let line = graph.node(head).geometry().pos_line().y();
        let branches: Vec<NodeId> = graph.branches(head).collect();

        self.line(x, line, x + 1.5 * arc, line);
        self.line(x + width - 1.5 * arc, line, x + width, line);

        if let Some(last) = branches.last().filter(|_| branches.len() > 1) {
            let last_line = graph.node(*last).geometry().pos_line().y();
            self.arc(x, line, 270);
            self.line(x + arc, line + arc / 2.0, x + arc, last_line - arc / 2.0);
            self.arc(x + width - arc, line, 180);
            self.line(
                x + width - arc,
                line + arc / 2.0,
                x + width - arc,
                last_line - arc / 2.0,
            );
        }

        for (index, branch) in branches.iter().enumerate() {
            let node = graph.node(*branch);
            let branch_width = node.geometry().size().width();
            let branch_line = node.geometry().pos_line().y();
            let branch_left = x + (width - branch_width) / 2.0;
            let branch_right = branch_left + branch_width;

            let saved = if index > 0 { Some(self.enter(node)) } else { None };
            if index > 0 {
                self.arc(x + arc, branch_line - arc, 90);
                self.arc(x + width - 2.0 * arc, branch_line - arc, 0);
            }
            self.line(x + 1.5 * arc, branch_line, branch_left, branch_line);
            self.line(branch_right, branch_line, x + width - 1.5 * arc, branch_line);

            if let Some(sub) = node.sub() {
                let start = match direction {
                    Direction::Forward => branch_left,
                    Direction::Reverse => branch_right,
                };
                self.draw_level(sub, direction, start);
            }
            if let Some(saved) = saved {
                self.active = saved;
            }
        }
    }

    /// Carries the track from the end of a row to the start of the next one
    /// and returns the new cursor.
    fn draw_wrap(&mut self, node: &Node, next: NodeId, cursor: f32) -> f32 {
        let cgw = self.config.component_gap_width();
        let arc = self.config.arc_size();
        let origin = self.config.margin().left();
        let line = node.geometry().pos_line().y();
        let bottom = node.geometry().pos_end().y();
        let next_line = self.graph.node(next).geometry().pos_line().y();

        let right = cursor + cgw / 4.0;
        self.line(cursor, line, right, line);
        self.arc(right - arc / 2.0, line, 270);
        self.line(right + arc / 2.0, line + arc / 2.0, right + arc / 2.0, bottom - arc / 2.0);
        self.arc(right - arc / 2.0, bottom - arc, 0);

        let left = origin - cgw / 4.0;
        self.line(right, bottom, left, bottom);
        self.arc(left - arc / 2.0, bottom, 180);
        self.line(left - arc / 2.0, bottom + arc / 2.0, left - arc / 2.0, next_line - arc / 2.0);
        self.arc(left - arc / 2.0, next_line - arc, 90);
        self.line(left, next_line, origin, next_line);
        origin
    }

    fn frame(&mut self, node: &Node, left: f32) {
        let color_name = match node.kind() {
            NodeKind::Terminal | NodeKind::Nonterminal => "gray",
            NodeKind::Epsilon => "magenta",
            NodeKind::Optional => "orange",
            NodeKind::Iteration => "blue",
            NodeKind::Rerun => "green",
            NodeKind::Alternative => "red",
            NodeKind::Wrap => "purple",
        };
        let color = Color::new(color_name).unwrap_or_default();
        let top = node.geometry().pos_begin().y();
        self.surface.draw(Primitive::Frame {
            origin: Point::new(left, top),
            size: node.extent(),
            stroke: StrokeDefinition::new(color, 0.5, StrokeStyle::Dashed),
        });
    }

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.surface.draw(Primitive::Line {
            from: Point::new(x1, y1),
            to: Point::new(x2, y2),
            stroke: self.active.stroke,
        });
    }

    fn arc(&mut self, x: f32, y: f32, start_angle: u16) {
        self.surface.draw(Primitive::Arc {
            origin: Point::new(x, y),
            diameter: self.config.arc_size(),
            start_angle,
            stroke: self.active.stroke,
        });
    }

    fn arrow(&mut self, x: f32, y: f32, direction: Direction) {
        self.surface.draw(Primitive::Arrow {
            tip: Point::new(x, y),
            direction,
            size: self.config.arrow_size(),
            color: self.active.stroke.color(),
        });
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use trestle_core::{
        expr::{Expr, Leaf, Production},
        style::NodeStyle,
    };

    use super::*;
    use crate::{
        config::{BuildConfig, TextMetrics},
        grammar::Grammar,
        layout::LayoutEngine,
    };

    fn render(expr: Expr, style: &StyleConfig) -> Vec<Primitive> {
        let config = LayoutConfig::default().with_text_metrics(TextMetrics::Fixed);
        let grammar =
            Grammar::from_productions(&[Production::new("p", expr)], &BuildConfig::default())
                .unwrap();
        let mut graph = grammar.graph("p").unwrap().clone();
        LayoutEngine::new(&config, grammar.symbols())
            .layout(&mut graph)
            .unwrap();
        let chart = ChartStyle::from_config(style).unwrap();
        let mut primitives = Vec::new();
        Renderer::new(&graph, grammar.symbols(), &config, &chart, &mut primitives).draw();
        primitives
    }

    fn texts(primitives: &[Primitive]) -> Vec<&str> {
        primitives
            .iter()
            .filter_map(|primitive| match primitive {
                Primitive::Text { content, .. } => Some(content.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_sequence_draws_labels_in_order() {
        let primitives = render(
            Expr::sequence(vec![Expr::literal("a"), Expr::identifier("b")]),
            &StyleConfig::default(),
        );
        assert_eq!(texts(&primitives), vec!["a", "b"]);
        let rects = primitives
            .iter()
            .filter(|primitive| matches!(primitive, Primitive::Rect { .. }))
            .count();
        assert_eq!(rects, 2);
    }

    #[test]
    fn test_terminal_is_rounded_and_nonterminal_square() {
        let primitives = render(
            Expr::sequence(vec![Expr::literal("a"), Expr::identifier("b")]),
            &StyleConfig::default(),
        );
        let radii: Vec<f32> = primitives
            .iter()
            .filter_map(|primitive| match primitive {
                Primitive::Rect { corner_radius, .. } => Some(*corner_radius),
                _ => None,
            })
            .collect();
        assert!(radii[0] > 0.0);
        assert_approx_eq!(f32, radii[1], 0.0);
    }

    #[test]
    fn test_single_closing_arrow_points_forward() {
        let primitives = render(Expr::literal("a"), &StyleConfig::default());
        let arrows: Vec<Direction> = primitives
            .iter()
            .filter_map(|primitive| match primitive {
                Primitive::Arrow { direction, .. } => Some(*direction),
                _ => None,
            })
            .collect();
        // Entry arrow of the terminal, then the closing arrow.
        assert_eq!(arrows, vec![Direction::Forward, Direction::Forward]);
    }

    #[test]
    fn test_iteration_body_drawn_in_reverse() {
        let primitives = render(Expr::repeat(Expr::literal("a")), &StyleConfig::default());
        let entry_arrows: Vec<Direction> = primitives
            .iter()
            .filter_map(|primitive| match primitive {
                Primitive::Arrow { direction, .. } => Some(*direction),
                _ => None,
            })
            .collect();
        assert_eq!(entry_arrows[0], Direction::Reverse);
    }

    #[test]
    fn test_option_uses_four_arcs() {
        let primitives = render(Expr::optional(Expr::literal("a")), &StyleConfig::default());
        let arcs = primitives
            .iter()
            .filter(|primitive| matches!(primitive, Primitive::Arc { .. }))
            .count();
        assert_eq!(arcs, 4);
    }

    #[test]
    fn test_borders_only_when_enabled() {
        let expr = Expr::sequence(vec![Expr::literal("a"), Expr::optional(Expr::literal("b"))]);
        let plain = render(expr.clone(), &StyleConfig::default());
        assert!(!plain.iter().any(|p| matches!(p, Primitive::Frame { .. })));

        let debug = render(expr, &StyleConfig::default().with_show_borders(true));
        let frames = debug
            .iter()
            .filter(|p| matches!(p, Primitive::Frame { .. }))
            .count();
        assert_eq!(frames, 3);
    }

    #[test]
    fn test_everything_drawn_inside_positive_space() {
        let primitives = render(
            Expr::sequence(vec![
                Expr::alternation(vec![Expr::literal("a"), Expr::repeat(Expr::identifier("b"))]),
                Expr::optional(Expr::literal("c")),
            ]),
            &StyleConfig::default(),
        );
        for primitive in &primitives {
            if let Primitive::Line { from, to, .. } = primitive {
                assert!(from.x() >= 0.0 && from.y() >= 0.0, "{primitive:?}");
                assert!(to.x() >= 0.0 && to.y() >= 0.0, "{primitive:?}");
            }
        }
    }

    #[test]
    fn test_node_style_applies_to_its_node_only() {
        let red = Color::new("red").unwrap();
        let blue = Color::new("blue").unwrap();
        let style = NodeStyle::default()
            .with_line_color(red)
            .with_node_color(blue);
        let primitives = render(
            Expr::sequence(vec![
                Expr::Literal(Leaf::new("a").with_style(style)),
                Expr::literal("b"),
                Expr::optional(Expr::literal("c")),
            ]),
            &StyleConfig::default(),
        );
        let chart = ChartStyle::from_config(&StyleConfig::default()).unwrap();

        let strokes: Vec<Color> = primitives
            .iter()
            .filter_map(|primitive| match primitive {
                Primitive::Rect { stroke, .. } => Some(stroke.color()),
                _ => None,
            })
            .collect();
        assert_eq!(strokes, vec![red, chart.line(), chart.line()]);

        let colors: Vec<Color> = primitives
            .iter()
            .filter_map(|primitive| match primitive {
                Primitive::Text { color, .. } => Some(*color),
                _ => None,
            })
            .collect();
        assert_eq!(colors[0], blue);
        assert!(colors[1..].iter().all(|color| *color != blue));
    }
}

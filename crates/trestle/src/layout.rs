//! Sizes and positions every node of a diagram graph.
//!
//! Each node gets a box (`size`, or `alt_size` for alternation heads) and an
//! `ascent`: the distance from the top of the box to the track the node sits
//! on. All nodes of a row share one track, placed at the row top plus the
//! largest ascent on the row. Rows are separated by active wrap nodes on
//! the top level.
//!
//! A layout run is a fixed sequence of passes:
//!
//! 1. reset every node's geometry,
//! 2. size pass,
//! 3. wrap insertion when a page width is configured,
//! 4. wrap-size pass, freezing row heights on active wraps,
//! 5. size pass again, observing the final wrap states,
//! 6. position pass,
//! 7. geometry validation.
//!
//! Running the layout twice on the same graph produces the same geometry.

use log::{debug, trace};
use thiserror::Error;

use trestle_core::{
    draw::TextMeasure,
    geometry::{Point, Size},
};

use crate::{
    config::LayoutConfig,
    grammar::SymbolTable,
    graph::{DiagramGraph, Node, NodeId, NodeKind},
};

/// Tolerance for comparing accumulated float sizes.
const TOLERANCE: f32 = 1e-3;

/// A node ended up with a size or position that cannot be drawn.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid geometry on {kind} node (serial {serial}): {detail}")]
pub struct GeometryError {
    serial: usize,
    kind: NodeKind,
    detail: String,
}

impl GeometryError {
    fn new(node: &Node, detail: impl Into<String>) -> Self {
        Self {
            serial: node.serial(),
            kind: node.kind(),
            detail: detail.into(),
        }
    }

    pub fn serial(&self) -> usize {
        self.serial
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }
}

/// Outcome of a layout run.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    row_heights: Vec<f32>,
    content: Size,
    size: Size,
}

impl Layout {
    /// Height of every row, top to bottom.
    pub fn row_heights(&self) -> &[f32] {
        &self.row_heights
    }

    /// Widest row by the sum of all row heights.
    pub fn content_size(&self) -> Size {
        self.content
    }

    /// Final drawing dimensions including margins.
    pub fn size(&self) -> Size {
        self.size
    }
}

/// Width and vertical extent of a run of nodes sharing one track.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct RowExtent {
    width: f32,
    ascent: f32,
    descent: f32,
}

impl RowExtent {
    fn include(&mut self, advance: f32, ascent: f32, descent: f32) {
        self.width += advance;
        self.ascent = self.ascent.max(ascent);
        self.descent = self.descent.max(descent);
    }

    fn height(self) -> f32 {
        self.ascent + self.descent
    }

    fn size(self) -> Size {
        Size::new(self.width, self.height())
    }
}

/// Computes node geometry from the layout constants.
pub struct LayoutEngine<'a> {
    config: &'a LayoutConfig,
    symbols: &'a SymbolTable,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(config: &'a LayoutConfig, symbols: &'a SymbolTable) -> Self {
        Self { config, symbols }
    }

    /// Lays out `graph` from scratch.
    ///
    /// # Errors
    ///
    /// Returns a [`GeometryError`] when a node ends up with a non-finite or
    /// negative size or position.
    pub fn layout(&self, graph: &mut DiagramGraph) -> Result<Layout, GeometryError> {
        let entry = graph.entry();

        self.reset(graph);
        self.size_level(graph, entry);
        if let Some(limit) = self.config.page_width() {
            self.insert_wraps(graph, limit);
        }
        self.freeze_rows(graph);
        self.size_level(graph, entry);

        let rows = self.page_rows(graph);
        let margin = self.config.margin();
        self.place_page(graph, margin.top());
        validate(graph)?;

        let content = Size::new(
            rows.iter().map(|row| row.width).fold(0.0, f32::max),
            rows.iter().map(|row| row.height()).sum(),
        );
        let size = Size::new(
            margin.left() + content.width() + self.tail_allowance() + margin.right(),
            margin.top() + content.height() + margin.bottom(),
        );
        debug!(
            rows = rows.len(),
            width = size.width(),
            height = size.height();
            "Layout complete"
        );

        Ok(Layout {
            row_heights: rows.iter().map(|row| row.height()).collect(),
            content,
            size,
        })
    }

    /// Room right of the widest row for the closing arrow or a wrap turn.
    fn tail_allowance(&self) -> f32 {
        let arrow = self.config.arrow_size();
        let turn = self.config.arc_size() / 2.0;
        self.config.component_gap_width() / 4.0 + arrow.max(turn)
    }

    fn font_height(&self) -> f32 {
        self.config
            .text_metrics()
            .font_height(self.config.font())
    }

    fn reset(&self, graph: &mut DiagramGraph) {
        for index in 0..graph.len() {
            graph.node_mut(NodeId::from_index(index)).geometry = Default::default();
        }
    }

    // Size pass

    /// Sizes every node of the level at `start` and returns the extent of
    /// its first row.
    fn size_level(&self, graph: &mut DiagramGraph, start: NodeId) -> RowExtent {
        let ids: Vec<NodeId> = graph.level(start).collect();
        for id in ids {
            self.size_node(graph, id);
        }
        self.measure_row(graph, start).0
    }

    fn size_child(&self, graph: &mut DiagramGraph, child: Option<NodeId>) -> RowExtent {
        child
            .map(|start| self.size_level(graph, start))
            .unwrap_or_default()
    }

    fn size_node(&self, graph: &mut DiagramGraph, id: NodeId) {
        let cgw = self.config.component_gap_width();
        let cgh = self.config.component_gap_height();
        let node = graph.node(id);
        let (kind, sub, loop_body) = (node.kind(), node.sub(), node.loop_body());

        match kind {
            NodeKind::Terminal | NodeKind::Nonterminal => {
                let label = self.label_size(node);
                let mut width = label.width() + 2.0 * self.config.symbol_gap_width();
                if kind == NodeKind::Terminal {
                    width = width.max(self.config.arc_size());
                }
                let height = label.height()
                    + 2.0 * self.config.symbol_gap_height()
                    + cgh;
                let geometry = &mut graph.node_mut(id).geometry;
                geometry.size = Size::new(width, height);
                geometry.ascent = height / 2.0;
            }
            NodeKind::Epsilon => {
                let height = self.font_height() + cgh;
                let geometry = &mut graph.node_mut(id).geometry;
                geometry.size = Size::new(cgw, height);
                geometry.ascent = height / 2.0;
            }
            NodeKind::Optional => {
                let inner = self.size_child(graph, sub);
                let geometry = &mut graph.node_mut(id).geometry;
                geometry.size = Size::new(inner.width + 2.0 * cgw, inner.height() + cgh / 2.0);
                geometry.ascent = cgh / 2.0 + inner.ascent;
            }
            NodeKind::Iteration => {
                let inner = self.size_child(graph, sub);
                let compensation = (self.font_height() + cgh) / 2.0;
                let geometry = &mut graph.node_mut(id).geometry;
                geometry.size = Size::new(inner.width + 2.0 * cgw, compensation + inner.height());
                geometry.ascent = compensation;
            }
            NodeKind::Rerun => {
                let repeated = self.size_child(graph, sub);
                let geometry_size = match loop_body {
                    Some(start) => {
                        let between = self.size_level(graph, start);
                        graph.node_mut(id).geometry.iter_size = between.size();
                        Size::new(
                            repeated.width.max(between.width) + 2.0 * cgw,
                            repeated.height() + between.height(),
                        )
                    }
                    None => Size::new(repeated.width + 2.0 * cgw, repeated.height() + cgh / 2.0),
                };
                let geometry = &mut graph.node_mut(id).geometry;
                geometry.alt_size = repeated.size();
                geometry.size = geometry_size;
                geometry.ascent = repeated.ascent;
            }
            NodeKind::Alternative => self.size_alternation(graph, id),
            // Wrap heights are owned by the wrap-size pass.
            NodeKind::Wrap => {}
        }

        let node = graph.node(id);
        trace!(
            serial = node.serial(),
            kind:% = node.kind(),
            width = node.extent().width(),
            height = node.extent().height(),
            ascent = node.geometry().ascent();
            "Sized node"
        );
    }

    fn size_alternation(&self, graph: &mut DiagramGraph, head: NodeId) {
        let cgw = self.config.component_gap_width();
        let cgh = self.config.component_gap_height();
        let branches: Vec<NodeId> = graph.branches(head).collect();

        let mut width: f32 = 0.0;
        let mut height = 0.0;
        for (index, branch) in branches.iter().enumerate() {
            let sub = graph.node(*branch).sub();
            let inner = self.size_child(graph, sub);
            let geometry = &mut graph.node_mut(*branch).geometry;
            geometry.size = inner.size();
            geometry.ascent = inner.ascent;

            width = width.max(inner.width);
            if index > 0 {
                height += cgh;
            }
            height += inner.height();
        }
        let group = Size::new(width + 2.0 * cgw, height);
        for branch in branches {
            graph.node_mut(branch).geometry.alt_size = group;
        }
    }

    fn label_size(&self, node: &Node) -> Size {
        let name = node
            .symbol()
            .and_then(|symbol| self.symbols.name(symbol))
            .unwrap_or_default();
        let font = node.style().font().unwrap_or(self.config.font());
        self.config.text_metrics().text_size(name, font)
    }

    /// Horizontal room a node takes on its row, including a trailing
    /// connector track.
    fn advance(&self, graph: &DiagramGraph, id: NodeId) -> f32 {
        let node = graph.node(id);
        if node.kind() == NodeKind::Wrap {
            return 0.0;
        }
        let connector = if graph.has_connector(id) {
            self.config.component_gap_width() / 2.0
        } else {
            0.0
        };
        node.extent().width() + connector
    }

    /// Measures the row starting at `start` and returns where the next row
    /// starts, if an active wrap ends this one.
    fn measure_row(&self, graph: &DiagramGraph, start: NodeId) -> (RowExtent, Option<NodeId>) {
        let mut row = RowExtent::default();
        for id in graph.level(start) {
            let node = graph.node(id);
            if node.kind() == NodeKind::Wrap {
                if node.geometry().breaks_row() {
                    return (row, node.next());
                }
                continue;
            }
            let ascent = node.geometry().ascent();
            let descent = node.extent().height() - ascent;
            row.include(self.advance(graph, id), ascent, descent);
        }
        (row, None)
    }

    fn page_rows(&self, graph: &DiagramGraph) -> Vec<RowExtent> {
        let mut rows = Vec::new();
        let mut start = Some(graph.entry());
        while let Some(first) = start {
            let (row, next) = self.measure_row(graph, first);
            rows.push(row);
            start = next;
        }
        rows
    }

    // Wrapping

    /// Decides where the top level breaks and activates a wrap there.
    ///
    /// A row that overflows breaks after the next symbol, or after its last
    /// symbol when none follows. A row without any symbol to break after
    /// breaks after its first node that has a successor.
    fn insert_wraps(&self, graph: &mut DiagramGraph, limit: f32) {
        let chain: Vec<NodeId> = graph
            .level(graph.entry())
            .filter(|id| graph.node(*id).kind() != NodeKind::Wrap)
            .collect();
        let breakable = |id: NodeId| {
            let node = graph.node(id);
            node.kind().is_symbol() && node.next().is_some()
        };

        let mut breaks = Vec::new();
        let mut row_start = 0;
        let mut sum = 0.0;
        let mut index = 0;
        while index < chain.len() {
            sum += self.advance(graph, chain[index]);
            if sum <= limit {
                index += 1;
                continue;
            }

            let ahead = (index..chain.len()).find(|at| breakable(chain[*at]));
            let behind = || (row_start..index).rev().find(|at| breakable(chain[*at]));
            let first = || {
                (row_start..=index)
                    .find(|at| at + 1 < chain.len() && graph.node(chain[*at]).next().is_some())
            };
            let Some(at) = ahead.or_else(behind).or_else(first) else {
                break;
            };
            breaks.push(chain[at]);
            row_start = at + 1;
            index = at + 1;
            sum = 0.0;
        }

        debug!(breaks = breaks.len(), limit; "Row breaks decided");
        for id in breaks {
            self.break_after(graph, id);
        }
    }

    fn break_after(&self, graph: &mut DiagramGraph, id: NodeId) {
        let next = graph.node(id).next();
        if let Some(wrap) = next.filter(|next| graph.node(*next).kind() == NodeKind::Wrap) {
            graph.node_mut(wrap).geometry.wrap_enabled = true;
            return;
        }

        let mut wrap = Node::new(graph.next_serial(), NodeKind::Wrap);
        wrap.link(next, false);
        wrap.geometry.wrap_enabled = true;
        let wrap_id = graph.push(wrap);
        graph.node_mut(id).link(Some(wrap_id), false);
        trace!(after = graph.node(id).serial(); "Inserted wrap");
    }

    /// Marks the top level and stores the height of the row each active wrap
    /// closes on the wrap itself.
    fn freeze_rows(&self, graph: &mut DiagramGraph) {
        let chain: Vec<NodeId> = graph.level(graph.entry()).collect();
        let mut row = RowExtent::default();

        for id in chain {
            graph.node_mut(id).geometry.first_level = true;
            let node = graph.node(id);
            if node.kind() == NodeKind::Wrap {
                if node.geometry.wrap_enabled && row.height() > 0.0 {
                    graph.node_mut(id).geometry.size = Size::new(0.0, row.height());
                    row = RowExtent::default();
                }
                continue;
            }
            let ascent = node.geometry().ascent();
            row.include(0.0, ascent, node.extent().height() - ascent);
        }
    }

    // Position pass

    fn place_page(&self, graph: &mut DiagramGraph, top: f32) {
        let mut row_top = top;
        let mut start = Some(graph.entry());

        while let Some(first) = start {
            let (row, next) = self.measure_row(graph, first);
            let line = row_top + row.ascent;
            let ids: Vec<NodeId> = graph.level(first).collect();
            for id in ids {
                if graph.node(id).kind() != NodeKind::Wrap {
                    self.place_node(graph, id, line);
                    continue;
                }
                let height = graph.node(id).geometry().size().height();
                set_vertical(graph, id, row_top, line, row_top + height);
                if height > 0.0 {
                    break;
                }
            }
            row_top += row.height();
            start = next;
        }
    }

    fn place_level(&self, graph: &mut DiagramGraph, start: Option<NodeId>, top: f32) {
        let Some(start) = start else {
            return;
        };
        let (row, _) = self.measure_row(graph, start);
        let line = top + row.ascent;
        let ids: Vec<NodeId> = graph.level(start).collect();
        for id in ids {
            self.place_node(graph, id, line);
        }
    }

    fn place_node(&self, graph: &mut DiagramGraph, id: NodeId, line: f32) {
        let cgh = self.config.component_gap_height();
        let node = graph.node(id);
        let (kind, sub, loop_body) = (node.kind(), node.sub(), node.loop_body());
        let alt_size = node.geometry().alt_size();
        let begin = line - node.geometry().ascent();
        let end = begin + node.extent().height();
        set_vertical(graph, id, begin, line, end);

        match kind {
            NodeKind::Optional => self.place_level(graph, sub, begin + cgh / 2.0),
            NodeKind::Iteration => self.place_level(graph, sub, line),
            NodeKind::Rerun => {
                self.place_level(graph, sub, begin);
                self.place_level(graph, loop_body, begin + alt_size.height());
            }
            NodeKind::Alternative => {
                let branches: Vec<NodeId> = graph.branches(id).collect();
                let mut top = begin;
                for (index, branch) in branches.into_iter().enumerate() {
                    let geometry = *graph.node(branch).geometry();
                    if index > 0 {
                        set_vertical(
                            graph,
                            branch,
                            top,
                            top + geometry.ascent(),
                            top + geometry.size().height(),
                        );
                    }
                    let sub = graph.node(branch).sub();
                    self.place_level(graph, sub, top);
                    top += geometry.size().height() + cgh;
                }
            }
            _ => {}
        }
    }
}

fn set_vertical(graph: &mut DiagramGraph, id: NodeId, begin: f32, line: f32, end: f32) {
    let geometry = &mut graph.node_mut(id).geometry;
    geometry.pos_begin = Point::new(0.0, begin);
    geometry.pos_line = Point::new(0.0, line);
    geometry.pos_end = Point::new(0.0, end);
}

fn validate(graph: &DiagramGraph) -> Result<(), GeometryError> {
    for (_, node) in graph.iter() {
        let geometry = node.geometry();
        let sizes = [geometry.size(), geometry.alt_size(), geometry.iter_size()];
        if let Some(size) = sizes.iter().find(|size| !size.is_valid()) {
            return Err(GeometryError::new(node, format!("size {size:?}")));
        }

        let ascent = geometry.ascent();
        if !ascent.is_finite() || ascent < 0.0 || ascent > node.extent().height() + TOLERANCE {
            return Err(GeometryError::new(node, format!("ascent {ascent}")));
        }

        let positions = [geometry.pos_begin(), geometry.pos_line(), geometry.pos_end()];
        if let Some(point) = positions
            .iter()
            .find(|point| !point.is_finite() || point.x() < 0.0 || point.y() < 0.0)
        {
            return Err(GeometryError::new(node, format!("position {point:?}")));
        }
        if geometry.pos_end().y() + TOLERANCE < geometry.pos_begin().y() {
            return Err(GeometryError::new(node, "box ends above its start"));
        }
    }
    Ok(())
}

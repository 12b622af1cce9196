//! Layer-based collection of SVG nodes.
//!
//! Primitives are converted to SVG elements in the order the renderer emits
//! them, which interleaves tracks, boxes and labels. [`LayeredOutput`] groups
//! the elements by [`RenderLayer`] so that labels always end up above the
//! boxes they sit in, and boxes above the tracks running into them.
//!
//! # Example
//!
//! ```
//! # use trestle_core::draw::{RenderLayer, LayeredOutput};
//! # use svg::node::element::{Line, Text};
//! let mut output = LayeredOutput::new();
//! output.add_to_layer(RenderLayer::Text, Box::new(Text::new("expr")));
//! output.add_to_layer(RenderLayer::Track, Box::new(Line::new()));
//!
//! // Track group first, then text
//! let svg_nodes = output.render();
//! assert_eq!(svg_nodes.len(), 2);
//! ```

use svg::node::element as svg_element;

/// Type alias for boxed SVG nodes.
pub type SvgNode = Box<dyn svg::Node>;

/// Rendering layers, bottom to top in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RenderLayer {
    /// Page background
    Background,
    /// Debug frames around node boxes
    Frame,
    /// Lines and arcs connecting the nodes
    Track,
    /// Terminal and nonterminal boxes
    Shape,
    /// Arrow heads
    Arrow,
    /// Labels
    Text,
}

impl RenderLayer {
    /// Returns a human-readable name for this layer.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::Frame => "frame",
            Self::Track => "track",
            Self::Shape => "shape",
            Self::Arrow => "arrow",
            Self::Text => "text",
        }
    }
}

/// SVG nodes grouped by rendering layer.
#[derive(Debug, Default)]
pub struct LayeredOutput {
    items: Vec<(RenderLayer, SvgNode)>,
}

impl LayeredOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node to the specified layer, after the nodes already there.
    pub fn add_to_layer(&mut self, layer: RenderLayer, node: SvgNode) {
        self.items.push((layer, node));
    }

    /// Appends all nodes of another output to this one.
    pub fn merge(&mut self, other: LayeredOutput) {
        self.items.extend(other.items);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Renders all layers to SVG groups, consuming the output.
    ///
    /// Each non-empty layer becomes a `<g data-layer="...">` element. Nodes
    /// keep their insertion order within a layer.
    pub fn render(mut self) -> Vec<SvgNode> {
        if self.is_empty() {
            return Vec::new();
        }

        self.items.sort_by_key(|(layer, _)| *layer);

        let mut result = Vec::new();
        let mut current_layer = self.items[0].0;
        let mut current_group = svg_element::Group::new().set("data-layer", current_layer.name());

        for (layer, node) in self.items {
            if layer != current_layer {
                result.push(Box::new(current_group) as SvgNode);
                current_layer = layer;
                current_group = svg_element::Group::new().set("data-layer", layer.name());
            }
            current_group = current_group.add(node);
        }

        result.push(Box::new(current_group) as SvgNode);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use svg::node::element::{Line, Rectangle};

    #[test]
    fn test_layered_output_new() {
        assert!(LayeredOutput::new().is_empty());
    }

    #[test]
    fn test_layered_output_merge() {
        let mut output1 = LayeredOutput::new();
        output1.add_to_layer(RenderLayer::Shape, Box::new(Rectangle::new()));

        let mut output2 = LayeredOutput::new();
        output2.add_to_layer(RenderLayer::Track, Box::new(Line::new()));

        output1.merge(output2);
        assert_eq!(output1.render().len(), 2);
    }

    #[test]
    fn test_layered_output_groups_same_layer() {
        let mut output = LayeredOutput::new();
        output.add_to_layer(RenderLayer::Track, Box::new(Line::new()));
        output.add_to_layer(RenderLayer::Shape, Box::new(Rectangle::new()));
        output.add_to_layer(RenderLayer::Track, Box::new(Line::new()));

        assert_eq!(output.render().len(), 2);
    }

    #[test]
    fn test_layered_output_orders_layers_bottom_up() {
        let mut output = LayeredOutput::new();
        output.add_to_layer(RenderLayer::Text, Box::new(Rectangle::new()));
        output.add_to_layer(RenderLayer::Background, Box::new(Rectangle::new()));

        let nodes = output.render();
        let first = nodes[0].to_string();
        assert!(first.contains("data-layer=\"background\""));
    }
}

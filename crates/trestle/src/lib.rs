//! Trestle - railroad (syntax) diagrams for EBNF grammars.
//!
//! A grammar is parsed into expression trees, every production is compiled
//! into a flat linked [`graph::DiagramGraph`], laid out, and drawn as a
//! railroad diagram: terminals and nonterminals as boxes on a track,
//! alternatives as parallel tracks, options as bypasses and repetitions as
//! loops.

pub mod builder;
pub mod config;
pub mod grammar;
pub mod graph;
pub mod layout;
pub mod render;

mod error;
mod export;

pub use trestle_core::{color, draw, expr, geometry, style};

pub use error::TrestleError;

use log::{debug, info, trace};

use trestle_core::{
    draw::{Primitive, Surface},
    expr::Production,
    geometry::Size,
};

use config::AppConfig;
use export::SvgExporter;
use grammar::Grammar;
use graph::DiagramGraph;
use layout::{Layout, LayoutEngine};
use render::{ChartStyle, Renderer};

/// A drawn diagram: the primitives in drawing order plus the laid-out graph
/// they were drawn from.
#[derive(Debug, Clone)]
pub struct RenderedDiagram {
    name: String,
    primitives: Vec<Primitive>,
    graph: DiagramGraph,
    layout: Layout,
}

impl RenderedDiagram {
    /// Production the diagram shows.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// The positioned graph.
    pub fn graph(&self) -> &DiagramGraph {
        &self.graph
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Final drawing dimensions including margins.
    pub fn size(&self) -> Size {
        self.layout.size()
    }
}

/// Builder for parsing grammars and rendering their diagrams.
///
/// # Examples
///
/// ```rust,no_run
/// use trestle::{DiagramBuilder, config::AppConfig};
///
/// let source = r#"list = item { "," item } ."#;
///
/// let builder = DiagramBuilder::new(AppConfig::default());
/// let grammar = builder.parse(source).expect("Failed to parse");
/// let svg = builder.render_svg(&grammar, "list").expect("Failed to render");
/// assert!(svg.contains("<svg"));
///
/// // Or use the default config
/// let builder = DiagramBuilder::default();
/// ```
#[derive(Default)]
pub struct DiagramBuilder {
    config: AppConfig,
}

impl DiagramBuilder {
    /// Create a new diagram builder with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Build, layout and style settings
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse grammar source and compile every production.
    ///
    /// # Errors
    ///
    /// Returns `TrestleError::Parse` for syntax errors and
    /// `TrestleError::Build` when a production cannot be compiled.
    pub fn parse(&self, source: &str) -> Result<Grammar, TrestleError> {
        info!("Parsing grammar");

        let productions = trestle_parser::parse(source)
            .map_err(|err| TrestleError::new_parse_error(err, source))?;
        debug!(productions = productions.len(); "Grammar parsed successfully");

        self.compile(&productions)
    }

    /// Compile already parsed productions.
    ///
    /// # Errors
    ///
    /// Returns `TrestleError::Build` for an empty sequence or alternation.
    pub fn compile(&self, productions: &[Production]) -> Result<Grammar, TrestleError> {
        let grammar = Grammar::from_productions(productions, self.config.build())?;
        trace!(grammar:?; "Compiled grammar");
        Ok(grammar)
    }

    /// Lay out and draw the diagram of one production.
    ///
    /// The grammar is left untouched; layout works on a copy of the
    /// production's graph.
    ///
    /// # Errors
    ///
    /// Returns `TrestleError::Lookup` for an unknown production,
    /// `TrestleError::Config` for invalid settings and
    /// `TrestleError::Geometry` when layout produces unusable geometry.
    pub fn render(&self, grammar: &Grammar, name: &str) -> Result<RenderedDiagram, TrestleError> {
        let mut primitives = Vec::new();
        let (graph, layout) = self.draw_into(grammar, name, &mut primitives)?;
        Ok(RenderedDiagram {
            name: name.to_string(),
            primitives,
            graph,
            layout,
        })
    }

    /// Render the diagram of one production to an SVG string.
    ///
    /// # Errors
    ///
    /// Same as [`DiagramBuilder::render`].
    pub fn render_svg(&self, grammar: &Grammar, name: &str) -> Result<String, TrestleError> {
        let chart = self.chart_style()?;
        let mut exporter = SvgExporter::new(chart.background());
        let (_, layout) = self.draw_into(grammar, name, &mut exporter)?;

        let svg = exporter.finish(layout.size()).to_string();
        info!(name; "SVG rendered successfully");
        Ok(svg)
    }

    /// Render several productions into one SVG, stacked top to bottom.
    ///
    /// # Errors
    ///
    /// Returns `TrestleError::Export` when `names` is empty, otherwise the
    /// errors of [`DiagramBuilder::render`].
    pub fn render_stacked_svg(
        &self,
        grammar: &Grammar,
        names: &[&str],
    ) -> Result<String, TrestleError> {
        if names.is_empty() {
            return Err(TrestleError::Export(Box::new(export::Error::Render(
                "No productions to stack".to_string(),
            ))));
        }

        let chart = self.chart_style()?;
        let mut exporter = SvgExporter::new(chart.background());
        let mut total = Size::default();
        for name in names {
            let diagram = self.render(grammar, name)?;
            for primitive in diagram.primitives() {
                exporter.draw(primitive.translate(0.0, total.height()));
            }
            let size = diagram.size();
            total = Size::new(total.width().max(size.width()), total.height() + size.height());
        }

        let svg = exporter.finish(total).to_string();
        info!(diagrams = names.len(); "Stacked SVG rendered successfully");
        Ok(svg)
    }

    fn chart_style(&self) -> Result<ChartStyle, TrestleError> {
        ChartStyle::from_config(self.config.style()).map_err(TrestleError::Config)
    }

    fn draw_into<S: Surface>(
        &self,
        grammar: &Grammar,
        name: &str,
        surface: &mut S,
    ) -> Result<(DiagramGraph, Layout), TrestleError> {
        info!(name; "Rendering diagram");
        let layout_config = self.config.layout();
        layout_config.validate().map_err(TrestleError::Config)?;
        let chart = self.chart_style()?;

        let mut graph = grammar.graph(name)?.clone();
        let layout = LayoutEngine::new(layout_config, grammar.symbols()).layout(&mut graph)?;
        debug!(
            name,
            rows = layout.row_heights().len(),
            width = layout.size().width(),
            height = layout.size().height();
            "Layout calculated"
        );

        Renderer::new(&graph, grammar.symbols(), layout_config, &chart, surface).draw();
        Ok((graph, layout))
    }
}

//! The diagram graph: a flat, linked form of one production.
//!
//! Nodes live in an arena owned by [`DiagramGraph`] and refer to each other
//! by [`NodeId`]. A *level* is the chain reached from a node by following
//! `next` links until a link marked as escaping or the end of the chain.
//! Composite nodes own nested levels through `sub` (and `loop_body` for
//! reruns); the branches of an alternative are chained through `down`.

use std::fmt;

use trestle_core::{
    geometry::{Point, Size},
    style::NodeStyle,
};

use crate::{
    builder::BuildError,
    grammar::{SymbolId, SymbolTable},
};

/// Index of a node inside its [`DiagramGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The closed set of node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Terminal,
    Nonterminal,
    /// Empty path
    Epsilon,
    /// `[x]`: the sub level may be skipped
    Optional,
    /// `{x}`: the sub level may repeat zero or more times
    Iteration,
    /// `a {a}` or `a {b a}` drawn as one loop around `a`
    Rerun,
    /// One branch of an alternation; the first branch heads the group
    Alternative,
    /// Potential row break on the top level
    Wrap,
}

impl NodeKind {
    /// Terminals and nonterminals: the boxes carrying a label.
    pub fn is_symbol(self) -> bool {
        matches!(self, Self::Terminal | Self::Nonterminal)
    }

    pub fn is_composite(self) -> bool {
        matches!(
            self,
            Self::Optional | Self::Iteration | Self::Rerun | Self::Alternative
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Terminal => "TERM",
            Self::Nonterminal => "NONTERM",
            Self::Epsilon => "EPS",
            Self::Optional => "OPT",
            Self::Iteration => "ITER",
            Self::Rerun => "RERUN",
            Self::Alternative => "ALT",
            Self::Wrap => "WRAP",
        };
        f.write_str(name)
    }
}

/// Layout results stored on a node.
///
/// `ascent` is the distance from the top of the node's box to its
/// centerline. For an alternative head the box is `alt_size`; for every
/// other node it is `size`. Only vertical positions are stored: horizontal
/// positions follow from the drawing cursor.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Geometry {
    pub(crate) size: Size,
    pub(crate) alt_size: Size,
    pub(crate) iter_size: Size,
    pub(crate) ascent: f32,
    pub(crate) pos_begin: Point,
    pub(crate) pos_line: Point,
    pub(crate) pos_end: Point,
    pub(crate) first_level: bool,
    pub(crate) wrap_enabled: bool,
}

impl Geometry {
    pub fn size(&self) -> Size {
        self.size
    }

    /// Size of the whole alternation group (alternative heads) or of the
    /// rerun's repeated part.
    pub fn alt_size(&self) -> Size {
        self.alt_size
    }

    /// Size of a rerun's loop body.
    pub fn iter_size(&self) -> Size {
        self.iter_size
    }

    pub fn ascent(&self) -> f32 {
        self.ascent
    }

    pub fn pos_begin(&self) -> Point {
        self.pos_begin
    }

    pub fn pos_line(&self) -> Point {
        self.pos_line
    }

    pub fn pos_end(&self) -> Point {
        self.pos_end
    }

    /// Whether the node lies on the top level of the production.
    pub fn is_first_level(&self) -> bool {
        self.first_level
    }

    /// Whether a wrap node ends its row. Inactive wraps have zero height.
    pub fn breaks_row(&self) -> bool {
        self.size.height() > 0.0
    }
}

/// One vertex of the diagram graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    serial: usize,
    kind: NodeKind,
    symbol: Option<SymbolId>,
    next: Option<NodeId>,
    down: Option<NodeId>,
    sub: Option<NodeId>,
    loop_body: Option<NodeId>,
    escapes: bool,
    style: NodeStyle,
    pub(crate) geometry: Geometry,
}

impl Node {
    pub(crate) fn new(serial: usize, kind: NodeKind) -> Self {
        Self {
            serial,
            kind,
            symbol: None,
            next: None,
            down: None,
            sub: None,
            loop_body: None,
            escapes: false,
            style: NodeStyle::default(),
            geometry: Geometry::default(),
        }
    }

    pub(crate) fn with_symbol(mut self, symbol: SymbolId, style: NodeStyle) -> Self {
        self.symbol = Some(symbol);
        self.style = style;
        self
    }

    pub(crate) fn with_sub(mut self, sub: NodeId) -> Self {
        self.sub = Some(sub);
        self
    }

    pub(crate) fn with_loop_body(mut self, loop_body: Option<NodeId>) -> Self {
        self.loop_body = loop_body;
        self
    }

    /// Diagnostic number, unique within its graph.
    ///
    /// Nodes created while compiling are numbered across the whole grammar.
    /// Wrap nodes added by layout continue the numbering of their own graph
    /// and may repeat a serial used in another production.
    pub fn serial(&self) -> usize {
        self.serial
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn symbol(&self) -> Option<SymbolId> {
        self.symbol
    }

    /// Successor; on an escaping link this is the continuation of an
    /// enclosing level.
    pub fn next(&self) -> Option<NodeId> {
        self.next
    }

    /// Next branch of an alternation.
    pub fn down(&self) -> Option<NodeId> {
        self.down
    }

    pub fn sub(&self) -> Option<NodeId> {
        self.sub
    }

    pub fn loop_body(&self) -> Option<NodeId> {
        self.loop_body
    }

    /// True when `next` leaves the node's level.
    pub fn escapes(&self) -> bool {
        self.escapes
    }

    pub fn style(&self) -> &NodeStyle {
        &self.style
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// The box the node occupies on its level.
    pub fn extent(&self) -> Size {
        match self.kind {
            NodeKind::Alternative => self.geometry.alt_size,
            _ => self.geometry.size,
        }
    }

    pub(crate) fn link(&mut self, next: Option<NodeId>, escapes: bool) {
        self.next = next;
        self.escapes = escapes;
    }

    pub(crate) fn set_down(&mut self, down: NodeId) {
        self.down = Some(down);
    }
}

/// Flat linked graph of one production.
#[derive(Debug, Clone)]
pub struct DiagramGraph {
    nodes: Vec<Node>,
    entry: NodeId,
}

impl DiagramGraph {
    pub(crate) fn new(nodes: Vec<Node>, entry: NodeId) -> Self {
        Self { nodes, entry }
    }

    /// First node of the top level.
    pub fn entry(&self) -> NodeId {
        self.entry
    }

    /// Returns the node behind `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this graph.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in arena order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, node)| (NodeId(i), node))
    }

    /// The nodes of the level starting at `start`.
    pub fn level(&self, start: NodeId) -> Level<'_> {
        Level {
            graph: self,
            current: Some(start),
            remaining: self.nodes.len(),
        }
    }

    /// The branches of the alternation headed by `head`, head first.
    pub fn branches(&self, head: NodeId) -> Branches<'_> {
        Branches {
            graph: self,
            current: Some(head),
            remaining: self.nodes.len(),
        }
    }

    pub(crate) fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// A serial number not used by any node of this graph.
    pub(crate) fn next_serial(&self) -> usize {
        self.nodes
            .iter()
            .map(|node| node.serial + 1)
            .max()
            .unwrap_or(0)
    }

    /// Whether a connector track follows the node on its level.
    ///
    /// A symbol is joined to a following symbol by a short track, also
    /// across an inactive wrap. Composite constructs carry their own stubs.
    pub fn has_connector(&self, id: NodeId) -> bool {
        let node = self.node(id);
        if !node.kind.is_symbol() || node.escapes {
            return false;
        }
        let Some(next) = node.next else {
            return false;
        };
        let successor = self.node(next);
        match successor.kind {
            NodeKind::Terminal | NodeKind::Nonterminal => true,
            NodeKind::Wrap => {
                !successor.geometry.breaks_row()
                    && !successor.escapes
                    && successor
                        .next
                        .is_some_and(|after| self.node(after).kind.is_symbol())
            }
            _ => false,
        }
    }

    /// Compact EBNF-like text of the graph. Row breaks are not shown.
    ///
    /// # Examples
    ///
    /// ```
    /// use trestle::{config::BuildConfig, grammar::Grammar};
    /// use trestle::expr::{Expr, Production};
    ///
    /// let expr = Expr::sequence(vec![
    ///     Expr::literal("a"),
    ///     Expr::alternation(vec![Expr::literal("b"), Expr::identifier("c")]),
    /// ]);
    /// let grammar = Grammar::from_productions(
    ///     &[Production::new("p", expr)],
    ///     &BuildConfig::default(),
    /// ).unwrap();
    /// let graph = grammar.graph("p").unwrap();
    /// assert_eq!(graph.unparse(grammar.symbols()), "\"a\" ( \"b\" | c )");
    /// ```
    pub fn unparse(&self, symbols: &SymbolTable) -> String {
        self.unparse_level(symbols, Some(self.entry))
    }

    fn unparse_level(&self, symbols: &SymbolTable, start: Option<NodeId>) -> String {
        let Some(start) = start else {
            return String::new();
        };
        self.level(start)
            .filter_map(|id| self.unparse_node(symbols, id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn unparse_node(&self, symbols: &SymbolTable, id: NodeId) -> Option<String> {
        let node = self.node(id);
        let name = || {
            node.symbol
                .and_then(|symbol| symbols.name(symbol))
                .unwrap_or_default()
        };
        let text = match node.kind {
            NodeKind::Terminal => format!("{:?}", name()),
            NodeKind::Nonterminal => name().to_string(),
            NodeKind::Epsilon => "()".to_string(),
            NodeKind::Optional => format!("[ {} ]", self.unparse_level(symbols, node.sub)),
            NodeKind::Iteration => format!("{{ {} }}", self.unparse_level(symbols, node.sub)),
            NodeKind::Rerun => {
                let body = self.unparse_level(symbols, node.sub);
                match node.loop_body {
                    Some(loop_body) => {
                        let between = self.unparse_level(symbols, Some(loop_body));
                        format!("{body} {{ {between} {body} }}")
                    }
                    None => format!("{body} {{ {body} }}"),
                }
            }
            NodeKind::Alternative => {
                let branches: Vec<String> = self
                    .branches(id)
                    .map(|branch| self.unparse_level(symbols, self.node(branch).sub))
                    .collect();
                format!("( {} )", branches.join(" | "))
            }
            NodeKind::Wrap => return None,
        };
        Some(text)
    }

    /// Verifies that the graph is closed: every node is reachable, every
    /// nested level ends on an escaping link, the top level ends with no
    /// successor, and every composite owns its sub level.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Malformed`] describing the first violation.
    pub fn check_closure(&self) -> Result<(), BuildError> {
        let mut visited = vec![false; self.nodes.len()];
        self.check_level(self.entry, true, &mut visited)?;
        if let Some(index) = visited.iter().position(|seen| !seen) {
            return Err(self.malformed(NodeId(index), "node is unreachable"));
        }
        Ok(())
    }

    fn check_level(
        &self,
        start: NodeId,
        top_level: bool,
        visited: &mut [bool],
    ) -> Result<(), BuildError> {
        let mut current = start;
        loop {
            if std::mem::replace(&mut visited[current.0], true) {
                return Err(self.malformed(current, "node is visited twice"));
            }
            let node = self.node(current);
            self.check_children(current, visited)?;

            match (node.next, node.escapes) {
                (Some(next), false) => current = next,
                (None, false) if top_level => return Ok(()),
                (None, false) => {
                    return Err(self.malformed(current, "nested level ends without escaping"));
                }
                (_, true) if top_level => {
                    return Err(self.malformed(current, "top level link escapes"));
                }
                (_, true) => return Ok(()),
            }
        }
    }

    fn check_children(&self, id: NodeId, visited: &mut [bool]) -> Result<(), BuildError> {
        let node = self.node(id);
        if node.kind.is_symbol() && node.symbol.is_none() {
            return Err(self.malformed(id, "symbol node without symbol"));
        }
        if !node.kind.is_composite() {
            return Ok(());
        }
        let Some(sub) = node.sub else {
            return Err(self.malformed(id, "composite node without sub level"));
        };
        self.check_level(sub, false, visited)?;

        if node.kind == NodeKind::Rerun {
            if let Some(loop_body) = node.loop_body {
                self.check_level(loop_body, false, visited)?;
            }
        }
        if node.kind == NodeKind::Alternative {
            let mut branch = node.down;
            while let Some(id) = branch {
                if std::mem::replace(&mut visited[id.0], true) {
                    return Err(self.malformed(id, "branch is visited twice"));
                }
                let down = self.node(id);
                if down.kind != NodeKind::Alternative {
                    return Err(self.malformed(id, "branch is not an alternative"));
                }
                let Some(sub) = down.sub else {
                    return Err(self.malformed(id, "branch without sub level"));
                };
                self.check_level(sub, false, visited)?;
                branch = down.down;
            }
        }
        Ok(())
    }

    fn malformed(&self, id: NodeId, reason: &str) -> BuildError {
        let node = self.node(id);
        BuildError::Malformed {
            serial: node.serial,
            kind: node.kind,
            reason: reason.to_string(),
        }
    }
}

/// Iterator over the nodes of one level.
#[derive(Debug, Clone)]
pub struct Level<'g> {
    graph: &'g DiagramGraph,
    current: Option<NodeId>,
    remaining: usize,
}

impl Iterator for Level<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.current?;
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let node = self.graph.node(id);
        self.current = if node.escapes { None } else { node.next };
        Some(id)
    }
}

/// Iterator over the branches of an alternation.
#[derive(Debug, Clone)]
pub struct Branches<'g> {
    graph: &'g DiagramGraph,
    current: Option<NodeId>,
    remaining: usize,
}

impl Iterator for Branches<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.current?;
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.current = self.graph.node(id).down;
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use trestle_core::expr::{Expr, Production};

    use super::*;
    use crate::{config::BuildConfig, grammar::Grammar};

    fn compile(expr: Expr) -> Grammar {
        Grammar::from_productions(&[Production::new("p", expr)], &BuildConfig::default()).unwrap()
    }

    #[test]
    fn test_level_stops_at_escaping_link() {
        let grammar = compile(Expr::sequence(vec![
            Expr::optional(Expr::sequence(vec![Expr::literal("a"), Expr::literal("b")])),
            Expr::literal("c"),
        ]));
        let graph = grammar.graph("p").unwrap();

        let top: Vec<NodeKind> = graph
            .level(graph.entry())
            .map(|id| graph.node(id).kind())
            .collect();
        assert_eq!(top, vec![NodeKind::Optional, NodeKind::Terminal]);

        let opt = graph.node(graph.entry());
        let sub: Vec<NodeId> = graph.level(opt.sub().unwrap()).collect();
        assert_eq!(sub.len(), 2);
        let last = graph.node(sub[1]);
        assert!(last.escapes());
        assert_eq!(last.next(), graph.node(graph.entry()).next());
    }

    #[test]
    fn test_branches_follow_down_chain() {
        let grammar = compile(Expr::alternation(vec![
            Expr::literal("a"),
            Expr::literal("b"),
            Expr::literal("c"),
        ]));
        let graph = grammar.graph("p").unwrap();
        let branches: Vec<NodeId> = graph.branches(graph.entry()).collect();
        assert_eq!(branches.len(), 3);
        assert!(
            branches
                .iter()
                .all(|id| graph.node(*id).kind() == NodeKind::Alternative)
        );
    }

    #[test]
    fn test_connector_only_between_symbols() {
        let grammar = compile(Expr::sequence(vec![
            Expr::literal("a"),
            Expr::identifier("b"),
            Expr::optional(Expr::literal("c")),
        ]));
        let graph = grammar.graph("p").unwrap();
        let top: Vec<NodeId> = graph.level(graph.entry()).collect();
        assert!(graph.has_connector(top[0]));
        assert!(!graph.has_connector(top[1]));
        assert!(!graph.has_connector(top[2]));
    }

    #[test]
    fn test_unparse_nested_constructs() {
        let grammar = compile(Expr::sequence(vec![
            Expr::identifier("x"),
            Expr::optional(Expr::literal("y")),
            Expr::repeat(Expr::alternation(vec![Expr::literal("z"), Expr::Empty])),
        ]));
        let graph = grammar.graph("p").unwrap();
        assert_eq!(
            graph.unparse(grammar.symbols()),
            "x [ \"y\" ] { ( \"z\" | () ) }"
        );
    }

    #[test]
    fn test_compiled_graph_is_closed() {
        let grammar = compile(Expr::sequence(vec![
            Expr::alternation(vec![
                Expr::sequence(vec![Expr::literal("a"), Expr::optional(Expr::literal("b"))]),
                Expr::repeat(Expr::identifier("c")),
            ]),
            Expr::literal("d"),
        ]));
        assert!(grammar.graph("p").unwrap().check_closure().is_ok());
    }

    #[test]
    fn test_closure_detects_dangling_nested_level() {
        let grammar = compile(Expr::optional(Expr::literal("a")));
        let mut graph = grammar.graph("p").unwrap().clone();
        let sub = graph.node(graph.entry()).sub().unwrap();
        graph.node_mut(sub).link(None, false);
        let err = graph.check_closure().unwrap_err();
        assert!(matches!(err, BuildError::Malformed { kind: NodeKind::Terminal, .. }));
    }
}

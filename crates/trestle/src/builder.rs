//! Compiles an expression tree into a [`DiagramGraph`].
//!
//! Construction works on *fragments*: a partially linked piece of graph
//! with an entry node, the last node of its own level (`tail`) and the
//! nested nodes whose successor is still open (`exits`). Splicing one
//! fragment after another links the tail on the same level and every exit
//! through an escaping link. [`GraphBuilder::compile`] finishes the graph by
//! closing every remaining open end.

use log::{debug, trace};
use thiserror::Error;

use trestle_core::{
    expr::{Expr, Leaf},
    style::NodeStyle,
};

use crate::{
    config::BuildConfig,
    grammar::{Grammar, SymbolId, SymbolKind},
    graph::{DiagramGraph, Node, NodeId, NodeKind},
};

/// Failures while compiling a production.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("empty {construct} in production '{production}'")]
    EmptyConstruct {
        production: String,
        construct: &'static str,
    },

    #[error("malformed {kind} node (serial {serial}): {reason}")]
    Malformed {
        serial: usize,
        kind: NodeKind,
        reason: String,
    },
}

#[derive(Debug, Clone)]
struct Fragment {
    entry: NodeId,
    tail: NodeId,
    exits: Vec<NodeId>,
}

impl Fragment {
    fn single(id: NodeId) -> Self {
        Self {
            entry: id,
            tail: id,
            exits: Vec::new(),
        }
    }

    /// Every node whose successor is still open.
    fn open_ends(&self) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::once(self.tail).chain(self.exits.iter().copied())
    }
}

/// Piece of a sequence after repetitions have been matched against their
/// neighbours.
#[derive(Debug)]
enum Segment<'e> {
    Single(&'e Expr),
    Rerun {
        body: Vec<&'e Expr>,
        loop_body: Vec<&'e Expr>,
    },
}

/// Builds the graph of one production into a grammar.
pub struct GraphBuilder<'g> {
    grammar: &'g mut Grammar,
    production: String,
    collapse_repetitions: bool,
    nodes: Vec<Node>,
}

impl<'g> GraphBuilder<'g> {
    pub fn new(grammar: &'g mut Grammar, production: &str, config: &BuildConfig) -> Self {
        Self {
            grammar,
            production: production.to_string(),
            collapse_repetitions: config.collapse_repetitions(),
            nodes: Vec::new(),
        }
    }

    /// Compiles `expr` and closes every open end of the result.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::EmptyConstruct`] for a sequence or alternation
    /// without items, and [`BuildError::Malformed`] if the finished graph is
    /// not closed.
    pub fn compile(mut self, expr: &Expr) -> Result<DiagramGraph, BuildError> {
        let fragment = self.compile_expr(expr)?;
        self.finish(&fragment);

        let graph = DiagramGraph::new(self.nodes, fragment.entry);
        graph.check_closure()?;
        debug!(production = self.production, nodes = graph.len(); "Graph built");
        Ok(graph)
    }

    fn compile_expr(&mut self, expr: &Expr) -> Result<Fragment, BuildError> {
        match expr {
            Expr::Literal(leaf) => {
                let symbol = self.grammar.register_terminal(leaf.name());
                Ok(self.symbol(NodeKind::Terminal, symbol, leaf))
            }
            Expr::Identifier(leaf) => {
                let symbol = self
                    .grammar
                    .symbols_mut()
                    .intern(SymbolKind::Nonterminal, leaf.name());
                Ok(self.symbol(NodeKind::Nonterminal, symbol, leaf))
            }
            Expr::Empty => Ok(self.epsilon()),
            Expr::Sequence(items) => {
                let segments = if self.collapse_repetitions {
                    collapse_reruns(items)
                } else {
                    items.iter().map(Segment::Single).collect()
                };
                let mut chain: Option<Fragment> = None;
                for segment in segments {
                    let fragment = match segment {
                        Segment::Single(item) => self.compile_expr(item)?,
                        Segment::Rerun { body, loop_body } => self.rerun(&body, &loop_body)?,
                    };
                    chain = Some(match chain {
                        Some(head) => self.sequence(head, fragment),
                        None => fragment,
                    });
                }
                chain.ok_or_else(|| self.empty("sequence"))
            }
            Expr::Alternation(items) => {
                let Some((first, rest)) = items.split_first() else {
                    return Err(self.empty("alternation"));
                };
                let fragment = self.compile_expr(first)?;
                let mut group = self.first_alternative(fragment);
                for item in rest {
                    let fragment = self.compile_expr(item)?;
                    self.alternative(&mut group, fragment);
                }
                Ok(group)
            }
            Expr::Optional(inner) => {
                let fragment = self.compile_expr(inner)?;
                Ok(self.option(fragment))
            }
            Expr::Repeat(inner) | Expr::RepeatOne(inner) => {
                let fragment = self.compile_expr(inner)?;
                Ok(self.iteration(fragment))
            }
        }
    }

    /// Compiles a run of items as a plain sequence.
    fn compile_items(&mut self, items: &[&Expr]) -> Result<Fragment, BuildError> {
        let mut chain: Option<Fragment> = None;
        for item in items {
            let fragment = self.compile_expr(item)?;
            chain = Some(match chain {
                Some(head) => self.sequence(head, fragment),
                None => fragment,
            });
        }
        chain.ok_or_else(|| self.empty("sequence"))
    }

    fn empty(&self, construct: &'static str) -> BuildError {
        BuildError::EmptyConstruct {
            production: self.production.clone(),
            construct,
        }
    }

    fn push(&mut self, node: Node) -> NodeId {
        trace!(serial = node.serial(), kind:% = node.kind(); "New node");
        self.nodes.push(node);
        NodeId::from_index(self.nodes.len() - 1)
    }

    fn new_node(&mut self, kind: NodeKind) -> Node {
        Node::new(self.grammar.allocate_serial(), kind)
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    fn symbol(&mut self, kind: NodeKind, symbol: SymbolId, leaf: &Leaf) -> Fragment {
        let style: NodeStyle = leaf.style().clone();
        let node = self.new_node(kind).with_symbol(symbol, style);
        Fragment::single(self.push(node))
    }

    fn epsilon(&mut self) -> Fragment {
        let node = self.new_node(NodeKind::Epsilon);
        Fragment::single(self.push(node))
    }

    /// `first second`
    fn sequence(&mut self, first: Fragment, second: Fragment) -> Fragment {
        self.node_mut(first.tail).link(Some(second.entry), false);
        for exit in &first.exits {
            self.node_mut(*exit).link(Some(second.entry), true);
        }
        Fragment {
            entry: first.entry,
            tail: second.tail,
            exits: second.exits,
        }
    }

    /// Opens an alternation whose first branch is `branch`.
    fn first_alternative(&mut self, branch: Fragment) -> Fragment {
        let node = self.new_node(NodeKind::Alternative).with_sub(branch.entry);
        let head = self.push(node);
        Fragment {
            entry: head,
            tail: head,
            exits: branch.open_ends().collect(),
        }
    }

    /// Appends `branch` to the alternation `group`.
    fn alternative(&mut self, group: &mut Fragment, branch: Fragment) {
        let node = self.new_node(NodeKind::Alternative).with_sub(branch.entry);
        let id = self.push(node);

        let mut last = group.entry;
        while let Some(down) = self.nodes[last.index()].down() {
            last = down;
        }
        self.node_mut(last).set_down(id);

        group.exits.push(id);
        group.exits.extend(branch.open_ends());
    }

    /// `[ inner ]`
    fn option(&mut self, inner: Fragment) -> Fragment {
        let node = self.new_node(NodeKind::Optional).with_sub(inner.entry);
        let id = self.push(node);
        Fragment {
            entry: id,
            tail: id,
            exits: inner.open_ends().collect(),
        }
    }

    /// `{ inner }`
    fn iteration(&mut self, inner: Fragment) -> Fragment {
        let node = self.new_node(NodeKind::Iteration).with_sub(inner.entry);
        let id = self.push(node);
        self.close_loop(&inner, id);
        Fragment::single(id)
    }

    /// `body { loop_body body }` as a single loop around `body`.
    fn rerun(&mut self, body: &[&Expr], loop_body: &[&Expr]) -> Result<Fragment, BuildError> {
        let repeated = self.compile_items(body)?;
        let between = if loop_body.is_empty() {
            None
        } else {
            Some(self.compile_items(loop_body)?)
        };

        let node = self
            .new_node(NodeKind::Rerun)
            .with_sub(repeated.entry)
            .with_loop_body(between.as_ref().map(|fragment| fragment.entry));
        let id = self.push(node);

        self.close_loop(&repeated, id);
        if let Some(between) = &between {
            self.close_loop(between, id);
        }
        Ok(Fragment::single(id))
    }

    /// Points every open end of `inner` back at the loop node `target`.
    fn close_loop(&mut self, inner: &Fragment, target: NodeId) {
        for end in inner.open_ends() {
            self.node_mut(end).link(Some(target), true);
        }
    }

    /// Closes every nested open end; the tail already ends the top level.
    fn finish(&mut self, fragment: &Fragment) {
        for exit in &fragment.exits {
            self.node_mut(*exit).link(None, true);
        }
    }
}

/// Matches each zero-or-more repetition against its neighbours in the
/// enclosing sequence.
///
/// `a {a}` and `a {b a}` collapse when the repetition body ends with the
/// items right before it; `{a} a` and `{a b} a` collapse when the body
/// starts with the items right after it. The longest match wins.
fn collapse_reruns(items: &[Expr]) -> Vec<Segment<'_>> {
    let mut segments: Vec<Segment<'_>> = Vec::new();
    let mut index = 0;

    while index < items.len() {
        let item = &items[index];
        index += 1;

        let Expr::Repeat(inner) = item else {
            segments.push(Segment::Single(item));
            continue;
        };
        let repeated = inner.as_items();

        let preceding: Vec<&Expr> = segments
            .iter()
            .rev()
            .map_while(|segment| match segment {
                Segment::Single(expr) => Some(*expr),
                Segment::Rerun { .. } => None,
            })
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();

        if let Some(k) = longest_match(&repeated, &preceding, MatchSide::Suffix) {
            segments.truncate(segments.len() - k);
            segments.push(Segment::Rerun {
                body: preceding[preceding.len() - k..].to_vec(),
                loop_body: repeated[..repeated.len() - k].to_vec(),
            });
            continue;
        }

        let following: Vec<&Expr> = items[index..].iter().collect();
        if let Some(k) = longest_match(&repeated, &following, MatchSide::Prefix) {
            index += k;
            segments.push(Segment::Rerun {
                body: following[..k].to_vec(),
                loop_body: repeated[k..].to_vec(),
            });
            continue;
        }

        segments.push(Segment::Single(item));
    }
    segments
}

#[derive(Debug, Clone, Copy)]
enum MatchSide {
    /// The repetition body ends with the neighbours before it.
    Suffix,
    /// The repetition body starts with the neighbours after it.
    Prefix,
}

fn longest_match(repeated: &[&Expr], neighbours: &[&Expr], side: MatchSide) -> Option<usize> {
    let limit = repeated.len().min(neighbours.len());
    (1..=limit).rev().find(|&k| match side {
        MatchSide::Suffix => repeated[repeated.len() - k..] == neighbours[neighbours.len() - k..],
        MatchSide::Prefix => repeated[..k] == neighbours[..k],
    })
}

#[cfg(test)]
mod tests {
    use trestle_core::expr::Production;

    use super::*;

    fn build(expr: Expr) -> (Grammar, DiagramGraph) {
        build_with(expr, &BuildConfig::default())
    }

    fn build_with(expr: Expr, config: &BuildConfig) -> (Grammar, DiagramGraph) {
        let grammar = Grammar::from_productions(&[Production::new("p", expr)], config).unwrap();
        let graph = grammar.graph("p").unwrap().clone();
        (grammar, graph)
    }

    fn kinds(graph: &DiagramGraph, start: NodeId) -> Vec<NodeKind> {
        graph.level(start).map(|id| graph.node(id).kind()).collect()
    }

    #[test]
    fn test_sequence_links_on_one_level() {
        let (_, graph) = build(Expr::sequence(vec![
            Expr::literal("a"),
            Expr::identifier("b"),
            Expr::literal("c"),
        ]));
        assert_eq!(
            kinds(&graph, graph.entry()),
            vec![NodeKind::Terminal, NodeKind::Nonterminal, NodeKind::Terminal]
        );
        let last = graph.level(graph.entry()).last().unwrap();
        assert_eq!(graph.node(last).next(), None);
        assert!(!graph.node(last).escapes());
    }

    #[test]
    fn test_alternation_branches_escape_to_successor() {
        let (_, graph) = build(Expr::sequence(vec![
            Expr::alternation(vec![Expr::literal("a"), Expr::literal("b")]),
            Expr::literal("c"),
        ]));
        let head = graph.entry();
        let c = graph.node(head).next().unwrap();
        assert!(!graph.node(head).escapes());

        for branch in graph.branches(head) {
            let sub = graph.node(branch).sub().unwrap();
            let symbol = graph.node(sub);
            assert!(symbol.escapes());
            assert_eq!(symbol.next(), Some(c));
        }
    }

    #[test]
    fn test_iteration_body_loops_back() {
        let (_, graph) = build(Expr::repeat(Expr::sequence(vec![
            Expr::literal("a"),
            Expr::literal("b"),
        ])));
        let iter = graph.entry();
        assert_eq!(graph.node(iter).kind(), NodeKind::Iteration);
        let body: Vec<NodeId> = graph.level(graph.node(iter).sub().unwrap()).collect();
        let last = graph.node(*body.last().unwrap());
        assert!(last.escapes());
        assert_eq!(last.next(), Some(iter));
    }

    #[test]
    fn test_option_of_alternation_escapes_every_branch() {
        let (_, graph) = build(Expr::sequence(vec![
            Expr::optional(Expr::alternation(vec![
                Expr::literal("a"),
                Expr::literal("b"),
            ])),
            Expr::literal("c"),
        ]));
        let opt = graph.entry();
        let c = graph.node(opt).next().unwrap();
        let head = graph.node(opt).sub().unwrap();
        let head_node = graph.node(head);
        assert!(head_node.escapes());
        assert_eq!(head_node.next(), Some(c));
    }

    #[test]
    fn test_rerun_simple() {
        let (grammar, graph) = build(Expr::sequence(vec![
            Expr::literal("a"),
            Expr::repeat(Expr::literal("a")),
        ]));
        let rerun = graph.node(graph.entry());
        assert_eq!(rerun.kind(), NodeKind::Rerun);
        assert_eq!(rerun.loop_body(), None);
        assert_eq!(rerun.next(), None);
        assert_eq!(graph.unparse(grammar.symbols()), "\"a\" { \"a\" }");
        // The collapsed form needs a single terminal node.
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_rerun_with_loop_body() {
        let (grammar, graph) = build(Expr::sequence(vec![
            Expr::literal("x"),
            Expr::identifier("item"),
            Expr::repeat(Expr::sequence(vec![
                Expr::literal(","),
                Expr::identifier("item"),
            ])),
        ]));
        assert_eq!(
            kinds(&graph, graph.entry()),
            vec![NodeKind::Terminal, NodeKind::Rerun]
        );
        let rerun_id = graph.level(graph.entry()).nth(1).unwrap();
        let rerun = graph.node(rerun_id);
        let body = graph.node(rerun.sub().unwrap());
        let between = graph.node(rerun.loop_body().unwrap());
        assert_eq!(body.next(), Some(rerun_id));
        assert!(body.escapes());
        assert_eq!(between.next(), Some(rerun_id));
        assert_eq!(
            graph.unparse(grammar.symbols()),
            "\"x\" item { \",\" item }"
        );
    }

    #[test]
    fn test_rerun_from_following_items() {
        let (grammar, graph) = build(Expr::sequence(vec![
            Expr::repeat(Expr::sequence(vec![
                Expr::identifier("item"),
                Expr::literal(","),
            ])),
            Expr::identifier("item"),
        ]));
        assert_eq!(kinds(&graph, graph.entry()), vec![NodeKind::Rerun]);
        assert_eq!(graph.unparse(grammar.symbols()), "item { \",\" item }");
    }

    #[test]
    fn test_rerun_longest_suffix_wins() {
        let (grammar, graph) = build(Expr::sequence(vec![
            Expr::literal("a"),
            Expr::literal("b"),
            Expr::repeat(Expr::sequence(vec![Expr::literal("a"), Expr::literal("b")])),
        ]));
        assert_eq!(kinds(&graph, graph.entry()), vec![NodeKind::Rerun]);
        assert_eq!(graph.unparse(grammar.symbols()), "\"a\" \"b\" { \"a\" \"b\" }");
    }

    #[test]
    fn test_collapse_can_be_disabled() {
        let (_, graph) = build_with(
            Expr::sequence(vec![Expr::literal("a"), Expr::repeat(Expr::literal("a"))]),
            &BuildConfig::new(false),
        );
        assert_eq!(
            kinds(&graph, graph.entry()),
            vec![NodeKind::Terminal, NodeKind::Iteration]
        );
    }

    #[test]
    fn test_repeat_one_is_not_collapsed() {
        let (_, graph) = build(Expr::sequence(vec![
            Expr::literal("a"),
            Expr::repeat_one(Expr::literal("a")),
        ]));
        assert_eq!(
            kinds(&graph, graph.entry()),
            vec![NodeKind::Terminal, NodeKind::Iteration]
        );
    }

    #[test]
    fn test_empty_constructs_are_errors() {
        let config = BuildConfig::default();
        let err = Grammar::from_productions(
            &[Production::new("p", Expr::sequence(vec![]))],
            &config,
        )
        .unwrap_err();
        assert_eq!(
            err,
            BuildError::EmptyConstruct {
                production: "p".to_string(),
                construct: "sequence",
            }
        );

        let err = Grammar::from_productions(
            &[Production::new("q", Expr::alternation(vec![]))],
            &config,
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::EmptyConstruct { construct: "alternation", .. }));
    }

    #[test]
    fn test_serials_are_unique_across_productions() {
        let productions = vec![
            Production::new("a", Expr::sequence(vec![Expr::literal("x"), Expr::literal("y")])),
            Production::new("b", Expr::literal("z")),
        ];
        let grammar = Grammar::from_productions(&productions, &BuildConfig::default()).unwrap();
        let mut serials: Vec<usize> = ["a", "b"]
            .iter()
            .flat_map(|name| {
                let graph = grammar.graph(name).unwrap();
                graph.iter().map(|(_, node)| node.serial()).collect::<Vec<_>>()
            })
            .collect();
        let count = serials.len();
        serials.sort_unstable();
        serials.dedup();
        assert_eq!(serials.len(), count);
    }
}

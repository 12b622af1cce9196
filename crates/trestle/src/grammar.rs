//! Symbol table and compiled grammar.
//!
//! Every distinct `(kind, name)` pair is registered once in a
//! [`SymbolTable`]; a [`Grammar`] owns the table together with the compiled
//! diagram graph of every production.

use std::fmt;

use indexmap::{IndexMap, IndexSet};
use log::{debug, trace, warn};
use string_interner::{DefaultStringInterner, DefaultSymbol};

use trestle_core::expr::Production;

use crate::{
    builder::{BuildError, GraphBuilder},
    config::BuildConfig,
    error::TrestleError,
    graph::DiagramGraph,
};

/// Whether a symbol is a literal token or a reference to a production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Terminal,
    Nonterminal,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Terminal => write!(f, "terminal"),
            Self::Nonterminal => write!(f, "nonterminal"),
        }
    }
}

/// Handle to a symbol registered in a [`SymbolTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(usize);

impl SymbolId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Registry of grammar symbols, deduplicated by kind and name.
///
/// # Examples
///
/// ```
/// use trestle::grammar::{SymbolKind, SymbolTable};
///
/// let mut table = SymbolTable::new();
/// let a = table.intern(SymbolKind::Terminal, "x");
/// let b = table.intern(SymbolKind::Nonterminal, "x");
/// assert_ne!(a, b);
/// assert_eq!(table.intern(SymbolKind::Terminal, "x"), a);
/// assert_eq!(table.name(a), Some("x"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    interner: DefaultStringInterner,
    symbols: IndexSet<(SymbolKind, DefaultSymbol)>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the symbol for `(kind, name)`, registering it on first use.
    pub fn intern(&mut self, kind: SymbolKind, name: &str) -> SymbolId {
        let key = self.interner.get_or_intern(name);
        let (index, inserted) = self.symbols.insert_full((kind, key));
        if inserted {
            trace!(kind:%, name, index; "Registered symbol");
        }
        SymbolId(index)
    }

    /// Finds an already registered symbol.
    pub fn lookup(&self, kind: SymbolKind, name: &str) -> Option<SymbolId> {
        let key = self.interner.get(name)?;
        self.symbols.get_index_of(&(kind, key)).map(SymbolId)
    }

    pub fn kind(&self, id: SymbolId) -> Option<SymbolKind> {
        self.symbols.get_index(id.0).map(|(kind, _)| *kind)
    }

    pub fn name(&self, id: SymbolId) -> Option<&str> {
        let (_, key) = self.symbols.get_index(id.0)?;
        self.interner.resolve(*key)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Iterates all symbols in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, SymbolKind, &str)> + '_ {
        self.symbols
            .iter()
            .enumerate()
            .filter_map(|(index, (kind, key))| {
                self.interner
                    .resolve(*key)
                    .map(|name| (SymbolId(index), *kind, name))
            })
    }
}

/// A compiled grammar: symbols, terminals and one diagram graph per
/// production, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Grammar {
    symbols: SymbolTable,
    terminals: IndexSet<SymbolId>,
    rules: IndexMap<SymbolId, DiagramGraph>,
    next_serial: usize,
}

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles every production in order.
    ///
    /// # Errors
    ///
    /// Returns the first [`BuildError`] raised by a production.
    pub fn from_productions(
        productions: &[Production],
        config: &BuildConfig,
    ) -> Result<Self, BuildError> {
        let mut grammar = Self::new();
        for production in productions {
            grammar.add_production(production, config)?;
        }
        debug!(
            productions = grammar.rules.len(),
            symbols = grammar.symbols.len();
            "Grammar compiled"
        );
        Ok(grammar)
    }

    /// Compiles one production and registers its graph.
    ///
    /// Redefining a production replaces its graph and keeps its original
    /// position in the declaration order.
    pub fn add_production(
        &mut self,
        production: &Production,
        config: &BuildConfig,
    ) -> Result<SymbolId, BuildError> {
        let symbol = self
            .symbols
            .intern(SymbolKind::Nonterminal, production.name());
        let graph = GraphBuilder::new(self, production.name(), config).compile(production.expr())?;
        trace!(name = production.name(), graph = graph.unparse(&self.symbols); "Production compiled");

        if self.rules.insert(symbol, graph).is_some() {
            warn!(name = production.name(); "Production redefined, keeping the last definition");
        }
        Ok(symbol)
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Terminals in order of first appearance.
    pub fn terminals(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.terminals.iter().copied()
    }

    /// Defined nonterminals in declaration order.
    pub fn nonterminals(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.rules.keys().copied()
    }

    /// Names of the defined nonterminals in declaration order.
    pub fn nonterminal_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.rules.keys().filter_map(|id| self.symbols.name(*id))
    }

    /// Looks up the diagram graph of a production by name.
    ///
    /// # Errors
    ///
    /// Returns [`TrestleError::Lookup`] when no production of that name
    /// exists.
    pub fn graph(&self, name: &str) -> Result<&DiagramGraph, TrestleError> {
        self.symbols
            .lookup(SymbolKind::Nonterminal, name)
            .and_then(|id| self.rules.get(&id))
            .ok_or_else(|| TrestleError::Lookup(name.to_string()))
    }

    pub(crate) fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbols
    }

    pub(crate) fn register_terminal(&mut self, name: &str) -> SymbolId {
        let id = self.symbols.intern(SymbolKind::Terminal, name);
        self.terminals.insert(id);
        id
    }

    /// Hands out the next grammar-wide node serial number.
    pub(crate) fn allocate_serial(&mut self) -> usize {
        let serial = self.next_serial;
        self.next_serial += 1;
        serial
    }
}

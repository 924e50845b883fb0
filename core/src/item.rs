use std::{
    collections::{BTreeMap, BTreeSet},
    hash::Hash,
    sync::Arc,
};

use itertools::Itertools;

use crate::{
    context::Context,
    grammar::Grammar,
    production::{NodeSet, Production},
    symbol::{traits::SyntaxSymbol as _, Symbol},
    RelrResult, END, EOF,
};

/// A production item.
///
/// # Example
/// [C -> {1}, $eof] is the production C at node set {1}, expecting $eof once reduced.
#[derive(Debug, Clone)]
pub struct Item {
    production: Arc<Production>,
    nodes: NodeSet,
    lookahead: String,
    first: BTreeSet<String>,
}

impl std::fmt::Display for Item {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{} -> {}, {}] first: {}",
            self.name(),
            self.nodes,
            self.lookahead,
            self.first.iter().join(" ")
        )
    }
}

impl Item {
    pub fn new(production: Arc<Production>, nodes: NodeSet, lookahead: &str) -> Self {
        let first = production.first(&nodes);

        Self {
            production,
            nodes,
            lookahead: lookahead.to_owned(),
            first,
        }
    }

    /// The item recognizing nothing yet of `production`.
    pub fn initial(production: &Arc<Production>, lookahead: &str) -> Self {
        Self::new(Arc::clone(production), production.start(), lookahead)
    }

    pub fn production(&self) -> &Production {
        &self.production
    }

    /// Name of the non-terminal being recognized.
    pub fn name(&self) -> &str {
        self.production.name()
    }

    pub fn nodes(&self) -> &NodeSet {
        &self.nodes
    }

    pub fn lookahead(&self) -> &str {
        &self.lookahead
    }

    /// Symbols expected next, `$end` when the production may be reduced.
    pub fn first(&self) -> &BTreeSet<String> {
        &self.first
    }

    /// The item reached after consuming `symbol`, with the same lookahead.
    pub fn step(&self, symbol: &str) -> Self {
        Self::new(
            Arc::clone(&self.production),
            self.production.step(&self.nodes, symbol),
            &self.lookahead,
        )
    }

    /// Lookaheads of the items derived for `non_terminal` at this position.
    pub fn follow(&self, non_terminal: &str, grammar: &Grammar) -> BTreeSet<String> {
        self.production
            .follow_symbols(&self.nodes, non_terminal, &self.lookahead, grammar)
    }

    pub fn is_reduced(&self) -> bool {
        self.first.contains(END)
    }

    /// Returns true if the production may be reduced on `lookahead`.
    pub fn is_reduced_item(&self, lookahead: &str) -> bool {
        self.is_reduced() && self.lookahead == lookahead
    }

    /// Returns true if nothing of the production has been consumed.
    pub fn is_initial(&self) -> bool {
        self.nodes == self.production.start()
    }

    pub fn process(&self, symbol: &Symbol, context: &mut Context) {
        self.production.process(&self.nodes, symbol, context)
    }

    fn key(&self) -> (&str, &NodeSet, &str) {
        (self.name(), &self.nodes, &self.lookahead)
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Item {}

impl PartialOrd for Item {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Item {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key().cmp(&other.key())
    }
}

impl Hash for Item {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key().hash(state)
    }
}

/// A canonical LR(1) state: the closure of a seed set of items.
///
/// Items are indexed by every symbol of their `first` set. Two states are equal if their
/// indexes are equal.
#[derive(Debug, Default, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Items {
    index: BTreeMap<String, BTreeSet<Item>>,
    covered: BTreeSet<String>,
}

impl std::fmt::Display for Items {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.iter().join("\n"))
    }
}

impl Items {
    /// Close a seed set of items.
    ///
    /// For every item expecting a non-terminal N, the initial items of N are added with
    /// every lookahead that can follow N at that position, until nothing is added.
    pub fn close<I>(seed: I, grammar: &Grammar) -> Self
    where
        I: IntoIterator<Item = Item>,
    {
        let mut items = BTreeSet::<Item>::default();
        let mut stack = Vec::<Item>::default();

        for item in seed {
            if items.insert(item.clone()) {
                stack.push(item);
            }
        }

        while let Some(item) = stack.pop() {
            for symbol in item.first() {
                let Some(production) = grammar.production(symbol) else {
                    continue;
                };

                for lookahead in item.follow(symbol, grammar) {
                    let derived = Item::initial(production, &lookahead);

                    if items.insert(derived.clone()) {
                        stack.push(derived);
                    }
                }
            }
        }

        let mut result = Self::default();

        for item in items {
            result.covered.insert(item.name().to_owned());

            for symbol in item.first() {
                result
                    .index
                    .entry(symbol.clone())
                    .or_default()
                    .insert(item.clone());
            }
        }

        result
    }

    /// The initial state, seeded with `%start` expecting `$eof`.
    pub fn start(grammar: &Grammar) -> RelrResult<Self> {
        let start = grammar.start()?;
        Ok(Self::close([Item::initial(start, EOF)], grammar))
    }

    /// Symbols with at least one item expecting them.
    pub fn first(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    /// Items expecting `symbol`.
    pub fn get(&self, symbol: &str) -> impl Iterator<Item = &Item> {
        self.index.get(symbol).into_iter().flatten()
    }

    /// Items that may be reduced.
    pub fn reduced_items(&self) -> impl Iterator<Item = &Item> {
        self.get(END)
    }

    /// Returns true if some item of the state recognizes the non-terminal.
    pub fn contains(&self, name: &str) -> bool {
        self.covered.contains(name)
    }

    /// Every item of the state, once.
    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.index
            .values()
            .flatten()
            .collect::<BTreeSet<_>>()
            .into_iter()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// The successor state on `symbol`.
    pub fn goto(&self, symbol: &str, grammar: &Grammar) -> Self {
        Self::close(self.get(symbol).map(|item| item.step(symbol)), grammar)
    }

    /// Fire the actions the items expecting `symbol` cross before consuming it.
    pub fn process(&self, symbol: &Symbol, context: &mut Context) {
        for item in self
            .get(symbol.name())
            .unique_by(|item| (item.name(), item.nodes()))
        {
            item.process(symbol, context);
        }
    }

    /// Fire the trailing actions of the items reducing `production` on `lookahead`.
    pub fn process_reduction(&self, production: &str, lookahead: &Symbol, context: &mut Context) {
        for item in self
            .reduced_items()
            .filter(|item| item.name() == production && item.lookahead() == lookahead.name())
            .unique_by(|item| item.nodes())
        {
            item.process(lookahead, context);
        }
    }
}
